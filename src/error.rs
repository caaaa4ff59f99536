//! Error taxonomy for the rendering and input core.
//!
//! Most errors here are recorded, not propagated: a child render failure
//! blanks that child and keeps the rest of the frame; an ANSI parse failure
//! degrades to a zero-width escape. See spec §7 for the full policy. This
//! enum exists for the handful of operations that really do fail outright
//! (I/O, an unsupported colour depth request, a malformed datum).

use std::io;

/// Error type for the screen/renderer/input/graphics core.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// I/O failure writing to or reading from the terminal stream.
    #[error("terminal I/O error: {0}")]
    Io(#[from] io::Error),

    /// A terminal query (CPR, colour, pixel size, capability) timed out.
    ///
    /// Not a hard failure: callers treat this as "capability absent" per
    /// spec §5/§7, but some internal plumbing needs to distinguish timeout
    /// from a real reply to log the downgrade.
    #[error("terminal query timed out: {0}")]
    QueryTimeout(&'static str),

    /// A container failed to render; the caller blanks it for this frame.
    #[error("container render failed: {0}")]
    Render(String),

    /// A graphics datum could not be converted to the requested protocol.
    #[error("graphics conversion failed: {0}")]
    Graphics(String),

    /// An external collaborator (kernel, LSP, format converter) failed.
    #[error("collaborator failure: {0}")]
    Collaborator(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
