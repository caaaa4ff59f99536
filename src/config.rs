//! Process-wide rendering/input configuration.
//!
//! REDESIGN FLAGS calls out the teacher's "global current app" lookup and
//! asks for an explicit context passed into every container operation
//! instead. `AppContext` is that context: colour depth, graphics mode,
//! multiplexer detection and query timeouts live here rather than behind a
//! singleton.

use std::time::Duration;

/// Terminal colour depth, cheapest to richest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorDepth {
    /// Structural SGR only (bold/underline/etc), no colour codes at all.
    OneBit,
    /// Snap to the closest of the 16 standard ANSI colours.
    FourBit,
    /// Snap to the closest of the 256-colour palette.
    EightBit,
    /// Emit `38;2;r;g;b` / `48;2;r;g;b` verbatim.
    #[default]
    TrueColor,
}

/// Which inline-graphics protocol to use, or `Auto` to detect from terminal
/// capability queries (spec §4.7/§5/§8 scenario 6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GraphicsMode {
    #[default]
    Auto,
    Disabled,
    Sixel,
    Iterm,
    KittyDirect,
    KittyUnicodePlaceholder,
}

/// Terminal multiplexer the process is running inside, if any. Changes how
/// graphics payloads and some escape sequences must be wrapped (spec §4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Multiplexer {
    #[default]
    None,
    Tmux,
    /// GNU screen: passthrough chunks are capped at 764 bytes (spec §4.7,
    /// §9 Open Question — this cap is empirical, kept as observed).
    Screen,
}

impl Multiplexer {
    /// Detect the active multiplexer from the environment, the way
    /// `euporie` inspects `$TERM`/`$TMUX`/`$STY` at startup.
    pub fn detect() -> Self {
        if std::env::var_os("TMUX").is_some() {
            Multiplexer::Tmux
        } else if std::env::var_os("STY").is_some() {
            Multiplexer::Screen
        } else {
            Multiplexer::None
        }
    }
}

/// Timeouts for terminal round-trips that may never reply (spec §5).
#[derive(Debug, Clone, Copy)]
pub struct QueryTimeouts {
    /// Startup capability probes (CPR, DA, kitty/iterm/sixel status).
    pub startup: Duration,
    /// OSC-52 clipboard reads, which can involve a user prompt in some
    /// terminals.
    pub clipboard: Duration,
}

impl Default for QueryTimeouts {
    fn default() -> Self {
        Self {
            startup: Duration::from_secs(1),
            clipboard: Duration::from_secs(5),
        }
    }
}

/// Explicit context threaded through every container operation instead of a
/// global lookup.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub color_depth: ColorDepth,
    pub graphics_mode: GraphicsMode,
    pub multiplexer: Multiplexer,
    pub timeouts: QueryTimeouts,
    /// Whether to leave the last-drawn graphic on screen when exiting
    /// rather than emitting a delete-placement sequence (spec §4.7).
    pub leave_graphics_on_exit: bool,
}

impl Default for AppContext {
    fn default() -> Self {
        Self {
            color_depth: ColorDepth::default(),
            graphics_mode: GraphicsMode::default(),
            multiplexer: Multiplexer::detect(),
            timeouts: QueryTimeouts::default(),
            leave_graphics_on_exit: false,
        }
    }
}
