//! # euporie-core-rs
//!
//! The rendering/input core of a terminal notebook console: a cell-grid
//! screen model with a differential renderer, a VT100/xterm/kitty input
//! parser, cached and scrolling containers, and inline-graphics
//! controllers (sixel, iTerm, Kitty).
//!
//! ## Modules
//!
//! - [`screen`] — the cell grid ([`screen::Screen`]), write positions, and
//!   the diffing renderer ([`screen::diff`]) that turns two frames into a
//!   minimal escape-sequence patch.
//! - [`cell`] — a single grid cell: a grapheme cluster plus style and width.
//! - [`style`] — style strings, parsed [`style::Attrs`], colour ([`style::Rgba`]).
//! - [`layout`] — flex-style space distribution among siblings ([`layout::Dimension`]).
//! - [`container`] — the container tree: `Window`, splits, floats,
//!   conditionals, decorators, cached and scrolling containers, and
//!   inline-graphics containers.
//! - [`control`] — the `Control` trait leaves wrap, and `UIContent`.
//! - [`input`] — the VT100/xterm/kitty streaming parser and key processor.
//! - [`ansi`] — escape-sequence construction for everything this crate writes.
//! - [`ansi_text`] — the reverse direction: decode a foreign process's raw
//!   SGR-laden output into styled fragments.
//! - [`output`] — the output side: raw-mode setup, alternate screen, flush.
//! - [`graphics`] — inline-image protocol encoders and a `Display`-style container.
//! - [`clipboard`] — OSC-52 clipboard access.
//! - [`collab`] — trait seams for a kernel, an LSP client, and format conversion.
//! - [`config`] — process-wide context (`AppContext`, colour depth, graphics mode).
//! - [`error`] — the crate's error type.

pub mod ansi;
pub mod ansi_text;
pub mod cell;
pub mod clipboard;
pub mod collab;
pub mod config;
pub mod container;
pub mod control;
pub mod error;
pub mod graphics;
pub mod input;
pub mod layout;
pub mod output;
pub mod screen;
pub mod style;

pub use cell::{Cell, CellWidth};
pub use config::{AppContext, ColorDepth, GraphicsMode, Multiplexer, QueryTimeouts};
pub use container::{Container, Float, FloatContainer, HSplit, RenderContext, VSplit, Window};
pub use control::{Control, StaticControl, UIContent};
pub use error::{CoreError, Result};
pub use input::key_processor::KeyProcessor;
pub use input::{KeyPress, MouseEvent, MouseKind, Parser, ParsedEvent};
pub use layout::Dimension;
pub use screen::diff::DiffRenderer;
pub use screen::{Screen, WritePosition};
pub use style::{Attrs, Rgba, Style};
