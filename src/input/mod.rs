//! Terminal input: the VT100/xterm/kitty streaming parser, key and mouse
//! models, and the cooperative read loop that turns bytes into events.

pub mod key_processor;
pub mod mouse;
pub mod vt100;

pub use mouse::{MouseButton, MouseEvent, MouseKind};
pub use vt100::{KeyCode, KeyEvent, KeyState, Modifiers, Parser, ParsedEvent};

/// A single logical keypress, the unit containers bind actions to. Distinct
/// from [`KeyEvent`] in that it has already discarded the
/// press/repeat/release distinction non-kitty terminals can't report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyPress {
    pub code: KeyCode,
    pub modifiers: Modifiers,
}

impl KeyPress {
    pub const fn new(code: KeyCode, modifiers: Modifiers) -> Self {
        Self { code, modifiers }
    }
}

impl From<KeyEvent> for KeyPress {
    fn from(event: KeyEvent) -> Self {
        Self { code: event.code, modifiers: event.modifiers }
    }
}
