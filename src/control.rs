//! [`Control`]: the leaf that actually produces text, and [`UIContent`], the
//! lazy row-indexed view it hands back.
//!
//! Grounded on `euporie/apptk/widgets/base.py`'s `UIControl`/`UIContent`
//! pair. A `Control` never touches a `Screen` itself — `Window` (the
//! `Container` leaf, see [`crate::container`]) is the only thing that reads
//! a `Control`'s lines and writes them into cells. Keeping the split means a
//! control can be tested (assert on `get_line` output) without any terminal
//! machinery at all.

use crate::input::KeyPress;
use crate::style::Style;

/// One formatted fragment: a style plus the text it applies to.
pub type StyledFragment = (Style, String);

/// A lazy, row-indexed view of styled text a [`Control`] produces for one
/// render. `line_count` may be larger than what ever actually gets
/// requested (a `ScrollingContainer` or `CachedContainer` only calls
/// `get_line` for rows it intends to draw).
pub struct UIContent {
    pub line_count: usize,
    /// `(row, column)` the control wants the terminal cursor placed at,
    /// `None` if this control never receives the cursor.
    pub cursor_position: Option<(usize, usize)>,
    pub show_cursor: bool,
    get_line: Box<dyn Fn(usize) -> Vec<StyledFragment>>,
}

impl UIContent {
    pub fn new(line_count: usize, get_line: impl Fn(usize) -> Vec<StyledFragment> + 'static) -> Self {
        Self { line_count, cursor_position: None, show_cursor: false, get_line: Box::new(get_line) }
    }

    pub fn with_cursor(mut self, position: (usize, usize), show_cursor: bool) -> Self {
        self.cursor_position = Some(position);
        self.show_cursor = show_cursor;
        self
    }

    /// Fragments for row `i`, or an empty vec past `line_count` — callers
    /// need not special-case the tail themselves.
    pub fn get_line(&self, i: usize) -> Vec<StyledFragment> {
        if i >= self.line_count {
            return Vec::new();
        }
        (self.get_line)(i)
    }

    pub fn empty() -> Self {
        Self::new(0, |_| Vec::new())
    }
}

/// A key binding: the key(s) that trigger it and an opaque command name the
/// application-level command registry (out of scope, spec §1) resolves.
/// The core only needs enough of a key-binding model to let a `Control`
/// declare what it wants bound while it has focus; dispatching is the
/// external key-binding registry's job.
#[derive(Debug, Clone)]
pub struct KeyBinding {
    pub keys: Vec<KeyPress>,
    pub command: String,
}

/// A set of key bindings a focused `Control` contributes to the key
/// processor.
#[derive(Debug, Clone, Default)]
pub struct KeyBindings {
    pub bindings: Vec<KeyBinding>,
}

impl KeyBindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(mut self, keys: Vec<KeyPress>, command: impl Into<String>) -> Self {
        self.bindings.push(KeyBinding { keys, command: command.into() });
        self
    }
}

/// A leaf that produces [`UIContent`]. `Window` (see [`crate::container`])
/// is the only container variant that holds one.
pub trait Control {
    /// Produce this frame's content for the given available width (controls
    /// that wrap text need to know the width before they can report a line
    /// count).
    fn create_content(&mut self, width: u16) -> UIContent;

    /// Whether this control accepts focus (and so can appear in a tab
    /// order / receive key events).
    fn is_focusable(&self) -> bool {
        false
    }

    /// Key bindings this control contributes while focused.
    fn key_bindings(&self) -> Option<KeyBindings> {
        None
    }

    /// Preferred width in cells, if the control has an intrinsic one
    /// (`None` defers entirely to the parent split's `Dimension`).
    fn preferred_width(&self, _max_available: u16) -> Option<u16> {
        None
    }

    fn preferred_height(&self, _width: u16, _max_available: u16) -> Option<u16> {
        None
    }
}

/// A [`Control`] built from a fixed set of styled lines, the simplest
/// possible implementation and the one most unit tests (and
/// [`crate::container::PrintingContainer`]) reach for.
pub struct StaticControl {
    lines: Vec<Vec<StyledFragment>>,
    focusable: bool,
}

impl StaticControl {
    pub fn new(lines: Vec<Vec<StyledFragment>>) -> Self {
        Self { lines, focusable: false }
    }

    pub fn from_plain_text(text: &str, style: Style) -> Self {
        let lines = text.lines().map(|line| vec![(style, line.to_string())]).collect();
        Self::new(lines)
    }

    pub fn focusable(mut self, yes: bool) -> Self {
        self.focusable = yes;
        self
    }
}

impl Control for StaticControl {
    fn create_content(&mut self, _width: u16) -> UIContent {
        let lines = self.lines.clone();
        let count = lines.len();
        UIContent::new(count, move |i| lines[i].clone())
    }

    fn is_focusable(&self) -> bool {
        self.focusable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_control_reports_lines_verbatim() {
        let mut control = StaticControl::from_plain_text("hello\nworld", Style::DEFAULT);
        let content = control.create_content(80);
        assert_eq!(content.line_count, 2);
        assert_eq!(content.get_line(0)[0].1, "hello");
        assert_eq!(content.get_line(1)[0].1, "world");
    }

    #[test]
    fn ui_content_out_of_range_row_is_empty() {
        let content = UIContent::new(1, |_| vec![(Style::DEFAULT, "x".into())]);
        assert!(content.get_line(5).is_empty());
    }

    #[test]
    fn key_bindings_builder() {
        let kb = KeyBindings::new().bind(vec![], "submit");
        assert_eq!(kb.bindings[0].command, "submit");
    }
}
