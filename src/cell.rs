//! The atomic unit of terminal rendering.
//!
//! A [`Cell`] holds one grapheme cluster's text plus its resolved style.
//! Most cells are a single narrow character, so a small inline string beats
//! interning for the common case; East-Asian wide characters occupy two
//! adjacent cells, the second a [`Cell::CONTINUATION`] marker so the
//! differential renderer never tries to draw into the second half of a wide
//! glyph (spec §3 Cell/Invariants).

use std::fmt;

use smallvec::SmallVec;
use unicode_width::UnicodeWidthStr;

use crate::style::Style;

/// Display width of a cell's content: a normal glyph, the left half of a
/// wide glyph, or the (invisible) right half.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellWidth {
    #[default]
    Narrow,
    WideLead,
    WideContinuation,
}

/// A single terminal cell: one grapheme cluster plus its resolved style.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    text: SmallVec<[u8; 4]>,
    pub style: Style,
    pub width: CellWidth,
}

impl Cell {
    /// A blank cell with terminal-default colours, used to fill areas
    /// before anything draws into them.
    pub fn blank() -> Self {
        Self { text: SmallVec::from_slice(b" "), style: Style::DEFAULT, width: CellWidth::Narrow }
    }

    /// The placeholder occupying the second column of a wide glyph. Holds
    /// no text of its own; the renderer skips it and the differential
    /// algorithm never diffs it independently of its lead cell.
    pub fn continuation(style: Style) -> Self {
        Self { text: SmallVec::new(), style, width: CellWidth::WideContinuation }
    }

    pub fn new(grapheme: &str, style: Style) -> Self {
        let width = match UnicodeWidthStr::width(grapheme) {
            0 | 1 => CellWidth::Narrow,
            _ => CellWidth::WideLead,
        };
        Self { text: SmallVec::from_slice(grapheme.as_bytes()), style, width }
    }

    pub fn text(&self) -> &str {
        // SAFETY: constructors only ever store valid UTF-8 grapheme bytes.
        std::str::from_utf8(&self.text).unwrap_or(" ")
    }

    pub fn is_continuation(&self) -> bool {
        matches!(self.width, CellWidth::WideContinuation)
    }

    pub fn is_wide_lead(&self) -> bool {
        matches!(self.width, CellWidth::WideLead)
    }

    /// Number of terminal columns this cell (and its continuation, if any)
    /// occupies: 1 or 2.
    pub fn cell_width(&self) -> u16 {
        match self.width {
            CellWidth::Narrow | CellWidth::WideContinuation => 1,
            CellWidth::WideLead => 2,
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::blank()
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_continuation() {
            Ok(())
        } else {
            f.write_str(self.text())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_is_single_space_default_style() {
        let cell = Cell::blank();
        assert_eq!(cell.text(), " ");
        assert_eq!(cell.style, Style::DEFAULT);
        assert_eq!(cell.cell_width(), 1);
    }

    #[test]
    fn wide_glyph_reports_width_two() {
        let cell = Cell::new("\u{4e2d}", Style::DEFAULT); // 中
        assert!(cell.is_wide_lead());
        assert_eq!(cell.cell_width(), 2);
    }

    #[test]
    fn continuation_renders_as_empty() {
        let cell = Cell::continuation(Style::DEFAULT);
        assert!(cell.is_continuation());
        assert_eq!(format!("{cell}"), "");
    }

    #[test]
    fn narrow_ascii_width_one() {
        let cell = Cell::new("x", Style::DEFAULT);
        assert_eq!(cell.cell_width(), 1);
        assert!(!cell.is_wide_lead());
    }
}
