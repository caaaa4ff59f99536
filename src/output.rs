//! Output buffering and stateful cell rendering.
//!
//! Batches every write for a frame into one buffer so the terminal sees a
//! single syscall, and tracks cursor position/colours/attributes so the
//! renderer only emits escape codes for what actually changed.

use std::io::{self, Write};

use crate::ansi;
use crate::cell::Cell;
use crate::config::ColorDepth;
use crate::style::{Attrs, Rgba};

/// Accumulates output for a single batched write.
#[derive(Debug, Default)]
pub struct OutputBuffer {
    data: Vec<u8>,
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self::with_capacity(16384)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { data: Vec::with_capacity(capacity) }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.data.clear();
    }

    #[inline]
    pub fn write_str(&mut self, s: &str) {
        self.data.extend_from_slice(s.as_bytes());
    }

    pub fn flush_stdout(&mut self) -> io::Result<()> {
        if self.data.is_empty() {
            return Ok(());
        }
        let mut stdout = io::stdout().lock();
        stdout.write_all(&self.data)?;
        stdout.flush()?;
        self.data.clear();
        Ok(())
    }

    pub fn flush_to<W: Write>(&mut self, writer: &mut W) -> io::Result<()> {
        if self.data.is_empty() {
            return Ok(());
        }
        writer.write_all(&self.data)?;
        self.data.clear();
        Ok(())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn as_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.data)
    }
}

impl Write for OutputBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.data.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Renders cells while tracking terminal state (cursor position, last
/// colours, last attributes) to minimize the escape codes emitted.
#[derive(Debug)]
pub struct StatefulCellRenderer {
    last_x: i32,
    last_y: i32,
    last_fg: Option<Rgba>,
    last_bg: Option<Rgba>,
    last_attrs: Attrs,
    depth: ColorDepth,
}

impl StatefulCellRenderer {
    pub fn new(depth: ColorDepth) -> Self {
        Self { last_x: -1, last_y: -1, last_fg: None, last_bg: None, last_attrs: Attrs::NONE, depth }
    }

    pub fn reset(&mut self) {
        self.last_x = -1;
        self.last_y = -1;
        self.last_fg = None;
        self.last_bg = None;
        self.last_attrs = Attrs::NONE;
    }

    /// Render one cell at `(x, y)`, emitting a cursor move only when the
    /// write head isn't already sitting right before it.
    pub fn render_cell(&mut self, output: &mut OutputBuffer, x: u16, y: u16, cell: &Cell) {
        if cell.is_continuation() {
            self.last_x = x as i32;
            self.last_y = y as i32;
            return;
        }

        if y as i32 != self.last_y || x as i32 != self.last_x + 1 {
            ansi::cursor_to(output, x, y).ok();
        }

        self.apply_style(output, cell);
        output.write_str(cell.text());

        self.last_x = x as i32 + (cell.cell_width() as i32 - 1);
        self.last_y = y as i32;
    }

    /// Render a cell with no cursor positioning, for inline/append mode
    /// where output is written sequentially followed by newlines.
    pub fn render_cell_inline(&mut self, output: &mut OutputBuffer, cell: &Cell) {
        if cell.is_continuation() {
            return;
        }
        self.apply_style(output, cell);
        output.write_str(cell.text());
    }

    fn apply_style(&mut self, output: &mut OutputBuffer, cell: &Cell) {
        let attrs = cell.style.attrs;
        if attrs != self.last_attrs {
            ansi::reset(output).ok();
            if !attrs.is_empty() {
                ansi::attrs(output, attrs).ok();
            }
            self.last_fg = None;
            self.last_bg = None;
            self.last_attrs = attrs;
        }

        if self.last_fg != Some(cell.style.fg) {
            ansi::fg(output, cell.style.fg, self.depth).ok();
            self.last_fg = Some(cell.style.fg);
        }
        if self.last_bg != Some(cell.style.bg) {
            ansi::bg(output, cell.style.bg, self.depth).ok();
            self.last_bg = Some(cell.style.bg);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Style;

    #[test]
    fn sequential_cells_skip_cursor_move() {
        let mut renderer = StatefulCellRenderer::new(ColorDepth::TrueColor);
        let mut output = OutputBuffer::new();
        let cell = Cell::new("A", Style::DEFAULT);

        renderer.render_cell(&mut output, 0, 0, &cell);
        let first_len = output.len();

        output.clear();
        renderer.render_cell(&mut output, 1, 0, &cell);
        assert!(output.len() < first_len);
    }

    #[test]
    fn non_sequential_cell_needs_cursor_move() {
        let mut renderer = StatefulCellRenderer::new(ColorDepth::TrueColor);
        let mut output = OutputBuffer::new();
        let cell = Cell::new("X", Style::parse("fg:#ff0000"));
        renderer.render_cell(&mut output, 5, 0, &cell);
        assert!(output.as_str().contains("\x1b[1;6H"));
    }

    #[test]
    fn continuation_cell_emits_nothing() {
        let mut renderer = StatefulCellRenderer::new(ColorDepth::TrueColor);
        let mut output = OutputBuffer::new();
        renderer.render_cell(&mut output, 0, 0, &Cell::continuation(Style::DEFAULT));
        assert!(output.is_empty());
    }

    #[test]
    fn unchanged_colors_are_not_reemitted() {
        let mut renderer = StatefulCellRenderer::new(ColorDepth::TrueColor);
        let mut output = OutputBuffer::new();
        let cell = Cell::new("X", Style::parse("fg:#ff0000 bg:#0000ff"));

        renderer.render_cell(&mut output, 0, 0, &cell);
        let first_len = output.len();
        output.clear();
        renderer.render_cell(&mut output, 10, 0, &cell);
        assert!(output.len() < first_len);
    }
}
