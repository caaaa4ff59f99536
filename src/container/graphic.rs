//! The leaf container that places a [`crate::graphics::GraphicControl`] on
//! screen. Unlike `Window`, it never goes through [`Control`]'s
//! fragment/line pipeline — an inline image is either a single zero-width
//! escape anchored at the top-left cell of a blank grid (sixel, iTerm,
//! Kitty direct placement) or, for Kitty's Unicode-placeholder protocol, a
//! real grid of styled placeholder glyphs — neither of which fits
//! "a line is a list of styled fragments". It gets direct [`Screen`] access
//! the same way [`super::PrintingContainer`] and `Window` do.

use crate::graphics::{Bbox, GraphicControl, Protocol};
use crate::layout::Dimension;
use crate::screen::{Screen, WritePosition};
use crate::style::Style;

use super::mouse::MouseHandlers;

pub struct GraphicsContainer {
    control: GraphicControl,
    bbox: Bbox,
}

impl GraphicsContainer {
    pub fn new(control: GraphicControl) -> Self {
        Self { control, bbox: Bbox::default() }
    }

    /// Inset the image's allotted rectangle, e.g. when a scrolling
    /// container only shows the bottom half of a cell that hasn't fully
    /// scrolled into view.
    pub fn set_bbox(&mut self, bbox: Bbox) {
        self.bbox = bbox;
    }

    pub(super) fn reset(&mut self) {
        self.control.reset();
        self.bbox = Bbox::default();
    }

    pub(super) fn preferred_width(&self, max_available: u16) -> Dimension {
        Dimension::new(0, self.control.preferred_width(max_available), max_available, 1)
    }

    pub(super) fn preferred_height(&self, width: u16, max_available: u16) -> Dimension {
        Dimension::new(0, self.control.preferred_height(width, max_available), u16::MAX, 1)
    }

    pub(super) fn write_to_screen(
        &mut self,
        screen: &mut Screen,
        _mouse_handlers: &mut MouseHandlers,
        pos: WritePosition,
        parent_style: Style,
    ) {
        screen.fill_area(pos, parent_style, false);
        if pos.width == 0 || pos.height == 0 {
            return;
        }

        if self.control.protocol() == Protocol::KittyUnicode {
            if let Ok(Some(setup)) = self.control.ensure_kitty_unicode_placement(pos.width, pos.height) {
                // Setup commands (transfer + virtual placement) are
                // one-time and have no visible cell of their own to
                // attach to; emit them at the grid's first cell same as
                // any other escape.
                screen.put_escape(pos.xpos, pos.ypos, setup);
            }
            for row in 0..pos.height {
                for col in 0..pos.width {
                    let cell = self.control.placeholder_cell(row, col, parent_style);
                    screen.put(pos.xpos + col, pos.ypos + row, cell);
                }
            }
            return;
        }

        if let Ok(rendered) = self.control.render(pos.width, pos.height, self.bbox) {
            if let Some(cmd) = rendered.command {
                screen.put_escape(pos.xpos, pos.ypos, cmd);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Multiplexer;
    use crate::graphics::Datum;
    use image::{DynamicImage, ImageFormat};
    use std::io::Cursor;

    fn tiny_png() -> Vec<u8> {
        let img = DynamicImage::new_rgba8(4, 4);
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn sixel_graphic_writes_blank_grid_and_one_escape() {
        let datum = Datum::from_bytes(&tiny_png()).unwrap();
        let control = GraphicControl::new(datum, Protocol::Sixel, (10, 20), Multiplexer::None);
        let mut graphic = GraphicsContainer::new(control);
        let mut screen = Screen::new(4, 2);
        let mut handlers = MouseHandlers::new();
        graphic.write_to_screen(&mut screen, &mut handlers, WritePosition::new(0, 0, 4, 2), Style::DEFAULT);
        assert!(screen.escape_at(0, 0).is_some());
    }

    #[test]
    fn kitty_unicode_graphic_fills_every_cell_with_a_placeholder() {
        let datum = Datum::from_bytes(&tiny_png()).unwrap();
        let control = GraphicControl::new(datum, Protocol::KittyUnicode, (10, 20), Multiplexer::None);
        let mut graphic = GraphicsContainer::new(control);
        let mut screen = Screen::new(2, 2);
        let mut handlers = MouseHandlers::new();
        graphic.write_to_screen(&mut screen, &mut handlers, WritePosition::new(0, 0, 2, 2), Style::DEFAULT);
        assert!(screen.get(1, 1).unwrap().text().starts_with('\u{10eeee}'));
    }

    #[test]
    fn zero_size_position_is_a_no_op() {
        let datum = Datum::from_bytes(&tiny_png()).unwrap();
        let control = GraphicControl::new(datum, Protocol::Sixel, (10, 20), Multiplexer::None);
        let mut graphic = GraphicsContainer::new(control);
        let mut screen = Screen::new(4, 2);
        let mut handlers = MouseHandlers::new();
        graphic.write_to_screen(&mut screen, &mut handlers, WritePosition::new(0, 0, 0, 0), Style::DEFAULT);
        assert!(screen.escape_at(0, 0).is_none());
    }
}
