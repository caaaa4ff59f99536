//! Render caching: re-use a child's last frame until something it actually
//! depends on changes.
//!
//! Grounded on `euporie/core/layout/cache.py`'s `CachedContainer`, which
//! wraps an expensive-to-render child (typically a cell's output) and only
//! re-renders it when: the space it's given changes size, the caller calls
//! `invalidate()` explicitly, or an event it subscribed to during its last
//! render fires. Everything else is a "blit": copy the last frame's cells
//! and mouse handlers to the new position without touching the child at
//! all. [`super::events::EventBus`]/[`super::events::InvalidateFlag`] are
//! the subscription half of this; this module is the cache half.

use crate::cell::Cell;
use crate::layout::Dimension;
use crate::screen::{Screen, WritePosition};
use crate::style::Style;

use super::events::InvalidateFlag;
use super::mouse::MouseHandlers;
use super::{Container, RenderContext};

struct CachedFrame {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
    mouse: MouseHandlers,
    cursor: Option<(u16, u16)>,
}

/// Wraps `content`, re-rendering it only when necessary.
pub struct CachedContainer {
    content: Container,
    invalidate_flag: Option<InvalidateFlag>,
    force_render: bool,
    last_size: Option<(u16, u16)>,
    frame: Option<CachedFrame>,
}

impl CachedContainer {
    pub fn new(content: Container) -> Self {
        Self { content, invalidate_flag: None, force_render: true, last_size: None, frame: None }
    }

    /// Subscribe this cache to an event source; when `flag.take()` would
    /// report true, the next render forces a full re-render instead of
    /// blitting.
    pub fn subscribe(mut self, flag: InvalidateFlag) -> Self {
        self.invalidate_flag = Some(flag);
        self
    }

    /// Force the next render to re-run the child regardless of size or
    /// subscription state.
    pub fn invalidate(&mut self) {
        self.force_render = true;
    }

    pub(super) fn child(&self) -> &Container {
        &self.content
    }

    pub(super) fn child_mut(&mut self) -> &mut Container {
        &mut self.content
    }

    pub(super) fn reset(&mut self) {
        self.content.reset();
        self.frame = None;
        self.force_render = true;
    }

    pub(super) fn preferred_width(&self, max_available: u16) -> Dimension {
        self.content.preferred_width(max_available)
    }

    pub(super) fn preferred_height(&self, width: u16, max_available: u16) -> Dimension {
        self.content.preferred_height(width, max_available)
    }

    fn needs_render(&self, size: (u16, u16)) -> bool {
        if self.force_render || self.frame.is_none() || self.last_size != Some(size) {
            return true;
        }
        self.invalidate_flag.as_ref().is_some_and(InvalidateFlag::take)
    }

    pub(super) fn write_to_screen(
        &mut self,
        screen: &mut Screen,
        mouse_handlers: &mut MouseHandlers,
        pos: WritePosition,
        parent_style: Style,
        ctx: &RenderContext,
    ) {
        let size = (pos.width, pos.height);
        if self.needs_render(size) {
            let mut scratch = Screen::new(pos.width, pos.height);
            let mut scratch_mouse = MouseHandlers::new();
            self.content.write_to_screen(&mut scratch, &mut scratch_mouse, WritePosition::new(0, 0, pos.width, pos.height), parent_style, ctx);
            self.frame = Some(CachedFrame {
                width: pos.width,
                height: pos.height,
                cells: scratch.cells().to_vec(),
                mouse: scratch_mouse,
                cursor: scratch.cursor_position,
            });
            self.last_size = Some(size);
            self.force_render = false;
        }

        let frame = self.frame.as_ref().expect("just populated above");
        for y in 0..frame.height {
            for x in 0..frame.width {
                let idx = y as usize * frame.width as usize + x as usize;
                screen.put(pos.xpos + x, pos.ypos + y, frame.cells[idx].clone());
            }
        }
        mouse_handlers.blit_from(&frame.mouse, pos.xpos, pos.ypos);
        if let Some((cx, cy)) = frame.cursor {
            screen.cursor_position = Some((pos.xpos + cx, pos.ypos + cy));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::StaticControl;
    use crate::container::events::EventBus;
    use crate::container::Window;

    fn ctx() -> RenderContext {
        RenderContext::default()
    }

    #[test]
    fn second_render_at_same_size_blits_instead_of_rerendering() {
        let calls = std::rc::Rc::new(std::cell::Cell::new(0));
        let calls2 = calls.clone();
        struct Counting(std::rc::Rc<std::cell::Cell<u32>>);
        impl crate::control::Control for Counting {
            fn create_content(&mut self, _width: u16) -> crate::control::UIContent {
                self.0.set(self.0.get() + 1);
                crate::control::UIContent::new(1, |_| vec![(Style::DEFAULT, "x".into())])
            }
        }
        let inner = Container::Window(Window::new(Box::new(Counting(calls2))));
        let mut cached = CachedContainer::new(inner);
        let mut screen = Screen::new(4, 4);
        let mut handlers = MouseHandlers::new();
        let pos = WritePosition::new(0, 0, 4, 1);
        cached.write_to_screen(&mut screen, &mut handlers, pos, Style::DEFAULT, &ctx());
        cached.write_to_screen(&mut screen, &mut handlers, pos, Style::DEFAULT, &ctx());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn resize_forces_rerender() {
        let calls = std::rc::Rc::new(std::cell::Cell::new(0));
        let calls2 = calls.clone();
        struct Counting(std::rc::Rc<std::cell::Cell<u32>>);
        impl crate::control::Control for Counting {
            fn create_content(&mut self, _width: u16) -> crate::control::UIContent {
                self.0.set(self.0.get() + 1);
                crate::control::UIContent::new(1, |_| vec![(Style::DEFAULT, "x".into())])
            }
        }
        let inner = Container::Window(Window::new(Box::new(Counting(calls2))));
        let mut cached = CachedContainer::new(inner);
        let mut screen = Screen::new(6, 4);
        let mut handlers = MouseHandlers::new();
        cached.write_to_screen(&mut screen, &mut handlers, WritePosition::new(0, 0, 4, 1), Style::DEFAULT, &ctx());
        cached.write_to_screen(&mut screen, &mut handlers, WritePosition::new(0, 0, 5, 1), Style::DEFAULT, &ctx());
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn subscribed_event_forces_rerender_once() {
        let mut bus = EventBus::new();
        let flag = bus.subscribe("changed");
        let inner = Container::Window(Window::new(Box::new(StaticControl::from_plain_text("a", Style::DEFAULT))));
        let mut cached = CachedContainer::new(inner).subscribe(flag);
        cached.force_render = false;
        cached.frame = Some(CachedFrame { width: 4, height: 1, cells: vec![Cell::blank(); 4], mouse: MouseHandlers::new(), cursor: None });
        cached.last_size = Some((4, 1));
        assert!(!cached.needs_render((4, 1)));
        bus.fire("changed");
        assert!(cached.needs_render((4, 1)));
    }
}
