//! Per-cell mouse routing.
//!
//! Grounded on `euporie/core/layout/mouse.py`: a sparse grid parallel to the
//! `Screen`, mapping each cell a container claimed to the handler that
//! should see clicks/drags/scrolls landing there. `CachedContainer::blit`
//! (§4.5) copies entries from a cached child's grid into the parent's,
//! wrapping each handler so the coordinates it receives stay in the child's
//! own frame of reference regardless of where the blit placed it.

use std::collections::BTreeMap;
use std::rc::Rc;

use crate::input::mouse::MouseEvent;

/// Whether a mouse handler consumed the event. An unhandled `ScrollUp`/
/// `ScrollDown` is how a `ScrollingContainer` falls through to terminal
/// scrollback (spec §1) or a surrounding container's own scroll handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseHandled {
    Handled,
    NotHandled,
}

pub type MouseHandler = Rc<dyn Fn(&MouseEvent) -> MouseHandled>;

/// Sparse per-cell mouse handler grid, one per `Screen`.
#[derive(Clone, Default)]
pub struct MouseHandlers {
    grid: BTreeMap<(u16, u16), MouseHandler>,
}

impl MouseHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, x: u16, y: u16, handler: MouseHandler) {
        self.grid.insert((x, y), handler);
    }

    /// Fill every cell in `[x0, x1) x [y0, y1)` with the same handler — the
    /// common case, since most containers claim a whole rectangle at once.
    pub fn fill(&mut self, x0: u16, y0: u16, x1: u16, y1: u16, handler: MouseHandler) {
        for y in y0..y1 {
            for x in x0..x1 {
                self.grid.insert((x, y), handler.clone());
            }
        }
    }

    pub fn get(&self, x: u16, y: u16) -> Option<&MouseHandler> {
        self.grid.get(&(x, y))
    }

    /// Dispatch `event` to whatever is registered at its coordinate.
    /// Returns `NotHandled` both when nothing is registered and when the
    /// registered handler declines the event, so callers (e.g. the
    /// scroll-to-scrollback fallback) can treat the two identically.
    pub fn dispatch(&self, event: &MouseEvent) -> MouseHandled {
        match self.grid.get(&(event.x, event.y)) {
            Some(handler) => handler(event),
            None => MouseHandled::NotHandled,
        }
    }

    /// Copy every entry from `child` into `self`, offsetting positions by
    /// `(dx, dy)` and wrapping each handler so it still sees the
    /// *child-local* coordinates it was registered with, not the blit
    /// destination (spec §4.5 `blit`).
    pub fn blit_from(&mut self, child: &MouseHandlers, dx: u16, dy: u16) {
        for (&(x, y), handler) in &child.grid {
            let wrapped = wrap_offset(handler.clone(), x, y);
            self.grid.insert((x + dx, y + dy), wrapped);
        }
    }
}

/// Wrap `handler` so that whatever absolute coordinate it's invoked at, the
/// event it sees reports `(local_x, local_y)` instead.
fn wrap_offset(handler: MouseHandler, local_x: u16, local_y: u16) -> MouseHandler {
    Rc::new(move |ev: &MouseEvent| {
        let local = MouseEvent { x: local_x, y: local_y, ..*ev };
        handler(&local)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::mouse::MouseKind;
    use crate::input::vt100::Modifiers;

    fn ev(x: u16, y: u16) -> MouseEvent {
        MouseEvent { kind: MouseKind::Move, x, y, fx: 0.0, fy: 0.0, modifiers: Modifiers::NONE }
    }

    #[test]
    fn dispatch_calls_the_registered_handler() {
        let mut handlers = MouseHandlers::new();
        handlers.set(2, 3, Rc::new(|_: &MouseEvent| MouseHandled::Handled));
        assert_eq!(handlers.dispatch(&ev(2, 3)), MouseHandled::Handled);
        assert_eq!(handlers.dispatch(&ev(2, 4)), MouseHandled::NotHandled);
    }

    #[test]
    fn blit_preserves_child_local_coordinates() {
        let mut child = MouseHandlers::new();
        let seen = Rc::new(std::cell::RefCell::new(None));
        let seen2 = seen.clone();
        child.set(1, 1, Rc::new(move |ev: &MouseEvent| {
            *seen2.borrow_mut() = Some((ev.x, ev.y));
            MouseHandled::Handled
        }));

        let mut parent = MouseHandlers::new();
        parent.blit_from(&child, 5, 5);
        parent.dispatch(&ev(6, 6));
        assert_eq!(*seen.borrow(), Some((1, 1)));
    }

    #[test]
    fn fill_covers_whole_rectangle() {
        let mut handlers = MouseHandlers::new();
        handlers.fill(0, 0, 2, 2, Rc::new(|_: &MouseEvent| MouseHandled::Handled));
        assert_eq!(handlers.dispatch(&ev(1, 1)), MouseHandled::Handled);
        assert_eq!(handlers.dispatch(&ev(2, 2)), MouseHandled::NotHandled);
    }
}
