//! Viewport-at-a-time rendering of a long, possibly dynamic child list.
//!
//! Grounded on `euporie/core/layout/containers.py`'s `ScrollingContainer`
//! (the engine behind a notebook's cell list): rather than laying out every
//! child up front, it tracks which child currently sits at the top of the
//! viewport and how many of that child's rows are scrolled out of view,
//! then renders outward from there until the viewport is full. Each child
//! is wrapped in a [`super::cached::CachedContainer`] so scrolling past a
//! child and back re-blits its last frame instead of re-rendering it.
//!
//! Mouse scrolling and selection are routed back into this container
//! through a small piece of shared, interior-mutable state
//! ([`PendingInput`]) rather than a direct method call, since mouse
//! handlers are `'static` closures stored in [`super::mouse::MouseHandlers`]
//! and outlive the `&mut self` borrow that installed them — the same shape
//! [`super::events::InvalidateFlag`] uses for cache invalidation.

use std::cell::Cell as StdCell;
use std::ops::Range;
use std::rc::Rc;

use crate::input::mouse::{MouseEvent, MouseKind};
use crate::layout::Dimension;
use crate::screen::{Screen, WritePosition};
use crate::style::Style;

use super::cached::CachedContainer;
use super::mouse::{MouseHandled, MouseHandler, MouseHandlers};
use super::{Container, RenderContext};

/// What a scrollbar margin (drawn by the surrounding `VSplit`) needs in
/// order to draw itself: how tall the content is in total and where the
/// viewport currently sits within it.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowRenderInfo {
    pub content_height: u16,
    pub viewport_height: u16,
    pub scroll_offset: u16,
}

/// Scroll and selection requests raised by mouse handlers installed during
/// the previous render, drained at the start of the next one.
#[derive(Default)]
struct PendingInput {
    scroll: StdCell<i32>,
    select: StdCell<Option<(usize, bool)>>,
}

pub struct ScrollingContainer {
    children: Vec<CachedContainer>,
    /// Row-height of each child last time it was measured; `None` until a
    /// child has been rendered at least once.
    known_sizes: Vec<Option<u16>>,
    /// Index of the child currently at (or straddling) the top of the
    /// viewport.
    top_index: usize,
    /// Rows of `top_index`'s content scrolled above the viewport.
    top_hidden_rows: u16,
    /// Currently selected children, extended by shift/ctrl-click.
    selected_slice: Range<usize>,
    index_positions: Vec<i32>,
    visible_indices: Vec<usize>,
    render_info: Option<WindowRenderInfo>,
    pending: Rc<PendingInput>,
}

impl ScrollingContainer {
    pub fn new(children: Vec<Container>) -> Self {
        let n = children.len();
        Self {
            children: children.into_iter().map(CachedContainer::new).collect(),
            known_sizes: vec![None; n],
            top_index: 0,
            top_hidden_rows: 0,
            selected_slice: 0..n.min(1),
            index_positions: vec![0; n],
            visible_indices: Vec::new(),
            render_info: None,
            pending: Rc::new(PendingInput::default()),
        }
    }

    pub fn render_info(&self) -> Option<WindowRenderInfo> {
        self.render_info
    }

    pub fn visible_indices(&self) -> &[usize] {
        &self.visible_indices
    }

    /// Request a scroll of `n` rows (positive = reveal later content,
    /// negative = reveal earlier content), applied on the next render.
    /// Returns whether the request was accepted: refused when it would
    /// scroll the already-topmost row further up, or the already-bottommost
    /// row further down.
    pub fn scroll(&mut self, n: i32) -> bool {
        if n == 0 || self.children.is_empty() {
            return false;
        }
        if n < 0 && self.top_index == 0 && self.top_hidden_rows == 0 {
            return false;
        }
        if n > 0 {
            if let Some(info) = &self.render_info {
                if info.content_height <= info.viewport_height || info.scroll_offset + info.viewport_height >= info.content_height {
                    return false;
                }
            }
        }
        let cur = self.pending.scroll.get();
        self.pending.scroll.set(cur + n);
        true
    }

    fn select(&mut self, idx: usize, extend: bool) {
        if extend {
            let start = self.selected_slice.start.min(idx);
            let end = self.selected_slice.end.max(idx + 1);
            self.selected_slice = start..end;
        } else {
            self.selected_slice = idx..idx + 1;
        }
    }

    pub(super) fn reset(&mut self) {
        for child in &mut self.children {
            child.reset();
        }
        for h in &mut self.known_sizes {
            *h = None;
        }
    }

    pub(super) fn children_refs(&self) -> Vec<&Container> {
        self.children.iter().map(CachedContainer::child).collect()
    }

    pub(super) fn children_refs_mut(&mut self) -> Vec<&mut Container> {
        self.children.iter_mut().map(CachedContainer::child_mut).collect()
    }

    pub(super) fn preferred_width(&self, _max_available: u16) -> Dimension {
        Dimension::fill(1)
    }

    pub(super) fn preferred_height(&self, _width: u16, _max_available: u16) -> Dimension {
        Dimension::fill(1)
    }

    fn height_of(&mut self, i: usize, width: u16) -> u16 {
        if let Some(h) = self.known_sizes[i] {
            return h;
        }
        let h = self.children[i].preferred_height(width, u16::MAX).preferred.max(1);
        self.known_sizes[i] = Some(h);
        h
    }

    fn average_known(&self) -> u16 {
        let known: Vec<u16> = self.known_sizes.iter().filter_map(|h| *h).collect();
        if known.is_empty() {
            1
        } else {
            (known.iter().map(|&h| h as u32).sum::<u32>() / known.len() as u32).max(1) as u16
        }
    }

    fn total_height(&self) -> u16 {
        let avg = self.average_known();
        self.known_sizes.iter().map(|h| h.unwrap_or(avg) as u32).sum::<u32>().min(u16::MAX as u32) as u16
    }

    fn scroll_offset_rows(&self) -> u16 {
        let avg = self.average_known();
        let above: u32 = self.known_sizes[..self.top_index].iter().map(|h| h.unwrap_or(avg) as u32).sum();
        (above + self.top_hidden_rows as u32).min(u16::MAX as u32) as u16
    }

    /// Drain the pending scroll delta accumulated by mouse handlers since
    /// the last frame and walk `top_index`/`top_hidden_rows` by that many
    /// rows, stepping child-by-child so partial visibility is tracked
    /// exactly rather than approximated.
    fn apply_scrolling(&mut self, width: u16) {
        let delta = self.pending.scroll.replace(0);
        let n = self.children.len();
        if delta > 0 {
            for _ in 0..delta {
                let h = self.height_of(self.top_index, width);
                if self.top_hidden_rows + 1 < h {
                    self.top_hidden_rows += 1;
                } else if self.top_index + 1 < n {
                    self.top_index += 1;
                    self.top_hidden_rows = 0;
                } else {
                    break;
                }
            }
        } else if delta < 0 {
            for _ in 0..(-delta) {
                if self.top_hidden_rows > 0 {
                    self.top_hidden_rows -= 1;
                } else if self.top_index > 0 {
                    self.top_index -= 1;
                    let h = self.height_of(self.top_index, width);
                    self.top_hidden_rows = h.saturating_sub(1);
                } else {
                    break;
                }
            }
        }
        if let Some((idx, extend)) = self.pending.select.take() {
            self.select(idx.min(n.saturating_sub(1)), extend);
        }
    }

    fn scroll_mouse_handler(&self) -> MouseHandler {
        let pending = self.pending.clone();
        Rc::new(move |ev: &MouseEvent| match ev.kind {
            MouseKind::ScrollUp => {
                pending.scroll.set(pending.scroll.get() - 1);
                MouseHandled::Handled
            }
            MouseKind::ScrollDown => {
                pending.scroll.set(pending.scroll.get() + 1);
                MouseHandled::Handled
            }
            _ => MouseHandled::NotHandled,
        })
    }

    fn render_child(
        &mut self,
        i: usize,
        screen: &mut Screen,
        mouse_handlers: &mut MouseHandlers,
        pos: WritePosition,
        row: i32,
        style: Style,
        ctx: &RenderContext,
    ) -> u16 {
        let width = pos.width;
        let height = self.height_of(i, width);

        let mut scratch = Screen::new(width, height);
        let mut scratch_mouse = MouseHandlers::new();
        self.children[i].write_to_screen(&mut scratch, &mut scratch_mouse, WritePosition::new(0, 0, width, height), style, ctx);

        let viewport_height = pos.height as i32;
        let fallback = self.scroll_mouse_handler();
        let pending = self.pending.clone();
        for r in 0..height {
            let abs_row = row + r as i32;
            if abs_row < 0 || abs_row >= viewport_height {
                continue;
            }
            let y = pos.ypos + abs_row as u16;
            for x in 0..width {
                if let Some(cell) = scratch.get(x, r) {
                    screen.put(pos.xpos + x, y, cell.clone());
                }
            }
            for x in 0..width {
                let local_x = x;
                let local_y = r;
                let dst_x = pos.xpos + x;
                let child_handler = scratch_mouse.get(local_x, local_y).cloned();
                let back = fallback.clone();
                let pending_select = pending.clone();
                let wrapped: MouseHandler = Rc::new(move |ev: &MouseEvent| {
                    if let Some(handler) = &child_handler {
                        let local = MouseEvent { x: local_x, y: local_y, ..*ev };
                        let result = handler(&local);
                        if result == MouseHandled::Handled {
                            return result;
                        }
                    }
                    if matches!(ev.kind, MouseKind::ScrollUp | MouseKind::ScrollDown) {
                        return back(ev);
                    }
                    if matches!(ev.kind, MouseKind::Press(_)) {
                        pending_select.select.set(Some((i, ev.modifiers.contains(crate::input::vt100::Modifiers::SHIFT) || ev.modifiers.contains(crate::input::vt100::Modifiers::CTRL))));
                        return MouseHandled::Handled;
                    }
                    MouseHandled::NotHandled
                });
                mouse_handlers.set(dst_x, y, wrapped);
            }
        }
        height
    }

    pub(super) fn write_to_screen(
        &mut self,
        screen: &mut Screen,
        mouse_handlers: &mut MouseHandlers,
        pos: WritePosition,
        parent_style: Style,
        ctx: &RenderContext,
    ) {
        screen.fill_area(pos, parent_style, false);
        if self.children.is_empty() {
            self.render_info = Some(WindowRenderInfo { content_height: 0, viewport_height: pos.height, scroll_offset: 0 });
            return;
        }

        let n = self.children.len();
        if self.known_sizes.len() != n {
            self.known_sizes.resize(n, None);
            self.index_positions.resize(n, 0);
        }
        if self.top_index >= n {
            self.top_index = n - 1;
            self.top_hidden_rows = 0;
        }

        self.apply_scrolling(pos.width);

        // If everything fits in the viewport, lock scrolled-to-top.
        if self.total_height() <= pos.height {
            self.top_index = 0;
            self.top_hidden_rows = 0;
        }

        self.visible_indices.clear();
        self.index_positions.iter_mut().for_each(|p| *p = 0);

        let viewport_height = pos.height as i32;
        let mut row: i32 = -(self.top_hidden_rows as i32);
        let mut i = self.top_index;
        while i < n && row < viewport_height {
            let h = self.render_child(i, screen, mouse_handlers, pos, row, parent_style, ctx) as i32;
            self.index_positions[i] = row;
            self.visible_indices.push(i);
            row += h;
            i += 1;
        }

        if row < viewport_height {
            let gap_top = row.max(0) as u16;
            let gap_pos = WritePosition::new(pos.xpos, pos.ypos + gap_top, pos.width, pos.height - gap_top);
            screen.fill_area(gap_pos, parent_style, false);
            let handler = self.scroll_mouse_handler();
            mouse_handlers.fill(gap_pos.left(), gap_pos.top(), gap_pos.right(), gap_pos.bottom(), handler);
        }

        self.render_info = Some(WindowRenderInfo {
            content_height: self.total_height(),
            viewport_height: pos.height,
            scroll_offset: self.scroll_offset_rows(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::StaticControl;
    use crate::container::Window;

    fn line(i: usize) -> Container {
        Container::Window(Window::new(Box::new(StaticControl::from_plain_text(&format!("row {i}"), Style::DEFAULT))))
    }

    fn ctx() -> RenderContext {
        RenderContext::default()
    }

    #[test]
    fn scrolling_down_through_many_single_row_children_lands_exactly() {
        let children: Vec<Container> = (0..1000).map(line).collect();
        let mut s = ScrollingContainer::new(children);
        let mut screen = Screen::new(10, 1);
        let mut handlers = MouseHandlers::new();
        let pos = WritePosition::new(0, 0, 10, 1);

        s.write_to_screen(&mut screen, &mut handlers, pos, Style::DEFAULT, &ctx());
        for _ in 0..500 {
            s.scroll(1);
            s.write_to_screen(&mut screen, &mut handlers, pos, Style::DEFAULT, &ctx());
        }
        assert_eq!(s.top_index, 500);
        assert_eq!(s.top_hidden_rows, 0);

        for _ in 0..1000 {
            s.scroll(-1);
            s.write_to_screen(&mut screen, &mut handlers, pos, Style::DEFAULT, &ctx());
        }
        assert_eq!(s.top_index, 0);
        assert_eq!(s.top_hidden_rows, 0);
        // Further upward scroll past the top is refused.
        assert!(!s.scroll(-1));
    }

    #[test]
    fn empty_container_renders_without_panicking() {
        let mut s = ScrollingContainer::new(Vec::new());
        let mut screen = Screen::new(10, 4);
        let mut handlers = MouseHandlers::new();
        s.write_to_screen(&mut screen, &mut handlers, WritePosition::new(0, 0, 10, 4), Style::DEFAULT, &ctx());
        assert_eq!(s.render_info().unwrap().content_height, 0);
    }

    #[test]
    fn fully_fitting_content_locks_to_top() {
        let children: Vec<Container> = (0..3).map(line).collect();
        let mut s = ScrollingContainer::new(children);
        let mut screen = Screen::new(10, 10);
        let mut handlers = MouseHandlers::new();
        let pos = WritePosition::new(0, 0, 10, 10);
        s.write_to_screen(&mut screen, &mut handlers, pos, Style::DEFAULT, &ctx());
        assert_eq!(s.top_index, 0);
        assert_eq!(s.visible_indices(), &[0, 1, 2]);
    }

    #[test]
    fn scroll_down_is_refused_once_content_fits_entirely() {
        let children: Vec<Container> = (0..3).map(line).collect();
        let mut s = ScrollingContainer::new(children);
        let mut screen = Screen::new(10, 10);
        let mut handlers = MouseHandlers::new();
        let pos = WritePosition::new(0, 0, 10, 10);
        s.write_to_screen(&mut screen, &mut handlers, pos, Style::DEFAULT, &ctx());
        assert!(!s.scroll(1));
    }
}
