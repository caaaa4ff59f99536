//! The cell grid, write positions, and z-ordered float compositing.
//!
//! Grounded on `euporie`'s `apptk/layout/screen.py`: a [`Screen`] is a flat
//! grid of [`Cell`]s that containers write into through a [`WritePosition`]
//! (their allotted rectangle), plus a queue of deferred "float" draws that
//! run after the main tree so absolutely-positioned overlays (menus,
//! tooltips) land on top regardless of z-index ordering among themselves.

pub mod diff;

use std::collections::BTreeMap;

use crate::cell::Cell;
use crate::style::Style;

/// A container's allotted rectangle within its parent's screen, the
/// equivalent of `prompt_toolkit`'s `WritePosition`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WritePosition {
    pub xpos: u16,
    pub ypos: u16,
    pub width: u16,
    pub height: u16,
}

impl WritePosition {
    pub const fn new(xpos: u16, ypos: u16, width: u16, height: u16) -> Self {
        Self { xpos, ypos, width, height }
    }

    #[inline]
    pub fn left(&self) -> u16 {
        self.xpos
    }

    #[inline]
    pub fn right(&self) -> u16 {
        self.xpos + self.width
    }

    #[inline]
    pub fn top(&self) -> u16 {
        self.ypos
    }

    #[inline]
    pub fn bottom(&self) -> u16 {
        self.ypos + self.height
    }
}

/// A pending absolutely-positioned overlay, queued during the main render
/// pass and drawn afterward in z-index order (lowest first, so later/higher
/// floats land visually on top). Boxed because floats are produced by
/// arbitrary container closures, not a fixed set of variants.
pub type FloatDraw = Box<dyn FnOnce(&mut Screen)>;

/// Z-indexed overlay used while compositing floats: each z-index owns its
/// own sparse cell map, and [`ChainBuffer::flatten`] merges them so a higher
/// z-index's cell always wins over a lower one at the same coordinate.
/// Mirrors `ChainBuffer` in the source this was ported from, which keeps
/// per-z-index `defaultdict`s and builds a `ChainMap` ordered by z-index
/// descending on lookup.
#[derive(Debug, Default)]
pub struct ChainBuffer {
    layers: BTreeMap<i32, BTreeMap<(u16, u16), Cell>>,
}

impl ChainBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, z_index: i32, x: u16, y: u16, cell: Cell) {
        self.layers.entry(z_index).or_default().insert((x, y), cell);
    }

    /// Merge every layer into a single sparse map, highest z-index last so
    /// it overwrites lower layers at the same coordinate.
    pub fn flatten(self) -> BTreeMap<(u16, u16), Cell> {
        let mut out = BTreeMap::new();
        for (_, layer) in self.layers {
            out.extend(layer);
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.layers.values().all(|l| l.is_empty())
    }
}

/// The target grid a render pass writes into: a flat row-major array of
/// cells plus the deferred float queue.
/// Opaque identity for a `Window` container (spec §3: "a set of
/// (window → write-position) records used by controls to locate
/// themselves"). Allocated once per `Window` at construction and stable
/// across renders, so a scrollbar margin drawn by a surrounding `VSplit` can
/// look up where in the viewport its content window last landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WindowId(pub u64);

impl WindowId {
    pub fn next() -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug)]
pub struct Screen {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
    /// Zero-width escape sequences (OSC 8 hyperlink wrappers, OSC 133
    /// shell-integration markers) anchored to a coordinate, emitted
    /// immediately before that cell during rendering without occupying a
    /// column themselves.
    zero_width_escapes: BTreeMap<(u16, u16), String>,
    pending_floats: Vec<(i32, FloatDraw)>,
    pub cursor_position: Option<(u16, u16)>,
    pub show_cursor: bool,
    /// Where each `Window` last painted itself this frame (spec §3).
    window_positions: BTreeMap<WindowId, WritePosition>,
    /// Where each `Window`'s control put the cursor, in screen
    /// coordinates, if it claimed the cursor this frame.
    window_cursors: BTreeMap<WindowId, (u16, u16)>,
}

impl Screen {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::blank(); width as usize * height as usize],
            zero_width_escapes: BTreeMap::new(),
            pending_floats: Vec::new(),
            cursor_position: None,
            show_cursor: true,
            window_positions: BTreeMap::new(),
            window_cursors: BTreeMap::new(),
        }
    }

    pub fn record_window_position(&mut self, id: WindowId, pos: WritePosition) {
        self.window_positions.insert(id, pos);
    }

    pub fn window_position(&self, id: WindowId) -> Option<WritePosition> {
        self.window_positions.get(&id).copied()
    }

    pub fn record_window_cursor(&mut self, id: WindowId, at: (u16, u16)) {
        self.window_cursors.insert(id, at);
    }

    pub fn window_cursor(&self, id: WindowId) -> Option<(u16, u16)> {
        self.window_cursors.get(&id).copied()
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    #[inline]
    fn in_bounds(&self, x: u16, y: u16) -> bool {
        x < self.width && y < self.height
    }

    #[inline]
    fn index(&self, x: u16, y: u16) -> usize {
        y as usize * self.width as usize + x as usize
    }

    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.in_bounds(x, y).then(|| &self.cells[self.index(x, y)])
    }

    /// Write a single cell, clipped silently to the screen bounds.
    pub fn put(&mut self, x: u16, y: u16, cell: Cell) {
        if self.in_bounds(x, y) {
            let idx = self.index(x, y);
            self.cells[idx] = cell;
        }
    }

    pub fn put_escape(&mut self, x: u16, y: u16, escape: String) {
        self.zero_width_escapes.insert((x, y), escape);
    }

    pub fn escape_at(&self, x: u16, y: u16) -> Option<&str> {
        self.zero_width_escapes.get(&(x, y)).map(String::as_str)
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// All zero-width escapes anchored this frame, for `diff::PreviousFrame`
    /// to snapshot so the next frame can tell an escape-only change from no
    /// change at all.
    pub(crate) fn escapes(&self) -> &BTreeMap<(u16, u16), String> {
        &self.zero_width_escapes
    }

    /// Apply `style` to every cell inside `pos`, cascading it either before
    /// or after each cell's existing style. `after = true` lets a decorator
    /// (e.g. a focus highlight) override what the child already drew;
    /// `after = false` lets content drawn later win, matching
    /// `fill_area`'s `after` parameter in the console this mirrors.
    pub fn fill_area(&mut self, pos: WritePosition, style: Style, after: bool) {
        let xmin = pos.left();
        let xmax = pos.right().min(self.width);
        let ymax = pos.bottom().min(self.height);
        for y in pos.top()..ymax {
            for x in xmin..xmax {
                let idx = self.index(x, y);
                let existing = self.cells[idx].style;
                let merged = if after { existing.cascade(style) } else { style.cascade(existing) };
                self.cells[idx].style = merged;
            }
        }
    }

    /// Queue an absolutely-positioned overlay to draw once the main tree has
    /// finished. `z_index` breaks ties among multiple floats; within a tie,
    /// later-queued floats draw later (and so land on top).
    pub fn queue_float(&mut self, z_index: i32, draw: FloatDraw) {
        self.pending_floats.push((z_index, draw));
    }

    /// Draw every queued float in ascending z-index order. New floats may
    /// be queued by a float's own draw closure (e.g. a menu opening a
    /// submenu), so this keeps popping the lowest-z-index pending entry and
    /// re-sorting rather than draining a fixed snapshot up front.
    pub fn draw_all_floats(&mut self) {
        while !self.pending_floats.is_empty() {
            self.pending_floats.sort_by_key(|(z, _)| *z);
            let (_, draw) = self.pending_floats.remove(0);
            draw(self);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_clips_out_of_bounds_silently() {
        let mut screen = Screen::new(4, 2);
        screen.put(10, 10, Cell::new("x", Style::DEFAULT));
        assert_eq!(screen.get(10, 10), None);
    }

    #[test]
    fn fill_area_cascades_style_over_existing_content() {
        let mut screen = Screen::new(4, 2);
        screen.put(0, 0, Cell::new("a", Style::parse("fg:#111111")));
        screen.fill_area(WritePosition::new(0, 0, 4, 2), Style::parse("bg:#222222"), true);
        let cell = screen.get(0, 0).unwrap();
        assert_eq!(cell.style.bg, crate::style::Rgba::rgb(0x22, 0x22, 0x22));
        assert_eq!(cell.style.fg, crate::style::Rgba::rgb(0x11, 0x11, 0x11));
    }

    #[test]
    fn chain_buffer_flatten_prefers_higher_z_index() {
        let mut chain = ChainBuffer::new();
        chain.set(0, 1, 1, Cell::new("low", Style::DEFAULT));
        chain.set(5, 1, 1, Cell::new("high", Style::DEFAULT));
        let flat = chain.flatten();
        assert_eq!(flat.get(&(1, 1)).unwrap().text(), "high");
    }

    #[test]
    fn floats_draw_in_ascending_z_order() {
        let mut screen = Screen::new(4, 1);
        let order = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let o1 = order.clone();
        let o2 = order.clone();
        screen.queue_float(5, Box::new(move |_| o1.borrow_mut().push(5)));
        screen.queue_float(1, Box::new(move |_| o2.borrow_mut().push(1)));
        screen.draw_all_floats();
        assert_eq!(*order.borrow(), vec![1, 5]);
    }

    #[test]
    fn float_can_queue_another_float() {
        let mut screen = Screen::new(4, 1);
        let log = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let outer_log = log.clone();
        screen.queue_float(
            0,
            Box::new(move |s| {
                outer_log.borrow_mut().push(0);
                let inner_log = outer_log.clone();
                s.queue_float(1, Box::new(move |_| inner_log.borrow_mut().push(1)));
            }),
        );
        screen.draw_all_floats();
        assert_eq!(*log.borrow(), vec![0, 1]);
    }
}
