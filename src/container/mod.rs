//! The container tree: everything that owns screen real estate.
//!
//! Grounded on `euporie/apptk/layout/layout__.py` (the `HSplit`/`VSplit`/
//! `Window`/`FloatContainer`/`ConditionalContainer` family `euporie` builds
//! its UI from) and on REDESIGN FLAGS §9, which asks for "a single
//! polymorphic dispatch point instead of one trait per container kind".
//! `prompt_toolkit` itself gets there with an ABC every container
//! subclasses; the idiomatic Rust shape for a *closed* set of container
//! kinds is a tagged enum with inherent methods matching on it, which is
//! what [`Container`] is — no `dyn Trait`, no vtable, and `match`
//! exhaustiveness means the compiler catches a new variant missing an arm.

pub mod cached;
pub mod decorators;
pub mod events;
pub mod graphic;
pub mod mouse;
pub mod scrolling;

use std::rc::Rc;

use unicode_segmentation::UnicodeSegmentation;

use crate::cell::Cell;
use crate::control::{Control, KeyBindings, StyledFragment};
use crate::input::KeyPress;
use crate::layout::{self, Dimension};
use crate::screen::{Screen, WindowId, WritePosition};
use crate::style::Style;

use mouse::{MouseHandled, MouseHandlers};

/// Ambient render-time facts no single container owns: which `Window` has
/// focus (for cursor placement and [`decorators::FocusedStyle`]) and where
/// the mouse last was (for hover highlighting without a real mouse event).
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderContext {
    pub focused_window: Option<WindowId>,
    pub last_mouse_position: Option<(u16, u16)>,
}

/// A boolean condition evaluated fresh every render — "is this window
/// focused", "is the terminal at least 80 columns". `ConditionalContainer`
/// and `FocusedStyle` are both just a filter plus something to gate on it.
pub type Filter = Rc<dyn Fn(&RenderContext) -> bool>;

/// Every container kind in the tree. Variants that wrap meaningfully-sized
/// logic (`CachedContainer`, `ScrollingContainer`, the decorators) live in
/// their own module and are boxed here to keep this enum's own size small.
pub enum Container {
    Window(Window),
    HSplit(Split),
    VSplit(Split),
    Float(FloatContainer),
    Conditional(Box<ConditionalContainer>),
    Decorator(Box<decorators::Decorator>),
    Cached(Box<cached::CachedContainer>),
    Scrolling(Box<scrolling::ScrollingContainer>),
    Printing(Box<PrintingContainer>),
    Graphics(Box<graphic::GraphicsContainer>),
}

impl Container {
    /// Drop any per-render memo (a `CachedContainer`'s last frame, a
    /// `ScrollingContainer`'s measured child heights) so the next render
    /// starts clean. Recurses into every child.
    pub fn reset(&mut self) {
        match self {
            Container::Window(w) => w.reset(),
            Container::HSplit(s) | Container::VSplit(s) => s.reset(),
            Container::Float(f) => f.reset(),
            Container::Conditional(c) => c.content.reset(),
            Container::Decorator(d) => d.reset(),
            Container::Cached(c) => c.reset(),
            Container::Scrolling(s) => s.reset(),
            Container::Printing(p) => p.reset(),
            Container::Graphics(g) => g.reset(),
        }
    }

    pub fn preferred_width(&self, max_available: u16) -> Dimension {
        match self {
            Container::Window(w) => w.preferred_width(max_available),
            Container::HSplit(s) => s.preferred_width_cross(max_available),
            Container::VSplit(s) => s.preferred_width_main(max_available),
            Container::Float(f) => f.content.preferred_width(max_available),
            Container::Conditional(c) => c.preferred_width(max_available),
            Container::Decorator(d) => d.preferred_width(max_available),
            Container::Cached(c) => c.preferred_width(max_available),
            Container::Scrolling(s) => s.preferred_width(max_available),
            Container::Printing(p) => p.preferred_width(max_available),
            Container::Graphics(g) => g.preferred_width(max_available),
        }
    }

    pub fn preferred_height(&self, width: u16, max_available: u16) -> Dimension {
        match self {
            Container::Window(w) => w.preferred_height(width, max_available),
            Container::HSplit(s) => s.preferred_height_main(width, max_available),
            Container::VSplit(s) => s.preferred_height_cross(width, max_available),
            Container::Float(f) => f.content.preferred_height(width, max_available),
            Container::Conditional(c) => c.preferred_height(width, max_available),
            Container::Decorator(d) => d.preferred_height(width, max_available),
            Container::Cached(c) => c.preferred_height(width, max_available),
            Container::Scrolling(s) => s.preferred_height(width, max_available),
            Container::Printing(p) => p.preferred_height(width, max_available),
            Container::Graphics(g) => g.preferred_height(width, max_available),
        }
    }

    pub fn write_to_screen(
        &mut self,
        screen: &mut Screen,
        mouse_handlers: &mut MouseHandlers,
        pos: WritePosition,
        parent_style: Style,
        ctx: &RenderContext,
    ) {
        match self {
            Container::Window(w) => w.write_to_screen(screen, mouse_handlers, pos, parent_style, ctx),
            Container::HSplit(s) => s.write_to_screen(screen, mouse_handlers, pos, parent_style, ctx, Axis::Horizontal),
            Container::VSplit(s) => s.write_to_screen(screen, mouse_handlers, pos, parent_style, ctx, Axis::Vertical),
            Container::Float(f) => f.write_to_screen(screen, mouse_handlers, pos, parent_style, ctx),
            Container::Conditional(c) => c.write_to_screen(screen, mouse_handlers, pos, parent_style, ctx),
            Container::Decorator(d) => d.write_to_screen(screen, mouse_handlers, pos, parent_style, ctx),
            Container::Cached(c) => c.write_to_screen(screen, mouse_handlers, pos, parent_style, ctx),
            Container::Scrolling(s) => s.write_to_screen(screen, mouse_handlers, pos, parent_style, ctx),
            Container::Printing(p) => p.write_to_screen(screen, mouse_handlers, pos, parent_style),
            Container::Graphics(g) => g.write_to_screen(screen, mouse_handlers, pos, parent_style),
        }
    }

    pub fn get_children(&self) -> Vec<&Container> {
        match self {
            Container::Window(_) => Vec::new(),
            Container::HSplit(s) | Container::VSplit(s) => s.children.iter().collect(),
            Container::Float(f) => {
                let mut out = vec![f.content.as_ref()];
                out.extend(f.floats.iter().map(|fl| &fl.content));
                out
            }
            Container::Conditional(c) => vec![&c.content],
            Container::Decorator(d) => d.child().into_iter().collect(),
            Container::Cached(c) => vec![c.child()],
            Container::Scrolling(s) => s.children_refs(),
            Container::Printing(_) => Vec::new(),
            Container::Graphics(_) => Vec::new(),
        }
    }

    pub fn get_children_mut(&mut self) -> Vec<&mut Container> {
        match self {
            Container::Window(_) => Vec::new(),
            Container::HSplit(s) | Container::VSplit(s) => s.children.iter_mut().collect(),
            Container::Float(f) => {
                let mut out = vec![f.content.as_mut()];
                out.extend(f.floats.iter_mut().map(|fl| &mut fl.content));
                out
            }
            Container::Conditional(c) => vec![&mut c.content],
            Container::Decorator(d) => d.child_mut().into_iter().collect(),
            Container::Cached(c) => vec![c.child_mut()],
            Container::Scrolling(s) => s.children_refs_mut(),
            Container::Printing(_) => Vec::new(),
            Container::Graphics(_) => Vec::new(),
        }
    }

    /// Key bindings contributed by this container and every descendant,
    /// gathered depth-first.
    pub fn get_key_bindings(&self) -> Vec<KeyBindings> {
        let mut out = Vec::new();
        if let Container::Window(w) = self {
            if let Some(kb) = w.control.key_bindings() {
                out.push(kb);
            }
        }
        for child in self.get_children() {
            out.extend(child.get_key_bindings());
        }
        out
    }
}

/// Write styled fragments starting at `(x, y)`, clipped to `max_width`
/// columns. Returns the column one past the last cell actually written, so
/// callers that need to know where a cursor landed (`Window`) or how much
/// of the line was consumed (wrapping) don't have to re-measure.
pub(crate) fn write_fragments(
    screen: &mut Screen,
    x: u16,
    y: u16,
    max_width: u16,
    fragments: &[StyledFragment],
    base_style: Style,
) -> u16 {
    let mut col = x;
    let right = x.saturating_add(max_width);
    'outer: for (style, text) in fragments {
        let merged = base_style.cascade(*style);
        for grapheme in text.graphemes(true) {
            let cell = Cell::new(grapheme, merged);
            let width = cell.cell_width();
            if col.saturating_add(width) > right {
                break 'outer;
            }
            screen.put(col, y, cell);
            if width == 2 {
                screen.put(col + 1, y, Cell::continuation(merged));
            }
            col += width;
        }
    }
    col
}

/// A leaf: the only container kind that wraps a [`Control`] and can claim
/// keyboard focus.
pub struct Window {
    id: WindowId,
    control: Box<dyn Control>,
    style: Style,
    dont_extend_width: bool,
    dont_extend_height: bool,
    wrap_lines: bool,
    always_hide_cursor: bool,
}

impl Window {
    pub fn new(control: Box<dyn Control>) -> Self {
        Self {
            id: WindowId::next(),
            control,
            style: Style::DEFAULT,
            dont_extend_width: false,
            dont_extend_height: false,
            wrap_lines: false,
            always_hide_cursor: false,
        }
    }

    pub fn id(&self) -> WindowId {
        self.id
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn dont_extend_width(mut self, yes: bool) -> Self {
        self.dont_extend_width = yes;
        self
    }

    pub fn dont_extend_height(mut self, yes: bool) -> Self {
        self.dont_extend_height = yes;
        self
    }

    pub fn wrap_lines(mut self, yes: bool) -> Self {
        self.wrap_lines = yes;
        self
    }

    pub fn always_hide_cursor(mut self, yes: bool) -> Self {
        self.always_hide_cursor = yes;
        self
    }

    fn reset(&mut self) {}

    fn preferred_width(&self, max_available: u16) -> Dimension {
        match self.control.preferred_width(max_available) {
            Some(w) if self.dont_extend_width => Dimension::exact(w.min(max_available)),
            Some(w) => Dimension::new(0, w.min(max_available), max_available, 1),
            None => Dimension::fill(1),
        }
    }

    fn preferred_height(&self, width: u16, max_available: u16) -> Dimension {
        match self.control.preferred_height(width, max_available) {
            Some(h) if self.dont_extend_height => Dimension::exact(h.min(max_available)),
            Some(h) => Dimension::new(0, h.min(max_available), max_available, 1),
            None => Dimension::fill(1),
        }
    }

    fn write_to_screen(
        &mut self,
        screen: &mut Screen,
        mouse_handlers: &mut MouseHandlers,
        pos: WritePosition,
        parent_style: Style,
        ctx: &RenderContext,
    ) {
        screen.record_window_position(self.id, pos);
        let style = parent_style.cascade(self.style);
        screen.fill_area(pos, style, false);

        let content = self.control.create_content(pos.width);
        let rows = pos.height.min(content.line_count as u16);
        for row in 0..rows {
            let fragments = content.get_line(row as usize);
            write_fragments(screen, pos.xpos, pos.ypos + row, pos.width, &fragments, style);
        }

        let id = self.id;
        mouse_handlers.fill(pos.xpos, pos.ypos, pos.right(), pos.bottom(), Rc::new(move |_| MouseHandled::Handled));

        if !self.always_hide_cursor && content.show_cursor {
            if let Some((row, col)) = content.cursor_position {
                if ctx.focused_window == Some(self.id) {
                    let at = (pos.xpos + col as u16, pos.ypos + row as u16);
                    screen.record_window_cursor(id, at);
                    screen.cursor_position = Some(at);
                    screen.show_cursor = true;
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Horizontal,
    Vertical,
}

/// `HSplit`/`VSplit`: children stacked along one axis, each given the full
/// extent of the other. Which axis is "main" is decided by the `Container`
/// variant (`HSplit`/`VSplit`) wrapping this, not by a field here, so the
/// same struct backs both.
pub struct Split {
    children: Vec<Container>,
    padding: u16,
    style: Style,
}

impl Split {
    pub fn new(children: Vec<Container>) -> Self {
        Self { children, padding: 0, style: Style::DEFAULT }
    }

    pub fn padding(mut self, padding: u16) -> Self {
        self.padding = padding;
        self
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    fn reset(&mut self) {
        for child in &mut self.children {
            child.reset();
        }
    }

    fn main_dims(&self, axis: Axis, cross: u16, max_available: u16) -> Vec<Dimension> {
        self.children
            .iter()
            .map(|c| match axis {
                Axis::Horizontal => c.preferred_height(cross, max_available),
                Axis::Vertical => c.preferred_width(max_available),
            })
            .collect()
    }

    fn total_padding(&self) -> u16 {
        self.padding.saturating_mul(self.children.len().saturating_sub(1) as u16)
    }

    // HSplit: width is the cross axis (max of children), height is main.
    fn preferred_width_cross(&self, max_available: u16) -> Dimension {
        let widest = self.children.iter().map(|c| c.preferred_width(max_available)).fold(Dimension::new(0, 0, 0, 1), |acc, d| {
            Dimension::new(acc.min.max(d.min), acc.preferred.max(d.preferred), acc.max.max(d.max), 1)
        });
        widest
    }

    fn preferred_height_main(&self, width: u16, max_available: u16) -> Dimension {
        let dims = self.main_dims(Axis::Horizontal, width, max_available);
        let pad = self.total_padding();
        Dimension::new(
            dims.iter().map(|d| d.min).sum::<u16>().saturating_add(pad),
            dims.iter().map(|d| d.preferred).sum::<u16>().saturating_add(pad),
            dims.iter().map(|d| d.max as u32).sum::<u32>().saturating_add(pad as u32).min(u16::MAX as u32) as u16,
            1,
        )
    }

    // VSplit: height is the cross axis, width is main.
    fn preferred_height_cross(&self, width: u16, max_available: u16) -> Dimension {
        let tallest = self.children.iter().map(|c| c.preferred_height(width, max_available)).fold(Dimension::new(0, 0, 0, 1), |acc, d| {
            Dimension::new(acc.min.max(d.min), acc.preferred.max(d.preferred), acc.max.max(d.max), 1)
        });
        tallest
    }

    fn preferred_width_main(&self, max_available: u16) -> Dimension {
        let dims = self.main_dims(Axis::Vertical, max_available, max_available);
        let pad = self.total_padding();
        Dimension::new(
            dims.iter().map(|d| d.min).sum::<u16>().saturating_add(pad),
            dims.iter().map(|d| d.preferred).sum::<u16>().saturating_add(pad),
            dims.iter().map(|d| d.max as u32).sum::<u32>().saturating_add(pad as u32).min(u16::MAX as u32) as u16,
            1,
        )
    }

    fn write_to_screen(
        &mut self,
        screen: &mut Screen,
        mouse_handlers: &mut MouseHandlers,
        pos: WritePosition,
        parent_style: Style,
        ctx: &RenderContext,
        axis: Axis,
    ) {
        let style = parent_style.cascade(self.style);
        screen.fill_area(pos, style, false);
        if self.children.is_empty() {
            return;
        }

        let pad = self.total_padding();
        let (cross, available_main) = match axis {
            Axis::Horizontal => (pos.width, pos.height.saturating_sub(pad)),
            Axis::Vertical => (pos.height, pos.width.saturating_sub(pad)),
        };
        let dims = self.main_dims(axis, cross, available_main);
        let sizes = layout::distribute(available_main, &dims).unwrap_or_else(|_| {
            // Minimums don't fit: fall back to an even split rather than panic.
            let even = available_main / self.children.len().max(1) as u16;
            vec![even; self.children.len()]
        });

        let mut offset = match axis {
            Axis::Horizontal => pos.ypos,
            Axis::Vertical => pos.xpos,
        };
        for (child, size) in self.children.iter_mut().zip(sizes) {
            let child_pos = match axis {
                Axis::Horizontal => WritePosition::new(pos.xpos, offset, pos.width, size),
                Axis::Vertical => WritePosition::new(offset, pos.ypos, size, pos.height),
            };
            child.write_to_screen(screen, mouse_handlers, child_pos, style, ctx);
            offset += size + self.padding;
        }
    }
}

pub struct HSplit;
pub struct VSplit;

impl HSplit {
    pub fn new(children: Vec<Container>) -> Container {
        Container::HSplit(Split::new(children))
    }
}

impl VSplit {
    pub fn new(children: Vec<Container>) -> Container {
        Container::VSplit(Split::new(children))
    }
}

/// One absolutely (or edge-relative) positioned overlay inside a
/// [`FloatContainer`], drawn after the base content in ascending `z_index`
/// order.
pub struct Float {
    pub content: Container,
    pub top: Option<u16>,
    pub bottom: Option<u16>,
    pub left: Option<u16>,
    pub right: Option<u16>,
    pub width: Option<u16>,
    pub height: Option<u16>,
    pub z_index: i32,
}

impl Float {
    pub fn new(content: Container) -> Self {
        Self { content, top: None, bottom: None, left: None, right: None, width: None, height: None, z_index: 0 }
    }

    fn resolve(&self, bounds: WritePosition) -> WritePosition {
        let width = self.width.unwrap_or(bounds.width);
        let height = self.height.unwrap_or(bounds.height);
        let x = match (self.left, self.right) {
            (Some(l), _) => bounds.xpos + l,
            (None, Some(r)) => bounds.right().saturating_sub(width + r),
            (None, None) => bounds.xpos,
        };
        let y = match (self.top, self.bottom) {
            (Some(t), _) => bounds.ypos + t,
            (None, Some(b)) => bounds.bottom().saturating_sub(height + b),
            (None, None) => bounds.ypos,
        };
        WritePosition::new(x, y, width.min(bounds.width), height.min(bounds.height))
    }
}

/// Base content plus a set of floating overlays, the `prompt_toolkit`
/// pattern behind menus, tooltips, and completion popups.
///
/// Floats render directly in ascending `z_index` order immediately after the
/// base content, rather than through [`crate::screen::Screen::queue_float`]:
/// that queue's closures only ever see `&mut Screen`, but a float still
/// needs the tree's [`MouseHandlers`] and [`RenderContext`] like any other
/// container, so there is nothing for deferring through a `FnOnce(&mut
/// Screen)` to buy here. `Screen::queue_float` remains for single-pass
/// producers (graphics controllers) that only ever touch cells.
pub struct FloatContainer {
    content: Box<Container>,
    floats: Vec<Float>,
}

impl FloatContainer {
    pub fn new(content: Container, floats: Vec<Float>) -> Self {
        Self { content: Box::new(content), floats }
    }

    fn reset(&mut self) {
        self.content.reset();
        for float in &mut self.floats {
            float.content.reset();
        }
    }

    fn write_to_screen(
        &mut self,
        screen: &mut Screen,
        mouse_handlers: &mut MouseHandlers,
        pos: WritePosition,
        parent_style: Style,
        ctx: &RenderContext,
    ) {
        self.content.write_to_screen(screen, mouse_handlers, pos, parent_style, ctx);

        self.floats.sort_by_key(|f| f.z_index);
        for float in &mut self.floats {
            let float_pos = float.resolve(pos);
            float.content.write_to_screen(screen, mouse_handlers, float_pos, parent_style, ctx);
        }
    }
}

/// Shows `content` only while `filter` evaluates true; contributes zero
/// size and draws nothing otherwise, matching `prompt_toolkit`'s
/// `ConditionalContainer`.
pub struct ConditionalContainer {
    content: Container,
    filter: Filter,
}

impl ConditionalContainer {
    pub fn new(content: Container, filter: Filter) -> Self {
        Self { content, filter }
    }

    fn preferred_width(&self, max_available: u16) -> Dimension {
        if self.visible_for_sizing() {
            self.content.preferred_width(max_available)
        } else {
            Dimension::exact(0)
        }
    }

    fn preferred_height(&self, width: u16, max_available: u16) -> Dimension {
        if self.visible_for_sizing() {
            self.content.preferred_height(width, max_available)
        } else {
            Dimension::exact(0)
        }
    }

    /// Sizing happens before a `RenderContext` for *this* frame exists (the
    /// focused window isn't known until the tree has been walked once), so
    /// visibility for layout purposes uses the filter's default-context
    /// answer; `write_to_screen` re-checks with the real context and simply
    /// draws nothing if that disagrees.
    fn visible_for_sizing(&self) -> bool {
        (self.filter)(&RenderContext::default())
    }

    fn write_to_screen(
        &mut self,
        screen: &mut Screen,
        mouse_handlers: &mut MouseHandlers,
        pos: WritePosition,
        parent_style: Style,
        ctx: &RenderContext,
    ) {
        if (self.filter)(ctx) {
            self.content.write_to_screen(screen, mouse_handlers, pos, parent_style, ctx);
        }
    }
}

/// Renders its [`Control`]'s full content top-aligned and never claims the
/// cursor — the shape used for non-interactive output (a cell's printed
/// result) that should never be scrolled or focused, matching `euporie`'s
/// `PrintingContainer`.
pub struct PrintingContainer {
    control: Box<dyn Control>,
    style: Style,
}

impl PrintingContainer {
    pub fn new(control: Box<dyn Control>) -> Self {
        Self { control, style: Style::DEFAULT }
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    fn reset(&mut self) {}

    fn preferred_width(&self, max_available: u16) -> Dimension {
        match self.control.preferred_width(max_available) {
            Some(w) => Dimension::new(0, w.min(max_available), max_available, 1),
            None => Dimension::fill(1),
        }
    }

    fn preferred_height(&self, width: u16, max_available: u16) -> Dimension {
        let content = self.control.preferred_height(width, max_available).unwrap_or(max_available);
        Dimension::new(0, content.min(max_available), u16::MAX, 1)
    }

    fn write_to_screen(&mut self, screen: &mut Screen, _mouse_handlers: &mut MouseHandlers, pos: WritePosition, parent_style: Style) {
        let style = parent_style.cascade(self.style);
        let content = self.control.create_content(pos.width);
        let rows = pos.height.min(content.line_count as u16);
        for row in 0..rows {
            let fragments = content.get_line(row as usize);
            write_fragments(screen, pos.xpos, pos.ypos + row, pos.width, &fragments, style);
        }
    }
}

/// A key a [`Control`] wants bound, convenience constructor used by tests
/// and by controls that bind a single literal character.
pub fn char_key(c: char) -> KeyPress {
    KeyPress::new(crate::input::vt100::KeyCode::Char(c), crate::input::vt100::Modifiers::NONE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::StaticControl;

    fn ctx() -> RenderContext {
        RenderContext::default()
    }

    #[test]
    fn window_writes_control_lines_into_its_position() {
        let control = StaticControl::from_plain_text("hi", Style::DEFAULT);
        let mut window = Container::Window(Window::new(Box::new(control)));
        let mut screen = Screen::new(10, 2);
        let mut handlers = MouseHandlers::new();
        window.write_to_screen(&mut screen, &mut handlers, WritePosition::new(0, 0, 10, 2), Style::DEFAULT, &ctx());
        assert_eq!(screen.get(0, 0).unwrap().text(), "h");
        assert_eq!(screen.get(1, 0).unwrap().text(), "i");
    }

    #[test]
    fn hsplit_stacks_children_top_to_bottom() {
        let top = Container::Window(Window::new(Box::new(StaticControl::from_plain_text("a", Style::DEFAULT))).dont_extend_height(true));
        let bottom = Container::Window(Window::new(Box::new(StaticControl::from_plain_text("b", Style::DEFAULT))));
        let mut split = HSplit::new(vec![top, bottom]);
        let mut screen = Screen::new(4, 4);
        let mut handlers = MouseHandlers::new();
        split.write_to_screen(&mut screen, &mut handlers, WritePosition::new(0, 0, 4, 4), Style::DEFAULT, &ctx());
        assert_eq!(screen.get(0, 0).unwrap().text(), "a");
    }

    #[test]
    fn conditional_container_draws_nothing_when_filter_false() {
        let inner = Container::Window(Window::new(Box::new(StaticControl::from_plain_text("x", Style::DEFAULT))));
        let mut cond = Container::Conditional(Box::new(ConditionalContainer::new(inner, Rc::new(|_| false))));
        let mut screen = Screen::new(4, 1);
        let mut handlers = MouseHandlers::new();
        cond.write_to_screen(&mut screen, &mut handlers, WritePosition::new(0, 0, 4, 1), Style::DEFAULT, &ctx());
        assert_eq!(screen.get(0, 0).unwrap().text(), " ");
    }

    #[test]
    fn float_is_positioned_relative_to_its_bounds() {
        let base = Container::Window(Window::new(Box::new(StaticControl::from_plain_text("", Style::DEFAULT))));
        let overlay = Container::Window(Window::new(Box::new(StaticControl::from_plain_text("m", Style::DEFAULT))));
        let mut float = Float::new(overlay);
        float.top = Some(1);
        float.left = Some(2);
        float.width = Some(1);
        float.height = Some(1);
        let mut container = Container::Float(FloatContainer::new(base, vec![float]));
        let mut screen = Screen::new(10, 10);
        let mut handlers = MouseHandlers::new();
        container.write_to_screen(&mut screen, &mut handlers, WritePosition::new(0, 0, 10, 10), Style::DEFAULT, &ctx());
        assert_eq!(screen.get(2, 1).unwrap().text(), "m");
    }
}
