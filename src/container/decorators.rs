//! Non-interactive wrappers that add a border, a highlight, or a drop
//! shadow around another container.
//!
//! Grounded on `euporie/core/widgets/decor.py` (`Frame`/`Shadow`/`Pattern`)
//! and `prompt_toolkit.layout.containers.Window`'s own border-drawing
//! (`Line`, the degenerate one-cell-wide separator). `FocusedStyle` is
//! `euporie`'s `core/layout/containers.py` hover/focus recolouring wrapper,
//! built on the same [`super::Filter`] `ConditionalContainer` uses.

use crate::layout::Dimension;
use crate::screen::{Screen, WritePosition};
use crate::style::Style;

use super::mouse::MouseHandlers;
use super::{Container, Filter, RenderContext};

/// Every decorator kind, dispatched the same way [`Container`] is.
pub enum Decorator {
    Line(Line),
    Pattern(Pattern),
    Shadow(Box<Shadow>),
    Frame(Box<Frame>),
    FocusedStyle(Box<FocusedStyle>),
}

impl Decorator {
    pub(super) fn child(&self) -> Option<&Container> {
        match self {
            Decorator::Line(_) | Decorator::Pattern(_) => None,
            Decorator::Shadow(s) => Some(&s.content),
            Decorator::Frame(f) => Some(&f.content),
            Decorator::FocusedStyle(f) => Some(&f.content),
        }
    }

    pub(super) fn child_mut(&mut self) -> Option<&mut Container> {
        match self {
            Decorator::Line(_) | Decorator::Pattern(_) => None,
            Decorator::Shadow(s) => Some(&mut s.content),
            Decorator::Frame(f) => Some(&mut f.content),
            Decorator::FocusedStyle(f) => Some(&mut f.content),
        }
    }

    pub(super) fn reset(&mut self) {
        if let Some(child) = self.child_mut() {
            child.reset();
        }
    }

    pub(super) fn preferred_width(&self, max_available: u16) -> Dimension {
        match self {
            Decorator::Line(l) => l.preferred_width(),
            Decorator::Pattern(_) => Dimension::fill(1),
            Decorator::Shadow(s) => s.content.preferred_width(max_available),
            Decorator::Frame(f) => f.preferred_width(max_available),
            Decorator::FocusedStyle(f) => f.content.preferred_width(max_available),
        }
    }

    pub(super) fn preferred_height(&self, width: u16, max_available: u16) -> Dimension {
        match self {
            Decorator::Line(l) => l.preferred_height(),
            Decorator::Pattern(_) => Dimension::fill(1),
            Decorator::Shadow(s) => s.content.preferred_height(width, max_available),
            Decorator::Frame(f) => f.preferred_height(width, max_available),
            Decorator::FocusedStyle(f) => f.content.preferred_height(width, max_available),
        }
    }

    pub(super) fn write_to_screen(
        &mut self,
        screen: &mut Screen,
        mouse_handlers: &mut MouseHandlers,
        pos: WritePosition,
        parent_style: Style,
        ctx: &RenderContext,
    ) {
        match self {
            Decorator::Line(l) => l.write_to_screen(screen, pos, parent_style),
            Decorator::Pattern(p) => p.write_to_screen(screen, pos, parent_style),
            Decorator::Shadow(s) => s.write_to_screen(screen, mouse_handlers, pos, parent_style, ctx),
            Decorator::Frame(f) => f.write_to_screen(screen, mouse_handlers, pos, parent_style, ctx),
            Decorator::FocusedStyle(f) => f.write_to_screen(screen, mouse_handlers, pos, parent_style, ctx),
        }
    }
}

/// A one-cell-thick separator, horizontal or vertical.
pub struct Line {
    pub vertical: bool,
    pub style: Style,
    pub char: char,
}

impl Line {
    pub fn horizontal() -> Self {
        Self { vertical: false, style: Style::DEFAULT, char: '─' }
    }

    pub fn vertical() -> Self {
        Self { vertical: true, style: Style::DEFAULT, char: '│' }
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    fn preferred_width(&self) -> Dimension {
        if self.vertical { Dimension::exact(1) } else { Dimension::fill(1) }
    }

    fn preferred_height(&self) -> Dimension {
        if self.vertical { Dimension::fill(1) } else { Dimension::exact(1) }
    }

    fn write_to_screen(&self, screen: &mut Screen, pos: WritePosition, parent_style: Style) {
        let style = parent_style.cascade(self.style);
        let glyph = self.char.to_string();
        if self.vertical {
            for y in pos.top()..pos.bottom() {
                super::write_fragments(screen, pos.xpos, y, 1, &[(style, glyph.clone())], style);
            }
        } else {
            for x in pos.left()..pos.right() {
                super::write_fragments(screen, x, pos.ypos, 1, &[(style, glyph.clone())], style);
            }
        }
    }
}

/// A repeating single-character background fill, used behind floats to
/// visually separate them from whatever they're layered over.
pub struct Pattern {
    pub char: char,
    pub style: Style,
}

impl Pattern {
    pub fn new(char: char, style: Style) -> Self {
        Self { char, style }
    }

    fn write_to_screen(&self, screen: &mut Screen, pos: WritePosition, parent_style: Style) {
        let style = parent_style.cascade(self.style);
        let glyph = self.char.to_string();
        for y in pos.top()..pos.bottom() {
            for x in pos.left()..pos.right() {
                super::write_fragments(screen, x, y, 1, &[(style, glyph.clone())], style);
            }
        }
    }
}

/// A child shifted up-left by one cell, with a dim fill drawn in the
/// vacated bottom-right strip to fake a drop shadow.
pub struct Shadow {
    content: Container,
    style: Style,
}

impl Shadow {
    pub fn new(content: Container) -> Self {
        Self { content, style: Style::parse("fg:#000000 dim") }
    }

    fn write_to_screen(
        &mut self,
        screen: &mut Screen,
        mouse_handlers: &mut MouseHandlers,
        pos: WritePosition,
        parent_style: Style,
        ctx: &RenderContext,
    ) {
        let inner = WritePosition::new(pos.xpos, pos.ypos, pos.width.saturating_sub(1), pos.height.saturating_sub(1));
        let shadow_style = parent_style.cascade(self.style);
        if pos.width > 0 {
            for y in inner.top()..pos.bottom() {
                screen.fill_area(WritePosition::new(pos.right() - 1, y, 1, 1), shadow_style, true);
            }
        }
        if pos.height > 0 {
            for x in inner.left()..pos.right() {
                screen.fill_area(WritePosition::new(x, pos.bottom() - 1, 1, 1), shadow_style, true);
            }
        }
        self.content.write_to_screen(screen, mouse_handlers, inner, parent_style, ctx);
    }
}

/// Which border characters a [`Frame`] draws, defaulting to single-line box
/// drawing; a `Frame` nested directly inside another uses the thin/thick
/// pairing `euporie` calls "border collapse" so two adjacent frames share
/// one line instead of drawing a double-thickness seam.
#[derive(Debug, Clone, Copy)]
pub struct BorderChars {
    pub horizontal: char,
    pub vertical: char,
    pub top_left: char,
    pub top_right: char,
    pub bottom_left: char,
    pub bottom_right: char,
}

impl BorderChars {
    pub const SINGLE: Self =
        Self { horizontal: '─', vertical: '│', top_left: '┌', top_right: '┐', bottom_left: '└', bottom_right: '┘' };

    /// Used when an outer `Frame` detects its sole child is itself a
    /// `Frame`: the inner one collapses its top edge into the outer's
    /// bottom edge rather than drawing two full borders one cell apart.
    pub const COLLAPSED_INNER: Self =
        Self { horizontal: '─', vertical: '│', top_left: '├', top_right: '┤', bottom_left: '└', bottom_right: '┘' };
}

/// A bordered box around a child, optionally titled.
pub struct Frame {
    content: Container,
    title: Option<String>,
    style: Style,
    chars: BorderChars,
}

impl Frame {
    pub fn new(content: Container) -> Self {
        Self { content, title: None, style: Style::DEFAULT, chars: BorderChars::SINGLE }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Collapse this frame's top/bottom border into a single line shared
    /// with whatever frame is drawing immediately outside it.
    pub fn collapse_inner_border(mut self, yes: bool) -> Self {
        self.chars = if yes { BorderChars::COLLAPSED_INNER } else { BorderChars::SINGLE };
        self
    }

    fn preferred_width(&self, max_available: u16) -> Dimension {
        let inner = self.content.preferred_width(max_available.saturating_sub(2));
        Dimension::new(
            inner.min.saturating_add(2),
            inner.preferred.saturating_add(2),
            inner.max.saturating_add(2).min(u16::MAX),
            inner.weight,
        )
    }

    fn preferred_height(&self, width: u16, max_available: u16) -> Dimension {
        let inner = self.content.preferred_height(width.saturating_sub(2), max_available.saturating_sub(2));
        Dimension::new(
            inner.min.saturating_add(2),
            inner.preferred.saturating_add(2),
            inner.max.saturating_add(2).min(u16::MAX),
            inner.weight,
        )
    }

    fn write_to_screen(
        &mut self,
        screen: &mut Screen,
        mouse_handlers: &mut MouseHandlers,
        pos: WritePosition,
        parent_style: Style,
        ctx: &RenderContext,
    ) {
        let style = parent_style.cascade(self.style);
        if pos.width < 2 || pos.height < 2 {
            self.content.write_to_screen(screen, mouse_handlers, pos, style, ctx);
            return;
        }

        let c = self.chars;
        super::write_fragments(screen, pos.left(), pos.top(), pos.width, &[(style, self.top_line(pos.width, c))], style);
        super::write_fragments(
            screen,
            pos.left(),
            pos.bottom() - 1,
            pos.width,
            &[(style, border_line(c.bottom_left, c.horizontal, c.bottom_right, pos.width))],
            style,
        );
        for y in (pos.top() + 1)..(pos.bottom() - 1) {
            let glyph = c.vertical.to_string();
            super::write_fragments(screen, pos.left(), y, 1, &[(style, glyph.clone())], style);
            super::write_fragments(screen, pos.right() - 1, y, 1, &[(style, glyph)], style);
        }

        let inner = WritePosition::new(pos.xpos + 1, pos.ypos + 1, pos.width - 2, pos.height - 2);
        self.content.write_to_screen(screen, mouse_handlers, inner, style, ctx);
    }

    fn top_line(&self, width: u16, c: BorderChars) -> String {
        match &self.title {
            Some(title) if (title.len() as u16 + 4) <= width => {
                let remaining = width as usize - title.len() - 4;
                let left_fill = remaining / 2;
                let right_fill = remaining - left_fill;
                format!(
                    "{}{} {} {}{}",
                    c.top_left,
                    c.horizontal.to_string().repeat(left_fill + 1),
                    title,
                    c.horizontal.to_string().repeat(right_fill + 1),
                    c.top_right,
                )
            }
            _ => border_line(c.top_left, c.horizontal, c.top_right, width),
        }
    }
}

fn border_line(left: char, fill: char, right: char, width: u16) -> String {
    if width < 2 {
        return fill.to_string().repeat(width as usize);
    }
    let mut s = String::new();
    s.push(left);
    s.push_str(&fill.to_string().repeat(width as usize - 2));
    s.push(right);
    s
}

/// Composes an extra style onto a child whenever `filter` evaluates true —
/// the mechanism behind hover and focus highlighting, since both are just
/// "recolour this subtree when some predicate holds" with a different
/// predicate.
pub struct FocusedStyle {
    content: Container,
    filter: Filter,
    style: Style,
}

impl FocusedStyle {
    pub fn new(content: Container, filter: Filter, style: Style) -> Self {
        Self { content, filter, style }
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
        if (self.filter)(ctx) {
            screen.fill_area(pos, self.style, true);
        }
    }
}
