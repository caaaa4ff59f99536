//! Style strings and parsed text attributes.
//!
//! Containers carry style as a space-separated token string (`"bold
//! fg:#ff0000 bg:ansired underline"`), the same vocabulary
//! `prompt_toolkit`/`euporie` style strings use. Internally everything
//! downstream of parsing works on [`Attrs`] (REDESIGN FLAGS: parsed form is
//! the primary internal representation, the string is only an input/output
//! encoding). [`Cell`](crate::cell::Cell) stores `Attrs` directly; the
//! string form only appears at construction time and when a container
//! author writes a literal style.

pub mod color;
pub mod palette;

pub use color::Rgba;

bitflags::bitflags! {
    /// Text attributes as a bitfield, checked and combined without ever
    /// re-parsing the source string.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Attrs: u16 {
        const NONE          = 0;
        const BOLD          = 1 << 0;
        const DIM           = 1 << 1;
        const ITALIC        = 1 << 2;
        const UNDERLINE     = 1 << 3;
        const BLINK         = 1 << 4;
        const INVERSE       = 1 << 5;
        const HIDDEN        = 1 << 6;
        const STRIKETHROUGH = 1 << 7;
        /// Double underline (SGR 21 in terminals that treat 21 this way,
        /// rather than as "not bold").
        const UNDERLINE_DOUBLE = 1 << 8;
        /// Curly/wavy underline (`4:3` extended underline, used for
        /// spell-check squiggles).
        const UNDERLINE_CURLY  = 1 << 9;
        /// Dotted underline (`4:4`).
        const UNDERLINE_DOTTED = 1 << 10;
        /// Dashed underline (`4:5`).
        const UNDERLINE_DASHED = 1 << 11;
        /// Overline (SGR 53).
        const OVERLINE         = 1 << 12;
        /// Faster blink (SGR 6, vs. the slow blink of `BLINK`/SGR 5).
        const BLINK_FAST       = 1 << 13;
    }
}

/// A fully resolved cell style: colours plus attribute flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Style {
    pub fg: Rgba,
    pub bg: Rgba,
    pub attrs: Attrs,
    /// SGR 4:x underline colour, independent of `fg` (`underline:#rrggbb`
    /// token, or OSC 8 hyperlink-adjacent styling). `None` means "same as
    /// fg", matching terminal default behaviour.
    pub underline_color: Option<Rgba>,
}

impl Style {
    pub const DEFAULT: Self =
        Self { fg: Rgba::TERMINAL_DEFAULT, bg: Rgba::TERMINAL_DEFAULT, attrs: Attrs::NONE, underline_color: None };

    /// Parse a space-separated style string. Unknown tokens are preserved
    /// silently — a container author's future-looking token (say, a class
    /// name `class:title`) should not blow up a render it doesn't
    /// understand; it is simply not one of the tokens this parser acts on.
    pub fn parse(s: &str) -> Self {
        let mut style = Self::DEFAULT;
        for token in s.split_whitespace() {
            style.apply_token(token);
        }
        style
    }

    fn apply_token(&mut self, token: &str) {
        if let Some(rest) = token.strip_prefix("fg:") {
            if let Some(c) = Rgba::parse_token(rest) {
                self.fg = c;
            }
            return;
        }
        if let Some(rest) = token.strip_prefix("bg:") {
            if let Some(c) = Rgba::parse_token(rest) {
                self.bg = c;
            }
            return;
        }
        if let Some(rest) = token.strip_prefix("underline:").or_else(|| token.strip_prefix("ul:")) {
            self.underline_color = Rgba::parse_token(rest);
            return;
        }
        match token {
            "bold" => self.attrs |= Attrs::BOLD,
            "nobold" => self.attrs.remove(Attrs::BOLD),
            "dim" | "faint" => self.attrs |= Attrs::DIM,
            "italic" => self.attrs |= Attrs::ITALIC,
            "noitalic" => self.attrs.remove(Attrs::ITALIC),
            "underline" => self.attrs |= Attrs::UNDERLINE,
            "nounderline" => self.attrs.remove(
                Attrs::UNDERLINE | Attrs::UNDERLINE_DOUBLE | Attrs::UNDERLINE_CURLY | Attrs::UNDERLINE_DOTTED | Attrs::UNDERLINE_DASHED,
            ),
            "underline_double" | "doubleunderline" => self.attrs |= Attrs::UNDERLINE_DOUBLE,
            "underline_curly" | "underline_wavy" | "curvyunderline" => self.attrs |= Attrs::UNDERLINE_CURLY,
            "dottedunderline" => self.attrs |= Attrs::UNDERLINE_DOTTED,
            "dashedunderline" => self.attrs |= Attrs::UNDERLINE_DASHED,
            "overline" => self.attrs |= Attrs::OVERLINE,
            "nooverline" => self.attrs.remove(Attrs::OVERLINE),
            "blink" => self.attrs |= Attrs::BLINK,
            "blinkfast" => self.attrs |= Attrs::BLINK_FAST,
            "reverse" | "inverse" => self.attrs |= Attrs::INVERSE,
            "hidden" => self.attrs |= Attrs::HIDDEN,
            "strike" | "strikethrough" => self.attrs |= Attrs::STRIKETHROUGH,
            "default" => *self = Self::DEFAULT,
            "" => {}
            _ => {}
        }
    }

    /// Merge `other` over `self`: non-default colours and set attribute
    /// bits from `other` take precedence, matching how nested container
    /// styles cascade (innermost wins, same as CSS `!important`-free
    /// cascading would for a single property).
    pub fn cascade(self, other: Self) -> Self {
        Self {
            fg: if other.fg.is_terminal_default() { self.fg } else { other.fg },
            bg: if other.bg.is_terminal_default() { self.bg } else { other.bg },
            attrs: self.attrs | other.attrs,
            underline_color: other.underline_color.or(self.underline_color),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_colors_and_attrs() {
        let style = Style::parse("bold fg:#ff0000 bg:ansiblue underline");
        assert_eq!(style.fg, Rgba::rgb(255, 0, 0));
        assert_eq!(style.bg, Rgba::ansi(4));
        assert!(style.attrs.contains(Attrs::BOLD));
        assert!(style.attrs.contains(Attrs::UNDERLINE));
    }

    #[test]
    fn negation_tokens_clear_bits() {
        let style = Style::parse("bold nobold italic");
        assert!(!style.attrs.contains(Attrs::BOLD));
        assert!(style.attrs.contains(Attrs::ITALIC));
    }

    #[test]
    fn unknown_tokens_are_ignored_not_fatal() {
        let style = Style::parse("class:title bold");
        assert!(style.attrs.contains(Attrs::BOLD));
    }

    #[test]
    fn full_underline_and_overline_vocabulary_is_recognized() {
        let style = Style::parse("dottedunderline dashedunderline overline blinkfast ul:#ff00ff");
        assert!(style.attrs.contains(Attrs::UNDERLINE_DOTTED));
        assert!(style.attrs.contains(Attrs::UNDERLINE_DASHED));
        assert!(style.attrs.contains(Attrs::OVERLINE));
        assert!(style.attrs.contains(Attrs::BLINK_FAST));
        assert_eq!(style.underline_color, Some(Rgba::rgb(0xff, 0x00, 0xff)));
    }

    #[test]
    fn cascade_prefers_override_colors_but_unions_attrs() {
        let base = Style::parse("bold fg:#111111");
        let over = Style::parse("italic bg:#222222");
        let merged = base.cascade(over);
        assert_eq!(merged.fg, Rgba::rgb(0x11, 0x11, 0x11));
        assert_eq!(merged.bg, Rgba::rgb(0x22, 0x22, 0x22));
        assert!(merged.attrs.contains(Attrs::BOLD));
        assert!(merged.attrs.contains(Attrs::ITALIC));
    }
}
