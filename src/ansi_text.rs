//! Streaming decoder from a raw SGR-laden byte stream (subprocess output,
//! kernel stdout/stderr, anything a child process writes) into styled
//! fragments a [`crate::control::Control`] can hand to
//! [`crate::container::write_fragments`].
//!
//! Distinct from [`crate::ansi`] (which only ever *writes* escape sequences
//! this crate chose to emit) and [`crate::input::vt100`] (which parses
//! terminal *input* — keys, mouse, query replies). This module parses
//! arbitrary *output* a foreign process produced, which may contain any SGR
//! sequence, cursor-up/carriage-return tricks (progress bars routinely
//! rewrite their current line), and escape sequences with no fragment
//! meaning at all (hyperlinks, clipboard, sixel) that must still reach the
//! terminal to preserve their side effects.

use crate::control::StyledFragment;
use crate::style::{Attrs, Rgba, Style};

/// One decoded line: the styled text fragments plus any zero-width escape
/// sequences (OSC 8 hyperlinks, raw sixel payloads, anything this decoder
/// doesn't understand) anchored to a grapheme offset, to be attached the
/// way [`crate::screen::Screen::put_escape`] attaches them — emitted
/// immediately before the grapheme at that offset rather than consuming a
/// column of their own.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Line {
    pub fragments: Vec<StyledFragment>,
    pub escapes: Vec<(usize, String)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParserState {
    Ground,
    Escape,
    Csi,
    /// OSC/APC/DCS: collect raw bytes until the ST (`\x1b\\`) or BEL
    /// terminator, then forward verbatim as a zero-width escape.
    StringCollect(u8),
}

/// Consumes text a chunk at a time and accumulates decoded [`Line`]s.
pub struct AnsiTextDecoder {
    state: ParserState,
    style: Style,
    current: Vec<(char, Style)>,
    cursor: usize,
    lines: Vec<Line>,
    pending_escape: Option<String>,
    /// Offset -> escape, for the in-progress line.
    current_escapes: Vec<(usize, String)>,
    csi_buf: String,
    string_buf: String,
    string_introducer: u8,
    last_was_esc_in_string: bool,
}

impl Default for AnsiTextDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl AnsiTextDecoder {
    pub fn new() -> Self {
        Self {
            state: ParserState::Ground,
            style: Style::DEFAULT,
            current: Vec::new(),
            cursor: 0,
            lines: Vec::new(),
            pending_escape: None,
            current_escapes: Vec::new(),
            csi_buf: String::new(),
            string_buf: String::new(),
            string_introducer: 0,
            last_was_esc_in_string: false,
        }
    }

    pub fn feed(&mut self, input: &str) {
        for ch in input.chars() {
            self.feed_char(ch);
        }
    }

    fn feed_char(&mut self, ch: char) {
        match self.state {
            ParserState::Ground => self.feed_ground(ch),
            ParserState::Escape => self.feed_escape(ch),
            ParserState::Csi => self.feed_csi(ch),
            ParserState::StringCollect(intro) => self.feed_string(ch, intro),
        }
    }

    fn feed_ground(&mut self, ch: char) {
        match ch {
            '\x1b' => self.state = ParserState::Escape,
            '\r' => {
                self.current.clear();
                self.current_escapes.clear();
                self.cursor = 0;
            }
            '\n' => self.commit_line(),
            '\x08' => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    self.current.truncate(self.cursor);
                    self.current_escapes.retain(|(i, _)| *i < self.cursor);
                }
            }
            _ => self.push_char(ch),
        }
    }

    fn push_char(&mut self, ch: char) {
        if let Some(escape) = self.pending_escape.take() {
            self.current_escapes.push((self.cursor, escape));
        }
        if self.cursor < self.current.len() {
            self.current[self.cursor] = (ch, self.style);
        } else {
            self.current.push((ch, self.style));
        }
        self.cursor += 1;
    }

    fn commit_line(&mut self) {
        if let Some(escape) = self.pending_escape.take() {
            self.current_escapes.push((self.cursor, escape));
        }
        let fragments = compact_fragments(&self.current);
        self.lines.push(Line { fragments, escapes: std::mem::take(&mut self.current_escapes) });
        self.current.clear();
        self.cursor = 0;
    }

    fn feed_escape(&mut self, ch: char) {
        match ch {
            '[' => {
                self.csi_buf.clear();
                self.state = ParserState::Csi;
            }
            ']' => self.begin_string(b']'),
            'P' => self.begin_string(b'P'),
            '_' => self.begin_string(b'_'),
            '^' => self.begin_string(b'^'),
            _ => {
                // Anything else (e.g. a lone ESC, or a two-character
                // sequence this decoder has no fragment meaning for) is
                // forwarded verbatim so its terminal side effect survives.
                self.attach_escape(format!("\x1b{ch}"));
                self.state = ParserState::Ground;
            }
        }
    }

    fn begin_string(&mut self, intro: u8) {
        self.string_buf.clear();
        self.string_introducer = intro;
        self.last_was_esc_in_string = false;
        self.state = ParserState::StringCollect(intro);
    }

    fn feed_string(&mut self, ch: char, intro: u8) {
        if self.last_was_esc_in_string {
            self.last_was_esc_in_string = false;
            if ch == '\\' {
                let full = format!("\x1b{}{}\x1b\\", intro as char, self.string_buf);
                self.attach_escape(full);
                self.state = ParserState::Ground;
                return;
            }
            self.string_buf.push('\x1b');
        }
        match ch {
            '\x07' => {
                let full = format!("\x1b{}{}\x07", intro as char, self.string_buf);
                self.attach_escape(full);
                self.state = ParserState::Ground;
            }
            '\x1b' => self.last_was_esc_in_string = true,
            _ => self.string_buf.push(ch),
        }
    }

    fn attach_escape(&mut self, escape: String) {
        match &mut self.pending_escape {
            Some(existing) => existing.push_str(&escape),
            None => self.pending_escape = Some(escape),
        }
    }

    fn feed_csi(&mut self, ch: char) {
        if ch.is_ascii_digit() || ch == ';' || ch == ':' || ch == '?' || ch == '<' || ch == '=' || ch == '>' {
            self.csi_buf.push(ch);
            return;
        }
        // Final byte: 0x40-0x7e.
        match ch {
            'm' => self.apply_sgr(),
            'A' => self.cursor_up(),
            'K' => {
                if self.csi_buf.is_empty() || self.csi_buf == "0" || self.csi_buf == "2" {
                    self.current.clear();
                    self.current_escapes.clear();
                    self.cursor = 0;
                }
            }
            _ => {
                let full = format!("\x1b[{}{ch}", self.csi_buf);
                self.attach_escape(full);
            }
        }
        self.state = ParserState::Ground;
    }

    fn cursor_up(&mut self) {
        let n: usize = self.csi_buf.parse().unwrap_or(1).max(1);
        let keep = self.lines.len().saturating_sub(n);
        self.lines.truncate(keep);
    }

    fn apply_sgr(&mut self) {
        let tokens = tokenize_params(&self.csi_buf);
        let mut i = 0;
        while i < tokens.len() {
            let (code, _) = tokens[i];
            let code = code.unwrap_or(0);
            match code {
                0 => self.style = Style::DEFAULT,
                1 => self.style.attrs |= Attrs::BOLD,
                2 => self.style.attrs |= Attrs::DIM,
                3 => self.style.attrs |= Attrs::ITALIC,
                4 => {
                    if let Some((Some(sub), true)) = tokens.get(i + 1) {
                        i += 1;
                        self.apply_underline_style(*sub);
                    } else {
                        self.style.attrs |= Attrs::UNDERLINE;
                    }
                }
                5 => self.style.attrs |= Attrs::BLINK,
                6 => self.style.attrs |= Attrs::BLINK_FAST,
                7 => self.style.attrs |= Attrs::INVERSE,
                8 => self.style.attrs |= Attrs::HIDDEN,
                9 => self.style.attrs |= Attrs::STRIKETHROUGH,
                21 => self.style.attrs |= Attrs::UNDERLINE_DOUBLE,
                22 => self.style.attrs.remove(Attrs::BOLD | Attrs::DIM),
                23 => self.style.attrs.remove(Attrs::ITALIC),
                24 => self.style.attrs.remove(
                    Attrs::UNDERLINE | Attrs::UNDERLINE_DOUBLE | Attrs::UNDERLINE_CURLY | Attrs::UNDERLINE_DOTTED | Attrs::UNDERLINE_DASHED,
                ),
                25 => self.style.attrs.remove(Attrs::BLINK | Attrs::BLINK_FAST),
                27 => self.style.attrs.remove(Attrs::INVERSE),
                28 => self.style.attrs.remove(Attrs::HIDDEN),
                29 => self.style.attrs.remove(Attrs::STRIKETHROUGH),
                30..=37 => self.style.fg = Rgba::ansi((code - 30) as u8),
                38 => i += Self::consume_color(&tokens[i + 1..], &mut self.style, ColorSlot::Fg),
                39 => self.style.fg = Rgba::TERMINAL_DEFAULT,
                40..=47 => self.style.bg = Rgba::ansi((code - 40) as u8),
                48 => i += Self::consume_color(&tokens[i + 1..], &mut self.style, ColorSlot::Bg),
                49 => self.style.bg = Rgba::TERMINAL_DEFAULT,
                53 => self.style.attrs |= Attrs::OVERLINE,
                55 => self.style.attrs.remove(Attrs::OVERLINE),
                58 => i += Self::consume_color(&tokens[i + 1..], &mut self.style, ColorSlot::Underline),
                59 => self.style.underline_color = None,
                90..=97 => self.style.fg = Rgba::ansi((code - 90 + 8) as u8),
                100..=107 => self.style.bg = Rgba::ansi((code - 100 + 8) as u8),
                _ => {}
            }
            i += 1;
        }
    }

    fn apply_underline_style(&mut self, kind: u32) {
        self.style.attrs.remove(Attrs::UNDERLINE | Attrs::UNDERLINE_DOUBLE | Attrs::UNDERLINE_CURLY | Attrs::UNDERLINE_DOTTED | Attrs::UNDERLINE_DASHED);
        match kind {
            1 => self.style.attrs |= Attrs::UNDERLINE,
            2 => self.style.attrs |= Attrs::UNDERLINE_DOUBLE,
            3 => self.style.attrs |= Attrs::UNDERLINE_CURLY,
            4 => self.style.attrs |= Attrs::UNDERLINE_DOTTED,
            5 => self.style.attrs |= Attrs::UNDERLINE_DASHED,
            _ => {}
        }
    }

    /// Consume the colour-mode token(s) following a 38/48/58 code. Returns
    /// how many extra tokens were consumed (added to the outer loop's `i`).
    fn consume_color(rest: &[(Option<u32>, bool)], style: &mut Style, slot: ColorSlot) -> usize {
        let Some((mode, _)) = rest.first().copied() else { return 0 };
        match mode {
            Some(5) => {
                let Some((Some(idx), _)) = rest.get(1).copied() else { return 1 };
                slot.set(style, Rgba::ansi(idx as u8));
                2
            }
            Some(2) => {
                // Skip an optional empty colourspace-id field the colon
                // form inserts between "2" and the r/g/b triple.
                let mut offset = 1;
                if matches!(rest.get(offset), Some((None, true))) {
                    offset += 1;
                }
                let r = rest.get(offset).and_then(|(v, _)| *v).unwrap_or(0);
                let g = rest.get(offset + 1).and_then(|(v, _)| *v).unwrap_or(0);
                let b = rest.get(offset + 2).and_then(|(v, _)| *v).unwrap_or(0);
                slot.set(style, Rgba::rgb(r as u8, g as u8, b as u8));
                offset + 2
            }
            _ => 0,
        }
    }

    /// Finish decoding, flushing any partial trailing line, and return every
    /// decoded line.
    pub fn finish(mut self) -> Vec<Line> {
        if !self.current.is_empty() || !self.current_escapes.is_empty() || self.pending_escape.is_some() {
            self.commit_line();
        }
        self.lines
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }
}

#[derive(Clone, Copy)]
enum ColorSlot {
    Fg,
    Bg,
    Underline,
}

impl ColorSlot {
    fn set(self, style: &mut Style, color: Rgba) {
        match self {
            ColorSlot::Fg => style.fg = color,
            ColorSlot::Bg => style.bg = color,
            ColorSlot::Underline => style.underline_color = Some(color),
        }
    }
}

fn compact_fragments(chars: &[(char, Style)]) -> Vec<StyledFragment> {
    let mut out: Vec<StyledFragment> = Vec::new();
    for (ch, style) in chars {
        match out.last_mut() {
            Some((last_style, text)) if *last_style == *style => text.push(*ch),
            _ => out.push((*style, ch.to_string())),
        }
    }
    out
}

/// Split a CSI parameter string into a flat token list, recording for each
/// token whether it was attached to the previous one with `:` (a genuine
/// sub-parameter, e.g. the `3` in `4:3`) rather than `;` (an independent
/// top-level SGR code). Both the legacy semicolon-separated colour form
/// (`38;5;n`) and the ITU colon form (`38:2::r:g:b`) end up as the same flat
/// sequence; only the attachment flag on the token after `4` actually
/// changes interpretation.
fn tokenize_params(raw: &str) -> Vec<(Option<u32>, bool)> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut attached = false;
    for ch in raw.chars() {
        match ch {
            ';' | ':' => {
                out.push((current.parse().ok(), attached));
                attached = ch == ':';
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    out.push((current.parse().ok(), attached));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(input: &str) -> Vec<Line> {
        let mut decoder = AnsiTextDecoder::new();
        decoder.feed(input);
        decoder.finish()
    }

    #[test]
    fn plain_text_becomes_one_fragment() {
        let lines = decode("hello");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].fragments, vec![(Style::DEFAULT, "hello".to_string())]);
    }

    #[test]
    fn sgr_bold_and_color_split_fragments_by_style() {
        let lines = decode("plain\x1b[1;31mred bold\x1b[0m plain");
        assert_eq!(lines[0].fragments.len(), 3);
        assert_eq!(lines[0].fragments[0].1, "plain");
        assert!(lines[0].fragments[1].0.attrs.contains(Attrs::BOLD));
        assert_eq!(lines[0].fragments[1].0.fg, Rgba::ansi(1));
        assert_eq!(lines[0].fragments[2].1, " plain");
    }

    #[test]
    fn truecolor_semicolon_and_colon_forms_agree() {
        let semi = decode("\x1b[38;2;10;20;30mx");
        let colon = decode("\x1b[38:2::10:20:30mx");
        assert_eq!(semi[0].fragments[0].0.fg, Rgba::rgb(10, 20, 30));
        assert_eq!(colon[0].fragments[0].0.fg, Rgba::rgb(10, 20, 30));
    }

    #[test]
    fn bare_carriage_return_clears_current_line_for_overwrite() {
        let lines = decode("progress 50%\rprogress 100%\n");
        assert_eq!(lines[0].fragments[0].1, "progress 100%");
    }

    #[test]
    fn crlf_behaves_as_newline() {
        let lines = decode("one\r\ntwo\n");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].fragments[0].1, "one");
        assert_eq!(lines[1].fragments[0].1, "two");
    }

    #[test]
    fn cursor_up_drops_previously_emitted_lines() {
        let lines = decode("a\nb\nc\n\x1b[2Ad\n");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].fragments[0].1, "a");
        assert_eq!(lines[1].fragments[0].1, "d");
    }

    #[test]
    fn erase_line_clears_accumulated_text() {
        let lines = decode("garbage\x1b[2Kclean\n");
        assert_eq!(lines[0].fragments[0].1, "clean");
    }

    #[test]
    fn backspace_removes_last_character() {
        let lines = decode("ab\x08c\n");
        assert_eq!(lines[0].fragments[0].1, "ac");
    }

    #[test]
    fn unknown_escape_is_forwarded_as_zero_width_escape_on_next_char() {
        let lines = decode("\x1b]8;;http://example.com\x07link\x1b]8;;\x07\n");
        assert_eq!(lines[0].fragments[0].1, "link");
        assert_eq!(lines[0].escapes.len(), 2);
        assert_eq!(lines[0].escapes[0].0, 0);
        assert!(lines[0].escapes[0].1.contains("example.com"));
        // The closing OSC 8 has no following grapheme on this line; it is
        // still preserved, anchored at the line's end.
        assert_eq!(lines[0].escapes[1].0, 4);
    }

    #[test]
    fn underline_style_subparam_selects_curly_underline() {
        let lines = decode("\x1b[4:3mx");
        assert!(lines[0].fragments[0].0.attrs.contains(Attrs::UNDERLINE_CURLY));
    }

    #[test]
    fn reset_code_clears_all_attributes() {
        let lines = decode("\x1b[1;31mbold\x1b[0mplain");
        assert!(lines[0].fragments[0].0.attrs.contains(Attrs::BOLD));
        assert_eq!(lines[0].fragments[1].0, Style::DEFAULT);
    }
}
