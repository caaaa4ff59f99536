//! Streaming VT100/xterm/kitty escape sequence parser.
//!
//! Consumes raw bytes a chunk at a time and emits structured events: plain
//! keys, CSI/SS3 function keys, kitty keyboard-protocol keys, legacy and SGR
//! mouse reports, focus and bracketed-paste notifications, and replies to
//! the capability/palette/clipboard queries this crate sends at startup (see
//! [`crate::ansi`]'s `query_*` builders). An incomplete sequence at the end
//! of a chunk is held back until more bytes arrive or [`Parser::flush_pending`]
//! commits it literally, mirroring how a real terminal never delays a
//! complete escape sequence but must wait out a lone ESC that might be the
//! start of one.

use std::sync::OnceLock;

use regex::bytes::Regex;

use crate::input::mouse::{self, MouseEvent};

#[derive(Debug, Clone, PartialEq)]
pub enum ParsedEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize(u16, u16),
    FocusGained,
    FocusLost,
    Paste(String),
    Response(TerminalResponse),
    /// A complete sequence this parser has no binding for (an SGR colour
    /// code fed as input, say). Carries the raw bytes it consumed so that
    /// concatenating the `data` of every emitted event still reproduces the
    /// original input even when no event binds to some of it.
    None(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
    pub state: KeyState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    Press,
    Repeat,
    Release,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Copy)]
pub enum KeyCode {
    Char(char),
    Enter,
    Tab,
    Backspace,
    Escape,
    Delete,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
    F(u8),
    Null,
}

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const NONE  = 0;
        const SHIFT = 1 << 0;
        const ALT   = 1 << 1;
        const CTRL  = 1 << 2;
        const SUPER = 1 << 3;
    }
}

/// A terminal's reply to one of the capability/palette/clipboard queries
/// this crate sends; see spec §6's response table.
#[derive(Debug, Clone, PartialEq)]
pub enum TerminalResponse {
    /// Reply to an OSC 4/10/11 colour query: palette index (`None` for
    /// fg/bg), red/green/blue as raw hex channel strings.
    Colors { index: Option<u8>, r: String, g: String, b: String },
    /// Reply to the `\x1b[?2031h` palette-change subscription's DSR probe.
    PaletteDsr { mode: u8 },
    /// Reply to `\x1b[14t`: cell size in pixels.
    PixelSize { height: u16, width: u16 },
    KittyGraphicsStatus { ok: bool },
    /// Reply to `\x1b[c`: the raw semicolon-separated attribute list.
    DeviceAttributes { attrs: String },
    ItermGraphicsStatus { term: String },
    /// Reply to `\x1b[?1016$p`: whether SGR-pixel mouse mode is supported.
    SgrPixelStatus { mode: u8 },
    /// Reply to an OSC 52 clipboard read: base64-encoded payload.
    ClipboardData { data: String },
    /// Reply to `\x1b[6n`: 1-indexed cursor row/column. Singled out in the
    /// key processor, which must act on a CPR even after exit has been
    /// requested — it is how an in-flight scroll-region probe gets
    /// answered regardless of app lifecycle.
    CursorPosition { row: u16, col: u16 },
}

fn query_patterns() -> &'static [(Regex, fn(&regex::bytes::Captures) -> TerminalResponse)] {
    static PATTERNS: OnceLock<Vec<(Regex, fn(&regex::bytes::Captures) -> TerminalResponse)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        fn bstr(c: &regex::bytes::Captures, name: &str) -> String {
            String::from_utf8_lossy(&c[name]).into_owned()
        }
        vec![
            (
                Regex::new(
                    r"^\x1b\](?:4;(?P<idx>\d+)|1[01]);rgb:(?P<r>[0-9A-Fa-f]{2,4})/(?P<g>[0-9A-Fa-f]{2,4})/(?P<b>[0-9A-Fa-f]{2,4})(?:\x1b\\|\x9c|\x07)",
                )
                .unwrap(),
                (|c: &regex::bytes::Captures| TerminalResponse::Colors {
                    index: c.name("idx").and_then(|m| std::str::from_utf8(m.as_bytes()).ok()?.parse().ok()),
                    r: bstr(c, "r"),
                    g: bstr(c, "g"),
                    b: bstr(c, "b"),
                }) as fn(&regex::bytes::Captures) -> TerminalResponse,
            ),
            (
                Regex::new(r"^\x1b\[\?997;(?P<mode>\d)n").unwrap(),
                |c| TerminalResponse::PaletteDsr { mode: bstr(c, "mode").parse().unwrap_or(0) },
            ),
            (
                Regex::new(r"^\x1b\[4;(?P<y>\d+);(?P<x>\d+)t").unwrap(),
                |c| TerminalResponse::PixelSize {
                    height: bstr(c, "y").parse().unwrap_or(0),
                    width: bstr(c, "x").parse().unwrap_or(0),
                },
            ),
            (
                Regex::new(r"^\x1b_Gi=(?:4294967295|0);(?P<status>OK)\x1b\\").unwrap(),
                |_| TerminalResponse::KittyGraphicsStatus { ok: true },
            ),
            (
                Regex::new(r"^\x1b\[\?(?P<attrs>[\d;]*)c").unwrap(),
                |c| TerminalResponse::DeviceAttributes { attrs: bstr(c, "attrs") },
            ),
            (
                Regex::new(r"^\x1bP>\|(?P<term>[^\x1b]+)\x1b\\").unwrap(),
                |c| TerminalResponse::ItermGraphicsStatus { term: bstr(c, "term") },
            ),
            (
                Regex::new(r"^\x1b\[\?1016;(?P<mode>\d)\$").unwrap(),
                |c| TerminalResponse::SgrPixelStatus { mode: bstr(c, "mode").parse().unwrap_or(0) },
            ),
            (
                Regex::new(r"^\x1b\]52;(?:c|p)?;(?P<data>[A-Za-z0-9+/=]+)\x1b\\").unwrap(),
                |c| TerminalResponse::ClipboardData { data: bstr(c, "data") },
            ),
            (
                Regex::new(r"^\x1b\[(?P<row>\d+);(?P<col>\d+)R").unwrap(),
                |c| TerminalResponse::CursorPosition {
                    row: bstr(c, "row").parse().unwrap_or(0),
                    col: bstr(c, "col").parse().unwrap_or(0),
                },
            ),
        ]
    })
}

enum ParseResult {
    Event(ParsedEvent),
    Incomplete,
    None,
}

fn key(code: KeyCode, modifiers: Modifiers) -> ParsedEvent {
    ParsedEvent::Key(KeyEvent { code, modifiers, state: KeyState::Press })
}

fn decode_modifier(param: u32) -> Modifiers {
    let val = if param > 0 { param - 1 } else { 0 };
    let mut m = Modifiers::NONE;
    if val & 1 != 0 {
        m |= Modifiers::SHIFT;
    }
    if val & 2 != 0 {
        m |= Modifiers::ALT;
    }
    if val & 4 != 0 {
        m |= Modifiers::CTRL;
    }
    if val & 8 != 0 {
        m |= Modifiers::SUPER;
    }
    m
}

/// Streaming input parser; owns a growable buffer of not-yet-parsed bytes.
pub struct Parser {
    buf: Vec<u8>,
    /// Terminal-reported cell pixel size, once known, used to derive
    /// sub-cell `(fx, fy)` fractions from SGR pixel-position mouse reports.
    cell_pixel_size: Option<(u16, u16)>,
}

impl Parser {
    pub fn new() -> Self {
        Self { buf: Vec::with_capacity(64), cell_pixel_size: None }
    }

    pub fn set_cell_pixel_size(&mut self, size: Option<(u16, u16)>) {
        self.cell_pixel_size = size;
    }

    /// Parse as many complete events as the currently buffered bytes allow;
    /// leaves any trailing incomplete sequence buffered for the next call.
    pub fn parse(&mut self, data: &[u8]) -> Vec<ParsedEvent> {
        self.buf.extend_from_slice(data);
        let mut events = Vec::new();

        while !self.buf.is_empty() {
            match self.try_parse_one() {
                ParseResult::Event(ev) => events.push(ev),
                ParseResult::Incomplete => break,
                ParseResult::None => {
                    self.buf.remove(0);
                }
            }
        }

        events
    }

    /// Whether a possibly-incomplete sequence is buffered, waiting either
    /// for more bytes or for [`Self::flush_pending`] to commit it literally.
    pub fn has_pending(&self) -> bool {
        !self.buf.is_empty()
    }

    /// Commit whatever is buffered as literal key events. Called once the
    /// short flush timer fires without the sequence completing — the
    /// classic way of telling a standalone ESC apart from the prefix of a
    /// longer one without making every ESC press feel laggy.
    pub fn flush_pending(&mut self) -> Vec<ParsedEvent> {
        let mut events = Vec::new();
        while !self.buf.is_empty() {
            let byte = self.buf.remove(0);
            events.push(key(KeyCode::Char(byte as char), Modifiers::NONE));
        }
        events
    }

    fn try_parse_one(&mut self) -> ParseResult {
        if self.buf.is_empty() {
            return ParseResult::None;
        }

        if let Some(result) = self.try_query_response() {
            return result;
        }

        let first = self.buf[0];
        match first {
            0x1B => self.parse_escape(),
            0x00 => {
                self.consume(1);
                ParseResult::Event(key(KeyCode::Null, Modifiers::CTRL))
            }
            0x01..=0x07 | 0x0B..=0x0C | 0x0E..=0x1A => {
                let ch = (first + b'a' - 1) as char;
                self.consume(1);
                ParseResult::Event(key(KeyCode::Char(ch), Modifiers::CTRL))
            }
            0x08 | 0x7F => {
                self.consume(1);
                ParseResult::Event(key(KeyCode::Backspace, Modifiers::NONE))
            }
            0x09 => {
                self.consume(1);
                ParseResult::Event(key(KeyCode::Tab, Modifiers::NONE))
            }
            0x0A | 0x0D => {
                self.consume(1);
                ParseResult::Event(key(KeyCode::Enter, Modifiers::NONE))
            }
            0x20..=0x7E => {
                let ch = first as char;
                self.consume(1);
                ParseResult::Event(key(KeyCode::Char(ch), Modifiers::NONE))
            }
            0x80..=0xFF => self.parse_utf8(),
            // `parse`'s caller drops one byte itself on `ParseResult::None`;
            // don't also consume here or two bytes vanish instead of one.
            _ => ParseResult::None,
        }
    }

    /// Check the buffer against the terminal-query response table before
    /// falling back to the general key/mouse parser, since several replies
    /// (OSC colour, DCS iTerm status) share a prefix with sequences that
    /// mean something else as input.
    fn try_query_response(&mut self) -> Option<ParseResult> {
        for (re, build) in query_patterns() {
            if let Some(m) = re.find(&self.buf) {
                if m.start() != 0 {
                    continue;
                }
                let caps = re.captures(&self.buf)?;
                let response = build(&caps);
                let len = m.end();
                self.consume(len);
                return Some(ParseResult::Event(ParsedEvent::Response(response)));
            }
        }
        None
    }

    fn parse_escape(&mut self) -> ParseResult {
        if self.buf.len() < 2 {
            return ParseResult::Incomplete;
        }

        match self.buf[1] {
            b'[' => self.parse_csi(),
            b'O' => self.parse_ss3(),
            b']' | b'P' | b'_' | b'X' | b'^' => self.parse_string_sequence(),
            0x20..=0x7E => {
                let ch = self.buf[1] as char;
                self.consume(2);
                ParseResult::Event(key(KeyCode::Char(ch), Modifiers::ALT))
            }
            0x1B => {
                self.consume(2);
                ParseResult::Event(key(KeyCode::Escape, Modifiers::ALT))
            }
            _ => {
                self.consume(1);
                ParseResult::Event(key(KeyCode::Escape, Modifiers::NONE))
            }
        }
    }

    /// OSC/DCS/APC/PM/SOS sequences not already matched as a known query
    /// reply: forwarded as a zero-width escape once terminated by ST
    /// (`\x1b\\`) or BEL, since their effect (hyperlink, clipboard write,
    /// sixel image) happens terminal-side regardless of whether this parser
    /// understands the payload.
    fn parse_string_sequence(&mut self) -> ParseResult {
        let mut i = 2;
        loop {
            if i >= self.buf.len() {
                return ParseResult::Incomplete;
            }
            if self.buf[i] == 0x07 {
                i += 1;
                break;
            }
            if self.buf[i] == 0x1B {
                if i + 1 >= self.buf.len() {
                    return ParseResult::Incomplete;
                }
                if self.buf[i + 1] == b'\\' {
                    i += 2;
                    break;
                }
            }
            i += 1;
        }
        let raw = self.buf[..i].to_vec();
        self.consume(i);
        ParseResult::Event(ParsedEvent::None(raw))
    }

    fn parse_csi(&mut self) -> ParseResult {
        if self.buf.len() < 3 {
            return ParseResult::Incomplete;
        }

        if self.buf[2] == b'<' {
            return self.parse_sgr_mouse();
        }
        if self.buf[2] == b'M' {
            return self.parse_x10_mouse();
        }
        if self.buf[2] == b'I' {
            self.consume(3);
            return ParseResult::Event(ParsedEvent::FocusGained);
        }
        if self.buf[2] == b'O' {
            self.consume(3);
            return ParseResult::Event(ParsedEvent::FocusLost);
        }

        let mut end = 2;
        while end < self.buf.len() {
            if (0x40..=0x7E).contains(&self.buf[end]) {
                break;
            }
            end += 1;
        }
        if end >= self.buf.len() {
            return ParseResult::Incomplete;
        }

        let final_byte = self.buf[end];
        let params_str = String::from_utf8_lossy(&self.buf[2..end]).to_string();
        let params: Vec<u32> = params_str.split(';').map(|s| s.parse::<u32>().unwrap_or(0)).collect();
        let consumed = end + 1;

        if final_byte == b'u' {
            self.consume(consumed);
            return self.parse_kitty_key(&params);
        }

        let modifiers =
            if params.len() >= 2 && params[1] > 0 { decode_modifier(params[1]) } else { Modifiers::NONE };
        let raw = self.buf[..consumed].to_vec();

        let event = match final_byte {
            b'A' => key(KeyCode::Up, modifiers),
            b'B' => key(KeyCode::Down, modifiers),
            b'C' => key(KeyCode::Right, modifiers),
            b'D' => key(KeyCode::Left, modifiers),
            b'H' => key(KeyCode::Home, modifiers),
            b'F' => key(KeyCode::End, modifiers),
            b'P' => key(KeyCode::F(1), modifiers),
            b'Q' => key(KeyCode::F(2), modifiers),
            b'R' => key(KeyCode::F(3), modifiers),
            b'S' => key(KeyCode::F(4), modifiers),
            b'Z' => key(KeyCode::Tab, Modifiers::SHIFT),
            b'~' => match params.first().copied().unwrap_or(0) {
                1 => key(KeyCode::Home, modifiers),
                2 => key(KeyCode::Insert, modifiers),
                3 => key(KeyCode::Delete, modifiers),
                4 => key(KeyCode::End, modifiers),
                5 => key(KeyCode::PageUp, modifiers),
                6 => key(KeyCode::PageDown, modifiers),
                15 => key(KeyCode::F(5), modifiers),
                17 => key(KeyCode::F(6), modifiers),
                18 => key(KeyCode::F(7), modifiers),
                19 => key(KeyCode::F(8), modifiers),
                20 => key(KeyCode::F(9), modifiers),
                21 => key(KeyCode::F(10), modifiers),
                23 => key(KeyCode::F(11), modifiers),
                24 => key(KeyCode::F(12), modifiers),
                200 => {
                    self.consume(consumed);
                    return self.parse_bracketed_paste();
                }
                _ => ParsedEvent::None(raw.clone()),
            },
            _ => ParsedEvent::None(raw.clone()),
        };

        self.consume(consumed);
        ParseResult::Event(event)
    }

    /// `ESC [ 200~ <text> ESC [ 201~`, already past the opening marker.
    fn parse_bracketed_paste(&mut self) -> ParseResult {
        const END: &[u8] = b"\x1b[201~";
        match self.buf.windows(END.len()).position(|w| w == END) {
            Some(pos) => {
                let text = String::from_utf8_lossy(&self.buf[..pos]).into_owned();
                self.consume(pos + END.len());
                ParseResult::Event(ParsedEvent::Paste(text))
            }
            None => ParseResult::Incomplete,
        }
    }

    fn parse_ss3(&mut self) -> ParseResult {
        if self.buf.len() < 3 {
            return ParseResult::Incomplete;
        }
        let event = match self.buf[2] {
            b'A' => key(KeyCode::Up, Modifiers::NONE),
            b'B' => key(KeyCode::Down, Modifiers::NONE),
            b'C' => key(KeyCode::Right, Modifiers::NONE),
            b'D' => key(KeyCode::Left, Modifiers::NONE),
            b'H' => key(KeyCode::Home, Modifiers::NONE),
            b'F' => key(KeyCode::End, Modifiers::NONE),
            b'P' => key(KeyCode::F(1), Modifiers::NONE),
            b'Q' => key(KeyCode::F(2), Modifiers::NONE),
            b'R' => key(KeyCode::F(3), Modifiers::NONE),
            b'S' => key(KeyCode::F(4), Modifiers::NONE),
            _ => ParsedEvent::None(self.buf[..3].to_vec()),
        };
        self.consume(3);
        ParseResult::Event(event)
    }

    fn parse_sgr_mouse(&mut self) -> ParseResult {
        let start = 3;
        let mut end = start;
        while end < self.buf.len() {
            if self.buf[end] == b'M' || self.buf[end] == b'm' {
                break;
            }
            end += 1;
        }
        if end >= self.buf.len() {
            return ParseResult::Incomplete;
        }

        let is_release = self.buf[end] == b'm';
        let params_str = String::from_utf8_lossy(&self.buf[start..end]).to_string();
        let parts: Vec<u16> = params_str.split(';').map(|s| s.parse().unwrap_or(0)).collect();
        let raw = self.buf[..end + 1].to_vec();
        self.consume(end + 1);

        if parts.len() < 3 {
            return ParseResult::Event(ParsedEvent::None(raw));
        }

        let event = mouse::decode_sgr(parts[0], parts[1], parts[2], is_release, self.cell_pixel_size);
        ParseResult::Event(ParsedEvent::Mouse(event))
    }

    fn parse_x10_mouse(&mut self) -> ParseResult {
        if self.buf.len() < 6 {
            return ParseResult::Incomplete;
        }
        let event = mouse::decode_x10(self.buf[3], self.buf[4], self.buf[5]);
        self.consume(6);
        ParseResult::Event(ParsedEvent::Mouse(event))
    }

    fn parse_kitty_key(&self, params: &[u32]) -> ParseResult {
        let codepoint = params.first().copied().unwrap_or(0);
        let modifiers = if params.len() >= 2 { decode_modifier(params[1]) } else { Modifiers::NONE };
        let state = if params.len() >= 3 {
            match params[2] {
                2 => KeyState::Repeat,
                3 => KeyState::Release,
                _ => KeyState::Press,
            }
        } else {
            KeyState::Press
        };

        let code = match codepoint {
            9 => KeyCode::Tab,
            13 => KeyCode::Enter,
            27 => KeyCode::Escape,
            127 => KeyCode::Backspace,
            cp => char::from_u32(cp).map(KeyCode::Char).unwrap_or(KeyCode::Null),
        };

        ParseResult::Event(ParsedEvent::Key(KeyEvent { code, modifiers, state }))
    }

    fn parse_utf8(&mut self) -> ParseResult {
        let first = self.buf[0];
        let expected_len = if first & 0xE0 == 0xC0 {
            2
        } else if first & 0xF0 == 0xE0 {
            3
        } else if first & 0xF8 == 0xF0 {
            4
        } else {
            // `parse`'s caller drops one byte itself on `ParseResult::None`.
            return ParseResult::None;
        };

        if self.buf.len() < expected_len {
            return ParseResult::Incomplete;
        }

        let s = String::from_utf8_lossy(&self.buf[..expected_len]).to_string();
        self.consume(expected_len);

        match s.chars().next() {
            Some(ch) => ParseResult::Event(key(KeyCode::Char(ch), Modifiers::NONE)),
            None => ParseResult::None,
        }
    }

    fn consume(&mut self, n: usize) {
        self.buf.drain(..n);
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_bytes(data: &[u8]) -> Vec<ParsedEvent> {
        Parser::new().parse(data)
    }

    #[test]
    fn ascii_chars_become_key_events() {
        let events = parse_bytes(b"abc");
        assert_eq!(events.len(), 3);
        assert_eq!(events[0], key(KeyCode::Char('a'), Modifiers::NONE));
    }

    #[test]
    fn ctrl_c_decodes_as_modifier() {
        assert_eq!(parse_bytes(b"\x03")[0], key(KeyCode::Char('c'), Modifiers::CTRL));
    }

    #[test]
    fn arrow_keys() {
        assert_eq!(parse_bytes(b"\x1b[A")[0], key(KeyCode::Up, Modifiers::NONE));
        assert_eq!(parse_bytes(b"\x1b[D")[0], key(KeyCode::Left, Modifiers::NONE));
    }

    #[test]
    fn function_keys_ss3_and_tilde_forms() {
        assert_eq!(parse_bytes(b"\x1bOP")[0], key(KeyCode::F(1), Modifiers::NONE));
        assert_eq!(parse_bytes(b"\x1b[15~")[0], key(KeyCode::F(5), Modifiers::NONE));
    }

    #[test]
    fn alt_prefixed_char() {
        assert_eq!(parse_bytes(b"\x1bx")[0], key(KeyCode::Char('x'), Modifiers::ALT));
    }

    #[test]
    fn kitty_key_with_repeat_state() {
        let events = parse_bytes(b"\x1b[97;1:2u");
        match &events[0] {
            ParsedEvent::Key(k) => {
                assert_eq!(k.code, KeyCode::Char('a'));
                assert_eq!(k.state, KeyState::Repeat);
            }
            other => panic!("expected key event, got {other:?}"),
        }
    }

    #[test]
    fn sgr_mouse_press_decodes_through_mouse_module() {
        let events = parse_bytes(b"\x1b[<0;10;20M");
        match &events[0] {
            ParsedEvent::Mouse(m) => assert_eq!((m.x, m.y), (9, 19)),
            other => panic!("expected mouse event, got {other:?}"),
        }
    }

    #[test]
    fn bracketed_paste_captures_inner_text() {
        let events = parse_bytes(b"\x1b[200~hello\x1b[201~");
        assert_eq!(events[0], ParsedEvent::Paste("hello".to_string()));
    }

    #[test]
    fn focus_gained_and_lost() {
        assert_eq!(parse_bytes(b"\x1b[I")[0], ParsedEvent::FocusGained);
        assert_eq!(parse_bytes(b"\x1b[O")[0], ParsedEvent::FocusLost);
    }

    #[test]
    fn unknown_osc_sequence_is_forwarded_as_noop() {
        let input: &[u8] = b"\x1b]8;;http://example.com\x1b\\";
        let events = parse_bytes(input);
        assert_eq!(events, vec![ParsedEvent::None(input.to_vec())]);
    }

    #[test]
    fn unrecognised_sgr_sequence_keeps_its_raw_bytes() {
        let input: &[u8] = b"\x1b[31m";
        let events = parse_bytes(input);
        match &events[0] {
            ParsedEvent::None(data) => assert_eq!(data, input),
            other => panic!("expected a byte-preserving no-op, got {other:?}"),
        }
    }

    /// A stray unassigned C0 byte (not the start of any recognised
    /// sequence) must drop exactly one byte, not swallow the keystroke
    /// that follows it.
    #[test]
    fn stray_byte_does_not_swallow_the_next_char() {
        let events = parse_bytes(b"\x1ca");
        assert_eq!(events, vec![key(KeyCode::Char('a'), Modifiers::NONE)]);
    }

    /// Same contract for an invalid UTF-8 lead byte.
    #[test]
    fn invalid_utf8_lead_byte_does_not_swallow_the_next_char() {
        let events = parse_bytes(b"\xffa");
        assert_eq!(events, vec![key(KeyCode::Char('a'), Modifiers::NONE)]);
    }

    #[test]
    fn pixel_size_response_recognized() {
        let events = parse_bytes(b"\x1b[4;20;10t");
        assert_eq!(events[0], ParsedEvent::Response(TerminalResponse::PixelSize { height: 20, width: 10 }));
    }

    #[test]
    fn color_response_recognized() {
        let events = parse_bytes(b"\x1b]11;rgb:1234/5678/9abc\x1b\\");
        match &events[0] {
            ParsedEvent::Response(TerminalResponse::Colors { r, g, b, .. }) => {
                assert_eq!(r, "1234");
                assert_eq!(g, "5678");
                assert_eq!(b, "9abc");
            }
            other => panic!("expected colors response, got {other:?}"),
        }
    }

    #[test]
    fn clipboard_response_recognized() {
        let events = parse_bytes(b"\x1b]52;c;aGVsbG8=\x1b\\");
        assert_eq!(
            events[0],
            ParsedEvent::Response(TerminalResponse::ClipboardData { data: "aGVsbG8=".to_string() })
        );
    }

    #[test]
    fn cursor_position_response_recognized() {
        let events = parse_bytes(b"\x1b[24;80R");
        assert_eq!(events[0], ParsedEvent::Response(TerminalResponse::CursorPosition { row: 24, col: 80 }));
    }

    #[test]
    fn incomplete_csi_waits_for_more_bytes() {
        let mut parser = Parser::new();
        let events = parser.parse(b"\x1b[");
        assert!(events.is_empty());
        assert!(parser.has_pending());
        let events = parser.parse(b"A");
        assert_eq!(events[0], key(KeyCode::Up, Modifiers::NONE));
    }

    #[test]
    fn flush_pending_commits_lone_escape() {
        let mut parser = Parser::new();
        parser.parse(b"\x1b");
        assert!(parser.has_pending());
        let events = parser.flush_pending();
        assert_eq!(events, vec![key(KeyCode::Char('\x1b'), Modifiers::NONE)]);
    }

    #[test]
    fn modifier_decode_matches_one_based_csi_params() {
        assert_eq!(decode_modifier(2), Modifiers::SHIFT);
        assert_eq!(decode_modifier(3), Modifiers::ALT);
        assert_eq!(decode_modifier(5), Modifiers::CTRL);
    }
}
