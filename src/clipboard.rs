//! OSC-52 clipboard access.
//!
//! Grounded on `euporie/apptk/clipboard/osc52.py`: the only portable way a
//! terminal application can reach the system clipboard without a platform
//! clipboard library is asking the terminal emulator to do it via OSC 52,
//! which works identically over SSH. [`ansi::osc52_set_clipboard`] and
//! [`ansi::osc52_query_clipboard`] already build the escape sequences;
//! this module adds the timeout-gated request/response pairing spec §5's
//! query-timeout policy requires — a terminal that doesn't support OSC 52
//! clipboard reads simply never replies, so a get() call needs a deadline
//! rather than blocking forever.

use std::io::Write;
use std::time::{Duration, Instant};

use crate::ansi;
use crate::error::{CoreError, Result};
use crate::input::vt100::TerminalResponse;

/// Sets and requests the system clipboard over OSC 52.
///
/// `get()` only builds the request; the caller is responsible for feeding
/// terminal input through [`crate::input::vt100::Parser`] and matching
/// [`TerminalResponse::ClipboardData`] against the deadline this type
/// hands back, since this crate has no opinion on how the caller's event
/// loop is structured (spec §5's single cooperative loop is the expected
/// shape, but not mandated here).
pub struct Osc52Clipboard {
    timeout: Duration,
}

impl Osc52Clipboard {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Write the OSC-52 set-clipboard sequence for `text`.
    pub fn set<W: Write>(&self, w: &mut W, text: &str) -> Result<()> {
        ansi::osc52_set_clipboard(w, text).map_err(CoreError::Io)
    }

    /// Write the OSC-52 clipboard query and return the deadline by which a
    /// reply must arrive; past that, treat the clipboard as unreadable.
    pub fn request<W: Write>(&self, w: &mut W) -> Result<Instant> {
        ansi::osc52_query_clipboard(w).map_err(CoreError::Io)?;
        Ok(Instant::now() + self.timeout)
    }

    /// Given a parsed terminal response and the deadline `request` handed
    /// back, extract the clipboard text if this is the reply we asked for
    /// and it arrived in time.
    pub fn resolve(&self, response: &TerminalResponse, deadline: Instant) -> Option<String> {
        if Instant::now() > deadline {
            return None;
        }
        match response {
            TerminalResponse::ClipboardData { data } => decode_osc52_payload(data),
            _ => None,
        }
    }
}

/// OSC-52 payloads are base64; `?` (in a query echoed back) and empty
/// strings mean "nothing on the clipboard or unsupported".
fn decode_osc52_payload(data: &str) -> Option<String> {
    if data.is_empty() || data == "?" {
        return None;
    }
    use base64::Engine;
    let bytes = base64::engine::general_purpose::STANDARD.decode(data).ok()?;
    String::from_utf8(bytes).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_string(f: impl FnOnce(&mut Vec<u8>) -> Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn set_emits_osc52_sequence() {
        let out = to_string(|w| Osc52Clipboard::new(Duration::from_secs(1)).set(w, "hi"));
        assert_eq!(out, "\x1b]52;c;aGk=\x1b\\");
    }

    #[test]
    fn request_returns_a_future_deadline() {
        let clip = Osc52Clipboard::new(Duration::from_secs(5));
        let mut buf = Vec::new();
        let deadline = clip.request(&mut buf).unwrap();
        assert!(deadline > Instant::now());
    }

    #[test]
    fn resolve_decodes_base64_payload_before_deadline() {
        let clip = Osc52Clipboard::new(Duration::from_secs(5));
        let deadline = Instant::now() + Duration::from_secs(5);
        let response = TerminalResponse::ClipboardData { data: "aGVsbG8=".to_string() };
        assert_eq!(clip.resolve(&response, deadline), Some("hello".to_string()));
    }

    #[test]
    fn resolve_rejects_reply_after_deadline() {
        let clip = Osc52Clipboard::new(Duration::from_secs(5));
        let deadline = Instant::now() - Duration::from_millis(1);
        let response = TerminalResponse::ClipboardData { data: "aGVsbG8=".to_string() };
        assert_eq!(clip.resolve(&response, deadline), None);
    }

    #[test]
    fn resolve_treats_query_echo_as_empty_clipboard() {
        let clip = Osc52Clipboard::new(Duration::from_secs(5));
        let deadline = Instant::now() + Duration::from_secs(5);
        let response = TerminalResponse::ClipboardData { data: "?".to_string() };
        assert_eq!(clip.resolve(&response, deadline), None);
    }
}
