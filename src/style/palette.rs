//! Dynamic terminal palette probing.
//!
//! At startup the core asks the terminal what its 16 ANSI colours and its
//! foreground/background actually resolve to (OSC 4 / OSC 10 / OSC 11), so
//! an `Attrs`-level `ansi(n)` colour can be rendered faithfully at 24-bit
//! depth instead of re-emitting the indexed escape and hoping the terminal's
//! theme matches what the author had in mind. `\x1b[?2031h` subscribes to
//! live palette-change notifications (the user switched their terminal
//! theme); when one arrives, cached resolutions are dropped so the next
//! lookup re-probes.

use std::collections::HashMap;

use crate::style::color::Rgba;

/// A terminal's resolved ANSI palette, lazily populated from query
/// responses.
#[derive(Debug, Clone, Default)]
pub struct Palette {
    resolved: HashMap<u8, Rgba>,
    foreground: Option<Rgba>,
    background: Option<Rgba>,
}

impl Palette {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a resolved ANSI index from an OSC 4 reply.
    pub fn set_ansi(&mut self, index: u8, color: Rgba) {
        self.resolved.insert(index, color);
    }

    pub fn set_foreground(&mut self, color: Rgba) {
        self.foreground = Some(color);
    }

    pub fn set_background(&mut self, color: Rgba) {
        self.background = Some(color);
    }

    /// Resolve an `Rgba::ansi(n)` colour to a concrete truecolour value if
    /// the palette has learned it; otherwise returns the colour unchanged
    /// (the caller falls back to emitting the indexed escape).
    pub fn resolve(&self, color: Rgba) -> Rgba {
        if !color.is_ansi() {
            return color;
        }
        self.resolved.get(&color.ansi_index()).copied().unwrap_or(color)
    }

    pub fn foreground(&self) -> Option<Rgba> {
        self.foreground
    }

    pub fn background(&self) -> Option<Rgba> {
        self.background
    }

    /// Drop every cached resolution. Called when the terminal reports (via
    /// the `\x1b[?2031h`-subscribed notification) that the user's colour
    /// scheme changed live; the next `resolve()` call for each index will
    /// again return the stale indexed colour until fresh OSC 4 replies
    /// repopulate it.
    pub fn invalidate(&mut self) {
        self.resolved.clear();
        self.foreground = None;
        self.background = None;
    }

    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty() && self.foreground.is_none() && self.background.is_none()
    }
}

/// Build the OSC 4 query for a single ANSI index (`0..=255`).
pub fn query_ansi_index(index: u8) -> String {
    format!("\x1b]4;{index};?\x1b\\")
}

/// Build the OSC 10 query for the default foreground colour.
pub fn query_foreground() -> &'static str {
    "\x1b]10;?\x1b\\"
}

/// Build the OSC 11 query for the default background colour.
pub fn query_background() -> &'static str {
    "\x1b]11;?\x1b\\"
}

/// Subscribe to live palette-change notifications.
pub fn subscribe_change_notifications() -> &'static str {
    "\x1b[?2031h"
}

pub fn unsubscribe_change_notifications() -> &'static str {
    "\x1b[?2031l"
}

/// Parse an `rgb:rrrr/gggg/bbbb` payload as found in OSC 4/10/11 replies
/// (each channel is 2 or 4 hex digits; the high byte is kept, matching how
/// terminals answer even when queried with 8-bit colours).
pub fn parse_rgb_reply(payload: &str) -> Option<Rgba> {
    let rest = payload.strip_prefix("rgb:")?;
    let mut parts = rest.split('/');
    let r = parse_channel(parts.next()?)?;
    let g = parse_channel(parts.next()?)?;
    let b = parse_channel(parts.next()?)?;
    Some(Rgba::rgb(r, g, b))
}

fn parse_channel(hex: &str) -> Option<u8> {
    let value = u32::from_str_radix(hex, 16).ok()?;
    let bits = hex.len() * 4;
    Some(if bits > 8 { (value >> (bits - 8)) as u8 } else { (value << (8 - bits)) as u8 })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_falls_back_when_unknown() {
        let palette = Palette::new();
        assert_eq!(palette.resolve(Rgba::ansi(1)), Rgba::ansi(1));
    }

    #[test]
    fn resolve_returns_learned_value() {
        let mut palette = Palette::new();
        palette.set_ansi(1, Rgba::rgb(200, 30, 30));
        assert_eq!(palette.resolve(Rgba::ansi(1)), Rgba::rgb(200, 30, 30));
    }

    #[test]
    fn non_ansi_colors_pass_through_unchanged() {
        let palette = Palette::new();
        let rgb = Rgba::rgb(10, 20, 30);
        assert_eq!(palette.resolve(rgb), rgb);
    }

    #[test]
    fn invalidate_clears_everything() {
        let mut palette = Palette::new();
        palette.set_ansi(2, Rgba::GREEN);
        palette.set_foreground(Rgba::WHITE);
        palette.invalidate();
        assert!(palette.is_empty());
    }

    #[test]
    fn parse_rgb_reply_handles_16_bit_channels() {
        assert_eq!(parse_rgb_reply("rgb:ffff/0000/0000"), Some(Rgba::rgb(255, 0, 0)));
        assert_eq!(parse_rgb_reply("rgb:ff/00/80"), Some(Rgba::rgb(255, 0, 0x80)));
        assert_eq!(parse_rgb_reply("garbage"), None);
    }
}
