//! ANSI/VT100 escape sequence constants and writers.
//!
//! Covers cursor movement, screen/scroll control, synchronized output,
//! colour emission at all three depths, text attributes, mouse/keyboard
//! protocol toggles, and the capability/clipboard/palette *query* sequences
//! the input parser expects replies to (spec §6).

use std::io::{self, Write};

use crate::style::{color::Rgba, Attrs};

pub const ESC: &str = "\x1b";
pub const CSI: &str = "\x1b[";
pub const OSC: &str = "\x1b]";
pub const BEL: &str = "\x07";
pub const ST: &str = "\x1b\\";

// ---------------------------------------------------------------------------
// Cursor movement
// ---------------------------------------------------------------------------

#[inline]
pub fn cursor_to<W: Write>(w: &mut W, x: u16, y: u16) -> io::Result<()> {
    write!(w, "\x1b[{};{}H", y + 1, x + 1)
}

#[inline]
pub fn cursor_up<W: Write>(w: &mut W, n: u16) -> io::Result<()> {
    if n > 0 { write!(w, "\x1b[{n}A") } else { Ok(()) }
}

#[inline]
pub fn cursor_down<W: Write>(w: &mut W, n: u16) -> io::Result<()> {
    if n > 0 { write!(w, "\x1b[{n}B") } else { Ok(()) }
}

#[inline]
pub fn cursor_forward<W: Write>(w: &mut W, n: u16) -> io::Result<()> {
    if n > 0 { write!(w, "\x1b[{n}C") } else { Ok(()) }
}

#[inline]
pub fn cursor_backward<W: Write>(w: &mut W, n: u16) -> io::Result<()> {
    if n > 0 { write!(w, "\x1b[{n}D") } else { Ok(()) }
}

#[inline]
pub fn cursor_column_zero<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[G")
}

#[inline]
pub fn cursor_next_line<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[E")
}

#[inline]
pub fn cursor_prev_line<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[F")
}

#[inline]
pub fn cursor_save<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b7")
}

#[inline]
pub fn cursor_restore<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b8")
}

#[inline]
pub fn cursor_hide<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[?25l")
}

#[inline]
pub fn cursor_show<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[?25h")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorShape {
    Block,
    Underline,
    Bar,
}

#[inline]
pub fn cursor_shape<W: Write>(w: &mut W, shape: CursorShape, blinking: bool) -> io::Result<()> {
    let n = match (shape, blinking) {
        (CursorShape::Block, true) => 1,
        (CursorShape::Block, false) => 2,
        (CursorShape::Underline, true) => 3,
        (CursorShape::Underline, false) => 4,
        (CursorShape::Bar, true) => 5,
        (CursorShape::Bar, false) => 6,
    };
    write!(w, "\x1b[{n} q")
}

// ---------------------------------------------------------------------------
// Screen control
// ---------------------------------------------------------------------------

#[inline]
pub fn erase_to_eol<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[K")
}

#[inline]
pub fn erase_from_sol<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[1K")
}

#[inline]
pub fn erase_line<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[2K")
}

#[inline]
pub fn erase_down<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[J")
}

#[inline]
pub fn erase_up<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[1J")
}

#[inline]
pub fn erase_screen<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[2J")
}

#[inline]
pub fn clear_screen<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[2J\x1b[3J\x1b[H")
}

#[inline]
pub fn clear_scrollback<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[3J")
}

/// Erase `count` lines upward from the cursor, for inline-mode redraw.
pub fn erase_lines<W: Write>(w: &mut W, count: u16) -> io::Result<()> {
    for _ in 0..count {
        erase_line(w)?;
        cursor_up(w, 1)?;
    }
    erase_line(w)?;
    cursor_column_zero(w)
}

#[inline]
pub fn enter_alt_screen<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[?1049h")
}

#[inline]
pub fn exit_alt_screen<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[?1049l")
}

#[inline]
pub fn scroll_up<W: Write>(w: &mut W, n: u16) -> io::Result<()> {
    write!(w, "\x1b[{n}S")
}

#[inline]
pub fn scroll_down<W: Write>(w: &mut W, n: u16) -> io::Result<()> {
    write!(w, "\x1b[{n}T")
}

// ---------------------------------------------------------------------------
// Synchronized output
// ---------------------------------------------------------------------------

#[inline]
pub fn begin_sync<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[?2026h")
}

#[inline]
pub fn end_sync<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[?2026l")
}

// ---------------------------------------------------------------------------
// Colors
// ---------------------------------------------------------------------------

use crate::config::ColorDepth;

#[inline]
pub fn reset<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[0m")
}

/// Quantize a truecolour value to the nearest of the 16 standard ANSI
/// colours, for `ColorDepth::FourBit` output.
fn nearest_ansi16(color: Rgba) -> u8 {
    let bright = (color.r as u32 + color.g as u32 + color.b as u32) > 255 * 3 / 2;
    let r = color.r > 127;
    let g = color.g > 127;
    let b = color.b > 127;
    let base = (r as u8) | ((g as u8) << 1) | ((b as u8) << 2);
    if bright { base + 8 } else { base }
}

/// Quantize a truecolour value to the 256-colour cube/grayscale ramp, for
/// `ColorDepth::EightBit` output.
fn nearest_ansi256(color: Rgba) -> u8 {
    fn channel(c: i16) -> u8 {
        ((c.clamp(0, 255) as u32 * 5 + 127) / 255) as u8
    }
    16 + 36 * channel(color.r) + 6 * channel(color.g) + channel(color.b)
}

#[inline]
pub fn fg<W: Write>(w: &mut W, color: Rgba, depth: ColorDepth) -> io::Result<()> {
    if color.is_terminal_default() {
        return write!(w, "\x1b[39m");
    }
    if depth == ColorDepth::OneBit {
        return Ok(());
    }
    if color.is_ansi() {
        return emit_ansi_fg(w, color.ansi_index());
    }
    match depth {
        ColorDepth::OneBit => Ok(()),
        ColorDepth::FourBit => emit_ansi_fg(w, nearest_ansi16(color)),
        ColorDepth::EightBit => write!(w, "\x1b[38;5;{}m", nearest_ansi256(color)),
        ColorDepth::TrueColor => write!(w, "\x1b[38;2;{};{};{}m", color.r, color.g, color.b),
    }
}

#[inline]
pub fn bg<W: Write>(w: &mut W, color: Rgba, depth: ColorDepth) -> io::Result<()> {
    if color.is_terminal_default() {
        return write!(w, "\x1b[49m");
    }
    if depth == ColorDepth::OneBit {
        return Ok(());
    }
    if color.is_ansi() {
        return emit_ansi_bg(w, color.ansi_index());
    }
    match depth {
        ColorDepth::OneBit => Ok(()),
        ColorDepth::FourBit => emit_ansi_bg(w, nearest_ansi16(color)),
        ColorDepth::EightBit => write!(w, "\x1b[48;5;{}m", nearest_ansi256(color)),
        ColorDepth::TrueColor => write!(w, "\x1b[48;2;{};{};{}m", color.r, color.g, color.b),
    }
}

fn emit_ansi_fg<W: Write>(w: &mut W, index: u8) -> io::Result<()> {
    if index < 8 {
        write!(w, "\x1b[{}m", 30 + index)
    } else if index < 16 {
        write!(w, "\x1b[{}m", 90 + index - 8)
    } else {
        write!(w, "\x1b[38;5;{index}m")
    }
}

fn emit_ansi_bg<W: Write>(w: &mut W, index: u8) -> io::Result<()> {
    if index < 8 {
        write!(w, "\x1b[{}m", 40 + index)
    } else if index < 16 {
        write!(w, "\x1b[{}m", 100 + index - 8)
    } else {
        write!(w, "\x1b[48;5;{index}m")
    }
}

// ---------------------------------------------------------------------------
// Text attributes
// ---------------------------------------------------------------------------

#[allow(unused_assignments)]
pub fn attrs<W: Write>(w: &mut W, attr: Attrs) -> io::Result<()> {
    if attr.is_empty() {
        return Ok(());
    }
    let mut first = true;
    write!(w, "\x1b[")?;

    macro_rules! emit {
        ($flag:expr, $code:expr) => {
            if attr.contains($flag) {
                if !first {
                    write!(w, ";")?;
                }
                write!(w, "{}", $code)?;
                first = false;
            }
        };
    }

    emit!(Attrs::BOLD, 1);
    emit!(Attrs::DIM, 2);
    emit!(Attrs::ITALIC, 3);
    emit!(Attrs::UNDERLINE, 4);
    emit!(Attrs::UNDERLINE_DOUBLE, "4:2");
    emit!(Attrs::UNDERLINE_CURLY, "4:3");
    emit!(Attrs::UNDERLINE_DOTTED, "4:4");
    emit!(Attrs::UNDERLINE_DASHED, "4:5");
    emit!(Attrs::BLINK, 5);
    emit!(Attrs::BLINK_FAST, 6);
    emit!(Attrs::INVERSE, 7);
    emit!(Attrs::HIDDEN, 8);
    emit!(Attrs::STRIKETHROUGH, 9);
    emit!(Attrs::OVERLINE, 53);

    write!(w, "m")
}

/// SGR 58 underline colour, independent of the foreground colour (spec
/// §3's `underline:`/`ul:` style token). `ColorDepth::OneBit` emits
/// nothing, same as [`fg`]/[`bg`].
pub fn underline_color<W: Write>(w: &mut W, color: Rgba, depth: ColorDepth) -> io::Result<()> {
    if color.is_terminal_default() {
        return write!(w, "\x1b[59m");
    }
    match depth {
        ColorDepth::OneBit => Ok(()),
        ColorDepth::FourBit | ColorDepth::EightBit => write!(w, "\x1b[58:5:{}m", nearest_ansi256(color)),
        ColorDepth::TrueColor => write!(w, "\x1b[58:2::{}:{}:{}m", color.r, color.g, color.b),
    }
}

#[inline]
pub fn reset_overline<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[55m")
}

#[inline]
pub fn reset_bold<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[22m")
}

#[inline]
pub fn reset_italic<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[23m")
}

#[inline]
pub fn reset_underline<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[24m")
}

#[inline]
pub fn reset_blink<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[25m")
}

#[inline]
pub fn reset_inverse<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[27m")
}

#[inline]
pub fn reset_hidden<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[28m")
}

#[inline]
pub fn reset_strikethrough<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[29m")
}

// ---------------------------------------------------------------------------
// Mouse support
// ---------------------------------------------------------------------------

#[inline]
pub fn enable_mouse<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[?1000h\x1b[?1002h\x1b[?1003h\x1b[?1006h")
}

#[inline]
pub fn disable_mouse<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[?1006l\x1b[?1003l\x1b[?1002l\x1b[?1000l")
}

/// Pixel-resolution SGR mouse mode (reports sub-cell `(fx, fy)` fractions).
#[inline]
pub fn enable_mouse_pixel_position<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[?1016h")
}

#[inline]
pub fn disable_mouse_pixel_position<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[?1016l")
}

// ---------------------------------------------------------------------------
// Keyboard protocols
// ---------------------------------------------------------------------------

#[inline]
pub fn enable_kitty_keyboard<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[>1u")
}

#[inline]
pub fn disable_kitty_keyboard<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[<u")
}

#[inline]
pub fn enable_bracketed_paste<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[?2004h")
}

#[inline]
pub fn disable_bracketed_paste<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[?2004l")
}

#[inline]
pub fn enable_focus_reporting<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[?1004h")
}

#[inline]
pub fn disable_focus_reporting<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[?1004l")
}

/// Request the kitty "extended keys" progressive-enhancement report
/// (distinguishing modified keys like shift+enter), queried rather than
/// blindly enabled since a terminal not supporting it simply ignores it.
#[inline]
pub fn query_extended_keys<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[?u")
}

#[inline]
pub fn enable_autowrap<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[?7h")
}

#[inline]
pub fn disable_autowrap<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[?7l")
}

// ---------------------------------------------------------------------------
// Window / title / hyperlinks
// ---------------------------------------------------------------------------

#[inline]
pub fn set_title<W: Write>(w: &mut W, title: &str) -> io::Result<()> {
    write!(w, "\x1b]0;{title}\x07")
}

pub fn link<W: Write>(w: &mut W, text: &str, url: &str) -> io::Result<()> {
    write!(w, "\x1b]8;;{url}\x07{text}\x1b]8;;\x07")
}

// ---------------------------------------------------------------------------
// Clipboard (OSC 52)
// ---------------------------------------------------------------------------

/// Set the system clipboard (`c`) to `text`, base64-encoded per OSC 52.
/// Most terminals gate this behind an explicit opt-in setting; the query
/// counterpart below still works even when writes are disabled.
pub fn osc52_set_clipboard<W: Write>(w: &mut W, text: &str) -> io::Result<()> {
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
    let encoded = BASE64.encode(text.as_bytes());
    write!(w, "\x1b]52;c;{encoded}\x1b\\")
}

/// Query the system clipboard; the terminal replies with the same OSC 52
/// form, `base64`-encoded, which [`crate::input::vt100::Parser`] decodes
/// into [`crate::input::vt100::TerminalResponse::ClipboardData`].
#[inline]
pub fn osc52_query_clipboard<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b]52;c;?\x1b\\")
}

// ---------------------------------------------------------------------------
// Capability / palette / clipboard queries (spec §6)
// ---------------------------------------------------------------------------

/// Cursor position report query (also used as a flush barrier: when its
/// reply arrives, everything written before it has been processed).
#[inline]
pub fn query_cursor_position<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[6n")
}

/// Primary device attributes query.
#[inline]
pub fn query_device_attributes<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[c")
}

/// Text area size in pixels (for graphics cell-size computation).
#[inline]
pub fn query_pixel_size<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[14t")
}

/// Kitty graphics protocol support query (a 1x1 transparent placement that
/// only a kitty-capable terminal will answer).
#[inline]
pub fn query_kitty_graphics_status<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b_Gi=31,s=1,v=1,a=q,t=d,f=24;AAAA\x1b\\")
}

/// iTerm2 proprietary-escape support query.
#[inline]
pub fn query_iterm_graphics_status<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b]1337;ReportCellSize\x07")
}

/// SGR pixel-mode mouse support query (answers distinguish SGR-pixel from
/// plain SGR mouse reporting).
#[inline]
pub fn query_sgr_pixel_mouse_status<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[?1016$p")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_string<F: FnOnce(&mut Vec<u8>) -> io::Result<()>>(f: F) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn cursor_to_is_one_indexed() {
        assert_eq!(to_string(|w| cursor_to(w, 0, 0)), "\x1b[1;1H");
        assert_eq!(to_string(|w| cursor_to(w, 5, 10)), "\x1b[11;6H");
    }

    #[test]
    fn fg_truecolor_vs_depth_snapping() {
        let red = Rgba::rgb(255, 0, 0);
        assert_eq!(to_string(|w| fg(w, red, ColorDepth::TrueColor)), "\x1b[38;2;255;0;0m");
        assert_eq!(to_string(|w| fg(w, red, ColorDepth::OneBit)), "");
        assert_eq!(to_string(|w| fg(w, red, ColorDepth::FourBit)), "\x1b[91m");
    }

    #[test]
    fn fg_ansi_index_ignores_depth() {
        assert_eq!(to_string(|w| fg(w, Rgba::ansi(196), ColorDepth::TrueColor)), "\x1b[38;5;196m");
        assert_eq!(to_string(|w| fg(w, Rgba::ansi(1), ColorDepth::EightBit)), "\x1b[31m");
    }

    #[test]
    fn attrs_emits_combined_sgr() {
        assert_eq!(to_string(|w| attrs(w, Attrs::BOLD | Attrs::UNDERLINE)), "\x1b[1;4m");
        assert_eq!(to_string(|w| attrs(w, Attrs::NONE)), "");
    }

    #[test]
    fn mouse_toggle_sequences() {
        assert_eq!(to_string(enable_mouse), "\x1b[?1000h\x1b[?1002h\x1b[?1003h\x1b[?1006h");
        assert_eq!(to_string(disable_mouse), "\x1b[?1006l\x1b[?1003l\x1b[?1002l\x1b[?1000l");
    }

    #[test]
    fn sync_output_sequences() {
        assert_eq!(to_string(begin_sync), "\x1b[?2026h");
        assert_eq!(to_string(end_sync), "\x1b[?2026l");
    }

    #[test]
    fn underline_color_depth_snapping() {
        let blue = Rgba::rgb(0, 0, 255);
        assert_eq!(to_string(|w| underline_color(w, blue, ColorDepth::TrueColor)), "\x1b[58:2::0:0:255m");
        assert_eq!(to_string(|w| underline_color(w, blue, ColorDepth::OneBit)), "");
        assert_eq!(to_string(|w| underline_color(w, Rgba::TERMINAL_DEFAULT, ColorDepth::TrueColor)), "\x1b[59m");
    }

    #[test]
    fn osc52_set_base64_encodes_and_uses_st_terminator() {
        assert_eq!(to_string(|w| osc52_set_clipboard(w, "hi")), "\x1b]52;c;aGk=\x1b\\");
        assert_eq!(to_string(osc52_query_clipboard), "\x1b]52;c;?\x1b\\");
    }

    #[test]
    fn autowrap_toggle_sequences() {
        assert_eq!(to_string(enable_autowrap), "\x1b[?7h");
        assert_eq!(to_string(disable_autowrap), "\x1b[?7l");
    }
}
