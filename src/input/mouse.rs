//! Mouse event model and decoding.
//!
//! Covers the two wire formats the VT100 parser can see — legacy X10 (`ESC
//! [ M Cb Cx Cy`, coordinates capped at 223) and SGR (`ESC [ < Cb ; Px ; Py
//! M/m`, unbounded) — plus SGR pixel-position mode, which reports the same
//! shape but in pixels rather than cells; the fractional `(fx, fy)` offset
//! within the cell is recovered by the caller from the configured cell
//! pixel size (queried via `\x1b[14t`, spec §6).

use crate::input::vt100::Modifiers;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseKind {
    Press(MouseButton),
    Release(MouseButton),
    Move,
    ScrollUp,
    ScrollDown,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseEvent {
    pub kind: MouseKind,
    /// Cell column, 0-indexed.
    pub x: u16,
    /// Cell row, 0-indexed.
    pub y: u16,
    /// Sub-cell horizontal fraction in `[0.0, 1.0)`, from pixel-position
    /// mode; `0.0` when the terminal only reports cell coordinates.
    pub fx: f32,
    /// Sub-cell vertical fraction, see `fx`.
    pub fy: f32,
    pub modifiers: Modifiers,
}

impl MouseEvent {
    fn at_cell(kind: MouseKind, x: u16, y: u16, modifiers: Modifiers) -> Self {
        Self { kind, x, y, fx: 0.0, fy: 0.0, modifiers }
    }
}

fn decode_modifiers(cb: u16) -> Modifiers {
    let mut m = Modifiers::NONE;
    if cb & 4 != 0 {
        m |= Modifiers::SHIFT;
    }
    if cb & 8 != 0 {
        m |= Modifiers::ALT;
    }
    if cb & 16 != 0 {
        m |= Modifiers::CTRL;
    }
    m
}

fn decode_kind(cb: u16, is_release: bool) -> MouseKind {
    let base = cb & 3;
    let button = |base: u16| match base {
        0 => MouseButton::Left,
        1 => MouseButton::Middle,
        _ => MouseButton::Right,
    };
    if cb & 64 != 0 {
        if base == 0 { MouseKind::ScrollUp } else { MouseKind::ScrollDown }
    } else if cb & 32 != 0 {
        MouseKind::Move
    } else if is_release {
        MouseKind::Release(button(base))
    } else {
        MouseKind::Press(button(base))
    }
}

/// Decode an SGR mouse report's parameters (`Pb`, 1-indexed `Px`, `Py`).
/// `pixel_mode` reinterprets `px`/`py` as pixel coordinates and, given the
/// terminal's reported cell size, recovers the sub-cell `(fx, fy)`
/// fraction.
pub fn decode_sgr(cb: u16, px: u16, py: u16, is_release: bool, cell_pixel_size: Option<(u16, u16)>) -> MouseEvent {
    let modifiers = decode_modifiers(cb);
    let kind = decode_kind(cb, is_release);

    if let Some((cell_w, cell_h)) = cell_pixel_size.filter(|(w, h)| *w > 0 && *h > 0) {
        let px0 = px.saturating_sub(1);
        let py0 = py.saturating_sub(1);
        let x = px0 / cell_w;
        let y = py0 / cell_h;
        let fx = (px0 % cell_w) as f32 / cell_w as f32;
        let fy = (py0 % cell_h) as f32 / cell_h as f32;
        return MouseEvent { kind, x, y, fx, fy, modifiers };
    }

    MouseEvent::at_cell(kind, px.saturating_sub(1), py.saturating_sub(1), modifiers)
}

/// Decode a legacy X10 mouse report's three raw bytes (each already offset
/// by 32 per the protocol). Coordinates saturate at 223 (`0xDB - 33`), the
/// classic X10 limit.
pub fn decode_x10(cb_raw: u8, cx_raw: u8, cy_raw: u8) -> MouseEvent {
    let cb = cb_raw.wrapping_sub(32) as u16;
    let x = cx_raw.wrapping_sub(33) as u16;
    let y = cy_raw.wrapping_sub(33) as u16;
    let modifiers = decode_modifiers(cb);
    let base = cb & 3;
    let kind = if cb & 64 != 0 {
        if base == 0 { MouseKind::ScrollUp } else { MouseKind::ScrollDown }
    } else if base == 3 {
        MouseKind::Release(MouseButton::Left)
    } else {
        decode_kind(cb, false)
    };
    MouseEvent::at_cell(kind, x, y, modifiers)
}

/// Cap a burst of mouse events to the most recent `limit`, dropping the
/// rest. A fast drag can queue far more move events than a single render
/// frame can usefully act on; keeping only the tail preserves final cursor
/// position and ordering without the renderer falling behind.
pub fn throttle(events: Vec<MouseEvent>, limit: usize) -> Vec<MouseEvent> {
    if events.len() <= limit {
        return events;
    }
    let skip = events.len() - limit;
    events.into_iter().skip(skip).collect()
}
