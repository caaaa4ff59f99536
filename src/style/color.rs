//! Colour representation and arithmetic.
//!
//! `Rgba` is the colour type cells and styles carry. Two special encodings
//! avoid an `Option`: `r == -1` means "let the terminal pick" (spec: style
//! token `default`) and `r == -2` means an indexed ANSI colour (`g` holds
//! the index). Everything else is an ordinary 8-bit-per-channel colour.

/// RGBA colour with 8-bit channels, widened to `i16` so the two special
/// encodings (`TERMINAL_DEFAULT`, `ansi(n)`) fit outside the normal range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Rgba {
    pub r: i16,
    pub g: i16,
    pub b: i16,
    pub a: i16,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r: r as i16, g: g as i16, b: b as i16, a: a as i16 }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// "Let the terminal decide" — the `default` style token.
    pub const TERMINAL_DEFAULT: Self = Self { r: -1, g: -1, b: -1, a: -1 };

    pub const TRANSPARENT: Self = Self { r: 0, g: 0, b: 0, a: 0 };

    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const RED: Self = Self::rgb(255, 0, 0);
    pub const GREEN: Self = Self::rgb(0, 255, 0);
    pub const BLUE: Self = Self::rgb(0, 0, 255);
    pub const YELLOW: Self = Self::rgb(255, 255, 0);
    pub const CYAN: Self = Self::rgb(0, 255, 255);
    pub const MAGENTA: Self = Self::rgb(255, 0, 255);
    pub const GRAY: Self = Self::rgb(128, 128, 128);

    /// An indexed ANSI colour (0-15 standard/bright, 16-231 RGB cube,
    /// 232-255 grayscale ramp).
    pub const fn ansi(index: u8) -> Self {
        Self { r: -2, g: index as i16, b: 0, a: 255 }
    }

    #[inline]
    pub const fn is_terminal_default(&self) -> bool {
        self.r == -1
    }

    #[inline]
    pub const fn is_ansi(&self) -> bool {
        self.r == -2
    }

    #[inline]
    pub const fn ansi_index(&self) -> u8 {
        self.g as u8
    }

    #[inline]
    pub const fn is_opaque(&self) -> bool {
        self.a == 255
    }

    #[inline]
    pub const fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// Alpha-blend `src` over `dst` (Porter-Duff "over").
    pub fn blend(src: Self, dst: Self) -> Self {
        if src.is_opaque() || src.is_terminal_default() || src.is_ansi() {
            return src;
        }
        if src.is_transparent() {
            return dst;
        }

        let (dr, dg, db, da) = if dst.is_terminal_default() || dst.is_ansi() {
            (0i16, 0i16, 0i16, 255i16)
        } else {
            (dst.r, dst.g, dst.b, dst.a)
        };

        let sa = src.a as i32;
        let inv_sa = 255 - sa;
        let out_a = sa + (da as i32 * inv_sa) / 255;
        if out_a == 0 {
            return Self::TRANSPARENT;
        }

        let out_r = ((src.r as i32 * sa) + (dr as i32 * da as i32 * inv_sa / 255)) / out_a;
        let out_g = ((src.g as i32 * sa) + (dg as i32 * da as i32 * inv_sa / 255)) / out_a;
        let out_b = ((src.b as i32 * sa) + (db as i32 * da as i32 * inv_sa / 255)) / out_a;

        Self {
            r: out_r.clamp(0, 255) as i16,
            g: out_g.clamp(0, 255) as i16,
            b: out_b.clamp(0, 255) as i16,
            a: out_a.clamp(0, 255) as i16,
        }
    }

    /// Parse `#rgb`, `#rrggbb`, or `#rrggbbaa` (the `#` is optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');

        fn hex_digit(c: u8) -> Option<u8> {
            match c {
                b'0'..=b'9' => Some(c - b'0'),
                b'a'..=b'f' => Some(c - b'a' + 10),
                b'A'..=b'F' => Some(c - b'A' + 10),
                _ => None,
            }
        }
        fn hex_byte(s: &[u8], i: usize) -> Option<u8> {
            Some((hex_digit(s[i])? << 4) | hex_digit(s[i + 1])?)
        }

        let bytes = hex.as_bytes();
        match bytes.len() {
            3 => {
                let r = hex_digit(bytes[0])?;
                let g = hex_digit(bytes[1])?;
                let b = hex_digit(bytes[2])?;
                Some(Self::rgb((r << 4) | r, (g << 4) | g, (b << 4) | b))
            }
            6 => Some(Self::rgb(hex_byte(bytes, 0)?, hex_byte(bytes, 2)?, hex_byte(bytes, 4)?)),
            8 => Some(Self::new(
                hex_byte(bytes, 0)?,
                hex_byte(bytes, 2)?,
                hex_byte(bytes, 4)?,
                hex_byte(bytes, 6)?,
            )),
            _ => None,
        }
    }

    /// Parse a style-string colour token: `default`, `#rrggbb`, or a named
    /// ANSI colour (`red`, `brightred`, ...). Returns `None` if unrecognised
    /// so the caller can fall back to leaving the token alone (spec §3:
    /// "unknown tokens are preserved but ignored").
    pub fn parse_token(token: &str) -> Option<Self> {
        if token == "default" {
            return Some(Self::TERMINAL_DEFAULT);
        }
        if let Some(rest) = token.strip_prefix('#') {
            return Self::from_hex(rest);
        }
        named_ansi(token).map(Self::ansi)
    }

    /// Relative luminance (WCAG definition), for contrast calculations.
    /// Special colours are treated as dark.
    pub fn relative_luminance(&self) -> f32 {
        if self.is_terminal_default() || self.is_ansi() {
            return 0.0;
        }
        fn chan(c: i16) -> f32 {
            let c = c as f32 / 255.0;
            if c <= 0.04045 { c / 12.92 } else { ((c + 0.055) / 1.055).powf(2.4) }
        }
        0.2126 * chan(self.r) + 0.7152 * chan(self.g) + 0.0722 * chan(self.b)
    }

    /// WCAG 2.1 contrast ratio, in `[1.0, 21.0]`.
    pub fn contrast_ratio(c1: Self, c2: Self) -> f32 {
        let l1 = c1.relative_luminance();
        let l2 = c2.relative_luminance();
        (l1.max(l2) + 0.05) / (l1.min(l2) + 0.05)
    }

    /// Convert to HLS (hue/lightness/saturation, each `0.0..=1.0`, hue as a
    /// turn fraction). `None` for the special terminal-default/ANSI colours.
    pub fn to_hls(&self) -> Option<(f32, f32, f32)> {
        if self.is_terminal_default() || self.is_ansi() {
            return None;
        }
        Some(rgb_to_hls(self.r as f32 / 255.0, self.g as f32 / 255.0, self.b as f32 / 255.0))
    }

    /// Build a colour from HLS, preserving this colour's alpha.
    pub fn from_hls(h: f32, l: f32, s: f32, a: u8) -> Self {
        let (r, g, b) = hls_to_rgb(h.rem_euclid(1.0), l.clamp(0.0, 1.0), s.clamp(0.0, 1.0));
        Self::new((r * 255.0).round() as u8, (g * 255.0).round() as u8, (b * 255.0).round() as u8, a)
    }

    /// Build a colour from OKLCH (perceptually uniform lightness/chroma/hue).
    /// `h` in degrees. Used for contrast-adjustment search, where moving
    /// lightness alone must not shift the perceived hue (plain HLS would).
    pub fn oklch(l: f32, c: f32, h: f32, a: u8) -> Self {
        let h_rad = h.to_radians();
        let lab_a = c * h_rad.cos();
        let lab_b = c * h_rad.sin();

        let l_ = l + 0.3963377774 * lab_a + 0.2158037573 * lab_b;
        let m_ = l - 0.1055613458 * lab_a - 0.0638541728 * lab_b;
        let s_ = l - 0.0894841775 * lab_a - 1.2914855480 * lab_b;

        let l3 = l_ * l_ * l_;
        let m3 = m_ * m_ * m_;
        let s3 = s_ * s_ * s_;

        let r_lin = 4.0767416621 * l3 - 3.3077115913 * m3 + 0.2309699292 * s3;
        let g_lin = -1.2684380046 * l3 + 2.6097574011 * m3 - 0.3413193965 * s3;
        let b_lin = -0.0041960863 * l3 - 0.7034186147 * m3 + 1.7076147010 * s3;

        fn linear_to_srgb(x: f32) -> f32 {
            if x <= 0.0031308 { x * 12.92 } else { 1.055 * x.powf(1.0 / 2.4) - 0.055 }
        }

        Self::new(
            (linear_to_srgb(r_lin) * 255.0).clamp(0.0, 255.0) as u8,
            (linear_to_srgb(g_lin) * 255.0).clamp(0.0, 255.0) as u8,
            (linear_to_srgb(b_lin) * 255.0).clamp(0.0, 255.0) as u8,
            a,
        )
    }

    /// Inverse of [`Rgba::oklch`]. Returns `(lightness, chroma, hue_degrees)`,
    /// or `None` for the special terminal-default/ANSI colours.
    pub fn to_oklch(&self) -> Option<(f32, f32, f32)> {
        if self.is_terminal_default() || self.is_ansi() {
            return None;
        }
        fn srgb_to_linear(x: f32) -> f32 {
            if x <= 0.04045 { x / 12.92 } else { ((x + 0.055) / 1.055).powf(2.4) }
        }
        let r_lin = srgb_to_linear(self.r as f32 / 255.0);
        let g_lin = srgb_to_linear(self.g as f32 / 255.0);
        let b_lin = srgb_to_linear(self.b as f32 / 255.0);

        let l = 0.4122214708 * r_lin + 0.5363325363 * g_lin + 0.0514459929 * b_lin;
        let m = 0.2119034982 * r_lin + 0.6806995451 * g_lin + 0.1073969566 * b_lin;
        let s = 0.0883024619 * r_lin + 0.2817188376 * g_lin + 0.6299787005 * b_lin;

        let l_ = l.cbrt();
        let m_ = m.cbrt();
        let s_ = s.cbrt();

        let lab_l = 0.2104542553 * l_ + 0.7936177850 * m_ - 0.0040720468 * s_;
        let lab_a = 1.9779984951 * l_ - 2.4285922050 * m_ + 0.4505937099 * s_;
        let lab_b = 0.0259040371 * l_ + 0.7827717662 * m_ - 0.8086757660 * s_;

        let c = (lab_a * lab_a + lab_b * lab_b).sqrt();
        let h = lab_b.atan2(lab_a).to_degrees();
        Some((lab_l, c, if h < 0.0 { h + 360.0 } else { h }))
    }

    /// Adjust a foreground colour's OKLCH lightness until it meets
    /// `min_ratio` against `bg`, searching toward whichever end (lighter or
    /// darker) the background suggests first, falling back to the other
    /// direction if that range can't reach the target.
    pub fn ensure_contrast(fg: Self, bg: Self, min_ratio: f32) -> Option<Self> {
        if Self::contrast_ratio(fg, bg) >= min_ratio {
            return Some(fg);
        }
        let (l, c, h) = fg.to_oklch()?;
        let (bg_l, _, _) = bg.to_oklch()?;
        let make_lighter = bg_l <= 0.5;

        fn search(l: f32, c: f32, h: f32, a: u8, bg: Rgba, min_ratio: f32, lighter: bool) -> Option<Rgba> {
            let (mut lo, mut hi) = if lighter { (l, 1.0) } else { (0.0, l) };
            if (hi - lo).abs() < 0.001 {
                return None;
            }
            let mut best = None;
            for _ in 0..20 {
                let mid = (lo + hi) / 2.0;
                let candidate = Rgba::oklch(mid, c, h, a);
                if Rgba::contrast_ratio(candidate, bg) >= min_ratio {
                    best = Some(candidate);
                    if lighter { hi = mid } else { lo = mid }
                } else if lighter {
                    lo = mid
                } else {
                    hi = mid
                }
            }
            best
        }

        search(l, c, h, fg.a as u8, bg, min_ratio, make_lighter)
            .or_else(|| search(l, c, h, fg.a as u8, bg, min_ratio, !make_lighter))
    }

    /// Relative lighten/darken in HLS space, clamped to the valid range.
    /// `amount` in `[-1.0, 1.0]`; negative darkens. Mirrors
    /// `ColorPaletteColor._adjust_abs` in the console this was ported from.
    pub fn lighten(self, amount: f32) -> Self {
        let Some((h, l, s)) = self.to_hls() else { return self };
        Self::from_hls(h, (l + amount).clamp(0.0, 1.0), s, self.a as u8)
    }

    pub fn darken(self, amount: f32) -> Self {
        self.lighten(-amount)
    }

    /// Push lightness toward the extreme the colour already leans to: a
    /// light colour gets lighter, a dark colour gets darker. Mirrors
    /// `ColorPaletteColor.more`, which inverts its `amount` sign when
    /// `is_light` so the effect is always "more pronounced" regardless of
    /// starting lightness.
    pub fn more(self, amount: f32) -> Self {
        let Some((_, l, _)) = self.to_hls() else { return self };
        let is_light = l > 0.5;
        self.lighten(if is_light { amount } else { -amount })
    }

    /// Pull lightness toward the middle: a light colour gets darker, a dark
    /// colour gets lighter. Mirrors `ColorPaletteColor.less`.
    pub fn less(self, amount: f32) -> Self {
        self.more(-amount)
    }

    /// Linear interpolation toward `other` in RGB space, `amount` clamped to
    /// `[0.0, 1.0]`.
    pub fn towards(self, other: Self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);
        Self::new(
            (self.r as f32 + (other.r - self.r) as f32 * amount).round() as u8,
            (self.g as f32 + (other.g - self.g) as f32 * amount).round() as u8,
            (self.b as f32 + (other.b - self.b) as f32 * amount).round() as u8,
            self.a as u8,
        )
    }
}

/// `colorsys.rgb_to_hls` transliterated: returns (hue, lightness, saturation).
fn rgb_to_hls(r: f32, g: f32, b: f32) -> (f32, f32, f32) {
    let maxc = r.max(g).max(b);
    let minc = r.min(g).min(b);
    let l = (minc + maxc) / 2.0;
    if minc == maxc {
        return (0.0, l, 0.0);
    }
    let delta = maxc - minc;
    let s = if l <= 0.5 { delta / (maxc + minc) } else { delta / (2.0 - maxc - minc) };
    let rc = (maxc - r) / delta;
    let gc = (maxc - g) / delta;
    let bc = (maxc - b) / delta;
    let h = if r == maxc {
        bc - gc
    } else if g == maxc {
        2.0 + rc - bc
    } else {
        4.0 + gc - rc
    };
    ((h / 6.0).rem_euclid(1.0), l, s)
}

/// `colorsys.hls_to_rgb` transliterated.
fn hls_to_rgb(h: f32, l: f32, s: f32) -> (f32, f32, f32) {
    if s == 0.0 {
        return (l, l, l);
    }
    let m2 = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let m1 = 2.0 * l - m2;
    (hls_value(m1, m2, h + 1.0 / 3.0), hls_value(m1, m2, h), hls_value(m1, m2, h - 1.0 / 3.0))
}

fn hls_value(m1: f32, m2: f32, hue: f32) -> f32 {
    let hue = hue.rem_euclid(1.0);
    if hue < 1.0 / 6.0 {
        m1 + (m2 - m1) * hue * 6.0
    } else if hue < 0.5 {
        m2
    } else if hue < 2.0 / 3.0 {
        m1 + (m2 - m1) * (2.0 / 3.0 - hue) * 6.0
    } else {
        m1
    }
}

fn named_ansi(name: &str) -> Option<u8> {
    Some(match name {
        "black" => 0,
        "red" => 1,
        "green" => 2,
        "yellow" => 3,
        "blue" => 4,
        "magenta" => 5,
        "cyan" => 6,
        "white" => 7,
        "brightblack" | "gray" | "grey" => 8,
        "brightred" => 9,
        "brightgreen" => 10,
        "brightyellow" => 11,
        "brightblue" => 12,
        "brightmagenta" => 13,
        "brightcyan" => 14,
        "brightwhite" => 15,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_parses_all_forms() {
        assert_eq!(Rgba::from_hex("#fff"), Some(Rgba::rgb(255, 255, 255)));
        assert_eq!(Rgba::from_hex("ff0000"), Some(Rgba::rgb(255, 0, 0)));
        assert_eq!(Rgba::from_hex("#ff000080"), Some(Rgba::new(255, 0, 0, 128)));
        assert_eq!(Rgba::from_hex("nope"), None);
    }

    #[test]
    fn named_and_default_tokens() {
        assert_eq!(Rgba::parse_token("default"), Some(Rgba::TERMINAL_DEFAULT));
        assert_eq!(Rgba::parse_token("red"), Some(Rgba::ansi(1)));
        assert_eq!(Rgba::parse_token("brightwhite"), Some(Rgba::ansi(15)));
        assert_eq!(Rgba::parse_token("#112233"), Some(Rgba::rgb(0x11, 0x22, 0x33)));
        assert_eq!(Rgba::parse_token("bogus"), None);
    }

    #[test]
    fn hls_roundtrips_black_and_white() {
        let (h, l, s) = Rgba::BLACK.to_hls().unwrap();
        assert_eq!((h, l, s), (0.0, 0.0, 0.0));
        let white_back = Rgba::from_hls(h, 1.0, s, 255);
        assert_eq!(white_back, Rgba::WHITE);
    }

    #[test]
    fn lighten_moves_toward_white() {
        let base = Rgba::rgb(40, 42, 54);
        let lighter = base.lighten(0.3);
        assert!(lighter.relative_luminance() > base.relative_luminance());
    }

    #[test]
    fn darken_is_lighten_negated() {
        let base = Rgba::rgb(200, 100, 50);
        assert_eq!(base.darken(0.2), base.lighten(-0.2));
    }

    #[test]
    fn contrast_ratio_white_black_is_max() {
        let ratio = Rgba::contrast_ratio(Rgba::WHITE, Rgba::BLACK);
        assert!((ratio - 21.0).abs() < 0.1);
    }

    #[test]
    fn more_pushes_toward_own_extreme() {
        let light = Rgba::rgb(230, 230, 235);
        let dark = Rgba::rgb(20, 20, 25);
        assert!(light.more(0.1).relative_luminance() > light.relative_luminance());
        assert!(dark.more(0.1).relative_luminance() < dark.relative_luminance());
    }

    #[test]
    fn less_is_more_negated() {
        let c = Rgba::rgb(180, 60, 60);
        assert_eq!(c.less(0.15), c.more(-0.15));
    }

    #[test]
    fn ensure_contrast_reaches_target_on_dark_background() {
        let fg = Rgba::rgb(60, 60, 65);
        let bg = Rgba::rgb(10, 10, 12);
        let adjusted = Rgba::ensure_contrast(fg, bg, 4.5).expect("should find a contrasting lightness");
        assert!(Rgba::contrast_ratio(adjusted, bg) >= 4.5);
    }

    #[test]
    fn towards_interpolates() {
        let a = Rgba::rgb(0, 0, 0);
        let b = Rgba::rgb(100, 100, 100);
        assert_eq!(a.towards(b, 0.5), Rgba::rgb(50, 50, 50));
        assert_eq!(a.towards(b, 0.0), a);
        assert_eq!(a.towards(b, 1.0), b);
    }
}
