/// BT.709 weights applied to linearized sRGB channels.
const LUMA_R: f32 = 0.2126;
const LUMA_G: f32 = 0.7152;
const LUMA_B: f32 = 0.0722;

/// Smallest luminance-per-lightness slope the estimator divides by.
const MIN_SLOPE: f32 = 0.001;

/// Damping applied to the first-order lightness estimate to avoid overshoot.
const ESTIMATE_DAMPING: f32 = 0.5;

/// 8-bit sRGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Immutable HSL color: `h` in `[0, 360)`, `s` and `l` in `[0, 100]`.
///
/// The sRGB channels and relative luminance are derived at construction and
/// can never drift from the HSL coordinates. To edit a color, build a new one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    h: f32,
    s: f32,
    l: f32,
    rgb: Rgb,
    luminance: f32,
}

impl Color {
    /// Out-of-range input is normalized: hue wraps, saturation and lightness clamp.
    pub fn new(h: f32, s: f32, l: f32) -> Self {
        let h = wrap_hue(h);
        let s = s.clamp(0.0, 100.0);
        let l = l.clamp(0.0, 100.0);
        let rgb = hsl_to_rgb(h, s, l);

        Self {
            h,
            s,
            l,
            rgb,
            luminance: relative_luminance(rgb),
        }
    }

    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        let (h, s, l) = rgb_to_hsl(Rgb { r, g, b });
        Self::new(h, s, l)
    }

    pub fn hue(&self) -> f32 {
        self.h
    }

    pub fn saturation(&self) -> f32 {
        self.s
    }

    pub fn lightness(&self) -> f32 {
        self.l
    }

    pub fn hsl(&self) -> (f32, f32, f32) {
        (self.h, self.s, self.l)
    }

    pub fn rgb(&self) -> Rgb {
        self.rgb
    }

    pub fn luminance(&self) -> f32 {
        self.luminance
    }

    pub fn with_lightness(&self, l: f32) -> Self {
        Self::new(self.h, self.s, l)
    }
}

impl From<Color> for ratatui::style::Color {
    fn from(color: Color) -> Self {
        let Rgb { r, g, b } = color.rgb;
        ratatui::style::Color::Rgb(r, g, b)
    }
}

/// Result is in `[0, 360)`. Guards the `rem_euclid` edge where tiny negative
/// inputs round up to exactly 360.
pub fn wrap_hue(h: f32) -> f32 {
    let wrapped = h.rem_euclid(360.0);

    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Signed shortest angular step from `from` to `to`, in `[-180, 180]`.
///
/// Positive means increasing hue. For the pair (350, 10) the step from 10
/// to 350 is `-20` and the step from 350 to 10 is `+20`, never `±340`.
pub fn shortest_hue_delta(from: f32, to: f32) -> f32 {
    let raw = to - from;

    if raw > 180.0 {
        raw - 360.0
    } else if raw < -180.0 {
        raw + 360.0
    } else {
        raw
    }
}

pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.03928 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

pub fn linear_to_srgb(c: f32) -> f32 {
    if c <= 0.0031308 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

pub fn relative_luminance(rgb: Rgb) -> f32 {
    let lin = |c: u8| srgb_to_linear(c as f32 / 255.0);

    LUMA_R * lin(rgb.r) + LUMA_G * lin(rgb.g) + LUMA_B * lin(rgb.b)
}

fn hsl_to_rgb(h: f32, s: f32, l: f32) -> Rgb {
    let s = s / 100.0;
    let l = l / 100.0;

    let chroma = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let sector = h / 60.0;
    let x = chroma * (1.0 - (sector % 2.0 - 1.0).abs());

    let (r, g, b) = match sector as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };

    let m = l - chroma / 2.0;
    let to_u8 = |c: f32| ((c + m) * 255.0).round().clamp(0.0, 255.0) as u8;

    Rgb {
        r: to_u8(r),
        g: to_u8(g),
        b: to_u8(b),
    }
}

fn rgb_to_hsl(rgb: Rgb) -> (f32, f32, f32) {
    let r = rgb.r as f32 / 255.0;
    let g = rgb.g as f32 / 255.0;
    let b = rgb.b as f32 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    if max == min {
        return (0.0, 0.0, l * 100.0);
    }

    let d = max - min;
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };

    let h = if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };

    (h * 60.0, s * 100.0, l * 100.0)
}

/// First-order estimate of the lightness change that moves `color` to
/// `target_luminance`, from a one-unit finite-difference probe.
///
/// The slope is floored at [`MIN_SLOPE`] so flat regions (near black) yield a
/// large but finite step; the estimate is halved to avoid overshoot.
pub fn estimate_lightness_delta(color: Color, target_luminance: f32) -> f32 {
    let (probe_l, direction) = if color.l + 1.0 <= 100.0 {
        (color.l + 1.0, 1.0)
    } else {
        (color.l - 1.0, -1.0)
    };

    let probe = Color::new(color.h, color.s, probe_l);
    let mut slope = (probe.luminance - color.luminance) * direction;

    if slope.abs() < MIN_SLOPE {
        slope = MIN_SLOPE.copysign(slope);
    }

    (target_luminance - color.luminance) / slope * ESTIMATE_DAMPING
}
