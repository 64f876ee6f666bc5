use crate::color::{Color, linear_to_srgb, srgb_to_linear};

/// Chroma boost at the midpoint of a mix, tapering to zero at both ends.
const MIDPOINT_GAIN: f32 = 0.2;

#[derive(Debug, Clone, Copy)]
struct LinRgb {
    r: f32,
    g: f32,
    b: f32,
}

/// Cube-root compressed cone responses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cone {
    pub l: f32,
    pub m: f32,
    pub s: f32,
}

impl Cone {
    fn lerp(self, other: Cone, t: f32) -> Cone {
        Cone {
            l: self.l + (other.l - self.l) * t,
            m: self.m + (other.m - self.m) * t,
            s: self.s + (other.s - self.s) * t,
        }
    }

    /// Scales each response's distance from the achromatic axis, where all
    /// three responses are equal.
    fn with_chroma_gain(self, gain: f32) -> Cone {
        let axis = (self.l + self.m + self.s) / 3.0;

        Cone {
            l: axis + (self.l - axis) * gain,
            m: axis + (self.m - axis) * gain,
            s: axis + (self.s - axis) * gain,
        }
    }
}

fn linear_rgb(color: Color) -> LinRgb {
    let rgb = color.rgb();

    LinRgb {
        r: srgb_to_linear(rgb.r as f32 / 255.0),
        g: srgb_to_linear(rgb.g as f32 / 255.0),
        b: srgb_to_linear(rgb.b as f32 / 255.0),
    }
}

fn linear_rgb_to_cone(rgb: LinRgb) -> Cone {
    let LinRgb { r, g, b } = rgb;

    let l = 0.4122214708 * r + 0.5363325363 * g + 0.0514459929 * b;
    let m = 0.2119034982 * r + 0.6806995451 * g + 0.1073969566 * b;
    let s = 0.0883024619 * r + 0.2817188376 * g + 0.6299787005 * b;

    Cone {
        l: l.cbrt(),
        m: m.cbrt(),
        s: s.cbrt(),
    }
}

fn cone_to_linear_rgb(cone: Cone) -> LinRgb {
    let l = cone.l * cone.l * cone.l;
    let m = cone.m * cone.m * cone.m;
    let s = cone.s * cone.s * cone.s;

    LinRgb {
        r: 4.0767416621 * l - 3.3077115913 * m + 0.2309699292 * s,
        g: -1.2684380046 * l + 2.6097574011 * m - 0.3413193965 * s,
        b: -0.0041960863 * l - 0.7034186147 * m + 1.7076147010 * s,
    }
}

pub fn to_cone(color: Color) -> Cone {
    linear_rgb_to_cone(linear_rgb(color))
}

pub fn from_cone(cone: Cone) -> Color {
    let lin = cone_to_linear_rgb(cone);
    let to_u8 = |c: f32| {
        (linear_to_srgb(c.clamp(0.0, 1.0)) * 255.0)
            .round()
            .clamp(0.0, 255.0) as u8
    };

    Color::from_rgb(to_u8(lin.r), to_u8(lin.g), to_u8(lin.b))
}

/// Mixes two colors in compressed cone space. `t` must be in `[0.0, 1.0]`.
///
/// Straight interpolation reads as washed out halfway between saturated
/// colors, so chroma is boosted by `1 + 0.2·t·(1−t)`.
pub fn mix(start: Color, end: Color, t: f32) -> Color {
    let gain = 1.0 + MIDPOINT_GAIN * t * (1.0 - t);
    let mixed = to_cone(start).lerp(to_cone(end), t).with_chroma_gain(gain);

    from_cone(mixed)
}

/// Euclidean distance in compressed cone space.
pub fn distance(a: Color, b: Color) -> f32 {
    let ca = to_cone(a);
    let cb = to_cone(b);

    let dl = ca.l - cb.l;
    let dm = ca.m - cb.m;
    let ds = ca.s - cb.s;

    (dl * dl + dm * dm + ds * ds).sqrt()
}
