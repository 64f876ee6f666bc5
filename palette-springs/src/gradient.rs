use serde::Deserialize;

use crate::color::Color;
use crate::opponent;
use crate::search;

/// Intermediate samples between the two endpoints.
pub const DEFAULT_STEPS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GradientPolicy {
    /// Shortest-arc hue, linear saturation and lightness.
    LinearHsl,
    /// As [`GradientPolicy::LinearHsl`], with lightness re-solved so luminance
    /// moves linearly between the endpoints.
    LuminanceEqualized,
    /// Mixed in compressed cone space, see [`opponent::mix`].
    Opponent,
}

impl GradientPolicy {
    pub const ALL: [Self; 3] = [Self::LinearHsl, Self::LuminanceEqualized, Self::Opponent];

    pub fn name(self) -> &'static str {
        match self {
            Self::LinearHsl => "linear hsl",
            Self::LuminanceEqualized => "luminance",
            Self::Opponent => "opponent",
        }
    }

    fn sample(self, start: Color, end: Color, t: f32) -> Color {
        match self {
            Self::LinearHsl => lerp_hsl(start, end, t),
            Self::LuminanceEqualized => {
                let base = lerp_hsl(start, end, t);
                let target = start.luminance() + (end.luminance() - start.luminance()) * t;

                search::find_luminance_matched_color(base.hue(), base.saturation(), target).color
            }
            Self::Opponent => opponent::mix(start, end, t),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct GradientConfig {
    pub steps: usize,
}

impl Default for GradientConfig {
    fn default() -> Self {
        Self {
            steps: DEFAULT_STEPS,
        }
    }
}

/// Signed shortest hue travel from `start` to `end`, in `[-180, 180)`.
pub fn hue_arc(start: f32, end: f32) -> f32 {
    (end - start + 540.0).rem_euclid(360.0) - 180.0
}

fn lerp_hsl(start: Color, end: Color, t: f32) -> Color {
    let h = start.hue() + hue_arc(start.hue(), end.hue()) * t;
    let s = start.saturation() + (end.saturation() - start.saturation()) * t;
    let l = start.lightness() + (end.lightness() - start.lightness()) * t;

    Color::new(h, s, l)
}

/// `steps` intermediate colors between `start` and `end`, plus the exact
/// endpoints. Either endpoint missing yields an empty sequence.
pub fn gradient(
    policy: GradientPolicy,
    start: Option<Color>,
    end: Option<Color>,
    steps: usize,
) -> Vec<Color> {
    let (Some(start), Some(end)) = (start, end) else {
        return Vec::new();
    };

    let last = steps + 1;

    (0..=last)
        .map(|i| match i {
            0 => start,
            i if i == last => end,
            i => policy.sample(start, end, i as f32 / last as f32),
        })
        .collect()
}

/// One sequence per policy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GradientSet {
    pub linear_hsl: Vec<Color>,
    pub luminance_equalized: Vec<Color>,
    pub opponent: Vec<Color>,
}

impl GradientSet {
    pub fn get(&self, policy: GradientPolicy) -> &[Color] {
        match policy {
            GradientPolicy::LinearHsl => &self.linear_hsl,
            GradientPolicy::LuminanceEqualized => &self.luminance_equalized,
            GradientPolicy::Opponent => &self.opponent,
        }
    }
}

pub fn gradients(start: Option<Color>, end: Option<Color>, steps: usize) -> GradientSet {
    GradientSet {
        linear_hsl: gradient(GradientPolicy::LinearHsl, start, end, steps),
        luminance_equalized: gradient(GradientPolicy::LuminanceEqualized, start, end, steps),
        opponent: gradient(GradientPolicy::Opponent, start, end, steps),
    }
}

/// Smallest and largest perceptual distance between neighboring samples.
/// A perfectly even gradient has both equal.
pub fn step_spread(sequence: &[Color]) -> Option<(f32, f32)> {
    sequence
        .windows(2)
        .map(|w| opponent::distance(w[0], w[1]))
        .fold(None, |acc, d| match acc {
            None => Some((d, d)),
            Some((lo, hi)) => Some((lo.min(d), hi.max(d))),
        })
}
