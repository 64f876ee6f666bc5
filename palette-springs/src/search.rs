use log::warn;

use crate::color::{Color, shortest_hue_delta};

/// Lightness resolution of every refined scan.
const FINE_STEPS_PER_UNIT: i32 = 5;

/// Below this residual a match is treated as exact and scanning stops.
const NEAR_PERFECT: f32 = 0.001;

/// How [`find_hsl_for_luminance`] decides when to stop scanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPolicy {
    /// Accept the first sample within tolerance, in scan order.
    FirstWithin,
    /// Keep the best sample across the whole scan, stopping only on a
    /// near-perfect match.
    Closest,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LuminanceMatch {
    pub color: Color,
    /// Absolute difference between the color's luminance and the target.
    pub error: f32,
}

impl LuminanceMatch {
    fn new(color: Color, target: f32) -> Self {
        Self {
            color,
            error: (color.luminance() - target).abs(),
        }
    }

    pub fn is_within(&self, tolerance: f32) -> bool {
        self.error <= tolerance
    }

    fn keep_better(&mut self, candidate: Self) {
        if candidate.error < self.error {
            *self = candidate;
        }
    }
}

/// Searches saturation and lightness at a fixed hue for `target` luminance.
///
/// Saturation is scanned upward in whole steps from `start_saturation`, and
/// lightness ascending for each saturation: whole steps locate the region,
/// 0.2 steps refine it. [`MatchPolicy::FirstWithin`] returns the first sample
/// inside `tolerance` in that order; [`MatchPolicy::Closest`] keeps the best
/// one. Never fails: without a sample inside `tolerance` the best
/// approximation seen is returned.
pub fn find_hsl_for_luminance(
    h: f32,
    target: f32,
    tolerance: f32,
    start_saturation: f32,
    policy: MatchPolicy,
) -> LuminanceMatch {
    let first = start_saturation.clamp(0.0, 100.0).floor() as u32;
    let mut best = LuminanceMatch::new(Color::new(h, first as f32, 0.0), target);

    for s in first..=100 {
        let s = s as f32;

        let found = match policy {
            MatchPolicy::FirstWithin => first_within(h, s, target, tolerance, &mut best),
            MatchPolicy::Closest => closest(h, s, target, &mut best),
        };

        if let Some(found) = found {
            return found;
        }
    }

    if !best.is_within(tolerance) {
        warn!(
            "no color at hue {h:.1} within {tolerance} of luminance {target:.3}; best {:.3}",
            best.color.luminance()
        );
    }

    best
}

/// First sample at saturation `s`, lightness ascending, inside `tolerance`.
///
/// Luminance never decreases with lightness, so every sample below the first
/// whole lightness reaching `target - tolerance` misses, and the scan ends
/// once luminance passes `target + tolerance`.
fn first_within(
    h: f32,
    s: f32,
    target: f32,
    tolerance: f32,
    best: &mut LuminanceMatch,
) -> Option<LuminanceMatch> {
    let Some(coarse) =
        (0..=100).find(|&l| Color::new(h, s, l as f32).luminance() >= target - tolerance)
    else {
        best.keep_better(LuminanceMatch::new(Color::new(h, s, 100.0), target));
        return None;
    };

    let start = (coarse - 1).max(0) * FINE_STEPS_PER_UNIT;

    for step in start..=100 * FINE_STEPS_PER_UNIT {
        let l = step as f32 / FINE_STEPS_PER_UNIT as f32;
        let candidate = LuminanceMatch::new(Color::new(h, s, l), target);

        if candidate.is_within(tolerance) {
            return Some(candidate);
        }

        best.keep_better(candidate);

        if candidate.color.luminance() > target + tolerance {
            break;
        }
    }

    None
}

/// Refines around the closest whole lightness at saturation `s`, returning
/// only on a near-perfect match.
fn closest(h: f32, s: f32, target: f32, best: &mut LuminanceMatch) -> Option<LuminanceMatch> {
    let coarse = closest_whole_lightness(h, s, target);

    for l in refined_lightness(coarse) {
        let candidate = LuminanceMatch::new(Color::new(h, s, l), target);

        if candidate.error < NEAR_PERFECT {
            return Some(candidate);
        }

        best.keep_better(candidate);
    }

    None
}

/// Holds hue and saturation fixed and scans lightness over `[0, 100]` in 0.2
/// steps for the closest luminance, stopping early on a near-perfect match.
pub fn find_luminance_matched_color(h: f32, s: f32, target: f32) -> LuminanceMatch {
    let mut best = LuminanceMatch::new(Color::new(h, s, 0.0), target);

    for step in 1..=100 * FINE_STEPS_PER_UNIT {
        if best.error < NEAR_PERFECT {
            break;
        }

        let l = step as f32 / FINE_STEPS_PER_UNIT as f32;
        best.keep_better(LuminanceMatch::new(Color::new(h, s, l), target));
    }

    best
}

/// Luminance never decreases with lightness, so the scan ends once it passes
/// the target.
fn closest_whole_lightness(h: f32, s: f32, target: f32) -> i32 {
    let mut best = (0, f32::INFINITY);

    for l in 0..=100 {
        let lum = Color::new(h, s, l as f32).luminance();
        let error = (lum - target).abs();

        if error < best.1 {
            best = (l, error);
        }

        if lum > target {
            break;
        }
    }

    best.0
}

fn refined_lightness(coarse: i32) -> impl Iterator<Item = f32> {
    let center = coarse * FINE_STEPS_PER_UNIT;
    let lo = (center - FINE_STEPS_PER_UNIT).max(0);
    let hi = (center + FINE_STEPS_PER_UNIT).min(100 * FINE_STEPS_PER_UNIT);

    (lo..=hi).map(|step| step as f32 / FINE_STEPS_PER_UNIT as f32)
}

/// One entry of a [`LuminanceIndex`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexedColor {
    pub color: Color,
}

/// Precomputed HSL samples ordered by luminance.
///
/// Built explicitly by the caller and passed where it's needed; nothing
/// global is initialized behind the scenes.
#[derive(Debug, Clone)]
pub struct LuminanceIndex {
    entries: Vec<IndexedColor>,
}

impl LuminanceIndex {
    /// Samples every `hue_step` degrees and every `sl_step` units of
    /// saturation and lightness. Steps are floored at 1.
    pub fn build(hue_step: f32, sl_step: f32) -> Self {
        let hue_step = hue_step.max(1.0);
        let sl_step = sl_step.max(1.0);

        let hues = (360.0 / hue_step).ceil() as u32;
        let levels = (100.0 / sl_step).floor() as u32;

        let mut entries = Vec::with_capacity((hues * (levels + 1) * (levels + 1)) as usize);

        for hi in 0..hues {
            let h = hi as f32 * hue_step;

            if h >= 360.0 {
                break;
            }

            for si in 0..=levels {
                for li in 0..=levels {
                    let color = Color::new(h, si as f32 * sl_step, li as f32 * sl_step);
                    entries.push(IndexedColor { color });
                }
            }
        }

        entries.sort_by(|a, b| a.color.luminance().total_cmp(&b.color.luminance()));

        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All samples whose luminance lies within `tolerance` of `target`,
    /// ascending by luminance.
    pub fn within(&self, target: f32, tolerance: f32) -> &[IndexedColor] {
        let lo = self
            .entries
            .partition_point(|e| e.color.luminance() < target - tolerance);
        let hi = self
            .entries
            .partition_point(|e| e.color.luminance() <= target + tolerance);

        &self.entries[lo..hi.max(lo)]
    }

    /// Among samples within `tolerance` of `target`, the one whose hue is
    /// closest to `h`; ties go to the smaller luminance error.
    pub fn nearest_with_hue(&self, h: f32, target: f32, tolerance: f32) -> Option<Color> {
        self.within(target, tolerance)
            .iter()
            .min_by(|a, b| {
                let key = |e: &IndexedColor| {
                    (
                        shortest_hue_delta(h, e.color.hue()).abs(),
                        (e.color.luminance() - target).abs(),
                    )
                };
                let (ha, la) = key(a);
                let (hb, lb) = key(b);

                ha.total_cmp(&hb).then(la.total_cmp(&lb))
            })
            .map(|e| e.color)
    }
}
