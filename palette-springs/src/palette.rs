use log::debug;
use serde::Deserialize;

use crate::color::Color;
use crate::error::Error;
use crate::search::{self, MatchPolicy};

pub const GROUPS: usize = 2;
pub const SLOTS: usize = 6;
pub const POSITIONS: usize = 5;
pub const PALETTE_LEN: usize = GROUPS * SLOTS * POSITIONS;

/// Flat index of the color at (`group`, `slot`, `position`).
pub const fn index(group: usize, slot: usize, position: usize) -> usize {
    group * SLOTS * POSITIONS + slot * POSITIONS + position
}

/// Inverse of [`index`]: `(group, slot, position)`.
pub const fn coordinates(index: usize) -> (usize, usize, usize) {
    (
        index / (SLOTS * POSITIONS),
        index / POSITIONS % SLOTS,
        index % POSITIONS,
    )
}

/// Exactly [`PALETTE_LEN`] colors: 2 groups × 6 palette slots × 5 positions.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: Vec<Color>,
}

impl Palette {
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn get(&self, index: usize) -> Option<Color> {
        self.colors.get(index).copied()
    }

    pub fn at(&self, group: usize, slot: usize, position: usize) -> Option<Color> {
        if group >= GROUPS || slot >= SLOTS || position >= POSITIONS {
            return None;
        }

        self.get(index(group, slot, position))
    }

    /// The five positions of one palette slot.
    pub fn slot(&self, group: usize, slot: usize) -> Option<&[Color]> {
        if group >= GROUPS || slot >= SLOTS {
            return None;
        }

        let start = index(group, slot, 0);
        self.colors.get(start..start + POSITIONS)
    }

    /// Swaps in `color` at `index`, returning the color it replaced.
    pub fn replace(&mut self, index: usize, color: Color) -> Option<Color> {
        let entry = self.colors.get_mut(index)?;
        Some(std::mem::replace(entry, color))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Color> {
        self.colors.iter()
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

impl TryFrom<Vec<Color>> for Palette {
    type Error = Error;

    fn try_from(colors: Vec<Color>) -> Result<Self, Self::Error> {
        match colors.len() {
            PALETTE_LEN => Ok(Self { colors }),
            found if found < PALETTE_LEN => Err(Error::MissingColors { found }),
            found => Err(Error::ExtraColors { found }),
        }
    }
}

/// Luminance anchors for the brightest, middle and darkest positions.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct LuminanceTargets {
    pub high: f32,
    pub mid: f32,
    pub low: f32,
}

impl Default for LuminanceTargets {
    fn default() -> Self {
        Self {
            high: 0.500,
            mid: 0.216,
            low: 0.050,
        }
    }
}

impl LuminanceTargets {
    /// Per-position targets; the in-between positions take the geometric
    /// mean of their neighbors.
    pub fn per_position(&self) -> [f32; POSITIONS] {
        [
            self.high,
            (self.high * self.mid).sqrt(),
            self.mid,
            (self.mid * self.low).sqrt(),
            self.low,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// One hue per (group, slot), in flat order.
    pub hues: [f32; GROUPS * SLOTS],
    pub luminance: LuminanceTargets,
    /// Lowest saturation the reference slot search considers.
    pub start_saturation: f32,
    pub tolerance: f32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            hues: [
                0.0, 60.0, 120.0, 180.0, 240.0, 300.0, 30.0, 90.0, 150.0, 210.0, 270.0, 330.0,
            ],
            luminance: LuminanceTargets::default(),
            start_saturation: 40.0,
            tolerance: 0.005,
        }
    }
}

/// Builds a fresh palette.
///
/// Slot 0 of each group is the reference: every position is solved for its
/// luminance target directly. The other slots keep their own hue and the
/// reference saturation, and are matched to the reference's actual
/// luminance so the whole row of a position reads equally bright.
pub fn generate(config: &GeneratorConfig) -> Palette {
    let targets = config.luminance.per_position();
    let mut colors = Vec::with_capacity(PALETTE_LEN);

    for group in 0..GROUPS {
        let reference_hue = config.hues[group * SLOTS];
        let reference: Vec<Color> = targets
            .iter()
            .map(|&target| {
                search::find_hsl_for_luminance(
                    reference_hue,
                    target,
                    config.tolerance,
                    config.start_saturation,
                    MatchPolicy::FirstWithin,
                )
                .color
            })
            .collect();

        colors.extend_from_slice(&reference);

        for slot in 1..SLOTS {
            let hue = config.hues[group * SLOTS + slot];

            colors.extend(reference.iter().map(|r| {
                search::find_luminance_matched_color(hue, r.saturation(), r.luminance()).color
            }));
        }

        debug!("generated group {group} from reference hue {reference_hue}");
    }

    Palette { colors }
}
