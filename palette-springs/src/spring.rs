use std::collections::BTreeSet;

use log::{debug, trace};
use serde::Deserialize;

use crate::color::{self, Color};
use crate::palette::{self, GROUPS, POSITIONS, Palette, SLOTS};

/// Palette indices that the network reads but never moves.
pub type LockedSet = BTreeSet<usize>;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SpringParams {
    pub spring_constant: f32,
    /// Fraction of velocity lost every step, in `[0, 1]`.
    pub damping: f32,
    pub timestep: f32,
}

impl Default for SpringParams {
    fn default() -> Self {
        Self {
            spring_constant: 0.1,
            damping: 0.2,
            timestep: 1.0,
        }
    }
}

/// Undirected edge between two palette indices, stored low index first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpringConnection {
    a: usize,
    b: usize,
}

impl SpringConnection {
    /// `None` for a self-loop.
    pub fn new(i: usize, j: usize) -> Option<Self> {
        match i.cmp(&j) {
            std::cmp::Ordering::Less => Some(Self { a: i, b: j }),
            std::cmp::Ordering::Greater => Some(Self { a: j, b: i }),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn indices(&self) -> (usize, usize) {
        (self.a, self.b)
    }

    /// The opposite end from `index`, if `index` is an endpoint.
    pub fn other(&self, index: usize) -> Option<usize> {
        if index == self.a {
            Some(self.b)
        } else if index == self.b {
            Some(self.a)
        } else {
            None
        }
    }
}

/// Per-channel velocity of one palette entry.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Velocity {
    pub h: f32,
    pub s: f32,
    pub l: f32,
}

/// Spring relaxation over palette entries.
///
/// Connected colors pull each other toward matching hue, saturation and
/// luminance. Velocities persist between [`SpringNetwork::step`] calls and are
/// zeroed whenever the palette length changes, so a relaxation run is just
/// repeated stepping, one call per frame.
#[derive(Debug, Clone, Default)]
pub struct SpringNetwork {
    params: SpringParams,
    connections: BTreeSet<SpringConnection>,
    velocities: Vec<Velocity>,
}

impl SpringNetwork {
    pub fn new(params: SpringParams) -> Self {
        Self {
            params,
            connections: BTreeSet::new(),
            velocities: Vec::new(),
        }
    }

    pub fn params(&self) -> SpringParams {
        self.params
    }

    pub fn set_params(&mut self, params: SpringParams) {
        self.params = params;
    }

    /// Returns `false` for self-loops and edges already present in either
    /// orientation.
    pub fn add_connection(&mut self, i: usize, j: usize) -> bool {
        SpringConnection::new(i, j).is_some_and(|edge| self.connections.insert(edge))
    }

    pub fn remove_connection(&mut self, i: usize, j: usize) -> bool {
        SpringConnection::new(i, j).is_some_and(|edge| self.connections.remove(&edge))
    }

    /// Adds the edge if absent, removes it otherwise. Returns whether the
    /// edge exists afterwards.
    pub fn toggle_connection(&mut self, i: usize, j: usize) -> bool {
        if self.remove_connection(i, j) {
            false
        } else {
            self.add_connection(i, j)
        }
    }

    pub fn clear_connections(&mut self) {
        self.connections.clear();
    }

    pub fn is_connected(&self, i: usize, j: usize) -> bool {
        SpringConnection::new(i, j).is_some_and(|edge| self.connections.contains(&edge))
    }

    pub fn connections(&self) -> impl Iterator<Item = SpringConnection> + '_ {
        self.connections.iter().copied()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn neighbors(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.connections.iter().filter_map(move |edge| edge.other(index))
    }

    /// Rings every (group, position) through its six palette slots.
    pub fn build_default_topology(&mut self) {
        for position in 0..POSITIONS {
            for group in 0..GROUPS {
                for slot in 0..SLOTS {
                    let next = (slot + 1) % SLOTS;
                    self.add_connection(
                        palette::index(group, slot, position),
                        palette::index(group, next, position),
                    );
                }
            }
        }

        debug!("default topology: {} connections", self.connections.len());
    }

    pub fn velocity(&self, index: usize) -> Option<Velocity> {
        self.velocities.get(index).copied()
    }

    pub fn reset_velocities(&mut self) {
        self.velocities.iter_mut().for_each(|v| *v = Velocity::default());
    }

    /// Sum of squared velocities; zero once the network has settled.
    pub fn kinetic_energy(&self) -> f32 {
        self.velocities
            .iter()
            .map(|v| v.h * v.h + v.s * v.s + v.l * v.l)
            .sum()
    }

    pub fn step(&mut self, palette: &Palette, locked: &LockedSet) -> Palette {
        let next = self.step_colors(palette.colors(), locked);
        let mut stepped = palette.clone();

        for (i, color) in next.into_iter().enumerate() {
            stepped.replace(i, color);
        }

        stepped
    }

    /// One integration step over any number of colors.
    ///
    /// Forces are read from the input colors only, so every entry sees its
    /// neighbors' pre-step values. Locked entries are skipped but still pull
    /// on their neighbors. Edges reaching past the end of `colors` are ignored.
    pub fn step_colors(&mut self, colors: &[Color], locked: &LockedSet) -> Vec<Color> {
        if self.velocities.len() != colors.len() {
            debug!(
                "tracking {} colors (was {}), velocities reset",
                colors.len(),
                self.velocities.len()
            );
            self.velocities = vec![Velocity::default(); colors.len()];
        }

        let adjacency = self.adjacency(colors.len());
        let SpringParams {
            spring_constant: k,
            damping,
            timestep: dt,
        } = self.params;

        let mut next = colors.to_vec();

        for (i, current) in colors.iter().enumerate() {
            if locked.contains(&i) {
                continue;
            }

            let mut force_h = 0.0;
            let mut force_s = 0.0;
            let mut force_lum = 0.0;

            for &j in &adjacency[i] {
                let neighbor = &colors[j];

                force_h += k * color::shortest_hue_delta(current.hue(), neighbor.hue());
                force_s += k * (neighbor.saturation() - current.saturation());
                force_lum += k * (neighbor.luminance() - current.luminance());
            }

            let force_l =
                color::estimate_lightness_delta(*current, current.luminance() + force_lum);

            let v = &mut self.velocities[i];
            v.h = (v.h + force_h * dt) * (1.0 - damping);
            v.s = (v.s + force_s * dt) * (1.0 - damping);
            v.l = (v.l + force_l * dt) * (1.0 - damping);

            next[i] = Color::new(
                current.hue() + v.h * dt,
                current.saturation() + v.s * dt,
                current.lightness() + v.l * dt,
            );
        }

        trace!("spring step: energy {:.5}", self.kinetic_energy());

        next
    }

    fn adjacency(&self, len: usize) -> Vec<Vec<usize>> {
        let mut adjacency = vec![Vec::new(); len];

        for edge in &self.connections {
            let (a, b) = edge.indices();

            if b < len {
                adjacency[a].push(b);
                adjacency[b].push(a);
            }
        }

        adjacency
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::{GeneratorConfig, PALETTE_LEN, generate, index};

    fn uniform(color: Color) -> Palette {
        Palette::try_from(vec![color; PALETTE_LEN]).unwrap()
    }

    #[test]
    fn connections_are_unordered_and_deduplicated() {
        let mut net = SpringNetwork::default();

        assert!(net.add_connection(3, 7));
        assert!(!net.add_connection(7, 3));
        assert!(!net.add_connection(3, 3));
        assert_eq!(net.connection_count(), 1);
        assert!(net.is_connected(7, 3));

        assert!(net.remove_connection(7, 3));
        assert!(!net.remove_connection(3, 7));
        assert_eq!(net.connection_count(), 0);
    }

    #[test]
    fn toggle_flips_an_edge() {
        let mut net = SpringNetwork::default();

        assert!(net.toggle_connection(1, 2));
        assert!(!net.toggle_connection(2, 1));
        assert!(!net.is_connected(1, 2));
    }

    #[test]
    fn default_topology_rings_each_row() {
        let mut net = SpringNetwork::default();
        net.build_default_topology();

        assert_eq!(net.connection_count(), GROUPS * POSITIONS * SLOTS);
        assert!(net.is_connected(index(0, 0, 2), index(0, 1, 2)));
        assert!(net.is_connected(index(1, 5, 4), index(1, 0, 4)));
        assert!(!net.is_connected(index(0, 0, 0), index(1, 0, 0)));

        for i in 0..PALETTE_LEN {
            assert_eq!(net.neighbors(i).count(), 2, "index {i}");
        }
    }

    #[test]
    fn no_connections_leaves_palette_untouched() {
        let mut net = SpringNetwork::new(SpringParams::default());
        let palette = generate(&GeneratorConfig::default());
        let mut current = palette.clone();

        for _ in 0..25 {
            current = net.step(&current, &LockedSet::new());
        }

        assert_eq!(current, palette);
    }

    #[test]
    fn identical_ring_does_not_drift() {
        let mut net = SpringNetwork::default();
        net.build_default_topology();

        let start = uniform(Color::new(200.0, 55.0, 45.0));
        let mut current = start.clone();

        for _ in 0..50 {
            current = net.step(&current, &LockedSet::new());
        }

        assert_eq!(current, start);
        assert_eq!(net.kinetic_energy(), 0.0);
    }

    #[test]
    fn hue_pulls_across_zero() {
        let mut net = SpringNetwork::default();
        net.add_connection(0, 1);

        let mut colors = vec![Color::new(0.0, 50.0, 50.0); PALETTE_LEN];
        colors[0] = Color::new(350.0, 50.0, 50.0);
        colors[1] = Color::new(10.0, 50.0, 50.0);
        let palette = Palette::try_from(colors).unwrap();

        let next = net.step(&palette, &LockedSet::new());
        let a = next.get(0).unwrap().hue();
        let b = next.get(1).unwrap().hue();

        // 350 moves up through 360, 10 moves down toward 0.
        assert!(a > 350.0, "got {a}");
        assert!(b < 10.0, "got {b}");
        assert!(net.velocity(0).unwrap().h > 0.0);
        assert!(net.velocity(1).unwrap().h < 0.0);
    }

    #[test]
    fn first_step_matches_hand_integration() {
        let mut net = SpringNetwork::default();
        net.add_connection(0, 1);

        let mut colors = vec![Color::new(0.0, 50.0, 50.0); 2];
        colors[1] = Color::new(40.0, 70.0, 50.0);

        let next = net.step_colors(&colors, &LockedSet::new());

        // F = 0.1 * 40 = 4, v = 4 * 0.8 = 3.2
        assert!((next[0].hue() - 3.2).abs() < 1e-4);
        // F = 0.1 * 20 = 2, v = 1.6
        assert!((next[0].saturation() - 51.6).abs() < 1e-4);
        assert!((next[1].hue() - 36.8).abs() < 1e-4);
    }

    #[test]
    fn locked_color_stays_but_still_pulls() {
        let mut net = SpringNetwork::default();
        net.add_connection(0, 1);

        let anchor = Color::new(120.0, 80.0, 30.0);
        let mut colors = vec![Color::new(0.0, 50.0, 50.0); PALETTE_LEN];
        colors[0] = anchor;
        let palette = Palette::try_from(colors).unwrap();
        let locked = LockedSet::from([0]);

        let mut current = palette.clone();

        for _ in 0..10 {
            current = net.step(&current, &locked);
            assert_eq!(current.get(0), Some(anchor));
        }

        let moved = current.get(1).unwrap();
        assert!(moved.hue() > 0.0 && moved.hue() < 180.0, "{moved:?}");
        assert!(moved.saturation() > 50.0);
        assert_eq!(net.velocity(0), Some(Velocity::default()));
    }

    #[test]
    fn positions_stay_in_range() {
        let mut net = SpringNetwork::new(SpringParams {
            spring_constant: 0.9,
            damping: 0.0,
            timestep: 1.0,
        });
        net.add_connection(0, 1);

        let colors = [Color::new(0.0, 0.0, 0.0), Color::new(300.0, 100.0, 100.0)];
        let mut current = colors.to_vec();

        for _ in 0..20 {
            current = net.step_colors(&current, &LockedSet::new());

            for c in &current {
                assert!((0.0..360.0).contains(&c.hue()));
                assert!((0.0..=100.0).contains(&c.saturation()));
                assert!((0.0..=100.0).contains(&c.lightness()));
            }
        }
    }

    #[test]
    fn velocities_reset_when_length_changes() {
        let mut net = SpringNetwork::default();
        net.add_connection(0, 1);

        let colors = [Color::new(0.0, 50.0, 50.0), Color::new(90.0, 50.0, 50.0)];
        net.step_colors(&colors, &LockedSet::new());
        assert!(net.kinetic_energy() > 0.0);

        let grown = [colors[0], colors[0], colors[0]];
        net.step_colors(&grown, &LockedSet::new());
        assert_eq!(net.kinetic_energy(), 0.0);
    }

    #[test]
    fn edges_past_the_end_are_ignored() {
        let mut net = SpringNetwork::default();
        net.add_connection(0, 100);

        let colors = [Color::new(10.0, 20.0, 30.0)];
        let next = net.step_colors(&colors, &LockedSet::new());

        assert_eq!(next, colors);
    }

    #[test]
    fn chain_converges_toward_common_hue() {
        let mut net = SpringNetwork::default();
        net.add_connection(0, 1);
        net.add_connection(1, 2);

        let mut current = vec![
            Color::new(0.0, 60.0, 50.0),
            Color::new(20.0, 60.0, 50.0),
            Color::new(50.0, 60.0, 50.0),
        ];

        for _ in 0..200 {
            current = net.step_colors(&current, &LockedSet::new());
        }

        let spread = color::shortest_hue_delta(current[0].hue(), current[2].hue()).abs();
        assert!(spread < 5.0, "spread {spread}");
    }
}
