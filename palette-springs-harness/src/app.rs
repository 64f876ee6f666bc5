use std::fs;
use std::path::PathBuf;

use crossterm::event::KeyCode;
use log::{error, info, warn};

use palette_springs::gradient::{self, GradientSet};
use palette_springs::palette::{self, PALETTE_LEN, POSITIONS};
use palette_springs::search::LuminanceIndex;
use palette_springs::store::PaletteStore;
use palette_springs::{Color, EngineConfig, SpringNetwork, interchange};

/// Below this the relaxation counts as settled and stops on its own.
const SETTLED_ENERGY: f32 = 1e-6;

const LIGHTNESS_NUDGE: f32 = 2.0;
const INDEX_MATCH_TOLERANCE: f32 = 0.005;

pub struct App {
    pub config: EngineConfig,
    pub store: PaletteStore,
    pub network: SpringNetwork,
    pub cursor: usize,
    pub running: bool,
    pub gradients: GradientSet,
    pub should_quit: bool,
    save_path: PathBuf,
    gradient_ends: Option<(usize, usize)>,
    gradient_revision: Option<u64>,
    index: Option<LuminanceIndex>,
}

impl App {
    pub fn new(config: EngineConfig, save_path: PathBuf) -> Self {
        let store = PaletteStore::new(palette::generate(&config.generator));
        let mut network = SpringNetwork::new(config.spring);
        network.build_default_topology();

        info!("palette generated, {} springs", network.connection_count());

        Self {
            config,
            store,
            network,
            cursor: 0,
            running: false,
            gradients: GradientSet::default(),
            should_quit: false,
            save_path,
            gradient_ends: None,
            gradient_revision: None,
            index: None,
        }
    }

    pub fn cursor_color(&self) -> Option<Color> {
        self.store.palette().get(self.cursor)
    }

    pub fn gradient_ends(&self) -> Option<(usize, usize)> {
        self.gradient_ends
    }

    pub fn handle_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,

            KeyCode::Left => self.move_cursor(0, -1),
            KeyCode::Right => self.move_cursor(0, 1),
            KeyCode::Up => self.move_cursor(-1, 0),
            KeyCode::Down => self.move_cursor(1, 0),

            KeyCode::Enter => {
                let next = match self.store.active() {
                    Some(i) if i == self.cursor => None,
                    _ => Some(self.cursor),
                };
                self.store.set_active(next);
            }

            KeyCode::Char('l') => {
                let locked = self.store.toggle_lock(self.cursor);
                info!("{} {}", if locked { "locked" } else { "unlocked" }, self.cursor);
            }

            KeyCode::Char('c') => self.toggle_spring(),

            KeyCode::Char('t') => {
                self.network.build_default_topology();
            }

            KeyCode::Char('x') => {
                self.network.clear_connections();
                info!("springs cleared");
            }

            KeyCode::Char(' ') => {
                self.running = !self.running;
                info!("relaxation {}", if self.running { "running" } else { "paused" });
            }

            KeyCode::Char('n') => self.step(),

            KeyCode::Char('g') => self.select_gradient(),

            KeyCode::Char('m') => self.match_to_active(),

            KeyCode::Char('+') | KeyCode::Char('=') => self.nudge_lightness(LIGHTNESS_NUDGE),
            KeyCode::Char('-') => self.nudge_lightness(-LIGHTNESS_NUDGE),

            KeyCode::Char('r') => {
                self.store
                    .set_palette(palette::generate(&self.config.generator));
                self.network.reset_velocities();
                info!("palette regenerated");
            }

            KeyCode::Char('s') => self.save(),
            KeyCode::Char('o') => self.load(),

            _ => {}
        }
    }

    /// Called once per frame.
    pub fn tick(&mut self) {
        if self.running {
            self.step();

            if self.network.kinetic_energy() < SETTLED_ENERGY {
                self.running = false;
                info!("relaxation settled");
            }
        }

        self.refresh_gradients();
    }

    fn step(&mut self) {
        let next = self.network.step(self.store.palette(), self.store.locked());
        self.store.set_palette(next);
    }

    /// Rows are (group, slot) pairs, columns are positions.
    fn move_cursor(&mut self, rows: isize, cols: isize) {
        let row_count = (PALETTE_LEN / POSITIONS) as isize;
        let row = (self.cursor / POSITIONS) as isize;
        let col = (self.cursor % POSITIONS) as isize;

        let row = (row + rows).rem_euclid(row_count);
        let col = (col + cols).rem_euclid(POSITIONS as isize);

        self.cursor = (row * POSITIONS as isize + col) as usize;
    }

    fn toggle_spring(&mut self) {
        let Some(active) = self.store.active() else {
            warn!("select an active color first (enter)");
            return;
        };

        if active == self.cursor {
            return;
        }

        let connected = self.network.toggle_connection(active, self.cursor);
        info!(
            "spring {active} - {} {}",
            self.cursor,
            if connected { "added" } else { "removed" }
        );
    }

    fn select_gradient(&mut self) {
        self.gradient_ends = self.store.active().map(|active| (active, self.cursor));
        self.gradient_revision = None;

        if self.gradient_ends.is_none() {
            warn!("gradient needs an active color");
        }
    }

    /// Recomputes the gradient whenever the store has moved on.
    fn refresh_gradients(&mut self) {
        if self
            .gradient_revision
            .is_some_and(|seen| !self.store.changed_since(seen))
        {
            return;
        }

        let palette = self.store.palette();
        let (start, end) = match self.gradient_ends {
            Some((a, b)) => (palette.get(a), palette.get(b)),
            None => (None, None),
        };

        self.gradients = gradient::gradients(start, end, self.config.gradient.steps);
        self.gradient_revision = Some(self.store.revision());
    }

    fn match_to_active(&mut self) {
        let (Some(active), Some(current)) = (self.store.active_color(), self.cursor_color()) else {
            warn!("luminance match needs an active color");
            return;
        };

        let index = self.index.get_or_insert_with(|| {
            let index = LuminanceIndex::build(5.0, 2.0);
            info!("luminance index built, {} samples", index.len());
            index
        });

        match index.nearest_with_hue(current.hue(), active.luminance(), INDEX_MATCH_TOLERANCE) {
            Some(found) => {
                self.store.replace_color(self.cursor, found);
            }
            None => warn!("no indexed color near luminance {:.3}", active.luminance()),
        }
    }

    fn nudge_lightness(&mut self, delta: f32) {
        if let Some(current) = self.cursor_color() {
            self.store
                .replace_color(self.cursor, current.with_lightness(current.lightness() + delta));
        }
    }

    fn save(&self) {
        let text = interchange::write(self.store.palette());

        match fs::write(&self.save_path, text) {
            Ok(()) => info!("saved {}", self.save_path.display()),
            Err(err) => error!("save failed: {err}"),
        }
    }

    fn load(&mut self) {
        let loaded = fs::read_to_string(&self.save_path)
            .map_err(palette_springs::Error::from)
            .and_then(|text| interchange::parse(&text));

        match loaded {
            Ok(palette) => {
                self.store.set_palette(palette);
                self.network.reset_velocities();
                info!("loaded {}", self.save_path.display());
            }
            Err(err) => error!("load failed: {err}"),
        }
    }
}
