use crate::color::Color;
use crate::palette::Palette;
use crate::spring::LockedSet;

/// Application-side state around the engine: the palette, the active entry
/// and the locked set.
///
/// The active color is tracked by palette index, so duplicate colors never
/// make the selection ambiguous. Every mutation bumps [`PaletteStore::revision`];
/// views poll it with [`PaletteStore::changed_since`] instead of subscribing.
#[derive(Debug, Clone)]
pub struct PaletteStore {
    palette: Palette,
    active: Option<usize>,
    locked: LockedSet,
    revision: u64,
}

impl PaletteStore {
    pub fn new(palette: Palette) -> Self {
        Self {
            palette,
            active: None,
            locked: LockedSet::new(),
            revision: 0,
        }
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Replaces the palette wholesale. Selection and locks are kept since the
    /// length never changes.
    pub fn set_palette(&mut self, palette: Palette) {
        self.palette = palette;
        self.bump();
    }

    pub fn update_palette(&mut self, f: impl FnOnce(&mut Palette)) {
        f(&mut self.palette);
        self.bump();
    }

    pub fn replace_color(&mut self, index: usize, color: Color) -> Option<Color> {
        let previous = self.palette.replace(index, color)?;
        self.bump();
        Some(previous)
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    pub fn active_color(&self) -> Option<Color> {
        self.active.and_then(|i| self.palette.get(i))
    }

    /// Out-of-range indices clear the selection.
    pub fn set_active(&mut self, index: Option<usize>) {
        self.active = index.filter(|&i| i < self.palette.len());
        self.bump();
    }

    pub fn locked(&self) -> &LockedSet {
        &self.locked
    }

    pub fn is_locked(&self, index: usize) -> bool {
        self.locked.contains(&index)
    }

    /// Returns whether `index` is locked afterwards.
    pub fn toggle_lock(&mut self, index: usize) -> bool {
        if index >= self.palette.len() {
            return false;
        }

        let now_locked = if self.locked.remove(&index) {
            false
        } else {
            self.locked.insert(index)
        };

        self.bump();
        now_locked
    }

    pub fn clear_locks(&mut self) {
        self.locked.clear();
        self.bump();
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn changed_since(&self, revision: u64) -> bool {
        self.revision != revision
    }

    fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::PALETTE_LEN;

    fn store() -> PaletteStore {
        let gray = Color::new(0.0, 0.0, 50.0);
        PaletteStore::new(Palette::try_from(vec![gray; PALETTE_LEN]).unwrap())
    }

    #[test]
    fn active_is_keyed_by_index() {
        let mut store = store();

        // Every entry is the same color, yet the selection stays put.
        store.set_active(Some(17));
        assert_eq!(store.active(), Some(17));
        assert_eq!(store.active_color(), store.palette().get(17));

        store.set_active(Some(PALETTE_LEN));
        assert_eq!(store.active(), None);
    }

    #[test]
    fn locks_toggle() {
        let mut store = store();

        assert!(store.toggle_lock(4));
        assert!(store.is_locked(4));
        assert!(!store.toggle_lock(4));
        assert!(store.locked().is_empty());
        assert!(!store.toggle_lock(PALETTE_LEN));
    }

    #[test]
    fn mutations_bump_revision() {
        let mut store = store();
        let seen = store.revision();

        assert!(!store.changed_since(seen));

        store.replace_color(3, Color::new(10.0, 20.0, 30.0));
        assert!(store.changed_since(seen));

        let seen = store.revision();
        store.update_palette(|p| {
            p.replace(5, Color::new(90.0, 90.0, 90.0));
        });
        assert!(store.changed_since(seen));
        assert_eq!(store.palette().get(5), Some(Color::new(90.0, 90.0, 90.0)));
    }

    #[test]
    fn out_of_range_replace_changes_nothing() {
        let mut store = store();
        let seen = store.revision();

        assert_eq!(store.replace_color(PALETTE_LEN, Color::new(0.0, 0.0, 0.0)), None);
        assert!(!store.changed_since(seen));
    }
}
