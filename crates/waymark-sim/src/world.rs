//! In-memory world: terrain per region plus whatever is currently visible.

use std::collections::{BTreeMap, HashMap, HashSet};

use waymark_core::{Position, REGION_SIZE, RegionId};
use waymark_paths::{Feature, FeatureKind, Standing, Tick, WorldView};

/// Natural terrain of a tile.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Terrain {
    #[default]
    Plain,
    Swamp,
    Wall,
}

/// Terrain of every known region. Tiles of unknown regions are walls.
#[derive(Clone, Debug, Default)]
pub struct TerrainMap {
    regions: BTreeMap<RegionId, Vec<Terrain>>,
}

impl TerrainMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// A rectangle of plain regions with world region coordinates in
    /// `x0..=x1` × `y0..=y1`.
    pub fn plain(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        let mut map = Self::new();
        for y in y0..=y1 {
            for x in x0..=x1 {
                map.add_region(RegionId::from_world(x, y));
            }
        }
        map
    }

    /// Add `region` filled with plain terrain. Does nothing if it exists.
    pub fn add_region(&mut self, region: RegionId) {
        self.regions
            .entry(region)
            .or_insert_with(|| vec![Terrain::Plain; (REGION_SIZE * REGION_SIZE) as usize]);
    }

    /// Whether `region` is part of the map.
    #[inline]
    pub fn contains(&self, region: RegionId) -> bool {
        self.regions.contains_key(&region)
    }

    /// Known regions in ascending order.
    pub fn regions(&self) -> impl Iterator<Item = RegionId> + '_ {
        self.regions.keys().copied()
    }

    /// Terrain at `pos`.
    pub fn get(&self, pos: Position) -> Terrain {
        if !pos.is_valid() {
            return Terrain::Wall;
        }
        self.regions
            .get(&pos.region)
            .map_or(Terrain::Wall, |tiles| tiles[idx(pos)])
    }

    /// Set the terrain at `pos`. Ignored for unknown regions.
    pub fn set(&mut self, pos: Position, terrain: Terrain) {
        if !pos.is_valid() {
            return;
        }
        if let Some(tiles) = self.regions.get_mut(&pos.region) {
            tiles[idx(pos)] = terrain;
        }
    }

    /// Set every tile of a vertical line at local `x` from `y0` to `y1`.
    pub fn wall_column(&mut self, region: RegionId, x: i32, y0: i32, y1: i32) {
        for y in y0..=y1 {
            self.set(Position::new(region, x, y), Terrain::Wall);
        }
    }
}

#[inline]
fn idx(pos: Position) -> usize {
    (pos.y * REGION_SIZE + pos.x) as usize
}

/// A world whose visibility, features and occupants are set by hand.
#[derive(Clone, Debug, Default)]
pub struct SimWorld {
    pub tick: Tick,
    regions: HashSet<RegionId>,
    visible: HashSet<RegionId>,
    features: HashMap<RegionId, Vec<Feature>>,
    occupants: HashMap<RegionId, Vec<Position>>,
    standing: HashMap<RegionId, Standing>,
    closed: HashSet<RegionId>,
}

impl SimWorld {
    /// A world made of the regions in `terrain`, with nothing visible.
    pub fn new(terrain: &TerrainMap) -> Self {
        Self {
            regions: terrain.regions().collect(),
            ..Self::default()
        }
    }

    /// Advance the clock.
    pub fn advance(&mut self, ticks: Tick) {
        self.tick = self.tick.saturating_add(ticks);
    }

    /// Make `region` observable.
    pub fn reveal(&mut self, region: RegionId) {
        self.visible.insert(region);
    }

    /// Make `region` unobservable. Its features and occupants are kept.
    pub fn conceal(&mut self, region: RegionId) {
        self.visible.remove(&region);
    }

    pub fn add_feature(&mut self, pos: Position, kind: FeatureKind) {
        self.features
            .entry(pos.region)
            .or_default()
            .push(Feature { pos, kind });
    }

    /// Remove every feature at `pos`.
    pub fn clear_features(&mut self, pos: Position) {
        if let Some(list) = self.features.get_mut(&pos.region) {
            list.retain(|f| f.pos != pos);
        }
    }

    pub fn add_occupant(&mut self, pos: Position) {
        self.occupants.entry(pos.region).or_default().push(pos);
    }

    /// Remove every occupant of `region`.
    pub fn clear_occupants(&mut self, region: RegionId) {
        self.occupants.remove(&region);
    }

    pub fn set_standing(&mut self, region: RegionId, standing: Standing) {
        self.standing.insert(region, standing);
    }

    /// Mark `region` as not enterable (e.g. closed off by the host).
    pub fn close(&mut self, region: RegionId) {
        self.closed.insert(region);
    }
}

impl WorldView for SimWorld {
    fn tick(&self) -> Tick {
        self.tick
    }

    fn is_observable(&self, region: RegionId) -> bool {
        self.visible.contains(&region)
    }

    fn features(&self, region: RegionId, buf: &mut Vec<Feature>) {
        if !self.is_observable(region) {
            return;
        }
        if let Some(list) = self.features.get(&region) {
            buf.extend_from_slice(list);
        }
    }

    fn occupants(&self, region: RegionId, buf: &mut Vec<Position>) {
        if !self.is_observable(region) {
            return;
        }
        if let Some(list) = self.occupants.get(&region) {
            buf.extend_from_slice(list);
        }
    }

    fn standing(&self, region: RegionId) -> Option<Standing> {
        if !self.is_observable(region) {
            return None;
        }
        Some(
            self.standing
                .get(&region)
                .copied()
                .unwrap_or(Standing::Neutral),
        )
    }

    fn is_available(&self, region: RegionId) -> bool {
        self.regions.contains(&region) && !self.closed.contains(&region)
    }
}
