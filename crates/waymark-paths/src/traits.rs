use waymark_core::{CostMatrix, Position, RegionId};

/// Game time, in ticks.
pub type Tick = u32;

/// Sentinel meaning "infinite": an unreachable hop distance, or an excluded
/// region in a route weight.
pub const UNREACHABLE: u32 = u32::MAX;

/// What a static feature does to traversal cost.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FeatureKind {
    /// Cheap to cross (roads).
    Paved,
    /// Blocks others but not us; never raises the cost.
    Barrier,
    /// Cannot be crossed.
    Blocking,
}

/// A static feature observed at a tile.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Feature {
    pub pos: Position,
    pub kind: FeatureKind,
}

/// Who holds a region, as far as we can see.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Standing {
    Mine,
    MyReservation,
    Neutral,
    Foreign,
}

impl Standing {
    /// Regions we may cross at the cheapest macro-route weight.
    #[inline]
    pub fn is_friendly(self) -> bool {
        !matches!(self, Self::Foreign)
    }
}

/// Read-only view of the world for the current tick.
pub trait WorldView {
    /// The current tick.
    fn tick(&self) -> Tick;

    /// Whether features and occupants of `region` can be enumerated this tick.
    fn is_observable(&self, region: RegionId) -> bool;

    /// Append the static features of an observable region into `buf`.
    /// The caller clears `buf` before calling.
    fn features(&self, region: RegionId, buf: &mut Vec<Feature>);

    /// Append the tiles of mobile occupants of an observable region into
    /// `buf`. The caller clears `buf` before calling.
    fn occupants(&self, region: RegionId, buf: &mut Vec<Position>);

    /// Ownership of `region`, or `None` if it is not observable.
    fn standing(&self, region: RegionId) -> Option<Standing>;

    /// Whether `region` exists and may be entered at all.
    fn is_available(&self, region: RegionId) -> bool;
}

impl<W: WorldView + ?Sized> WorldView for &W {
    fn tick(&self) -> Tick {
        (**self).tick()
    }

    fn is_observable(&self, region: RegionId) -> bool {
        (**self).is_observable(region)
    }

    fn features(&self, region: RegionId, buf: &mut Vec<Feature>) {
        (**self).features(region, buf)
    }

    fn occupants(&self, region: RegionId, buf: &mut Vec<Position>) {
        (**self).occupants(region, buf)
    }

    fn standing(&self, region: RegionId) -> Option<Standing> {
        (**self).standing(region)
    }

    fn is_available(&self, region: RegionId) -> bool {
        (**self).is_available(region)
    }
}

/// Target of a tile search: any tile within `range` (Chebyshev) of `pos`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SearchGoal {
    pub pos: Position,
    pub range: u32,
}

/// Numeric knobs handed to the tile search.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchOptions {
    /// Cost of a plain tile without an override.
    pub plain_cost: u8,
    /// Cost of difficult terrain without an override.
    pub swamp_cost: u8,
    /// Multiplier on the heuristic; above 1 trades optimality for speed.
    pub heuristic_weight: f32,
    /// Maximum number of distinct regions the search may enter.
    pub max_regions: u32,
    /// Operation budget for a single search.
    pub max_ops: u32,
}

/// Per-region answer of the cost callback.
#[derive(Clone, Debug, PartialEq)]
pub enum RegionCosts {
    /// The region must not be entered.
    Excluded,
    /// Nothing known: use terrain costs only.
    Unknown,
    /// Overrides on top of terrain costs.
    Matrix(CostMatrix),
}

/// Tile-level shortest-path engine.
pub trait TilePathfinder {
    /// Search from `origin` towards `goal`. `costs` is asked at most once per
    /// region the search touches.
    ///
    /// Returns the waypoints after `origin` (in order), or `None` if no path
    /// was found within the budget.
    fn search<F>(
        &self,
        origin: Position,
        goal: SearchGoal,
        options: &SearchOptions,
        costs: F,
    ) -> Option<Vec<Position>>
    where
        F: FnMut(RegionId) -> RegionCosts;
}

/// Region-graph shortest-path engine.
pub trait RegionRouter {
    /// Cheapest chain of adjacent regions from `from` to `to`, excluding
    /// `from` and including `to`. `weight` is the cost of entering a region;
    /// [`UNREACHABLE`] excludes it. `None` if no route exists.
    fn find_route<F>(&self, from: RegionId, to: RegionId, weight: F) -> Option<Vec<RegionId>>
    where
        F: FnMut(RegionId) -> u32;
}
