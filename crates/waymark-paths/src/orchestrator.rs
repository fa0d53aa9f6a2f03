//! [`PathOrchestrator`] answers path requests, reusing cached work.

use std::collections::HashMap;

use waymark_core::{CostMatrix, EncodedPath, Position, RegionId};

use crate::cache::{Lookup, PathCache, Tier};
use crate::config::Config;
use crate::distance::RegionDistanceCache;
use crate::matrix::CostMatrixCache;
use crate::route::MacroRouter;
use crate::store::CacheStore;
use crate::traits::{RegionCosts, RegionRouter, SearchGoal, TilePathfinder, WorldView};

/// Counters describing how requests were served.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OrchestratorStats {
    /// Requests answered from the path cache.
    pub hits: u64,
    /// Requests that missed the path cache.
    pub misses: u64,
    /// Tile searches handed to the engine.
    pub searches: u64,
    /// Occupant-agnostic requests, never cached.
    pub uncached: u64,
}

/// Front door for path requests.
///
/// Owns the tile and region engines and the in-process parts of the caches;
/// the world view and the cache store are passed in per request.
pub struct PathOrchestrator<T, R> {
    config: Config,
    tiles: T,
    regions: R,
    router: MacroRouter,
    distances: RegionDistanceCache,
    matrices: CostMatrixCache,
    paths: PathCache,
    stats: OrchestratorStats,
}

impl<T: TilePathfinder, R: RegionRouter> PathOrchestrator<T, R> {
    /// Create an orchestrator around a tile engine and a region engine.
    pub fn new(config: Config, tiles: T, regions: R) -> Self {
        Self {
            router: MacroRouter::new(config.blocked_regions.iter().copied()),
            distances: RegionDistanceCache::new(),
            matrices: CostMatrixCache::new(&config),
            paths: PathCache::new(),
            stats: OrchestratorStats::default(),
            config,
            tiles,
            regions,
        }
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[inline]
    pub fn stats(&self) -> OrchestratorStats {
        self.stats
    }

    /// The tile engine.
    #[inline]
    pub fn tiles(&self) -> &T {
        &self.tiles
    }

    /// The region engine.
    #[inline]
    pub fn regions(&self) -> &R {
        &self.regions
    }

    /// The macro router built from the block-list.
    #[inline]
    pub fn router(&self) -> &MacroRouter {
        &self.router
    }

    /// Memoized hop distance between two regions.
    pub fn hop_distance<W: WorldView, S: CacheStore>(
        &self,
        world: &W,
        store: &mut S,
        from: RegionId,
        to: RegionId,
    ) -> u32 {
        self.distances
            .hop_distance(world, store, &self.router, &self.regions, from, to)
    }

    /// The owned region among `candidates` closest to `target` in hops.
    pub fn nearest_owned<W: WorldView, S: CacheStore>(
        &self,
        world: &W,
        store: &mut S,
        candidates: impl IntoIterator<Item = RegionId>,
        target: RegionId,
    ) -> Option<RegionId> {
        self.distances
            .nearest_owned(world, store, &self.router, &self.regions, candidates, target)
    }

    /// Region corridor from `origin` to `destination`.
    pub fn route<W: WorldView>(
        &self,
        world: &W,
        origin: RegionId,
        destination: RegionId,
        check_ownership: bool,
        prefer_highway: bool,
    ) -> Option<Vec<RegionId>> {
        self.router.route(
            world,
            &self.regions,
            origin,
            destination,
            check_ownership,
            prefer_highway,
        )
    }

    /// Static cost matrix for `region`.
    pub fn cost_matrix<W: WorldView, S: CacheStore>(
        &mut self,
        world: &W,
        store: &mut S,
        region: RegionId,
    ) -> CostMatrix {
        self.matrices.get(world, store, region)
    }

    /// Encoded path from `origin` to `destination`, or `None` if there is no
    /// path.
    ///
    /// With `respect_occupants` the answer comes from, and is stored in, the
    /// path cache. Without it a fresh search ignoring occupants is run and
    /// the cache is neither read nor written.
    pub fn find<W: WorldView, S: CacheStore>(
        &mut self,
        world: &W,
        store: &mut S,
        origin: Position,
        destination: Position,
        respect_occupants: bool,
    ) -> Option<EncodedPath> {
        if !respect_occupants {
            self.stats.uncached += 1;
            return found(self.search_ignoring_occupants(world, store, origin, destination));
        }

        let now = world.tick();
        let hops = self.hop_distance(world, store, origin.region, destination.region);
        let tier = Tier::from_hops(hops);

        let absent = match self.paths.get(store, tier, origin, destination, now) {
            Lookup::Hit(path) => {
                self.stats.hits += 1;
                return found(path);
            }
            Lookup::Miss => false,
            Lookup::Absent => true,
        };
        self.stats.misses += 1;

        let (path, validity) = match tier {
            Tier::SameRegion => (
                self.search_same_region(world, store, origin, destination),
                self.config.same_region_validity,
            ),
            Tier::CrossRegion => (
                self.search_cross_region(world, store, origin, destination, hops),
                self.config.cross_region_validity,
            ),
        };

        if absent {
            log::debug!(
                "{} partition absent, path {origin} -> {destination} not cached",
                tier.partition()
            );
        } else {
            self.paths
                .put(store, tier, origin, destination, &path, validity, now);
        }
        found(path)
    }

    /// Drop the cached path for `origin` → `destination`, if any.
    pub fn invalidate<W: WorldView, S: CacheStore>(
        &self,
        world: &W,
        store: &mut S,
        origin: Position,
        destination: Position,
    ) -> bool {
        let hops = self.hop_distance(world, store, origin.region, destination.region);
        self.paths
            .remove(store, Tier::from_hops(hops), origin, destination)
    }

    fn goal(&self, destination: Position) -> SearchGoal {
        SearchGoal {
            pos: destination,
            range: self.config.search.goal_range,
        }
    }

    fn search_same_region<W: WorldView, S: CacheStore>(
        &mut self,
        world: &W,
        store: &mut S,
        origin: Position,
        destination: Position,
    ) -> EncodedPath {
        log::debug!("searching same-region path {origin} -> {destination}");
        self.stats.searches += 1;
        let options = self.config.search_options(1);
        let goal = self.goal(destination);
        let tiles = &self.tiles;
        let matrices = &mut self.matrices;
        let mut scope = HashMap::new();
        let waypoints = tiles.search(origin, goal, &options, |region| {
            if region != origin.region {
                return RegionCosts::Excluded;
            }
            occupant_aware(matrices, &mut scope, world, store, region)
        });
        match waypoints {
            Some(w) => EncodedPath::encode(origin, &w, None),
            None => EncodedPath::new(),
        }
    }

    fn search_cross_region<W: WorldView, S: CacheStore>(
        &mut self,
        world: &W,
        store: &mut S,
        origin: Position,
        destination: Position,
        hops: u32,
    ) -> EncodedPath {
        let prefer_highway = hops > self.config.highway_threshold;
        let corridor = self.route(
            world,
            origin.region,
            destination.region,
            true,
            prefer_highway,
        );
        let Some(corridor) = corridor else {
            log::debug!("no region route {} -> {}", origin.region, destination.region);
            return EncodedPath::new();
        };

        log::debug!(
            "searching cross-region path {origin} -> {destination} through {} regions",
            corridor.len()
        );
        self.stats.searches += 1;
        let options = self.config.search_options(corridor.len() as u32 + 1);
        let goal = self.goal(destination);
        let tiles = &self.tiles;
        let matrices = &mut self.matrices;
        let mut scope = HashMap::new();
        let waypoints = tiles.search(origin, goal, &options, |region| {
            if region != origin.region && !corridor.contains(&region) {
                return RegionCosts::Excluded;
            }
            occupant_aware(matrices, &mut scope, world, store, region)
        });
        match waypoints {
            Some(w) => EncodedPath::encode(origin, &w, Some(destination.region)),
            None => EncodedPath::new(),
        }
    }

    fn search_ignoring_occupants<W: WorldView, S: CacheStore>(
        &mut self,
        world: &W,
        store: &mut S,
        origin: Position,
        destination: Position,
    ) -> EncodedPath {
        let local = origin.region == destination.region;
        let max_regions = if local { 1 } else { self.config.search.max_regions };
        log::debug!("searching uncached path {origin} -> {destination}");
        self.stats.searches += 1;
        let options = self.config.search_options(max_regions);
        let goal = self.goal(destination);
        let tiles = &self.tiles;
        let matrices = &mut self.matrices;
        let waypoints = tiles.search(origin, goal, &options, |region| {
            if local && region != origin.region {
                return RegionCosts::Excluded;
            }
            if world.is_observable(region) {
                return RegionCosts::Matrix(matrices.get(world, store, region));
            }
            matrices
                .snapshot(store, region)
                .map_or(RegionCosts::Unknown, RegionCosts::Matrix)
        });
        match waypoints {
            Some(w) => EncodedPath::encode(origin, &w, None),
            None => EncodedPath::new(),
        }
    }
}

/// Costs for one region of an occupant-aware search: live matrix where
/// observable, else the last snapshot, else unknown. `scope` keeps each
/// region's answer for the rest of the request.
fn occupant_aware<W: WorldView, S: CacheStore>(
    matrices: &mut CostMatrixCache,
    scope: &mut HashMap<RegionId, CostMatrix>,
    world: &W,
    store: &mut S,
    region: RegionId,
) -> RegionCosts {
    if let Some(m) = scope.get(&region) {
        return RegionCosts::Matrix(m.clone());
    }
    let matrix = if world.is_observable(region) {
        Some(matrices.current(world, store, region))
    } else {
        matrices.snapshot(store, region)
    };
    match matrix {
        Some(m) => {
            scope.insert(region, m.clone());
            RegionCosts::Matrix(m)
        }
        None => RegionCosts::Unknown,
    }
}

fn found(path: EncodedPath) -> Option<EncodedPath> {
    (!path.is_empty()).then_some(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, Partition};
    use crate::testutil::{AxisRouter, FakeWorld, LineFinder, pos, region};
    use crate::traits::{FeatureKind, SearchOptions, Standing};
    use std::cell::RefCell;
    use waymark_core::IMPASSABLE;

    type Orchestrator = PathOrchestrator<LineFinder, AxisRouter>;

    /// Asks for the origin region's costs twice, then gives up.
    #[derive(Default)]
    struct RevisitFinder {
        answers: RefCell<Vec<RegionCosts>>,
    }

    impl TilePathfinder for RevisitFinder {
        fn search<F>(
            &self,
            origin: Position,
            _goal: SearchGoal,
            _options: &SearchOptions,
            mut costs: F,
        ) -> Option<Vec<Position>>
        where
            F: FnMut(RegionId) -> RegionCosts,
        {
            let mut answers = self.answers.borrow_mut();
            answers.push(costs(origin.region));
            answers.push(costs(origin.region));
            None
        }
    }

    fn orchestrator() -> Orchestrator {
        PathOrchestrator::new(Config::default(), LineFinder::default(), AxisRouter::default())
    }

    fn world() -> FakeWorld {
        let mut world = FakeWorld::new(1_000);
        world.observe(region("E5S5"));
        world.observe(region("E5S6"));
        world
    }

    #[test]
    fn cross_region_cached_until_expiry() {
        let mut world = world();
        let mut store = MemoryStore::new();
        let mut orch = orchestrator();
        let (a, b) = (pos("E5S5", 25, 45), pos("E5S6", 25, 5));

        let first = orch.find(&world, &mut store, a, b, true).unwrap();
        assert_eq!(first.as_str(), "5555");
        assert_eq!(orch.tiles().calls.get(), 1);

        world.tick += 40_000;
        assert_eq!(orch.find(&world, &mut store, a, b, true), Some(first.clone()));
        assert_eq!(orch.tiles().calls.get(), 1);

        world.tick += 1;
        assert_eq!(orch.find(&world, &mut store, a, b, true), Some(first));
        assert_eq!(orch.tiles().calls.get(), 2);
        assert_eq!(orch.stats().hits, 1);
        assert_eq!(orch.stats().misses, 2);
    }

    #[test]
    fn cross_region_search_limited_to_corridor() {
        let world = world();
        let mut store = MemoryStore::new();
        let mut orch = orchestrator();
        orch.find(&world, &mut store, pos("E5S5", 10, 10), pos("E5S6", 10, 10), true);
        let opts = orch.tiles().last_options.borrow().clone().unwrap();
        assert_eq!(opts.max_regions, 2);
        assert_eq!(opts.max_ops, 4_000);
    }

    #[test]
    fn same_region_uses_room_tier() {
        let mut world = world();
        let mut store = MemoryStore::new();
        let mut orch = orchestrator();
        let (a, b) = (pos("E5S5", 10, 10), pos("E5S5", 14, 10));
        let path = orch.find(&world, &mut store, a, b, true).unwrap();
        assert_eq!(path.as_str(), "333");
        assert_eq!(store.len(Partition::RoomPath), 1);
        assert_eq!(store.len(Partition::TravelPath), 0);

        world.tick += 5_001;
        orch.find(&world, &mut store, a, b, true);
        assert_eq!(orch.tiles().calls.get(), 2);
    }

    #[test]
    fn negative_result_cached() {
        let mut world = world();
        world.feature(pos("E5S5", 12, 10), FeatureKind::Blocking);
        let mut store = MemoryStore::new();
        let mut orch = orchestrator();
        let (a, b) = (pos("E5S5", 10, 10), pos("E5S5", 20, 10));

        assert_eq!(orch.find(&world, &mut store, a, b, true), None);
        assert_eq!(orch.find(&world, &mut store, a, b, true), None);
        assert_eq!(orch.tiles().calls.get(), 1);
        assert_eq!(orch.stats().hits, 1);
    }

    #[test]
    fn no_region_route_is_negative_without_search() {
        let world = world();
        let mut store = MemoryStore::new();
        let cfg = Config::default().with_blocked_regions([region("E6S5")]);
        let mut orch = PathOrchestrator::new(cfg, LineFinder::default(), AxisRouter::default());
        let (a, b) = (pos("E5S5", 10, 10), pos("E7S5", 10, 10));
        assert_eq!(orch.find(&world, &mut store, a, b, true), None);
        assert_eq!(orch.tiles().calls.get(), 0);
        assert_eq!(store.len(Partition::TravelPath), 1);
    }

    #[test]
    fn occupants_block_cached_search() {
        let mut world = world();
        world.occupant(pos("E5S5", 11, 10));
        let mut store = MemoryStore::new();
        let mut orch = orchestrator();
        let (a, b) = (pos("E5S5", 10, 10), pos("E5S5", 15, 10));
        assert_eq!(orch.find(&world, &mut store, a, b, true), None);
        let asked = orch.tiles().asked.borrow();
        match &asked[0] {
            (r, RegionCosts::Matrix(m)) => {
                assert_eq!(*r, region("E5S5"));
                assert_eq!(m.get(11, 10), IMPASSABLE);
            }
            other => panic!("unexpected costs {other:?}"),
        }
    }

    #[test]
    fn ignoring_occupants_bypasses_cache() {
        let mut world = world();
        world.occupant(pos("E5S5", 11, 10));
        let mut store = MemoryStore::new();
        let mut orch = orchestrator();
        let (a, b) = (pos("E5S5", 10, 10), pos("E5S5", 15, 10));

        let path = orch.find(&world, &mut store, a, b, false).unwrap();
        assert_eq!(path.as_str(), "3333");
        orch.find(&world, &mut store, a, b, false);
        assert_eq!(orch.tiles().calls.get(), 2);
        assert_eq!(orch.stats().uncached, 2);
        assert_eq!(store.len(Partition::RoomPath), 0);
        assert_eq!(store.len(Partition::TravelPath), 0);
        assert_eq!(store.len(Partition::Ranges), 0);

        // The occupant-aware request is not served from the uncached answer.
        assert_eq!(orch.find(&world, &mut store, a, b, true), None);
        assert_eq!(orch.tiles().calls.get(), 3);
    }

    #[test]
    fn unobservable_regions_use_snapshot_or_unknown() {
        let mut world = world();
        let mut store = MemoryStore::new();
        let mut orch = orchestrator();
        // Snapshot E5S6 while visible, then lose sight of it.
        orch.cost_matrix(&world, &mut store, region("E5S6"));
        world.hide(region("E5S6"));
        world.hide(region("E5S5"));
        world.tick += 20_000;

        orch.find(&world, &mut store, pos("E5S5", 25, 45), pos("E5S6", 25, 5), true);
        let asked = orch.tiles().asked.borrow();
        assert!(asked.iter().any(|(r, c)| *r == region("E5S5") && *c == RegionCosts::Unknown));
        assert!(
            asked
                .iter()
                .any(|(r, c)| *r == region("E5S6") && matches!(c, RegionCosts::Matrix(_)))
        );
    }

    #[test]
    fn works_with_no_partitions() {
        let world = world();
        let mut store = MemoryStore::with_partitions(&[]);
        let mut orch = orchestrator();
        let (a, b) = (pos("E5S5", 25, 45), pos("E5S6", 25, 5));
        assert!(orch.find(&world, &mut store, a, b, true).is_some());
        assert!(orch.find(&world, &mut store, a, b, true).is_some());
        assert_eq!(orch.tiles().calls.get(), 2);
    }

    #[test]
    fn invalidate_forces_recompute() {
        let world = world();
        let mut store = MemoryStore::new();
        let mut orch = orchestrator();
        let (a, b) = (pos("E5S5", 25, 45), pos("E5S6", 25, 5));
        orch.find(&world, &mut store, a, b, true);
        assert!(orch.invalidate(&world, &mut store, a, b));
        orch.find(&world, &mut store, a, b, true);
        assert_eq!(orch.tiles().calls.get(), 2);
    }

    #[test]
    fn far_requests_prefer_highways() {
        let mut world = world();
        world.observe(region("E1S5"));
        let mut store = MemoryStore::new();
        let mut orch = orchestrator();
        // Five hops west along row 5; E0S5 is a highway.
        let (a, b) = (pos("E5S5", 25, 25), pos("E0S5", 25, 25));
        assert_eq!(orch.hop_distance(&world, &mut store, a.region, b.region), 5);
        let corridor = orch.route(&world, a.region, b.region, true, true).unwrap();
        assert_eq!(corridor.last(), Some(&b.region));
        assert_eq!(
            orch.router().weight(&world, b.region, region("E0S6"), true, true),
            3
        );
    }

    #[test]
    fn occupant_costs_computed_once_per_request() {
        let mut world = world();
        world.occupant(pos("E5S5", 11, 10));
        let mut store = MemoryStore::new();
        let mut orch =
            PathOrchestrator::new(Config::default(), RevisitFinder::default(), AxisRouter::default());
        let (a, b) = (pos("E5S5", 10, 10), pos("E5S5", 20, 10));

        assert_eq!(orch.find(&world, &mut store, a, b, true), None);
        assert_eq!(world.occupant_queries.get(), 1);
        {
            let answers = orch.tiles().answers.borrow();
            assert_eq!(answers.len(), 2);
            assert_eq!(answers[0], answers[1]);
            assert!(matches!(&answers[0], RegionCosts::Matrix(m) if m.get(11, 10) == IMPASSABLE));
        }

        // The next request starts from a fresh scope.
        world.tick += 5_001;
        orch.find(&world, &mut store, a, b, true);
        assert_eq!(world.occupant_queries.get(), 2);
    }

    #[test]
    fn nearest_owned_region() {
        let mut world = world();
        for name in ["E5S5", "E5S6"] {
            world.set_standing(region(name), Standing::Mine);
        }
        let mut store = MemoryStore::new();
        let orch = orchestrator();
        let candidates = [region("E5S5"), region("E5S6")];
        assert_eq!(
            orch.nearest_owned(&world, &mut store, candidates, region("E5S8")),
            Some(region("E5S6"))
        );
        assert_eq!(orch.nearest_owned(&world, &mut store, candidates, region("E5S5")), Some(region("E5S5")));
    }
}
