//! End-to-end runs of the orchestrator over the reference engines.

use waymark_core::{IMPASSABLE, Position, RegionId};
use waymark_paths::{Config, FeatureKind, MemoryStore, Partition, PathOrchestrator, SearchTuning};

use crate::{GridPathfinder, GridRouter, SimWorld, Terrain, TerrainMap};

type Orchestrator = PathOrchestrator<GridPathfinder, GridRouter>;

fn r(s: &str) -> RegionId {
    s.parse().unwrap()
}

fn pos(region: &str, x: i32, y: i32) -> Position {
    Position::new(r(region), x, y)
}

fn setup(terrain: TerrainMap, config: Config) -> (SimWorld, MemoryStore, Orchestrator) {
    let mut world = SimWorld::new(&terrain);
    world.tick = 100;
    world.reveal(r("E5S5"));
    world.reveal(r("E5S6"));
    let router = GridRouter::new(terrain.regions());
    let orch = PathOrchestrator::new(config, GridPathfinder::new(terrain), router);
    (world, MemoryStore::new(), orch)
}

fn plain() -> TerrainMap {
    TerrainMap::plain(4, 4, 6, 7)
}

#[test]
fn neighbouring_region_path_is_cached_until_expiry() {
    let (mut world, mut store, mut orch) = setup(plain(), Config::default());
    let (a, b) = (pos("E5S5", 25, 25), pos("E5S6", 25, 25));

    let path = orch.find(&world, &mut store, a, b, true).unwrap();
    assert_eq!(orch.stats().searches, 1);
    let walked = path.decode(a);
    assert_eq!(walked.last().map(|p| p.region), Some(r("E5S6")));
    // Truncated on arrival.
    assert_eq!(walked.iter().filter(|p| p.region == r("E5S6")).count(), 1);

    world.advance(40_000);
    assert_eq!(orch.find(&world, &mut store, a, b, true), Some(path.clone()));
    assert_eq!(orch.stats().searches, 1);

    world.advance(1);
    assert!(orch.find(&world, &mut store, a, b, true).is_some());
    assert_eq!(orch.stats().searches, 2);

    // Another tile in the destination region shares the entry.
    world.advance(1);
    orch.find(&world, &mut store, a, pos("E5S6", 10, 40), true);
    assert_eq!(orch.stats().searches, 2);
}

#[test]
fn cost_matrix_from_features() {
    let (mut world, mut store, mut orch) = setup(plain(), Config::default());
    world.add_feature(pos("E5S5", 10, 10), FeatureKind::Paved);
    world.add_feature(pos("E5S5", 12, 12), FeatureKind::Blocking);
    world.add_feature(pos("E5S5", 14, 14), FeatureKind::Barrier);

    let m = orch.cost_matrix(&world, &mut store, r("E5S5"));
    assert_eq!(m.get(10, 10), 1);
    assert_eq!(m.get(12, 12), IMPASSABLE);
    assert_eq!(m.get(14, 14), 0);
    assert_eq!(m.get(30, 30), 0);

    // Still served from the snapshot within the window, even after changes.
    world.clear_features(pos("E5S5", 12, 12));
    world.advance(9_999);
    let m = orch.cost_matrix(&world, &mut store, r("E5S5"));
    assert_eq!(m.get(12, 12), IMPASSABLE);
    world.advance(1);
    let m = orch.cost_matrix(&world, &mut store, r("E5S5"));
    assert_eq!(m.get(12, 12), 0);
}

#[test]
fn walled_in_destination_is_cached_negative() {
    let mut terrain = plain();
    let region = r("E5S5");
    for i in 38..=42 {
        for (x, y) in [(i, 38), (i, 42), (38, i), (42, i)] {
            terrain.set(Position::new(region, x, y), Terrain::Wall);
        }
    }
    let (mut world, mut store, mut orch) = setup(terrain, Config::default());
    let (a, b) = (pos("E5S5", 10, 10), pos("E5S5", 40, 40));

    assert_eq!(orch.find(&world, &mut store, a, b, true), None);
    assert_eq!(orch.find(&world, &mut store, a, b, true), None);
    assert_eq!(orch.stats().searches, 1);
    assert_eq!(orch.stats().hits, 1);

    world.advance(5_001);
    assert_eq!(orch.find(&world, &mut store, a, b, true), None);
    assert_eq!(orch.stats().searches, 2);
}

#[test]
fn blocked_region_is_never_entered() {
    let config = Config::default()
        .with_blocked_regions([r("E5S6")])
        .with_search(SearchTuning {
            max_ops: 40_000,
            ..SearchTuning::default()
        });
    let (world, mut store, mut orch) = setup(plain(), config);
    let (a, b) = (pos("E5S5", 25, 25), pos("E5S7", 25, 25));

    assert_eq!(orch.hop_distance(&world, &mut store, a.region, b.region), 4);
    let corridor = orch.route(&world, a.region, b.region, true, false).unwrap();
    assert!(!corridor.contains(&r("E5S6")));
    assert_eq!(corridor.last(), Some(&b.region));

    let path = orch.find(&world, &mut store, a, b, true).unwrap();
    let walked = path.decode(a);
    assert!(walked.iter().all(|p| p.region != r("E5S6")));
    assert_eq!(walked.last().map(|p| p.region), Some(b.region));
}

#[test]
fn occupants_only_matter_when_respected() {
    let mut terrain = plain();
    let region = r("E5S5");
    terrain.wall_column(region, 30, 1, 48);
    terrain.set(Position::new(region, 30, 25), Terrain::Plain);
    let (mut world, mut store, mut orch) = setup(terrain, Config::default());
    world.add_occupant(pos("E5S5", 30, 25));
    let (a, b) = (pos("E5S5", 20, 25), pos("E5S5", 40, 25));

    let through = orch.find(&world, &mut store, a, b, false).unwrap();
    assert!(through.decode(a).contains(&pos("E5S5", 30, 25)));
    assert_eq!(store.len(Partition::RoomPath), 0);
    assert_eq!(store.len(Partition::TravelPath), 0);

    assert_eq!(orch.find(&world, &mut store, a, b, true), None);
    assert_eq!(store.len(Partition::RoomPath), 1);

    // The negative answer stands until it expires, even once the way clears.
    world.clear_occupants(region);
    world.advance(10);
    assert_eq!(orch.find(&world, &mut store, a, b, true), None);
    assert!(orch.invalidate(&world, &mut store, a, b));
    assert!(orch.find(&world, &mut store, a, b, true).is_some());
}

#[test]
fn exported_store_survives_restart() {
    let (world, mut store, mut orch) = setup(plain(), Config::default());
    let (a, b) = (pos("E5S5", 25, 25), pos("E5S6", 25, 25));
    let path = orch.find(&world, &mut store, a, b, true);

    let mut restored = MemoryStore::import(store.export()).unwrap();
    let (_, _, mut fresh) = setup(plain(), Config::default());
    assert_eq!(fresh.find(&world, &mut restored, a, b, true), path);
    assert_eq!(fresh.stats().searches, 0);
    assert_eq!(fresh.stats().hits, 1);
}
