//! Per-region cost matrices with a validity window.
//!
//! Snapshots live in the [`Partition::Matrices`] partition as
//! `{ "m": [...costs], "c": computed_at, "v": validity }` keyed by region
//! name. A decoded copy is kept in process so a snapshot is deserialized at
//! most once per validity window.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use waymark_core::{CostMatrix, IMPASSABLE, Position, RegionId};

use crate::config::Config;
use crate::store::{CacheStore, Partition};
use crate::traits::{Feature, FeatureKind, Tick, WorldView};

#[derive(Serialize)]
struct SnapshotRef<'a> {
    m: &'a CostMatrix,
    c: Tick,
    v: u32,
}

#[derive(Deserialize)]
struct Stamp {
    c: Tick,
    v: u32,
}

/// Builds and caches static cost matrices.
pub struct CostMatrixCache {
    validity: u32,
    default_cost: u8,
    paved_cost: u8,
    // region -> (computed_at, matrix)
    decoded: HashMap<RegionId, (Tick, CostMatrix)>,
    // scratch buffers for world queries
    features: Vec<Feature>,
    occupants: Vec<Position>,
}

impl CostMatrixCache {
    /// Create a cache using the validity window and costs from `config`.
    pub fn new(config: &Config) -> Self {
        Self {
            validity: config.cost_matrix_validity,
            default_cost: config.default_cost,
            paved_cost: config.paved_cost,
            decoded: HashMap::new(),
            features: Vec::new(),
            occupants: Vec::new(),
        }
    }

    /// A matrix filled with the default cost.
    pub fn default_matrix(&self) -> CostMatrix {
        CostMatrix::new(self.default_cost)
    }

    /// Static cost matrix for `region`.
    ///
    /// Served from the stored snapshot while it is fresh. Otherwise rebuilt
    /// from observed features if the region is observable; if not, the stale
    /// snapshot (or a default matrix) is returned.
    pub fn get<W: WorldView, S: CacheStore>(&mut self, world: &W, store: &mut S, region: RegionId) -> CostMatrix {
        let now = world.tick();
        if let Some(stamp) = stamp(store, region) {
            if u64::from(stamp.c) + u64::from(stamp.v) > u64::from(now) {
                if let Some(m) = self.decode(store, region, stamp.c) {
                    return m;
                }
            }
        }
        if world.is_observable(region) {
            return self.compute(world, store, region, now);
        }
        log::info!("region {region} not observable, using last cost matrix snapshot");
        self.snapshot(store, region)
            .unwrap_or_else(|| self.default_matrix())
    }

    /// The last stored matrix for `region`, however old.
    pub fn snapshot<S: CacheStore>(&mut self, store: &S, region: RegionId) -> Option<CostMatrix> {
        let stamp = stamp(store, region)?;
        self.decode(store, region, stamp.c)
    }

    /// [`get`](Self::get) with every observed occupant's tile made impassable.
    ///
    /// The result is never stored.
    pub fn current<W: WorldView, S: CacheStore>(&mut self, world: &W, store: &mut S, region: RegionId) -> CostMatrix {
        let mut matrix = self.get(world, store, region);
        if world.is_observable(region) {
            self.occupants.clear();
            world.occupants(region, &mut self.occupants);
            for pos in self.occupants.iter().filter(|p| p.region == region) {
                matrix.set(pos.x, pos.y, IMPASSABLE);
            }
        }
        matrix
    }

    /// Drop the in-process decoded copies. Stored snapshots are untouched.
    pub fn forget(&mut self) {
        self.decoded.clear();
    }

    fn compute<W: WorldView, S: CacheStore>(&mut self, world: &W, store: &mut S, region: RegionId, now: Tick) -> CostMatrix {
        log::debug!("calculating cost matrix for {region}");
        let mut matrix = self.default_matrix();
        self.features.clear();
        world.features(region, &mut self.features);
        for feature in self.features.iter().filter(|f| f.pos.region == region) {
            match feature.kind {
                FeatureKind::Paved => matrix.set(feature.pos.x, feature.pos.y, self.paved_cost),
                FeatureKind::Barrier => {}
                FeatureKind::Blocking => matrix.set(feature.pos.x, feature.pos.y, IMPASSABLE),
            }
        }

        let snapshot = SnapshotRef {
            m: &matrix,
            c: now,
            v: self.validity,
        };
        match serde_json::to_value(&snapshot) {
            Ok(value) => {
                let key = region.to_string();
                if store.update(Partition::Matrices, |data| data.insert(key, value)).is_none() {
                    log::debug!("matrices partition absent, cost matrix for {region} not stored");
                }
            }
            Err(e) => log::warn!("cannot serialize cost matrix for {region}: {e}"),
        }
        self.decoded.insert(region, (now, matrix.clone()));
        matrix
    }

    fn decode<S: CacheStore>(&mut self, store: &S, region: RegionId, computed: Tick) -> Option<CostMatrix> {
        if let Some((c, m)) = self.decoded.get(&region) {
            if *c == computed {
                return Some(m.clone());
            }
        }
        let raw = store.read(Partition::Matrices)?.get(&region.to_string())?.get("m")?;
        match CostMatrix::deserialize(raw) {
            Ok(m) => {
                self.decoded.insert(region, (computed, m.clone()));
                Some(m)
            }
            Err(e) => {
                log::warn!("discarding unreadable cost matrix for {region}: {e}");
                None
            }
        }
    }
}

fn stamp<S: CacheStore>(store: &S, region: RegionId) -> Option<Stamp> {
    let raw: &Value = store.read(Partition::Matrices)?.get(&region.to_string())?;
    Stamp::deserialize(raw).ok()
}
