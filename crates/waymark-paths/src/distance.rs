//! Memoized hop distances between regions.
//!
//! Entries live in [`Partition::Ranges`] as `ranges[from][to] = hops` and
//! never expire: region topology is treated as static. Only
//! [`RegionDistanceCache::reset`] removes them.

use serde_json::Value;
use waymark_core::{Metric, RegionId, region_distance};

use crate::route::MacroRouter;
use crate::store::{CacheStore, Partition, PartitionData, StoreError, nested_get, nested_insert};
use crate::traits::{RegionRouter, Standing, UNREACHABLE, WorldView};

/// Hop-distance memo over the region graph.
#[derive(Clone, Copy, Debug, Default)]
pub struct RegionDistanceCache;

impl RegionDistanceCache {
    pub fn new() -> Self {
        Self
    }

    /// Number of region hops from `from` to `to`, or [`UNREACHABLE`].
    ///
    /// When the search cannot be run (origin not observable, or target not
    /// known to the world) the Manhattan region distance is returned and
    /// nothing is memoized.
    pub fn hop_distance<W: WorldView, S: CacheStore, R: RegionRouter>(
        &self,
        world: &W,
        store: &mut S,
        router: &MacroRouter,
        engine: &R,
        from: RegionId,
        to: RegionId,
    ) -> u32 {
        if from == to {
            return 0;
        }
        let memo = store.read(Partition::Ranges);
        if let Some(hops) = memo.and_then(|data| lookup(data, from, to)) {
            return hops;
        }
        let memo_present = memo.is_some();

        if !world.is_observable(from) || !world.is_available(to) {
            log::debug!("cannot resolve {from} -> {to}, estimating hop distance");
            return region_distance(from, to, Metric::Manhattan);
        }

        let hops = match router.route(world, engine, from, to, false, false) {
            Some(route) => route.len() as u32,
            None => UNREACHABLE,
        };
        if memo_present {
            store.update(Partition::Ranges, |data| {
                nested_insert(data, from.to_string(), to.to_string(), Value::from(hops));
            });
        } else {
            log::debug!("ranges partition absent, hop distance {from} -> {to} not memoized");
        }
        hops
    }

    /// The owned region among `candidates` with the fewest hops to `target`.
    ///
    /// Regions not seen as [`Standing::Mine`] are skipped, as are those that
    /// cannot reach `target`. Ties go to the earliest candidate.
    pub fn nearest_owned<W, S, R, I>(
        &self,
        world: &W,
        store: &mut S,
        router: &MacroRouter,
        engine: &R,
        candidates: I,
        target: RegionId,
    ) -> Option<RegionId>
    where
        W: WorldView,
        S: CacheStore,
        R: RegionRouter,
        I: IntoIterator<Item = RegionId>,
    {
        candidates
            .into_iter()
            .filter(|r| world.standing(*r) == Some(Standing::Mine))
            .map(|r| (r, self.hop_distance(world, store, router, engine, r, target)))
            .filter(|(_, hops)| *hops != UNREACHABLE)
            .min_by_key(|(_, hops)| *hops)
            .map(|(r, _)| r)
    }

    /// The memoized distance, if any.
    pub fn cached<S: CacheStore>(&self, store: &S, from: RegionId, to: RegionId) -> Option<u32> {
        if from == to {
            return Some(0);
        }
        lookup(store.read(Partition::Ranges)?, from, to)
    }

    /// Record a distance explicitly, overwriting any previous value.
    pub fn set<S: CacheStore>(&self, store: &mut S, from: RegionId, to: RegionId, hops: u32) -> Result<(), StoreError> {
        store
            .update(Partition::Ranges, |data| {
                nested_insert(data, from.to_string(), to.to_string(), Value::from(hops));
            })
            .ok_or(StoreError::MissingPartition(Partition::Ranges))
    }

    /// Forget every memoized distance.
    pub fn reset<S: CacheStore>(&self, store: &mut S) -> Result<(), StoreError> {
        store.write(Partition::Ranges, PartitionData::new())
    }
}

fn lookup(data: &PartitionData, from: RegionId, to: RegionId) -> Option<u32> {
    let hops = nested_get(data, &from.to_string(), &to.to_string())?.as_u64()?;
    u32::try_from(hops).ok()
}
