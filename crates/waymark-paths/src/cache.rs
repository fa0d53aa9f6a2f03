//! Two-tier cache of encoded tile paths.
//!
//! Same-region paths are keyed by exact origin and destination tiles;
//! cross-region paths by exact origin tile and destination *region*, so every
//! destination tile inside a region shares one entry. Entries are stored as
//! `partition[from_key][to_key] = { "p": path, "t": expiry }` and are only
//! invalidated when read.

use serde::{Deserialize, Serialize};
use waymark_core::{EncodedPath, Position};

use crate::store::{CacheStore, Partition, nested_get, nested_insert, nested_remove};
use crate::traits::Tick;

/// Which cache tier a request falls into.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Tier {
    SameRegion,
    CrossRegion,
}

impl Tier {
    /// Tier for a hop distance between origin and destination regions.
    #[inline]
    pub fn from_hops(hops: u32) -> Self {
        if hops == 0 {
            Self::SameRegion
        } else {
            Self::CrossRegion
        }
    }

    /// Partition holding this tier's entries.
    #[inline]
    pub fn partition(self) -> Partition {
        match self {
            Self::SameRegion => Partition::RoomPath,
            Self::CrossRegion => Partition::TravelPath,
        }
    }

    /// `(departure, arrival)` keys for a request.
    pub fn keys(self, origin: Position, destination: Position) -> (String, String) {
        let arrival = match self {
            Self::SameRegion => destination.to_string(),
            Self::CrossRegion => destination.region.to_string(),
        };
        (origin.to_string(), arrival)
    }
}

/// Result of a cache lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Lookup {
    /// A live entry. An empty path is a cached "no path".
    Hit(EncodedPath),
    /// No live entry.
    Miss,
    /// The tier's partition is not provided by the store.
    Absent,
}

#[derive(Serialize, Deserialize)]
struct Entry {
    #[serde(default)]
    p: Option<String>,
    t: Tick,
}

/// Reads and writes path entries in the tier partitions.
#[derive(Clone, Copy, Debug, Default)]
pub struct PathCache;

impl PathCache {
    pub fn new() -> Self {
        Self
    }

    /// Look up the entry for `origin` → `destination` in `tier`.
    ///
    /// Entries that are expired (`t < now`), lack a path, or cannot be read
    /// are deleted and reported as a miss.
    pub fn get<S: CacheStore>(
        &self,
        store: &mut S,
        tier: Tier,
        origin: Position,
        destination: Position,
        now: Tick,
    ) -> Lookup {
        let partition = tier.partition();
        let (from_key, to_key) = tier.keys(origin, destination);
        let Some(data) = store.read(partition) else {
            return Lookup::Absent;
        };
        let Some(raw) = nested_get(data, &from_key, &to_key) else {
            return Lookup::Miss;
        };

        let live = match Entry::deserialize(raw) {
            Ok(Entry { p: Some(p), t }) if t >= now => match p.parse::<EncodedPath>() {
                Ok(path) => Some(path),
                Err(e) => {
                    log::warn!("evicting unreadable path {from_key} -> {to_key}: {e}");
                    None
                }
            },
            Ok(_) => None,
            Err(e) => {
                log::warn!("evicting malformed path entry {from_key} -> {to_key}: {e}");
                None
            }
        };
        match live {
            Some(path) => Lookup::Hit(path),
            None => {
                store.update(partition, |data| nested_remove(data, &from_key, &to_key));
                Lookup::Miss
            }
        }
    }

    /// Store `path` for `origin` → `destination`, valid for `validity` ticks
    /// from `now`. Overwrites any previous entry. Returns `false` if the
    /// tier's partition is not provided.
    pub fn put<S: CacheStore>(
        &self,
        store: &mut S,
        tier: Tier,
        origin: Position,
        destination: Position,
        path: &EncodedPath,
        validity: u32,
        now: Tick,
    ) -> bool {
        let (from_key, to_key) = tier.keys(origin, destination);
        let entry = Entry {
            p: Some(path.as_str().to_string()),
            t: now.saturating_add(validity),
        };
        let value = match serde_json::to_value(&entry) {
            Ok(v) => v,
            Err(e) => {
                log::warn!("cannot serialize path entry {from_key} -> {to_key}: {e}");
                return false;
            }
        };
        store
            .update(tier.partition(), |data| nested_insert(data, from_key, to_key, value))
            .is_some()
    }

    /// Delete the entry for `origin` → `destination`. Returns whether one existed.
    pub fn remove<S: CacheStore>(&self, store: &mut S, tier: Tier, origin: Position, destination: Position) -> bool {
        let (from_key, to_key) = tier.keys(origin, destination);
        store
            .update(tier.partition(), |data| nested_remove(data, &from_key, &to_key))
            .flatten()
            .is_some()
    }
}
