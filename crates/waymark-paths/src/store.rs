//! Partitioned key-value storage backing the caches.
//!
//! Each [`Partition`] is a string-keyed JSON object. Hosts persist them
//! between ticks however they like; [`MemoryStore`] keeps them in process.

use std::collections::HashMap;
use std::fmt;

use serde_json::{Map, Value};

/// Contents of one partition.
pub type PartitionData = Map<String, Value>;

/// The named partitions used by this crate.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Partition {
    /// Hop distances between regions; never expires.
    Ranges,
    /// Cost-matrix snapshots.
    Matrices,
    /// Same-region paths.
    RoomPath,
    /// Cross-region paths.
    TravelPath,
}

impl Partition {
    pub const ALL: [Partition; 4] = [
        Partition::Ranges,
        Partition::Matrices,
        Partition::RoomPath,
        Partition::TravelPath,
    ];

    /// Stable name, used as the key when exporting.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ranges => "ranges",
            Self::Matrices => "matrices",
            Self::RoomPath => "roomPath",
            Self::TravelPath => "travelPath",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Storage for cache partitions.
///
/// A partition the store does not provide reads as `None`; callers treat that
/// as "no cache" and compute without storing.
pub trait CacheStore {
    /// Whole-partition read.
    fn read(&self, partition: Partition) -> Option<&PartitionData>;

    /// Whole-partition write, replacing the previous contents.
    fn write(&mut self, partition: Partition, data: PartitionData) -> Result<(), StoreError>;

    /// Read-modify-write. Returns `None` without calling `f` if the partition
    /// is not provided.
    fn update<R>(&mut self, partition: Partition, f: impl FnOnce(&mut PartitionData) -> R) -> Option<R>;
}

/// Errors raised by a [`CacheStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store does not provide this partition.
    MissingPartition(Partition),
    /// Imported data is not an object of partitions.
    Malformed(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingPartition(p) => write!(f, "cache partition {p} is not available"),
            Self::Malformed(s) => write!(f, "malformed cache export: {s}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// In-process [`CacheStore`].
#[derive(Debug, Clone)]
pub struct MemoryStore {
    partitions: HashMap<Partition, PartitionData>,
}

impl MemoryStore {
    /// A store providing every partition, all empty.
    pub fn new() -> Self {
        Self::with_partitions(&Partition::ALL)
    }

    /// A store providing only `partitions`.
    pub fn with_partitions(partitions: &[Partition]) -> Self {
        Self {
            partitions: partitions.iter().map(|p| (*p, PartitionData::new())).collect(),
        }
    }

    /// Whether `partition` is provided.
    pub fn has(&self, partition: Partition) -> bool {
        self.partitions.contains_key(&partition)
    }

    /// Number of top-level keys in `partition` (0 if not provided).
    pub fn len(&self, partition: Partition) -> usize {
        self.partitions.get(&partition).map_or(0, Map::len)
    }

    /// Empty every provided partition.
    pub fn clear(&mut self) {
        for data in self.partitions.values_mut() {
            data.clear();
        }
    }

    /// Everything as one JSON object keyed by partition name.
    pub fn export(&self) -> Value {
        let mut out = Map::new();
        for p in Partition::ALL {
            if let Some(data) = self.partitions.get(&p) {
                out.insert(p.name().to_string(), Value::Object(data.clone()));
            }
        }
        Value::Object(out)
    }

    /// Rebuild a store from [`export`](Self::export) output. Partitions
    /// missing from `value` are not provided.
    pub fn import(value: Value) -> Result<Self, StoreError> {
        let Value::Object(map) = value else {
            return Err(StoreError::Malformed("expected an object".into()));
        };
        let mut partitions = HashMap::new();
        for (name, data) in map {
            let partition = Partition::from_name(&name)
                .ok_or_else(|| StoreError::Malformed(format!("unknown partition {name}")))?;
            let Value::Object(data) = data else {
                return Err(StoreError::Malformed(format!("partition {name} is not an object")));
            };
            partitions.insert(partition, data);
        }
        Ok(Self { partitions })
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheStore for MemoryStore {
    fn read(&self, partition: Partition) -> Option<&PartitionData> {
        self.partitions.get(&partition)
    }

    fn write(&mut self, partition: Partition, data: PartitionData) -> Result<(), StoreError> {
        match self.partitions.get_mut(&partition) {
            Some(slot) => {
                *slot = data;
                Ok(())
            }
            None => Err(StoreError::MissingPartition(partition)),
        }
    }

    fn update<R>(&mut self, partition: Partition, f: impl FnOnce(&mut PartitionData) -> R) -> Option<R> {
        self.partitions.get_mut(&partition).map(f)
    }
}

// ---------------------------------------------------------------------------
// Two-level key helpers: data[outer][inner]
// ---------------------------------------------------------------------------

pub(crate) fn nested_get<'a>(data: &'a PartitionData, outer: &str, inner: &str) -> Option<&'a Value> {
    data.get(outer)?.as_object()?.get(inner)
}

pub(crate) fn nested_insert(data: &mut PartitionData, outer: String, inner: String, value: Value) {
    let slot = data
        .entry(outer)
        .or_insert_with(|| Value::Object(Map::new()));
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    if let Value::Object(map) = slot {
        map.insert(inner, value);
    }
}

pub(crate) fn nested_remove(data: &mut PartitionData, outer: &str, inner: &str) -> Option<Value> {
    let map = data.get_mut(outer)?.as_object_mut()?;
    let removed = map.remove(inner);
    if map.is_empty() {
        data.remove(outer);
    }
    removed
}
