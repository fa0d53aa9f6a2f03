//! Cached two-level path orchestration for region-partitioned worlds.
//!
//! A request goes through [`PathOrchestrator::find`], which layers several
//! caches over two pluggable search engines:
//!
//! - **Hop distances** between regions, memoized forever ([`RegionDistanceCache`])
//! - **Region corridors** from a weighted macro search ([`MacroRouter`])
//! - **Cost matrices** per region with a validity window ([`CostMatrixCache`])
//! - **Encoded paths** in a same-region and a cross-region tier ([`PathCache`])
//!
//! Persistent state lives in named partitions of a [`CacheStore`]; the
//! in-memory [`MemoryStore`] is provided.
//!
//! # Seams
//!
//! | Trait | Provides |
//! |---|---|
//! | [`WorldView`] | tick, visibility, features, occupants, standing |
//! | [`TilePathfinder`] | weighted tile search across regions |
//! | [`RegionRouter`] | shortest route over the region graph |

mod cache;
mod config;
mod distance;
mod matrix;
mod orchestrator;
mod route;
mod store;
mod traits;

#[cfg(test)]
mod testutil;

pub use cache::{Lookup, PathCache, Tier};
pub use config::{Config, ConfigError, SearchTuning};
pub use distance::RegionDistanceCache;
pub use matrix::CostMatrixCache;
pub use orchestrator::{OrchestratorStats, PathOrchestrator};
pub use route::MacroRouter;
pub use store::{CacheStore, MemoryStore, Partition, PartitionData, StoreError};
pub use traits::{
    Feature, FeatureKind, RegionCosts, RegionRouter, SearchGoal, SearchOptions, Standing, Tick,
    TilePathfinder, UNREACHABLE, WorldView,
};
