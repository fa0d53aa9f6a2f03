//! **waymark-core**: region ids, tile positions and route encodings.
//!
//! This crate provides the pure data types shared across the *waymark*
//! workspace: region identifiers and their classification, local tile
//! positions, per-region cost matrices, and the compact direction-code form
//! routes are cached in.

pub mod geom;
pub mod matrix;
pub mod path;
pub mod region;

pub use geom::{
    Direction, MAX_REGION_MAGNITUDE, ParseRegionError, Position, REGION_SIZE, RegionId, Sign,
};
pub use matrix::{CostMatrix, IMPASSABLE, MatrixSizeError};
pub use path::{EncodedPath, ParsePathError};
pub use region::{Metric, RegionKind, direction, region_distance};
