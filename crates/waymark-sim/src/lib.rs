//! Reference engines for the `waymark-paths` seams.
//!
//! - [`SimWorld`]: a [`WorldView`](waymark_paths::WorldView) set up by hand
//! - [`GridPathfinder`]: weighted A* over a [`TerrainMap`], crossing region exits
//! - [`GridRouter`]: Dijkstra over a fixed set of regions
//!
//! Hosts with their own world and search engines do not need this crate.

mod astar;
mod router;
mod world;

#[cfg(test)]
mod scenarios;

pub use astar::GridPathfinder;
pub use router::GridRouter;
pub use world::{SimWorld, Terrain, TerrainMap};
