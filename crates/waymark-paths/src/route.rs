//! Region-level routing over a weighted region graph.

use std::collections::HashSet;

use waymark_core::RegionId;
use waymark_core::region::is_highway;

use crate::traits::{RegionRouter, UNREACHABLE, WorldView};

/// Weight of entering a friendly region or the destination.
const FRIENDLY_WEIGHT: u32 = 1;
/// Weight of entering a highway when highways are preferred.
const HIGHWAY_WEIGHT: u32 = 3;
/// Weight of entering any other available region when a preference is active.
const DETOUR_WEIGHT: u32 = 11;

/// Computes region corridors, steering the external region router with a
/// per-region edge weight.
#[derive(Clone, Debug, Default)]
pub struct MacroRouter {
    blocked: HashSet<RegionId>,
}

impl MacroRouter {
    /// Create a router that never enters `blocked` regions.
    pub fn new(blocked: impl IntoIterator<Item = RegionId>) -> Self {
        Self {
            blocked: blocked.into_iter().collect(),
        }
    }

    /// Whether `region` is on the block-list.
    #[inline]
    pub fn is_blocked(&self, region: RegionId) -> bool {
        self.blocked.contains(&region)
    }

    /// Weight of entering `region` on the way to `destination`.
    ///
    /// Rules are checked in order; the first that applies wins.
    pub fn weight<W: WorldView>(
        &self,
        world: &W,
        destination: RegionId,
        region: RegionId,
        check_ownership: bool,
        prefer_highway: bool,
    ) -> u32 {
        if region == destination {
            return FRIENDLY_WEIGHT;
        }
        if self.is_blocked(region) {
            return UNREACHABLE;
        }
        if check_ownership && world.standing(region).is_some_and(|s| s.is_friendly()) {
            return FRIENDLY_WEIGHT;
        }
        if prefer_highway && is_highway(region) {
            return HIGHWAY_WEIGHT;
        }
        if world.is_available(region) {
            return if check_ownership || prefer_highway {
                DETOUR_WEIGHT
            } else {
                FRIENDLY_WEIGHT
            };
        }
        UNREACHABLE
    }

    /// Regions to cross from `origin` to `destination`, excluding `origin`
    /// and ending with `destination`.
    ///
    /// Empty for a same-region request; `None` if no route exists.
    pub fn route<W: WorldView, R: RegionRouter>(
        &self,
        world: &W,
        router: &R,
        origin: RegionId,
        destination: RegionId,
        check_ownership: bool,
        prefer_highway: bool,
    ) -> Option<Vec<RegionId>> {
        if origin == destination {
            return Some(Vec::new());
        }
        let route = router.find_route(origin, destination, |region| {
            self.weight(world, destination, region, check_ownership, prefer_highway)
        })?;

        // The router is external: refuse answers that break our guarantees.
        let Some((&last, rest)) = route.split_last() else {
            log::warn!("region router returned an empty route {origin} -> {destination}");
            return None;
        };
        if last != destination || rest.contains(&destination) {
            log::warn!("region router route {origin} -> {destination} does not end at the destination");
            return None;
        }
        if let Some(bad) = rest.iter().find(|r| self.is_blocked(**r)) {
            log::warn!("region router routed {origin} -> {destination} through blocked {bad}");
            return None;
        }
        Some(route)
    }
}
