//! Dijkstra over the 4-connected region grid.

use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, BinaryHeap, HashMap};

use waymark_core::RegionId;
use waymark_paths::{RegionRouter, UNREACHABLE};

/// Frontier entry ordered by accumulated cost, cheapest first.
#[derive(Clone, Copy, Eq, PartialEq)]
struct Frontier {
    region: RegionId,
    cost: u64,
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Reverse for a min-heap; ties broken by region for determinism.
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.region.cmp(&self.region))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Region router over a fixed set of regions. Regions outside the set do
/// not exist.
#[derive(Clone, Debug, Default)]
pub struct GridRouter {
    regions: BTreeSet<RegionId>,
}

impl GridRouter {
    pub fn new(regions: impl IntoIterator<Item = RegionId>) -> Self {
        Self {
            regions: regions.into_iter().collect(),
        }
    }

    #[inline]
    pub fn contains(&self, region: RegionId) -> bool {
        self.regions.contains(&region)
    }
}

impl RegionRouter for GridRouter {
    fn find_route<F>(&self, from: RegionId, to: RegionId, mut weight: F) -> Option<Vec<RegionId>>
    where
        F: FnMut(RegionId) -> u32,
    {
        if from == to {
            return Some(Vec::new());
        }
        if !self.contains(from) || !self.contains(to) {
            return None;
        }

        let mut weights: HashMap<RegionId, u32> = HashMap::new();
        let mut best: HashMap<RegionId, (u64, RegionId)> = HashMap::new();
        let mut open = BinaryHeap::from([Frontier {
            region: from,
            cost: 0,
        }]);
        best.insert(from, (0, from));

        while let Some(current) = open.pop() {
            if current.region == to {
                break;
            }
            if best.get(&current.region).is_some_and(|(c, _)| *c < current.cost) {
                continue;
            }
            for next in current.region.neighbors() {
                if !self.contains(next) || next == from {
                    continue;
                }
                let w = *weights.entry(next).or_insert_with(|| weight(next));
                if w == UNREACHABLE {
                    continue;
                }
                let cost = current.cost + u64::from(w);
                match best.entry(next) {
                    Entry::Occupied(mut e) => {
                        if cost >= e.get().0 {
                            continue;
                        }
                        e.insert((cost, current.region));
                    }
                    Entry::Vacant(e) => {
                        e.insert((cost, current.region));
                    }
                }
                open.push(Frontier { region: next, cost });
            }
        }

        best.get(&to)?;
        let mut route = Vec::new();
        let mut cur = to;
        while cur != from {
            route.push(cur);
            cur = best.get(&cur)?.1;
        }
        route.reverse();
        Some(route)
    }
}
