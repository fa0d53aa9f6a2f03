//! Weighted A* over world tiles, spanning region borders.

use std::collections::hash_map::Entry;
use std::collections::{BinaryHeap, HashMap};

use waymark_core::{Direction, IMPASSABLE, Position, REGION_SIZE, RegionId};
use waymark_paths::{RegionCosts, SearchGoal, SearchOptions, TilePathfinder};

use crate::world::{Terrain, TerrainMap};

struct Node {
    pos: Position,
    g: u32,
    parent: usize,
    open: bool,
}

/// Reference into the node array, ordered by `f` for use in `BinaryHeap`.
#[derive(Clone, Copy, Eq, PartialEq)]
struct NodeRef {
    idx: usize,
    f: u32,
}

impl Ord for NodeRef {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Reverse so BinaryHeap (max-heap) pops smallest f first.
        other.f.cmp(&self.f)
    }
}

impl PartialOrd for NodeRef {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Tile search over a [`TerrainMap`].
///
/// Movement follows the region exit rules: a tile on a region border can
/// only be entered from inside the region, and must then be left straight
/// across to the mirrored border tile of the neighbour. Walking along a
/// border and standing on corners are not possible.
#[derive(Clone, Debug)]
pub struct GridPathfinder {
    terrain: TerrainMap,
}

impl GridPathfinder {
    pub fn new(terrain: TerrainMap) -> Self {
        Self { terrain }
    }

    #[inline]
    pub fn terrain(&self) -> &TerrainMap {
        &self.terrain
    }

    fn tile_cost(
        &self,
        pos: Position,
        costs: &RegionCosts,
        options: &SearchOptions,
    ) -> Option<u32> {
        if is_corner(pos) {
            return None;
        }
        let over = match costs {
            RegionCosts::Excluded => return None,
            RegionCosts::Unknown => 0,
            RegionCosts::Matrix(m) => m.get(pos.x, pos.y),
        };
        if over == IMPASSABLE {
            return None;
        }
        if over > 0 {
            return Some(u32::from(over));
        }
        match self.terrain.get(pos) {
            Terrain::Plain => Some(u32::from(options.plain_cost)),
            Terrain::Swamp => Some(u32::from(options.swamp_cost)),
            Terrain::Wall => None,
        }
    }
}

/// Per-search state: which regions have been asked for costs, and what they
/// answered.
struct Regions<'a, F> {
    terrain: &'a TerrainMap,
    costs: F,
    known: HashMap<RegionId, RegionCosts>,
    entered: u32,
    max: u32,
}

impl<F: FnMut(RegionId) -> RegionCosts> Regions<'_, F> {
    fn get(&mut self, region: RegionId) -> &RegionCosts {
        match self.known.entry(region) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(e) => {
                let costs = if !self.terrain.contains(region) || self.entered >= self.max {
                    RegionCosts::Excluded
                } else {
                    (self.costs)(region)
                };
                if costs != RegionCosts::Excluded {
                    self.entered += 1;
                }
                e.insert(costs)
            }
        }
    }
}

impl TilePathfinder for GridPathfinder {
    fn search<F>(
        &self,
        origin: Position,
        goal: SearchGoal,
        options: &SearchOptions,
        costs: F,
    ) -> Option<Vec<Position>>
    where
        F: FnMut(RegionId) -> RegionCosts,
    {
        let mut regions = Regions {
            terrain: &self.terrain,
            costs,
            known: HashMap::new(),
            entered: 0,
            max: options.max_regions,
        };
        regions.get(origin.region);

        let step_min = u32::from(options.plain_cost.min(options.swamp_cost)).max(1);
        let estimate = |p: Position| -> u32 {
            let d = chebyshev(p, goal.pos).saturating_sub(goal.range);
            (d as f32 * step_min as f32 * options.heuristic_weight) as u32
        };

        let mut nodes = vec![Node {
            pos: origin,
            g: 0,
            parent: usize::MAX,
            open: true,
        }];
        let mut index: HashMap<Position, usize> = HashMap::from([(origin, 0)]);
        let mut open = BinaryHeap::from([NodeRef {
            idx: 0,
            f: estimate(origin),
        }]);
        let mut nbuf: Vec<Position> = Vec::with_capacity(8);
        let mut ops = 0;

        let found = 'search: loop {
            let Some(current) = open.pop() else {
                break 'search None;
            };
            let ci = current.idx;
            if !nodes[ci].open {
                continue;
            }
            let cp = nodes[ci].pos;
            if chebyshev(cp, goal.pos) <= goal.range {
                break 'search Some(ci);
            }
            ops += 1;
            if ops > options.max_ops {
                log::debug!("search {origin} -> {} ran out of operations", goal.pos);
                break 'search None;
            }
            nodes[ci].open = false;
            let current_g = nodes[ci].g;

            nbuf.clear();
            let arrived_inside = ci != 0 && nodes[nodes[ci].parent].pos.region == cp.region;
            neighbors(cp, arrived_inside, &mut nbuf);

            for &np in nbuf.iter() {
                let Some(cost) = self.tile_cost(np, regions.get(np.region), options) else {
                    continue;
                };
                let tentative_g = current_g + cost;
                let ni = match index.entry(np) {
                    Entry::Occupied(e) => {
                        let ni = *e.get();
                        if tentative_g >= nodes[ni].g {
                            continue;
                        }
                        ni
                    }
                    Entry::Vacant(e) => {
                        nodes.push(Node {
                            pos: np,
                            g: u32::MAX,
                            parent: usize::MAX,
                            open: false,
                        });
                        *e.insert(nodes.len() - 1)
                    }
                };
                let n = &mut nodes[ni];
                n.g = tentative_g;
                n.parent = ci;
                n.open = true;
                open.push(NodeRef {
                    idx: ni,
                    f: tentative_g + estimate(np),
                });
            }
        };

        let goal_idx = found?;
        let mut path = Vec::new();
        let mut ci = goal_idx;
        while ci != 0 {
            path.push(nodes[ci].pos);
            ci = nodes[ci].parent;
        }
        path.reverse();
        Some(path)
    }
}

/// Append the tiles reachable in one move from `p` into `buf`.
fn neighbors(p: Position, arrived_inside: bool, buf: &mut Vec<Position>) {
    let (wx, wy) = p.to_world();
    if p.is_border() && arrived_inside {
        // Carried across the exit.
        let last = REGION_SIZE - 1;
        let (dx, dy) = match (p.x, p.y) {
            (0, _) => (-1, 0),
            (x, _) if x == last => (1, 0),
            (_, 0) => (0, -1),
            _ => (0, 1),
        };
        buf.push(Position::from_world(wx + dx, wy + dy));
        return;
    }
    for dir in Direction::ALL {
        let (dx, dy) = dir.delta();
        let q = Position::from_world(wx + dx, wy + dy);
        if q.region != p.region || (p.is_border() && q.is_border()) {
            continue;
        }
        buf.push(q);
    }
}

#[inline]
fn is_corner(p: Position) -> bool {
    let last = REGION_SIZE - 1;
    (p.x == 0 || p.x == last) && (p.y == 0 || p.y == last)
}

#[inline]
fn chebyshev(a: Position, b: Position) -> u32 {
    let (ax, ay) = a.to_world();
    let (bx, by) = b.to_world();
    (ax - bx).unsigned_abs().max((ay - by).unsigned_abs())
}
