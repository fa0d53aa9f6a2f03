//! Small fakes for unit tests.

use std::cell::Cell;
use std::collections::{HashMap, HashSet};

use waymark_core::{Position, RegionId};

use crate::traits::{
    Feature, FeatureKind, RegionCosts, RegionRouter, SearchGoal, SearchOptions, Standing, Tick,
    TilePathfinder, UNREACHABLE, WorldView,
};

pub(crate) fn region(s: &str) -> RegionId {
    s.parse().unwrap()
}

pub(crate) fn pos(r: &str, x: i32, y: i32) -> Position {
    Position::new(region(r), x, y)
}

#[derive(Default)]
pub(crate) struct FakeWorld {
    pub(crate) tick: Tick,
    observable: HashSet<RegionId>,
    features: HashMap<RegionId, Vec<Feature>>,
    occupants: HashMap<RegionId, Vec<Position>>,
    standing: HashMap<RegionId, Standing>,
    closed: HashSet<RegionId>,
    pub(crate) occupant_queries: Cell<u32>,
}

impl FakeWorld {
    pub(crate) fn new(tick: Tick) -> Self {
        Self {
            tick,
            ..Self::default()
        }
    }

    pub(crate) fn observe(&mut self, r: RegionId) {
        self.observable.insert(r);
    }

    pub(crate) fn hide(&mut self, r: RegionId) {
        self.observable.remove(&r);
    }

    pub(crate) fn feature(&mut self, pos: Position, kind: FeatureKind) {
        self.features.entry(pos.region).or_default().push(Feature { pos, kind });
    }

    pub(crate) fn occupant(&mut self, pos: Position) {
        self.occupants.entry(pos.region).or_default().push(pos);
    }

    pub(crate) fn set_standing(&mut self, r: RegionId, standing: Standing) {
        self.standing.insert(r, standing);
    }

    pub(crate) fn close(&mut self, r: RegionId) {
        self.closed.insert(r);
    }
}

impl WorldView for FakeWorld {
    fn tick(&self) -> Tick {
        self.tick
    }

    fn is_observable(&self, region: RegionId) -> bool {
        self.observable.contains(&region)
    }

    fn features(&self, region: RegionId, buf: &mut Vec<Feature>) {
        if let Some(f) = self.features.get(&region) {
            buf.extend_from_slice(f);
        }
    }

    fn occupants(&self, region: RegionId, buf: &mut Vec<Position>) {
        self.occupant_queries.set(self.occupant_queries.get() + 1);
        if let Some(o) = self.occupants.get(&region) {
            buf.extend_from_slice(o);
        }
    }

    fn standing(&self, region: RegionId) -> Option<Standing> {
        if !self.is_observable(region) {
            return None;
        }
        Some(self.standing.get(&region).copied().unwrap_or(Standing::Neutral))
    }

    fn is_available(&self, region: RegionId) -> bool {
        !self.closed.contains(&region)
    }
}

/// Walks a straight Chebyshev line in world coordinates. Fails if a region
/// on the way is excluded or a tile is impassable.
#[derive(Default)]
pub(crate) struct LineFinder {
    pub(crate) calls: Cell<u32>,
    pub(crate) asked: std::cell::RefCell<Vec<(RegionId, RegionCosts)>>,
    pub(crate) last_options: std::cell::RefCell<Option<SearchOptions>>,
}

impl TilePathfinder for LineFinder {
    fn search<F>(
        &self,
        origin: Position,
        goal: SearchGoal,
        options: &SearchOptions,
        mut costs: F,
    ) -> Option<Vec<Position>>
    where
        F: FnMut(RegionId) -> RegionCosts,
    {
        self.calls.set(self.calls.get() + 1);
        *self.last_options.borrow_mut() = Some(options.clone());
        let mut seen: HashMap<RegionId, RegionCosts> = HashMap::new();
        let (mut x, mut y) = origin.to_world();
        let (gx, gy) = goal.pos.to_world();
        let mut path = Vec::new();
        while (gx - x).abs().max((gy - y).abs()) as u32 > goal.range {
            x += (gx - x).signum();
            y += (gy - y).signum();
            let p = Position::from_world(x, y);
            let c = seen.entry(p.region).or_insert_with(|| {
                let c = costs(p.region);
                self.asked.borrow_mut().push((p.region, c.clone()));
                c
            });
            match c {
                RegionCosts::Excluded => return None,
                RegionCosts::Matrix(m) if m.is_impassable(p.x, p.y) => return None,
                _ => {}
            }
            path.push(p);
        }
        Some(path)
    }
}

/// Moves along x, then along y. Fails on the first excluded region.
#[derive(Default)]
pub(crate) struct AxisRouter {
    pub(crate) calls: Cell<u32>,
}

impl RegionRouter for AxisRouter {
    fn find_route<F>(&self, from: RegionId, to: RegionId, mut weight: F) -> Option<Vec<RegionId>>
    where
        F: FnMut(RegionId) -> u32,
    {
        self.calls.set(self.calls.get() + 1);
        let mut route = Vec::new();
        let mut cur = from;
        while cur != to {
            let dx = (to.world_x() - cur.world_x()).signum();
            let dy = if dx == 0 {
                (to.world_y() - cur.world_y()).signum()
            } else {
                0
            };
            cur = cur.shift(dx, dy);
            if weight(cur) == UNREACHABLE {
                return None;
            }
            route.push(cur);
        }
        Some(route)
    }
}
