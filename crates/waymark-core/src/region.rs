//! Region classification and region-to-region distances.
//!
//! Every function here is pure: the answer depends only on the region ids.

use crate::geom::{Direction, Position, RegionId};

/// Position of a region inside its 10×10 sector, each axis magnitude mod 10.
#[inline]
pub fn coordinates(region: RegionId) -> (u32, u32) {
    let (_, x) = region.x_axis();
    let (_, y) = region.y_axis();
    (x % 10, y % 10)
}

/// The exact centre of a sector.
pub fn is_center(region: RegionId) -> bool {
    let (x, y) = coordinates(region);
    x == 5 && y == 5
}

/// The 3×3 block around the centre of a sector.
pub fn is_center_nine(region: RegionId) -> bool {
    let (x, y) = coordinates(region);
    x > 3 && x < 7 && y > 3 && y < 7
}

/// Regions that can carry a controller: neither a highway nor in the centre nine.
pub fn is_controller_eligible(region: RegionId) -> bool {
    let (x, y) = coordinates(region);
    x != 0 && y != 0 && (x < 4 || x > 6 || y < 4 || y > 6)
}

/// The centre nine without the exact centre.
pub fn is_special_zone(region: RegionId) -> bool {
    is_center_nine(region) && !is_center(region)
}

/// Sector boundary regions.
pub fn is_highway(region: RegionId) -> bool {
    let (x, y) = coordinates(region);
    x == 0 || y == 0
}

/// Coarse kind of a region. Every region has exactly one.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RegionKind {
    Highway,
    Center,
    SpecialZone,
    ControllerEligible,
}

/// Classify `region` into its [`RegionKind`].
pub fn classify(region: RegionId) -> RegionKind {
    if is_highway(region) {
        RegionKind::Highway
    } else if is_center(region) {
        RegionKind::Center
    } else if is_special_zone(region) {
        RegionKind::SpecialZone
    } else {
        RegionKind::ControllerEligible
    }
}

/// Distance metric for [`region_distance`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum Metric {
    /// Per-axis differences summed; a diagonal step counts as 2.
    #[default]
    Manhattan,
    /// Continuous linear distance; a diagonal step counts as 1.
    Linear,
    /// [`Linear`](Self::Linear) on a world that wraps around after
    /// `world_size` regions along each axis.
    Wrapped { world_size: u32 },
}

/// Distance between two regions, in regions.
///
/// Saturates at `u32::MAX` for ids too far apart to count.
pub fn region_distance(a: RegionId, b: RegionId, metric: Metric) -> u32 {
    let dx = i64::from(a.world_x()).abs_diff(i64::from(b.world_x()));
    let dy = i64::from(a.world_y()).abs_diff(i64::from(b.world_y()));
    let d = match metric {
        Metric::Manhattan => dx + dy,
        Metric::Linear => dx.max(dy),
        Metric::Wrapped { world_size } => {
            let size = u64::from(world_size);
            wrapped(dx, size).max(wrapped(dy, size))
        }
    };
    u32::try_from(d).unwrap_or(u32::MAX)
}

fn wrapped(d: u64, size: u64) -> u64 {
    if size == 0 {
        return d;
    }
    let d = d % size;
    d.min(size - d)
}

/// Compass direction from `from` towards `to`.
///
/// `None` when the positions are equal or in different regions. A move is
/// straight when one axis exceeds twice the other, diagonal otherwise.
pub fn direction(from: Position, to: Position) -> Option<Direction> {
    if from.region != to.region {
        return None;
    }
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    if dx == 0 && dy == 0 {
        return None;
    }
    let (adx, ady) = (dx.abs(), dy.abs());
    let dir = if adx > ady * 2 {
        if dx > 0 { Direction::Right } else { Direction::Left }
    } else if ady > adx * 2 {
        if dy > 0 { Direction::Bottom } else { Direction::Top }
    } else {
        match (dx > 0, dy > 0) {
            (true, true) => Direction::BottomRight,
            (true, false) => Direction::TopRight,
            (false, true) => Direction::BottomLeft,
            (false, false) => Direction::TopLeft,
        }
    };
    Some(dir)
}
