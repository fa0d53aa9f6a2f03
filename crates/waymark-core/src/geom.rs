//! Geometry primitives: [`RegionId`], [`Position`] and [`Direction`].
//!
//! The world is an unbounded plane of square regions, each [`REGION_SIZE`]
//! tiles wide. Regions are named by a two-axis signed id such as `W3N7`:
//! `W`/`E` select the sign of the horizontal axis and `N`/`S` the sign of the
//! vertical one. Y grows south.

use std::fmt;
use std::str::FromStr;

/// Width and height of a region, in tiles.
pub const REGION_SIZE: i32 = 50;

/// Largest axis magnitude accepted when parsing a region id.
///
/// Keeps world tile coordinates of parsed ids well inside `i32`.
pub const MAX_REGION_MAGNITUDE: u32 = (1 << 20) - 1;

// ---------------------------------------------------------------------------
// RegionId
// ---------------------------------------------------------------------------

/// Sign of one axis of a [`RegionId`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Sign {
    /// `W` on the horizontal axis, `N` on the vertical one.
    Negative,
    /// `E` on the horizontal axis, `S` on the vertical one.
    Positive,
}

/// Identifier of a region.
///
/// Stored as world region coordinates: `W<n>` maps to `-n - 1`, `E<n>` to
/// `n`, `N<m>` to `-m - 1` and `S<m>` to `m`. This makes `W0` and `E0`
/// neighbours, as are `N0` and `S0`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionId {
    x: i32,
    y: i32,
}

impl RegionId {
    /// Create a region id from world region coordinates.
    #[inline]
    pub const fn from_world(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Create a region id from its signed axes, e.g. `(Positive, 5, Negative, 3)` for `E5N3`.
    #[inline]
    pub const fn from_axes(x_sign: Sign, x_mag: u32, y_sign: Sign, y_mag: u32) -> Self {
        Self {
            x: axis_to_world(x_sign, x_mag),
            y: axis_to_world(y_sign, y_mag),
        }
    }

    /// World region x coordinate.
    #[inline]
    pub const fn world_x(self) -> i32 {
        self.x
    }

    /// World region y coordinate.
    #[inline]
    pub const fn world_y(self) -> i32 {
        self.y
    }

    /// Sign and magnitude of the horizontal axis.
    #[inline]
    pub const fn x_axis(self) -> (Sign, u32) {
        world_to_axis(self.x)
    }

    /// Sign and magnitude of the vertical axis.
    #[inline]
    pub const fn y_axis(self) -> (Sign, u32) {
        world_to_axis(self.y)
    }

    /// The region shifted by whole regions.
    #[inline]
    pub const fn shift(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// The adjacent region in direction `dir`.
    #[inline]
    pub const fn neighbor(self, dir: Direction) -> Self {
        let (dx, dy) = dir.delta();
        self.shift(dx, dy)
    }

    /// The four cardinal neighbours (north, east, south, west).
    #[inline]
    pub const fn neighbors(self) -> [RegionId; 4] {
        [
            self.shift(0, -1),
            self.shift(1, 0),
            self.shift(0, 1),
            self.shift(-1, 0),
        ]
    }
}

const fn axis_to_world(sign: Sign, mag: u32) -> i32 {
    match sign {
        Sign::Negative => -(mag as i32) - 1,
        Sign::Positive => mag as i32,
    }
}

const fn world_to_axis(v: i32) -> (Sign, u32) {
    if v < 0 {
        (Sign::Negative, (-(v + 1)) as u32)
    } else {
        (Sign::Positive, v as u32)
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (xs, xm) = self.x_axis();
        let (ys, ym) = self.y_axis();
        let h = if xs == Sign::Negative { 'W' } else { 'E' };
        let v = if ys == Sign::Negative { 'N' } else { 'S' };
        write!(f, "{h}{xm}{v}{ym}")
    }
}

impl FromStr for RegionId {
    type Err = ParseRegionError;

    /// Parse `[WE]<digits>[NS]<digits>`, each magnitude at most
    /// [`MAX_REGION_MAGNITUDE`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseRegionError(s.to_string());
        let x_sign = match s.chars().next() {
            Some('W') => Sign::Negative,
            Some('E') => Sign::Positive,
            _ => return Err(err()),
        };
        let rest = &s[1..];
        let split = rest.find(['N', 'S']).ok_or_else(err)?;
        let (x_digits, tail) = rest.split_at(split);
        let y_sign = if tail.starts_with('N') {
            Sign::Negative
        } else {
            Sign::Positive
        };
        let y_digits = &tail[1..];
        let x_mag = parse_magnitude(x_digits).ok_or_else(err)?;
        let y_mag = parse_magnitude(y_digits).ok_or_else(err)?;
        Ok(Self::from_axes(x_sign, x_mag, y_sign, y_mag))
    }
}

fn parse_magnitude(digits: &str) -> Option<u32> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let v: u32 = digits.parse().ok()?;
    (v <= MAX_REGION_MAGNITUDE).then_some(v)
}

/// Error returned when a region id string is malformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRegionError(pub String);

impl fmt::Display for ParseRegionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed region id \u{201c}{}\u{201d}", self.0)
    }
}

impl std::error::Error for ParseRegionError {}

#[cfg(feature = "serde")]
impl serde::Serialize for RegionId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for RegionId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A tile inside a region. `x` and `y` are local coordinates in
/// `0..REGION_SIZE`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub region: RegionId,
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Create a new position.
    #[inline]
    pub const fn new(region: RegionId, x: i32, y: i32) -> Self {
        Self { region, x, y }
    }

    /// Build a position from absolute world tile coordinates.
    #[inline]
    pub const fn from_world(wx: i32, wy: i32) -> Self {
        Self {
            region: RegionId::from_world(wx.div_euclid(REGION_SIZE), wy.div_euclid(REGION_SIZE)),
            x: wx.rem_euclid(REGION_SIZE),
            y: wy.rem_euclid(REGION_SIZE),
        }
    }

    /// Absolute world tile coordinates.
    #[inline]
    pub const fn to_world(self) -> (i32, i32) {
        (
            self.region.x * REGION_SIZE + self.x,
            self.region.y * REGION_SIZE + self.y,
        )
    }

    /// Whether the local coordinates lie inside the region grid.
    #[inline]
    pub const fn is_valid(self) -> bool {
        self.x >= 0 && self.x < REGION_SIZE && self.y >= 0 && self.y < REGION_SIZE
    }

    /// Whether the tile is on the outer ring of its region.
    #[inline]
    pub const fn is_border(self) -> bool {
        self.x == 0 || self.y == 0 || self.x == REGION_SIZE - 1 || self.y == REGION_SIZE - 1
    }

    /// Move one tile in `dir`.
    ///
    /// A step that lands on a border tile while heading out of the region
    /// continues onto the mirrored border tile of the adjacent region, the
    /// way agents are carried across region exits.
    pub fn step(self, dir: Direction) -> Self {
        let (dx, dy) = dir.delta();
        let (wx, wy) = self.to_world();
        let mut next = Self::from_world(wx + dx, wy + dy);
        let last = REGION_SIZE - 1;
        if (next.x == last && dx > 0) || (next.x == 0 && dx < 0) {
            next = Self::from_world(wx + 2 * dx, next.to_world().1);
        }
        if (next.y == last && dy > 0) || (next.y == 0 && dy < 0) {
            let (nx, ny) = next.to_world();
            next = Self::from_world(nx, ny + dy);
        }
        next
    }
}

impl fmt::Display for Position {
    /// Cache-key form, e.g. `E5S5x10y20`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}y{}", self.region, self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// One of the eight compass directions. The discriminant is the code used in
/// encoded paths.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Direction {
    Top = 1,
    TopRight = 2,
    Right = 3,
    BottomRight = 4,
    Bottom = 5,
    BottomLeft = 6,
    Left = 7,
    TopLeft = 8,
}

impl Direction {
    /// All directions in code order.
    pub const ALL: [Direction; 8] = [
        Direction::Top,
        Direction::TopRight,
        Direction::Right,
        Direction::BottomRight,
        Direction::Bottom,
        Direction::BottomLeft,
        Direction::Left,
        Direction::TopLeft,
    ];

    /// Numeric code, `1..=8`.
    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Direction for a numeric code.
    #[inline]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            1..=8 => Some(Self::ALL[(code - 1) as usize]),
            _ => None,
        }
    }

    /// Unit step `(dx, dy)`.
    #[inline]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::Top => (0, -1),
            Self::TopRight => (1, -1),
            Self::Right => (1, 0),
            Self::BottomRight => (1, 1),
            Self::Bottom => (0, 1),
            Self::BottomLeft => (-1, 1),
            Self::Left => (-1, 0),
            Self::TopLeft => (-1, -1),
        }
    }

    /// The direction pointing the other way.
    #[inline]
    pub const fn reverse(self) -> Self {
        Self::ALL[((self.code() + 3) % 8) as usize]
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
