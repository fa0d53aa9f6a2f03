//! [`EncodedPath`], a tile route stored as a string of direction codes.

use std::fmt;
use std::str::FromStr;

use crate::geom::{Direction, Position, RegionId};
use crate::region::direction;

/// A route as a sequence of compass codes (`'1'..='8'`).
///
/// The empty path is the "no path" result and is cached like any other.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct EncodedPath(String);

impl EncodedPath {
    /// An empty path.
    #[inline]
    pub fn new() -> Self {
        Self(String::new())
    }

    /// Encode `waypoints`, walked in order starting from `start`.
    ///
    /// Consecutive positions without a direction between them (equal, or in
    /// different regions) add nothing. With `stop_at`, encoding ends right
    /// after the first waypoint inside that region.
    pub fn encode(start: Position, waypoints: &[Position], stop_at: Option<RegionId>) -> Self {
        let mut path = Self::new();
        let mut last = start;
        for &pos in waypoints {
            if let Some(dir) = direction(last, pos) {
                path.push(dir);
            }
            last = pos;
            if stop_at == Some(pos.region) {
                break;
            }
        }
        path
    }

    /// Append one step.
    #[inline]
    pub fn push(&mut self, dir: Direction) {
        self.0.push(char::from(b'0' + dir.code()));
    }

    /// Number of steps.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the path has no steps.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The codes as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterate over the steps.
    pub fn directions(&self) -> impl Iterator<Item = Direction> + '_ {
        self.0
            .bytes()
            .filter_map(|b| Direction::from_code(b.wrapping_sub(b'0')))
    }

    /// Positions visited when walking the path from `start`, excluding `start`.
    pub fn decode(&self, start: Position) -> Vec<Position> {
        let mut out = Vec::with_capacity(self.len());
        let mut pos = start;
        for dir in self.directions() {
            pos = pos.step(dir);
            out.push(pos);
        }
        out
    }
}

impl fmt::Display for EncodedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for EncodedPath {
    type Err = ParsePathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some((idx, ch)) = s.char_indices().find(|(_, c)| !matches!(c, '1'..='8')) {
            return Err(ParsePathError { ch, idx });
        }
        Ok(Self(s.to_string()))
    }
}

/// Error returned when an encoded path contains a non-direction character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsePathError {
    pub ch: char,
    pub idx: usize,
}

impl fmt::Display for ParsePathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "encoded path contains invalid code \u{201c}{}\u{201d} at {}",
            self.ch, self.idx
        )
    }
}

impl std::error::Error for ParsePathError {}
