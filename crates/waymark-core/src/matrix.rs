//! The [`CostMatrix`] type: per-tile traversal costs for one region.

use std::fmt;

use crate::geom::REGION_SIZE;

/// Cost value marking a tile as impassable.
pub const IMPASSABLE: u8 = 0xFF;

const LEN: usize = (REGION_SIZE * REGION_SIZE) as usize;

/// A `REGION_SIZE`×`REGION_SIZE` grid of tile costs.
///
/// A cost of `0` means "no override": the search engine falls back to its
/// terrain cost for that tile. [`IMPASSABLE`] blocks the tile.
#[derive(Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "Vec<u8>", into = "Vec<u8>"))]
pub struct CostMatrix {
    bits: Vec<u8>,
}

impl CostMatrix {
    /// Create a matrix with every tile set to `cost`.
    pub fn new(cost: u8) -> Self {
        Self {
            bits: vec![cost; LEN],
        }
    }

    #[inline]
    fn index(x: i32, y: i32) -> Option<usize> {
        if x >= 0 && y >= 0 && x < REGION_SIZE && y < REGION_SIZE {
            Some((y * REGION_SIZE + x) as usize)
        } else {
            None
        }
    }

    /// Cost at `(x, y)`. Tiles outside the region read as [`IMPASSABLE`].
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> u8 {
        Self::index(x, y).map_or(IMPASSABLE, |i| self.bits[i])
    }

    /// Set the cost at `(x, y)`. Out-of-range coordinates are ignored.
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, cost: u8) {
        if let Some(i) = Self::index(x, y) {
            self.bits[i] = cost;
        }
    }

    /// Whether `(x, y)` is blocked.
    #[inline]
    pub fn is_impassable(&self, x: i32, y: i32) -> bool {
        self.get(x, y) == IMPASSABLE
    }

    /// Raw row-major costs.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bits
    }
}

impl Default for CostMatrix {
    fn default() -> Self {
        Self::new(0)
    }
}

impl fmt::Debug for CostMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let overrides = self.bits.iter().filter(|c| **c != 0).count();
        f.debug_struct("CostMatrix")
            .field("overrides", &overrides)
            .finish()
    }
}

impl From<CostMatrix> for Vec<u8> {
    fn from(m: CostMatrix) -> Self {
        m.bits
    }
}

impl TryFrom<Vec<u8>> for CostMatrix {
    type Error = MatrixSizeError;

    fn try_from(bits: Vec<u8>) -> Result<Self, Self::Error> {
        if bits.len() == LEN {
            Ok(Self { bits })
        } else {
            Err(MatrixSizeError(bits.len()))
        }
    }
}

/// Error returned when raw bytes do not describe a full region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatrixSizeError(pub usize);

impl fmt::Display for MatrixSizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cost matrix needs {LEN} cells, got {}", self.0)
    }
}

impl std::error::Error for MatrixSizeError {}
