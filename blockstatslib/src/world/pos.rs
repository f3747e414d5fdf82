//! Block and chunk coordinates.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Horizontal size of a chunk in blocks (both X and Z)
pub const CHUNK_SIZE: i32 = 16;

/// Lowest chunk coordinate that holds `i32` block coordinates
pub const MIN_CHUNK_COORD: i32 = i32::MIN.div_euclid(CHUNK_SIZE);

/// Highest chunk coordinate that holds `i32` block coordinates
pub const MAX_CHUNK_COORD: i32 = i32::MAX.div_euclid(CHUNK_SIZE);

/// A block position in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Per-axis minimum of two positions.
    pub fn min(self, other: BlockPos) -> Self {
        Self::new(
            self.x.min(other.x),
            self.y.min(other.y),
            self.z.min(other.z),
        )
    }

    /// Per-axis maximum of two positions.
    pub fn max(self, other: BlockPos) -> Self {
        Self::new(
            self.x.max(other.x),
            self.y.max(other.y),
            self.z.max(other.z),
        )
    }

    /// Offset by the given deltas, saturating at the `i32` range.
    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(
            self.x.saturating_add(dx),
            self.y.saturating_add(dy),
            self.z.saturating_add(dz),
        )
    }

    /// The chunk containing this position.
    pub fn chunk(self) -> ChunkPos {
        ChunkPos::new(
            self.x.div_euclid(CHUNK_SIZE),
            self.z.div_euclid(CHUNK_SIZE),
        )
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}", self.x, self.y, self.z)
    }
}

impl From<[i32; 3]> for BlockPos {
    fn from([x, y, z]: [i32; 3]) -> Self {
        Self::new(x, y, z)
    }
}

/// A chunk position in chunk coordinates (block coordinate / 16).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkPos {
    pub x: i32,
    pub z: i32,
}

impl ChunkPos {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Clamp a chunk coordinate to `MIN_CHUNK_COORD..=MAX_CHUNK_COORD`.
    pub fn clamp_coord(coord: i32) -> i32 {
        coord.clamp(MIN_CHUNK_COORD, MAX_CHUNK_COORD)
    }

    /// Lowest block X coordinate inside this chunk
    pub fn min_block_x(self) -> i32 {
        self.x.saturating_mul(CHUNK_SIZE)
    }

    /// Lowest block Z coordinate inside this chunk
    pub fn min_block_z(self) -> i32 {
        self.z.saturating_mul(CHUNK_SIZE)
    }

    /// Highest block X coordinate inside this chunk
    pub fn max_block_x(self) -> i32 {
        self.min_block_x().saturating_add(CHUNK_SIZE - 1)
    }

    /// Highest block Z coordinate inside this chunk
    pub fn max_block_z(self) -> i32 {
        self.min_block_z().saturating_add(CHUNK_SIZE - 1)
    }
}

impl fmt::Display for ChunkPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.x, self.z)
    }
}
