//! World boundary: where chunks and block types come from.
//!
//! The aggregator only ever talks to a world through the [`World`] trait. It
//! never loads chunks itself; a host that needs unloaded chunks counted loads
//! them first and passes the resulting chunk list in explicitly.
//!
//! [`MemoryWorld`] is a complete in-memory implementation, loadable from a
//! JSON description, grouped by dimension id in [`Dimensions`].

pub mod memory;
pub mod pos;

pub use memory::{Dimensions, MemoryWorld};
pub use pos::{BlockPos, ChunkPos, CHUNK_SIZE, MAX_CHUNK_COORD, MIN_CHUNK_COORD};

use crate::data::key::TypeKey;

/// A chunked voxel world that can be scanned for typed entities.
pub trait World {
    /// Inclusive vertical bounds `(min_y, max_y)` of the world.
    fn height_range(&self) -> (i32, i32);

    /// Loaded chunks overlapping the block box `min..=max` (corners already
    /// normalized). Unloaded chunks are never scanned.
    fn chunks_overlapping(&self, min: BlockPos, max: BlockPos) -> Vec<ChunkPos>;

    /// The countable type at `pos` inside `chunk`, or `None` when nothing
    /// countable is there.
    fn type_at(&self, chunk: ChunkPos, pos: BlockPos) -> Option<&TypeKey>;

    /// Block entities inside `chunk` with their positions.
    fn block_entities(&self, chunk: ChunkPos) -> Vec<(BlockPos, &TypeKey)>;

    /// Every chunk currently resident in memory.
    fn all_loaded_chunks(&self) -> Vec<ChunkPos>;

    /// Every type the world's registry knows about, whether placed or not.
    fn registered_types(&self) -> Vec<TypeKey>;
}
