//! Region traversal that feeds a [`TypeCounter`].
//!
//! Every `process_*` call adds to the counts already held; scanning the same
//! region twice counts it twice. Call [`SpatialAggregator::reset`] to start
//! over.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::query::options::TypeFilter;
use crate::query::queryset::StatsQuerySet;
use crate::world::{BlockPos, ChunkPos, World};

use super::counter::TypeCounter;

/// What an aggregator counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CountTarget {
    /// Block types at every position
    #[default]
    Blocks,
    /// Block entities by type
    BlockEntities,
}

/// Inclusive block volume, already clipped to one chunk.
#[derive(Debug, Clone, Copy)]
struct Volume {
    min: BlockPos,
    max: BlockPos,
}

impl Volume {
    fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    fn contains(&self, pos: BlockPos) -> bool {
        pos.x >= self.min.x
            && pos.x <= self.max.x
            && pos.y >= self.min.y
            && pos.y <= self.max.y
            && pos.z >= self.min.z
            && pos.z <= self.max.z
    }

    /// The whole of `chunk` between the world's vertical bounds.
    fn whole_chunk(chunk: ChunkPos, (min_y, max_y): (i32, i32)) -> Self {
        Self {
            min: BlockPos::new(chunk.min_block_x(), min_y, chunk.min_block_z()),
            max: BlockPos::new(chunk.max_block_x(), max_y, chunk.max_block_z()),
        }
    }

    /// Intersection of the box `min..=max` with `chunk` and the vertical bounds.
    fn clipped(chunk: ChunkPos, min: BlockPos, max: BlockPos, (min_y, max_y): (i32, i32)) -> Self {
        Self {
            min: BlockPos::new(
                min.x.max(chunk.min_block_x()),
                min.y.max(min_y),
                min.z.max(chunk.min_block_z()),
            ),
            max: BlockPos::new(
                max.x.min(chunk.max_block_x()),
                max.y.min(max_y),
                max.z.min(chunk.max_block_z()),
            ),
        }
    }
}

/// Counts typed entities over caller-specified regions of a world.
#[derive(Debug, Clone, Default)]
pub struct SpatialAggregator {
    target: CountTarget,
    counter: TypeCounter,
}

impl SpatialAggregator {
    /// Create an empty aggregator for `target`.
    pub fn new(target: CountTarget) -> Self {
        Self {
            target,
            counter: TypeCounter::new(),
        }
    }

    pub fn target(&self) -> CountTarget {
        self.target
    }

    /// The accumulated counts.
    pub fn counter(&self) -> &TypeCounter {
        &self.counter
    }

    /// Drop everything counted so far.
    pub fn reset(&mut self) {
        self.counter.clear();
    }

    /// Count everything inside each listed chunk, in order.
    pub fn process_region<W: World + ?Sized>(&mut self, world: &W, chunks: &[ChunkPos]) {
        let height = world.height_range();
        let before = self.counter.total();

        for &chunk in chunks {
            let contributed = self.count_volume(world, chunk, Volume::whole_chunk(chunk, height));
            self.counter.record_chunk(contributed);
        }

        debug!(
            target_kind = ?self.target,
            chunks = chunks.len(),
            counted = self.counter.total() - before,
            "processed chunk list"
        );
    }

    /// Count exactly the positions inside the box spanned by two corners,
    /// given in any order.
    pub fn process_box<W: World + ?Sized>(&mut self, world: &W, pos1: BlockPos, pos2: BlockPos) {
        let (min, max) = (pos1.min(pos2), pos1.max(pos2));
        let height = world.height_range();
        let chunks = world.chunks_overlapping(min, max);
        let before = self.counter.total();

        for &chunk in &chunks {
            let volume = Volume::clipped(chunk, min, max, height);
            let contributed = self.count_volume(world, chunk, volume);
            self.counter.record_chunk(contributed);
        }

        debug!(
            target_kind = ?self.target,
            min = %min,
            max = %max,
            chunks = chunks.len(),
            counted = self.counter.total() - before,
            "processed box"
        );
    }

    /// Count the box reaching `|rx|`, `|ry|`, `|rz|` blocks out from `center`.
    pub fn process_radius<W: World + ?Sized>(
        &mut self,
        world: &W,
        center: BlockPos,
        rx: i32,
        ry: i32,
        rz: i32,
    ) {
        let (rx, ry, rz) = (rx.saturating_abs(), ry.saturating_abs(), rz.saturating_abs());
        let min = center.offset(-rx, -ry, -rz);
        let max = center.offset(rx, ry, rz);
        self.process_box(world, min, max);
    }

    /// Count every chunk the world currently has loaded.
    pub fn process_all_loaded<W: World + ?Sized>(&mut self, world: &W) {
        let chunks = world.all_loaded_chunks();
        self.process_region(world, &chunks);
    }

    /// Counted types matching `filter`, without the summary footer.
    pub fn query(&self, filter: &TypeFilter) -> StatsQuerySet {
        StatsQuerySet::filtered(&self.counter, self.target, filter)
    }

    /// Every counted type plus a summary footer.
    pub fn query_all(&self) -> StatsQuerySet {
        StatsQuerySet::all(&self.counter, self.target)
    }

    fn count_volume<W: World + ?Sized>(
        &mut self,
        world: &W,
        chunk: ChunkPos,
        volume: Volume,
    ) -> u64 {
        if volume.is_empty() {
            return 0;
        }

        let mut contributed = 0;
        match self.target {
            CountTarget::Blocks => {
                for x in volume.min.x..=volume.max.x {
                    for z in volume.min.z..=volume.max.z {
                        for y in volume.min.y..=volume.max.y {
                            if let Some(key) = world.type_at(chunk, BlockPos::new(x, y, z)) {
                                self.counter.add(key, 1);
                                contributed += 1;
                            }
                        }
                    }
                }
            }
            CountTarget::BlockEntities => {
                for (pos, key) in world.block_entities(chunk) {
                    if volume.contains(pos) {
                        self.counter.add(key, 1);
                        contributed += 1;
                    }
                }
            }
        }
        contributed
    }
}
