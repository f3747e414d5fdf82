//! # blockstatslib
//!
//! Count block and block-entity types across regions of a chunked voxel
//! world, and render the counts as tables, CSV or plain text.
//!
//! ## Overview
//!
//! The library is a small pipeline:
//!
//! - **World**: a chunked world the counts come from (`world`)
//! - **Data**: region traversal and per-type counting, with one aggregator
//!   per requester (`data`)
//! - **Query**: select and sort what was counted (`query`)
//! - **Output**: a generic table model, its formats and the sinks it is
//!   written to (`output`)
//!
//! ## Features
//!
//! - **Exact partial-chunk scans**: boxes are clipped per chunk, so a box
//!   that cuts through a chunk only counts the positions inside it
//! - **Additive sessions**: repeated scans keep adding to the same counts
//!   until reset
//! - **Four output formats**: bordered ASCII, compact, CSV and simple lines
//! - **Timestamped dumps**: file names never overwrite an earlier dump
//!
//! ## Example
//!
//! ```rust
//! use blockstatslib::{BlockPos, CountTarget, Format, MemoryWorld, SpatialAggregator, TypeKey};
//!
//! let mut world = MemoryWorld::new(0, 63);
//! world.fill(
//!     BlockPos::new(0, 0, 0),
//!     BlockPos::new(3, 0, 3),
//!     &TypeKey::new("minecraft:stone"),
//! );
//! world.set_block(BlockPos::new(1, 1, 1), TypeKey::new("minecraft:dirt"));
//!
//! let mut aggregator = SpatialAggregator::new(CountTarget::Blocks);
//! aggregator.process_box(&world, BlockPos::new(0, 0, 0), BlockPos::new(1, 1, 1));
//!
//! let lines = aggregator.query_all().to_lines(Format::Simple).unwrap();
//! assert_eq!(lines[0], "Block stats:");
//! assert_eq!(lines[2], "minecraft:stone, 4");
//! assert_eq!(lines[3], "minecraft:dirt, 1");
//! assert_eq!(lines[5], "In total there were 5 blocks in 1 chunks");
//! ```

pub mod data;
pub mod error;
pub mod output;
pub mod query;
pub mod world;

pub use data::{CountTarget, Requester, SessionRegistry, SpatialAggregator, TypeCounter, TypeKey};
pub use error::{BlockStatsError, ErrorKind};
pub use output::{Alignment, FileSink, Format, LineSink, Row, TableModel, TracingSink};
pub use query::{QueryItem, ReportOptions, StatsQuerySet, TypeFilter};
pub use world::{BlockPos, ChunkPos, Dimensions, MemoryWorld, World};

/// Result type for blockstatslib operations
pub type Result<T> = std::result::Result<T, BlockStatsError>;
