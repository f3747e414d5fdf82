//! In-memory world storage and its JSON description.
//!
//! A world file lists dimensions. Each dimension places blocks with `fills`
//! (inclusive boxes) and single `blocks`, adds `block_entities`, and may list
//! extra empty `chunks` and `unloaded_chunks`:
//!
//! ```json
//! {
//!   "dimensions": [{
//!     "id": 0, "min_y": 0, "max_y": 255, "spawn": [0, 64, 0],
//!     "fills": [{ "from": [0, 0, 0], "to": [15, 3, 15], "block": "minecraft:stone" }],
//!     "blocks": [{ "pos": [1, 4, 1], "block": "minecraft:chest" }],
//!     "block_entities": [{ "pos": [1, 4, 1], "type": "minecraft:chest" }],
//!     "unloaded_chunks": [[4, 4]]
//!   }]
//! }
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

use serde::Deserialize;

use crate::data::key::TypeKey;
use crate::error::BlockStatsError;
use crate::Result;

use super::pos::{BlockPos, ChunkPos};
use super::World;

/// Contents of one chunk.
#[derive(Debug, Clone, Default)]
struct MemoryChunk {
    loaded: bool,
    blocks: HashMap<BlockPos, TypeKey>,
    block_entities: BTreeMap<BlockPos, TypeKey>,
}

/// A world held entirely in memory.
///
/// Chunks exist once something is placed in them (or they are created
/// explicitly); positions without a block hold nothing countable.
#[derive(Debug, Clone)]
pub struct MemoryWorld {
    min_y: i32,
    max_y: i32,
    spawn: BlockPos,
    chunks: BTreeMap<ChunkPos, MemoryChunk>,
    registry: BTreeSet<TypeKey>,
}

impl Default for MemoryWorld {
    fn default() -> Self {
        Self::new(0, 255)
    }
}

impl MemoryWorld {
    /// Create an empty world with the inclusive vertical bounds `min_y..=max_y`.
    pub fn new(min_y: i32, max_y: i32) -> Self {
        Self {
            min_y: min_y.min(max_y),
            max_y: min_y.max(max_y),
            spawn: BlockPos::new(0, min_y.max(0).min(max_y), 0),
            chunks: BTreeMap::new(),
            registry: BTreeSet::new(),
        }
    }

    /// Builder: set the spawn point.
    pub fn with_spawn(mut self, spawn: BlockPos) -> Self {
        self.spawn = spawn;
        self
    }

    /// Default center for scans when the requester has no position.
    pub fn spawn(&self) -> BlockPos {
        self.spawn
    }

    /// Register a type without placing it.
    pub fn register(&mut self, key: TypeKey) {
        self.registry.insert(key);
    }

    /// Create an empty, loaded chunk if it does not exist yet.
    pub fn create_chunk(&mut self, chunk: ChunkPos) {
        self.chunk_mut(chunk);
    }

    /// Place a block. Positions outside the vertical bounds are ignored.
    pub fn set_block(&mut self, pos: BlockPos, key: TypeKey) -> bool {
        if pos.y < self.min_y || pos.y > self.max_y {
            return false;
        }
        self.registry.insert(key.clone());
        self.chunk_mut(pos.chunk()).blocks.insert(pos, key);
        true
    }

    /// Fill the inclusive box between two corners, returning the number of
    /// blocks placed.
    pub fn fill(&mut self, from: BlockPos, to: BlockPos, key: &TypeKey) -> u64 {
        let (min, max) = (from.min(to), from.max(to));
        let (y0, y1) = (min.y.max(self.min_y), max.y.min(self.max_y));
        let mut placed = 0;
        for x in min.x..=max.x {
            for z in min.z..=max.z {
                for y in y0..=y1 {
                    self.set_block(BlockPos::new(x, y, z), key.clone());
                    placed += 1;
                }
            }
        }
        placed
    }

    /// Add a block entity at `pos`, replacing any previous one there.
    pub fn add_block_entity(&mut self, pos: BlockPos, key: TypeKey) {
        self.registry.insert(key.clone());
        self.chunk_mut(pos.chunk()).block_entities.insert(pos, key);
    }

    /// Mark an existing chunk as loaded or unloaded.
    pub fn set_loaded(&mut self, chunk: ChunkPos, loaded: bool) {
        if let Some(c) = self.chunks.get_mut(&chunk) {
            c.loaded = loaded;
        }
    }

    /// Whether a chunk exists and is loaded.
    pub fn is_loaded(&self, chunk: ChunkPos) -> bool {
        self.chunks.get(&chunk).is_some_and(|c| c.loaded)
    }

    /// Load (creating empty ones where missing) every chunk within `radius`
    /// chunks of `center`, returning them in X-major order.
    ///
    /// The square is clipped to chunks whose blocks have `i32` coordinates.
    pub fn load_chunks_around(&mut self, center: ChunkPos, radius: u32) -> Vec<ChunkPos> {
        let r = i32::try_from(radius).unwrap_or(i32::MAX);
        let xs = ChunkPos::clamp_coord(center.x.saturating_sub(r))
            ..=ChunkPos::clamp_coord(center.x.saturating_add(r));
        let zs = ChunkPos::clamp_coord(center.z.saturating_sub(r))
            ..=ChunkPos::clamp_coord(center.z.saturating_add(r));
        let mut loaded = Vec::new();
        for x in xs {
            for z in zs.clone() {
                let chunk = ChunkPos::new(x, z);
                self.chunk_mut(chunk).loaded = true;
                loaded.push(chunk);
            }
        }
        loaded
    }

    fn chunk_mut(&mut self, chunk: ChunkPos) -> &mut MemoryChunk {
        self.chunks.entry(chunk).or_insert_with(|| MemoryChunk {
            loaded: true,
            ..MemoryChunk::default()
        })
    }
}

impl World for MemoryWorld {
    fn height_range(&self) -> (i32, i32) {
        (self.min_y, self.max_y)
    }

    fn chunks_overlapping(&self, min: BlockPos, max: BlockPos) -> Vec<ChunkPos> {
        let (lo, hi) = (min.chunk(), max.chunk());
        self.chunks
            .iter()
            .filter(|(c, chunk)| {
                chunk.loaded && c.x >= lo.x && c.x <= hi.x && c.z >= lo.z && c.z <= hi.z
            })
            .map(|(c, _)| *c)
            .collect()
    }

    fn type_at(&self, chunk: ChunkPos, pos: BlockPos) -> Option<&TypeKey> {
        self.chunks.get(&chunk)?.blocks.get(&pos)
    }

    fn block_entities(&self, chunk: ChunkPos) -> Vec<(BlockPos, &TypeKey)> {
        self.chunks
            .get(&chunk)
            .map(|c| c.block_entities.iter().map(|(p, k)| (*p, k)).collect())
            .unwrap_or_default()
    }

    fn all_loaded_chunks(&self) -> Vec<ChunkPos> {
        self.chunks
            .iter()
            .filter(|(_, c)| c.loaded)
            .map(|(pos, _)| *pos)
            .collect()
    }

    fn registered_types(&self) -> Vec<TypeKey> {
        self.registry.iter().cloned().collect()
    }
}

/// Worlds keyed by dimension id.
#[derive(Debug, Clone, Default)]
pub struct Dimensions {
    worlds: BTreeMap<i32, MemoryWorld>,
}

impl Dimensions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the world for a dimension.
    pub fn insert(&mut self, id: i32, world: MemoryWorld) {
        self.worlds.insert(id, world);
    }

    /// Dimension ids in ascending order.
    pub fn ids(&self) -> Vec<i32> {
        self.worlds.keys().copied().collect()
    }

    /// Resolve a dimension for scanning.
    pub fn resolve(&self, id: i32) -> Result<&MemoryWorld> {
        self.worlds
            .get(&id)
            .ok_or(BlockStatsError::DimensionNotFound(id))
    }

    /// Resolve a dimension for loading chunks.
    pub fn resolve_mut(&mut self, id: i32) -> Result<&mut MemoryWorld> {
        self.worlds
            .get_mut(&id)
            .ok_or(BlockStatsError::DimensionNotFound(id))
    }

    /// Build dimensions from a JSON world description.
    pub fn from_json(json: &str) -> Result<Self> {
        let file: WorldFile =
            serde_json::from_str(json).map_err(|e| BlockStatsError::WorldParse(e.to_string()))?;

        let mut dimensions = Dimensions::new();
        for dim in file.dimensions {
            let id = dim.id;
            if dimensions.worlds.contains_key(&id) {
                return Err(BlockStatsError::WorldParse(format!(
                    "dimension {} is defined more than once",
                    id
                )));
            }
            dimensions.insert(id, dim.build());
        }
        Ok(dimensions)
    }

    /// Read and parse a JSON world file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| BlockStatsError::WorldRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }
}

#[derive(Debug, Deserialize)]
struct WorldFile {
    dimensions: Vec<DimensionFile>,
}

#[derive(Debug, Deserialize)]
struct DimensionFile {
    id: i32,
    #[serde(default)]
    min_y: i32,
    #[serde(default = "default_max_y")]
    max_y: i32,
    #[serde(default)]
    spawn: Option<[i32; 3]>,
    #[serde(default)]
    registry: Vec<TypeKey>,
    #[serde(default)]
    chunks: Vec<[i32; 2]>,
    #[serde(default)]
    fills: Vec<FillEntry>,
    #[serde(default)]
    blocks: Vec<BlockEntry>,
    #[serde(default)]
    block_entities: Vec<BlockEntityEntry>,
    #[serde(default)]
    unloaded_chunks: Vec<[i32; 2]>,
}

fn default_max_y() -> i32 {
    255
}

#[derive(Debug, Deserialize)]
struct FillEntry {
    from: [i32; 3],
    to: [i32; 3],
    block: TypeKey,
}

#[derive(Debug, Deserialize)]
struct BlockEntry {
    pos: [i32; 3],
    block: TypeKey,
}

#[derive(Debug, Deserialize)]
struct BlockEntityEntry {
    pos: [i32; 3],
    #[serde(rename = "type")]
    kind: TypeKey,
}

impl DimensionFile {
    fn build(self) -> MemoryWorld {
        let mut world = MemoryWorld::new(self.min_y, self.max_y);
        if let Some(spawn) = self.spawn {
            world = world.with_spawn(spawn.into());
        }
        for key in self.registry {
            world.register(key);
        }
        for [x, z] in self.chunks {
            world.create_chunk(ChunkPos::new(x, z));
        }
        for fill in self.fills {
            world.fill(fill.from.into(), fill.to.into(), &fill.block);
        }
        for block in self.blocks {
            world.set_block(block.pos.into(), block.block);
        }
        for entity in self.block_entities {
            world.add_block_entity(entity.pos.into(), entity.kind);
        }
        for [x, z] in self.unloaded_chunks {
            world.set_loaded(ChunkPos::new(x, z), false);
        }
        world
    }
}
