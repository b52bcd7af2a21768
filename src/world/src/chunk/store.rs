use std::collections::HashMap;
use std::sync::Arc;

use super::chunk::Chunk;
use super::loaded::LoadedChunk;
use crate::coord::ChunkPos;

/// Owns every currently-loaded chunk. A chunk is present here exactly
/// while at least one loader wants it.
#[derive(Default)]
pub struct ChunkStore {
    chunks: HashMap<ChunkPos, Arc<LoadedChunk>>,
}

impl ChunkStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, pos: ChunkPos) -> Option<Arc<LoadedChunk>> {
        self.chunks.get(&pos).cloned()
    }

    pub fn contains(&self, pos: ChunkPos) -> bool {
        self.chunks.contains_key(&pos)
    }

    pub fn insert(&mut self, pos: ChunkPos, chunk: Chunk) -> Arc<LoadedChunk> {
        let loaded = Arc::new(LoadedChunk::new(pos, chunk));
        self.chunks.insert(pos, loaded.clone());
        loaded
    }

    /// Drops a chunk, which must have no remaining viewers. Unloading a
    /// chunk that was never loaded is a programmer error.
    pub fn evict(&mut self, pos: ChunkPos) {
        self.chunks
            .remove(&pos)
            .unwrap_or_else(|| panic!("evict of non-existent chunk {pos:?}"));
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn positions(&self) -> impl Iterator<Item = &ChunkPos> {
        self.chunks.keys()
    }
}
