use crate::chunk::Chunk;
use crate::coord::ChunkPos;

/// Outcome of asking the chunk provider to produce a chunk.
pub enum ChunkLoadResult {
    Found(Chunk),
    NotFound,
    RateLimited,
}

/// A pluggable chunk producer. The real implementation hard-wires a
/// native world generator / persistence layer; this core only depends on
/// this contract.
pub trait ChunkProvider: Send + Sync {
    fn load(&self, pos: ChunkPos) -> ChunkLoadResult;
}

/// A demo/test implementation that fills a flat stone-ish slab near
/// y=64, so the core is runnable without the native generator bridge.
pub struct GeneratedChunkProvider {
    pub surface_state: i32,
    pub surface_y: i32,
}

impl Default for GeneratedChunkProvider {
    fn default() -> Self {
        Self {
            surface_state: 1,
            surface_y: 63,
        }
    }
}

impl ChunkProvider for GeneratedChunkProvider {
    fn load(&self, _pos: ChunkPos) -> ChunkLoadResult {
        let mut chunk = Chunk::new();

        for x in 0..16 {
            for z in 0..16 {
                for y in crate::chunk::MIN_Y..=self.surface_y {
                    chunk.set_block(x, y, z, self.surface_state);
                }
            }
        }

        ChunkLoadResult::Found(chunk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_chunk_is_solid_up_to_surface() {
        let provider = GeneratedChunkProvider::default();
        let chunk = match provider.load(ChunkPos::new(0, 0)) {
            ChunkLoadResult::Found(c) => c,
            _ => panic!("expected Found"),
        };

        assert_eq!(chunk.get_block(0, 0, 0), 1);
        assert_eq!(chunk.get_block(0, 300, 0), 0);
    }
}
