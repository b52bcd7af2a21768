mod chunk;
mod loaded;
pub mod section;
mod store;

pub use chunk::{Chunk, MIN_Y, SECTION_COUNT};
pub use loaded::LoadedChunk;
pub use section::Section;
pub use store::ChunkStore;
