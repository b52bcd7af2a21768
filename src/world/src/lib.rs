//! The world tick engine: chunk storage, per-player chunk loading,
//! player state and teleport handshakes, and entity replication, all
//! coordinated under one coarse tick lock.

pub mod chunk;
pub mod coord;
pub mod entity;
pub mod error;
pub mod id;
pub mod loader;
pub mod player;
pub mod provider;
pub mod rate_limit;
pub mod viewer;
#[allow(clippy::module_inception)]
mod world;

pub use coord::ChunkPos;
pub use error::CommandError;
pub use id::EntityId;
pub use provider::{ChunkLoadResult, ChunkProvider, GeneratedChunkProvider};
pub use world::{face_offset, with_world, FillReport, World, WorldConfig};
