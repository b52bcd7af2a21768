use std::sync::{Arc, Mutex};

use super::chunk::Chunk;
use crate::coord::ChunkPos;
use crate::id::EntityId;
use crate::viewer::Viewer;

struct Inner {
    chunk: Chunk,
    viewers: Vec<(EntityId, Arc<dyn Viewer>)>,
}

/// A loaded chunk: its block data plus the list of clients currently
/// watching it, protected by a single mutex so mutators and broadcasters
/// serialize.
pub struct LoadedChunk {
    pub pos: ChunkPos,
    inner: Mutex<Inner>,
}

impl LoadedChunk {
    pub fn new(pos: ChunkPos, chunk: Chunk) -> Self {
        Self {
            pos,
            inner: Mutex::new(Inner {
                chunk,
                viewers: Vec::new(),
            }),
        }
    }

    pub fn set_block(&self, x: i32, y: i32, z: i32, state: i32) -> i32 {
        self.inner.lock().unwrap().chunk.set_block(x, y, z, state)
    }

    pub fn get_block(&self, x: i32, y: i32, z: i32) -> i32 {
        self.inner.lock().unwrap().chunk.get_block(x, y, z)
    }

    pub fn non_air_count(&self) -> u32 {
        self.inner.lock().unwrap().chunk.non_air_count()
    }

    /// Registers `viewer` under `id`. Adding the same id twice is a
    /// programmer error.
    pub fn add_viewer(&self, id: EntityId, viewer: Arc<dyn Viewer>) {
        let mut inner = self.inner.lock().unwrap();
        if inner.viewers.iter().any(|(existing, _)| *existing == id) {
            panic!("viewer {id} registered twice on chunk {:?}", self.pos);
        }

        viewer.view_chunk_load(self.pos, &inner.chunk);
        inner.viewers.push((id, viewer));
    }

    /// Deregisters `id`. Returns true on success; removing a viewer that
    /// was never registered is a programmer error.
    pub fn remove_viewer(&self, id: EntityId) -> bool {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.viewers.len();
        inner.viewers.retain(|(existing, _)| *existing != id);

        if inner.viewers.len() == before {
            panic!("removal of unregistered viewer {id} on chunk {:?}", self.pos);
        }

        inner.viewers.is_empty()
    }

    pub fn viewer_count(&self) -> usize {
        self.inner.lock().unwrap().viewers.len()
    }

    /// Broadcasts the current chunk state to every viewer. Callers must
    /// not hold the world lock while this runs.
    pub fn update_to_viewers(&self) {
        let inner = self.inner.lock().unwrap();
        for (_, viewer) in &inner.viewers {
            viewer.view_chunk_load(self.pos, &inner.chunk);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewer::RecordingViewer;

    #[test]
    #[should_panic(expected = "registered twice")]
    fn double_viewer_registration_panics() {
        let chunk = LoadedChunk::new(ChunkPos::new(0, 0), Chunk::new());
        let viewer: Arc<dyn Viewer> = Arc::new(RecordingViewer::new());
        chunk.add_viewer(1, viewer.clone());
        chunk.add_viewer(1, viewer);
    }

    #[test]
    #[should_panic(expected = "unregistered viewer")]
    fn removing_unregistered_viewer_panics() {
        let chunk = LoadedChunk::new(ChunkPos::new(0, 0), Chunk::new());
        chunk.remove_viewer(42);
    }

    #[test]
    fn remove_viewer_reports_emptiness() {
        let chunk = LoadedChunk::new(ChunkPos::new(0, 0), Chunk::new());
        let viewer: Arc<dyn Viewer> = Arc::new(RecordingViewer::new());
        chunk.add_viewer(1, viewer);
        assert!(chunk.remove_viewer(1));
    }
}
