use std::collections::{HashSet, VecDeque};

use crate::coord::ChunkPos;
use crate::rate_limit::TokenBucket;

/// Per-client chunk admission controller: the desired set of chunks
/// around a player, and the queues that drain it under rate limits.
pub struct Loader {
    pub loaded: HashSet<ChunkPos>,
    pub load_queue: VecDeque<ChunkPos>,
    pub unload_queue: Vec<ChunkPos>,
    pub limiter: TokenBucket,
    pub view_distance: u8,
}

impl Loader {
    pub fn new(view_distance: u8, rate_per_sec: u32) -> Self {
        Self {
            loaded: HashSet::new(),
            load_queue: VecDeque::new(),
            unload_queue: Vec::new(),
            limiter: TokenBucket::new(rate_per_sec),
            view_distance,
        }
    }

    /// Enumerates every chunk within view distance of `center`, nearest
    /// first (ties broken by `(cx, cz)` for determinism), and drops
    /// already-loaded entries.
    pub fn calc_loading_queue(&mut self, center: ChunkPos) {
        let vd = self.view_distance as i32;
        let mut wanted: Vec<ChunkPos> = Vec::new();

        for dx in -vd..=vd {
            for dz in -vd..=vd {
                wanted.push(ChunkPos::new(center.cx + dx, center.cz + dz));
            }
        }

        wanted.sort_by_key(|pos| (pos.distance_squared(&center), pos.cx, pos.cz));

        self.load_queue = wanted
            .into_iter()
            .filter(|pos| !self.loaded.contains(pos))
            .collect();
    }

    /// Computes `loaded \ wanted` for the unload queue.
    pub fn calc_unused_chunks(&mut self, center: ChunkPos) {
        let vd = self.view_distance as i32;

        self.unload_queue = self
            .loaded
            .iter()
            .filter(|pos| pos.chebyshev_distance(&center) > vd)
            .copied()
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loading_queue_is_sorted_nearest_first_and_deterministic() {
        let mut loader = Loader::new(2, 100);
        loader.calc_loading_queue(ChunkPos::new(0, 0));

        assert_eq!(loader.load_queue.front(), Some(&ChunkPos::new(0, 0)));
        let distances: Vec<i64> = loader
            .load_queue
            .iter()
            .map(|p| p.distance_squared(&ChunkPos::new(0, 0)))
            .collect();
        assert!(distances.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn already_loaded_chunks_are_excluded() {
        let mut loader = Loader::new(1, 100);
        loader.loaded.insert(ChunkPos::new(0, 0));
        loader.calc_loading_queue(ChunkPos::new(0, 0));

        assert!(!loader.load_queue.contains(&ChunkPos::new(0, 0)));
    }

    #[test]
    fn unused_chunks_are_those_outside_view_distance() {
        let mut loader = Loader::new(1, 100);
        loader.loaded.insert(ChunkPos::new(0, 0));
        loader.loaded.insert(ChunkPos::new(10, 10));

        loader.calc_unused_chunks(ChunkPos::new(0, 0));
        assert_eq!(loader.unload_queue, vec![ChunkPos::new(10, 10)]);
    }
}
