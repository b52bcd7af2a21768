use std::sync::atomic::{AtomicI32, Ordering};

/// A process-wide, monotonically increasing entity identifier. Players
/// and [`crate::entity::SimpleEntity`] instances share this id space,
/// handed out from a single atomic counter.
pub type EntityId = i32;

static NEXT_ID: AtomicI32 = AtomicI32::new(1);

pub fn next_entity_id() -> EntityId {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_distinct_and_increasing() {
        let a = next_entity_id();
        let b = next_entity_id();
        assert!(b > a);
    }
}
