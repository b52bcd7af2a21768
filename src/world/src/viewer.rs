use crate::chunk::Chunk;
use crate::coord::ChunkPos;
use crate::entity::Entity;
use crate::id::EntityId;
use strata_math::{Angle, Vector3f};

/// Clientbound chunk methods the core invokes. A real implementation
/// enqueues onto a client's outbound queue and must never block.
pub trait ChunkViewer {
    fn view_chunk_load(&self, pos: ChunkPos, chunk: &Chunk);
    fn view_chunk_unload(&self, pos: ChunkPos);
    fn send_set_chunk_cache_center(&self, pos: ChunkPos);
}

/// Clientbound entity methods.
pub trait EntityViewer {
    fn view_add_entity(&self, entity: &Entity);
    fn view_add_player(&self, entity: &Entity);
    fn view_remove_entities(&self, ids: &[EntityId]);
    fn view_move_entity_pos(&self, id: EntityId, delta: [i16; 3], on_ground: bool);
    fn view_move_entity_rot(&self, id: EntityId, rot: [i8; 2], on_ground: bool);
    fn view_move_entity_pos_and_rot(&self, id: EntityId, delta: [i16; 3], rot: [i8; 2], on_ground: bool);
    fn view_rotate_head(&self, id: EntityId, yaw: i8);
    fn view_set_entity_motion(&self, id: EntityId, velocity: Vector3f);
    fn view_animate(&self, id: EntityId, animation_id: u8);
}

/// Clientbound player-only methods. Teleport-id allocation is split
/// from the packet send itself: the id must be known the instant a
/// teleport is staged (so `TeleportState::Teleporting` can record it),
/// while the send can and must be deferred until after the world lock
/// is released, so `alloc_teleport_id` is a plain non-blocking counter
/// bump and `send_player_position` takes the id rather than returning one.
pub trait PlayerViewer {
    fn alloc_teleport_id(&self) -> i32;
    fn send_player_position(&self, id: i32, pos: Vector3f, rot: (Angle, Angle));
    fn send_system_chat(&self, message: &str, actionbar: bool);
    fn send_disconnect(&self, reason: &str);
    fn send_set_player_inventory_slot(&self, slot: u8, item: i32);
}

/// The full clientbound interface, implemented once per real transport
/// (`NetworkViewer`, in the `net` crate) and once as a recording test
/// double below.
pub trait Viewer: ChunkViewer + EntityViewer + PlayerViewer + Send + Sync {}

impl<T: ChunkViewer + EntityViewer + PlayerViewer + Send + Sync> Viewer for T {}

/// A test double that records every call instead of performing I/O, so
/// assertions can inspect exactly what was sent and in what order.
#[derive(Debug, Clone, PartialEq)]
pub enum Recorded {
    ChunkLoad(ChunkPos),
    ChunkUnload(ChunkPos),
    SetChunkCacheCenter(ChunkPos),
    AddEntity(EntityId),
    AddPlayer(EntityId),
    RemoveEntities(Vec<EntityId>),
    MoveEntityPos(EntityId, [i16; 3], bool),
    MoveEntityRot(EntityId, [i8; 2], bool),
    MoveEntityPosAndRot(EntityId, [i16; 3], [i8; 2], bool),
    RotateHead(EntityId, i8),
    SetEntityMotion(EntityId),
    Animate(EntityId, u8),
    PlayerPosition,
    SystemChat(String, bool),
    Disconnect(String),
    SetInventorySlot(u8, i32),
}

#[derive(Debug, Default)]
pub struct RecordingViewer {
    pub calls: std::sync::Mutex<Vec<Recorded>>,
    next_teleport_id: std::sync::atomic::AtomicI32,
}

impl RecordingViewer {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, call: Recorded) {
        self.calls.lock().unwrap().push(call);
    }
}

impl ChunkViewer for RecordingViewer {
    fn view_chunk_load(&self, pos: ChunkPos, _chunk: &Chunk) {
        self.push(Recorded::ChunkLoad(pos));
    }

    fn view_chunk_unload(&self, pos: ChunkPos) {
        self.push(Recorded::ChunkUnload(pos));
    }

    fn send_set_chunk_cache_center(&self, pos: ChunkPos) {
        self.push(Recorded::SetChunkCacheCenter(pos));
    }
}

impl EntityViewer for RecordingViewer {
    fn view_add_entity(&self, entity: &Entity) {
        self.push(Recorded::AddEntity(entity.id));
    }

    fn view_add_player(&self, entity: &Entity) {
        self.push(Recorded::AddPlayer(entity.id));
    }

    fn view_remove_entities(&self, ids: &[EntityId]) {
        self.push(Recorded::RemoveEntities(ids.to_vec()));
    }

    fn view_move_entity_pos(&self, id: EntityId, delta: [i16; 3], on_ground: bool) {
        self.push(Recorded::MoveEntityPos(id, delta, on_ground));
    }

    fn view_move_entity_rot(&self, id: EntityId, rot: [i8; 2], on_ground: bool) {
        self.push(Recorded::MoveEntityRot(id, rot, on_ground));
    }

    fn view_move_entity_pos_and_rot(&self, id: EntityId, delta: [i16; 3], rot: [i8; 2], on_ground: bool) {
        self.push(Recorded::MoveEntityPosAndRot(id, delta, rot, on_ground));
    }

    fn view_rotate_head(&self, id: EntityId, yaw: i8) {
        self.push(Recorded::RotateHead(id, yaw));
    }

    fn view_set_entity_motion(&self, id: EntityId, _velocity: Vector3f) {
        self.push(Recorded::SetEntityMotion(id));
    }

    fn view_animate(&self, id: EntityId, animation_id: u8) {
        self.push(Recorded::Animate(id, animation_id));
    }
}

impl PlayerViewer for RecordingViewer {
    fn alloc_teleport_id(&self) -> i32 {
        self.next_teleport_id.fetch_add(1, std::sync::atomic::Ordering::Relaxed)
    }

    fn send_player_position(&self, _id: i32, _pos: Vector3f, _rot: (Angle, Angle)) {
        self.push(Recorded::PlayerPosition);
    }

    fn send_system_chat(&self, message: &str, actionbar: bool) {
        self.push(Recorded::SystemChat(message.to_string(), actionbar));
    }

    fn send_disconnect(&self, reason: &str) {
        self.push(Recorded::Disconnect(reason.to_string()));
    }

    fn send_set_player_inventory_slot(&self, slot: u8, item: i32) {
        self.push(Recorded::SetInventorySlot(slot, item));
    }
}
