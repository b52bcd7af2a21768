use std::sync::atomic::{AtomicI32, Ordering};

use strata_math::{Angle, Vector3f};
use strata_proto::{io, Packet};
use strata_world::chunk::Chunk;
use strata_world::viewer::{ChunkViewer, EntityViewer, PlayerViewer};
use strata_world::{ChunkPos, EntityId};
use strata_world::entity::Entity;

use crate::clientbound as id;

/// The real clientbound transport: every call builds a minimal packet
/// and hands it to the client's bounded outbound queue. A full queue
/// blocks the producer rather than dropping the packet, so this must
/// never be called while holding the world lock.
pub struct NetworkViewer {
    outbound: flume::Sender<Packet>,
    next_teleport_id: AtomicI32,
}

impl NetworkViewer {
    pub fn new(outbound: flume::Sender<Packet>) -> Self {
        Self {
            outbound,
            next_teleport_id: AtomicI32::new(1),
        }
    }

    fn send(&self, packet_id: i32, data: Vec<u8>) {
        if self.outbound.send(Packet::new(packet_id, data)).is_err() {
            tracing::debug!(packet_id, "outbound queue closed; client has disconnected");
        }
    }
}

impl ChunkViewer for NetworkViewer {
    fn view_chunk_load(&self, pos: ChunkPos, chunk: &Chunk) {
        let mut data = Vec::new();
        let _ = io::write_var_int(&mut data, pos.cx);
        let _ = io::write_var_int(&mut data, pos.cz);
        let _ = io::write_var_int(&mut data, chunk.non_air_count() as i32);

        self.send(id::CHUNK_LOAD, data);
    }

    fn view_chunk_unload(&self, pos: ChunkPos) {
        let mut data = Vec::new();
        let _ = io::write_var_int(&mut data, pos.cx);
        let _ = io::write_var_int(&mut data, pos.cz);

        self.send(id::CHUNK_UNLOAD, data);
    }

    fn send_set_chunk_cache_center(&self, pos: ChunkPos) {
        let mut data = Vec::new();
        let _ = io::write_var_int(&mut data, pos.cx);
        let _ = io::write_var_int(&mut data, pos.cz);

        self.send(id::SET_CHUNK_CACHE_CENTER, data);
    }
}

fn encode_entity_header(data: &mut Vec<u8>, entity: &Entity) {
    let _ = io::write_var_int(data, entity.id);
    let _ = io::write_string(data, entity.type_name());
    let _ = io::write_f64(data, entity.pos.x);
    let _ = io::write_f64(data, entity.pos.y);
    let _ = io::write_f64(data, entity.pos.z);
}

impl EntityViewer for NetworkViewer {
    fn view_add_entity(&self, entity: &Entity) {
        let mut data = Vec::new();
        encode_entity_header(&mut data, entity);
        self.send(id::ADD_ENTITY, data);
    }

    fn view_add_player(&self, entity: &Entity) {
        let mut data = Vec::new();
        encode_entity_header(&mut data, entity);
        self.send(id::ADD_PLAYER, data);
    }

    fn view_remove_entities(&self, ids: &[EntityId]) {
        let mut data = Vec::new();
        let _ = io::write_var_int(&mut data, ids.len() as i32);
        for entity_id in ids {
            let _ = io::write_var_int(&mut data, *entity_id);
        }
        self.send(id::REMOVE_ENTITIES, data);
    }

    fn view_move_entity_pos(&self, entity_id: EntityId, delta: [i16; 3], on_ground: bool) {
        let mut data = Vec::new();
        let _ = io::write_var_int(&mut data, entity_id);
        for component in delta {
            let _ = io::write_short(&mut data, component);
        }
        let _ = io::write_bool(&mut data, on_ground);
        self.send(id::MOVE_ENTITY_POS, data);
    }

    fn view_move_entity_rot(&self, entity_id: EntityId, rot: [i8; 2], on_ground: bool) {
        let mut data = Vec::new();
        let _ = io::write_var_int(&mut data, entity_id);
        let _ = io::write_byte(&mut data, rot[0]);
        let _ = io::write_byte(&mut data, rot[1]);
        let _ = io::write_bool(&mut data, on_ground);
        self.send(id::MOVE_ENTITY_ROT, data);
    }

    fn view_move_entity_pos_and_rot(&self, entity_id: EntityId, delta: [i16; 3], rot: [i8; 2], on_ground: bool) {
        let mut data = Vec::new();
        let _ = io::write_var_int(&mut data, entity_id);
        for component in delta {
            let _ = io::write_short(&mut data, component);
        }
        let _ = io::write_byte(&mut data, rot[0]);
        let _ = io::write_byte(&mut data, rot[1]);
        let _ = io::write_bool(&mut data, on_ground);
        self.send(id::MOVE_ENTITY_POS_AND_ROT, data);
    }

    fn view_rotate_head(&self, entity_id: EntityId, yaw: i8) {
        let mut data = Vec::new();
        let _ = io::write_var_int(&mut data, entity_id);
        let _ = io::write_byte(&mut data, yaw);
        self.send(id::ROTATE_HEAD, data);
    }

    fn view_set_entity_motion(&self, entity_id: EntityId, velocity: Vector3f) {
        let mut data = Vec::new();
        let _ = io::write_var_int(&mut data, entity_id);
        let _ = io::write_f64(&mut data, velocity.x);
        let _ = io::write_f64(&mut data, velocity.y);
        let _ = io::write_f64(&mut data, velocity.z);
        self.send(id::SET_ENTITY_MOTION, data);
    }

    fn view_animate(&self, entity_id: EntityId, animation_id: u8) {
        let mut data = Vec::new();
        let _ = io::write_var_int(&mut data, entity_id);
        let _ = io::write_byte(&mut data, animation_id as i8);
        self.send(id::ANIMATE, data);
    }
}

impl PlayerViewer for NetworkViewer {
    fn alloc_teleport_id(&self) -> i32 {
        self.next_teleport_id.fetch_add(1, Ordering::Relaxed)
    }

    fn send_player_position(&self, teleport_id: i32, pos: Vector3f, rot: (Angle, Angle)) {
        let mut data = Vec::new();
        let _ = io::write_f64(&mut data, pos.x);
        let _ = io::write_f64(&mut data, pos.y);
        let _ = io::write_f64(&mut data, pos.z);
        let _ = io::write_f32(&mut data, rot.0.degrees());
        let _ = io::write_f32(&mut data, rot.1.degrees());
        let _ = io::write_var_int(&mut data, teleport_id);

        self.send(id::PLAYER_POSITION, data);
    }

    fn send_system_chat(&self, message: &str, actionbar: bool) {
        let mut data = Vec::new();
        let _ = io::write_string(&mut data, message);
        let _ = io::write_bool(&mut data, actionbar);
        self.send(id::SYSTEM_CHAT, data);
    }

    fn send_disconnect(&self, reason: &str) {
        let mut data = Vec::new();
        let _ = io::write_string(&mut data, reason);
        self.send(id::DISCONNECT, data);
    }

    fn send_set_player_inventory_slot(&self, slot: u8, item: i32) {
        let mut data = Vec::new();
        let _ = io::write_byte(&mut data, slot as i8);
        let _ = io::write_var_int(&mut data, item);
        self.send(id::SET_PLAYER_INVENTORY_SLOT, data);
    }
}
