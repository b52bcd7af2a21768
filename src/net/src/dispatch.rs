use std::sync::{Arc, Mutex};

use strata_proto::Packet;
use strata_world::{ChunkProvider, EntityId, World};

use crate::error::SessionError;
use crate::handlers;
use crate::serverbound;

/// Everything a handler needs to act on behalf of one connected client.
pub struct SessionContext<P: ChunkProvider> {
    pub world: Arc<Mutex<World<P>>>,
    pub entity_id: EntityId,
}

pub type HandlerFn<P> = fn(&Packet, &SessionContext<P>) -> Result<(), SessionError>;

/// A fixed-size, array-indexed table: dispatch is `table[id]`, not an
/// open registry, so an unmapped id is a lookup miss rather than a
/// silently-ignored unknown handler.
pub struct Dispatch<P: ChunkProvider> {
    table: Vec<Option<HandlerFn<P>>>,
}

impl<P: ChunkProvider> Dispatch<P> {
    pub fn dispatch(&self, packet: &Packet, ctx: &SessionContext<P>) -> Result<(), SessionError> {
        let slot = usize::try_from(packet.id).ok().and_then(|i| self.table.get(i));

        match slot {
            Some(Some(handler)) => handler(packet, ctx),
            Some(None) | None => Err(SessionError::IdOutOfRange(packet.id)),
        }
    }
}

pub fn build_default_dispatch<P: ChunkProvider + 'static>() -> Dispatch<P> {
    let mut table: Vec<Option<HandlerFn<P>>> = vec![None; serverbound::COUNT];

    table[serverbound::ACCEPT_TELEPORTATION as usize] = Some(handlers::accept_teleportation::<P>);
    table[serverbound::CLIENT_INFORMATION as usize] = Some(handlers::client_information::<P>);
    table[serverbound::MOVE_PLAYER_POS as usize] = Some(handlers::move_player_pos::<P>);
    table[serverbound::MOVE_PLAYER_POS_ROT as usize] = Some(handlers::move_player_pos_rot::<P>);
    table[serverbound::MOVE_PLAYER_ROT as usize] = Some(handlers::move_player_rot::<P>);
    table[serverbound::MOVE_PLAYER_STATUS_ONLY as usize] = Some(handlers::move_player_status_only::<P>);
    table[serverbound::SWING as usize] = Some(handlers::swing::<P>);
    table[serverbound::USE_ITEM_ON as usize] = Some(handlers::use_item_on::<P>);
    table[serverbound::PLAYER_ACTION as usize] = Some(handlers::player_action::<P>);
    table[serverbound::SET_CARRIED_ITEM as usize] = Some(handlers::set_carried_item::<P>);
    table[serverbound::SET_CREATIVE_MODE_SLOT as usize] = Some(handlers::set_creative_mode_slot::<P>);
    table[serverbound::MOVE_VEHICLE as usize] = Some(handlers::move_vehicle::<P>);
    table[serverbound::CHAT_COMMAND as usize] = Some(handlers::chat_command::<P>);

    Dispatch { table }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_world::GeneratedChunkProvider;

    #[test]
    fn unmapped_id_is_a_lookup_miss() {
        let dispatch = build_default_dispatch::<GeneratedChunkProvider>();
        let world = Arc::new(Mutex::new(World::new(
            GeneratedChunkProvider::default(),
            strata_world::WorldConfig {
                view_distance: 8,
                spawn_position: strata_math::Vector3f::new(0.0, 64.0, 0.0),
                spawn_angle: 0.0,
                tick_rate_hz: 20,
                global_chunk_load_rate: 100,
                player_chunk_load_rate: 20,
            },
        )));
        let ctx = SessionContext { world, entity_id: 1 };
        let packet = Packet::new(999, Vec::new());

        assert!(matches!(dispatch.dispatch(&packet, &ctx), Err(SessionError::IdOutOfRange(999))));
    }
}
