use strata_math::{Angle, Vector3f};
use strata_proto::packet::Scan;
use strata_proto::Packet;
use strata_world::{with_world, ChunkProvider};

use crate::commands;
use crate::dispatch::SessionContext;
use crate::error::SessionError;

const SWING_MAIN_HAND: i32 = 0;
const ANIMATION_SWING_MAIN_ARM: u8 = 0;
const ANIMATION_SWING_OFF_HAND: u8 = 3;

const FINISH_DIGGING: i32 = 2;

/// Placeholder block state `UseItemOn` places, since the item/block
/// registry that would resolve a held item to a state is out of scope.
const PLACEHOLDER_PLACED_STATE: i32 = 1;

pub fn accept_teleportation<P: ChunkProvider>(packet: &Packet, ctx: &SessionContext<P>) -> Result<(), SessionError> {
    let mut scan = Scan::new(packet);
    let teleport_id = scan.var_int()?;

    with_world(&ctx.world, |world| {
        world.write_inputs(ctx.entity_id, |inputs| inputs.teleport_id_ack = Some(teleport_id));
    });

    Ok(())
}

pub fn client_information<P: ChunkProvider>(packet: &Packet, ctx: &SessionContext<P>) -> Result<(), SessionError> {
    let mut scan = Scan::new(packet);
    let _locale = scan.string()?;
    let view_distance = scan.byte()?.clamp(2, 32) as u8;

    with_world(&ctx.world, |world| {
        world.write_inputs(ctx.entity_id, |inputs| inputs.view_distance = view_distance);
    });

    Ok(())
}

pub fn move_player_pos<P: ChunkProvider>(packet: &Packet, ctx: &SessionContext<P>) -> Result<(), SessionError> {
    let mut scan = Scan::new(packet);
    let pos = Vector3f::new(scan.f64()?, scan.f64()?, scan.f64()?);
    let on_ground = scan.bool()?;

    with_world(&ctx.world, |world| {
        world.write_inputs(ctx.entity_id, |inputs| {
            inputs.pos = pos;
            inputs.on_ground = on_ground;
        });
    });

    Ok(())
}

pub fn move_player_pos_rot<P: ChunkProvider>(packet: &Packet, ctx: &SessionContext<P>) -> Result<(), SessionError> {
    let mut scan = Scan::new(packet);
    let pos = Vector3f::new(scan.f64()?, scan.f64()?, scan.f64()?);
    let rot = (Angle::new(scan.f32()?), Angle::new(scan.f32()?));
    let on_ground = scan.bool()?;

    with_world(&ctx.world, |world| {
        world.write_inputs(ctx.entity_id, |inputs| {
            inputs.pos = pos;
            inputs.rot = rot;
            inputs.on_ground = on_ground;
        });
    });

    Ok(())
}

pub fn move_player_rot<P: ChunkProvider>(packet: &Packet, ctx: &SessionContext<P>) -> Result<(), SessionError> {
    let mut scan = Scan::new(packet);
    let rot = (Angle::new(scan.f32()?), Angle::new(scan.f32()?));
    let on_ground = scan.bool()?;

    with_world(&ctx.world, |world| {
        world.write_inputs(ctx.entity_id, |inputs| {
            inputs.rot = rot;
            inputs.on_ground = on_ground;
        });
    });

    Ok(())
}

pub fn move_player_status_only<P: ChunkProvider>(packet: &Packet, ctx: &SessionContext<P>) -> Result<(), SessionError> {
    let mut scan = Scan::new(packet);
    let on_ground = scan.bool()?;

    with_world(&ctx.world, |world| {
        world.write_inputs(ctx.entity_id, |inputs| inputs.on_ground = on_ground);
    });

    Ok(())
}

/// A vehicle passenger reports its own pose the same shape as
/// `MovePlayerPosRot` does; the mailbox doesn't distinguish rider-in-a-
/// vehicle from walking, so it's written the same way.
pub fn move_vehicle<P: ChunkProvider>(packet: &Packet, ctx: &SessionContext<P>) -> Result<(), SessionError> {
    let mut scan = Scan::new(packet);
    let pos = Vector3f::new(scan.f64()?, scan.f64()?, scan.f64()?);
    let rot = (Angle::new(scan.f32()?), Angle::new(scan.f32()?));

    with_world(&ctx.world, |world| {
        world.write_inputs(ctx.entity_id, |inputs| {
            inputs.pos = pos;
            inputs.rot = rot;
        });
    });

    Ok(())
}

pub fn swing<P: ChunkProvider>(packet: &Packet, ctx: &SessionContext<P>) -> Result<(), SessionError> {
    let mut scan = Scan::new(packet);
    let hand = scan.var_int()?;

    let animation_id = if hand == SWING_MAIN_HAND {
        ANIMATION_SWING_MAIN_ARM
    } else {
        ANIMATION_SWING_OFF_HAND
    };

    with_world(&ctx.world, |world| {
        world.cmd_swing(ctx.entity_id, animation_id);
    });

    Ok(())
}

pub fn use_item_on<P: ChunkProvider>(packet: &Packet, ctx: &SessionContext<P>) -> Result<(), SessionError> {
    let mut scan = Scan::new(packet);
    let _hand = scan.var_int()?;
    let clicked = scan.position()?;
    let face = scan.byte()? as u8;

    with_world(&ctx.world, |world| {
        world.cmd_use_item_on(face, (clicked.x, clicked.y, clicked.z), PLACEHOLDER_PLACED_STATE);
    });

    Ok(())
}

pub fn player_action<P: ChunkProvider>(packet: &Packet, ctx: &SessionContext<P>) -> Result<(), SessionError> {
    let mut scan = Scan::new(packet);
    let status = scan.var_int()?;
    let position = scan.position()?;

    if status == FINISH_DIGGING {
        with_world(&ctx.world, |world| {
            world.cmd_break_block(position.x, position.y, position.z);
        });
    }

    Ok(())
}

pub fn set_carried_item<P: ChunkProvider>(packet: &Packet, ctx: &SessionContext<P>) -> Result<(), SessionError> {
    let mut scan = Scan::new(packet);
    let slot = scan.short()? as i32;

    with_world(&ctx.world, |world| world.set_carried_slot(ctx.entity_id, slot));

    Ok(())
}

pub fn set_creative_mode_slot<P: ChunkProvider>(packet: &Packet, ctx: &SessionContext<P>) -> Result<(), SessionError> {
    let mut scan = Scan::new(packet);
    let slot = scan.short()? as i32;
    let _item = scan.var_int()?;

    if (36..=44).contains(&slot) {
        with_world(&ctx.world, |world| world.set_carried_slot_from_hotbar_index(ctx.entity_id, slot));
    }

    Ok(())
}

/// A client-originated chat command: the same `/tp`/`/setblock`/`/fill`/
/// `/ping` surface `commands::handle_command` exposes on the operator
/// console, reachable here over the wire and scoped to the sending
/// player rather than an arbitrary entity id.
pub fn chat_command<P: ChunkProvider>(packet: &Packet, ctx: &SessionContext<P>) -> Result<(), SessionError> {
    let mut scan = Scan::new(packet);
    let message = scan.string()?;

    commands::handle_chat_command(&message, ctx.entity_id, &ctx.world);

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use strata_proto::packet::Build;
    use strata_proto::Position;
    use strata_world::{GeneratedChunkProvider, WorldConfig};

    use super::*;

    fn ctx() -> SessionContext<GeneratedChunkProvider> {
        let config = WorldConfig {
            view_distance: 8,
            spawn_position: Vector3f::new(0.0, 64.0, 0.0),
            spawn_angle: 0.0,
            tick_rate_hz: 20,
            global_chunk_load_rate: 100,
            player_chunk_load_rate: 20,
        };
        let mut world = strata_world::World::new(GeneratedChunkProvider::default(), config);
        let (tx, _rx) = flume::unbounded();
        let viewer = std::sync::Arc::new(crate::viewer::NetworkViewer::new(tx));
        let entity_id = world.add_player(uuid::Uuid::nil(), viewer);

        SessionContext {
            world: std::sync::Arc::new(Mutex::new(world)),
            entity_id,
        }
    }

    #[test]
    fn move_player_pos_updates_input_mailbox() {
        let ctx = ctx();
        let packet = Build::new().f64(10.0).f64(70.0).f64(-5.0).bool(true).into_packet(0);

        move_player_pos(&packet, &ctx).unwrap();

        let mut world = ctx.world.lock().unwrap();
        world.write_inputs(ctx.entity_id, |inputs| {
            assert_eq!(inputs.pos, Vector3f::new(10.0, 70.0, -5.0));
            assert!(inputs.on_ground);
        });
    }

    #[test]
    fn swing_does_not_error_with_no_observers() {
        let ctx = ctx();
        let packet = Build::new().var_int(SWING_MAIN_HAND).into_packet(0);

        assert!(swing(&packet, &ctx).is_ok());
    }

    #[test]
    fn use_item_on_places_above_clicked_face() {
        let ctx = ctx();

        // Running enough ticks lets the player's loader pull the spawn
        // chunk in, so placement has somewhere to land.
        for _ in 0..16 {
            ctx.world.lock().unwrap().tick();
        }

        let clicked = Position::new(0, 63, 0);
        let packet = Build::new().var_int(0).position(&clicked).byte(1).into_packet(0);

        use_item_on(&packet, &ctx).unwrap();

        let world = ctx.world.lock().unwrap();
        assert_eq!(
            world.chunks().get(strata_world::ChunkPos::new(0, 0)).unwrap().get_block(0, 64, 0),
            PLACEHOLDER_PLACED_STATE
        );
    }

    #[test]
    fn set_carried_item_clamps_into_range() {
        let ctx = ctx();
        let packet = Build::new().short(20).into_packet(0);

        set_carried_item(&packet, &ctx).unwrap();

        let world = ctx.world.lock().unwrap();
        assert_eq!(world.player(ctx.entity_id).unwrap().carried_slot, 8);
    }

    #[test]
    fn move_vehicle_updates_input_mailbox() {
        let ctx = ctx();
        let packet = Build::new().f64(1.0).f64(65.0).f64(2.0).f32(90.0).f32(0.0).into_packet(0);

        move_vehicle(&packet, &ctx).unwrap();

        let mut world = ctx.world.lock().unwrap();
        world.write_inputs(ctx.entity_id, |inputs| {
            assert_eq!(inputs.pos, Vector3f::new(1.0, 65.0, 2.0));
        });
    }

    #[test]
    fn chat_command_tp_teleports_the_sending_player() {
        let ctx = ctx();
        let packet = Build::new().string("/tp 100 70 100").into_packet(0);

        chat_command(&packet, &ctx).unwrap();

        let world = ctx.world.lock().unwrap();
        assert!(matches!(
            world.player(ctx.entity_id).unwrap().teleport,
            strata_world::player::TeleportState::Teleporting { .. }
        ));
    }
}
