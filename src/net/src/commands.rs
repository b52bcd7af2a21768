//! Client-originated chat commands: the same `/ping`/`/tp`/`/setblock`/
//! `/fill` surface `strata-server`'s operator console exposes
//! (`strata_server::commands::handle_command`), reached here over the
//! wire instead of stdin and always scoped to whichever player's
//! client sent the message — `/tp` teleports the sender, it doesn't
//! take a target entity id the way the console command does.

use std::sync::Mutex;

use strata_math::Vector3f;
use strata_world::{with_world, ChunkProvider, EntityId, World};
use tracing::warn;

pub fn handle_chat_command<P: ChunkProvider>(line: &str, sender: EntityId, world: &Mutex<World<P>>) {
    let line = line.strip_prefix('/').unwrap_or(line);

    let words = match shellwords::split(line) {
        Ok(words) => words,
        Err(err) => {
            warn!(sender, %err, "could not tokenize chat command");
            return;
        }
    };

    let Some((cmd, args)) = words.split_first() else {
        return;
    };

    match cmd.as_str() {
        "ping" => reply(world, sender, "pong"),
        "tp" => run_tp(args, sender, world),
        "setblock" => run_setblock(args, sender, world),
        "fill" => run_fill(args, sender, world),
        other => {
            warn!(sender, command = other, "unknown chat command");
            reply(world, sender, &format!("unknown command: {other}"));
        }
    }
}

fn reply<P: ChunkProvider>(world: &Mutex<World<P>>, sender: EntityId, message: &str) {
    with_world(world, |w| w.send_chat(sender, message, false));
}

fn parse_i32(s: &str) -> Option<i32> {
    s.parse().ok()
}

fn parse_f64(s: &str) -> Option<f64> {
    s.parse().ok()
}

fn run_tp<P: ChunkProvider>(args: &[String], sender: EntityId, world: &Mutex<World<P>>) {
    let [x, y, z] = args else {
        reply(world, sender, "usage: /tp <x> <y> <z>");
        return;
    };

    let (Some(x), Some(y), Some(z)) = (parse_f64(x), parse_f64(y), parse_f64(z)) else {
        reply(world, sender, "tp: could not parse arguments");
        return;
    };

    if let Err(err) = with_world(world, |w| w.cmd_tp(sender, Vector3f::new(x, y, z))) {
        warn!(sender, %err, "chat teleport failed");
        reply(world, sender, &format!("teleport failed: {err}"));
    }
}

fn run_setblock<P: ChunkProvider>(args: &[String], sender: EntityId, world: &Mutex<World<P>>) {
    let [x, y, z, state] = args else {
        reply(world, sender, "usage: /setblock <x> <y> <z> <state>");
        return;
    };

    let (Some(x), Some(y), Some(z), Some(state)) =
        (parse_i32(x), parse_i32(y), parse_i32(z), parse_i32(state))
    else {
        reply(world, sender, "setblock: could not parse arguments");
        return;
    };

    if !with_world(world, |w| w.cmd_setblock(x, y, z, state)) {
        reply(world, sender, "setblock: target chunk is not loaded");
    }
}

fn run_fill<P: ChunkProvider>(args: &[String], sender: EntityId, world: &Mutex<World<P>>) {
    let [x1, y1, z1, x2, y2, z2, state] = args else {
        reply(world, sender, "usage: /fill <x1> <y1> <z1> <x2> <y2> <z2> <state>");
        return;
    };

    let parsed = (
        parse_i32(x1),
        parse_i32(y1),
        parse_i32(z1),
        parse_i32(x2),
        parse_i32(y2),
        parse_i32(z2),
        parse_i32(state),
    );

    let (Some(x1), Some(y1), Some(z1), Some(x2), Some(y2), Some(z2), Some(state)) = parsed else {
        reply(world, sender, "fill: could not parse arguments");
        return;
    };

    let report = with_world(world, |w| w.cmd_fill((x1, y1, z1), (x2, y2, z2), state));

    if !report.skipped_chunks.is_empty() {
        reply(
            world,
            sender,
            &format!("fill complete, {} chunks were not loaded", report.skipped_chunks.len()),
        );
    }
}

#[cfg(test)]
mod tests {
    use strata_world::{GeneratedChunkProvider, WorldConfig};

    use super::*;

    fn world() -> (std::sync::Arc<Mutex<World<GeneratedChunkProvider>>>, EntityId) {
        let config = WorldConfig {
            view_distance: 8,
            spawn_position: Vector3f::new(0.0, 64.0, 0.0),
            spawn_angle: 0.0,
            tick_rate_hz: 20,
            global_chunk_load_rate: 100,
            player_chunk_load_rate: 20,
        };
        let mut w = World::new(GeneratedChunkProvider::default(), config);
        let (tx, _rx) = flume::unbounded();
        let viewer = std::sync::Arc::new(crate::viewer::NetworkViewer::new(tx));
        let entity_id = w.add_player(uuid::Uuid::nil(), viewer);

        (std::sync::Arc::new(Mutex::new(w)), entity_id)
    }

    #[test]
    fn tp_teleports_the_sending_player() {
        let (world, sender) = world();

        handle_chat_command("/tp 100 70 100", sender, &world);

        let w = world.lock().unwrap();
        assert!(matches!(
            w.player(sender).unwrap().teleport,
            strata_world::player::TeleportState::Teleporting { .. }
        ));
    }

    #[test]
    fn unknown_command_does_not_panic() {
        let (world, sender) = world();

        handle_chat_command("/frobnicate", sender, &world);
    }
}
