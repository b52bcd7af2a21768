use std::sync::Mutex;

use strata_math::Vector3f;
use strata_world::{with_world, ChunkProvider, World};
use tracing::{info, warn};

/// Parses and runs one console command line against the world. Unknown
/// commands and malformed arguments are reported and otherwise ignored;
/// this is an operator console, not a client-facing protocol surface.
pub fn handle_command<P: ChunkProvider>(line: &str, world: &Mutex<World<P>>) {
    let line = line.strip_prefix('/').unwrap_or(line);

    let words = match shellwords::split(line) {
        Ok(words) => words,
        Err(err) => {
            warn!(%err, "could not tokenize command");
            return;
        }
    };

    let Some((cmd, args)) = words.split_first() else {
        return;
    };

    match cmd.as_str() {
        "ping" => info!("pong"),
        "tp" => run_tp(args, world),
        "setblock" => run_setblock(args, world),
        "fill" => run_fill(args, world),
        other => warn!(command = other, "unknown console command"),
    }
}

fn parse_i32(s: &str) -> Option<i32> {
    s.parse().ok()
}

fn parse_f64(s: &str) -> Option<f64> {
    s.parse().ok()
}

fn run_tp<P: ChunkProvider>(args: &[String], world: &Mutex<World<P>>) {
    let [player_id, x, y, z] = args else {
        warn!("usage: tp <entity-id> <x> <y> <z>");
        return;
    };

    let (Some(player_id), Some(x), Some(y), Some(z)) =
        (parse_i32(player_id), parse_f64(x), parse_f64(y), parse_f64(z))
    else {
        warn!("tp: could not parse arguments");
        return;
    };

    match with_world(world, |w| w.cmd_tp(player_id, Vector3f::new(x, y, z))) {
        Ok(()) => info!(player_id, x, y, z, "teleport requested"),
        Err(err) => warn!(player_id, %err, "teleport failed"),
    }
}

fn run_setblock<P: ChunkProvider>(args: &[String], world: &Mutex<World<P>>) {
    let [x, y, z, state] = args else {
        warn!("usage: setblock <x> <y> <z> <state>");
        return;
    };

    let (Some(x), Some(y), Some(z), Some(state)) =
        (parse_i32(x), parse_i32(y), parse_i32(z), parse_i32(state))
    else {
        warn!("setblock: could not parse arguments");
        return;
    };

    if with_world(world, |w| w.cmd_setblock(x, y, z, state)) {
        info!(x, y, z, state, "block set");
    } else {
        warn!(x, y, z, "setblock: target chunk is not loaded");
    }
}

fn run_fill<P: ChunkProvider>(args: &[String], world: &Mutex<World<P>>) {
    let [x1, y1, z1, x2, y2, z2, state] = args else {
        warn!("usage: fill <x1> <y1> <z1> <x2> <y2> <z2> <state>");
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
        warn!("fill: could not parse arguments");
        return;
    };

    let report = with_world(world, |w| w.cmd_fill((x1, y1, z1), (x2, y2, z2), state));

    if report.skipped_chunks.is_empty() {
        info!(blocks_set = report.blocks_set, volume = report.volume, "fill complete");
    } else {
        warn!(
            blocks_set = report.blocks_set,
            volume = report.volume,
            skipped = report.skipped_chunks.len(),
            "fill complete, some chunks were not loaded"
        );
    }
}
