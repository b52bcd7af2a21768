use std::collections::HashMap;
use std::sync::Arc;

use strata_bvh::{Aabb, Predicate, Tree as BvhTree};
use strata_math::{Angle, Vector3f};
use uuid::Uuid;

use crate::chunk::{Chunk, ChunkStore};
use crate::coord::ChunkPos;
use crate::entity::{Entity, EntityKind, SimpleEntity};
use crate::error::CommandError;
use crate::id::{next_entity_id, EntityId};
use crate::loader::Loader;
use crate::player::{Inputs, Player, ReconcileOutcome, TeleportState};
use crate::provider::{ChunkLoadResult, ChunkProvider};
use crate::rate_limit::TokenBucket;
use crate::viewer::Viewer;

/// Plain, hand-written mirror of the subset of `strata_config::World`
/// this crate needs, so `strata-world` does not depend on the config
/// crate's schema directly.
#[derive(Debug, Clone, Copy)]
pub struct WorldConfig {
    pub view_distance: u8,
    pub spawn_position: Vector3f,
    pub spawn_angle: f32,
    pub tick_rate_hz: u32,
    pub global_chunk_load_rate: u32,
    pub player_chunk_load_rate: u32,
}

fn view_box(pos: Vector3f, view_distance: u8) -> Aabb {
    let radius = view_distance as f64 * 16.0;
    Aabb::centered([pos.x, pos.y, pos.z], radius)
}

/// `UseItemOn`'s clicked-face to block-offset mapping.
pub fn face_offset(face: u8) -> Option<(i32, i32, i32)> {
    match face {
        0 => Some((0, -1, 0)),
        1 => Some((0, 1, 0)),
        2 => Some((0, 0, -1)),
        3 => Some((0, 0, 1)),
        4 => Some((-1, 0, 0)),
        5 => Some((1, 0, 0)),
        _ => None,
    }
}

fn clamp_i16(v: f64) -> i16 {
    v.clamp(i16::MIN as f64, i16::MAX as f64) as i16
}

/// Fixed-point motion delta: the protocol's sub-pixel representation,
/// a signed block-space delta multiplied by `32*128`.
fn fixed_point_delta(old: Vector3f, new: Vector3f) -> [i16; 3] {
    [
        clamp_i16((new.x - old.x) * 32.0 * 128.0),
        clamp_i16((new.y - old.y) * 32.0 * 128.0),
        clamp_i16((new.z - old.z) * 32.0 * 128.0),
    ]
}

/// The world tick engine. Owns every mutable piece of server state and
/// is meant to be wrapped in a single coarse mutex (`tickLock`) held for
/// the duration of one tick.
pub struct World<P: ChunkProvider> {
    chunks: ChunkStore,
    loaders: HashMap<EntityId, Loader>,
    players: HashMap<EntityId, Player>,
    viewers: HashMap<EntityId, Arc<dyn Viewer>>,
    static_entities: Vec<SimpleEntity>,
    player_views: BvhTree<EntityId>,
    tick_count: u64,
    provider: P,
    global_limiter: TokenBucket,
    config: WorldConfig,
    /// Viewer notifications staged during a tick or a command, run by
    /// the caller via [`World::take_pending`] only after the world
    /// lock has been released. A viewer send can block on a full
    /// outbound queue, and this must never happen while another
    /// session's handler or the ticker is waiting on the same lock.
    pending: Vec<Box<dyn FnOnce() + Send>>,
}

impl<P: ChunkProvider> World<P> {
    pub fn new(provider: P, config: WorldConfig) -> Self {
        Self {
            chunks: ChunkStore::new(),
            loaders: HashMap::new(),
            players: HashMap::new(),
            viewers: HashMap::new(),
            static_entities: Vec::new(),
            player_views: BvhTree::new(),
            tick_count: 0,
            provider,
            global_limiter: TokenBucket::new(config.global_chunk_load_rate),
            config,
            pending: Vec::new(),
        }
    }

    /// Drains every viewer notification staged since the last drain.
    /// Callers must drop the world lock before running the returned
    /// closures.
    pub fn take_pending(&mut self) -> Vec<Box<dyn FnOnce() + Send>> {
        std::mem::take(&mut self.pending)
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn player(&self, id: EntityId) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn chunks(&self) -> &ChunkStore {
        &self.chunks
    }

    pub fn spawn_static_entity(&mut self, entity: SimpleEntity) {
        self.static_entities.push(entity);
    }

    /// Registers a newly-connected player, giving it a loader, a BVH
    /// view-box handle, and an entry in the viewer table.
    pub fn add_player(&mut self, uuid: Uuid, viewer: Arc<dyn Viewer>) -> EntityId {
        let id = next_entity_id();
        let mut player = Player::new(
            id,
            uuid,
            self.config.spawn_position,
            (Angle::new(self.config.spawn_angle), Angle::new(0.0)),
        );

        let handle = self
            .player_views
            .insert(view_box(player.position, self.config.view_distance), id);
        player.bvh_handle = Some(handle);

        self.players.insert(id, player);
        self.loaders.insert(
            id,
            Loader::new(self.config.view_distance, self.config.player_chunk_load_rate),
        );
        self.viewers.insert(id, viewer);

        id
    }

    /// Tears a player session down: deregisters it from every chunk it
    /// was viewing, drops its BVH handle, and removes its player/loader
    /// entries.
    pub fn remove_player(&mut self, id: EntityId) {
        if let Some(loader) = self.loaders.remove(&id) {
            for pos in loader.loaded {
                if let Some(chunk) = self.chunks.get(pos) {
                    if chunk.remove_viewer(id) {
                        self.chunks.evict(pos);
                    }
                }
            }
        }

        if let Some(player) = self.players.remove(&id) {
            if let Some(handle) = player.bvh_handle {
                self.player_views.delete(handle);
            }
        }

        self.viewers.remove(&id);
    }

    /// One 20ms step: chunk admission control every 8 ticks, a dirty
    /// chunk flush every 16, then player reconciliation and entity
    /// replication every tick.
    pub fn tick(&mut self) {
        self.tick_count += 1;

        if self.tick_count % 8 == 0 {
            self.chunk_subtick();
        }

        if self.tick_count % 16 == 0 {
            self.flush_chunks();
        }

        self.subtick_update_players();
        self.subtick_update_entities();
    }

    fn flush_chunks(&mut self) {
        for pos in self.chunks.positions().copied().collect::<Vec<_>>() {
            if let Some(chunk) = self.chunks.get(pos) {
                self.pending.push(Box::new(move || chunk.update_to_viewers()));
            }
        }
    }

    fn chunk_subtick(&mut self) {
        // Recenter: recompute each loader's desired set from its
        // player's current chunk, and notify on change.
        for (id, player) in self.players.iter_mut() {
            let center = ChunkPos::from_block(player.position.x as i32, player.position.z as i32);

            if center != player.chunk_pos {
                player.chunk_pos = center;
                if let Some(viewer) = self.viewers.get(id).cloned() {
                    self.pending.push(Box::new(move || viewer.send_set_chunk_cache_center(center)));
                }
            }

            if let Some(loader) = self.loaders.get_mut(id) {
                loader.calc_loading_queue(center);
                loader.calc_unused_chunks(center);
            }
        }

        // Admission control: unordered iteration over loaders gives weak
        // per-tick fairness by design.
        'loaders: for (&id, loader) in self.loaders.iter_mut() {
            let mut drained = 0;

            while drained < loader.load_queue.len() {
                if !loader.limiter.try_acquire() {
                    break;
                }

                let pos = loader.load_queue[drained];

                if !self.chunks.contains(pos) {
                    if !self.global_limiter.try_acquire() {
                        break 'loaders;
                    }

                    match self.provider.load(pos) {
                        ChunkLoadResult::Found(chunk) => {
                            self.chunks.insert(pos, chunk);
                        }
                        ChunkLoadResult::NotFound => {
                            self.chunks.insert(pos, Chunk::new());
                        }
                        ChunkLoadResult::RateLimited => break 'loaders,
                    }
                }

                if let (Some(chunk), Some(viewer)) = (self.chunks.get(pos), self.viewers.get(&id).cloned()) {
                    self.pending.push(Box::new(move || chunk.add_viewer(id, viewer)));
                }

                loader.loaded.insert(pos);
                drained += 1;
            }

            loader.load_queue.drain(0..drained);
        }

        for (&id, loader) in self.loaders.iter_mut() {
            for pos in loader.unload_queue.drain(..) {
                loader.loaded.remove(&pos);

                if let Some(chunk) = self.chunks.get(pos) {
                    let emptied = chunk.remove_viewer(id);
                    if let Some(viewer) = self.viewers.get(&id).cloned() {
                        self.pending.push(Box::new(move || viewer.view_chunk_unload(pos)));
                    }
                    if emptied {
                        drop(chunk);
                        self.chunks.evict(pos);
                    }
                }
            }
        }
    }

    fn subtick_update_players(&mut self) {
        let mut to_disconnect = Vec::new();

        for (&id, player) in self.players.iter_mut() {
            let Some(viewer) = self.viewers.get(&id).cloned() else {
                continue;
            };

            match player.reconcile(viewer.as_ref()) {
                ReconcileOutcome::Skipped | ReconcileOutcome::Ok => {}
                ReconcileOutcome::Teleport { id: teleport_id, target_pos, target_rot } => {
                    let viewer = viewer.clone();
                    self.pending
                        .push(Box::new(move || viewer.send_player_position(teleport_id, target_pos, target_rot)));
                }
                ReconcileOutcome::Disconnect(reason) => {
                    let viewer = viewer.clone();
                    self.pending.push(Box::new(move || viewer.send_disconnect(reason)));
                    to_disconnect.push(id);
                }
            }
        }

        for id in to_disconnect {
            self.remove_player(id);
        }
    }

    fn subtick_update_entities(&mut self) {
        let movers: Vec<_> = self
            .players
            .iter()
            .map(|(&id, player)| {
                (
                    id,
                    Some(player.uuid),
                    "player".to_string(),
                    player.position,
                    player.rotation,
                    player.on_ground,
                    player.pos0,
                    player.rot0,
                    None::<Vector3f>,
                )
            })
            .collect();

        for (id, uuid, type_name, old_pos, old_rot, on_ground, new_pos, new_rot, velocity) in movers {
            self.replicate_mover(id, uuid, &type_name, old_pos, old_rot, on_ground, new_pos, new_rot, velocity);
        }

        self.step_static_entities();
        self.prune_stale_views();

        // Commit staged player poses and reposition their BVH boxes.
        let updates: Vec<(EntityId, Vector3f)> = self.players.values().map(|p| (p.entity_id, p.pos0)).collect();
        for (id, new_pos) in updates {
            if let Some(player) = self.players.get_mut(&id) {
                player.commit_pose();

                if let Some(old_handle) = player.bvh_handle {
                    let new_handle = self.player_views.insert(view_box(new_pos, self.config.view_distance), id);
                    self.player_views.delete(old_handle);
                    player.bvh_handle = Some(new_handle);
                }
            }
        }
    }

    #[allow(clippy::type_complexity)]
    fn step_static_entities(&mut self) {
        let player_positions: HashMap<EntityId, Vector3f> =
            self.players.iter().map(|(&id, p)| (id, p.position)).collect();

        let mut moves: Vec<(EntityId, String, Vector3f, (Angle, Angle), bool, Vector3f, (Angle, Angle), Option<Vector3f>)> =
            Vec::new();

        for simple in &mut self.static_entities {
            let old_pos = simple.entity.pos;
            let old_rot = simple.entity.rot;
            let on_ground = simple.entity.on_ground;
            let id = simple.entity.id;
            let type_name = simple.entity.type_name().to_string();

            // A `SimpleEntity` with no orbit is still a live, visible
            // entity: it just never moves, so it's replicated with a
            // zero motion delta instead of being skipped entirely.
            let (new_pos, new_rot, emit_velocity) = match simple.orbit.as_mut() {
                Some(orbit) => {
                    let center_pos = player_positions
                        .get(&orbit.center_player)
                        .copied()
                        .unwrap_or(simple.entity.pos);

                    let (new_pos, velocity) = orbit.step(center_pos);
                    let new_rot = (Angle::new(orbit.yaw_degrees()), old_rot.1);

                    let emit_velocity = simple.velocity_changed_enough(velocity).then_some(velocity);
                    if emit_velocity.is_some() {
                        simple.last_broadcast_velocity = Some(velocity);
                    }

                    simple.entity.velocity = Some(velocity);
                    (new_pos, new_rot, emit_velocity)
                }
                None => (old_pos, old_rot, None),
            };

            simple.entity.pos = new_pos;
            simple.entity.rot = new_rot;

            moves.push((id, type_name, old_pos, old_rot, on_ground, new_pos, new_rot, emit_velocity));
        }

        for (id, type_name, old_pos, old_rot, on_ground, new_pos, new_rot, velocity) in moves {
            self.replicate_mover(id, None, &type_name, old_pos, old_rot, on_ground, new_pos, new_rot, velocity);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn replicate_mover(
        &mut self,
        id: EntityId,
        uuid: Option<Uuid>,
        type_name: &str,
        old_pos: Vector3f,
        old_rot: (Angle, Angle),
        on_ground: bool,
        new_pos: Vector3f,
        new_rot: (Angle, Angle),
        velocity: Option<Vector3f>,
    ) {
        let delta = fixed_point_delta(old_pos, new_pos);
        let rot_bytes = [new_rot.0.as_byte(), new_rot.1.as_byte()];
        let moved = delta != [0i16; 3];
        let rotated = old_rot.0 != new_rot.0 || old_rot.1 != new_rot.1;
        let point = [new_pos.x, new_pos.y, new_pos.z];

        self.player_views.find(Predicate::TouchPoint(point), |&viewer_id| {
            if viewer_id == id {
                return true; // never send a player updates about themself
            }

            let Some(viewer) = self.viewers.get(&viewer_id).cloned() else {
                return true;
            };
            let Some(viewer_player) = self.players.get_mut(&viewer_id) else {
                return true;
            };

            if !viewer_player.entities_in_view.contains_key(&id) {
                let kind = match uuid {
                    Some(u) => EntityKind::Player(u),
                    None => EntityKind::Simple(type_name.to_string()),
                };
                let snapshot = Entity {
                    id,
                    kind,
                    pos: new_pos,
                    rot: new_rot,
                    on_ground,
                    velocity,
                };

                let spawn_viewer = viewer.clone();
                let spawn_snapshot = snapshot.clone();
                if uuid.is_some() {
                    self.pending.push(Box::new(move || spawn_viewer.view_add_player(&spawn_snapshot)));
                } else {
                    self.pending.push(Box::new(move || spawn_viewer.view_add_entity(&spawn_snapshot)));
                }
                if let Some(vel) = velocity {
                    let motion_viewer = viewer.clone();
                    self.pending.push(Box::new(move || motion_viewer.view_set_entity_motion(id, vel)));
                }

                viewer_player.entities_in_view.insert(id, snapshot);
            } else {
                if moved && rotated {
                    let pos_rot_viewer = viewer.clone();
                    self.pending
                        .push(Box::new(move || pos_rot_viewer.view_move_entity_pos_and_rot(id, delta, rot_bytes, on_ground)));
                    let head_viewer = viewer.clone();
                    self.pending.push(Box::new(move || head_viewer.view_rotate_head(id, rot_bytes[0])));
                } else if moved {
                    let pos_viewer = viewer.clone();
                    self.pending.push(Box::new(move || pos_viewer.view_move_entity_pos(id, delta, on_ground)));
                } else if rotated {
                    let rot_viewer = viewer.clone();
                    self.pending.push(Box::new(move || rot_viewer.view_move_entity_rot(id, rot_bytes, on_ground)));
                    let head_viewer = viewer.clone();
                    self.pending.push(Box::new(move || head_viewer.view_rotate_head(id, rot_bytes[0])));
                }

                if let Some(vel) = velocity {
                    let motion_viewer = viewer.clone();
                    self.pending.push(Box::new(move || motion_viewer.view_set_entity_motion(id, vel)));
                }

                if let Some(entry) = viewer_player.entities_in_view.get_mut(&id) {
                    entry.pos = new_pos;
                    entry.rot = new_rot;
                    entry.on_ground = on_ground;
                    if let Some(vel) = velocity {
                        entry.velocity = Some(vel);
                    }
                }
            }

            true
        });
    }

    /// Removes from every player's `EntitiesInView` any entry whose
    /// authoritative position has left that player's view box.
    fn prune_stale_views(&mut self) {
        let view_distance = self.config.view_distance;

        for player in self.players.values_mut() {
            let box_ = view_box(player.position, view_distance);

            let stale: Vec<EntityId> = player
                .entities_in_view
                .iter()
                .filter(|(_, entity)| !box_.contains_point([entity.pos.x, entity.pos.y, entity.pos.z]))
                .map(|(&id, _)| id)
                .collect();

            if stale.is_empty() {
                continue;
            }

            for id in &stale {
                player.entities_in_view.remove(id);
            }

            if let Some(viewer) = self.viewers.get(&player.entity_id).cloned() {
                self.pending.push(Box::new(move || viewer.view_remove_entities(&stale)));
            }
        }
    }

    /// Writes into a player's input mailbox under its try-lock. Returns
    /// false if the tick is presently reading it (the caller should just
    /// drop this update; the next one will land).
    pub fn write_inputs(&self, id: EntityId, f: impl FnOnce(&mut Inputs)) -> bool {
        match self.players.get(&id) {
            Some(player) => player.try_write_inputs(f),
            None => false,
        }
    }

    pub fn set_carried_slot(&mut self, id: EntityId, requested: i32) {
        if let Some(player) = self.players.get_mut(&id) {
            player.set_carried_slot(requested);
        }
    }

    pub fn set_carried_slot_from_hotbar_index(&mut self, id: EntityId, hotbar_index: i32) {
        if let Some(player) = self.players.get_mut(&id) {
            player.set_carried_slot_from_hotbar_index(hotbar_index);
        }
    }

    /// `Swing`: broadcasts an arm-swing animation to everyone currently
    /// viewing this player. Returns false if the player is unknown.
    pub fn cmd_swing(&mut self, id: EntityId, animation_id: u8) -> bool {
        let Some(player) = self.players.get(&id) else {
            return false;
        };
        let point = [player.position.x, player.position.y, player.position.z];

        self.player_views.find(Predicate::TouchPoint(point), |&viewer_id| {
            if viewer_id != id {
                if let Some(viewer) = self.viewers.get(&viewer_id).cloned() {
                    self.pending.push(Box::new(move || viewer.view_animate(id, animation_id)));
                }
            }
            true
        });

        true
    }

    /// Sends a system-chat message to one player, deferred like every
    /// other viewer notification. Silently a no-op for an unknown id.
    pub fn send_chat(&mut self, id: EntityId, message: &str, actionbar: bool) {
        if let Some(viewer) = self.viewers.get(&id).cloned() {
            let message = message.to_string();
            self.pending.push(Box::new(move || viewer.send_system_chat(&message, actionbar)));
        }
    }

    pub fn cmd_tp(&mut self, player_id: EntityId, target: Vector3f) -> Result<(), CommandError> {
        let viewer = self.viewers.get(&player_id).cloned().ok_or(CommandError::PlayerNotFound)?;
        let player = self.players.get_mut(&player_id).ok_or(CommandError::PlayerNotFound)?;

        let id = viewer.alloc_teleport_id();
        let rot = player.rotation;
        player.teleport = TeleportState::Teleporting { id, target: (target, rot) };

        self.pending.push(Box::new(move || viewer.send_player_position(id, target, rot)));

        Ok(())
    }

    /// `UseItemOn`: offsets the clicked block coordinate by the clicked
    /// face and places `state` there, if the target chunk is loaded.
    pub fn cmd_use_item_on(&mut self, face: u8, clicked: (i32, i32, i32), state: i32) -> bool {
        let Some((dx, dy, dz)) = face_offset(face) else {
            return false;
        };

        self.cmd_setblock(clicked.0 + dx, clicked.1 + dy, clicked.2 + dz, state)
    }

    /// `PlayerAction` finish/stop digging: replace the block with air.
    pub fn cmd_break_block(&mut self, x: i32, y: i32, z: i32) -> bool {
        self.cmd_setblock(x, y, z, crate::chunk::section::AIR)
    }

    pub fn cmd_setblock(&mut self, x: i32, y: i32, z: i32, state: i32) -> bool {
        let pos = ChunkPos::from_block(x, z);
        match self.chunks.get(pos) {
            Some(chunk) => {
                chunk.set_block(x, y, z, state);
                self.pending.push(Box::new(move || chunk.update_to_viewers()));
                true
            }
            None => false,
        }
    }

    /// `/fill x1 y1 z1 x2 y2 z2 id`: normalizes min/max, computes the
    /// volume, and silently skips chunks that are not currently loaded
    /// while still reporting them to the caller.
    pub fn cmd_fill(&mut self, a: (i32, i32, i32), b: (i32, i32, i32), state: i32) -> FillReport {
        let min = (a.0.min(b.0), a.1.min(b.1), a.2.min(b.2));
        let max = (a.0.max(b.0), a.1.max(b.1), a.2.max(b.2));

        let volume = (max.0 - min.0 + 1) as u64 * (max.1 - min.1 + 1) as u64 * (max.2 - min.2 + 1) as u64;

        let mut blocks_set = 0u64;
        let mut skipped_chunks = Vec::new();
        let mut touched = std::collections::HashSet::new();

        for x in min.0..=max.0 {
            for z in min.2..=max.2 {
                let pos = ChunkPos::from_block(x, z);
                let Some(chunk) = self.chunks.get(pos) else {
                    if !skipped_chunks.contains(&pos) {
                        skipped_chunks.push(pos);
                    }
                    continue;
                };

                for y in min.1..=max.1 {
                    chunk.set_block(x, y, z, state);
                    blocks_set += 1;
                }

                touched.insert(pos);
            }
        }

        for pos in touched {
            if let Some(chunk) = self.chunks.get(pos) {
                self.pending.push(Box::new(move || chunk.update_to_viewers()));
            }
        }

        FillReport {
            volume,
            blocks_set,
            skipped_chunks,
        }
    }
}

pub struct FillReport {
    pub volume: u64,
    pub blocks_set: u64,
    pub skipped_chunks: Vec<ChunkPos>,
}

/// Runs `f` against the world under its lock, then runs every viewer
/// notification it staged only after the lock is released. Every
/// caller that mutates a `World` through its shared `Mutex` (the
/// ticker, console commands, packet handlers) should go through this
/// rather than locking directly, or a blocked client's full outbound
/// queue can stall the lock for every other session.
pub fn with_world<P: ChunkProvider, R>(world: &std::sync::Mutex<World<P>>, f: impl FnOnce(&mut World<P>) -> R) -> R {
    let (result, pending) = {
        let mut guard = world.lock().unwrap();
        let result = f(&mut guard);
        (result, guard.take_pending())
    };

    for notify in pending {
        notify();
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::GeneratedChunkProvider;
    use crate::viewer::RecordingViewer;

    /// Ticks and immediately runs whatever the tick staged, standing in
    /// for what a caller would do after dropping the world lock.
    fn tick(world: &mut World<GeneratedChunkProvider>) {
        world.tick();
        for notify in world.take_pending() {
            notify();
        }
    }

    fn config() -> WorldConfig {
        WorldConfig {
            view_distance: 4,
            spawn_position: Vector3f::new(0.0, 64.0, 0.0),
            spawn_angle: 0.0,
            tick_rate_hz: 50,
            global_chunk_load_rate: 1000,
            player_chunk_load_rate: 1000,
        }
    }

    #[test]
    fn place_and_break_scenario() {
        let mut world = World::new(GeneratedChunkProvider::default(), config());
        let viewer = Arc::new(RecordingViewer::new());
        let id = world.add_player(Uuid::nil(), viewer.clone());

        for _ in 0..16 {
            world.tick();
        }

        assert!(world.cmd_setblock(0, 64, 0, 5));
        assert_eq!(world.chunks.get(ChunkPos::new(0, 0)).unwrap().get_block(0, 64, 0), 5);

        assert!(world.cmd_setblock(0, 64, 0, 0));
        assert_eq!(world.chunks.get(ChunkPos::new(0, 0)).unwrap().get_block(0, 64, 0), 0);

        let _ = id;
    }

    #[test]
    fn use_item_on_offsets_match_face_table() {
        assert_eq!(face_offset(0), Some((0, -1, 0)));
        assert_eq!(face_offset(1), Some((0, 1, 0)));
        assert_eq!(face_offset(2), Some((0, 0, -1)));
        assert_eq!(face_offset(3), Some((0, 0, 1)));
        assert_eq!(face_offset(4), Some((-1, 0, 0)));
        assert_eq!(face_offset(5), Some((1, 0, 0)));
        assert_eq!(face_offset(6), None);
    }

    #[test]
    fn fill_reports_volume_and_skips_unloaded_chunks() {
        let mut world = World::new(GeneratedChunkProvider::default(), config());
        let report = world.cmd_fill((0, 0, 0), (15, 0, 15), 1);

        assert_eq!(report.volume, 256);
        assert!(report.blocks_set <= 256);
    }

    #[test]
    fn teleport_scenario_commits_on_matching_ack_only() {
        let mut world = World::new(GeneratedChunkProvider::default(), config());
        let viewer = Arc::new(RecordingViewer::new());
        let id = world.add_player(Uuid::nil(), viewer.clone());

        world.cmd_tp(id, Vector3f::new(100.0, 70.0, 100.0)).unwrap();

        let teleport_id = match world.player(id).unwrap().teleport {
            TeleportState::Teleporting { id, .. } => id,
            TeleportState::Synced => panic!("expected pending teleport"),
        };

        world.players.get(&id).unwrap().try_write_inputs(|i| i.teleport_id_ack = Some(teleport_id + 1));
        world.tick();
        assert!(matches!(world.player(id).unwrap().teleport, TeleportState::Teleporting { .. }));

        world.players.get(&id).unwrap().try_write_inputs(|i| i.teleport_id_ack = Some(teleport_id));
        world.tick();
        assert_eq!(world.player(id).unwrap().position, Vector3f::new(100.0, 70.0, 100.0));
    }

    #[test]
    fn observer_does_not_hear_about_itself() {
        let mut world = World::new(GeneratedChunkProvider::default(), config());
        let v1 = Arc::new(RecordingViewer::new());
        let v2 = Arc::new(RecordingViewer::new());
        let p1 = world.add_player(Uuid::nil(), v1.clone());
        let p2 = world.add_player(Uuid::nil(), v2.clone());

        tick(&mut world);

        world.players.get(&p1).unwrap().try_write_inputs(|i| i.pos = Vector3f::new(0.5, 64.0, 0.0));
        tick(&mut world);

        let p1_calls = v1.calls.lock().unwrap();
        assert!(!p1_calls.iter().any(|c| matches!(c,
            crate::viewer::Recorded::MoveEntityPos(id, _, _) if *id == p1)));

        let _ = p2;
    }

    #[test]
    fn chunk_streaming_follows_player_across_chunks() {
        let mut world = World::new(GeneratedChunkProvider::default(), config());
        let viewer = Arc::new(RecordingViewer::new());
        let id = world.add_player(Uuid::nil(), viewer.clone());

        for _ in 0..16 {
            tick(&mut world);
        }

        assert!(world.loaders.get(&id).unwrap().loaded.contains(&ChunkPos::new(0, 0)));

        world.players.get(&id).unwrap().try_write_inputs(|i| i.pos = Vector3f::new(80.0, 64.0, 0.0));

        for _ in 0..16 {
            tick(&mut world);
        }

        let loader = world.loaders.get(&id).unwrap();
        assert!(loader.loaded.contains(&ChunkPos::new(5, 0)));
        assert!(!loader.loaded.contains(&ChunkPos::new(0, 0)));

        let calls = viewer.calls.lock().unwrap();
        assert!(calls
            .iter()
            .any(|c| matches!(c, crate::viewer::Recorded::SetChunkCacheCenter(pos) if *pos == ChunkPos::new(5, 0))));
        assert!(calls
            .iter()
            .any(|c| matches!(c, crate::viewer::Recorded::ChunkLoad(pos) if *pos == ChunkPos::new(5, 0))));
        assert!(calls
            .iter()
            .any(|c| matches!(c, crate::viewer::Recorded::ChunkUnload(pos) if *pos == ChunkPos::new(0, 0))));
    }
}
