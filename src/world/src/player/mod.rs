use std::collections::HashMap;
use std::sync::Mutex;

use strata_bvh::Handle as BvhHandle;
use strata_math::{Angle, Vector3f};
use uuid::Uuid;

use crate::coord::ChunkPos;
use crate::entity::Entity;
use crate::id::EntityId;
use crate::viewer::PlayerViewer;

const TELEPORT_REVERT_THRESHOLD: f64 = 100.0;
const FALL_RESCUE_Y: f64 = -100.0;
const FALL_RESCUE_TARGET_Y: f64 = 100.0;
const MAX_COORD: f64 = 3.0e7;

/// The pose and metadata a client reports, written by the receive task
/// and read by the tick under a try-lock.
#[derive(Debug, Clone, Copy)]
pub struct Inputs {
    pub pos: Vector3f,
    pub rot: (Angle, Angle),
    pub on_ground: bool,
    pub teleport_id_ack: Option<i32>,
    pub view_distance: u8,
}

impl Default for Inputs {
    fn default() -> Self {
        Self {
            pos: Vector3f::new(0.0, 0.0, 0.0),
            rot: (Angle::new(0.0), Angle::new(0.0)),
            on_ground: false,
            teleport_id_ack: None,
            view_distance: 8,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum TeleportState {
    Synced,
    Teleporting { id: i32, target: (Vector3f, (Angle, Angle)) },
}

pub enum ReconcileOutcome {
    /// The input mailbox was contended; this player is skipped this tick.
    Skipped,
    Ok,
    /// A teleport was staged; the id is already committed to
    /// `TeleportState::Teleporting`, the caller still owes the client
    /// the actual `PlayerPosition` packet (deferred, since sending it
    /// may block on a full outbound queue).
    Teleport {
        id: i32,
        target_pos: Vector3f,
        target_rot: (Angle, Angle),
    },
    Disconnect(&'static str),
}

pub struct Player {
    pub entity_id: EntityId,
    pub uuid: Uuid,
    pub position: Vector3f,
    pub rotation: (Angle, Angle),
    pub on_ground: bool,
    pub chunk_pos: ChunkPos,
    pub pos0: Vector3f,
    pub rot0: (Angle, Angle),
    pub carried_slot: u8,
    pub teleport: TeleportState,
    pub entities_in_view: HashMap<EntityId, Entity>,
    pub bvh_handle: Option<BvhHandle>,
    inputs: Mutex<Inputs>,
}

impl Player {
    pub fn new(entity_id: EntityId, uuid: Uuid, spawn: Vector3f, spawn_rot: (Angle, Angle)) -> Self {
        Self {
            entity_id,
            uuid,
            position: spawn,
            rotation: spawn_rot,
            on_ground: false,
            chunk_pos: ChunkPos::from_block(spawn.x as i32, spawn.z as i32),
            pos0: spawn,
            rot0: spawn_rot,
            carried_slot: 0,
            teleport: TeleportState::Synced,
            entities_in_view: HashMap::new(),
            bvh_handle: None,
            inputs: Mutex::new(Inputs {
                pos: spawn,
                rot: spawn_rot,
                ..Inputs::default()
            }),
        }
    }

    /// Writes fresh client input. Returns false (and drops the input)
    /// only if the tick is presently reading the mailbox.
    pub fn try_write_inputs(&self, f: impl FnOnce(&mut Inputs)) -> bool {
        match self.inputs.try_lock() {
            Ok(mut guard) => {
                f(&mut guard);
                true
            }
            Err(_) => false,
        }
    }

    pub fn set_carried_slot(&mut self, requested: i32) {
        self.carried_slot = requested.clamp(0, 8) as u8;
    }

    /// Hotbar slot indices 36-44 map onto carried-slot space 0-8.
    pub fn set_carried_slot_from_hotbar_index(&mut self, hotbar_index: i32) {
        self.set_carried_slot(hotbar_index - 36);
    }

    /// Reads the input mailbox (skipping if contended) and advances the
    /// teleport handshake / stages the next pose.
    pub fn reconcile(&mut self, viewer: &dyn PlayerViewer) -> ReconcileOutcome {
        let inputs = match self.inputs.try_lock() {
            Ok(guard) => *guard,
            Err(_) => return ReconcileOutcome::Skipped,
        };

        match self.teleport {
            TeleportState::Teleporting { id, target } => {
                if inputs.teleport_id_ack == Some(id) {
                    self.pos0 = target.0;
                    self.rot0 = target.1;
                    self.teleport = TeleportState::Synced;
                }
                ReconcileOutcome::Ok
            }
            TeleportState::Synced => {
                if self.position.distance(&inputs.pos) > TELEPORT_REVERT_THRESHOLD {
                    let id = viewer.alloc_teleport_id();
                    let target_pos = self.position;
                    let target_rot = self.rotation;
                    self.teleport = TeleportState::Teleporting {
                        id,
                        target: (target_pos, target_rot),
                    };
                    ReconcileOutcome::Teleport { id, target_pos, target_rot }
                } else if inputs.pos.y < FALL_RESCUE_Y {
                    // The submitted x/z rode along with an out-of-bounds
                    // fall, so they're untrusted too; rescue back to the
                    // last authoritative x/z, only replacing y.
                    let target_pos = Vector3f::new(self.position.x, FALL_RESCUE_TARGET_Y, self.position.z);
                    let id = viewer.alloc_teleport_id();
                    let target_rot = self.rotation;
                    self.teleport = TeleportState::Teleporting {
                        id,
                        target: (target_pos, target_rot),
                    };
                    ReconcileOutcome::Teleport { id, target_pos, target_rot }
                } else if is_valid_movement(&inputs.pos) {
                    self.pos0 = inputs.pos;
                    self.rot0 = inputs.rot;
                    self.on_ground = inputs.on_ground;
                    ReconcileOutcome::Ok
                } else {
                    ReconcileOutcome::Disconnect("invalid movement")
                }
            }
        }
    }

    /// Commits the staged pose, the second half of the per-tick
    /// reconcile/commit cycle.
    pub fn commit_pose(&mut self) {
        self.position = self.pos0;
        self.rotation = self.rot0;
    }
}

fn is_valid_movement(pos: &Vector3f) -> bool {
    pos.is_finite() && pos.x.abs() < MAX_COORD && pos.y.abs() < MAX_COORD && pos.z.abs() < MAX_COORD
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewer() -> crate::viewer::RecordingViewer {
        crate::viewer::RecordingViewer::new()
    }

    #[test]
    fn large_delta_triggers_revert_teleport() {
        let mut player = Player::new(1, Uuid::nil(), Vector3f::new(0.0, 64.0, 0.0), (Angle::new(0.0), Angle::new(0.0)));
        player.try_write_inputs(|i| i.pos = Vector3f::new(500.0, 64.0, 0.0));

        let v = viewer();
        match player.reconcile(&v) {
            ReconcileOutcome::Teleport { .. } => {}
            _ => panic!("expected Teleport"),
        }
        assert!(matches!(player.teleport, TeleportState::Teleporting { .. }));
    }

    #[test]
    fn fall_below_threshold_rescues_to_last_good_x_z_at_y_100() {
        let mut player = Player::new(1, Uuid::nil(), Vector3f::new(10.0, 64.0, -3.0), (Angle::new(0.0), Angle::new(0.0)));
        player.try_write_inputs(|i| i.pos = Vector3f::new(9999.0, -200.0, 9999.0));

        let v = viewer();
        player.reconcile(&v);
        match player.teleport {
            TeleportState::Teleporting { target, .. } => {
                assert_eq!(target.0, Vector3f::new(10.0, 100.0, -3.0));
            }
            TeleportState::Synced => panic!("expected Teleporting"),
        }
    }

    #[test]
    fn teleport_commits_exactly_on_matching_ack() {
        let mut player = Player::new(1, Uuid::nil(), Vector3f::new(0.0, 64.0, 0.0), (Angle::new(0.0), Angle::new(0.0)));
        player.teleport = TeleportState::Teleporting {
            id: 7,
            target: (Vector3f::new(100.0, 70.0, 100.0), (Angle::new(0.0), Angle::new(0.0))),
        };

        let v = viewer();
        player.try_write_inputs(|i| i.teleport_id_ack = Some(9));
        player.reconcile(&v);
        assert!(matches!(player.teleport, TeleportState::Teleporting { .. }));

        player.try_write_inputs(|i| i.teleport_id_ack = Some(7));
        player.reconcile(&v);
        assert!(matches!(player.teleport, TeleportState::Synced));
        player.commit_pose();
        assert_eq!(player.position, Vector3f::new(100.0, 70.0, 100.0));
    }

    #[test]
    fn hotbar_index_maps_into_carried_slot_range() {
        let mut player = Player::new(1, Uuid::nil(), Vector3f::new(0.0, 0.0, 0.0), (Angle::new(0.0), Angle::new(0.0)));
        player.set_carried_slot_from_hotbar_index(40);
        assert_eq!(player.carried_slot, 4);

        player.set_carried_slot(999);
        assert_eq!(player.carried_slot, 8);
    }
}
