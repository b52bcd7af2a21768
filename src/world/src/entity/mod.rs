use strata_math::{Angle, Vector3f};
use uuid::Uuid;

use crate::id::EntityId;

#[derive(Debug, Clone)]
pub enum EntityKind {
    Player(Uuid),
    Simple(String),
}

/// A replicated entity's pose, shared between players and
/// [`SimpleEntity`]s — the unit replication computes motion deltas for.
#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub pos: Vector3f,
    pub rot: (Angle, Angle),
    pub on_ground: bool,
    pub velocity: Option<Vector3f>,
}

impl Entity {
    pub fn is_player(&self) -> bool {
        matches!(self.kind, EntityKind::Player(_))
    }

    pub fn type_name(&self) -> &str {
        match &self.kind {
            EntityKind::Player(_) => "player",
            EntityKind::Simple(type_name) => type_name,
        }
    }
}

/// Orbit parameters for a [`SimpleEntity`] that circles a player.
#[derive(Debug, Clone, Copy)]
pub struct Orbit {
    pub center_player: EntityId,
    pub radius: f64,
    pub angular_speed: f64,
    pub angle: f64,
}

impl Orbit {
    pub fn new(center_player: EntityId, radius: f64, angular_speed: f64) -> Self {
        Self {
            center_player,
            radius,
            angular_speed,
            angle: 0.0,
        }
    }

    /// Advances one tick, returning the staged position and velocity.
    pub fn step(&mut self, center_pos: Vector3f) -> (Vector3f, Vector3f) {
        self.angle += self.angular_speed;

        let pos = Vector3f::new(
            center_pos.x + self.radius * self.angle.cos(),
            center_pos.y,
            center_pos.z + self.radius * self.angle.sin(),
        );

        let velocity = Vector3f::new(
            -self.radius * self.angular_speed * self.angle.sin(),
            0.0,
            self.radius * self.angular_speed * self.angle.cos(),
        );

        (pos, velocity)
    }

    pub fn yaw_degrees(&self) -> f32 {
        ((self.angle + std::f64::consts::FRAC_PI_2) * 180.0 / std::f64::consts::PI) as f32
    }
}

/// The sole non-player entity kind in scope: created at world-init near
/// spawn or per-tick near players, never destroyed.
pub struct SimpleEntity {
    pub entity: Entity,
    pub orbit: Option<Orbit>,
    pub last_broadcast_velocity: Option<Vector3f>,
}

impl SimpleEntity {
    pub fn new(entity: Entity, orbit: Option<Orbit>) -> Self {
        Self {
            entity,
            orbit,
            last_broadcast_velocity: None,
        }
    }

    /// True if `velocity` differs from the last broadcast one by more
    /// than the component-wise threshold — governs whether a new
    /// `SetEntityMotion` is worth sending.
    pub fn velocity_changed_enough(&self, velocity: Vector3f) -> bool {
        const THRESHOLD: f64 = 1e-3;
        match self.last_broadcast_velocity {
            None => true,
            Some(last) => {
                (velocity.x - last.x).abs() > THRESHOLD
                    || (velocity.y - last.y).abs() > THRESHOLD
                    || (velocity.z - last.z).abs() > THRESHOLD
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orbit_step_advances_angle_and_broadcasts_tangential_velocity() {
        let mut orbit = Orbit::new(1, 12.0, 0.05);
        let center = Vector3f::new(0.0, 64.0, 0.0);

        let (pos, velocity) = orbit.step(center);

        assert!((orbit.angle - 0.05).abs() < 1e-9);
        assert!((pos.x - 12.0 * 0.05f64.cos()).abs() < 1e-9);
        assert!((pos.z - 12.0 * 0.05f64.sin()).abs() < 1e-9);

        let speed = (velocity.x.powi(2) + velocity.z.powi(2)).sqrt();
        assert!((speed - 0.6).abs() < 1e-3);
    }

    #[test]
    fn velocity_threshold_suppresses_tiny_changes() {
        let entity = SimpleEntity::new(
            Entity {
                id: 1,
                kind: EntityKind::Simple("orb".into()),
                pos: Vector3f::origin(),
                rot: (Angle::new(0.0), Angle::new(0.0)),
                on_ground: false,
                velocity: None,
            },
            None,
        );

        assert!(entity.velocity_changed_enough(Vector3f::new(1.0, 0.0, 0.0)));
    }
}
