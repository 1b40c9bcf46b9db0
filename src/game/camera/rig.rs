// Third-person camera rig
//
// Orbits a pivot above the character. The pivot's yaw is the frame the
// character moves in; while locked the rig swings around to keep the target
// between camera and pivot.

use glam::{Quat, Vec2, Vec3};

use crate::core::math::{flatten, look_rotation, right};
use crate::engine::physics::{EntityId, PhysicsOracle, Pose};
use crate::game::config::{CameraConfig, LockOnConfig};

use super::lock_on::{LockCheck, LockOnTargeting, LockTargetView, ProbeBox};

#[derive(Debug, Clone)]
pub struct CameraRig {
    config: CameraConfig,
    lock: LockOnTargeting,

    distance: f32,
    /// Unit vector pivot -> camera
    direction: Vec3,
    /// Degrees per tick, x = yaw, y = pitch. Held until the next input.
    rotate_rate: Vec2,
    /// Zoom per tick. Held until the next input.
    distance_rate: f32,

    pivot_position: Vec3,
    pivot_rotation: Quat,
    position: Vec3,
    rotation: Quat,
}

impl CameraRig {
    pub fn new(config: CameraConfig, lock_on: LockOnConfig, owner: Pose) -> Self {
        let direction = (owner.rotation * config.initial_direction)
            .try_normalize()
            .unwrap_or(Vec3::NEG_Z);
        let pivot_position = pivot_of(owner, config.pivot_height);
        let distance = config
            .free_distance
            .clamp(config.min_distance, config.max_distance);

        let mut rig = Self {
            config,
            lock: LockOnTargeting::new(lock_on),
            distance,
            direction,
            rotate_rate: Vec2::ZERO,
            distance_rate: 0.0,
            pivot_position,
            pivot_rotation: Quat::IDENTITY,
            position: pivot_position + direction * distance,
            rotation: Quat::IDENTITY,
        };
        rig.orient();
        rig
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn pivot_position(&self) -> Vec3 {
        self.pivot_position
    }

    /// Yaw-only rotation of the pivot; the movement frame
    pub fn pivot_rotation(&self) -> Quat {
        self.pivot_rotation
    }

    pub fn is_locked(&self) -> bool {
        self.lock.is_locked()
    }

    pub fn lock_target(&self) -> Option<EntityId> {
        self.lock.target()
    }

    pub fn lock_config(&self) -> &LockOnConfig {
        self.lock.config()
    }

    /// Box searched by a lock request
    pub fn lock_probe(&self) -> ProbeBox {
        self.lock.probe(self.position, self.rotation)
    }

    pub fn bind_lock(&mut self, target: EntityId) {
        self.lock.bind(target);
        self.rotate_rate = Vec2::ZERO;
    }

    pub fn release_lock(&mut self) -> Option<EntityId> {
        self.lock.release()
    }

    /// Orbit input; ignored while locked
    pub fn sight_pos_change(&mut self, delta: Vec2, dt: f32) {
        self.rotate_rate = if self.is_locked() {
            Vec2::ZERO
        } else {
            delta * self.config.rotate_speed * dt
        };
    }

    /// Zoom input; positive values pull the camera in
    pub fn sight_distance_change(&mut self, delta: f32, dt: f32) {
        self.distance_rate = delta * self.config.distance_speed * dt;
    }

    /// Per-tick update: zoom, lock validity, orbit, occlusion.
    pub fn update(
        &mut self,
        owner: Pose,
        target: Option<LockTargetView>,
        physics: &dyn PhysicsOracle,
    ) -> LockCheck {
        if self.config.can_control_distance {
            self.distance = (self.distance - self.distance_rate)
                .clamp(self.config.min_distance, self.config.max_distance);
        }

        let check = self.lock.check(self.position, target);
        match check {
            LockCheck::Held {
                direction: Some(direction),
            } => self.direction = direction,
            LockCheck::Unlocked => self.orbit(),
            LockCheck::Held { direction: None } | LockCheck::Released { .. } => {}
        }

        self.pivot_position = pivot_of(owner, self.config.pivot_height);
        self.place(physics);
        check
    }

    fn orbit(&mut self) {
        let pitch =
            Quat::from_axis_angle(right(self.rotation), (-self.rotate_rate.y).to_radians());
        let pitched = pitch * self.direction;
        let low = -self.config.max_elevation.to_radians().sin();
        let high = self.config.max_depression.to_radians().sin();
        if pitched.y >= low && pitched.y <= high {
            self.direction = pitched;
        }

        let yaw = Quat::from_rotation_y(self.rotate_rate.x.to_radians());
        self.direction = (yaw * self.direction)
            .try_normalize()
            .unwrap_or(self.direction);
    }

    fn place(&mut self, physics: &dyn PhysicsOracle) {
        let predicted = self.pivot_position + self.direction * self.distance;
        self.position = match physics.linecast(self.pivot_position, predicted) {
            Some(hit) => {
                self.pivot_position + (hit - self.pivot_position) * self.config.occlusion_pull_in
            }
            None => predicted,
        };
        self.orient();
    }

    fn orient(&mut self) {
        self.rotation = look_rotation(-self.direction);
        let flat = flatten(self.direction);
        if flat.length_squared() > f32::EPSILON {
            self.pivot_rotation = look_rotation(-flat);
        }
    }
}

/// Look pivot of a character standing at `owner`
pub fn pivot_of(owner: Pose, pivot_height: f32) -> Vec3 {
    owner.position + Vec3::new(0.0, pivot_height, 0.0)
}
