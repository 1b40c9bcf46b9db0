// Lock-on targeting
//
// Holds at most one target id. The target is looked up by id every tick and
// never owned, so a despawned or dead target simply fails the next check.

use glam::{Quat, Vec3};

use crate::core::math::forward;
use crate::engine::physics::EntityId;
use crate::game::combat::LockReleaseReason;
use crate::game::config::{LockOnConfig, TargetSelection};

/// Oriented box used to look for candidates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeBox {
    pub center: Vec3,
    pub half_extents: Vec3,
    pub rotation: Quat,
}

/// What the validity check needs to know about the current target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LockTargetView {
    pub position: Vec3,
    pub alive: bool,
}

/// Result of the per-tick validity check
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LockCheck {
    Unlocked,
    /// Still locked; `direction` is the unit vector target -> camera
    Held { direction: Option<Vec3> },
    Released {
        target: EntityId,
        reason: LockReleaseReason,
    },
}

#[derive(Debug, Clone, Default)]
pub struct LockOnTargeting {
    config: LockOnConfig,
    target: Option<EntityId>,
}

impl LockOnTargeting {
    pub fn new(config: LockOnConfig) -> Self {
        Self {
            config,
            target: None,
        }
    }

    pub fn config(&self) -> &LockOnConfig {
        &self.config
    }

    pub fn target(&self) -> Option<EntityId> {
        self.target
    }

    pub fn is_locked(&self) -> bool {
        self.target.is_some()
    }

    pub fn bind(&mut self, target: EntityId) {
        self.target = Some(target);
    }

    /// Drop the target, returning what was held
    pub fn release(&mut self) -> Option<EntityId> {
        self.target.take()
    }

    /// Acquisition box in front of a camera
    pub fn probe(&self, camera_position: Vec3, camera_rotation: Quat) -> ProbeBox {
        ProbeBox {
            center: camera_position
                + Vec3::new(0.0, self.config.probe_height, 0.0)
                + forward(camera_rotation) * self.config.probe_forward_offset,
            half_extents: self.config.probe_half_extents(),
            rotation: camera_rotation,
        }
    }

    /// Validate the held target against range, angle and liveness.
    /// Releases the lock when any check fails.
    pub fn check(&mut self, camera_position: Vec3, target: Option<LockTargetView>) -> LockCheck {
        let Some(id) = self.target else {
            return LockCheck::Unlocked;
        };

        let reason = match target {
            None => Some(LockReleaseReason::TargetLost),
            Some(view) if !view.alive => Some(LockReleaseReason::TargetDead),
            Some(view) => self.geometry_violation(camera_position - view.position),
        };

        if let Some(reason) = reason {
            self.target = None;
            return LockCheck::Released { target: id, reason };
        }

        let direction = target.and_then(|view| (camera_position - view.position).try_normalize());
        LockCheck::Held { direction }
    }

    fn geometry_violation(&self, offset: Vec3) -> Option<LockReleaseReason> {
        if offset.length() > self.config.release_distance() {
            return Some(LockReleaseReason::OutOfRange);
        }
        let y = offset.try_normalize()?.y;
        let low = -self.config.max_elevation.to_radians().sin();
        let high = self.config.max_depression.to_radians().sin();
        if y < low || y > high {
            return Some(LockReleaseReason::OutOfAngle);
        }
        None
    }
}

/// Pick one candidate according to the selection policy. Candidates are
/// already filtered and listed in query order.
pub fn select_target(
    policy: TargetSelection,
    origin: Vec3,
    candidates: impl IntoIterator<Item = (EntityId, Vec3)>,
) -> Option<EntityId> {
    let mut candidates = candidates.into_iter();
    match policy {
        TargetSelection::FirstHit => candidates.next().map(|(id, _)| id),
        TargetSelection::Nearest => candidates
            .min_by(|(_, a), (_, b)| {
                origin
                    .distance_squared(*a)
                    .total_cmp(&origin.distance_squared(*b))
            })
            .map(|(id, _)| id),
    }
}
