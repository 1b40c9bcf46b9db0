// Combat outcomes queued for presentation layers (UI, audio)

use crate::engine::physics::EntityId;

/// Why a lock was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockReleaseReason {
    /// Explicit unlock command
    Requested,
    OutOfRange,
    OutOfAngle,
    TargetDead,
    /// Target no longer exists
    TargetLost,
    /// The lock holder died or started an execution
    HolderBusy,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CombatEvent {
    Hit {
        attacker: EntityId,
        defender: EntityId,
        damage: f32,
        remaining_hp: f32,
    },
    Died {
        victim: EntityId,
    },
    Stunned {
        victim: EntityId,
        by: EntityId,
    },
    Executed {
        executor: EntityId,
        victim: EntityId,
        damage: f32,
    },
    /// Survived an execution and regained control
    Recovered {
        victim: EntityId,
    },
    LockAcquired {
        holder: EntityId,
        target: EntityId,
    },
    LockReleased {
        holder: EntityId,
        target: EntityId,
        reason: LockReleaseReason,
    },
}
