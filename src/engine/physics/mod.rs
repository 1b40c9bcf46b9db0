// Physics system using rapier3d

pub mod body;
mod collision;
mod oracle;
mod world;

pub use body::{ColliderHandle, RigidBodyHandle};
pub use collision::{CollisionEvent, CollisionGroups};
pub use oracle::{
    ContactKind, EntityId, MotionOutput, MotionSink, PhysicsOracle, Pose, WeaponContact,
};
pub use world::{CharacterHandles, ColliderRole, PhysicsWorld};

#[cfg(test)]
pub(crate) use oracle::stub;
