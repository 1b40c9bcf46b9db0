// Contract between the combat core and the physics/collision collaborator

use glam::{Quat, Vec3};

/// Identity shared by a character and every collider it owns
pub type EntityId = u32;

/// World-space position and orientation of an entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Pose {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Quat::IDENTITY)
    }
}

/// What a weapon is touching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContactKind {
    /// Another character's hurtbox
    Hurtbox,
    /// Another character's weapon
    Weapon,
}

/// One weapon overlap active during the last physics step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WeaponContact {
    pub weapon_owner: EntityId,
    pub other: EntityId,
    pub kind: ContactKind,
}

/// Movement produced by the core for one character and one tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MotionOutput {
    /// World-space displacement for this tick
    pub translation: Vec3,
    /// Facing to adopt
    pub rotation: Option<Quat>,
    /// Instant velocity change, world space
    pub velocity_change: Vec3,
    /// Hard placement applied before the displacement
    pub teleport: Option<Pose>,
}

impl MotionOutput {
    pub fn is_empty(&self) -> bool {
        self.translation == Vec3::ZERO
            && self.rotation.is_none()
            && self.velocity_change == Vec3::ZERO
            && self.teleport.is_none()
    }
}

/// Read-only spatial queries
pub trait PhysicsOracle {
    /// Characters whose body overlaps an oriented box. Order is backend-defined.
    fn overlap_box(&self, center: Vec3, half_extents: Vec3, rotation: Quat) -> Vec<EntityId>;

    /// First environment hit on the segment `from -> to`
    fn linecast(&self, from: Vec3, to: Vec3) -> Option<Vec3>;

    /// Weapon overlaps active after the last step
    fn weapon_contacts(&self) -> Vec<WeaponContact>;

    fn entity_pose(&self, id: EntityId) -> Option<Pose>;
}

/// Consumer of the movement the core emits
pub trait MotionSink {
    fn apply_motion(&mut self, id: EntityId, motion: &MotionOutput);

    /// Advance the physics simulation by `dt` seconds
    fn step(&mut self, dt: f32);

    /// Create the body and colliders of a character
    fn spawn_entity(&mut self, _id: EntityId, _pose: Pose) {}

    /// Forget an entity and its colliders
    fn remove_entity(&mut self, _id: EntityId) {}
}
