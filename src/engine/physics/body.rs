use super::collision::CollisionGroups;
use rapier3d::prelude::*;

pub use rapier3d::prelude::{ColliderHandle, RigidBodyHandle};

/// Builder for creating rigid bodies with common configurations
pub struct BodyBuilder {
    body_type: RigidBodyType,
    position: Isometry<Real>,
    gravity_scale: Real,
    can_sleep: bool,
    locked_axes: LockedAxes,
    linear_damping: Real,
}

impl BodyBuilder {
    /// Create a new dynamic body (affected by forces and collisions)
    pub fn new_dynamic() -> Self {
        Self {
            body_type: RigidBodyType::Dynamic,
            position: Isometry::identity(),
            gravity_scale: 1.0,
            can_sleep: true,
            locked_axes: LockedAxes::empty(),
            linear_damping: 0.5,
        }
    }

    /// Create a new fixed (static) body (completely immovable)
    pub fn new_fixed() -> Self {
        Self {
            body_type: RigidBodyType::Fixed,
            position: Isometry::identity(),
            gravity_scale: 0.0,
            can_sleep: false,
            locked_axes: LockedAxes::empty(),
            linear_damping: 0.0,
        }
    }

    /// Set the initial position of the body
    pub fn position(mut self, x: Real, y: Real, z: Real) -> Self {
        self.position = Isometry::translation(x, y, z);
        self
    }

    /// Set the initial position and orientation
    pub fn isometry(mut self, isometry: Isometry<Real>) -> Self {
        self.position = isometry;
        self
    }

    /// Set the gravity scale (1.0 = normal gravity, 0.0 = no gravity)
    pub fn gravity_scale(mut self, scale: Real) -> Self {
        self.gravity_scale = scale;
        self
    }

    /// Set whether the body can sleep when inactive
    pub fn can_sleep(mut self, can_sleep: bool) -> Self {
        self.can_sleep = can_sleep;
        self
    }

    /// Lock rotation; facing is driven by the character controller
    pub fn lock_rotation(mut self) -> Self {
        self.locked_axes = LockedAxes::ROTATION_LOCKED;
        self
    }

    pub fn linear_damping(mut self, damping: Real) -> Self {
        self.linear_damping = damping;
        self
    }

    /// Build the rigid body
    pub fn build(self) -> RigidBody {
        RigidBodyBuilder::new(self.body_type)
            .position(self.position)
            .gravity_scale(self.gravity_scale)
            .can_sleep(self.can_sleep)
            .locked_axes(self.locked_axes)
            .linear_damping(self.linear_damping)
            .build()
    }
}

/// Builder for creating colliders with common configurations
pub struct ColliderBuilder3D {
    shape: SharedShape,
    offset: Isometry<Real>,
    collision_groups: CollisionGroups,
    is_sensor: bool,
    friction: Real,
    density: Option<Real>,
    mass: Option<Real>,
    active_events: ActiveEvents,
}

impl ColliderBuilder3D {
    fn with_shape(shape: SharedShape) -> Self {
        Self {
            shape,
            offset: Isometry::identity(),
            collision_groups: CollisionGroups::Environment,
            is_sensor: false,
            friction: 0.5,
            density: Some(1.0),
            mass: None,
            active_events: ActiveEvents::empty(),
        }
    }

    /// Create a box-shaped collider
    pub fn cuboid(half_x: Real, half_y: Real, half_z: Real) -> Self {
        Self::with_shape(SharedShape::cuboid(half_x, half_y, half_z))
    }

    /// Create an upright capsule (good for characters)
    pub fn capsule(half_height: Real, radius: Real) -> Self {
        Self::with_shape(SharedShape::capsule_y(half_height, radius))
    }

    /// Place the collider relative to its parent body
    pub fn offset(mut self, x: Real, y: Real, z: Real) -> Self {
        self.offset = Isometry::translation(x, y, z);
        self
    }

    /// Set the collision groups for filtering
    pub fn collision_groups(mut self, groups: CollisionGroups) -> Self {
        self.collision_groups = groups;
        self
    }

    /// Make this a sensor that reports overlaps and never pushes.
    /// Sensors carry no mass.
    pub fn sensor(mut self) -> Self {
        self.is_sensor = true;
        self.density = Some(0.0);
        self.mass = None;
        self.active_events = ActiveEvents::COLLISION_EVENTS;
        self
    }

    /// Set friction coefficient (0.0 = no friction, 1.0 = high friction)
    pub fn friction(mut self, friction: Real) -> Self {
        self.friction = friction;
        self
    }

    /// Set mass directly (overrides density)
    pub fn mass(mut self, mass: Real) -> Self {
        self.mass = Some(mass);
        self.density = None;
        self
    }

    /// Build the collider
    pub fn build(self) -> Collider {
        let mut builder = ColliderBuilder::new(self.shape)
            .position(self.offset)
            .collision_groups(self.collision_groups.to_interaction_groups())
            .sensor(self.is_sensor)
            .friction(self.friction)
            .active_events(self.active_events);

        if let Some(mass) = self.mass {
            builder = builder.mass(mass);
        } else if let Some(density) = self.density {
            builder = builder.density(density);
        }

        builder.build()
    }
}

/// Common configurations for duel participants and arenas
pub mod presets {
    use super::*;

    /// Capsule height of a humanoid, feet to head
    pub const CHARACTER_HEIGHT: Real = 1.8;
    pub const CHARACTER_RADIUS: Real = 0.3;
    pub const CHARACTER_MASS: Real = 70.0;

    /// Character body: dynamic, rotation locked, origin at the feet
    pub fn character_body(isometry: Isometry<Real>) -> RigidBody {
        BodyBuilder::new_dynamic()
            .isometry(isometry)
            .lock_rotation()
            .can_sleep(false)
            .build()
    }

    /// Movement capsule
    pub fn character_collider() -> Collider {
        let half_height = CHARACTER_HEIGHT / 2.0 - CHARACTER_RADIUS;
        ColliderBuilder3D::capsule(half_height, CHARACTER_RADIUS)
            .offset(0.0, CHARACTER_HEIGHT / 2.0, 0.0)
            .collision_groups(CollisionGroups::Character)
            .friction(0.0)
            .mass(CHARACTER_MASS)
            .build()
    }

    /// Damage-receiving sensor, slightly larger than the capsule
    pub fn hurtbox_collider() -> Collider {
        let radius = CHARACTER_RADIUS + 0.1;
        let half_height = CHARACTER_HEIGHT / 2.0 - radius;
        ColliderBuilder3D::capsule(half_height, radius)
            .offset(0.0, CHARACTER_HEIGHT / 2.0, 0.0)
            .collision_groups(CollisionGroups::Hurtbox)
            .sensor()
            .build()
    }

    /// Blade held in front of the right hand
    pub fn weapon_collider() -> Collider {
        ColliderBuilder3D::cuboid(0.05, 0.05, 0.5)
            .offset(0.3, 1.1, 0.8)
            .collision_groups(CollisionGroups::Weapon)
            .sensor()
            .build()
    }

    /// Ground slab whose top face sits at y = 0
    pub fn ground_body() -> RigidBody {
        BodyBuilder::new_fixed().position(0.0, -0.5, 0.0).build()
    }

    pub fn ground_collider(half_extent: Real) -> Collider {
        ColliderBuilder3D::cuboid(half_extent, 0.5, half_extent)
            .collision_groups(CollisionGroups::Environment)
            .friction(0.8)
            .build()
    }
}
