use glam::{Quat, Vec3};
use rapier3d::na::{Quaternion, Translation3, UnitQuaternion};
use rapier3d::prelude::*;
use std::collections::{BTreeMap, HashMap};

use super::body::presets;
use super::collision::{ActiveOverlaps, CollisionEventQueue, CollisionGroups};
use super::oracle::{
    ContactKind, EntityId, MotionOutput, MotionSink, PhysicsOracle, Pose, WeaponContact,
};

/// Role of a collider owned by a character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColliderRole {
    Body,
    Hurtbox,
    Weapon,
}

/// Handles created for one character
#[derive(Debug, Clone, Copy)]
pub struct CharacterHandles {
    pub body: RigidBodyHandle,
    pub capsule: ColliderHandle,
    pub hurtbox: ColliderHandle,
    pub weapon: ColliderHandle,
}

pub fn to_isometry(position: Vec3, rotation: Quat) -> Isometry<Real> {
    let rotation = UnitQuaternion::new_normalize(Quaternion::new(
        rotation.w, rotation.x, rotation.y, rotation.z,
    ));
    Isometry::from_parts(Translation3::new(position.x, position.y, position.z), rotation)
}

pub fn to_pose(isometry: &Isometry<Real>) -> Pose {
    let t = isometry.translation.vector;
    let q = isometry.rotation.quaternion().coords;
    Pose::new(Vec3::new(t.x, t.y, t.z), Quat::from_xyzw(q.x, q.y, q.z, q.w))
}

/// Physics world that manages all physics simulation
pub struct PhysicsWorld {
    /// Gravity vector (default: -9.81 m/s² in y-axis)
    gravity: Vector<Real>,

    /// Integration parameters for the physics simulation
    integration_parameters: IntegrationParameters,

    /// Physics pipeline handles collision detection and solving
    physics_pipeline: PhysicsPipeline,

    /// Island manager for sleeping bodies
    island_manager: IslandManager,

    /// Broad phase collision detection
    broad_phase: DefaultBroadPhase,

    /// Narrow phase collision detection
    narrow_phase: NarrowPhase,

    /// Impulse joint set
    impulse_joint_set: ImpulseJointSet,

    /// Multibody joint set
    multibody_joint_set: MultibodyJointSet,

    /// CCD solver for fast-moving objects
    ccd_solver: CCDSolver,

    /// Query pipeline for overlap and ray queries
    query_pipeline: QueryPipeline,

    /// Rigid body set
    rigid_body_set: RigidBodySet,

    /// Collider set
    collider_set: ColliderSet,

    /// Collision event handler
    collision_event_queue: CollisionEventQueue,

    /// Sensor pairs currently overlapping
    overlaps: ActiveOverlaps,

    /// Character handles by entity
    characters: BTreeMap<EntityId, CharacterHandles>,

    /// Owner and role of every character collider
    collider_owners: HashMap<ColliderHandle, (EntityId, ColliderRole)>,
}

impl PhysicsWorld {
    /// Create a new physics world with default settings
    pub fn new() -> Self {
        Self::with_gravity(vector![0.0, -9.81, 0.0])
    }

    /// Create a new physics world with custom gravity
    pub fn with_gravity(gravity: Vector<Real>) -> Self {
        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.dt = 1.0 / 60.0;

        Self {
            gravity,
            integration_parameters,
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            collision_event_queue: CollisionEventQueue::new(),
            overlaps: ActiveOverlaps::default(),
            characters: BTreeMap::new(),
            collider_owners: HashMap::new(),
        }
    }

    /// Add a flat square arena floor with its top face at y = 0
    pub fn add_ground(&mut self, half_extent: Real) -> ColliderHandle {
        let body = self.rigid_body_set.insert(presets::ground_body());
        self.collider_set.insert_with_parent(
            presets::ground_collider(half_extent),
            body,
            &mut self.rigid_body_set,
        )
    }

    /// Create the body, hurtbox, and weapon of a character
    pub fn spawn_character(&mut self, id: EntityId, pose: Pose) -> CharacterHandles {
        if self.characters.contains_key(&id) {
            log::warn!("Entity {} already has a physics body, replacing it", id);
            self.remove_entity(id);
        }

        let body = self
            .rigid_body_set
            .insert(presets::character_body(to_isometry(pose.position, pose.rotation)));
        let capsule = self.add_collider(presets::character_collider(), body);
        let hurtbox = self.add_collider(presets::hurtbox_collider(), body);
        let weapon = self.add_collider(presets::weapon_collider(), body);

        self.collider_owners.insert(capsule, (id, ColliderRole::Body));
        self.collider_owners.insert(hurtbox, (id, ColliderRole::Hurtbox));
        self.collider_owners.insert(weapon, (id, ColliderRole::Weapon));

        let handles = CharacterHandles {
            body,
            capsule,
            hurtbox,
            weapon,
        };
        self.characters.insert(id, handles);
        log::debug!("Spawned physics body for entity {} at {}", id, pose.position);
        handles
    }

    fn add_collider(&mut self, collider: Collider, parent: RigidBodyHandle) -> ColliderHandle {
        self.collider_set
            .insert_with_parent(collider, parent, &mut self.rigid_body_set)
    }

    /// Owner and role of a collider
    pub fn collider_owner(&self, handle: ColliderHandle) -> Option<(EntityId, ColliderRole)> {
        self.collider_owners.get(&handle).copied()
    }

    fn entity_of(&self, handle: ColliderHandle) -> Option<EntityId> {
        self.collider_owners.get(&handle).map(|(id, _)| *id)
    }

    fn contact_between(
        &self,
        a: ColliderHandle,
        b: ColliderHandle,
    ) -> Option<WeaponContact> {
        let (owner, role_a) = self.collider_owner(a)?;
        let (other, role_b) = self.collider_owner(b)?;
        if owner == other || role_a != ColliderRole::Weapon {
            return None;
        }
        let kind = match role_b {
            ColliderRole::Hurtbox => ContactKind::Hurtbox,
            ColliderRole::Weapon => ContactKind::Weapon,
            ColliderRole::Body => return None,
        };
        Some(WeaponContact {
            weapon_owner: owner,
            other,
            kind,
        })
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsOracle for PhysicsWorld {
    fn overlap_box(&self, center: Vec3, half_extents: Vec3, rotation: Quat) -> Vec<EntityId> {
        let shape = Cuboid::new(vector![half_extents.x, half_extents.y, half_extents.z]);
        let shape_pos = to_isometry(center, rotation);
        let filter = QueryFilter::default()
            .exclude_sensors()
            .groups(CollisionGroups::query(CollisionGroups::Character));

        let mut found = Vec::new();
        self.query_pipeline.intersections_with_shape(
            &self.rigid_body_set,
            &self.collider_set,
            &shape_pos,
            &shape,
            filter,
            |handle| {
                if let Some(id) = self.entity_of(handle) {
                    if !found.contains(&id) {
                        found.push(id);
                    }
                }
                true
            },
        );
        found
    }

    fn linecast(&self, from: Vec3, to: Vec3) -> Option<Vec3> {
        let delta = to - from;
        let length = delta.length();
        if length <= f32::EPSILON {
            return None;
        }
        let dir = delta / length;

        let ray = Ray::new(point![from.x, from.y, from.z], vector![dir.x, dir.y, dir.z]);
        let filter = QueryFilter::default()
            .exclude_sensors()
            .groups(CollisionGroups::query(CollisionGroups::Environment));

        self.query_pipeline
            .cast_ray(
                &self.rigid_body_set,
                &self.collider_set,
                &ray,
                length,
                true,
                filter,
            )
            .map(|(_, toi)| from + dir * toi)
    }

    fn weapon_contacts(&self) -> Vec<WeaponContact> {
        let mut contacts: Vec<WeaponContact> = self
            .overlaps
            .iter()
            .flat_map(|&(a, b)| [self.contact_between(a, b), self.contact_between(b, a)])
            .flatten()
            .collect();
        contacts.sort();
        contacts.dedup();
        contacts
    }

    fn entity_pose(&self, id: EntityId) -> Option<Pose> {
        let handles = self.characters.get(&id)?;
        let body = self.rigid_body_set.get(handles.body)?;
        Some(to_pose(body.position()))
    }
}

impl MotionSink for PhysicsWorld {
    fn apply_motion(&mut self, id: EntityId, motion: &MotionOutput) {
        let Some(handles) = self.characters.get(&id) else {
            log::trace!("No physics body for entity {}", id);
            return;
        };
        let Some(body) = self.rigid_body_set.get_mut(handles.body) else {
            return;
        };

        if let Some(teleport) = motion.teleport {
            body.set_position(to_isometry(teleport.position, teleport.rotation), true);
            body.set_linvel(vector![0.0, 0.0, 0.0], true);
        }

        if motion.translation != Vec3::ZERO {
            let next = *body.translation()
                + vector![motion.translation.x, motion.translation.y, motion.translation.z];
            body.set_translation(next, true);
        }

        if let Some(rotation) = motion.rotation {
            let current = to_pose(body.position());
            body.set_rotation(to_isometry(current.position, rotation).rotation, true);
        }

        if motion.velocity_change != Vec3::ZERO {
            let change = motion.velocity_change;
            let linvel = *body.linvel() + vector![change.x, change.y, change.z];
            body.set_linvel(linvel, true);
        }
    }

    fn step(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;

        // Clear previous step's collision events
        self.collision_event_queue.clear();

        let event_handler = &self.collision_event_queue;

        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            event_handler,
        );

        let events = self.collision_event_queue.events();
        self.overlaps.apply(&events);
    }

    fn spawn_entity(&mut self, id: EntityId, pose: Pose) {
        self.spawn_character(id, pose);
    }

    fn remove_entity(&mut self, id: EntityId) {
        let Some(handles) = self.characters.remove(&id) else {
            return;
        };
        for collider in [handles.capsule, handles.hurtbox, handles.weapon] {
            self.collider_owners.remove(&collider);
            self.overlaps.forget(collider);
        }
        self.rigid_body_set.remove(
            handles.body,
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            true, // remove attached colliders
        );
        log::debug!("Removed physics body of entity {}", id);
    }
}
