use rapier3d::prelude::*;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Collision groups for filtering what objects can interact with each other
///
/// Replaces layer masks: bodies push against bodies and the environment,
/// weapons only look for hurtboxes and other weapons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionGroups {
    /// Character movement capsules
    Character = 0b0000_0001,

    /// Damage-receiving sensors around each character
    Hurtbox = 0b0000_0010,

    /// Blade sensors
    Weapon = 0b0000_0100,

    /// Static level geometry (ground, walls)
    Environment = 0b0000_1000,
}

impl CollisionGroups {
    pub fn group(self) -> Group {
        Group::from_bits_truncate(self as u32)
    }

    /// Convert to rapier3d's InteractionGroups
    pub fn to_interaction_groups(self) -> InteractionGroups {
        let filter = match self {
            // Characters block each other and stand on the environment
            CollisionGroups::Character => {
                CollisionGroups::Character.group() | CollisionGroups::Environment.group()
            }

            // Hurtboxes are only interesting to weapons
            CollisionGroups::Hurtbox => CollisionGroups::Weapon.group(),

            // Weapons find hurtboxes and clash with other weapons
            CollisionGroups::Weapon => {
                CollisionGroups::Hurtbox.group() | CollisionGroups::Weapon.group()
            }

            CollisionGroups::Environment => CollisionGroups::Character.group(),
        };

        InteractionGroups::new(self.group(), filter)
    }

    /// Query groups that only accept colliders of `target`
    pub fn query(target: CollisionGroups) -> InteractionGroups {
        // Queries must belong to a group the target accepts
        let membership = match target {
            CollisionGroups::Hurtbox => CollisionGroups::Weapon,
            CollisionGroups::Weapon => CollisionGroups::Weapon,
            CollisionGroups::Character | CollisionGroups::Environment => {
                CollisionGroups::Character
            }
        };
        InteractionGroups::new(membership.group(), target.group())
    }
}

/// Custom collision event for game logic
#[derive(Debug, Clone, Copy)]
pub enum CollisionEvent {
    /// Two colliders started touching
    Started {
        collider1: ColliderHandle,
        collider2: ColliderHandle,
    },

    /// Two colliders stopped touching
    Stopped {
        collider1: ColliderHandle,
        collider2: ColliderHandle,
    },
}

/// Unordered collider pair
pub type ColliderPair = (ColliderHandle, ColliderHandle);

fn ordered(a: ColliderHandle, b: ColliderHandle) -> ColliderPair {
    if a.into_raw_parts() <= b.into_raw_parts() {
        (a, b)
    } else {
        (b, a)
    }
}

/// Queue for storing collision events during physics step
pub struct CollisionEventQueue {
    events: Arc<Mutex<Vec<CollisionEvent>>>,
}

impl CollisionEventQueue {
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::with_capacity(32))),
        }
    }

    /// Clear all events (call at start of physics step)
    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }

    /// Get all collision events from this step
    pub fn events(&self) -> Vec<CollisionEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    fn push(&self, event: CollisionEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl Default for CollisionEventQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHandler for CollisionEventQueue {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        event: rapier3d::prelude::CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        match event {
            rapier3d::prelude::CollisionEvent::Started(h1, h2, _flags) => {
                self.push(CollisionEvent::Started {
                    collider1: h1,
                    collider2: h2,
                });
            }
            rapier3d::prelude::CollisionEvent::Stopped(h1, h2, _flags) => {
                self.push(CollisionEvent::Stopped {
                    collider1: h1,
                    collider2: h2,
                });
            }
        }
    }

    fn handle_contact_force_event(
        &self,
        _dt: Real,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: Real,
    ) {
    }
}

/// Sensor overlaps currently in progress, maintained from started/stopped events
#[derive(Debug, Default)]
pub struct ActiveOverlaps {
    pairs: HashSet<ColliderPair>,
}

impl ActiveOverlaps {
    pub fn apply(&mut self, events: &[CollisionEvent]) {
        for event in events {
            match *event {
                CollisionEvent::Started {
                    collider1,
                    collider2,
                } => {
                    self.pairs.insert(ordered(collider1, collider2));
                }
                CollisionEvent::Stopped {
                    collider1,
                    collider2,
                } => {
                    self.pairs.remove(&ordered(collider1, collider2));
                }
            }
        }
    }

    /// Drop every pair involving `handle`
    pub fn forget(&mut self, handle: ColliderHandle) {
        self.pairs.retain(|(a, b)| *a != handle && *b != handle);
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColliderPair> {
        self.pairs.iter()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collision_groups_bits() {
        let groups = [
            CollisionGroups::Character,
            CollisionGroups::Hurtbox,
            CollisionGroups::Weapon,
            CollisionGroups::Environment,
        ];

        for (i, group1) in groups.iter().enumerate() {
            for (j, group2) in groups.iter().enumerate() {
                if i != j {
                    assert_ne!(
                        *group1 as u32, *group2 as u32,
                        "Groups must have unique bits"
                    );
                }
            }
        }
    }

    #[test]
    fn test_weapon_and_hurtbox_interact() {
        let weapon = CollisionGroups::Weapon.to_interaction_groups();
        let hurtbox = CollisionGroups::Hurtbox.to_interaction_groups();
        assert!(weapon.test(hurtbox));
        assert!(weapon.test(weapon));
    }

    #[test]
    fn test_hurtbox_ignores_bodies_and_environment() {
        let hurtbox = CollisionGroups::Hurtbox.to_interaction_groups();
        assert!(!hurtbox.test(CollisionGroups::Character.to_interaction_groups()));
        assert!(!hurtbox.test(CollisionGroups::Environment.to_interaction_groups()));
        assert!(!hurtbox.test(hurtbox));
    }

    #[test]
    fn test_query_groups_select_target_only() {
        let query = CollisionGroups::query(CollisionGroups::Environment);
        assert!(query.test(CollisionGroups::Environment.to_interaction_groups()));
        assert!(!query.test(CollisionGroups::Character.to_interaction_groups()));

        let query = CollisionGroups::query(CollisionGroups::Character);
        assert!(query.test(CollisionGroups::Character.to_interaction_groups()));
        assert!(!query.test(CollisionGroups::Environment.to_interaction_groups()));
    }

    #[test]
    fn test_active_overlaps_track_start_and_stop() {
        let mut colliders = ColliderSet::new();
        let a = colliders.insert(ColliderBuilder::ball(0.5).build());
        let b = colliders.insert(ColliderBuilder::ball(0.5).build());

        let mut overlaps = ActiveOverlaps::default();
        overlaps.apply(&[CollisionEvent::Started {
            collider1: b,
            collider2: a,
        }]);
        assert_eq!(overlaps.len(), 1);

        // Reported in the other order
        overlaps.apply(&[CollisionEvent::Stopped {
            collider1: a,
            collider2: b,
        }]);
        assert!(overlaps.is_empty());
    }
}
