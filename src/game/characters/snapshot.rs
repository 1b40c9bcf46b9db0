// Per-tick view of a character's animation state
//
// Read once after the animator advances; every decision in the tick uses
// this copy so all readers agree.

use crate::engine::animation::{states, tags, AnimationOracle};
use crate::game::combat::AttackStateKind;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimationSnapshot {
    pub state_name: String,
    pub tags: Vec<String>,
    pub in_transition: bool,
    pub attack_kind: AttackStateKind,
}

impl AnimationSnapshot {
    pub fn capture(animator: &dyn AnimationOracle) -> Self {
        let state_name = animator.current_state_name();
        let attack_kind = AttackStateKind::from_state_name(&state_name);
        Self {
            tags: animator.current_state_tags(),
            in_transition: animator.is_in_transition(),
            state_name,
            attack_kind,
        }
    }

    pub fn is_name(&self, name: &str) -> bool {
        self.state_name == name
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn is_ground(&self) -> bool {
        self.has_tag(tags::GROUND)
    }

    pub fn is_attack(&self) -> bool {
        self.has_tag(tags::ATTACK)
    }

    pub fn is_uncontrollable(&self) -> bool {
        self.has_tag(tags::UNCONTROLLABLE)
    }

    pub fn is_stunned(&self) -> bool {
        self.has_tag(tags::STUNNED)
    }

    pub fn is_dead(&self) -> bool {
        self.has_tag(tags::DEAD)
    }

    /// Free or locked locomotion
    pub fn is_locomotion(&self) -> bool {
        self.is_name(states::LOCOMOTION) || self.is_name(states::LOCK_LOCOMOTION)
    }
}
