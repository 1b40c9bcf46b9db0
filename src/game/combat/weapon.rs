// Weapon state - strike windows and attack classification

use crate::engine::animation::states;
use crate::engine::game_loop::Tick;
use crate::engine::physics::EntityId;
use crate::game::config::WeaponProfile;

/// Attack move a character is performing, derived from the animation state name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AttackStateKind {
    #[default]
    NotAttacking,
    SoftAttack1,
    SoftAttack2,
    Counter,
    Execute,
    Defence,
}

impl AttackStateKind {
    pub fn from_state_name(name: &str) -> Self {
        match name {
            states::SOFT_ATTACK_1 => Self::SoftAttack1,
            states::SOFT_ATTACK_2 => Self::SoftAttack2,
            states::COUNTER => Self::Counter,
            states::EXECUTE => Self::Execute,
            states::DEFENCE => Self::Defence,
            _ => Self::NotAttacking,
        }
    }

    pub fn is_counter(self) -> bool {
        self == Self::Counter
    }
}

impl WeaponProfile {
    /// Damage multiplier for a move; moves without one deal no damage
    pub fn factor(&self, kind: AttackStateKind) -> Option<f32> {
        match kind {
            AttackStateKind::SoftAttack1 => Some(self.soft_attack_1_factor),
            AttackStateKind::SoftAttack2 => Some(self.soft_attack_2_factor),
            AttackStateKind::Execute => Some(self.execute_factor),
            AttackStateKind::NotAttacking
            | AttackStateKind::Counter
            | AttackStateKind::Defence => None,
        }
    }
}

/// One armed strike period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackWindow {
    pub attacker: EntityId,
    pub timestamp: Tick,
    pub kind: AttackStateKind,
}

/// Per-character weapon arming
#[derive(Debug, Clone, Default)]
pub struct WeaponState {
    profile: WeaponProfile,
    armed: bool,
    attack_timestamp: Tick,
}

impl WeaponState {
    pub fn new(profile: WeaponProfile) -> Self {
        Self {
            profile,
            armed: false,
            attack_timestamp: 0,
        }
    }

    pub fn profile(&self) -> &WeaponProfile {
        &self.profile
    }

    /// Open a strike window stamped with the current tick
    pub fn enable_strike(&mut self, now: Tick) {
        self.attack_timestamp = now;
        self.armed = true;
    }

    pub fn disable_strike(&mut self) {
        self.armed = false;
    }

    /// Arm for a counter; the timestamp is left alone
    pub fn enable_counter(&mut self) {
        self.armed = true;
    }

    pub fn disable_counter(&mut self) {
        self.armed = false;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn attack_timestamp(&self) -> Tick {
        self.attack_timestamp
    }

    /// The live window, if armed
    pub fn window(&self, owner: EntityId, kind: AttackStateKind) -> Option<AttackWindow> {
        self.armed.then_some(AttackWindow {
            attacker: owner,
            timestamp: self.attack_timestamp,
            kind,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_state_name() {
        assert_eq!(
            AttackStateKind::from_state_name("Soft Attack 1"),
            AttackStateKind::SoftAttack1
        );
        assert_eq!(
            AttackStateKind::from_state_name("Soft Attack 2"),
            AttackStateKind::SoftAttack2
        );
        assert_eq!(AttackStateKind::from_state_name("Counter"), AttackStateKind::Counter);
        assert_eq!(AttackStateKind::from_state_name("Defence"), AttackStateKind::Defence);
        assert_eq!(AttackStateKind::from_state_name("Execute"), AttackStateKind::Execute);
        assert_eq!(
            AttackStateKind::from_state_name("Locomotion"),
            AttackStateKind::NotAttacking
        );
    }

    #[test]
    fn test_factor_table() {
        let profile = WeaponProfile::default();
        assert_eq!(profile.factor(AttackStateKind::SoftAttack1), Some(1.0));
        assert_eq!(profile.factor(AttackStateKind::SoftAttack2), Some(1.2));
        assert_eq!(profile.factor(AttackStateKind::Execute), Some(3.0));
        assert_eq!(profile.factor(AttackStateKind::Counter), None);
        assert_eq!(profile.factor(AttackStateKind::NotAttacking), None);
    }

    #[test]
    fn test_strike_window_stamps_time() {
        let mut weapon = WeaponState::default();
        assert!(weapon.window(1, AttackStateKind::SoftAttack1).is_none());

        weapon.enable_strike(42);
        let window = weapon.window(1, AttackStateKind::SoftAttack1).expect("armed");
        assert_eq!(window.timestamp, 42);

        weapon.disable_strike();
        assert!(!weapon.is_armed());
    }

    #[test]
    fn test_counter_keeps_previous_timestamp() {
        let mut weapon = WeaponState::default();
        weapon.enable_strike(10);
        weapon.disable_strike();

        weapon.enable_counter();
        assert!(weapon.is_armed());
        assert_eq!(weapon.attack_timestamp(), 10);
        weapon.disable_counter();
        assert!(!weapon.is_armed());
    }
}
