// Combat resolution
//
// Strikes against hurtboxes, counter clashes between weapons, and executions
// of stunned characters. Everything here is a silent no-op when its
// preconditions fail; the outcome enums exist for logging and tests.

use crate::game::characters::Character;
use crate::game::config::ExecuteConfig;

use super::events::CombatEvent;

/// Why a strike did not land
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrikeRejection {
    /// Defender is rolling, executed or dead
    HitDisabled,
    /// Attacker's weapon is not armed
    Disarmed,
    /// Counters only act through clashes
    CounterMove,
    /// This swing already landed on this defender
    AlreadyCredited,
    /// The attacker's move has no damage factor
    NoDamageFactor,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StrikeOutcome {
    Rejected(StrikeRejection),
    Hit { damage: f32, remaining_hp: f32 },
    Killed { damage: f32 },
}

/// Resolve the attacker's weapon touching the defender's hurtbox
pub fn resolve_strike(
    attacker: &Character,
    defender: &mut Character,
    events: &mut Vec<CombatEvent>,
) -> StrikeOutcome {
    if !defender.state_machine.hit_enabled() {
        return StrikeOutcome::Rejected(StrikeRejection::HitDisabled);
    }

    let kind = attacker.snapshot().attack_kind;
    let Some(window) = attacker.weapon.window(attacker.id, kind) else {
        return StrikeOutcome::Rejected(StrikeRejection::Disarmed);
    };
    if window.kind.is_counter() {
        return StrikeOutcome::Rejected(StrikeRejection::CounterMove);
    }
    if !defender.ledger.is_new_attack(window.attacker, window.timestamp) {
        return StrikeOutcome::Rejected(StrikeRejection::AlreadyCredited);
    }
    let Some(factor) = attacker.weapon.profile().factor(window.kind) else {
        log::trace!(
            "{} touched {} from {:?}, which deals no damage",
            attacker.name,
            defender.name,
            window.kind
        );
        return StrikeOutcome::Rejected(StrikeRejection::NoDamageFactor);
    };

    let damage = attacker.properties.strength() * factor;
    defender.properties.change_hp(-damage);
    let remaining_hp = defender.properties.hp();

    log::info!(
        "{} hit {} with {:?} for {:.1} ({:.1} HP left)",
        attacker.name,
        defender.name,
        window.kind,
        damage,
        remaining_hp
    );
    events.push(CombatEvent::Hit {
        attacker: attacker.id,
        defender: defender.id,
        damage,
        remaining_hp,
    });

    if remaining_hp > 0.0 {
        defender.impact();
        StrikeOutcome::Hit {
            damage,
            remaining_hp,
        }
    } else {
        defender.die(events);
        StrikeOutcome::Killed { damage }
    }
}

/// Resolve the holder's weapon touching the other character's weapon.
/// An armed counter stuns a non-countering opponent. Returns whether a stun
/// happened.
pub fn resolve_clash(
    holder: &Character,
    other: &mut Character,
    events: &mut Vec<CombatEvent>,
) -> bool {
    if !holder.weapon.is_armed() || !holder.snapshot().attack_kind.is_counter() {
        return false;
    }
    if other.snapshot().attack_kind.is_counter() {
        return false;
    }
    if !other.stun() {
        return false;
    }

    log::info!("{} countered {}", holder.name, other.name);
    events.push(CombatEvent::Stunned {
        victim: other.id,
        by: holder.id,
    });
    true
}

/// Finish a stunned victim. The caller has already checked the executor may
/// act and that the victim is a valid target inside the execute probe.
pub fn execute(
    executor: &mut Character,
    victim: &mut Character,
    config: &ExecuteConfig,
    events: &mut Vec<CombatEvent>,
) -> bool {
    if !victim.snapshot().is_stunned() {
        return false;
    }

    let damage = executor.properties.strength() * executor.weapon.profile().execute_factor;
    if !victim.be_executed() {
        return false;
    }
    victim.properties.change_hp(-damage);

    executor.place_for_execution(victim.pose, config.placement_offset);
    executor.begin_execution(events);

    log::info!(
        "{} executed {} for {:.1} ({:.1} HP left)",
        executor.name,
        victim.name,
        damage,
        victim.properties.hp()
    );
    events.push(CombatEvent::Executed {
        executor: executor.id,
        victim: victim.id,
        damage,
    });
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::animation::oracle::fake::FakeAnimator;
    use crate::engine::animation::{states, tags, triggers, AnimationEvent};
    use crate::engine::physics::Pose;
    use crate::game::characters::CombatPhase;
    use crate::game::config::GameConfig;
    use crate::game::team::Team;
    use approx::assert_abs_diff_eq;
    use glam::{Quat, Vec3};

    const DT: f32 = 1.0 / 60.0;

    struct Fighter {
        character: Character,
        animator: FakeAnimator,
    }

    impl Fighter {
        fn new(id: u32, team: Team) -> Self {
            let animator = FakeAnimator::in_state(states::LOCOMOTION, &[tags::GROUND]);
            let character = Character::new(
                id,
                &format!("fighter-{}", id),
                team,
                Pose::default(),
                Box::new(animator.clone()),
                &GameConfig::default(),
                true,
            );
            Self {
                character,
                animator,
            }
        }

        /// Put the animator in a state and refresh the snapshot
        fn enter(&mut self, state: &str, state_tags: &[&str], now: u64) {
            self.animator.set_state(state, state_tags);
            let mut events = Vec::new();
            self.character.advance_animation(DT, now, &mut events);
        }

        fn swing(&mut self, state: &str, now: u64) {
            self.enter(state, &[tags::ATTACK], now);
            let mut events = Vec::new();
            self.character
                .handle_event(AnimationEvent::StrikeEnable, now, &mut events);
        }
    }

    #[test]
    fn test_strike_deals_strength_times_factor() {
        let mut attacker = Fighter::new(0, Team::Player);
        let mut defender = Fighter::new(1, Team::Enemy);
        attacker.swing(states::SOFT_ATTACK_1, 5);

        let mut events = Vec::new();
        let outcome = resolve_strike(&attacker.character, &mut defender.character, &mut events);

        assert_eq!(
            outcome,
            StrikeOutcome::Hit {
                damage: 10.0,
                remaining_hp: 90.0
            }
        );
        assert_eq!(defender.character.properties.hp(), 90.0);
        assert!(defender.animator.triggered(triggers::IMPACT));
        assert!(!defender.animator.triggered(triggers::DIE));
    }

    #[test]
    fn test_second_combo_hit_uses_its_factor() {
        let mut attacker = Fighter::new(0, Team::Player);
        let mut defender = Fighter::new(1, Team::Enemy);
        attacker.swing(states::SOFT_ATTACK_2, 5);

        let mut events = Vec::new();
        resolve_strike(&attacker.character, &mut defender.character, &mut events);
        assert_abs_diff_eq!(defender.character.properties.hp(), 88.0, epsilon = 1e-4);
    }

    #[test]
    fn test_same_swing_lands_once() {
        let mut attacker = Fighter::new(0, Team::Player);
        let mut defender = Fighter::new(1, Team::Enemy);
        attacker.swing(states::SOFT_ATTACK_1, 5);

        let mut events = Vec::new();
        for _ in 0..10 {
            resolve_strike(&attacker.character, &mut defender.character, &mut events);
        }
        assert_eq!(defender.character.properties.hp(), 90.0);

        // A new window lands again
        attacker.swing(states::SOFT_ATTACK_2, 30);
        let outcome = resolve_strike(&attacker.character, &mut defender.character, &mut events);
        assert!(matches!(outcome, StrikeOutcome::Hit { .. }));
    }

    #[test]
    fn test_lethal_strike_kills() {
        let mut attacker = Fighter::new(0, Team::Player);
        let mut defender = Fighter::new(1, Team::Enemy);
        defender.character.properties.change_hp(-90.0);
        attacker.swing(states::SOFT_ATTACK_1, 5);

        let mut events = Vec::new();
        let outcome = resolve_strike(&attacker.character, &mut defender.character, &mut events);

        assert_eq!(outcome, StrikeOutcome::Killed { damage: 10.0 });
        assert_eq!(defender.character.properties.hp(), 0.0);
        assert!(defender.animator.triggered(triggers::DIE));
        assert!(!defender.character.state_machine.hit_enabled());
        assert_eq!(defender.character.team, Team::Neutral);
        assert!(events.contains(&CombatEvent::Died { victim: 1 }));
    }

    #[test]
    fn test_rejections() {
        let mut attacker = Fighter::new(0, Team::Player);
        let mut defender = Fighter::new(1, Team::Enemy);
        let mut events = Vec::new();

        // Not armed
        attacker.enter(states::SOFT_ATTACK_1, &[tags::ATTACK], 1);
        assert_eq!(
            resolve_strike(&attacker.character, &mut defender.character, &mut events),
            StrikeOutcome::Rejected(StrikeRejection::Disarmed)
        );

        // Counter swings never damage
        attacker.enter(states::COUNTER, &[tags::ATTACK], 2);
        attacker
            .character
            .handle_event(AnimationEvent::CounterEnable, 2, &mut events);
        assert_eq!(
            resolve_strike(&attacker.character, &mut defender.character, &mut events),
            StrikeOutcome::Rejected(StrikeRejection::CounterMove)
        );

        // Rolling defender
        attacker.swing(states::SOFT_ATTACK_1, 3);
        defender.character.roll();
        assert_eq!(
            resolve_strike(&attacker.character, &mut defender.character, &mut events),
            StrikeOutcome::Rejected(StrikeRejection::HitDisabled)
        );
        assert_eq!(defender.character.properties.hp(), 100.0);
    }

    #[test]
    fn test_factorless_move_is_recorded_but_harmless() {
        let mut attacker = Fighter::new(0, Team::Player);
        let mut defender = Fighter::new(1, Team::Enemy);
        attacker.swing(states::DEFENCE, 4);

        let mut events = Vec::new();
        assert_eq!(
            resolve_strike(&attacker.character, &mut defender.character, &mut events),
            StrikeOutcome::Rejected(StrikeRejection::NoDamageFactor)
        );
        assert_eq!(defender.character.ledger.last_seen(0), Some(4));
        assert!(events.is_empty());
    }

    #[test]
    fn test_counter_stuns_attacker_without_damage() {
        let mut counter = Fighter::new(0, Team::Player);
        let mut attacker = Fighter::new(1, Team::Enemy);
        counter.enter(states::COUNTER, &[tags::ATTACK], 1);
        let mut events = Vec::new();
        counter
            .character
            .handle_event(AnimationEvent::CounterEnable, 1, &mut events);
        attacker.swing(states::SOFT_ATTACK_1, 1);

        assert!(resolve_clash(&counter.character, &mut attacker.character, &mut events));
        assert_eq!(attacker.character.state_machine.phase(), CombatPhase::Stunned);
        assert!(!attacker.character.state_machine.actions_enabled());
        assert!(attacker.animator.triggered(triggers::STUNNED));
        assert_eq!(attacker.character.properties.hp(), 100.0);
        assert_eq!(events, vec![CombatEvent::Stunned { victim: 1, by: 0 }]);

        // Still touching next tick: no second stun
        assert!(!resolve_clash(&counter.character, &mut attacker.character, &mut events));
    }

    #[test]
    fn test_counter_against_counter_does_nothing() {
        let mut a = Fighter::new(0, Team::Player);
        let mut b = Fighter::new(1, Team::Enemy);
        let mut events = Vec::new();
        for fighter in [&mut a, &mut b] {
            fighter.enter(states::COUNTER, &[tags::ATTACK], 1);
            fighter
                .character
                .handle_event(AnimationEvent::CounterEnable, 1, &mut events);
        }

        assert!(!resolve_clash(&a.character, &mut b.character, &mut events));
        assert!(!resolve_clash(&b.character, &mut a.character, &mut events));
        assert_eq!(a.character.state_machine.phase(), CombatPhase::Attacking);
        assert_eq!(b.character.state_machine.phase(), CombatPhase::Attacking);
    }

    #[test]
    fn test_unarmed_counter_does_not_stun() {
        let mut counter = Fighter::new(0, Team::Player);
        let mut other = Fighter::new(1, Team::Enemy);
        counter.enter(states::COUNTER, &[tags::ATTACK], 1);

        let mut events = Vec::new();
        assert!(!resolve_clash(&counter.character, &mut other.character, &mut events));
    }

    fn stunned_victim(hp_loss: f32) -> Fighter {
        let mut victim = Fighter::new(1, Team::Enemy);
        victim.character.pose = Pose::new(Vec3::new(0.0, 0.0, 2.0), Quat::IDENTITY);
        victim.character.properties.change_hp(-hp_loss);
        victim.character.stun();
        victim.enter(states::STUNNED, &[tags::STUNNED], 1);
        victim
    }

    #[test]
    fn test_execute_finishes_low_hp_target() {
        let mut executor = Fighter::new(0, Team::Player);
        let mut victim = stunned_victim(70.0);
        executor.character.bind_lock(1);

        let mut events = Vec::new();
        assert!(execute(
            &mut executor.character,
            &mut victim.character,
            &ExecuteConfig::default(),
            &mut events
        ));

        assert_eq!(victim.character.properties.hp(), 0.0);
        assert_eq!(victim.character.state_machine.phase(), CombatPhase::Executed);
        assert!(!victim.character.state_machine.hit_enabled());
        assert!(victim.animator.triggered(triggers::BE_EXECUTED));

        assert!(executor.animator.triggered(triggers::EXECUTE));
        assert!(!executor.character.is_locked());
        assert_abs_diff_eq!(executor.character.properties.pp(), 90.0);
        assert_abs_diff_eq!(executor.character.pose.position.z, 3.2, epsilon = 1e-5);

        // The victim's execution clip ends: dead, not recovered
        victim
            .character
            .handle_event(AnimationEvent::BeExecutedExit, 2, &mut events);
        assert_eq!(victim.character.state_machine.phase(), CombatPhase::Dead);
        assert!(events.contains(&CombatEvent::Died { victim: 1 }));
    }

    #[test]
    fn test_execute_requires_stunned_victim() {
        let mut executor = Fighter::new(0, Team::Player);
        let mut victim = Fighter::new(1, Team::Enemy);

        let mut events = Vec::new();
        assert!(!execute(
            &mut executor.character,
            &mut victim.character,
            &ExecuteConfig::default(),
            &mut events
        ));
        assert_eq!(victim.character.properties.hp(), 100.0);
        assert!(!executor.animator.triggered(triggers::EXECUTE));
    }
}
