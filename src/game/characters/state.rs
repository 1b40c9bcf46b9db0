// Character state machine
//
// Locomotion speed with asymmetric ramps, the combat phase, and the two gates
// (actions enabled, hit enabled) the rest of the game consults.

use glam::{Quat, Vec2, Vec3};

use crate::core::math::{forward, look_rotation, move_towards};
use crate::engine::animation::states;
use crate::game::config::{LocomotionConfig, PropertyConfig};

use super::snapshot::AnimationSnapshot;

/// Coarse locomotion state derived from forward speed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LocomotionState {
    #[default]
    Idle,
    Walk,
    Run,
}

/// In-flight speed ramp, advanced once per tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedRamp {
    /// Walk to run
    Accelerate,
    /// Run to walk
    Decelerate,
}

/// Combat phase of a character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CombatPhase {
    #[default]
    Neutral,
    Attacking,
    /// Brief stagger after taking damage
    Impact,
    Stunned,
    /// Being executed
    Executed,
    Dead,
}

impl CombatPhase {
    /// Whether `self -> next` is a legal transition
    pub fn can_transition_to(self, next: CombatPhase) -> bool {
        use CombatPhase::*;
        match (self, next) {
            (Dead, _) => false,
            (_, Dead) => true,
            (Neutral, Attacking) | (Attacking, Attacking) | (Attacking, Neutral) => true,
            (Neutral | Attacking | Impact | Stunned, Impact) => true,
            (Neutral | Attacking | Impact, Stunned) => true,
            (Stunned, Executed) => true,
            (Impact | Stunned | Executed, Neutral) => true,
            _ => false,
        }
    }

    /// Whether the phase lets the character start actions
    pub fn allows_actions(self) -> bool {
        matches!(self, CombatPhase::Neutral | CombatPhase::Attacking)
    }
}

/// State machine that handles locomotion and combat gating
#[derive(Debug, Clone)]
pub struct CharacterStateMachine {
    locomotion: LocomotionConfig,
    walk_speed: f32,
    run_speed: f32,

    /// Signed forward speed; negative while backing off under lock
    forward_velocity: f32,
    /// Heading relative to the camera pivot
    forward_direction: Quat,
    move_input: Vec2,
    speed_up: bool,
    ramp: Option<SpeedRamp>,

    phase: CombatPhase,
    actions_enabled: bool,
    hit_enabled: bool,
}

impl Default for CharacterStateMachine {
    fn default() -> Self {
        Self::new(LocomotionConfig::default(), &PropertyConfig::default())
    }
}

impl CharacterStateMachine {
    pub fn new(locomotion: LocomotionConfig, properties: &PropertyConfig) -> Self {
        Self {
            locomotion,
            walk_speed: properties.walk_speed(),
            run_speed: properties.forward_speed,
            forward_velocity: 0.0,
            forward_direction: Quat::IDENTITY,
            move_input: Vec2::ZERO,
            speed_up: false,
            ramp: None,
            phase: CombatPhase::Neutral,
            actions_enabled: true,
            hit_enabled: true,
        }
    }

    pub fn forward_velocity(&self) -> f32 {
        self.forward_velocity
    }

    pub fn forward_direction(&self) -> Quat {
        self.forward_direction
    }

    pub fn move_input(&self) -> Vec2 {
        self.move_input
    }

    pub fn is_speed_up(&self) -> bool {
        self.speed_up
    }

    pub fn ramp(&self) -> Option<SpeedRamp> {
        self.ramp
    }

    pub fn phase(&self) -> CombatPhase {
        self.phase
    }

    pub fn actions_enabled(&self) -> bool {
        self.actions_enabled
    }

    pub fn hit_enabled(&self) -> bool {
        self.hit_enabled
    }

    pub fn is_dead(&self) -> bool {
        self.phase == CombatPhase::Dead
    }

    fn is_moving(&self) -> bool {
        self.forward_velocity > self.locomotion.moving_threshold
    }

    /// Coarse locomotion state
    pub fn locomotion_state(&self) -> LocomotionState {
        let speed = self.forward_velocity.abs();
        if speed <= self.locomotion.moving_threshold {
            LocomotionState::Idle
        } else if speed > self.walk_speed + self.locomotion.moving_threshold {
            LocomotionState::Run
        } else {
            LocomotionState::Walk
        }
    }

    /// Value for the animator's "Speed" parameter
    pub fn speed_param(&self) -> f32 {
        if self.forward_velocity < 0.0 {
            -1.0
        } else {
            self.forward_velocity / self.run_speed
        }
    }

    /// Record movement input (x = right, y = forward, camera relative).
    ///
    /// Allowed even while actions are disabled; nothing moves until they are
    /// enabled again.
    pub fn set_move_input(&mut self, direction: Vec2, locked: bool, attacking: bool) {
        self.move_input = direction;

        if direction == Vec2::ZERO {
            self.forward_velocity = 0.0;
            self.speed_up = false;
            self.ramp = None;
            if locked {
                self.forward_direction = Quat::IDENTITY;
            }
            return;
        }

        self.forward_direction = look_rotation(Vec3::new(direction.x, 0.0, direction.y));

        // Speed is frozen for the duration of an attack
        if attacking {
            return;
        }

        if self.is_moving() {
            return;
        }
        self.forward_velocity = if locked && direction.y < 0.0 {
            -self.walk_speed
        } else {
            self.walk_speed
        };
    }

    /// Start ramping to run speed. Needs forward motion and PP.
    pub fn speed_up(&mut self, has_pp: bool) {
        if self.forward_velocity <= 0.0 {
            self.speed_up = false;
            return;
        }
        if !has_pp {
            return;
        }
        self.speed_up = true;
        self.ramp = Some(SpeedRamp::Accelerate);
    }

    /// Start ramping back to walk speed
    pub fn speed_cut(&mut self) {
        if self.forward_velocity <= 0.0 {
            self.speed_up = false;
            return;
        }
        self.speed_up = false;
        self.ramp = Some(SpeedRamp::Decelerate);
    }

    /// Advance the active ramp by one tick
    pub fn step_ramp(&mut self) {
        let Some(ramp) = self.ramp else {
            return;
        };

        let (target, rate) = match ramp {
            SpeedRamp::Accelerate => (self.run_speed, self.locomotion.accelerate_per_tick),
            SpeedRamp::Decelerate => (self.walk_speed, self.locomotion.decelerate_per_tick),
        };

        let finished = match ramp {
            SpeedRamp::Accelerate => self.forward_velocity >= target,
            SpeedRamp::Decelerate => self.forward_velocity <= target,
        };
        if finished {
            self.ramp = None;
            return;
        }

        self.forward_velocity = move_towards(self.forward_velocity, target, rate);
    }

    /// First frame of an attack: stand still
    pub fn stop_move(&mut self) {
        self.forward_velocity = 0.0;
        self.speed_up = false;
        self.ramp = None;
    }

    /// Roll start: carry run speed through the roll and become untouchable
    pub fn begin_roll(&mut self) {
        if self.forward_velocity > 0.0 {
            self.forward_velocity = self.run_speed;
            if self.ramp == Some(SpeedRamp::Decelerate) {
                self.ramp = None;
            }
        }
        self.hit_enabled = false;
    }

    /// Roll finished: drop back to walking unless running was requested
    pub fn end_roll(&mut self, locked: bool) {
        if self.phase != CombatPhase::Executed && self.phase != CombatPhase::Dead {
            self.hit_enabled = true;
        }
        if self.speed_up {
            return;
        }
        if self.move_input == Vec2::ZERO {
            self.forward_velocity = 0.0;
            return;
        }
        let backward = locked && forward(self.forward_direction).z < -0.1;
        self.forward_velocity = if backward {
            -self.walk_speed
        } else {
            self.walk_speed
        };
    }

    /// Follow the animation: attack-tagged states mean Attacking
    pub fn sync_attack_phase(&mut self, snapshot: &AnimationSnapshot) {
        match self.phase {
            CombatPhase::Neutral if snapshot.is_attack() => self.phase = CombatPhase::Attacking,
            CombatPhase::Attacking if !snapshot.is_attack() => self.phase = CombatPhase::Neutral,
            _ => {}
        }
    }

    fn transition(&mut self, next: CombatPhase) -> bool {
        if !self.phase.can_transition_to(next) {
            log::trace!("Rejected combat phase change {:?} -> {:?}", self.phase, next);
            return false;
        }
        self.phase = next;
        true
    }

    /// Stagger after damage
    pub fn impact(&mut self) -> bool {
        if !self.transition(CombatPhase::Impact) {
            return false;
        }
        self.actions_enabled = false;
        true
    }

    pub fn end_impact(&mut self) {
        if self.phase == CombatPhase::Impact && self.transition(CombatPhase::Neutral) {
            self.actions_enabled = true;
        }
    }

    /// Parried: open to execution
    pub fn stun(&mut self) -> bool {
        if !self.transition(CombatPhase::Stunned) {
            return false;
        }
        self.actions_enabled = false;
        self.stop_move();
        true
    }

    pub fn end_stun(&mut self) {
        if self.phase == CombatPhase::Stunned && self.transition(CombatPhase::Neutral) {
            self.actions_enabled = true;
        }
    }

    pub fn be_executed(&mut self) -> bool {
        if !self.transition(CombatPhase::Executed) {
            return false;
        }
        self.actions_enabled = false;
        self.hit_enabled = false;
        self.stop_move();
        true
    }

    /// Survived an execution
    pub fn recover(&mut self) {
        if self.phase == CombatPhase::Executed && self.transition(CombatPhase::Neutral) {
            self.actions_enabled = true;
            self.hit_enabled = true;
        }
    }

    pub fn die(&mut self) -> bool {
        if !self.transition(CombatPhase::Dead) {
            return false;
        }
        self.actions_enabled = false;
        self.hit_enabled = false;
        self.stop_move();
        true
    }

    /// Displacement and facing for this tick.
    ///
    /// `facing` is the character's rotation, `pivot` the camera pivot's
    /// yaw-only rotation.
    pub fn movement(
        &self,
        locked: bool,
        facing: Quat,
        pivot: Quat,
        snapshot: &AnimationSnapshot,
        dt: f32,
    ) -> (Vec3, Option<Quat>) {
        if locked {
            // Strafe in character space, always facing the target
            let translation =
                facing * (self.forward_direction * Vec3::Z) * self.forward_velocity.abs() * dt;
            let rotation = (snapshot.is_locomotion() || snapshot.is_attack())
                .then(|| look_rotation(forward(pivot)));
            (translation, rotation)
        } else {
            let heading = pivot * self.forward_direction;
            let turning = (snapshot.is_name(states::LOCOMOTION)
                && self.forward_velocity != 0.0)
                || snapshot.is_attack();
            let translation = heading * Vec3::Z * self.forward_velocity * dt;
            (translation, turning.then_some(heading))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::animation::tags;
    use approx::assert_abs_diff_eq;

    const WALK: f32 = 2.8;
    const RUN: f32 = 7.0;

    fn snapshot(name: &str, tags: &[&str]) -> AnimationSnapshot {
        AnimationSnapshot {
            state_name: name.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            ..Default::default()
        }
    }

    fn walking() -> CharacterStateMachine {
        let mut sm = CharacterStateMachine::default();
        sm.set_move_input(Vec2::Y, false, false);
        sm
    }

    #[test]
    fn test_initial_state() {
        let sm = CharacterStateMachine::default();
        assert_eq!(sm.phase(), CombatPhase::Neutral);
        assert_eq!(sm.locomotion_state(), LocomotionState::Idle);
        assert!(sm.actions_enabled());
        assert!(sm.hit_enabled());
    }

    #[test]
    fn test_move_starts_walking() {
        let sm = walking();
        assert_abs_diff_eq!(sm.forward_velocity(), WALK, epsilon = 1e-5);
        assert_eq!(sm.locomotion_state(), LocomotionState::Walk);
        assert_abs_diff_eq!(sm.speed_param(), 0.4, epsilon = 1e-5);
    }

    #[test]
    fn test_locked_backward_move_is_negative() {
        let mut sm = CharacterStateMachine::default();
        sm.set_move_input(Vec2::NEG_Y, true, false);
        assert_abs_diff_eq!(sm.forward_velocity(), -WALK, epsilon = 1e-5);
        assert_eq!(sm.speed_param(), -1.0);
    }

    #[test]
    fn test_attack_freezes_speed() {
        let mut sm = CharacterStateMachine::default();
        sm.set_move_input(Vec2::Y, false, true);
        assert_eq!(sm.forward_velocity(), 0.0);
    }

    #[test]
    fn test_zero_input_stops_and_cancels_ramp() {
        let mut sm = walking();
        sm.speed_up(true);
        sm.set_move_input(Vec2::ZERO, false, false);
        assert_eq!(sm.forward_velocity(), 0.0);
        assert_eq!(sm.ramp(), None);
        assert!(!sm.is_speed_up());
    }

    #[test]
    fn test_speed_up_ramps_to_run() {
        let mut sm = walking();
        sm.speed_up(true);
        assert_eq!(sm.ramp(), Some(SpeedRamp::Accelerate));

        // (7.0 - 2.8) / 0.2 = 21 ticks
        for _ in 0..21 {
            sm.step_ramp();
        }
        assert_abs_diff_eq!(sm.forward_velocity(), RUN, epsilon = 1e-4);
        assert_eq!(sm.locomotion_state(), LocomotionState::Run);

        sm.step_ramp();
        assert_eq!(sm.ramp(), None);
        assert_abs_diff_eq!(sm.forward_velocity(), RUN, epsilon = 1e-4);
    }

    #[test]
    fn test_ramps_are_asymmetric() {
        let mut sm = walking();
        sm.speed_up(true);
        for _ in 0..30 {
            sm.step_ramp();
        }
        sm.speed_cut();
        sm.step_ramp();
        assert_abs_diff_eq!(sm.forward_velocity(), RUN - 0.1, epsilon = 1e-4);

        for _ in 0..60 {
            sm.step_ramp();
        }
        assert_abs_diff_eq!(sm.forward_velocity(), WALK, epsilon = 1e-4);
        assert_eq!(sm.ramp(), None);
    }

    #[test]
    fn test_opposite_ramp_supersedes() {
        let mut sm = walking();
        sm.speed_up(true);
        sm.step_ramp();
        sm.speed_cut();
        assert_eq!(sm.ramp(), Some(SpeedRamp::Decelerate));
        sm.speed_up(true);
        assert_eq!(sm.ramp(), Some(SpeedRamp::Accelerate));
    }

    #[test]
    fn test_speed_up_needs_forward_motion_and_pp() {
        let mut sm = CharacterStateMachine::default();
        sm.speed_up(true);
        assert!(!sm.is_speed_up());
        assert_eq!(sm.ramp(), None);

        let mut sm = walking();
        sm.speed_up(false);
        assert!(!sm.is_speed_up());
    }

    #[test]
    fn test_roll_snaps_to_run_and_restores_walk() {
        let mut sm = walking();
        sm.begin_roll();
        assert_eq!(sm.forward_velocity(), RUN);
        assert!(!sm.hit_enabled());

        sm.end_roll(false);
        assert!(sm.hit_enabled());
        assert_abs_diff_eq!(sm.forward_velocity(), WALK, epsilon = 1e-5);
    }

    #[test]
    fn test_roll_exit_while_standing_stays_still() {
        let mut sm = CharacterStateMachine::default();
        sm.begin_roll();
        sm.end_roll(false);
        assert_eq!(sm.forward_velocity(), 0.0);
    }

    #[test]
    fn test_locked_backward_roll_exit() {
        let mut sm = CharacterStateMachine::default();
        sm.set_move_input(Vec2::NEG_Y, true, false);
        sm.begin_roll();
        sm.end_roll(true);
        assert_abs_diff_eq!(sm.forward_velocity(), -WALK, epsilon = 1e-5);
    }

    #[test]
    fn test_attack_phase_follows_tags() {
        let mut sm = CharacterStateMachine::default();
        sm.sync_attack_phase(&snapshot(states::SOFT_ATTACK_1, &[tags::ATTACK]));
        assert_eq!(sm.phase(), CombatPhase::Attacking);
        sm.sync_attack_phase(&snapshot(states::LOCOMOTION, &[tags::GROUND]));
        assert_eq!(sm.phase(), CombatPhase::Neutral);
    }

    #[test]
    fn test_impact_disables_actions_until_exit() {
        let mut sm = CharacterStateMachine::default();
        assert!(sm.impact());
        assert!(!sm.actions_enabled());
        assert!(sm.hit_enabled());
        sm.end_impact();
        assert!(sm.actions_enabled());
        assert_eq!(sm.phase(), CombatPhase::Neutral);
    }

    #[test]
    fn test_execution_only_from_stun() {
        let mut sm = CharacterStateMachine::default();
        assert!(!sm.be_executed());

        assert!(sm.stun());
        assert!(sm.be_executed());
        assert!(!sm.hit_enabled());

        // The stun exit fired by the interrupted clip is ignored
        sm.end_stun();
        assert_eq!(sm.phase(), CombatPhase::Executed);

        sm.recover();
        assert!(sm.actions_enabled());
        assert!(sm.hit_enabled());
    }

    #[test]
    fn test_dead_is_terminal() {
        let mut sm = walking();
        assert!(sm.die());
        assert!(!sm.actions_enabled());
        assert!(!sm.hit_enabled());
        assert_eq!(sm.forward_velocity(), 0.0);

        assert!(!sm.impact());
        assert!(!sm.stun());
        sm.recover();
        sm.end_roll(false);
        assert_eq!(sm.phase(), CombatPhase::Dead);
        assert!(!sm.hit_enabled());
    }

    #[test]
    fn test_phase_table() {
        use CombatPhase::*;
        assert!(Neutral.can_transition_to(Attacking));
        assert!(Stunned.can_transition_to(Executed));
        assert!(Executed.can_transition_to(Dead));
        assert!(!Neutral.can_transition_to(Executed));
        assert!(!Executed.can_transition_to(Impact));
        assert!(!Dead.can_transition_to(Neutral));
    }

    #[test]
    fn test_unlocked_movement_follows_pivot() {
        let sm = walking();
        let pivot = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
        let snap = snapshot(states::LOCOMOTION, &[tags::GROUND]);

        let (translation, rotation) = sm.movement(false, Quat::IDENTITY, pivot, &snap, 1.0);
        assert_abs_diff_eq!(translation.x, WALK, epsilon = 1e-4);
        assert_abs_diff_eq!(translation.z, 0.0, epsilon = 1e-4);
        assert!(rotation.is_some());
    }

    #[test]
    fn test_locked_movement_strafes_in_character_space() {
        let mut sm = CharacterStateMachine::default();
        sm.set_move_input(Vec2::X, true, false);
        let snap = snapshot(states::LOCK_LOCOMOTION, &[tags::GROUND]);

        let (translation, rotation) =
            sm.movement(true, Quat::IDENTITY, Quat::IDENTITY, &snap, 1.0);
        assert_abs_diff_eq!(translation.x, WALK, epsilon = 1e-4);
        assert_abs_diff_eq!(translation.z, 0.0, epsilon = 1e-4);
        assert!(rotation.is_some());
    }
}
