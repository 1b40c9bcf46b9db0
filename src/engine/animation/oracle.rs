// Contract between the combat core and whatever plays the character's animations

use glam::Vec3;

/// One-shot transition requests understood by the animator
pub mod triggers {
    pub const ROLL: &str = "Roll";
    pub const JUMP: &str = "Jump";
    pub const IMPACT: &str = "Impact";
    pub const DIE: &str = "Die";
    pub const EXECUTE: &str = "Execute";
    pub const STUNNED: &str = "Stunned";
    pub const BE_EXECUTED: &str = "Be Executed";
    pub const SOFT_ATTACK: &str = "Soft Attack";
    pub const HEAVY_ATTACK: &str = "Heavy Attack";
}

/// Continuous animator parameters
pub mod params {
    /// Forward speed, normalised by run speed (-1 when backing off)
    pub const SPEED: &str = "Speed";
    /// Sideways input (-1 left, 1 right)
    pub const DIRECTION: &str = "Direction";
    /// Whether a lock-on target is held
    pub const LOCK: &str = "Lock";
}

/// State names the core compares against
pub mod states {
    pub const LOCOMOTION: &str = "Locomotion";
    pub const LOCK_LOCOMOTION: &str = "Lock Locomotion";
    pub const ROLL: &str = "Roll";
    pub const JUMP: &str = "Jump";
    pub const SOFT_ATTACK_1: &str = "Soft Attack 1";
    pub const SOFT_ATTACK_2: &str = "Soft Attack 2";
    pub const COUNTER: &str = "Counter";
    pub const DEFENCE: &str = "Defence";
    pub const EXECUTE: &str = "Execute";
    pub const IMPACT: &str = "Impact";
    pub const STUNNED: &str = "Stunned";
    pub const BE_EXECUTED: &str = "Be Executed";
    pub const DIE: &str = "Die";
}

/// State tags the core gates behaviour on
pub mod tags {
    pub const GROUND: &str = "Ground";
    pub const ATTACK: &str = "Attack";
    pub const UNCONTROLLABLE: &str = "Uncontrollable";
    pub const STUNNED: &str = "Stunned";
    pub const DEAD: &str = "Dead";
}

/// Callbacks raised by animation clips (state enter/exit and timed notifies)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimationEvent {
    /// First frame of an attack swing, locomotion stops
    AttackEnter,
    /// Strike window opens
    StrikeEnable,
    /// Strike window closes
    StrikeDisable,
    /// Counter window opens
    CounterEnable,
    /// Counter window closes
    CounterDisable,
    /// An attack state was left
    AttackExit,
    /// Roll clip started, hits are ignored until `RollExit`
    RollEnter,
    RollExit,
    /// Hit reaction started, actions stay locked until `ImpactExit`
    ImpactEnter,
    ImpactExit,
    StunnedExit,
    BeExecutedExit,
    /// Lunge during a jab, scaled by the clip's jab curve
    Jab { velocity: f32 },
}

/// Animation-state reporting facility for one character.
///
/// The core reads the current state once per tick and pushes triggers and
/// parameters back. Implementations may be a real animation runtime or the
/// in-crate [`StateGraphAnimator`](super::StateGraphAnimator).
pub trait AnimationOracle: std::fmt::Debug {
    /// Name of the state currently playing on the base layer
    fn current_state_name(&self) -> String;

    /// Tags attached to the current state
    fn current_state_tags(&self) -> Vec<String>;

    /// Whether the base layer is blending between two states
    fn is_in_transition(&self) -> bool;

    /// Request a one-shot transition
    fn set_trigger(&mut self, trigger: &str);

    fn set_float(&mut self, param: &str, value: f32);

    fn set_bool(&mut self, param: &str, value: bool);

    /// Step the animation by `dt` seconds. Externally driven runtimes ignore this.
    fn advance(&mut self, _dt: f32) {}

    /// Events raised since the last call
    fn drain_events(&mut self) -> Vec<AnimationEvent>;

    /// Root motion accumulated since the last call, in character-local space
    fn take_root_motion(&mut self) -> Vec3;
}
