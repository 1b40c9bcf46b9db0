// Character system
//
// The fighter entity and its arena, HP/PP pools, the locomotion and combat
// state machine, and the per-tick animation snapshot.

pub mod character;
pub mod properties;
pub mod snapshot;
pub mod state;

pub use character::{Character, CharacterId, CharacterManager};
pub use properties::PropertyStore;
pub use snapshot::AnimationSnapshot;
pub use state::{CharacterStateMachine, CombatPhase, LocomotionState, SpeedRamp};
