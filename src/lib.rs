//! Character control and melee combat core for a third-person action duel.
//!
//! The crate is headless: an [`engine::animation::AnimationOracle`] and a
//! physics backend implementing [`engine::physics::PhysicsOracle`] and
//! [`engine::physics::MotionSink`] are plugged into a [`game::BattleWorld`],
//! which runs the fixed-step simulation.

pub mod core;
pub mod engine;
pub mod game;
