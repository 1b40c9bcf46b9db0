// Gameplay: characters, combat, camera and the world that ties them together

pub mod camera;
pub mod characters;
pub mod combat;
pub mod config;
pub mod drivers;
pub mod team;
pub mod world;

pub use config::{ConfigError, GameConfig};
pub use drivers::{AttackLoopDriver, CharacterDriver, Command, DriverContext, ScriptedDriver};
pub use team::Team;
pub use world::{BattleWorld, CharacterSpawn};
