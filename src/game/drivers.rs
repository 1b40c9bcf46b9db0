// Character drivers
//
// Player input mappings and AI scripts are both just sources of commands.
// The world polls each driver once per tick before anything else runs.

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::engine::game_loop::Tick;
use crate::game::characters::Character;

/// Fire-and-forget command understood by a character
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Camera-relative direction, x = right, y = forward
    Move(Vec2),
    SpeedUp,
    SpeedCut,
    Roll,
    Jump,
    SoftAttack,
    HeavyAttack,
    Lock,
    UnLock,
    /// Lock when unlocked, unlock when locked
    ToggleLock,
    SightPosChange(Vec2),
    SightDistanceChange(f32),
}

/// What a driver may look at when deciding
#[derive(Debug)]
pub struct DriverContext<'a> {
    pub tick: Tick,
    pub dt: f32,
    pub character: &'a Character,
}

pub trait CharacterDriver: std::fmt::Debug {
    /// Commands to apply this tick, in order
    fn commands(&mut self, ctx: &DriverContext<'_>) -> Vec<Command>;
}

/// Soft-attacks on a fixed interval, starting immediately
#[derive(Debug, Clone)]
pub struct AttackLoopDriver {
    interval: f32,
    cooldown: f32,
}

impl AttackLoopDriver {
    pub const DEFAULT_INTERVAL: f32 = 0.5;

    pub fn new(interval: f32) -> Self {
        Self {
            interval,
            cooldown: 0.0,
        }
    }
}

impl Default for AttackLoopDriver {
    fn default() -> Self {
        Self::new(Self::DEFAULT_INTERVAL)
    }
}

impl CharacterDriver for AttackLoopDriver {
    fn commands(&mut self, ctx: &DriverContext<'_>) -> Vec<Command> {
        let mut commands = Vec::new();
        // Tolerance absorbs float drift from summing dt
        if self.cooldown <= 1e-4 {
            commands.push(Command::SoftAttack);
            self.cooldown += self.interval;
        }
        self.cooldown -= ctx.dt;
        commands
    }
}

/// Replays commands at fixed ticks
#[derive(Debug, Clone, Default)]
pub struct ScriptedDriver {
    schedule: BTreeMap<Tick, Vec<Command>>,
}

impl ScriptedDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a command at `tick`, after any already scheduled there
    pub fn at(mut self, tick: Tick, command: Command) -> Self {
        self.schedule.entry(tick).or_default().push(command);
        self
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (Tick, Command)>) -> Self {
        entries
            .into_iter()
            .fold(Self::new(), |driver, (tick, command)| driver.at(tick, command))
    }

    /// Commands not yet replayed
    pub fn remaining(&self) -> usize {
        self.schedule.values().map(Vec::len).sum()
    }
}

impl CharacterDriver for ScriptedDriver {
    fn commands(&mut self, ctx: &DriverContext<'_>) -> Vec<Command> {
        // Anything scheduled for a tick that already passed is dropped
        let late: Vec<Tick> = self.schedule.range(..ctx.tick).map(|(t, _)| *t).collect();
        for tick in late {
            self.schedule.remove(&tick);
        }
        self.schedule.remove(&ctx.tick).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::animation::oracle::fake::FakeAnimator;
    use crate::engine::physics::Pose;
    use crate::game::config::GameConfig;
    use crate::game::team::Team;

    const DT: f32 = 1.0 / 60.0;

    fn character() -> Character {
        Character::new(
            0,
            "driver-test",
            Team::Enemy,
            Pose::default(),
            Box::new(FakeAnimator::default()),
            &GameConfig::default(),
            false,
        )
    }

    #[test]
    fn test_attack_loop_fires_every_half_second() {
        let character = character();
        let mut driver = AttackLoopDriver::default();

        let fired: Vec<Tick> = (0..91)
            .filter(|&tick| {
                let ctx = DriverContext {
                    tick,
                    dt: DT,
                    character: &character,
                };
                driver.commands(&ctx) == vec![Command::SoftAttack]
            })
            .collect();
        assert_eq!(fired, vec![0, 30, 60, 90]);
    }

    #[test]
    fn test_scripted_driver_replays_in_order() {
        let character = character();
        let mut driver = ScriptedDriver::new()
            .at(2, Command::Move(Vec2::Y))
            .at(2, Command::SpeedUp)
            .at(5, Command::Roll);
        assert_eq!(driver.remaining(), 3);

        let mut poll = |tick| {
            driver.commands(&DriverContext {
                tick,
                dt: DT,
                character: &character,
            })
        };
        assert!(poll(0).is_empty());
        assert_eq!(poll(2), vec![Command::Move(Vec2::Y), Command::SpeedUp]);
        assert!(poll(2).is_empty());
        assert_eq!(poll(5), vec![Command::Roll]);
    }

    #[test]
    fn test_scripted_driver_drops_missed_ticks() {
        let character = character();
        let mut driver = ScriptedDriver::from_entries([(1, Command::Jump), (4, Command::Lock)]);

        let ctx = DriverContext {
            tick: 3,
            dt: DT,
            character: &character,
        };
        assert!(driver.commands(&ctx).is_empty());
        assert_eq!(driver.remaining(), 1);
    }

    #[test]
    fn test_commands_parse_from_ron() {
        let commands: Vec<Command> =
            ron::from_str("[Move((0.0, 1.0)), SoftAttack, SightDistanceChange(0.5)]")
                .expect("valid commands");
        assert_eq!(
            commands,
            vec![
                Command::Move(Vec2::new(0.0, 1.0)),
                Command::SoftAttack,
                Command::SightDistanceChange(0.5)
            ]
        );
    }
}
