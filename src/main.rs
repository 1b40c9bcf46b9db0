use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use glam::{Quat, Vec2, Vec3};
use log::info;

use duel_core::engine::animation::StateGraphAnimator;
use duel_core::engine::physics::PhysicsWorld;
use duel_core::game::combat::CombatEvent;
use duel_core::game::{
    AttackLoopDriver, BattleWorld, CharacterSpawn, Command, GameConfig, ScriptedDriver, Team,
};

/// Longest fight the demo will simulate
const MAX_SECONDS: f32 = 30.0;

/// Player input for the demo fight: close in, lock on, then alternate
/// counters and swings.
fn player_script() -> ScriptedDriver {
    let approach = [
        (1, Command::Lock),
        (2, Command::Move(Vec2::Y)),
        (40, Command::Move(Vec2::ZERO)),
    ];
    let fight = (0..24u64).map(|i| {
        let tick = 60 + i * 45;
        let command = if i % 3 == 2 {
            Command::HeavyAttack
        } else {
            Command::SoftAttack
        };
        (tick, command)
    });
    ScriptedDriver::from_entries(approach.into_iter().chain(fight))
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    info!("Starting duel demo...");

    let config = match std::env::args().nth(1) {
        Some(path) => GameConfig::load(Path::new(&path))
            .with_context(|| format!("loading tuning from {}", path))?,
        None => GameConfig::default(),
    };

    let mut physics = PhysicsWorld::new();
    physics.add_ground(50.0);
    let mut world = BattleWorld::new(config, physics);

    let player = world.spawn(
        CharacterSpawn::new("Player", Team::Player).with_driver(Box::new(player_script())),
    );

    // The enemy swings on a timer with a faster animator
    let mut enemy_animator = StateGraphAnimator::humanoid();
    enemy_animator.set_playback_speed(1.5);
    let enemy = world.spawn(
        CharacterSpawn::new("Enemy", Team::Enemy)
            .at(Vec3::new(0.0, 0.0, 4.0))
            .facing(Quat::from_rotation_y(std::f32::consts::PI))
            .with_animator(Box::new(enemy_animator))
            .with_driver(Box::new(AttackLoopDriver::default())),
    );

    let frame = Duration::from_secs_f32(world.clock().fixed_timestep());
    let max_ticks = world.clock().ticks_for(MAX_SECONDS);

    while world.tick() < max_ticks {
        world.update(frame);

        for event in world.drain_events() {
            match event {
                CombatEvent::Died { victim } => info!("Character {} is down", victim),
                other => log::debug!("{:?}", other),
            }
        }

        if world.alive_in(Team::Player) == 0 || world.alive_in(Team::Enemy) == 0 {
            break;
        }
    }

    for id in [player, enemy] {
        if let Some(character) = world.character(id) {
            info!(
                "{}: {:.1} HP, {:.1} PP, {}",
                character.name,
                character.properties.hp(),
                character.properties.pp(),
                if character.is_alive() { "standing" } else { "dead" }
            );
        }
    }
    info!(
        "Duel finished after {:.2}s ({} ticks)",
        world.clock().elapsed_secs(),
        world.tick()
    );

    Ok(())
}
