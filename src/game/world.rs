// Battle world
//
// Owns every character, their drivers and the physics collaborator, and runs
// the fixed-step tick. Within a tick each character's animation snapshot is
// read once and every decision uses that copy.

use std::collections::HashMap;
use std::time::Duration;

use glam::{Quat, Vec3};

use crate::core::math::forward;
use crate::engine::animation::{AnimationOracle, StateGraphAnimator};
use crate::engine::game_loop::{SimulationClock, Tick};
use crate::engine::physics::{ContactKind, MotionSink, PhysicsOracle, Pose};
use crate::game::camera::{select_target, LockCheck, LockTargetView};
use crate::game::characters::{Character, CharacterId, CharacterManager};
use crate::game::combat::{
    execute, resolve_clash, resolve_strike, CombatEvent, LockReleaseReason,
};
use crate::game::config::{GameConfig, PropertyConfig, WeaponProfile};
use crate::game::drivers::{CharacterDriver, Command, DriverContext};
use crate::game::team::{is_valid_target, Team};

/// Everything needed to bring a character into the world
#[derive(Debug)]
pub struct CharacterSpawn {
    name: String,
    team: Team,
    pose: Pose,
    animator: Option<Box<dyn AnimationOracle>>,
    camera: bool,
    properties: Option<PropertyConfig>,
    weapon: Option<WeaponProfile>,
    driver: Option<Box<dyn CharacterDriver>>,
}

impl CharacterSpawn {
    /// Stock humanoid with a camera rig at the origin
    pub fn new(name: &str, team: Team) -> Self {
        Self {
            name: name.to_string(),
            team,
            pose: Pose::default(),
            animator: None,
            camera: true,
            properties: None,
            weapon: None,
            driver: None,
        }
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.pose.position = position;
        self
    }

    pub fn facing(mut self, rotation: Quat) -> Self {
        self.pose.rotation = rotation;
        self
    }

    pub fn with_animator(mut self, animator: Box<dyn AnimationOracle>) -> Self {
        self.animator = Some(animator);
        self
    }

    /// Spawn without a camera rig (no lock-on, world-frame movement)
    pub fn without_camera(mut self) -> Self {
        self.camera = false;
        self
    }

    pub fn with_properties(mut self, properties: PropertyConfig) -> Self {
        self.properties = Some(properties);
        self
    }

    pub fn with_weapon(mut self, weapon: WeaponProfile) -> Self {
        self.weapon = Some(weapon);
        self
    }

    pub fn with_driver(mut self, driver: Box<dyn CharacterDriver>) -> Self {
        self.driver = Some(driver);
        self
    }
}

pub struct BattleWorld<P> {
    config: GameConfig,
    physics: P,
    characters: CharacterManager,
    drivers: HashMap<CharacterId, Box<dyn CharacterDriver>>,
    clock: SimulationClock,
    events: Vec<CombatEvent>,
}

impl<P> std::fmt::Debug for BattleWorld<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BattleWorld")
            .field("tick", &self.clock.tick())
            .field("characters", &self.characters.count())
            .field("pending_events", &self.events.len())
            .finish()
    }
}

impl<P: PhysicsOracle + MotionSink> BattleWorld<P> {
    pub fn new(config: GameConfig, physics: P) -> Self {
        let clock = SimulationClock::new(
            config.simulation.fixed_timestep,
            config.simulation.max_catch_up_steps,
        );
        Self {
            config,
            physics,
            characters: CharacterManager::new(),
            drivers: HashMap::new(),
            clock,
            events: Vec::new(),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn physics(&self) -> &P {
        &self.physics
    }

    pub fn physics_mut(&mut self) -> &mut P {
        &mut self.physics
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut SimulationClock {
        &mut self.clock
    }

    pub fn tick(&self) -> Tick {
        self.clock.tick()
    }

    pub fn characters(&self) -> &[Character] {
        self.characters.all()
    }

    pub fn character(&self, id: CharacterId) -> Option<&Character> {
        self.characters.get(id)
    }

    pub fn character_mut(&mut self, id: CharacterId) -> Option<&mut Character> {
        self.characters.get_mut(id)
    }

    /// Living characters on a team
    pub fn alive_in(&self, team: Team) -> usize {
        self.characters
            .all()
            .iter()
            .filter(|c| c.team == team && c.is_alive())
            .count()
    }

    /// Combat events since the last drain
    pub fn drain_events(&mut self) -> Vec<CombatEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn spawn(&mut self, spawn: CharacterSpawn) -> CharacterId {
        let id = self.characters.allocate_id();
        let animator = spawn
            .animator
            .unwrap_or_else(|| Box::new(StateGraphAnimator::humanoid()));
        let properties = spawn
            .properties
            .unwrap_or_else(|| self.config.properties.clone());
        let weapon = spawn.weapon.unwrap_or_else(|| self.config.weapon.clone());

        self.physics.spawn_entity(id, spawn.pose);
        let character = Character::with_loadout(
            id,
            &spawn.name,
            spawn.team,
            spawn.pose,
            animator,
            &self.config,
            spawn.camera,
            properties,
            weapon,
        );
        log::info!(
            "Spawned {} ({:?}) as character {} at {}",
            spawn.name,
            spawn.team,
            id,
            spawn.pose.position
        );
        self.characters.insert(character);

        if let Some(driver) = spawn.driver {
            self.drivers.insert(id, driver);
        }
        id
    }

    /// Remove a character. Locks held on it drop at the next validity check.
    pub fn despawn(&mut self, id: CharacterId) -> bool {
        let Some(character) = self.characters.remove(id) else {
            return false;
        };
        self.drivers.remove(&id);
        self.physics.remove_entity(id);
        log::info!("Despawned {} ({})", character.name, id);
        true
    }

    pub fn set_driver(&mut self, id: CharacterId, driver: Box<dyn CharacterDriver>) {
        self.drivers.insert(id, driver);
    }

    pub fn clear_driver(&mut self, id: CharacterId) {
        self.drivers.remove(&id);
    }

    /// Apply one command now. Rejected commands do nothing.
    pub fn command(&mut self, id: CharacterId, command: Command) {
        let dt = self.clock.fixed_timestep();
        match command {
            Command::Lock => self.lock(id),
            Command::UnLock => self.unlock(id),
            Command::ToggleLock => {
                if self.characters.get(id).is_some_and(|c| c.is_locked()) {
                    self.unlock(id);
                } else {
                    self.lock(id);
                }
            }
            Command::SoftAttack => self.soft_attack(id),
            other => {
                let Some(character) = self.characters.get_mut(id) else {
                    return;
                };
                match other {
                    Command::Move(direction) => character.move_to(direction),
                    Command::SpeedUp => character.speed_up(),
                    Command::SpeedCut => character.speed_cut(),
                    Command::Roll => character.roll(),
                    Command::Jump => character.jump(),
                    Command::HeavyAttack => character.heavy_attack(),
                    Command::SightPosChange(delta) => character.sight_pos_change(delta, dt),
                    Command::SightDistanceChange(delta) => {
                        character.sight_distance_change(delta, dt)
                    }
                    Command::Lock
                    | Command::UnLock
                    | Command::ToggleLock
                    | Command::SoftAttack => {}
                }
            }
        }
    }

    /// Acquire a lock target through the holder's camera probe
    fn lock(&mut self, id: CharacterId) {
        let Some(holder) = self.characters.get(id) else {
            return;
        };
        let Some(rig) = holder.camera.as_ref() else {
            log::trace!("{} cannot lock without a camera rig", holder.name);
            return;
        };
        if !holder.is_alive() {
            return;
        }

        let probe = rig.lock_probe();
        let found = self
            .physics
            .overlap_box(probe.center, probe.half_extents, probe.rotation);
        let candidates = found.into_iter().filter_map(|other_id| {
            let other = self.characters.get(other_id)?;
            is_valid_target(id, holder.team, other_id, other.team)
                .then_some((other_id, other.pose.position))
        });
        let Some(target) = select_target(rig.lock_config().selection, rig.position(), candidates)
        else {
            log::trace!("{} found nothing to lock onto", holder.name);
            return;
        };

        if let Some(holder) = self.characters.get_mut(id) {
            if holder.bind_lock(target) {
                log::debug!("{} locked onto {}", holder.name, target);
                self.events.push(CombatEvent::LockAcquired { holder: id, target });
            }
        }
    }

    fn unlock(&mut self, id: CharacterId) {
        if let Some(holder) = self.characters.get_mut(id) {
            holder.release_lock(LockReleaseReason::Requested, &mut self.events);
        }
    }

    /// Execute a stunned enemy in reach, otherwise swing
    fn soft_attack(&mut self, id: CharacterId) {
        let Some(attacker) = self.characters.get(id) else {
            return;
        };
        if !attacker.can_attack() {
            return;
        }

        if let Some(victim) = self.find_execute_target(attacker) {
            if let Some((executor, victim)) = self.characters.pair_mut(id, victim) {
                if execute(executor, victim, &self.config.execute, &mut self.events) {
                    return;
                }
            }
        }

        if let Some(attacker) = self.characters.get_mut(id) {
            attacker.swing();
        }
    }

    fn find_execute_target(&self, executor: &Character) -> Option<CharacterId> {
        let config = &self.config.execute;
        let rotation = executor.pose.rotation;
        let center = executor.pivot_position() + forward(rotation) * config.probe_forward;

        let found = self
            .physics
            .overlap_box(center, config.probe_half_extents, rotation);
        let candidates = found.into_iter().filter_map(|other_id| {
            let other = self.characters.get(other_id)?;
            let valid = is_valid_target(executor.id, executor.team, other_id, other.team)
                && other.snapshot().is_stunned();
            valid.then_some((other_id, other.pose.position))
        });
        select_target(config.selection, executor.pose.position, candidates)
    }

    /// Feed a frame time and run the ticks it covers
    pub fn update(&mut self, frame_time: Duration) -> u32 {
        let steps = self.clock.begin_frame(frame_time);
        for _ in 0..steps {
            self.step();
        }
        steps
    }

    /// Run exactly one simulation tick
    pub fn step(&mut self) {
        let dt = self.clock.fixed_timestep();
        let now = self.clock.advance();

        self.sync_poses();
        self.run_drivers(now, dt);

        for character in self.characters.all_mut() {
            character.advance_animation(dt, now, &mut self.events);
        }
        for character in self.characters.all_mut() {
            character.fixed_update(dt);
        }

        self.update_cameras();
        self.resolve_contacts();

        for character in self.characters.all_mut() {
            let motion = character.take_motion();
            if !motion.is_empty() {
                self.physics.apply_motion(character.id, &motion);
            }
        }
        self.physics.step(dt);
        self.sync_poses();
    }

    fn sync_poses(&mut self) {
        for character in self.characters.all_mut() {
            if let Some(pose) = self.physics.entity_pose(character.id) {
                character.pose = pose;
            }
        }
    }

    fn run_drivers(&mut self, now: Tick, dt: f32) {
        for id in self.characters.ids() {
            let (Some(driver), Some(character)) =
                (self.drivers.get_mut(&id), self.characters.get(id))
            else {
                continue;
            };
            let commands = driver.commands(&DriverContext {
                tick: now,
                dt,
                character,
            });
            for command in commands {
                self.command(id, command);
            }
        }
    }

    fn update_cameras(&mut self) {
        let targets: HashMap<CharacterId, Option<LockTargetView>> = self
            .characters
            .all()
            .iter()
            .filter_map(|c| c.lock_target().map(|target| (c.id, target)))
            .map(|(holder, target)| {
                let view = self.characters.get(target).map(|t| LockTargetView {
                    position: t.pose.position,
                    alive: t.is_alive() && !t.properties.is_depleted(),
                });
                (holder, view)
            })
            .collect();

        for character in self.characters.all_mut() {
            let pose = character.pose;
            let target = targets.get(&character.id).copied().flatten();
            let Some(rig) = character.camera.as_mut() else {
                continue;
            };
            if let LockCheck::Released { target, reason } = rig.update(pose, target, &self.physics)
            {
                character.lock_released(target, reason, &mut self.events);
            }
        }
    }

    /// Clashes resolve before strikes so a parried swing cannot land
    fn resolve_contacts(&mut self) {
        let mut contacts = self.physics.weapon_contacts();
        contacts.sort_by_key(|contact| contact.kind != ContactKind::Weapon);
        for contact in contacts {
            let Some((owner, other)) = self
                .characters
                .pair_mut(contact.weapon_owner, contact.other)
            else {
                continue;
            };
            match contact.kind {
                ContactKind::Hurtbox => {
                    resolve_strike(owner, other, &mut self.events);
                }
                ContactKind::Weapon => {
                    resolve_clash(owner, other, &mut self.events);
                }
            }
        }
    }
}
