// Character entity and management

use glam::{Quat, Vec2, Vec3};

use crate::core::math::forward;
use crate::engine::animation::{params, triggers, AnimationEvent, AnimationOracle};
use crate::engine::game_loop::Tick;
use crate::engine::physics::{EntityId, MotionOutput, Pose};
use crate::game::camera::{pivot_of, CameraRig};
use crate::game::combat::{CombatEvent, HitLedger, LockReleaseReason, WeaponState};
use crate::game::config::{GameConfig, PropertyConfig, WeaponProfile};
use crate::game::team::Team;

use super::properties::PropertyStore;
use super::snapshot::AnimationSnapshot;
use super::state::{CharacterStateMachine, CombatPhase};

/// Unique identifier for a character
pub type CharacterId = EntityId;

/// A fighter: resources, weapon, state machine, optional camera rig and the
/// animator that drives them
#[derive(Debug)]
pub struct Character {
    pub id: CharacterId,
    /// Display name
    pub name: String,
    pub team: Team,
    /// Pose after the last physics step
    pub pose: Pose,

    pub properties: PropertyStore,
    pub weapon: WeaponState,
    pub state_machine: CharacterStateMachine,
    /// Absent when the character was wired without a camera rig
    pub camera: Option<CameraRig>,
    pub ledger: HitLedger,

    animator: Box<dyn AnimationOracle>,
    snapshot: AnimationSnapshot,
    motion: MotionOutput,
    pivot_height: f32,
}

impl Character {
    /// Wire a character. Pass `camera: false` to run it without a rig; lock
    /// commands then do nothing and movement uses the world frame.
    pub fn new(
        id: CharacterId,
        name: &str,
        team: Team,
        pose: Pose,
        animator: Box<dyn AnimationOracle>,
        config: &GameConfig,
        camera: bool,
    ) -> Self {
        Self::with_loadout(
            id,
            name,
            team,
            pose,
            animator,
            config,
            camera,
            config.properties.clone(),
            config.weapon.clone(),
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn with_loadout(
        id: CharacterId,
        name: &str,
        team: Team,
        pose: Pose,
        animator: Box<dyn AnimationOracle>,
        config: &GameConfig,
        camera: bool,
        properties: PropertyConfig,
        weapon: WeaponProfile,
    ) -> Self {
        let camera = if camera {
            Some(CameraRig::new(
                config.camera.clone(),
                config.lock_on.clone(),
                pose,
            ))
        } else {
            log::warn!(
                "Character {} ({}) has no camera rig; lock-on disabled, moving in world frame",
                id,
                name
            );
            None
        };

        let mut character = Self {
            id,
            name: name.to_string(),
            team,
            pose,
            state_machine: CharacterStateMachine::new(config.locomotion.clone(), &properties),
            properties: PropertyStore::new(properties),
            weapon: WeaponState::new(weapon),
            camera,
            ledger: HitLedger::new(config.ledger.clone()),
            snapshot: AnimationSnapshot::capture(animator.as_ref()),
            animator,
            motion: MotionOutput::default(),
            pivot_height: config.camera.pivot_height,
        };
        character.animator.set_bool(params::LOCK, false);
        character
    }

    /// Animation state read this tick
    pub fn snapshot(&self) -> &AnimationSnapshot {
        &self.snapshot
    }

    pub fn animator(&self) -> &dyn AnimationOracle {
        self.animator.as_ref()
    }

    pub fn is_alive(&self) -> bool {
        !self.state_machine.is_dead()
    }

    pub fn is_locked(&self) -> bool {
        self.camera.as_ref().is_some_and(|rig| rig.is_locked())
    }

    pub fn lock_target(&self) -> Option<CharacterId> {
        self.camera.as_ref().and_then(|rig| rig.lock_target())
    }

    /// Look pivot above the character
    pub fn pivot_position(&self) -> Vec3 {
        self.camera
            .as_ref()
            .map(|rig| rig.pivot_position())
            .unwrap_or_else(|| pivot_of(self.pose, self.pivot_height))
    }

    /// Movement frame; world frame without a rig
    pub fn pivot_rotation(&self) -> Quat {
        self.camera
            .as_ref()
            .map(|rig| rig.pivot_rotation())
            .unwrap_or(Quat::IDENTITY)
    }

    fn can_act(&self, action: &str) -> bool {
        if !self.state_machine.actions_enabled() {
            log::trace!("{} ignored {}: actions disabled", self.name, action);
            return false;
        }
        if !self.properties.has_pp() {
            log::trace!("{} ignored {}: no PP", self.name, action);
            return false;
        }
        true
    }

    // Commands

    /// Set the movement direction (x = right, y = forward, camera relative)
    pub fn move_to(&mut self, direction: Vec2) {
        let locked = self.is_locked();
        self.state_machine
            .set_move_input(direction, locked, self.snapshot.is_attack());
        self.animator.set_float(params::DIRECTION, direction.x);
    }

    pub fn speed_up(&mut self) {
        self.state_machine.speed_up(self.properties.has_pp());
    }

    pub fn speed_cut(&mut self) {
        self.state_machine.speed_cut();
    }

    pub fn roll(&mut self) {
        if !self.can_act("roll") {
            return;
        }
        if !self.snapshot.is_ground() || self.snapshot.in_transition {
            log::trace!("{} ignored roll: not grounded", self.name);
            return;
        }
        self.properties.change_pp(-self.properties.config().roll_cost);
        self.animator.set_trigger(triggers::ROLL);
    }

    pub fn jump(&mut self) {
        if !self.can_act("jump") {
            return;
        }
        let config = self.properties.config();
        let (cost, power) = (config.jump_cost, config.jump_power);
        self.properties.change_pp(-cost);
        self.motion.velocity_change += Vec3::Y * power;
        self.animator.set_trigger(triggers::JUMP);
    }

    /// Whether an attack command would be accepted this tick
    pub fn can_attack(&self) -> bool {
        if self.snapshot.in_transition {
            log::trace!("{} ignored attack: animator in transition", self.name);
            return false;
        }
        self.can_act("attack")
    }

    /// Plain swing; the execute check happens before this is reached
    pub fn swing(&mut self) {
        if !self.can_attack() {
            return;
        }
        self.animator.set_trigger(triggers::SOFT_ATTACK);
        self.properties
            .change_pp(-self.weapon.profile().soft_attack_cost);
    }

    /// Heavy attack enters the counter move
    pub fn heavy_attack(&mut self) {
        if !self.can_attack() {
            return;
        }
        self.animator.set_trigger(triggers::HEAVY_ATTACK);
        self.properties
            .change_pp(-self.weapon.profile().counter_cost);
    }

    pub fn sight_pos_change(&mut self, delta: Vec2, dt: f32) {
        if let Some(rig) = self.camera.as_mut() {
            rig.sight_pos_change(delta, dt);
        }
    }

    pub fn sight_distance_change(&mut self, delta: f32, dt: f32) {
        if let Some(rig) = self.camera.as_mut() {
            rig.sight_distance_change(delta, dt);
        }
    }

    /// Bind a lock target chosen by the world
    pub fn bind_lock(&mut self, target: CharacterId) -> bool {
        let Some(rig) = self.camera.as_mut() else {
            return false;
        };
        rig.bind_lock(target);
        self.animator.set_bool(params::LOCK, true);
        true
    }

    /// Drop the lock, queueing a release event when one was held
    pub fn release_lock(&mut self, reason: LockReleaseReason, events: &mut Vec<CombatEvent>) {
        let Some(target) = self.camera.as_mut().and_then(|rig| rig.release_lock()) else {
            return;
        };
        self.lock_released(target, reason, events);
    }

    /// Bookkeeping after the rig dropped its lock
    pub fn lock_released(
        &mut self,
        target: CharacterId,
        reason: LockReleaseReason,
        events: &mut Vec<CombatEvent>,
    ) {
        self.animator.set_bool(params::LOCK, false);
        log::debug!("{} released lock on {} ({:?})", self.name, target, reason);
        events.push(CombatEvent::LockReleased {
            holder: self.id,
            target,
            reason,
        });
    }

    // Reactions

    /// Stagger; actions lock when the Impact clip starts
    pub fn impact(&mut self) {
        self.animator.set_trigger(triggers::IMPACT);
    }

    pub fn stun(&mut self) -> bool {
        if !self.state_machine.stun() {
            return false;
        }
        self.weapon.disable_strike();
        self.animator.set_trigger(triggers::STUNNED);
        true
    }

    pub fn be_executed(&mut self) -> bool {
        if !self.state_machine.be_executed() {
            return false;
        }
        self.weapon.disable_strike();
        self.animator.set_trigger(triggers::BE_EXECUTED);
        true
    }

    /// Terminal: no actions, no hits, no lock, not targetable
    pub fn die(&mut self, events: &mut Vec<CombatEvent>) -> bool {
        if !self.state_machine.die() {
            return false;
        }
        self.weapon.disable_strike();
        self.release_lock(LockReleaseReason::HolderBusy, events);
        self.team = Team::Neutral;
        self.animator.set_trigger(triggers::DIE);
        log::info!("{} died", self.name);
        events.push(CombatEvent::Died { victim: self.id });
        true
    }

    /// Move the character in front of an execution victim, facing it
    pub fn place_for_execution(&mut self, victim: Pose, offset: f32) {
        let pose = Pose::new(
            victim.position + forward(victim.rotation) * offset,
            victim.rotation * Quat::from_rotation_y(std::f32::consts::PI),
        );
        self.pose = pose;
        self.motion.teleport = Some(pose);
    }

    /// Execution bookkeeping on the executor's side
    pub fn begin_execution(&mut self, events: &mut Vec<CombatEvent>) {
        self.release_lock(LockReleaseReason::HolderBusy, events);
        self.animator.set_trigger(triggers::EXECUTE);
        self.properties
            .change_pp(-self.weapon.profile().execute_cost);
    }

    // Tick

    /// Step the animator, capture this tick's snapshot and react to clip events
    pub fn advance_animation(&mut self, dt: f32, now: Tick, events: &mut Vec<CombatEvent>) {
        self.animator.advance(dt);
        self.snapshot = AnimationSnapshot::capture(self.animator.as_ref());
        self.state_machine.sync_attack_phase(&self.snapshot);

        for event in self.animator.drain_events() {
            self.handle_event(event, now, events);
        }
    }

    pub fn handle_event(
        &mut self,
        event: AnimationEvent,
        now: Tick,
        events: &mut Vec<CombatEvent>,
    ) {
        log::trace!("{} animation event {:?}", self.name, event);
        match event {
            AnimationEvent::AttackEnter => self.state_machine.stop_move(),
            AnimationEvent::StrikeEnable => self.weapon.enable_strike(now),
            AnimationEvent::StrikeDisable | AnimationEvent::AttackExit => {
                self.weapon.disable_strike()
            }
            AnimationEvent::CounterEnable => self.weapon.enable_counter(),
            AnimationEvent::CounterDisable => self.weapon.disable_counter(),
            AnimationEvent::RollEnter => self.state_machine.begin_roll(),
            AnimationEvent::RollExit => {
                let locked = self.is_locked();
                self.state_machine.end_roll(locked);
            }
            AnimationEvent::ImpactEnter => {
                self.state_machine.impact();
            }
            AnimationEvent::ImpactExit => self.state_machine.end_impact(),
            AnimationEvent::StunnedExit => self.state_machine.end_stun(),
            AnimationEvent::BeExecutedExit => {
                if self.properties.is_depleted() {
                    self.die(events);
                } else if self.state_machine.phase() == CombatPhase::Executed {
                    self.state_machine.recover();
                    log::info!("{} recovered from execution", self.name);
                    events.push(CombatEvent::Recovered { victim: self.id });
                }
            }
            AnimationEvent::Jab { velocity } => {
                let power = self.properties.config().jab_power;
                self.motion.velocity_change += forward(self.pose.rotation) * power * velocity;
            }
        }
    }

    /// Resource economy, speed ramp and movement for one tick
    pub fn fixed_update(&mut self, dt: f32) {
        let speed_up = self.state_machine.is_speed_up();
        if (self.snapshot.is_ground() && !speed_up)
            || self.snapshot.is_uncontrollable()
            || self.snapshot.is_stunned()
        {
            self.properties.regen_pp();
        }

        if self.state_machine.actions_enabled() {
            if self.properties.pp() < 0.1 && self.state_machine.is_speed_up() {
                log::debug!("{} ran out of PP", self.name);
                self.state_machine.speed_cut();
            }
            if self.snapshot.is_ground() && self.state_machine.is_speed_up() {
                self.properties.drain_run_cost();
            }
        }

        self.state_machine.step_ramp();

        if self.state_machine.actions_enabled() {
            let (translation, rotation) = self.state_machine.movement(
                self.is_locked(),
                self.pose.rotation,
                self.pivot_rotation(),
                &self.snapshot,
                dt,
            );
            self.motion.translation += translation;
            if rotation.is_some() {
                self.motion.rotation = rotation;
            }
        }

        let root_motion = self.animator.take_root_motion();
        if self.snapshot.is_attack() {
            self.motion.translation += self.pose.rotation * root_motion;
        }

        self.animator
            .set_float(params::SPEED, self.state_machine.speed_param());
        self.animator
            .set_float(params::DIRECTION, self.state_machine.move_input().x);
    }

    /// Motion accumulated this tick, for the physics sink
    pub fn take_motion(&mut self) -> MotionOutput {
        std::mem::take(&mut self.motion)
    }

    pub fn pending_motion(&self) -> &MotionOutput {
        &self.motion
    }
}

/// Arena of all characters
#[derive(Debug, Default)]
pub struct CharacterManager {
    characters: Vec<Character>,
    next_id: CharacterId,
}

impl CharacterManager {
    pub fn new() -> Self {
        Self {
            characters: Vec::new(),
            next_id: 0,
        }
    }

    /// Reserve the id for the next character
    pub fn allocate_id(&mut self) -> CharacterId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn insert(&mut self, character: Character) {
        self.characters.push(character);
    }

    /// Get a character by ID
    pub fn get(&self, id: CharacterId) -> Option<&Character> {
        self.characters.iter().find(|c| c.id == id)
    }

    /// Get a mutable character by ID
    pub fn get_mut(&mut self, id: CharacterId) -> Option<&mut Character> {
        self.characters.iter_mut().find(|c| c.id == id)
    }

    /// Two distinct characters at once
    pub fn pair_mut(
        &mut self,
        a: CharacterId,
        b: CharacterId,
    ) -> Option<(&mut Character, &mut Character)> {
        let ia = self.characters.iter().position(|c| c.id == a)?;
        let ib = self.characters.iter().position(|c| c.id == b)?;
        if ia == ib {
            return None;
        }
        if ia < ib {
            let (left, right) = self.characters.split_at_mut(ib);
            Some((&mut left[ia], &mut right[0]))
        } else {
            let (left, right) = self.characters.split_at_mut(ia);
            Some((&mut right[0], &mut left[ib]))
        }
    }

    pub fn all(&self) -> &[Character] {
        &self.characters
    }

    pub fn all_mut(&mut self) -> &mut [Character] {
        &mut self.characters
    }

    pub fn ids(&self) -> Vec<CharacterId> {
        self.characters.iter().map(|c| c.id).collect()
    }

    /// Remove a character by ID
    pub fn remove(&mut self, id: CharacterId) -> Option<Character> {
        let pos = self.characters.iter().position(|c| c.id == id)?;
        Some(self.characters.remove(pos))
    }

    pub fn count(&self) -> usize {
        self.characters.len()
    }

    pub fn alive_count(&self) -> usize {
        self.characters.iter().filter(|c| c.is_alive()).count()
    }
}
