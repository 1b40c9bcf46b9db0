// Gameplay tuning
//
// Every number the simulation uses lives here. Defaults reproduce the stock
// swordsman; a RON file can override any subset of fields.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading or validating a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Invalid config value {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

fn require_positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, format!("must be positive, got {}", value)))
    }
}

fn require_non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, format!("must not be negative, got {}", value)))
    }
}

/// Character resource pools and movement numbers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyConfig {
    pub max_hp: f32,
    pub max_pp: f32,
    /// PP regained per tick, as a percentage of max HP
    pub pp_regen_percent: f32,
    /// PP spent per tick while running, as a percentage of max HP
    pub run_cost_percent: f32,
    pub roll_cost: f32,
    pub jump_cost: f32,
    /// Base damage multiplied by the weapon factor
    pub strength: f32,
    /// Walk speed as a fraction of run speed
    pub walk_speed_percent: f32,
    /// Run speed in metres per second
    pub forward_speed: f32,
    /// Upward velocity change of a jump, metres per second
    pub jump_power: f32,
    /// Forward velocity change per unit of jab curve
    pub jab_power: f32,
}

/// The stock swordsman
pub const BASE_PROPERTIES: PropertyConfig = PropertyConfig {
    max_hp: 100.0,
    max_pp: 100.0,
    pp_regen_percent: 0.5,
    run_cost_percent: 0.5,
    roll_cost: 20.0,
    jump_cost: 10.0,
    strength: 10.0,
    walk_speed_percent: 0.4,
    forward_speed: 7.0,
    jump_power: 1.0,
    jab_power: 10.0,
};

impl Default for PropertyConfig {
    fn default() -> Self {
        BASE_PROPERTIES
    }
}

impl PropertyConfig {
    /// Walking speed in metres per second
    pub fn walk_speed(&self) -> f32 {
        self.forward_speed * self.walk_speed_percent
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("properties.max_hp", self.max_hp)?;
        require_positive("properties.max_pp", self.max_pp)?;
        require_positive("properties.forward_speed", self.forward_speed)?;
        require_non_negative("properties.pp_regen_percent", self.pp_regen_percent)?;
        require_non_negative("properties.run_cost_percent", self.run_cost_percent)?;
        require_non_negative("properties.roll_cost", self.roll_cost)?;
        require_non_negative("properties.jump_cost", self.jump_cost)?;
        require_non_negative("properties.strength", self.strength)?;
        if !(self.walk_speed_percent > 0.0 && self.walk_speed_percent <= 1.0) {
            return Err(invalid(
                "properties.walk_speed_percent",
                format!("must be in (0, 1], got {}", self.walk_speed_percent),
            ));
        }
        Ok(())
    }
}

/// Damage factors and costs of a weapon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponProfile {
    pub soft_attack_1_factor: f32,
    pub soft_attack_2_factor: f32,
    pub execute_factor: f32,
    pub soft_attack_cost: f32,
    pub counter_cost: f32,
    pub execute_cost: f32,
}

impl Default for WeaponProfile {
    fn default() -> Self {
        Self {
            soft_attack_1_factor: 1.0,
            soft_attack_2_factor: 1.2,
            execute_factor: 3.0,
            soft_attack_cost: 15.0,
            counter_cost: 25.0,
            execute_cost: 10.0,
        }
    }
}

impl WeaponProfile {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_negative("weapon.soft_attack_1_factor", self.soft_attack_1_factor)?;
        require_non_negative("weapon.soft_attack_2_factor", self.soft_attack_2_factor)?;
        require_non_negative("weapon.execute_factor", self.execute_factor)?;
        require_non_negative("weapon.soft_attack_cost", self.soft_attack_cost)?;
        require_non_negative("weapon.counter_cost", self.counter_cost)?;
        require_non_negative("weapon.execute_cost", self.execute_cost)
    }
}

/// Speed ramp rates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocomotionConfig {
    /// Speed gained per tick while speeding up
    pub accelerate_per_tick: f32,
    /// Speed lost per tick while slowing down
    pub decelerate_per_tick: f32,
    /// Speeds at or below this count as standing still
    pub moving_threshold: f32,
}

impl Default for LocomotionConfig {
    fn default() -> Self {
        Self {
            accelerate_per_tick: 0.2,
            decelerate_per_tick: 0.1,
            moving_threshold: 0.1,
        }
    }
}

impl LocomotionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("locomotion.accelerate_per_tick", self.accelerate_per_tick)?;
        require_positive("locomotion.decelerate_per_tick", self.decelerate_per_tick)?;
        require_non_negative("locomotion.moving_threshold", self.moving_threshold)
    }
}

/// How to choose among several overlap candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TargetSelection {
    /// First candidate the physics query reports
    #[default]
    FirstHit,
    /// Closest candidate to the probing character
    Nearest,
}

/// Lock-on acquisition and release
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockOnConfig {
    pub max_lockable_distance: f32,
    /// Extra distance tolerated before an existing lock is released
    pub release_margin: f32,
    /// Half width and half height of the probe box (depth follows the range)
    pub probe_half_width: f32,
    pub probe_half_height: f32,
    /// Probe centre, ahead of the camera
    pub probe_forward_offset: f32,
    pub probe_height: f32,
    /// Degrees
    pub max_depression: f32,
    /// Degrees
    pub max_elevation: f32,
    pub selection: TargetSelection,
}

impl Default for LockOnConfig {
    fn default() -> Self {
        Self {
            max_lockable_distance: 15.0,
            release_margin: 2.0,
            probe_half_width: 1.0,
            probe_half_height: 0.5,
            probe_forward_offset: 5.0,
            probe_height: 1.0,
            max_depression: 50.0,
            max_elevation: 35.0,
            selection: TargetSelection::FirstHit,
        }
    }
}

impl LockOnConfig {
    pub fn probe_half_extents(&self) -> Vec3 {
        Vec3::new(
            self.probe_half_width,
            self.probe_half_height,
            self.max_lockable_distance / 2.0,
        )
    }

    /// Distance beyond which a held lock is dropped
    pub fn release_distance(&self) -> f32 {
        self.max_lockable_distance + self.release_margin
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("lock_on.max_lockable_distance", self.max_lockable_distance)?;
        require_non_negative("lock_on.release_margin", self.release_margin)?;
        require_positive("lock_on.probe_half_width", self.probe_half_width)?;
        require_positive("lock_on.probe_half_height", self.probe_half_height)?;
        validate_angle("lock_on.max_depression", self.max_depression)?;
        validate_angle("lock_on.max_elevation", self.max_elevation)
    }
}

fn validate_angle(field: &'static str, degrees: f32) -> Result<(), ConfigError> {
    if (0.0..90.0).contains(&degrees) {
        Ok(())
    } else {
        Err(invalid(field, format!("must be in [0, 90), got {}", degrees)))
    }
}

/// Third-person camera rig
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub free_distance: f32,
    pub can_control_distance: bool,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Zoom units per second of input
    pub distance_speed: f32,
    /// Degrees per second of input
    pub rotate_speed: f32,
    /// Degrees
    pub max_depression: f32,
    /// Degrees
    pub max_elevation: f32,
    /// Height of the look pivot above the character origin
    pub pivot_height: f32,
    /// Fraction of the occluder distance the camera keeps
    pub occlusion_pull_in: f32,
    /// Camera direction (pivot to camera) at spawn, in character space
    pub initial_direction: Vec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            free_distance: 3.0,
            can_control_distance: true,
            min_distance: 0.5,
            max_distance: 4.0,
            distance_speed: 20.0,
            rotate_speed: 40.0,
            max_depression: 50.0,
            max_elevation: 35.0,
            pivot_height: 1.5,
            occlusion_pull_in: 0.8,
            initial_direction: Vec3::new(0.0, 0.3, -1.0),
        }
    }
}

impl CameraConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_negative("camera.min_distance", self.min_distance)?;
        require_positive("camera.max_distance", self.max_distance)?;
        if self.min_distance > self.max_distance {
            return Err(invalid(
                "camera.min_distance",
                format!(
                    "min distance {} exceeds max distance {}",
                    self.min_distance, self.max_distance
                ),
            ));
        }
        require_non_negative("camera.distance_speed", self.distance_speed)?;
        require_non_negative("camera.rotate_speed", self.rotate_speed)?;
        validate_angle("camera.max_depression", self.max_depression)?;
        validate_angle("camera.max_elevation", self.max_elevation)?;
        if !(0.0..=1.0).contains(&self.occlusion_pull_in) {
            return Err(invalid(
                "camera.occlusion_pull_in",
                format!("must be in [0, 1], got {}", self.occlusion_pull_in),
            ));
        }
        if self.initial_direction.length_squared() <= f32::EPSILON {
            return Err(invalid("camera.initial_direction", "must not be zero"));
        }
        Ok(())
    }
}

/// Finishing move geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecuteConfig {
    /// Probe centre, ahead of the camera pivot
    pub probe_forward: f32,
    pub probe_half_extents: Vec3,
    /// Distance in front of the victim where the executor is placed
    pub placement_offset: f32,
    pub selection: TargetSelection,
}

impl Default for ExecuteConfig {
    fn default() -> Self {
        Self {
            probe_forward: 2.0,
            probe_half_extents: Vec3::new(1.0, 0.5, 2.0),
            placement_offset: 1.2,
            selection: TargetSelection::FirstHit,
        }
    }
}

impl ExecuteConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.probe_half_extents.min_element() <= 0.0 {
            return Err(invalid(
                "execute.probe_half_extents",
                "every half extent must be positive",
            ));
        }
        require_non_negative("execute.placement_offset", self.placement_offset)
    }
}

/// Hit ledger bounds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerPolicy {
    /// Size at which stale entries are evicted
    pub threshold: usize,
    /// Entries older than this many ticks behind a new attack are stale
    pub retention: u64,
}

impl Default for LedgerPolicy {
    fn default() -> Self {
        Self {
            threshold: 16,
            retention: 60,
        }
    }
}

/// Fixed-step clock settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seconds per tick
    pub fixed_timestep: f32,
    pub max_catch_up_steps: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            fixed_timestep: crate::engine::game_loop::FIXED_TIMESTEP,
            max_catch_up_steps: crate::engine::game_loop::MAX_CATCH_UP_STEPS,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("simulation.fixed_timestep", self.fixed_timestep)?;
        if self.max_catch_up_steps == 0 {
            return Err(invalid("simulation.max_catch_up_steps", "must be at least 1"));
        }
        Ok(())
    }
}

/// All gameplay tuning
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub properties: PropertyConfig,
    pub weapon: WeaponProfile,
    pub locomotion: LocomotionConfig,
    pub lock_on: LockOnConfig,
    pub camera: CameraConfig,
    pub execute: ExecuteConfig,
    pub ledger: LedgerPolicy,
    pub simulation: SimulationConfig,
}

impl GameConfig {
    /// Parse and validate a RON document
    pub fn from_ron_str(source: &str, origin: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = ron::from_str(source).map_err(|e| ConfigError::Parse {
            path: origin.to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a RON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let name = path.display().to_string();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: name.clone(),
            source,
        })?;
        let config = Self::from_ron_str(&contents, &name)?;
        log::info!("Loaded game config from {}", name);
        Ok(config)
    }

    /// Reject inconsistent values
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.properties.validate()?;
        self.weapon.validate()?;
        self.locomotion.validate()?;
        self.lock_on.validate()?;
        self.camera.validate()?;
        self.execute.validate()?;
        self.simulation.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn test_default_properties() {
        let props = PropertyConfig::default();
        assert_eq!(props.max_hp, 100.0);
        assert_eq!(props.strength, 10.0);
        assert!((props.walk_speed() - 2.8).abs() < 1e-5);
    }

    #[test]
    fn test_partial_ron_keeps_defaults() {
        let config = GameConfig::from_ron_str(
            "(properties: (strength: 25.0), ledger: (retention: 1))",
            "inline",
        )
        .expect("valid config");
        assert_eq!(config.properties.strength, 25.0);
        assert_eq!(config.properties.max_hp, 100.0);
        assert_eq!(config.ledger.retention, 1);
        assert_eq!(config.ledger.threshold, 16);
    }

    #[test]
    fn test_selection_policy_from_ron() {
        let config = GameConfig::from_ron_str("(lock_on: (selection: Nearest))", "inline")
            .expect("valid config");
        assert_eq!(config.lock_on.selection, TargetSelection::Nearest);
    }

    #[test]
    fn test_bundled_tuning_parses() {
        let source = include_str!("../../assets/tuning.ron");
        let config = GameConfig::from_ron_str(source, "tuning.ron").expect("valid tuning");
        assert_eq!(config.properties, PropertyConfig::default());
        assert_eq!(config.weapon, WeaponProfile::default());
        assert_eq!(config.execute.selection, TargetSelection::Nearest);
        assert_eq!(config.camera.initial_direction, Vec3::new(0.0, 0.3, -1.0));
    }

    #[test]
    fn test_min_distance_above_max_rejected() {
        let mut config = GameConfig::default();
        config.camera.min_distance = 5.0;
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "camera.min_distance",
                ..
            }
        ));
    }

    #[test]
    fn test_non_positive_speed_rejected() {
        let mut config = GameConfig::default();
        config.properties.forward_speed = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_error_names_origin() {
        let err = GameConfig::from_ron_str("(properties: oops", "broken.ron").unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse config broken.ron"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = GameConfig::load(Path::new("definitely/not/here.ron")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
