// Character resources - HP and PP pools
// Values only change through signed deltas and always stay inside [0, max]

use crate::game::config::PropertyConfig;

/// Live HP/PP of one character plus its static tuning
#[derive(Debug, Clone)]
pub struct PropertyStore {
    config: PropertyConfig,
    hp: f32,
    pp: f32,
}

impl Default for PropertyStore {
    fn default() -> Self {
        Self::new(PropertyConfig::default())
    }
}

impl PropertyStore {
    /// Fresh pools, full HP and PP
    pub fn new(config: PropertyConfig) -> Self {
        Self {
            hp: config.max_hp,
            pp: config.max_pp,
            config,
        }
    }

    pub fn config(&self) -> &PropertyConfig {
        &self.config
    }

    /// Current HP
    pub fn hp(&self) -> f32 {
        self.hp
    }

    /// Current PP
    pub fn pp(&self) -> f32 {
        self.pp
    }

    pub fn strength(&self) -> f32 {
        self.config.strength
    }

    /// Apply a signed HP delta, clamped to [0, max_hp].
    /// Death is the caller's decision.
    pub fn change_hp(&mut self, delta: f32) {
        if delta.is_nan() {
            return;
        }
        self.hp = (self.hp + delta).clamp(0.0, self.config.max_hp);
    }

    /// Apply a signed PP delta, clamped to [0, max_pp]
    pub fn change_pp(&mut self, delta: f32) {
        if delta.is_nan() {
            return;
        }
        self.pp = (self.pp + delta).clamp(0.0, self.config.max_pp);
    }

    /// Per-tick PP regeneration
    pub fn regen_pp(&mut self) {
        self.change_pp(self.config.pp_regen_percent * self.config.max_hp / 100.0);
    }

    /// Per-tick PP drain while running
    pub fn drain_run_cost(&mut self) {
        self.change_pp(-self.config.run_cost_percent * self.config.max_hp / 100.0);
    }

    pub fn is_depleted(&self) -> bool {
        self.hp <= 0.0
    }

    pub fn has_pp(&self) -> bool {
        self.pp > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_starts_full() {
        let props = PropertyStore::default();
        assert_eq!(props.hp(), 100.0);
        assert_eq!(props.pp(), 100.0);
        assert_eq!(props.strength(), 10.0);
    }

    #[test]
    fn test_hp_underflow_clamps_to_zero() {
        let mut props = PropertyStore::default();
        props.change_hp(-50.0);
        props.change_hp(-1000.0);
        assert_eq!(props.hp(), 0.0);
        assert!(props.is_depleted());
    }

    #[test]
    fn test_overflow_clamps_to_max() {
        let mut props = PropertyStore::default();
        props.change_hp(-10.0);
        props.change_hp(1000.0);
        props.change_pp(f32::INFINITY);
        assert_eq!(props.hp(), 100.0);
        assert_eq!(props.pp(), 100.0);
    }

    #[test]
    fn test_nan_delta_is_ignored() {
        let mut props = PropertyStore::default();
        props.change_hp(f32::NAN);
        props.change_pp(f32::NAN);
        assert_eq!(props.hp(), 100.0);
        assert_eq!(props.pp(), 100.0);
    }

    #[test]
    fn test_regen_and_run_cost_scale_with_max_hp() {
        let mut props = PropertyStore::default();
        props.change_pp(-50.0);

        props.regen_pp();
        assert_relative_eq!(props.pp(), 50.5);

        props.drain_run_cost();
        props.drain_run_cost();
        assert_relative_eq!(props.pp(), 49.5);
    }

    #[test]
    fn test_random_walk_stays_in_bounds() {
        let mut props = PropertyStore::default();
        let deltas = [-37.0, 120.0, -250.0, 3.5, 99.0, -0.25, -100.0, 42.0];
        for delta in deltas {
            props.change_hp(delta);
            props.change_pp(-delta);
            assert!((0.0..=100.0).contains(&props.hp()));
            assert!((0.0..=100.0).contains(&props.pp()));
        }
    }
}
