/// Simulation timing and control
///
/// Implements a fixed timestep clock for the combat simulation. The host
/// feeds it real frame times; the clock answers how many fixed ticks to run
/// and hands out the monotonically increasing tick index that stamps attacks.
use std::time::Duration;

/// Default simulation rate (60 ticks per second)
pub const FIXED_TIMESTEP: f32 = 1.0 / 60.0;

/// Maximum number of ticks per frame to prevent spiral of death
pub const MAX_CATCH_UP_STEPS: u32 = 5;

/// Index of a simulation tick
pub type Tick = u64;

/// Fixed-step simulation clock
#[derive(Debug, Clone)]
pub struct SimulationClock {
    /// Seconds per tick
    timestep: f32,

    /// Accumulated frame time not yet consumed by ticks
    accumulator: Duration,

    /// Duration of one tick
    step_duration: Duration,

    /// Catch-up cap per frame
    max_steps: u32,

    /// Ticks executed so far
    tick: Tick,

    /// Whether the simulation is paused
    paused: bool,
}

impl SimulationClock {
    /// Create a clock with the given fixed timestep (seconds) and catch-up cap
    pub fn new(timestep: f32, max_steps: u32) -> Self {
        let timestep = if timestep > 0.0 { timestep } else { FIXED_TIMESTEP };
        Self {
            timestep,
            accumulator: Duration::ZERO,
            step_duration: Duration::from_secs_f32(timestep),
            max_steps: max_steps.max(1),
            tick: 0,
            paused: false,
        }
    }

    /// Feed one rendered frame's duration, returns the number of ticks to run
    pub fn begin_frame(&mut self, frame_time: Duration) -> u32 {
        if self.paused {
            return 0;
        }

        self.accumulator += frame_time;

        let mut steps = 0;
        while self.accumulator >= self.step_duration && steps < self.max_steps {
            self.accumulator -= self.step_duration;
            steps += 1;
        }

        // Drop the backlog we refused to simulate
        if steps == self.max_steps && self.accumulator >= self.step_duration {
            log::debug!(
                "Simulation fell behind, dropping {:?} of backlog",
                self.accumulator
            );
            self.accumulator = Duration::ZERO;
        }

        steps
    }

    /// Advance by one tick and return the new tick index
    pub fn advance(&mut self) -> Tick {
        self.tick += 1;
        self.tick
    }

    /// Current tick index
    pub fn tick(&self) -> Tick {
        self.tick
    }

    /// Seconds per tick
    pub fn fixed_timestep(&self) -> f32 {
        self.timestep
    }

    /// Number of ticks covering `seconds`, rounded up
    pub fn ticks_for(&self, seconds: f32) -> Tick {
        (seconds / self.timestep).ceil().max(0.0) as Tick
    }

    /// Simulated time in seconds
    pub fn elapsed_secs(&self) -> f32 {
        self.tick as f32 * self.timestep
    }

    /// Interpolation factor between the last two ticks, for presentation
    pub fn alpha(&self) -> f32 {
        self.accumulator.as_secs_f32() / self.timestep
    }

    /// Check if the simulation is paused
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Pause the simulation
    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            log::info!("Simulation paused");
        }
    }

    /// Resume the simulation
    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            // Reset accumulator to prevent update burst
            self.accumulator = Duration::ZERO;
            log::info!("Simulation resumed");
        }
    }
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self::new(FIXED_TIMESTEP, MAX_CATCH_UP_STEPS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_creation() {
        let clock = SimulationClock::default();
        assert_eq!(clock.tick(), 0);
        assert!(!clock.is_paused());
        assert!((clock.fixed_timestep() - 1.0 / 60.0).abs() < 0.0001);
    }

    #[test]
    fn test_advance_counts_ticks() {
        let mut clock = SimulationClock::default();
        assert_eq!(clock.advance(), 1);
        assert_eq!(clock.advance(), 2);
        assert_eq!(clock.tick(), 2);
    }

    #[test]
    fn test_frame_accumulation() {
        let mut clock = SimulationClock::new(0.01, 5);
        assert_eq!(clock.begin_frame(Duration::from_millis(25)), 2);
        // 5ms carried over
        assert_eq!(clock.begin_frame(Duration::from_millis(5)), 1);
    }

    #[test]
    fn test_catch_up_is_capped() {
        let mut clock = SimulationClock::new(0.01, 5);
        assert_eq!(clock.begin_frame(Duration::from_millis(300)), 5);
        // Backlog was dropped
        assert_eq!(clock.begin_frame(Duration::ZERO), 0);
    }

    #[test]
    fn test_paused_no_updates() {
        let mut clock = SimulationClock::default();
        clock.pause();
        assert_eq!(clock.begin_frame(Duration::from_millis(50)), 0);
        clock.resume();
        assert!(!clock.is_paused());
    }

    #[test]
    fn test_ticks_for_seconds() {
        let clock = SimulationClock::new(0.5, 5);
        assert_eq!(clock.ticks_for(1.0), 2);
        assert_eq!(clock.ticks_for(1.2), 3);
        assert_eq!(clock.ticks_for(-1.0), 0);
    }

    #[test]
    fn test_invalid_timestep_falls_back() {
        let clock = SimulationClock::new(0.0, 0);
        assert_eq!(clock.fixed_timestep(), FIXED_TIMESTEP);
    }
}
