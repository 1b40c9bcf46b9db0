// Animation clip definitions for the state graph animator

use glam::Vec3;

use super::oracle::AnimationEvent;

/// Event fired when a clip's normalised time crosses `at`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Notify {
    /// Normalised time in [0, 1]
    pub at: f32,
    pub event: AnimationEvent,
}

/// Where a one-shot clip hands over when it finishes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextState {
    /// Hold the last frame forever
    Hold,
    /// Return to free or locked locomotion, depending on the "Lock" parameter
    Locomotion,
    Named(String),
}

/// A single animation state
#[derive(Debug, Clone)]
pub struct AnimationClip {
    /// Name of the state (e.g. "Locomotion", "Soft Attack 1")
    pub name: String,
    /// Length of one cycle in seconds
    pub duration: f32,
    /// Whether the clip loops
    pub looping: bool,
    /// Tags reported while this clip is current
    pub tags: Vec<String>,
    /// Timed events
    pub notifies: Vec<Notify>,
    /// Events fired when the clip becomes current
    pub on_enter: Vec<AnimationEvent>,
    /// Events fired when the clip stops being current
    pub on_exit: Vec<AnimationEvent>,
    /// Successor for non-looping clips
    pub next: NextState,
    /// Root motion in local space, metres per second
    pub root_motion: Vec3,
}

impl AnimationClip {
    /// Create a new animation clip
    pub fn new(name: &str, duration: f32, looping: bool) -> Self {
        Self {
            name: name.to_string(),
            duration: duration.max(f32::EPSILON),
            looping,
            tags: Vec::new(),
            notifies: Vec::new(),
            on_enter: Vec::new(),
            on_exit: Vec::new(),
            next: if looping { NextState::Hold } else { NextState::Locomotion },
            root_motion: Vec3::ZERO,
        }
    }

    /// Create a looping clip
    pub fn looping(name: &str, duration: f32) -> Self {
        Self::new(name, duration, true)
    }

    /// Create a one-shot clip that returns to locomotion
    pub fn one_shot(name: &str, duration: f32) -> Self {
        Self::new(name, duration, false)
    }

    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tags.push(tag.to_string());
        self
    }

    pub fn with_notify(mut self, at: f32, event: AnimationEvent) -> Self {
        self.notifies.push(Notify {
            at: at.clamp(0.0, 1.0),
            event,
        });
        self
    }

    pub fn on_enter(mut self, event: AnimationEvent) -> Self {
        self.on_enter.push(event);
        self
    }

    pub fn on_exit(mut self, event: AnimationEvent) -> Self {
        self.on_exit.push(event);
        self
    }

    pub fn then(mut self, next: NextState) -> Self {
        self.next = next;
        self
    }

    pub fn with_root_motion(mut self, velocity: Vec3) -> Self {
        self.root_motion = velocity;
        self
    }

    /// Check whether the clip carries a tag
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Notifies crossed when normalised time moves from `from` (exclusive) to `to` (inclusive)
    pub fn notifies_between(&self, from: f32, to: f32) -> impl Iterator<Item = AnimationEvent> + '_ {
        self.notifies
            .iter()
            .filter(move |n| n.at > from && n.at <= to)
            .map(|n| n.event)
    }
}
