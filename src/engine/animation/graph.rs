// Data-driven animation state graph
//
// Plays one clip at a time, reports its name and tags, and moves between
// clips on triggers, on clip completion, or when the "Lock" parameter flips
// the locomotion variant. Transitions blend for a fixed time during which
// the source clip stays current, like the base layer of a typical animator.

use std::collections::HashMap;

use glam::Vec3;

use super::clip::{AnimationClip, NextState};
use super::oracle::{params, states, tags, triggers, AnimationEvent, AnimationOracle};

/// Default blend time between states, in seconds
pub const DEFAULT_BLEND_TIME: f32 = 0.1;

/// Which source states a transition rule applies to
#[derive(Debug, Clone, PartialEq)]
pub enum SourceFilter {
    Any,
    /// Any state not carrying this tag
    AnyExceptTag(String),
    /// States carrying at least one of these tags
    Tagged(Vec<String>),
    Named(String),
}

impl SourceFilter {
    fn accepts(&self, clip: &AnimationClip) -> bool {
        match self {
            SourceFilter::Any => true,
            SourceFilter::AnyExceptTag(tag) => !clip.has_tag(tag),
            SourceFilter::Tagged(accepted) => accepted.iter().any(|t| clip.has_tag(t)),
            SourceFilter::Named(name) => clip.name == *name,
        }
    }
}

/// Trigger-driven transition
#[derive(Debug, Clone)]
pub struct TransitionRule {
    pub trigger: String,
    pub from: SourceFilter,
    pub to: String,
    /// Earliest normalised time of the source clip at which the rule fires
    pub min_normalized_time: f32,
    /// Whether the rule may cut into a transition already in progress
    pub interrupts: bool,
    /// Blend time override
    pub blend: Option<f32>,
}

impl TransitionRule {
    pub fn new(trigger: &str, from: SourceFilter, to: &str) -> Self {
        Self {
            trigger: trigger.to_string(),
            from,
            to: to.to_string(),
            min_normalized_time: 0.0,
            interrupts: false,
            blend: None,
        }
    }

    pub fn after(mut self, normalized_time: f32) -> Self {
        self.min_normalized_time = normalized_time;
        self
    }

    pub fn interrupting(mut self) -> Self {
        self.interrupts = true;
        self
    }

    pub fn with_blend(mut self, blend: f32) -> Self {
        self.blend = Some(blend.max(0.0));
        self
    }
}

#[derive(Debug, Clone, Copy)]
struct PendingTransition {
    to: usize,
    remaining: f32,
}

/// Animator that plays a graph of [`AnimationClip`]s
#[derive(Debug)]
pub struct StateGraphAnimator {
    clips: Vec<AnimationClip>,
    by_name: HashMap<String, usize>,
    rules: Vec<TransitionRule>,
    current: usize,
    /// Seconds spent in the current clip
    time: f32,
    pending: Option<PendingTransition>,
    triggers: Vec<String>,
    floats: HashMap<String, f32>,
    bools: HashMap<String, bool>,
    events: Vec<AnimationEvent>,
    root_motion: Vec3,
    blend_time: f32,
    playback_speed: f32,
}

impl StateGraphAnimator {
    /// Create an animator starting in `entry`
    pub fn new(entry: AnimationClip) -> Self {
        let mut by_name = HashMap::new();
        by_name.insert(entry.name.clone(), 0);
        Self {
            clips: vec![entry],
            by_name,
            rules: Vec::new(),
            current: 0,
            time: 0.0,
            pending: None,
            triggers: Vec::new(),
            floats: HashMap::new(),
            bools: HashMap::new(),
            events: Vec::new(),
            root_motion: Vec3::ZERO,
            blend_time: DEFAULT_BLEND_TIME,
            playback_speed: 1.0,
        }
    }

    /// Add a clip, replacing any clip with the same name
    pub fn add_clip(&mut self, clip: AnimationClip) {
        if let Some(&index) = self.by_name.get(&clip.name) {
            self.clips[index] = clip;
        } else {
            self.by_name.insert(clip.name.clone(), self.clips.len());
            self.clips.push(clip);
        }
    }

    pub fn add_rule(&mut self, rule: TransitionRule) {
        self.rules.push(rule);
    }

    pub fn set_blend_time(&mut self, seconds: f32) {
        self.blend_time = seconds.max(0.0);
    }

    /// Set playback speed (1.0 = normal, 2.0 = double speed)
    pub fn set_playback_speed(&mut self, speed: f32) {
        self.playback_speed = speed.max(0.0);
    }

    /// Graph of a sword-wielding humanoid: locomotion, roll, jump, a two-hit
    /// soft combo, counter, execution, and the hit reactions.
    pub fn humanoid() -> Self {
        let mut graph =
            Self::new(AnimationClip::looping(states::LOCOMOTION, 1.0).with_tag(tags::GROUND));

        graph.add_clip(
            AnimationClip::looping(states::LOCK_LOCOMOTION, 1.0).with_tag(tags::GROUND),
        );
        graph.add_clip(
            AnimationClip::one_shot(states::ROLL, 0.6)
                .with_tag(tags::UNCONTROLLABLE)
                .on_enter(AnimationEvent::RollEnter)
                .on_exit(AnimationEvent::RollExit),
        );
        graph.add_clip(AnimationClip::one_shot(states::JUMP, 0.8));
        graph.add_clip(
            AnimationClip::one_shot(states::SOFT_ATTACK_1, 0.7)
                .with_tag(tags::ATTACK)
                .on_enter(AnimationEvent::AttackEnter)
                .with_notify(0.25, AnimationEvent::Jab { velocity: 0.2 })
                .with_notify(0.3, AnimationEvent::StrikeEnable)
                .with_notify(0.6, AnimationEvent::StrikeDisable)
                .on_exit(AnimationEvent::AttackExit)
                .with_root_motion(Vec3::new(0.0, 0.0, 0.5)),
        );
        graph.add_clip(
            AnimationClip::one_shot(states::SOFT_ATTACK_2, 0.8)
                .with_tag(tags::ATTACK)
                .with_notify(0.3, AnimationEvent::StrikeEnable)
                .with_notify(0.65, AnimationEvent::StrikeDisable)
                .on_exit(AnimationEvent::AttackExit)
                .with_root_motion(Vec3::new(0.0, 0.0, 0.8)),
        );
        graph.add_clip(
            AnimationClip::one_shot(states::COUNTER, 0.6)
                .with_tag(tags::ATTACK)
                .on_enter(AnimationEvent::AttackEnter)
                .with_notify(0.1, AnimationEvent::CounterEnable)
                .with_notify(0.5, AnimationEvent::CounterDisable)
                .on_exit(AnimationEvent::AttackExit),
        );
        graph.add_clip(
            AnimationClip::one_shot(states::EXECUTE, 1.5).with_tag(tags::UNCONTROLLABLE),
        );
        graph.add_clip(
            AnimationClip::one_shot(states::IMPACT, 0.5)
                .with_tag(tags::UNCONTROLLABLE)
                .on_enter(AnimationEvent::ImpactEnter)
                .on_exit(AnimationEvent::ImpactExit),
        );
        graph.add_clip(
            AnimationClip::one_shot(states::STUNNED, 2.0)
                .with_tag(tags::STUNNED)
                .on_exit(AnimationEvent::StunnedExit),
        );
        graph.add_clip(
            AnimationClip::one_shot(states::BE_EXECUTED, 1.5)
                .with_tag(tags::UNCONTROLLABLE)
                .on_exit(AnimationEvent::BeExecutedExit),
        );
        graph.add_clip(
            AnimationClip::one_shot(states::DIE, 1.0)
                .with_tag(tags::DEAD)
                .then(NextState::Hold),
        );

        let grounded = || SourceFilter::Tagged(vec![tags::GROUND.to_string()]);
        let alive = || SourceFilter::AnyExceptTag(tags::DEAD.to_string());

        graph.add_rule(TransitionRule::new(
            triggers::SOFT_ATTACK,
            grounded(),
            states::SOFT_ATTACK_1,
        ));
        graph.add_rule(
            TransitionRule::new(
                triggers::SOFT_ATTACK,
                SourceFilter::Named(states::SOFT_ATTACK_1.to_string()),
                states::SOFT_ATTACK_2,
            )
            .after(0.4),
        );
        graph.add_rule(TransitionRule::new(triggers::HEAVY_ATTACK, grounded(), states::COUNTER));
        graph.add_rule(TransitionRule::new(triggers::ROLL, grounded(), states::ROLL));
        graph.add_rule(TransitionRule::new(triggers::JUMP, grounded(), states::JUMP));
        graph.add_rule(TransitionRule::new(
            triggers::EXECUTE,
            SourceFilter::Tagged(vec![tags::GROUND.to_string(), tags::ATTACK.to_string()]),
            states::EXECUTE,
        ));
        graph.add_rule(
            TransitionRule::new(triggers::IMPACT, alive(), states::IMPACT).interrupting(),
        );
        graph.add_rule(
            TransitionRule::new(triggers::STUNNED, alive(), states::STUNNED).interrupting(),
        );
        graph.add_rule(
            TransitionRule::new(triggers::BE_EXECUTED, alive(), states::BE_EXECUTED)
                .interrupting()
                .with_blend(0.0),
        );
        graph.add_rule(
            TransitionRule::new(triggers::DIE, alive(), states::DIE)
                .interrupting()
                .with_blend(0.0),
        );

        graph
    }

    fn clip(&self) -> &AnimationClip {
        &self.clips[self.current]
    }

    /// Normalised time of the current clip (wraps for looping clips)
    pub fn normalized_time(&self) -> f32 {
        let clip = self.clip();
        if clip.looping {
            (self.time / clip.duration).fract()
        } else {
            (self.time / clip.duration).min(1.0)
        }
    }

    fn locomotion_target(&self) -> &'static str {
        if self.bools.get(params::LOCK).copied().unwrap_or(false) {
            states::LOCK_LOCOMOTION
        } else {
            states::LOCOMOTION
        }
    }

    fn begin_transition(&mut self, to: &str, blend: Option<f32>) {
        let Some(&index) = self.by_name.get(to) else {
            log::warn!("Animation graph has no state named '{}'", to);
            return;
        };
        self.pending = Some(PendingTransition {
            to: index,
            remaining: blend.unwrap_or(self.blend_time),
        });
    }

    fn complete_transition(&mut self, to: usize) {
        let exit = self.clips[self.current].on_exit.clone();
        self.events.extend(exit);

        self.current = to;
        self.time = 0.0;
        self.pending = None;

        let enter = self.clips[self.current].on_enter.clone();
        self.events.extend(enter);
    }

    fn fire_notifies(&mut self, previous_time: f32) {
        let clip = &self.clips[self.current];
        let from = previous_time / clip.duration;
        let to = self.time / clip.duration;

        let fired: Vec<AnimationEvent> = if clip.looping {
            let (from_frac, to_frac) = (from.fract(), to.fract());
            if to.floor() > from.floor() {
                clip.notifies_between(from_frac, 1.0)
                    .chain(clip.notifies_between(-f32::EPSILON, to_frac))
                    .collect()
            } else {
                clip.notifies_between(from_frac, to_frac).collect()
            }
        } else if from < 1.0 {
            clip.notifies_between(from, to.min(1.0)).collect()
        } else {
            Vec::new()
        };

        self.events.extend(fired);
    }

    fn consume_triggers(&mut self) {
        let requested = std::mem::take(&mut self.triggers);
        let normalized = self.normalized_time();

        for trigger in requested {
            let clip = &self.clips[self.current];
            let in_transition = self.pending.is_some();
            let matched = self.rules.iter().find(|rule| {
                rule.trigger == trigger
                    && rule.from.accepts(clip)
                    && normalized >= rule.min_normalized_time
                    && (!in_transition || rule.interrupts)
            });

            match matched {
                Some(rule) => {
                    let (to, blend) = (rule.to.clone(), rule.blend);
                    self.begin_transition(&to, blend);
                }
                None => log::trace!("Trigger '{}' ignored in state '{}'", trigger, clip.name),
            }
        }
    }

    fn schedule_automatic_transition(&mut self) {
        if self.pending.is_some() {
            return;
        }

        let clip = self.clip();
        if !clip.looping && self.time >= clip.duration {
            match clip.next.clone() {
                NextState::Hold => {}
                NextState::Locomotion => {
                    let target = self.locomotion_target();
                    self.begin_transition(target, None);
                }
                NextState::Named(name) => self.begin_transition(&name, None),
            }
            return;
        }

        let target = self.locomotion_target();
        let on_locomotion = clip.name == states::LOCOMOTION || clip.name == states::LOCK_LOCOMOTION;
        if on_locomotion && clip.name != target {
            self.begin_transition(target, None);
        }
    }
}

impl AnimationOracle for StateGraphAnimator {
    fn current_state_name(&self) -> String {
        self.clip().name.clone()
    }

    fn current_state_tags(&self) -> Vec<String> {
        self.clip().tags.clone()
    }

    fn is_in_transition(&self) -> bool {
        self.pending.is_some()
    }

    fn set_trigger(&mut self, trigger: &str) {
        self.triggers.push(trigger.to_string());
    }

    fn set_float(&mut self, param: &str, value: f32) {
        self.floats.insert(param.to_string(), value);
    }

    fn set_bool(&mut self, param: &str, value: bool) {
        self.bools.insert(param.to_string(), value);
    }

    fn advance(&mut self, dt: f32) {
        let dt = dt * self.playback_speed;

        self.root_motion += self.clip().root_motion * dt;

        let previous_time = self.time;
        self.time += dt;
        self.fire_notifies(previous_time);

        self.consume_triggers();
        self.schedule_automatic_transition();

        if let Some(pending) = self.pending.as_mut() {
            pending.remaining -= dt;
            if pending.remaining <= 0.0 {
                let to = pending.to;
                self.complete_transition(to);
            }
        }
    }

    fn drain_events(&mut self) -> Vec<AnimationEvent> {
        std::mem::take(&mut self.events)
    }

    fn take_root_motion(&mut self) -> Vec3 {
        std::mem::take(&mut self.root_motion)
    }
}
