// Animation module
// Animation oracle contract plus a clip-graph implementation of it

pub mod clip;
pub mod graph;
pub mod oracle;

pub use clip::{AnimationClip, NextState, Notify};
pub use graph::{SourceFilter, StateGraphAnimator, TransitionRule};
pub use oracle::{params, states, tags, triggers, AnimationEvent, AnimationOracle};
