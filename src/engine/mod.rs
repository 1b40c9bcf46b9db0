// Engine modules: simulation clock, animation, physics

pub mod animation;
pub mod game_loop;
pub mod physics;
