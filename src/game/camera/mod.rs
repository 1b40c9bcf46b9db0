// Camera rig and lock-on targeting

pub mod lock_on;
pub mod rig;

pub use lock_on::{select_target, LockCheck, LockOnTargeting, LockTargetView, ProbeBox};
pub use rig::{pivot_of, CameraRig};
