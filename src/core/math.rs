// Math helpers: +Y up, +Z forward

use glam::{Quat, Vec3};

/// Step `current` toward `target` by at most `max_delta`, never overshooting
pub fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    if (target - current).abs() <= max_delta {
        target
    } else {
        current + (target - current).signum() * max_delta
    }
}

/// Rotation whose forward axis (+Z) points along `forward`, with +Y kept up.
///
/// Returns identity for a zero-length direction.
pub fn look_rotation(forward: Vec3) -> Quat {
    let Some(dir) = forward.try_normalize() else {
        return Quat::IDENTITY;
    };
    let yaw = dir.x.atan2(dir.z);
    let pitch = -dir.y.clamp(-1.0, 1.0).asin();
    Quat::from_rotation_y(yaw) * Quat::from_rotation_x(pitch)
}

/// Drop the vertical component of a vector
pub fn flatten(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Forward (+Z) axis of a rotation
pub fn forward(rotation: Quat) -> Vec3 {
    rotation * Vec3::Z
}

/// Right (+X) axis of a rotation
pub fn right(rotation: Quat) -> Vec3 {
    rotation * Vec3::X
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_move_towards_does_not_overshoot() {
        assert_eq!(move_towards(6.9, 7.0, 0.2), 7.0);
        assert_abs_diff_eq!(move_towards(2.8, 7.0, 0.2), 3.0, epsilon = 1e-6);
        assert_abs_diff_eq!(move_towards(7.0, 2.8, 0.1), 6.9, epsilon = 1e-6);
    }

    #[test]
    fn test_look_rotation_maps_forward_axis() {
        let dirs = [
            Vec3::Z,
            Vec3::X,
            Vec3::NEG_Z,
            Vec3::new(1.0, 0.5, -2.0).normalize(),
            Vec3::new(0.0, -0.7, 0.3).normalize(),
        ];
        for dir in dirs {
            let rotated = look_rotation(dir) * Vec3::Z;
            assert_abs_diff_eq!(rotated.x, dir.x, epsilon = 1e-5);
            assert_abs_diff_eq!(rotated.y, dir.y, epsilon = 1e-5);
            assert_abs_diff_eq!(rotated.z, dir.z, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_look_rotation_keeps_up_vertical_for_flat_directions() {
        let up = look_rotation(Vec3::new(-3.0, 0.0, 1.0)) * Vec3::Y;
        assert_abs_diff_eq!(up.y, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_look_rotation_zero_is_identity() {
        assert_eq!(look_rotation(Vec3::ZERO), Quat::IDENTITY);
    }

    #[test]
    fn test_flatten_and_axes() {
        assert_eq!(flatten(Vec3::new(1.0, 2.0, 3.0)), Vec3::new(1.0, 0.0, 3.0));
        assert_abs_diff_eq!(forward(Quat::IDENTITY).z, 1.0);
        assert_abs_diff_eq!(right(Quat::IDENTITY).x, 1.0);
    }
}
