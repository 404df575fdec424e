use bevy::math::{EulerRot, Quat, Vec3};
use std::f32::consts::{PI, TAU};

/// Euler decomposition used for every yaw computation in this crate. Y is up and yaw is the
/// first angle of the decomposition.
pub const YAW_CONVENTION: EulerRot = EulerRot::YXZ;

/// Yaw (rotation about +Y) of a rotation.
pub fn yaw_of(rotation: Quat) -> f32 {
    rotation.to_euler(YAW_CONVENTION).0
}

pub fn yaw_rotation(yaw: f32) -> Quat {
    Quat::from_rotation_y(yaw)
}

/// Removes the yaw component of a rotation, keeping pitch and roll.
pub fn strip_yaw(rotation: Quat) -> Quat {
    yaw_rotation(-yaw_of(rotation)) * rotation
}

/// Wraps an angle into `(-PI, PI]`.
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI { wrapped + TAU } else { wrapped }
}

/// Projects a vector onto the ground plane.
pub fn horizontal(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0., v.z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaw_roundtrip() {
        for yaw in [-3.0, -1.2, 0., 0.4, 2.9] {
            let rotation = yaw_rotation(yaw) * Quat::from_rotation_x(0.3);
            assert!((yaw_of(rotation) - yaw).abs() < 1e-5);
            assert!(yaw_of(strip_yaw(rotation)).abs() < 1e-5);
        }
    }

    #[test]
    fn wrap_angle_range() {
        assert!((wrap_angle(TAU + 0.5) - 0.5).abs() < 1e-5);
        assert!((wrap_angle(-PI) - PI).abs() < 1e-5);
        assert!((wrap_angle(PI + 0.1) - (-PI + 0.1)).abs() < 1e-5);
        assert_eq!(wrap_angle(0.), 0.);
    }
}
