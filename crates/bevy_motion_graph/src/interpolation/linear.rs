use bevy::math::{Quat, Vec3};

use crate::core::pose::{BoneTransform, Pose};

pub trait InterpolateLinear {
    fn interpolate_linear(&self, other: &Self, f: f32) -> Self;
}

impl InterpolateLinear for f32 {
    fn interpolate_linear(&self, other: &Self, f: f32) -> Self {
        self + (other - self) * f
    }
}

impl InterpolateLinear for Vec3 {
    fn interpolate_linear(&self, other: &Self, f: f32) -> Self {
        self.lerp(*other, f)
    }
}

impl InterpolateLinear for Quat {
    fn interpolate_linear(&self, other: &Self, f: f32) -> Self {
        // `slerp` already takes the short way round when the dot product is negative
        self.slerp(*other, f)
    }
}

impl InterpolateLinear for BoneTransform {
    fn interpolate_linear(&self, other: &Self, f: f32) -> Self {
        BoneTransform {
            translation: self.translation.interpolate_linear(&other.translation, f),
            rotation: self.rotation.interpolate_linear(&other.rotation, f),
            scale: self.scale.interpolate_linear(&other.scale, f),
        }
    }
}

impl InterpolateLinear for Pose {
    /// Bones present in only one of the poses are copied over unchanged.
    fn interpolate_linear(&self, other: &Self, f: f32) -> Self {
        let len = self.transforms.len().max(other.transforms.len());
        let transforms = (0..len)
            .map(
                |i| match (self.transforms.get(i), other.transforms.get(i)) {
                    (Some(a), Some(b)) => a.interpolate_linear(b, f),
                    (Some(a), None) => *a,
                    (None, Some(b)) => *b,
                    (None, None) => BoneTransform::IDENTITY,
                },
            )
            .collect();
        Pose { transforms }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pose_interpolation_keeps_unmatched_bones() {
        let a = Pose::new(vec![BoneTransform::from_translation(Vec3::ZERO)]);
        let b = Pose::new(vec![
            BoneTransform::from_translation(Vec3::X * 2.),
            BoneTransform::from_translation(Vec3::Y),
        ]);
        let mid = a.interpolate_linear(&b, 0.5);
        assert_eq!(mid.transforms[0].translation, Vec3::X);
        assert_eq!(mid.transforms[1].translation, Vec3::Y);
    }
}
