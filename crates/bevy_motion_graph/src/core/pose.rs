use super::skeleton::Skeleton;
use bevy::math::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Local transform of a single bone, relative to its parent.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoneTransform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for BoneTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl BoneTransform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

/// A full skeleton pose: one local transform per bone, indexed like [`Skeleton::bones`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub transforms: Vec<BoneTransform>,
}

impl Pose {
    pub fn new(transforms: Vec<BoneTransform>) -> Self {
        Self { transforms }
    }

    pub fn bone_count(&self) -> usize {
        self.transforms.len()
    }

    /// Transform of the root bone. The root is always the first bone of a [`Skeleton`].
    pub fn root(&self) -> Option<&BoneTransform> {
        self.transforms.first()
    }

    pub fn root_mut(&mut self) -> Option<&mut BoneTransform> {
        self.transforms.first_mut()
    }

    /// Character-space matrix of every bone, obtained by chaining local transforms from the
    /// root down. Bones missing from the pose use the skeleton's bind pose.
    pub fn character_matrices(&self, skeleton: &Skeleton) -> Vec<Mat4> {
        let mut matrices: Vec<Mat4> = Vec::with_capacity(skeleton.bone_count());
        for (id, bone) in skeleton.bones().iter().enumerate() {
            let local = self
                .transforms
                .get(id)
                .copied()
                .unwrap_or(bone.bind_pose)
                .to_matrix();
            // Parents precede children, see `Skeleton::new`
            let character = match bone.parent {
                Some(parent) => matrices[parent] * local,
                None => local,
            };
            matrices.push(character);
        }
        matrices
    }

    /// Character-space position of every bone.
    pub fn character_positions(&self, skeleton: &Skeleton) -> Vec<Vec3> {
        self.character_matrices(skeleton)
            .iter()
            .map(|m| m.w_axis.truncate())
            .collect()
    }
}
