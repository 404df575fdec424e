use serde::{Deserialize, Serialize};

use super::{Bone, Skeleton};
use crate::core::{errors::SkeletonValidationError, pose::BoneTransform};

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct SkeletonSerial {
    #[serde(default)]
    pub name: String,
    pub bones: Vec<BoneSerial>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct BoneSerial {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub bind_pose: BoneTransform,
}

impl SkeletonSerial {
    pub fn to_skeleton(&self) -> Result<Skeleton, SkeletonValidationError> {
        let bones = self
            .bones
            .iter()
            .map(|bone| {
                let parent = match &bone.parent {
                    Some(parent) => Some(
                        self.bones
                            .iter()
                            .position(|b| &b.name == parent)
                            .ok_or_else(|| SkeletonValidationError::UnknownParent {
                                bone: bone.name.clone(),
                                parent: parent.clone(),
                            })?,
                    ),
                    None => None,
                };
                Ok(Bone {
                    name: bone.name.clone(),
                    parent,
                    bind_pose: bone.bind_pose,
                })
            })
            .collect::<Result<Vec<_>, SkeletonValidationError>>()?;

        Skeleton::new(self.name.clone(), bones)
    }
}

impl From<&Skeleton> for SkeletonSerial {
    fn from(skeleton: &Skeleton) -> Self {
        Self {
            name: skeleton.name().to_string(),
            bones: skeleton
                .bones()
                .iter()
                .map(|bone| BoneSerial {
                    name: bone.name.clone(),
                    parent: bone
                        .parent
                        .and_then(|p| skeleton.bone(p))
                        .map(|p| p.name.clone()),
                    bind_pose: bone.bind_pose,
                })
                .collect(),
        }
    }
}
