pub mod loader;
pub mod serial;

use std::{collections::HashMap, fmt::Debug};

use bevy::{asset::Asset, reflect::TypePath};

use super::{
    errors::SkeletonValidationError,
    pose::{BoneTransform, Pose},
};

pub type BoneId = usize;

#[derive(Clone, Debug, PartialEq)]
pub struct Bone {
    pub name: String,
    pub parent: Option<BoneId>,
    pub bind_pose: BoneTransform,
}

/// Bone hierarchy stored as a dense array where every parent precedes its children. The first
/// bone is the root.
#[derive(Asset, TypePath, Clone, Default)]
pub struct Skeleton {
    name: String,
    bones: Vec<Bone>,
    name_to_id: HashMap<String, BoneId>,
}

impl Skeleton {
    /// Builds a skeleton from bones whose `parent` fields index into `bones`. If the input is not
    /// already ordered parent-before-child it is reordered (depth first, roots in input order)
    /// and the parent indices are remapped.
    pub fn new(
        name: impl Into<String>,
        bones: Vec<Bone>,
    ) -> Result<Self, SkeletonValidationError> {
        if bones.is_empty() {
            return Err(SkeletonValidationError::Empty);
        }

        let len = bones.len();
        let mut name_to_id = HashMap::with_capacity(len);
        for (id, bone) in bones.iter().enumerate() {
            if name_to_id.insert(bone.name.clone(), id).is_some() {
                return Err(SkeletonValidationError::DuplicateBoneName(bone.name.clone()));
            }
            if let Some(parent) = bone.parent {
                if parent >= len {
                    return Err(SkeletonValidationError::ParentOutOfRange {
                        bone: bone.name.clone(),
                        parent,
                        len,
                    });
                }
            }
        }

        let ordered = bones
            .iter()
            .enumerate()
            .all(|(id, bone)| bone.parent.is_none_or(|p| p < id));

        let bones = if ordered {
            bones
        } else {
            Self::reorder(bones)?
        };

        let name_to_id = bones
            .iter()
            .enumerate()
            .map(|(id, bone)| (bone.name.clone(), id))
            .collect();

        Ok(Self {
            name: name.into(),
            bones,
            name_to_id,
        })
    }

    fn reorder(bones: Vec<Bone>) -> Result<Vec<Bone>, SkeletonValidationError> {
        let len = bones.len();
        let mut children: Vec<Vec<BoneId>> = vec![vec![]; len];
        let mut roots = vec![];
        for (id, bone) in bones.iter().enumerate() {
            match bone.parent {
                Some(parent) => children[parent].push(id),
                None => roots.push(id),
            }
        }

        let mut order = Vec::with_capacity(len);
        let mut stack: Vec<BoneId> = roots.into_iter().rev().collect();
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(children[id].iter().rev());
        }

        // Anything unreachable from a root hangs off a cycle
        if order.len() != len {
            let mut reached = vec![false; len];
            for &id in &order {
                reached[id] = true;
            }
            let stray = reached.iter().position(|r| !r).unwrap_or_default();
            return Err(SkeletonValidationError::Cycle(bones[stray].name.clone()));
        }

        let mut remap = vec![0; len];
        for (new_id, &old_id) in order.iter().enumerate() {
            remap[old_id] = new_id;
        }

        Ok(order
            .into_iter()
            .map(|old_id| {
                let bone = &bones[old_id];
                Bone {
                    name: bone.name.clone(),
                    parent: bone.parent.map(|p| remap[p]),
                    bind_pose: bone.bind_pose,
                }
            })
            .collect())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    pub fn bone_id(&self, name: &str) -> Option<BoneId> {
        self.name_to_id.get(name).copied()
    }

    pub fn bone(&self, id: BoneId) -> Option<&Bone> {
        self.bones.get(id)
    }

    pub fn parent(&self, id: BoneId) -> Option<BoneId> {
        self.bones.get(id).and_then(|b| b.parent)
    }

    pub fn children(&self, id: BoneId) -> Vec<BoneId> {
        self.bones
            .iter()
            .enumerate()
            .filter(|(_, b)| b.parent == Some(id))
            .map(|(child, _)| child)
            .collect()
    }

    /// Pose holding the bind transform of every bone.
    pub fn bind_pose(&self) -> Pose {
        Pose::new(self.bones.iter().map(|b| b.bind_pose).collect())
    }

    fn indent(f: &mut std::fmt::Formatter<'_>, level: u32) -> std::fmt::Result {
        if level == 0 {
            return Ok(());
        }
        for _ in 0..(level - 1) {
            write!(f, "┃ ")?;
        }
        write!(f, "┣━")?;
        Ok(())
    }

    fn fmt_level(
        &self,
        f: &mut std::fmt::Formatter<'_>,
        level: u32,
        parent: Option<BoneId>,
    ) -> std::fmt::Result {
        for (id, bone) in self.bones.iter().enumerate() {
            if bone.parent != parent {
                continue;
            }
            Self::indent(f, level)?;
            writeln!(f, "🦴 {:?} [{}]", bone.name, id)?;
            self.fmt_level(f, level + 1, Some(id))?;
        }
        Ok(())
    }
}

impl Debug for Skeleton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Skeleton {:?}:", self.name)?;
        self.fmt_level(f, 0, None)
    }
}
