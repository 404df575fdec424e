use bevy::{log::warn, math::Vec3};
use serde::{Deserialize, Serialize};

use crate::{
    core::{
        animation_clip::MotionClip,
        motion_graph::ContactLabel,
        pose::{BoneTransform, Pose},
        skeleton::{BoneId, Skeleton},
    },
    utils::math::{strip_yaw, wrap_angle, yaw_of, yaw_rotation},
};

/// Skeletons with fewer bones than this are not labelled for foot contact.
pub const MIN_CONTACT_BONES: usize = 8;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ContactSettings {
    pub left_foot: String,
    pub right_foot: String,
    /// Floor height under the left foot. When unset, the lowest height the foot reaches in the
    /// clip is used.
    pub left_floor_height: Option<f32>,
    pub right_floor_height: Option<f32>,
    /// Maximum height above the floor for a foot to be planted.
    pub height_threshold: f32,
    /// Maximum per-frame displacement for a foot to be planted.
    pub velocity_threshold: f32,
}

impl Default for ContactSettings {
    fn default() -> Self {
        Self {
            left_foot: "left_foot".into(),
            right_foot: "right_foot".into(),
            left_floor_height: None,
            right_floor_height: None,
            height_threshold: 0.05,
            velocity_threshold: 0.02,
        }
    }
}

/// Per-frame features of a single clip. Every vector has one entry per frame.
#[derive(Clone, Debug, Default)]
pub struct ClipFeatures {
    /// Poses as authored, used for playback.
    pub poses: Vec<Pose>,
    /// Poses with the root yaw and horizontal translation removed, used for comparisons.
    pub in_place_poses: Vec<Pose>,
    /// Character-space bone positions of the in-place poses.
    pub positions: Vec<Vec<Vec3>>,
    pub velocities: Vec<Vec<Vec3>>,
    pub yaw: Vec<f32>,
    pub yaw_angular_velocity: Vec<f32>,
    pub root_local_velocity: Vec<Vec3>,
    pub left_foot_height: Vec<f32>,
    pub right_foot_height: Vec<f32>,
    pub contact: Vec<ContactLabel>,
}

impl ClipFeatures {
    pub fn frame_count(&self) -> usize {
        self.poses.len()
    }
}

pub struct FeatureExtractor<'a> {
    skeleton: &'a Skeleton,
    settings: &'a ContactSettings,
}

impl<'a> FeatureExtractor<'a> {
    pub fn new(skeleton: &'a Skeleton, settings: &'a ContactSettings) -> Self {
        Self { skeleton, settings }
    }

    /// Samples every bone at every frame of the clip. Bones without a channel keep their bind
    /// transform. Channels naming bones the skeleton lacks are dropped.
    pub fn sample_poses(&self, clip: &MotionClip) -> Vec<Pose> {
        for channel in &clip.channels {
            if self.skeleton.bone_id(&channel.bone).is_none() {
                warn!(
                    "Clip {:?} animates unknown bone {:?}, channel ignored",
                    clip.name, channel.bone
                );
            }
        }

        clip.frame_times()
            .into_iter()
            .map(|time| {
                Pose::new(
                    self.skeleton
                        .bones()
                        .iter()
                        .map(|bone| clip.sample(&bone.name, time).unwrap_or(bone.bind_pose))
                        .collect(),
                )
            })
            .collect()
    }

    /// Computes the features of every frame. Returns `None` for clips with fewer than two
    /// frames.
    pub fn extract(&self, clip: &MotionClip) -> Option<ClipFeatures> {
        let poses = self.sample_poses(clip);
        let n = poses.len();
        if n < 2 {
            return None;
        }

        let roots: Vec<BoneTransform> = poses
            .iter()
            .map(|p| p.root().copied().unwrap_or_default())
            .collect();

        let yaw: Vec<f32> = roots.iter().map(|r| yaw_of(r.rotation)).collect();

        let mut yaw_angular_velocity = vec![0.; n];
        let mut root_local_velocity = vec![Vec3::ZERO; n];
        for i in 1..n {
            yaw_angular_velocity[i] = wrap_angle(yaw[i] - yaw[i - 1]);
            root_local_velocity[i] =
                yaw_rotation(-yaw[i - 1]) * (roots[i].translation - roots[i - 1].translation);
        }
        yaw_angular_velocity[0] = yaw_angular_velocity[1];
        root_local_velocity[0] = root_local_velocity[1];

        let in_place_poses: Vec<Pose> = poses.iter().map(in_place).collect();
        let positions: Vec<Vec<Vec3>> = in_place_poses
            .iter()
            .map(|p| p.character_positions(self.skeleton))
            .collect();
        let velocities = finite_differences(&positions);

        let (contact, left_foot_height, right_foot_height) = match self.feet() {
            Some((left, right)) => self.label_contacts(&poses, left, right),
            None => {
                warn!(
                    "Clip {:?}: cannot evaluate foot contact (skeleton has {} bones, feet {:?}/{:?}), labelling as airborne",
                    clip.name,
                    self.skeleton.bone_count(),
                    self.settings.left_foot,
                    self.settings.right_foot,
                );
                (vec![ContactLabel::Airborne; n], vec![0.; n], vec![0.; n])
            }
        };

        Some(ClipFeatures {
            poses,
            in_place_poses,
            positions,
            velocities,
            yaw,
            yaw_angular_velocity,
            root_local_velocity,
            left_foot_height,
            right_foot_height,
            contact,
        })
    }

    fn feet(&self) -> Option<(BoneId, BoneId)> {
        if self.skeleton.bone_count() < MIN_CONTACT_BONES {
            return None;
        }
        Some((
            self.skeleton.bone_id(&self.settings.left_foot)?,
            self.skeleton.bone_id(&self.settings.right_foot)?,
        ))
    }

    fn label_contacts(
        &self,
        poses: &[Pose],
        left: BoneId,
        right: BoneId,
    ) -> (Vec<ContactLabel>, Vec<f32>, Vec<f32>) {
        let world: Vec<Vec<Vec3>> = poses
            .iter()
            .map(|p| p.character_positions(self.skeleton))
            .collect();
        let foot_track = |bone: BoneId| -> Vec<Vec3> { world.iter().map(|p| p[bone]).collect() };
        let left_track = foot_track(left);
        let right_track = foot_track(right);

        let floor = |track: &[Vec3], configured: Option<f32>| {
            configured.unwrap_or_else(|| track.iter().map(|p| p.y).fold(f32::INFINITY, f32::min))
        };
        let left_floor = floor(&left_track, self.settings.left_floor_height);
        let right_floor = floor(&right_track, self.settings.right_floor_height);

        let left_height: Vec<f32> = left_track.iter().map(|p| p.y - left_floor).collect();
        let right_height: Vec<f32> = right_track.iter().map(|p| p.y - right_floor).collect();
        let left_speed = speeds(&left_track);
        let right_speed = speeds(&right_track);

        let planted = |height: f32, speed: f32| {
            height <= self.settings.height_threshold && speed <= self.settings.velocity_threshold
        };

        let contact = (0..poses.len())
            .map(|i| {
                classify(
                    planted(left_height[i], left_speed[i]),
                    planted(right_height[i], right_speed[i]),
                    left_height[i],
                    right_height[i],
                )
            })
            .collect();

        (contact, left_height, right_height)
    }
}

/// Contact label of a frame given which feet are planted. With no foot planted the foot closer
/// to its floor wins, the left one on ties. Heights are signed distances to each floor.
pub fn classify(
    left_planted: bool,
    right_planted: bool,
    left_height: f32,
    right_height: f32,
) -> ContactLabel {
    match (left_planted, right_planted) {
        (true, true) => ContactLabel::Both,
        (true, false) => ContactLabel::LeftOnly,
        (false, true) => ContactLabel::RightOnly,
        (false, false) if left_height.abs() <= right_height.abs() => ContactLabel::LeftOnly,
        (false, false) => ContactLabel::RightOnly,
    }
}

/// Copy of `pose` with the root yaw and horizontal root translation zeroed.
pub fn in_place(pose: &Pose) -> Pose {
    let mut pose = pose.clone();
    if let Some(root) = pose.root_mut() {
        root.rotation = strip_yaw(root.rotation);
        root.translation.x = 0.;
        root.translation.z = 0.;
    }
    pose
}

/// Per-frame deltas, with a forward difference on the first frame.
fn finite_differences(positions: &[Vec<Vec3>]) -> Vec<Vec<Vec3>> {
    let n = positions.len();
    (0..n)
        .map(|i| {
            let (prev, next) = if i == 0 { (0, 1.min(n - 1)) } else { (i - 1, i) };
            positions[next]
                .iter()
                .zip(&positions[prev])
                .map(|(b, a)| *b - *a)
                .collect()
        })
        .collect()
}

fn speeds(track: &[Vec3]) -> Vec<f32> {
    let n = track.len();
    (0..n)
        .map(|i| {
            let (prev, next) = if i == 0 { (0, 1.min(n - 1)) } else { (i - 1, i) };
            (track[next] - track[prev]).length()
        })
        .collect()
}
