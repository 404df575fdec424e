//! Hand-built skeletons, clips and graphs shared by the unit tests.

use bevy::math::{Quat, Vec3};

use crate::{
    core::{
        animation_clip::{Channel, Keyframe, MotionClip},
        id::StateId,
        motion_graph::MotionState,
        pose::BoneTransform,
        skeleton::{Bone, Skeleton},
    },
    utils::math::yaw_rotation,
};

pub const FRAME_TIME: f32 = 1. / 30.;

/// Nine bone biped with the hips 1m above the origin and both feet touching y = 0.05.
pub fn biped() -> Skeleton {
    let bone = |name: &str, parent: Option<usize>, t: Vec3| Bone {
        name: name.into(),
        parent,
        bind_pose: BoneTransform::from_translation(t),
    };
    Skeleton::new(
        "biped",
        vec![
            bone("hips", None, Vec3::new(0., 1., 0.)),
            bone("spine", Some(0), Vec3::new(0., 0.2, 0.)),
            bone("head", Some(1), Vec3::new(0., 0.3, 0.)),
            bone("left_upper_leg", Some(0), Vec3::new(0.1, -0.1, 0.)),
            bone("left_lower_leg", Some(3), Vec3::new(0., -0.4, 0.)),
            bone("left_foot", Some(4), Vec3::new(0., -0.45, 0.)),
            bone("right_upper_leg", Some(0), Vec3::new(-0.1, -0.1, 0.)),
            bone("right_lower_leg", Some(6), Vec3::new(0., -0.4, 0.)),
            bone("right_foot", Some(7), Vec3::new(0., -0.45, 0.)),
        ],
    )
    .unwrap()
}

/// Per-frame description of a synthetic clip frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct SyntheticFrame {
    pub root: Vec3,
    pub yaw: f32,
    pub left_lift: f32,
    pub right_lift: f32,
}

/// Builds a clip animating the hips and both upper legs. A lifted leg is raised straight up.
pub fn clip_from_frames(name: &str, frames: &[SyntheticFrame]) -> MotionClip {
    let keyframes = |f: &dyn Fn(&SyntheticFrame) -> BoneTransform| -> Vec<Keyframe> {
        frames
            .iter()
            .enumerate()
            .map(|(i, frame)| Keyframe {
                time: i as f32 * FRAME_TIME,
                transform: f(frame),
            })
            .collect()
    };

    MotionClip {
        name: name.into(),
        duration: frames.len() as f32 * FRAME_TIME,
        speed: 1.,
        channels: vec![
            Channel {
                bone: "hips".into(),
                keyframes: keyframes(&|f| {
                    BoneTransform::from_translation(Vec3::new(0., 1., 0.) + f.root)
                        .with_rotation(yaw_rotation(f.yaw))
                }),
            },
            Channel {
                bone: "left_upper_leg".into(),
                keyframes: keyframes(&|f| {
                    BoneTransform::from_translation(Vec3::new(0.1, -0.1 + f.left_lift, 0.))
                }),
            },
            Channel {
                bone: "right_upper_leg".into(),
                keyframes: keyframes(&|f| {
                    BoneTransform::from_translation(Vec3::new(-0.1, -0.1 + f.right_lift, 0.))
                }),
            },
        ],
    }
}

/// Standing still with both feet down for `len` frames.
pub fn idle_clip(name: &str, len: usize) -> MotionClip {
    clip_from_frames(name, &vec![SyntheticFrame::default(); len])
}

/// Walks forward along +Z, alternating the lifted foot every `half_cycle` frames.
pub fn walk_clip(name: &str, len: usize, step: f32, half_cycle: usize) -> MotionClip {
    let frames: Vec<SyntheticFrame> = (0..len)
        .map(|i| {
            let left_swing = (i / half_cycle) % 2 == 1;
            SyntheticFrame {
                root: Vec3::new(0., 0., i as f32 * step),
                yaw: 0.,
                left_lift: if left_swing { 0.2 } else { 0. },
                right_lift: if left_swing { 0. } else { 0.2 },
            }
        })
        .collect();
    clip_from_frames(name, &frames)
}

/// One plain chain of states per entry of `lengths`, linked only to their next frame.
pub fn chain_states(lengths: &[usize]) -> Vec<MotionState> {
    let mut states = vec![];
    for (sequence, &len) in lengths.iter().enumerate() {
        let offset = states.len();
        for index in 0..len {
            let mut state = MotionState {
                sequence,
                index_in_sequence: index,
                ..Default::default()
            };
            if index + 1 < len {
                state.children.insert(offset + index + 1);
            }
            states.push(state);
        }
    }
    states
}

/// Clears all edges and links the given `(from, to)` pairs instead.
pub fn relink(states: &mut [MotionState], edges: &[(StateId, StateId)]) {
    for state in states.iter_mut() {
        state.children.clear();
    }
    for &(from, to) in edges {
        states[from].children.insert(to);
    }
}

pub fn quat_approx_eq(a: Quat, b: Quat) -> bool {
    a.angle_between(b) < 1e-4
}
