use bevy::math::Vec3;

use super::features::ClipFeatures;
use crate::core::{
    id::{SequenceId, StateId},
    motion_graph::MotionState,
};

/// Comparison features of one state. Only needed while the graph is being built.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StateFeatures {
    pub positions: Vec<Vec3>,
    pub velocities: Vec<Vec3>,
}

/// Concatenates clips into one global state array, linking every frame to the next frame of the
/// same clip.
#[derive(Default)]
pub struct GraphAssembler {
    states: Vec<MotionState>,
    features: Vec<StateFeatures>,
}

impl GraphAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Appends every frame of a clip. Returns the id of its first state.
    pub fn add_clip(&mut self, sequence: SequenceId, clip: ClipFeatures) -> StateId {
        let offset = self.states.len();
        let n = clip.frame_count();

        let ClipFeatures {
            poses,
            positions,
            velocities,
            yaw_angular_velocity,
            root_local_velocity,
            left_foot_height,
            right_foot_height,
            contact,
            ..
        } = clip;

        for (index, (((pose, positions), velocities), contact)) in poses
            .into_iter()
            .zip(positions)
            .zip(velocities)
            .zip(contact)
            .enumerate()
        {
            let mut state = MotionState {
                pose,
                sequence,
                index_in_sequence: index,
                root_local_velocity: root_local_velocity[index],
                yaw_angular_velocity: yaw_angular_velocity[index],
                left_foot_height: left_foot_height[index],
                right_foot_height: right_foot_height[index],
                contact,
                ..Default::default()
            };
            if index + 1 < n {
                state.children.insert(offset + index + 1);
            }
            self.states.push(state);
            self.features.push(StateFeatures {
                positions,
                velocities,
            });
        }

        offset
    }

    pub fn finish(self) -> (Vec<MotionState>, Vec<StateFeatures>) {
        (self.states, self.features)
    }
}
