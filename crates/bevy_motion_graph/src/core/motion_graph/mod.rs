pub mod dot_output;
pub mod loader;
pub mod serial;

pub use dot_output::ToDot;

use bevy::{asset::Asset, math::Vec3, reflect::TypePath};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use super::{
    errors::{MotionGraphError, MotionGraphResult},
    id::{SequenceId, StateId},
    pose::Pose,
};
use crate::utils::math::yaw_rotation;

/// Coarse ground-contact classification of a pose.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContactLabel {
    LeftOnly,
    RightOnly,
    #[default]
    Both,
    /// Only produced when contact cannot be evaluated (too few bones, or foot bones missing).
    Airborne,
}

/// One stored pose plus its locomotion features and outgoing transitions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MotionState {
    pub pose: Pose,
    pub sequence: SequenceId,
    pub index_in_sequence: usize,
    /// Root displacement into this frame, expressed in the previous frame's yaw frame.
    pub root_local_velocity: Vec3,
    /// Root yaw change into this frame, in radians.
    pub yaw_angular_velocity: f32,
    pub left_foot_height: f32,
    pub right_foot_height: f32,
    pub contact: ContactLabel,
    pub children: IndexSet<StateId>,
}

impl MotionState {
    /// A branch state has other than exactly one outgoing transition.
    pub fn is_branch(&self) -> bool {
        self.children.len() != 1
    }

    pub fn is_dead_end(&self) -> bool {
        self.children.is_empty()
    }

    /// Displacement after stepping into this state from a character at `position` facing `yaw`.
    pub fn advance(&self, position: Vec3, yaw: f32) -> (Vec3, f32) {
        (
            position + yaw_rotation(yaw) * self.root_local_velocity,
            yaw + self.yaw_angular_velocity,
        )
    }
}

/// Cumulative displacement from a branch state to a reachable state, along one concrete walk.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TransitionInfo {
    /// States stepped into, in order. Excludes the branch state itself.
    pub path: Vec<StateId>,
    pub delta_position: Vec3,
    pub delta_yaw: f32,
}

#[derive(Asset, TypePath, Clone, Debug, PartialEq)]
pub struct MotionGraph {
    pub states: Vec<MotionState>,
    /// Authored speed of the source clips.
    pub speed: f32,
    /// Duration of a single state during playback, in seconds.
    pub frame_duration: f32,
    pub transition_cache: IndexMap<(StateId, StateId), TransitionInfo>,
}

impl Default for MotionGraph {
    fn default() -> Self {
        Self {
            states: vec![],
            speed: 1.,
            frame_duration: 0.,
            transition_cache: IndexMap::new(),
        }
    }
}

impl MotionGraph {
    pub fn new(states: Vec<MotionState>, speed: f32, frame_duration: f32) -> Self {
        Self {
            states,
            speed,
            frame_duration,
            transition_cache: IndexMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn state(&self, id: StateId) -> Option<&MotionState> {
        self.states.get(id)
    }

    pub fn edge_count(&self) -> usize {
        self.states.iter().map(|s| s.children.len()).sum()
    }

    pub fn branch_states(&self) -> impl Iterator<Item = StateId> + '_ {
        self.states
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_branch())
            .map(|(id, _)| id)
    }

    /// Incoming edges of every state, derived from the `children` sets.
    pub fn parents(&self) -> MotionGraphResult<Vec<Vec<StateId>>> {
        derive_parents(&self.states)
    }

    /// First state of every run of consecutive states sharing a source clip.
    pub fn sequence_starts(&self) -> Vec<StateId> {
        (0..self.states.len())
            .filter(|&id| id == 0 || self.states[id - 1].sequence != self.states[id].sequence)
            .collect()
    }

    pub fn transition(&self, from: StateId, to: StateId) -> Option<&TransitionInfo> {
        self.transition_cache.get(&(from, to))
    }

    /// The next frame of the same clip when it is a child of `id`, otherwise the first child.
    pub fn default_continuation(&self, id: StateId) -> Option<StateId> {
        let state = self.states.get(id)?;
        state
            .children
            .iter()
            .copied()
            .find(|&c| self.is_default_continuation(id, c))
            .or_else(|| state.children.first().copied())
    }

    pub fn is_default_continuation(&self, from: StateId, to: StateId) -> bool {
        match (self.states.get(from), self.states.get(to)) {
            (Some(a), Some(b)) => {
                a.sequence == b.sequence && b.index_in_sequence == a.index_in_sequence + 1
            }
            _ => false,
        }
    }

    /// Checks that every child id and every cached path refers to an existing state, and that no
    /// state is a dead end.
    pub fn validate(&self) -> MotionGraphResult<()> {
        let len = self.states.len();
        for (id, state) in self.states.iter().enumerate() {
            if let Some(&child) = state.children.iter().find(|&&c| c >= len) {
                return Err(MotionGraphError::StructuralInconsistency {
                    state: id,
                    child,
                    len,
                });
            }
            if state.is_dead_end() {
                return Err(MotionGraphError::DeadEnd(id));
            }
        }

        for (&(from, to), info) in &self.transition_cache {
            if from >= len {
                return Err(MotionGraphError::UnknownState(from));
            }
            if let Some(&bad) = std::iter::once(&to)
                .chain(info.path.iter())
                .find(|&&s| s >= len)
            {
                return Err(MotionGraphError::StructuralInconsistency {
                    state: from,
                    child: bad,
                    len,
                });
            }
        }

        Ok(())
    }
}

/// Inverts the `children` sets. Parents are listed in ascending order.
pub fn derive_parents(states: &[MotionState]) -> MotionGraphResult<Vec<Vec<StateId>>> {
    let len = states.len();
    let mut parents = vec![vec![]; len];
    for (id, state) in states.iter().enumerate() {
        for &child in &state.children {
            parents
                .get_mut(child)
                .ok_or(MotionGraphError::StructuralInconsistency {
                    state: id,
                    child,
                    len,
                })?
                .push(id);
        }
    }
    Ok(parents)
}
