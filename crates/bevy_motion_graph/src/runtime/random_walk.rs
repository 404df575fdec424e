use bevy::{log::warn, math::Vec3};
use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use super::{MotionWalker, PlacedState};
use crate::{
    core::{
        errors::{MotionGraphError, MotionGraphResult},
        id::StateId,
        motion_graph::MotionGraph,
    },
    utils::math::horizontal,
};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct RandomWalkSettings {
    /// States played along the current clip before a branch may be taken.
    pub min_transition_gap: usize,
    pub seed: u64,
}

impl Default for RandomWalkSettings {
    fn default() -> Self {
        Self {
            min_transition_gap: 60,
            seed: 3571,
        }
    }
}

/// Wanders through a motion graph without a goal. Mostly useful to eyeball the quality of the
/// splices a build produced.
///
/// The walker keeps to the current clip until `min_transition_gap` states have been played. At a
/// branch past that gap it picks one of the non-default children at random.
pub struct RandomWalker<'g> {
    graph: &'g MotionGraph,
    settings: RandomWalkSettings,
    rng: StdRng,
    current: StateId,
    gap: usize,
    position: Vec3,
    yaw: f32,
}

impl<'g> RandomWalker<'g> {
    /// Starts at the first state of a random clip.
    pub fn new(graph: &'g MotionGraph, settings: RandomWalkSettings) -> MotionGraphResult<Self> {
        let starts = graph.sequence_starts();
        if starts.is_empty() {
            return Err(MotionGraphError::EmptyGraph);
        }

        let mut rng = StdRng::seed_from_u64(settings.seed);
        let current = starts[rng.random_range(0..starts.len())];

        Ok(Self {
            graph,
            settings,
            rng,
            current,
            gap: 0,
            position: Vec3::ZERO,
            yaw: 0.,
        })
    }

    pub fn current(&self) -> StateId {
        self.current
    }

    /// States played since the last random branch.
    pub fn gap(&self) -> usize {
        self.gap
    }

    pub fn settings(&self) -> &RandomWalkSettings {
        &self.settings
    }

    fn next_state(&mut self) -> StateId {
        let graph = self.graph;
        let state = &graph.states[self.current];

        if self.gap < self.settings.min_transition_gap {
            if let Some(next) = state
                .children
                .iter()
                .copied()
                .find(|&c| graph.is_default_continuation(self.current, c))
            {
                self.gap += 1;
                return next;
            }
        }

        match state.children.len() {
            0 => {
                warn!("State {} is a dead end, restarting the walk", self.current);
                self.gap = 0;
                let starts = graph.sequence_starts();
                starts[self.rng.random_range(0..starts.len())]
            }
            1 => {
                self.gap += 1;
                state.children[0]
            }
            n => {
                self.gap = 0;
                state.children[self.rng.random_range(1..n)]
            }
        }
    }
}

impl MotionWalker for RandomWalker<'_> {
    fn graph(&self) -> &MotionGraph {
        self.graph
    }

    fn placement(&self) -> PlacedState {
        PlacedState {
            state: self.current,
            position: self.position,
            yaw: self.yaw,
        }
    }

    fn tick(&mut self) -> PlacedState {
        let next = self.next_state();
        let (position, yaw) = self.graph.states[next].advance(self.position, self.yaw);
        self.position = horizontal(position);
        self.yaw = yaw;
        self.current = next;
        self.placement()
    }
}
