//! Runtime traversal of a finished [`MotionGraph`](crate::core::motion_graph::MotionGraph).
//!
//! A [`MotionWalker`] decides which state is played next, one state per tick. [`PathWalker`]
//! steers towards a target path, [`RandomWalker`] wanders. [`GraphPlayback`] turns either into a
//! stream of interpolated, world-placed poses.

pub mod path;
pub mod playback;
pub mod random_walk;
pub mod walker;

pub use path::{CatmullRomPath, PolylinePath, TargetPath};
pub use playback::GraphPlayback;
pub use random_walk::{RandomWalkSettings, RandomWalker};
pub use walker::{PathWalker, WalkerSettings};

use bevy::math::Vec3;

use crate::core::{id::StateId, motion_graph::MotionGraph};

/// A committed state together with where the character stands when it is played.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacedState {
    pub state: StateId,
    /// Horizontal root position.
    pub position: Vec3,
    pub yaw: f32,
}

pub trait MotionWalker {
    fn graph(&self) -> &MotionGraph;

    /// Currently committed state.
    fn placement(&self) -> PlacedState;

    /// Commits the next state and returns it.
    fn tick(&mut self) -> PlacedState;
}
