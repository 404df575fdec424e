//! # Bevy Motion Graph
//!
//! **Bevy Motion Graph** builds and plays back _motion graphs_ for [Bevy](https://bevyengine.org/):
//! directed graphs whose states are the frames of a set of locomotion clips and whose edges are
//! either the natural next frame of a clip or a splice into a similar frame of another clip.
//!
//! ## Assets
//!
//! - [`Skeleton`], defined in `*.skn.ron` files. Bones may be listed in any order, a bone without
//!   a parent is the root:
//!   ```ron
//!   (
//!       name: "biped",
//!       bones: [
//!           (name: "hips", bind_pose: (translation: (0.0, 1.0, 0.0))),
//!           (name: "left_foot", parent: Some("hips"), bind_pose: (translation: (0.1, -0.9, 0.0))),
//!       ],
//!   )
//!   ```
//! - [`MotionClip`], defined in `*.anim.ron` files. A clip holds one keyframe channel per
//!   animated bone; frames are the keyframes of its densest channel.
//! - [`MotionGraph`], stored in binary `*.mog` files written by the builder.
//!
//! All three are registered by [`MotionGraphPlugin`].
//!
//! ## Building
//!
//! [`MotionGraphBuilder`] runs the offline pipeline over a skeleton and its clips. The
//! `motion_graph_builder` binary drives it from a `*.mgb.ron` manifest:
//!
//! ```ron
//! (
//!     skeleton: "biped.skn.ron",
//!     clip_directory: "clips",
//!     clips: ["walk.anim.ron", "run.anim.ron"],
//!     settings: (
//!         connectivity: (min_gap: 120, distance_threshold: 0.6),
//!     ),
//! )
//! ```
//!
//! ## Playback
//!
//! A [`PathWalker`] steers a character along a [`TargetPath`] by picking one state per tick, a
//! [`RandomWalker`] wanders. Either can be wrapped in a [`GraphPlayback`] to get blended,
//! world-placed poses over time.
//!
//! [`Skeleton`]: crate::core::skeleton::Skeleton
//! [`MotionClip`]: crate::core::animation_clip::MotionClip
//! [`MotionGraph`]: crate::core::motion_graph::MotionGraph
//! [`MotionGraphPlugin`]: crate::core::plugin::MotionGraphPlugin
//! [`MotionGraphBuilder`]: crate::builder::MotionGraphBuilder
//! [`PathWalker`]: crate::runtime::PathWalker
//! [`TargetPath`]: crate::runtime::TargetPath
//! [`RandomWalker`]: crate::runtime::RandomWalker
//! [`GraphPlayback`]: crate::runtime::GraphPlayback

pub mod builder;
pub mod core;
pub mod interpolation;
pub mod runtime;
pub mod sampling;
pub mod utils;

pub mod prelude {
    pub use super::builder::{BuildReport, BuildSettings, MotionGraphBuilder, manifest::BuildManifest};
    pub use super::core::{
        animation_clip::MotionClip,
        errors::*,
        id::{SequenceId, StateId},
        motion_graph::{ContactLabel, MotionGraph, MotionState, ToDot, TransitionInfo},
        plugin::MotionGraphPlugin,
        pose::{BoneTransform, Pose},
        skeleton::Skeleton,
    };
    pub use super::interpolation::linear::*;
    pub use super::runtime::*;
    pub use super::sampling::linear::*;
}
