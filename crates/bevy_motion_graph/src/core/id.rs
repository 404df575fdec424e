/// Index of a state in [`MotionGraph::states`].
///
/// States live in a dense arena, so ids are plain indices. They are only stable until the graph
/// is pruned; pruning compacts the arena and rewrites every id.
///
/// [`MotionGraph::states`]: crate::core::motion_graph::MotionGraph::states
pub type StateId = usize;

/// Index of the clip a state was sampled from, in the order the clips were given to the builder.
pub type SequenceId = usize;
