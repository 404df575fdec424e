use thiserror::Error;

use crate::core::id::StateId;

#[non_exhaustive]
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MotionGraphError {
    /// A `children` entry points outside the state array, or to a state that was removed.
    #[error("state {state} has child {child}, which is not a valid state (graph has {len} states)")]
    StructuralInconsistency {
        state: StateId,
        child: StateId,
        len: usize,
    },
    #[error("motion graph has no states")]
    EmptyGraph,
    #[error("state {0} does not exist")]
    UnknownState(StateId),
    #[error("state {0} has no outgoing transitions")]
    DeadEnd(StateId),
}

pub type MotionGraphResult<T> = Result<T, MotionGraphError>;
