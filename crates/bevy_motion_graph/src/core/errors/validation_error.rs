use thiserror::Error;

#[non_exhaustive]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SkeletonValidationError {
    #[error("skeleton has no bones")]
    Empty,
    #[error("bone {bone} has parent index {parent}, but the skeleton only has {len} bones")]
    ParentOutOfRange {
        bone: String,
        parent: usize,
        len: usize,
    },
    #[error("bone {bone} references unknown parent {parent}")]
    UnknownParent { bone: String, parent: String },
    #[error("bone {0} is part of a parent cycle")]
    Cycle(String),
    #[error("bone name {0} is used more than once")]
    DuplicateBoneName(String),
}
