use std::path::PathBuf;

use thiserror::Error;

use super::{MotionGraphError, SkeletonValidationError};

/// Possible errors produced while reading or writing skeletons, clips and motion graphs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum AssetLoaderError {
    /// An [IO](std::io) Error
    #[error("could not read asset: {0}")]
    Io(#[from] std::io::Error),
    /// A [RON](ron) Error
    #[error("could not parse RON: {0}")]
    RonSpannedError(#[from] ron::error::SpannedError),
    #[error("could not decode motion graph: {0}")]
    DecodeError(#[from] rmp_serde::decode::Error),
    #[error("could not encode motion graph: {0}")]
    EncodeError(#[from] rmp_serde::encode::Error),
    #[error("skeleton is invalid: {0}")]
    InvalidSkeleton(#[from] SkeletonValidationError),
    #[error("motion graph does not satisfy constraints: {0}")]
    InconsistentGraph(#[from] MotionGraphError),
    #[error("{}: {source}", path.display())]
    InFile {
        path: PathBuf,
        source: Box<AssetLoaderError>,
    },
}

impl AssetLoaderError {
    /// Attaches the path of the file being processed.
    pub fn in_file(self, path: impl Into<PathBuf>) -> Self {
        Self::InFile {
            path: path.into(),
            source: Box::new(self),
        }
    }
}
