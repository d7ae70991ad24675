use crate::PointId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Configuration and oracle defects. None of these are retried.
#[non_exhaustive]
#[derive(Debug, Error, PartialEq)]
pub enum Error {
    #[error("number of clusters must be at least 1, got {k}")]
    InvalidK { k: usize },

    #[error("cannot choose {k} medoids from {n} points")]
    TooFewPoints { k: usize, n: usize },

    #[error("initializer did not return {expected} medoids, but {got}")]
    InitializerCount { expected: usize, got: usize },

    #[error("medoid {id} is not a point of the {n} point input")]
    MedoidOutOfRange { id: PointId, n: usize },

    #[error("point {id} was chosen as a medoid more than once")]
    DuplicateMedoid { id: PointId },

    #[error("too many infinite distances, point {point} cannot be assigned to any medoid")]
    InfiniteDistances { point: PointId },

    #[error("number of samples must be at least 1, got {samples}")]
    InvalidSampleCount { samples: usize },

    #[error("invalid sample size {size}")]
    InvalidSampleSize { size: f64 },

    #[error("fast tolerance must be within [0, 1], got {value}")]
    InvalidFastTolerance { value: f64 },

    #[error("dissimilarity data of length {len} is not a {n}x{n} matrix")]
    MatrixShape { len: usize, n: usize },
}
