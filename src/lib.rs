//! Swap-based k-medoids clustering: PAM, FastPAM1, FastPAM, EagerPAM and
//! FasterPAM, plus CLARA sampling on top of any of them.
//!
//! ```
//! use medoids::algorithms::{KMedoids, Strategy};
//! use medoids::measure::matrix::DissimilarityMatrix;
//!
//! let points = [(0.0, 0.0), (1.0, 0.0), (10.0, 0.0), (11.0, 0.0)];
//! let d = DissimilarityMatrix::from_points(&points, |a: &(f64, f64), b: &(f64, f64)| {
//!     ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
//! });
//!
//! let result = KMedoids::new(2)?.with_strategy(Strategy::faster_pam()).fit(&d)?;
//! assert_eq!(result.cost, 2.0);
//! # Ok::<(), medoids::Error>(())
//! ```
use std::fmt::Debug;

pub trait Float: num_traits::Float + Debug + Send + Sync {
    fn from_f64(x: f64) -> Self;
}

impl Float for f64 {
    #[inline]
    fn from_f64(x: f64) -> Self {
        x
    }
}

impl Float for f32 {
    #[inline]
    fn from_f64(x: f64) -> Self {
        x as f32
    }
}

/// Index of an input point.
pub type PointId = usize;

/// Position of a medoid in the medoid set, `0..k`.
pub type Slot = usize;

pub mod algorithms;
pub mod error;
pub mod measure;
pub mod utils;

pub use error::{Error, Result};
