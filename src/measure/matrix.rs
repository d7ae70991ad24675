use super::Measurable;
use crate::error::{Error, Result};
use crate::{Float, PointId};

/// Dense, precomputed n x n dissimilarity matrix.
pub struct DissimilarityMatrix<T: Float> {
    data: Vec<T>,
    n_elements: usize,
    metric: bool,
}

impl<T: Float> DissimilarityMatrix<T> {
    /// Evaluates `f` once per unordered pair and mirrors the result.
    pub fn from_points<P, F>(points: &[P], f: F) -> Self
    where
        F: Fn(&P, &P) -> T,
    {
        let n_elements = points.len();
        let mut data = vec![T::zero(); n_elements * n_elements];

        for (i, a) in points.iter().enumerate() {
            for (j, b) in points.iter().enumerate().skip(i + 1) {
                let dist = f(a, b);
                data[i * n_elements + j] = dist;
                data[j * n_elements + i] = dist;
            }
        }

        Self {
            data,
            n_elements,
            metric: false,
        }
    }

    pub fn from_flat(data: &[T], n_elements: usize) -> Result<Self> {
        ensure_square(data.len(), n_elements)?;
        Ok(Self {
            data: data.to_owned(),
            n_elements,
            metric: false,
        })
    }

    /// Declare whether the underlying measure is a metric.
    pub fn with_metric(mut self, metric: bool) -> Self {
        self.metric = metric;
        self
    }
}

fn ensure_square(len: usize, n: usize) -> Result<()> {
    match n.checked_mul(n) {
        Some(expected) if expected == len => Ok(()),
        _ => Err(Error::MatrixShape { len, n }),
    }
}

impl<T: Float> Measurable<T> for DissimilarityMatrix<T> {
    #[inline]
    fn measure(&self, i: PointId, j: PointId) -> T {
        debug_assert!(i < self.n_elements && j < self.n_elements);
        self.data[i * self.n_elements + j]
    }

    fn num_elements(&self) -> usize {
        self.n_elements
    }

    fn is_metric(&self) -> bool {
        self.metric
    }
}
