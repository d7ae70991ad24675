use crate::{Float, PointId};

pub mod cached;
pub mod matrix;

pub trait Measurable<T: Float> {
    /// Measure the dissimilarity between two elements in the collection
    ///
    /// Must be symmetric, non-negative and zero for `i == j`.
    fn measure(&self, i: PointId, j: PointId) -> T;

    /// Return the number of elements in the collection
    fn num_elements(&self) -> usize;

    /// Whether the measure satisfies the triangle inequality.
    ///
    /// Only used to skip candidates that coincide with their medoid.
    fn is_metric(&self) -> bool {
        false
    }
}

impl<'a, T: Float, M: Measurable<T> + ?Sized> Measurable<T> for &'a M {
    #[inline]
    fn measure(&self, i: PointId, j: PointId) -> T {
        (**self).measure(i, j)
    }

    fn num_elements(&self) -> usize {
        (**self).num_elements()
    }

    fn is_metric(&self) -> bool {
        (**self).is_metric()
    }
}
