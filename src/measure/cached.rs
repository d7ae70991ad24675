//! Memoizing distance oracle for a single sampling trial.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use tracing::{debug, warn};

use super::Measurable;
use crate::{Float, PointId};

/// Caches distances between members of one subsample, keyed by unordered pair.
///
/// Queries that involve a point outside the subsample are answered by the
/// inner measure without caching. The first such query of a trial is logged,
/// since it means the initializer does not stay within the ids it was given.
pub struct CachedMeasure<'a, T: Float, M> {
    inner: &'a M,
    members: Vec<bool>,
    cache: RefCell<HashMap<(PointId, PointId), T>>,
    hits: Cell<usize>,
    misses: Cell<usize>,
    foreign: Cell<usize>,
}

impl<'a, T: Float, M: Measurable<T>> CachedMeasure<'a, T, M> {
    pub fn new(inner: &'a M, sample: &[PointId]) -> Self {
        let mut members = vec![false; inner.num_elements()];
        for &id in sample {
            members[id] = true;
        }

        Self {
            inner,
            members,
            cache: RefCell::new(HashMap::with_capacity(sample.len() * 4)),
            hits: Cell::new(0),
            misses: Cell::new(0),
            foreign: Cell::new(0),
        }
    }

    /// Number of queries that touched a point outside the subsample.
    pub fn foreign_queries(&self) -> usize {
        self.foreign.get()
    }

    pub fn cached_pairs(&self) -> usize {
        self.cache.borrow().len()
    }

    pub fn report(&self) {
        debug!(
            hits = self.hits.get(),
            misses = self.misses.get(),
            foreign = self.foreign.get(),
            "distance cache usage"
        );
    }

    fn is_member(&self, id: PointId) -> bool {
        self.members.get(id).copied().unwrap_or(false)
    }
}

impl<'a, T: Float, M: Measurable<T>> Measurable<T> for CachedMeasure<'a, T, M> {
    fn measure(&self, i: PointId, j: PointId) -> T {
        if i == j {
            return T::zero();
        }

        if !self.is_member(i) || !self.is_member(j) {
            if self.foreign.get() == 0 {
                warn!(
                    i,
                    j,
                    "distance query outside the sample; initializer is not compatible with caching"
                );
            }
            self.foreign.set(self.foreign.get() + 1);
            return self.inner.measure(i, j);
        }

        let key = if i < j { (i, j) } else { (j, i) };
        let cached = self.cache.borrow().get(&key).copied();
        if let Some(dist) = cached {
            self.hits.set(self.hits.get() + 1);
            return dist;
        }

        let dist = self.inner.measure(key.0, key.1);
        self.cache.borrow_mut().insert(key, dist);
        self.misses.set(self.misses.get() + 1);
        dist
    }

    fn num_elements(&self) -> usize {
        self.inner.num_elements()
    }

    fn is_metric(&self) -> bool {
        self.inner.is_metric()
    }
}
