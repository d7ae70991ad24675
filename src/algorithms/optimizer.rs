use tracing::{debug, warn};

use super::cache::{AssignmentCache, MedoidSet};
use super::{EagerPam, FastPam, FastPam1, Pam};
use crate::error::{Error, Result};
use crate::measure::Measurable;
use crate::{Float, PointId, Slot};

/// Relative improvement a swap must achieve to be accepted. Guards against
/// cycling on floating point noise.
pub const SWAP_TOLERANCE: f64 = 1e-12;

/// Cost increases below this relative size are attributed to rounding.
const INSTABILITY_TOLERANCE: f64 = 1e-7;

/// Default of [`FastPam::fast_tolerance`]: accept every remaining improving swap.
pub const DEFAULT_FAST_TOLERANCE: f64 = 1.0;

/// A swap-based optimization of the medoids of `ids`.
pub trait Solver {
    /// Refine `medoids` in place until no improving swap exists or
    /// `max_iter` outer iterations ran (0 = unbounded).
    fn optimize<T: Float, M: Measurable<T>>(
        &self,
        d: &M,
        ids: &[PointId],
        medoids: &mut MedoidSet,
        max_iter: usize,
    ) -> Result<Run<T>>;
}

/// Outcome of one optimization.
#[derive(Debug, Clone)]
pub struct Run<T> {
    pub cost: T,
    /// Slot of the nearest medoid, for each entry of the optimized ids.
    pub assignment: Vec<Slot>,
    pub iterations: usize,
    pub swaps: usize,
    /// Cost after the initial assignment and after every iteration.
    pub cost_history: Vec<T>,
}

/// Mutable state of a single run: the medoids, the cache and the cost.
pub(crate) struct Optimization<'a, T, M> {
    d: &'a M,
    ids: &'a [PointId],
    medoids: &'a mut MedoidSet,
    pub(crate) cache: AssignmentCache<T>,
    pub(crate) cost: T,
    metric: bool,
    history: Vec<T>,
    pub(crate) swaps: usize,
}

impl<'a, T: Float, M: Measurable<T>> Optimization<'a, T, M> {
    pub(crate) fn new(d: &'a M, ids: &'a [PointId], medoids: &'a mut MedoidSet) -> Result<Self> {
        if medoids.len() > ids.len() {
            return Err(Error::TooFewPoints {
                k: medoids.len(),
                n: ids.len(),
            });
        }

        let mut cache = AssignmentCache::new(ids.len());
        let cost = cache.reassign_all(d, ids, medoids)?;
        debug!(cost = ?cost, "initial assignment");

        Ok(Self {
            d,
            ids,
            medoids,
            cache,
            cost,
            metric: d.is_metric(),
            history: vec![cost],
            swaps: 0,
        })
    }

    pub(crate) fn k(&self) -> usize {
        self.medoids.len()
    }

    /// Medoids, and with a metric points at distance 0 from their medoid,
    /// cannot improve the cost.
    pub(crate) fn is_candidate(&self, h: usize) -> bool {
        let rec = self.cache.get(h);
        if self.medoids.get(rec.nearest_slot) == self.ids[h] {
            return false;
        }
        !(self.metric && rec.nearest <= T::zero())
    }

    pub(crate) fn improves(&self, delta: T) -> bool {
        delta < -T::from_f64(SWAP_TOLERANCE) * self.cost
    }

    /// Swap and rebuild every assignment from scratch.
    ///
    /// Returns `false` if the cost went up; the swap is then undone.
    pub(crate) fn swap_rebuild(&mut self, slot: Slot, h: usize, expected: T) -> Result<bool> {
        let previous = self.medoids.replace(slot, self.ids[h]);
        let cost = self.cache.reassign_all(self.d, self.ids, &*self.medoids)?;
        self.settle(slot, previous, cost, expected)
    }

    /// Swap and patch only the affected assignments.
    ///
    /// Returns `false` if the cost went up; the swap is then undone.
    pub(crate) fn swap_patch(&mut self, slot: Slot, h: usize, expected: T) -> Result<bool> {
        let previous = self.medoids.replace(slot, self.ids[h]);
        let cost = self
            .cache
            .apply_swap(self.d, self.ids, &*self.medoids, slot, h);
        self.settle(slot, previous, cost, expected)
    }

    fn settle(&mut self, slot: Slot, previous: PointId, cost: T, expected: T) -> Result<bool> {
        if cost > self.cost {
            let increase = cost - self.cost;
            if increase < T::from_f64(INSTABILITY_TOLERANCE) * self.cost {
                warn!("failed to converge (numerical instability?)");
            } else {
                warn!(
                    increase = ?increase,
                    expected = ?expected,
                    "failed to converge: cost increased instead of decreasing"
                );
            }
            self.medoids.replace(slot, previous);
            self.cost = self.cache.reassign_all(self.d, self.ids, &*self.medoids)?;
            return Ok(false);
        }

        self.cost = cost;
        self.swaps += 1;
        Ok(true)
    }

    pub(crate) fn record(&mut self, iteration: usize) {
        debug!(iteration, cost = ?self.cost, swaps = self.swaps, "iteration complete");
        self.history.push(self.cost);
    }

    pub(crate) fn finish(self, iterations: usize) -> Run<T> {
        debug!(iterations, swaps = self.swaps, cost = ?self.cost, "optimization finished");
        Run {
            cost: self.cost,
            assignment: self.cache.labels(),
            iterations,
            swaps: self.swaps,
            cost_history: self.history,
        }
    }
}

/// `true` while another outer iteration is allowed.
pub(crate) fn within_budget(iteration: usize, max_iter: usize) -> bool {
    max_iter == 0 || iteration < max_iter
}

/// The available swap strategies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Strategy {
    Pam(Pam),
    FastPam1(FastPam1),
    FastPam(FastPam),
    Eager(EagerPam),
}

impl Strategy {
    pub fn pam() -> Self {
        Strategy::Pam(Pam)
    }

    pub fn fast_pam1() -> Self {
        Strategy::FastPam1(FastPam1)
    }

    pub fn fast_pam(fast_tolerance: f64) -> Result<Self> {
        FastPam::new(fast_tolerance).map(Strategy::FastPam)
    }

    /// First improvement, pricing every slot with its own pass.
    pub fn eager_pam() -> Self {
        Strategy::Eager(EagerPam { fast: false })
    }

    /// First improvement, pricing all slots in a single pass.
    pub fn faster_pam() -> Self {
        Strategy::Eager(EagerPam { fast: true })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Pam(_) => "PAM",
            Strategy::FastPam1(_) => "FastPAM1",
            Strategy::FastPam(_) => "FastPAM",
            Strategy::Eager(EagerPam { fast: false }) => "EagerPAM",
            Strategy::Eager(EagerPam { fast: true }) => "FasterPAM",
        }
    }
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy::FastPam(FastPam::default())
    }
}

impl Solver for Strategy {
    fn optimize<T: Float, M: Measurable<T>>(
        &self,
        d: &M,
        ids: &[PointId],
        medoids: &mut MedoidSet,
        max_iter: usize,
    ) -> Result<Run<T>> {
        match self {
            Strategy::Pam(s) => s.optimize(d, ids, medoids, max_iter),
            Strategy::FastPam1(s) => s.optimize(d, ids, medoids, max_iter),
            Strategy::FastPam(s) => s.optimize(d, ids, medoids, max_iter),
            Strategy::Eager(s) => s.optimize(d, ids, medoids, max_iter),
        }
    }
}
