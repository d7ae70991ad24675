use std::marker::PhantomData;

use super::cache::AssignmentCache;
use crate::measure::Measurable;
use crate::utils::argmin;
use crate::{Float, PointId, Slot};

/// Prices the replacement of a medoid by a candidate point from the cached
/// nearest / second nearest distances, without reassigning anything.
pub struct SwapEvaluator<'a, T, M> {
    d: &'a M,
    ids: &'a [PointId],
    _marker: PhantomData<T>,
}

impl<'a, T: Float, M: Measurable<T>> SwapEvaluator<'a, T, M> {
    pub fn new(d: &'a M, ids: &'a [PointId]) -> Self {
        Self {
            d,
            ids,
            _marker: PhantomData,
        }
    }

    /// Change in total cost if the point at `h` replaces the medoid in `slot`.
    ///
    /// One pass over all points per slot.
    pub fn delta(&self, cache: &AssignmentCache<T>, h: usize, slot: Slot) -> T {
        let candidate = self.ids[h];
        // h itself becomes a medoid, so its current cost is recovered
        let mut cost = -cache.get(h).nearest;

        for (j, (&id, rec)) in self.ids.iter().zip(cache.records()).enumerate() {
            if j == h {
                continue;
            }
            let dist_h = self.d.measure(candidate, id);
            if rec.nearest_slot == slot {
                // Medoid removed: go to the candidate or the second nearest
                cost = cost + dist_h.min(rec.second) - rec.nearest;
            } else if dist_h < rec.nearest {
                cost = cost + dist_h - rec.nearest;
            }
        }

        cost
    }

    /// Best slot for the point at `h`, pricing each slot separately.
    pub fn best_slot(&self, cache: &AssignmentCache<T>, h: usize, k: usize) -> (Slot, T) {
        let mut best = (0, T::infinity());
        for slot in 0..k {
            let delta = self.delta(cache, h, slot);
            if delta < best.1 {
                best = (slot, delta);
            }
        }
        best
    }

    /// Change in total cost for every slot at once, in a single pass.
    ///
    /// `removal` must hold [`AssignmentCache::removal_loss`] of the current
    /// state. Points that move to the candidate contribute to every slot;
    /// only the slot they leave needs a correction.
    pub fn deltas(&self, cache: &AssignmentCache<T>, removal: &[T], h: usize, out: &mut [T]) {
        debug_assert_eq!(removal.len(), out.len());

        // A point without a finite second nearest (always the case for k == 1)
        // makes its slot's removal loss infinite, and inf - inf is NaN
        if removal.iter().any(|loss| !loss.is_finite()) {
            for (slot, delta) in out.iter_mut().enumerate() {
                *delta = self.delta(cache, h, slot);
            }
            return;
        }

        out.copy_from_slice(removal);
        let candidate = self.ids[h];
        let mut shared = T::zero();

        for (&id, rec) in self.ids.iter().zip(cache.records()) {
            let dist_h = self.d.measure(candidate, id);
            let nearest = rec.nearest_slot;
            if dist_h < rec.nearest {
                shared = shared + dist_h - rec.nearest;
                out[nearest] = out[nearest] + rec.nearest - rec.second;
            } else if dist_h < rec.second {
                out[nearest] = out[nearest] + dist_h - rec.second;
            }
        }

        out.iter_mut().for_each(|delta| *delta = *delta + shared);
    }

    /// Best slot for the point at `h` from a single pass.
    pub fn best_slot_fast(
        &self,
        cache: &AssignmentCache<T>,
        removal: &[T],
        h: usize,
        out: &mut [T],
    ) -> (Slot, T) {
        self.deltas(cache, removal, h, out);
        argmin(out).unwrap_or((0, T::infinity()))
    }
}
