use tracing::{debug, instrument};

use super::*;
use crate::utils::argmin;

/// Like [`FastPam1`], but remembers the best candidate of every slot and,
/// after the best swap, also performs the other slots' swaps while they
/// still improve the cost.
///
/// A remembered swap is re-priced against the updated assignment. It is
/// accepted if it still improves and its delta is at most
/// `1 - fast_tolerance` times the delta it was chosen with: 0 only accepts
/// swaps whose gain was not reduced, 1 accepts every swap that still improves.
///
/// E. Schubert, P. J. Rousseeuw, "Fast and Eager k-Medoids Clustering: O(k)
/// Runtime Improvement of the PAM, CLARA, and CLARANS Algorithms",
/// Information Systems 101, 2021.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FastPam {
    fast_tolerance: f64,
}

impl FastPam {
    pub fn new(fast_tolerance: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&fast_tolerance) {
            return Err(Error::InvalidFastTolerance {
                value: fast_tolerance,
            });
        }
        Ok(Self { fast_tolerance })
    }

    pub fn fast_tolerance(&self) -> f64 {
        self.fast_tolerance
    }
}

impl Default for FastPam {
    fn default() -> Self {
        Self {
            fast_tolerance: DEFAULT_FAST_TOLERANCE,
        }
    }
}

impl Solver for FastPam {
    #[instrument(level = "debug", name = "fast_pam", skip_all, fields(n = ids.len(), k = medoids.len()))]
    fn optimize<T: Float, M: Measurable<T>>(
        &self,
        d: &M,
        ids: &[PointId],
        medoids: &mut MedoidSet,
        max_iter: usize,
    ) -> Result<Run<T>> {
        let mut opt = Optimization::new(d, ids, medoids)?;
        let evaluator = SwapEvaluator::new(d, ids);
        let num_medoids = opt.k();
        let keep = T::from_f64(1.0 - self.fast_tolerance);

        let mut removal = vec![T::zero(); num_medoids];
        let mut deltas = vec![T::zero(); num_medoids];
        let mut best = vec![T::infinity(); num_medoids];
        let mut best_candidates = vec![0; num_medoids];

        let mut iteration = 0;
        let mut stalled = false;
        while !stalled && within_budget(iteration, max_iter) {
            iteration += 1;
            opt.cache.removal_loss(&mut removal);
            best.iter_mut().for_each(|b| *b = T::infinity());

            for i in 0..ids.len() {
                if !opt.is_candidate(i) {
                    continue;
                }

                evaluator.deltas(&opt.cache, &removal, i, &mut deltas);
                for (k, &delta) in deltas.iter().enumerate() {
                    if delta < best[k] {
                        best[k] = delta;
                        best_candidates[k] = i;
                    }
                }
            }

            let (medoid_to_swap, min_delta) = match argmin(&best) {
                Some(found) if opt.improves(found.1) => found,
                _ => break,
            };

            if !opt.swap_patch(medoid_to_swap, best_candidates[medoid_to_swap], min_delta)? {
                break;
            }
            best[medoid_to_swap] = T::infinity();
            let swaps_before = opt.swaps;

            // Remaining slots, most promising first
            while let Some((k, prior)) = argmin(&best) {
                if !opt.improves(prior) {
                    break;
                }
                best[k] = T::infinity();

                let i = best_candidates[k];
                if !opt.is_candidate(i) {
                    continue;
                }

                opt.cache.removal_loss(&mut removal);
                evaluator.deltas(&opt.cache, &removal, i, &mut deltas);
                let delta = deltas[k];
                if !opt.improves(delta) || delta > keep * prior {
                    continue;
                }

                if !opt.swap_patch(k, i, delta)? {
                    stalled = true;
                    break;
                }
            }

            debug!(additional = opt.swaps - swaps_before, "additional swaps");
            opt.record(iteration);
        }

        Ok(opt.finish(iteration))
    }
}
