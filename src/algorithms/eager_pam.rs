use tracing::instrument;

use super::*;

/// First-improvement exchange: points are visited in order and the best
/// swap of the first improving candidate is applied immediately. Scanning
/// continues after the swapped point and wraps around, until a full cycle
/// passes without a swap.
///
/// With `fast`, all slots of a candidate are priced in one pass (FasterPAM);
/// otherwise every slot gets its own pass (EagerPAM).
///
/// E. Schubert, P. J. Rousseeuw, "Fast and Eager k-Medoids Clustering: O(k)
/// Runtime Improvement of the PAM, CLARA, and CLARANS Algorithms",
/// Information Systems 101, 2021.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EagerPam {
    pub fast: bool,
}

impl Solver for EagerPam {
    #[instrument(level = "debug", name = "eager_pam", skip_all, fields(n = ids.len(), k = medoids.len(), fast = self.fast))]
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

        let mut removal = vec![T::zero(); num_medoids];
        let mut deltas = vec![T::zero(); num_medoids];
        if self.fast {
            opt.cache.removal_loss(&mut removal);
        }

        let mut last_swap = None;
        let mut iteration = 0;
        'passes: while within_budget(iteration, max_iter) {
            iteration += 1;
            let swaps_before = opt.swaps;

            for i in 0..ids.len() {
                if last_swap == Some(i) {
                    break;
                }
                if !opt.is_candidate(i) {
                    continue;
                }

                let (k, delta) = if self.fast {
                    evaluator.best_slot_fast(&opt.cache, &removal, i, &mut deltas)
                } else {
                    evaluator.best_slot(&opt.cache, i, num_medoids)
                };
                if !opt.improves(delta) {
                    continue;
                }

                if !opt.swap_patch(k, i, delta)? {
                    opt.record(iteration);
                    break 'passes;
                }
                last_swap = Some(i);
                if self.fast {
                    opt.cache.removal_loss(&mut removal);
                }
            }

            opt.record(iteration);
            if opt.swaps == swaps_before {
                break;
            }
        }

        Ok(opt.finish(iteration))
    }
}
