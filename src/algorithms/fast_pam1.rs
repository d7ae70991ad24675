use tracing::instrument;

use super::*;

/// Same swaps as [`Pam`], but each candidate is priced for all slots in one
/// pass using the per-slot removal loss, and only affected assignments are
/// patched after a swap.
///
/// E. Schubert, P. J. Rousseeuw, "Faster k-Medoids Clustering: Improving the
/// PAM, CLARA, and CLARANS Algorithms", SISAP 2019.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FastPam1;

impl Solver for FastPam1 {
    #[instrument(level = "debug", name = "fast_pam1", skip_all, fields(n = ids.len(), k = medoids.len()))]
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

        let mut iteration = 0;
        while within_budget(iteration, max_iter) {
            iteration += 1;
            opt.cache.removal_loss(&mut removal);

            let mut min_delta = T::infinity();
            let mut best = None;

            for i in 0..ids.len() {
                if !opt.is_candidate(i) {
                    continue;
                }

                let (k, delta) = evaluator.best_slot_fast(&opt.cache, &removal, i, &mut deltas);
                if delta < min_delta {
                    min_delta = delta;
                    best = Some((i, k));
                }
            }

            let (i, medoid_to_swap) = match best {
                Some(best) if opt.improves(min_delta) => best,
                _ => break,
            };

            if !opt.swap_patch(medoid_to_swap, i, min_delta)? {
                break;
            }
            opt.record(iteration);
        }

        Ok(opt.finish(iteration))
    }
}
