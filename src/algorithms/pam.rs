use tracing::instrument;

use super::*;

/// The classic exchange: each iteration prices every (candidate, slot) pair
/// with a full pass, performs the single best swap and reassigns all points.
///
/// L. Kaufman, P. J. Rousseeuw, "Clustering by means of Medoids".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pam;

impl Solver for Pam {
    #[instrument(level = "debug", name = "pam", skip_all, fields(n = ids.len(), k = medoids.len()))]
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

        let mut iteration = 0;
        while within_budget(iteration, max_iter) {
            iteration += 1;

            let mut min_delta = T::infinity();
            let mut best = None;

            for i in 0..ids.len() {
                if !opt.is_candidate(i) {
                    continue;
                }

                for k in 0..num_medoids {
                    let delta = evaluator.delta(&opt.cache, i, k);
                    if delta < min_delta {
                        min_delta = delta;
                        best = Some((i, k));
                    }
                }
            }

            let (i, medoid_to_swap) = match best {
                Some(best) if opt.improves(min_delta) => best,
                _ => break,
            };

            if !opt.swap_rebuild(medoid_to_swap, i, min_delta)? {
                break;
            }
            opt.record(iteration);
        }

        Ok(opt.finish(iteration))
    }
}
