//! Clustering LARge Applications: k-medoids on repeated random subsamples.

use std::cmp::Ordering;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::{debug, info, instrument};

use super::*;
use crate::measure::cached::CachedMeasure;
use crate::utils::sample_indices;

/// Size of every subsample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleSize {
    Absolute(usize),
    /// Fraction of the input, rounded up.
    Fraction(f64),
}

impl From<f64> for SampleSize {
    /// Values up to 1 are fractions, larger values absolute sizes with the
    /// fractional part truncated.
    fn from(size: f64) -> Self {
        if size <= 1.0 {
            SampleSize::Fraction(size)
        } else {
            SampleSize::Absolute(size as usize)
        }
    }
}

impl SampleSize {
    fn resolve(&self, n: usize) -> usize {
        match *self {
            SampleSize::Absolute(size) => size,
            SampleSize::Fraction(f) => (f * n as f64).ceil() as usize,
        }
    }
}

/// Runs [`KMedoids`] on `samples` random subsamples, assigns the remaining
/// points to the resulting medoids and keeps the trial of lowest total cost.
///
/// L. Kaufman, P. J. Rousseeuw, "Clustering Large Data Sets", Pattern
/// Recognition in Practice, 1986.
#[derive(Debug, Clone)]
pub struct Clara<I = Init> {
    kmedoids: KMedoids<I>,
    samples: usize,
    sample_size: Option<SampleSize>,
    keep_medoids: bool,
    parallel: bool,
}

impl<I> Clara<I> {
    pub fn new(kmedoids: KMedoids<I>) -> Self {
        Self {
            kmedoids,
            samples: 5,
            sample_size: None,
            keep_medoids: false,
            parallel: true,
        }
    }

    pub fn with_samples(mut self, samples: usize) -> Result<Self> {
        if samples == 0 {
            return Err(Error::InvalidSampleCount { samples });
        }
        self.samples = samples;
        Ok(self)
    }

    /// Defaults to `40 + 2k`.
    pub fn with_sample_size(mut self, size: SampleSize) -> Result<Self> {
        match size {
            SampleSize::Absolute(0) => {
                return Err(Error::InvalidSampleSize { size: 0.0 });
            }
            SampleSize::Fraction(f) if !(f > 0.0 && f <= 1.0) => {
                return Err(Error::InvalidSampleSize { size: f });
            }
            _ => {}
        }
        self.sample_size = Some(size);
        Ok(self)
    }

    /// Include the best medoids so far in every following sample.
    ///
    /// Trials then depend on each other and run sequentially.
    pub fn keep_medoids(mut self, keep: bool) -> Self {
        self.keep_medoids = keep;
        self
    }

    /// Run independent trials on the rayon thread pool.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    fn sample_size(&self, n: usize) -> usize {
        let k = self.kmedoids.k;
        let size = match self.sample_size {
            Some(size) => size.resolve(n),
            None => 40 + 2 * k,
        };
        size.max(k).min(n)
    }
}

/// One sampling trial, scored on the full input.
struct Trial<T> {
    medoids: MedoidSet,
    assignment: Vec<Slot>,
    score: T,
    run: Run<T>,
}

impl<I: Initializer + Sync> Clara<I> {
    /// Cluster all points of `d`, seeded from the configured seed.
    pub fn fit<T, M>(&self, d: &M) -> Result<Clustering<T>>
    where
        T: Float,
        M: Measurable<T> + Sync,
    {
        let mut rng = ChaCha8Rng::seed_from_u64(self.kmedoids.seed);
        self.fit_with_rng(d, &mut rng)
    }

    /// Cluster all points of `d`. One sub-seed per trial is drawn from `rng`,
    /// so equal generators reproduce equal trials.
    #[instrument(skip_all, fields(k = self.kmedoids.k, n = d.num_elements(), samples = self.samples))]
    pub fn fit_with_rng<T, M, R>(&self, d: &M, rng: &mut R) -> Result<Clustering<T>>
    where
        T: Float,
        M: Measurable<T> + Sync,
        R: Rng + ?Sized,
    {
        let n = d.num_elements();
        if self.kmedoids.k > n {
            return Err(Error::TooFewPoints {
                k: self.kmedoids.k,
                n,
            });
        }

        let size = self.sample_size(n);
        let seeds: Vec<u64> = (0..self.samples).map(|_| rng.gen()).collect();
        let mut trial_scores = Vec::with_capacity(seeds.len());

        superluminal_perf::begin_event("SAMPLE");
        let best = if self.keep_medoids || !self.parallel {
            self.run_sequential(d, size, &seeds, &mut trial_scores)
        } else {
            self.run_parallel(d, size, seeds, &mut trial_scores)
        };
        superluminal_perf::end_event();

        let best = match best? {
            Some(best) => best,
            None => return Err(Error::InvalidSampleCount { samples: 0 }),
        };

        info!(
            sample_size = size,
            best_score = ?best.score,
            "sampling complete"
        );

        Ok(Clustering {
            medoids: best.medoids.into_vec(),
            cost: best.score,
            assignment: best.assignment,
            iterations: best.run.iterations,
            swaps: best.run.swaps,
            cost_history: best.run.cost_history,
            trial_scores,
        })
    }

    fn run_sequential<T, M>(
        &self,
        d: &M,
        size: usize,
        seeds: &[u64],
        scores: &mut Vec<T>,
    ) -> Result<Option<Trial<T>>>
    where
        T: Float,
        M: Measurable<T> + Sync,
    {
        let mut best: Option<Trial<T>> = None;

        for &seed in seeds {
            let prior = if self.keep_medoids {
                best.as_ref().map(|b| b.medoids.as_slice())
            } else {
                None
            };
            let trial = self.trial(d, size, prior, seed)?;
            scores.push(trial.score);

            if best.as_ref().map_or(true, |b| trial.score < b.score) {
                best = Some(trial);
            }
        }

        Ok(best)
    }

    fn run_parallel<T, M>(
        &self,
        d: &M,
        size: usize,
        seeds: Vec<u64>,
        scores: &mut Vec<T>,
    ) -> Result<Option<Trial<T>>>
    where
        T: Float,
        M: Measurable<T> + Sync,
    {
        let trials: Vec<Result<Trial<T>>> = seeds
            .into_par_iter()
            .map(|seed| self.trial(d, size, None, seed))
            .collect();

        let mut best: Option<Trial<T>> = None;
        for trial in trials {
            let trial = trial?;
            scores.push(trial.score);
            best = Some(match best {
                None => trial,
                Some(prev) => match trial.score.partial_cmp(&prev.score) {
                    Some(Ordering::Less) => trial,
                    _ => prev,
                },
            });
        }

        Ok(best)
    }

    fn trial<T, M>(
        &self,
        d: &M,
        size: usize,
        prior: Option<&[PointId]>,
        seed: u64,
    ) -> Result<Trial<T>>
    where
        T: Float,
        M: Measurable<T>,
    {
        let n = d.num_elements();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let sample = draw_sample(n, size, prior, &mut rng);

        let cached = CachedMeasure::new(d, &sample);
        let (medoids, run) = self.kmedoids.fit_ids(&cached, &sample, &mut rng)?;
        cached.report();

        let mut assignment = vec![0; n];
        let mut sampled = vec![false; n];
        for (&id, &slot) in sample.iter().zip(&run.assignment) {
            assignment[id] = slot;
            sampled[id] = true;
        }

        let mut score = run.cost;
        for id in (0..n).filter(|&id| !sampled[id]) {
            let (slot, dist) = nearest_medoid(d, &medoids, id)?;
            assignment[id] = slot;
            score = score + dist;
        }

        debug!(
            sample_cost = ?run.cost,
            score = ?score,
            swaps = run.swaps,
            "trial complete"
        );

        Ok(Trial {
            medoids,
            assignment,
            score,
            run,
        })
    }
}

/// `size` points in ascending order; `prior` medoids are always included.
fn draw_sample<R: Rng + ?Sized>(
    n: usize,
    size: usize,
    prior: Option<&[PointId]>,
    rng: &mut R,
) -> Vec<PointId> {
    let prior = match prior {
        Some(prior) => prior,
        None => return sample_indices(n, size, rng),
    };

    let mut is_prior = vec![false; n];
    for &id in prior {
        is_prior[id] = true;
    }
    let rest: Vec<PointId> = (0..n).filter(|&id| !is_prior[id]).collect();

    let mut sample: Vec<PointId> = sample_indices(rest.len(), size.saturating_sub(prior.len()), rng)
        .into_iter()
        .map(|i| rest[i])
        .chain(prior.iter().copied())
        .collect();
    sample.sort_unstable();
    sample
}

fn nearest_medoid<T: Float, M: Measurable<T>>(
    d: &M,
    medoids: &MedoidSet,
    id: PointId,
) -> Result<(Slot, T)> {
    let mut best = None;
    let mut min_distance = T::infinity();

    for (slot, &medoid) in medoids.as_slice().iter().enumerate() {
        let dist = d.measure(id, medoid);
        if dist < min_distance {
            min_distance = dist;
            best = Some(slot);
        }
    }

    match best {
        Some(slot) => Ok((slot, min_distance)),
        None => Err(Error::InfiniteDistances { point: id }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::matrix::DissimilarityMatrix;

    fn blobs(per_blob: usize, seed: u64) -> DissimilarityMatrix<f64> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let centers = [(0.0, 0.0), (20.0, 0.0), (0.0, 20.0)];
        let points: Vec<(f64, f64)> = centers
            .iter()
            .flat_map(|&(cx, cy)| {
                (0..per_blob)
                    .map(|_| (cx + rng.gen_range(-2.0..2.0), cy + rng.gen_range(-2.0..2.0)))
                    .collect::<Vec<_>>()
            })
            .collect();
        DissimilarityMatrix::from_points(&points, |a: &(f64, f64), b: &(f64, f64)| {
            ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
        })
        .with_metric(true)
    }

    fn total_cost(d: &DissimilarityMatrix<f64>, medoids: &[PointId]) -> f64 {
        (0..d.num_elements())
            .map(|i| {
                medoids
                    .iter()
                    .map(|&m| d.measure(i, m))
                    .fold(f64::INFINITY, f64::min)
            })
            .sum()
    }

    #[test]
    fn zero_samples_is_an_error() {
        let clara = Clara::new(KMedoids::new(2).unwrap());
        assert_eq!(
            clara.with_samples(0).err(),
            Some(Error::InvalidSampleCount { samples: 0 })
        );
    }

    #[test]
    fn invalid_sample_sizes_are_errors() {
        let clara = || Clara::new(KMedoids::new(2).unwrap());
        assert!(clara().with_sample_size(SampleSize::Absolute(0)).is_err());
        assert!(clara().with_sample_size(SampleSize::Fraction(0.0)).is_err());
        assert!(clara().with_sample_size(SampleSize::Fraction(f64::NAN)).is_err());
        assert!(clara().with_sample_size(SampleSize::from(0.25)).is_ok());
    }

    #[test]
    fn sample_size_resolution() {
        assert_eq!(SampleSize::from(0.5), SampleSize::Fraction(0.5));
        assert_eq!(SampleSize::from(30.0), SampleSize::Absolute(30));
        assert_eq!(SampleSize::from(30.9), SampleSize::Absolute(30));
        assert_eq!(SampleSize::from(1.0), SampleSize::Fraction(1.0));

        let clara = Clara::new(KMedoids::new(3).unwrap());
        assert_eq!(clara.sample_size(1000), 46);
        assert_eq!(clara.sample_size(20), 20);

        let clara = clara.with_sample_size(SampleSize::Fraction(0.1)).unwrap();
        assert_eq!(clara.sample_size(1000), 100);
        assert_eq!(clara.sample_size(10), 3);
    }

    #[test]
    fn draw_sample_keeps_prior_medoids() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let sample = draw_sample(100, 10, Some(&[97, 5, 42]), &mut rng);

        assert_eq!(sample.len(), 10);
        assert!(sample.windows(2).all(|w| w[0] < w[1]));
        for id in [97, 5, 42] {
            assert!(sample.contains(&id));
        }
    }

    #[test]
    fn full_sample_matches_direct_run() {
        let d = blobs(10, 1);
        let kmedoids = KMedoids::new(3)
            .unwrap()
            .with_strategy(Strategy::fast_pam1());
        let direct = kmedoids.fit(&d).unwrap();

        let sampled = Clara::new(kmedoids)
            .with_samples(1)
            .unwrap()
            .with_sample_size(SampleSize::Absolute(1000))
            .unwrap()
            .fit(&d)
            .unwrap();

        assert_eq!(sampled.medoids, direct.medoids);
        assert_eq!(sampled.assignment, direct.assignment);
        assert!((sampled.cost - direct.cost).abs() < 1e-9);
        assert_eq!(sampled.trial_scores.len(), 1);
    }

    #[test]
    fn best_trial_is_kept_and_scored_on_all_points() {
        let d = blobs(30, 2);
        let result = Clara::new(KMedoids::new(3).unwrap().with_seed(11))
            .with_samples(4)
            .unwrap()
            .with_sample_size(SampleSize::Absolute(20))
            .unwrap()
            .fit(&d)
            .unwrap();

        assert_eq!(result.trial_scores.len(), 4);
        let min = result
            .trial_scores
            .iter()
            .cloned()
            .fold(f64::INFINITY, f64::min);
        assert_eq!(result.cost, min);
        assert!((result.cost - total_cost(&d, &result.medoids)).abs() < 1e-9);
        assert_eq!(result.assignment.len(), 90);
    }

    #[test]
    fn parallel_and_sequential_trials_agree() {
        let d = blobs(20, 5);
        let clara = Clara::new(KMedoids::new(3).unwrap().with_initializer(Init::Random))
            .with_samples(6)
            .unwrap()
            .with_sample_size(SampleSize::Fraction(0.3))
            .unwrap();

        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let parallel = clara.clone().parallel(true).fit_with_rng(&d, &mut rng).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let sequential = clara.parallel(false).fit_with_rng(&d, &mut rng).unwrap();

        assert_eq!(parallel.trial_scores, sequential.trial_scores);
        assert_eq!(parallel.medoids, sequential.medoids);
    }

    #[test]
    fn kept_medoids_carry_into_every_following_sample() {
        // With k equal to the sample size the medoids are the whole sample,
        // so keeping them pins every later sample to the first one
        let d = blobs(20, 8);
        let run = |keep: bool| {
            Clara::new(KMedoids::new(3).unwrap())
                .with_samples(4)
                .unwrap()
                .with_sample_size(SampleSize::Absolute(3))
                .unwrap()
                .keep_medoids(keep)
                .fit(&d)
                .unwrap()
        };

        let kept = run(true);
        assert_eq!(kept.trial_scores.len(), 4);
        assert!(kept.trial_scores.iter().all(|&s| s == kept.trial_scores[0]));

        let fresh = run(false);
        assert!(fresh.trial_scores.iter().any(|&s| s != fresh.trial_scores[0]));
    }

    #[test]
    fn initializer_outside_the_sample_still_clusters() {
        let d = blobs(10, 3);
        let kmedoids = KMedoids::new(2)
            .unwrap()
            .with_initializer(Fixed(vec![0, 29]));

        // Neither fixed medoid is part of this subsample
        let sample: Vec<PointId> = (5..15).collect();
        let cached = CachedMeasure::new(&d, &sample);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let (_, run) = kmedoids.fit_ids(&cached, &sample, &mut rng).unwrap();
        assert!(cached.foreign_queries() > 0);
        assert_eq!(run.assignment.len(), sample.len());

        let result = Clara::new(kmedoids)
            .with_samples(3)
            .unwrap()
            .with_sample_size(SampleSize::Absolute(8))
            .unwrap()
            .fit(&d)
            .unwrap();
        assert_eq!(result.assignment.len(), 30);
        assert!((result.cost - total_cost(&d, &result.medoids)).abs() < 1e-9);
    }
}
