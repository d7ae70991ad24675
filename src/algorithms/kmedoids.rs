use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{info, instrument};

use super::*;

/// k-medoids clustering: an initializer followed by a swap strategy.
#[derive(Debug, Clone)]
pub struct KMedoids<I = Init> {
    pub(crate) k: usize,
    pub(crate) max_iter: usize,
    pub(crate) strategy: Strategy,
    pub(crate) initializer: I,
    pub(crate) seed: u64,
}

impl KMedoids<Init> {
    pub fn new(k: usize) -> Result<Self> {
        if k == 0 {
            return Err(Error::InvalidK { k });
        }
        Ok(Self {
            k,
            max_iter: 0,
            strategy: Strategy::default(),
            initializer: Init::default(),
            seed: 0,
        })
    }
}

impl<I> KMedoids<I> {
    /// Maximum number of iterations, 0 for no limit.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_initializer<J: Initializer>(self, initializer: J) -> KMedoids<J> {
        KMedoids {
            k: self.k,
            max_iter: self.max_iter,
            strategy: self.strategy,
            initializer,
            seed: self.seed,
        }
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }
}

impl<I: Initializer> KMedoids<I> {
    /// Cluster all points of `d`, seeded from the configured seed.
    pub fn fit<T: Float, M: Measurable<T>>(&self, d: &M) -> Result<Clustering<T>> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        self.fit_with_rng(d, &mut rng)
    }

    /// Cluster all points of `d`, drawing randomness from `rng`.
    #[instrument(skip_all, fields(k = self.k, n = d.num_elements(), strategy = self.strategy.name()))]
    pub fn fit_with_rng<T, M, R>(&self, d: &M, rng: &mut R) -> Result<Clustering<T>>
    where
        T: Float,
        M: Measurable<T>,
        R: Rng + ?Sized,
    {
        let ids: Vec<PointId> = (0..d.num_elements()).collect();
        let (medoids, run) = self.fit_ids(d, &ids, rng)?;

        info!(
            cost = ?run.cost,
            iterations = run.iterations,
            swaps = run.swaps,
            "k-medoids complete"
        );

        Ok(Clustering {
            medoids: medoids.into_vec(),
            cost: run.cost,
            assignment: run.assignment,
            iterations: run.iterations,
            swaps: run.swaps,
            cost_history: run.cost_history,
            trial_scores: Vec::new(),
        })
    }

    /// Initialize and optimize the medoids of a subset of the points.
    pub(crate) fn fit_ids<T, M, R>(
        &self,
        d: &M,
        ids: &[PointId],
        rng: &mut R,
    ) -> Result<(MedoidSet, Run<T>)>
    where
        T: Float,
        M: Measurable<T>,
        R: Rng + ?Sized,
    {
        if self.k > ids.len() {
            return Err(Error::TooFewPoints {
                k: self.k,
                n: ids.len(),
            });
        }

        superluminal_perf::begin_event("INIT");
        let initial = self
            .initializer
            .choose_initial_medoids(self.k, ids, d, rng);
        superluminal_perf::end_event();
        let mut medoids = MedoidSet::new(self.k, initial)?;

        let n = d.num_elements();
        if let Some(&id) = medoids.as_slice().iter().find(|&&id| id >= n) {
            return Err(Error::MedoidOutOfRange { id, n });
        }

        superluminal_perf::begin_event("SWAP");
        let run = self
            .strategy
            .optimize(d, ids, &mut medoids, self.max_iter);
        superluminal_perf::end_event();

        Ok((medoids, run?))
    }
}

/// Result of a clustering.
#[derive(Debug, Clone)]
pub struct Clustering<T> {
    /// Medoid of each slot.
    pub medoids: Vec<PointId>,
    pub cost: T,
    /// Slot of every point, indexed by [`PointId`].
    pub assignment: Vec<Slot>,
    pub iterations: usize,
    pub swaps: usize,
    /// Cost after initialization and after every iteration. For sampled runs
    /// these are costs on the best sample.
    pub cost_history: Vec<T>,
    /// Full-input cost of every sampling trial, in order. Empty unless
    /// produced by [`Clara`].
    pub trial_scores: Vec<T>,
}

/// The points assigned to one medoid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    pub medoid: PointId,
    pub members: Vec<PointId>,
}

impl<T> Clustering<T> {
    pub fn slot_of(&self, id: PointId) -> Option<Slot> {
        self.assignment.get(id).copied()
    }

    pub fn clusters(&self) -> Vec<Cluster> {
        let mut clusters: Vec<Cluster> = self
            .medoids
            .iter()
            .map(|&medoid| Cluster {
                medoid,
                members: Vec::new(),
            })
            .collect();

        for (id, &slot) in self.assignment.iter().enumerate() {
            clusters[slot].members.push(id);
        }

        clusters
    }
}
