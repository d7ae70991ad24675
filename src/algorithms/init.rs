//! Choice of the starting medoids.

use rand::Rng;

use crate::measure::Measurable;
use crate::{Float, PointId};

pub trait Initializer {
    /// Choose `k` distinct medoids among `ids`.
    ///
    /// The count is validated by the caller; returning anything other than
    /// `k` points is a configuration error.
    fn choose_initial_medoids<T: Float, M: Measurable<T>, R: Rng + ?Sized>(
        &self,
        k: usize,
        ids: &[PointId],
        d: &M,
        rng: &mut R,
    ) -> Vec<PointId>;
}

/// Greedy PAM BUILD: repeatedly add the point that reduces the total cost
/// the most.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Build;

impl Initializer for Build {
    fn choose_initial_medoids<T: Float, M: Measurable<T>, R: Rng + ?Sized>(
        &self,
        k: usize,
        ids: &[PointId],
        d: &M,
        _rng: &mut R,
    ) -> Vec<PointId> {
        let num_elements = ids.len();
        let mut medoid_indices = Vec::with_capacity(k);
        let mut best_distances = vec![T::infinity(); num_elements];
        let mut chosen = vec![false; num_elements];

        for _ in 0..k.min(num_elements) {
            let mut min_total = T::infinity();
            let mut best = None;

            for (i, &candidate) in ids.iter().enumerate() {
                if chosen[i] {
                    continue;
                }

                let mut total = T::zero();
                for (j, &other) in ids.iter().enumerate() {
                    total = total + d.measure(candidate, other).min(best_distances[j]);
                }

                if best.is_none() || total < min_total {
                    min_total = total;
                    best = Some(i);
                }
            }

            let i = match best {
                Some(i) => i,
                None => break,
            };
            chosen[i] = true;
            medoid_indices.push(ids[i]);

            for (j, &other) in ids.iter().enumerate() {
                let cost = d.measure(ids[i], other);
                if cost < best_distances[j] {
                    best_distances[j] = cost;
                }
            }
        }

        medoid_indices
    }
}

/// `k` distinct points drawn uniformly at random.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RandomInit;

impl Initializer for RandomInit {
    fn choose_initial_medoids<T: Float, M: Measurable<T>, R: Rng + ?Sized>(
        &self,
        k: usize,
        ids: &[PointId],
        _d: &M,
        rng: &mut R,
    ) -> Vec<PointId> {
        rand::seq::index::sample(rng, ids.len(), k.min(ids.len()))
            .into_iter()
            .map(|i| ids[i])
            .collect()
    }
}

/// Caller-provided medoids, returned as given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixed(pub Vec<PointId>);

impl Initializer for Fixed {
    fn choose_initial_medoids<T: Float, M: Measurable<T>, R: Rng + ?Sized>(
        &self,
        _k: usize,
        _ids: &[PointId],
        _d: &M,
        _rng: &mut R,
    ) -> Vec<PointId> {
        self.0.clone()
    }
}

/// Built-in initializers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Init {
    #[default]
    Build,
    Random,
}

impl Initializer for Init {
    fn choose_initial_medoids<T: Float, M: Measurable<T>, R: Rng + ?Sized>(
        &self,
        k: usize,
        ids: &[PointId],
        d: &M,
        rng: &mut R,
    ) -> Vec<PointId> {
        match self {
            Init::Build => Build.choose_initial_medoids(k, ids, d, rng),
            Init::Random => RandomInit.choose_initial_medoids(k, ids, d, rng),
        }
    }
}
