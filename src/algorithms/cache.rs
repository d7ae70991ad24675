//! Nearest / second-nearest medoid bookkeeping shared by every swap strategy.

use crate::error::{Error, Result};
use crate::measure::Measurable;
use crate::{Float, PointId, Slot};

/// The current medoids, one point per slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MedoidSet {
    ids: Vec<PointId>,
}

impl MedoidSet {
    /// Validates the output of an initializer: exactly `k` distinct points.
    pub fn new(k: usize, ids: Vec<PointId>) -> Result<Self> {
        if ids.len() != k {
            return Err(Error::InitializerCount {
                expected: k,
                got: ids.len(),
            });
        }
        for (i, &id) in ids.iter().enumerate() {
            if ids[..i].contains(&id) {
                return Err(Error::DuplicateMedoid { id });
            }
        }
        Ok(Self { ids })
    }

    #[inline]
    pub fn get(&self, slot: Slot) -> PointId {
        self.ids[slot]
    }

    /// Puts `id` into `slot` and returns the medoid it replaced.
    pub fn replace(&mut self, slot: Slot, id: PointId) -> PointId {
        std::mem::replace(&mut self.ids[slot], id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn as_slice(&self) -> &[PointId] {
        &self.ids
    }

    pub fn into_vec(self) -> Vec<PointId> {
        self.ids
    }
}

/// Nearest and second nearest medoid of one point.
///
/// `second_slot` is `None` only when there is a single medoid, in which case
/// `second` is infinite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Assignment<T> {
    pub nearest_slot: Slot,
    pub second_slot: Option<Slot>,
    pub nearest: T,
    pub second: T,
}

impl<T: Float> Assignment<T> {
    fn empty() -> Self {
        Self {
            nearest_slot: 0,
            second_slot: None,
            nearest: T::infinity(),
            second: T::infinity(),
        }
    }
}

/// One [`Assignment`] per point, in the order of the ids being clustered.
#[derive(Debug, Clone)]
pub struct AssignmentCache<T> {
    records: Vec<Assignment<T>>,
}

impl<T: Float> AssignmentCache<T> {
    pub fn new(n: usize) -> Self {
        Self {
            records: vec![Assignment::empty(); n],
        }
    }

    #[inline]
    pub fn get(&self, pos: usize) -> &Assignment<T> {
        &self.records[pos]
    }

    pub fn records(&self) -> &[Assignment<T>] {
        &self.records
    }

    pub fn cost(&self) -> T {
        self.records
            .iter()
            .fold(T::zero(), |acc, rec| acc + rec.nearest)
    }

    /// Slot of the nearest medoid for every point.
    pub fn labels(&self) -> Vec<Slot> {
        self.records.iter().map(|rec| rec.nearest_slot).collect()
    }

    /// Assigns every point to its nearest and second nearest medoid.
    ///
    /// Ties go to the first slot, except that a medoid always claims its own
    /// slot. Returns the total cost.
    pub fn reassign_all<M: Measurable<T>>(
        &mut self,
        d: &M,
        ids: &[PointId],
        medoids: &MedoidSet,
    ) -> Result<T> {
        let mut cost = T::zero();

        for (rec, &id) in self.records.iter_mut().zip(ids) {
            let mut nearest = None;
            let mut best = T::infinity();
            let mut second_slot = None;
            let mut second = T::infinity();

            for (slot, &medoid) in medoids.as_slice().iter().enumerate() {
                let dist = d.measure(id, medoid);
                if dist < best || (medoid == id && dist <= best) {
                    if nearest.is_some() {
                        second_slot = nearest;
                        second = best;
                    }
                    nearest = Some(slot);
                    best = dist;
                } else if dist < second || (second_slot.is_none() && nearest.is_some()) {
                    second_slot = Some(slot);
                    second = dist;
                }
            }

            let nearest_slot = match nearest {
                Some(slot) => slot,
                None => return Err(Error::InfiniteDistances { point: id }),
            };

            *rec = Assignment {
                nearest_slot,
                second_slot,
                nearest: best,
                second,
            };
            cost = cost + best;
        }

        Ok(cost)
    }

    /// Patches the records after the point at `pos` became the medoid of
    /// `slot`. `medoids` must already contain the new medoid.
    ///
    /// Only points whose nearest or second nearest medoid was in `slot`, or
    /// that are closer to the new medoid than to their second nearest, change.
    /// Returns the new total cost.
    pub fn apply_swap<M: Measurable<T>>(
        &mut self,
        d: &M,
        ids: &[PointId],
        medoids: &MedoidSet,
        slot: Slot,
        pos: usize,
    ) -> T {
        let medoid = ids[pos];
        let mut cost = T::zero();

        for (o, (rec, &id)) in self.records.iter_mut().zip(ids).enumerate() {
            if o == pos {
                if rec.nearest_slot != slot {
                    rec.second_slot = Some(rec.nearest_slot);
                    rec.second = rec.nearest;
                }
                rec.nearest_slot = slot;
                rec.nearest = T::zero();
                continue;
            }

            let dist = d.measure(medoid, id);
            if rec.nearest_slot == slot {
                if dist <= rec.second {
                    rec.nearest = dist;
                } else if let Some(second_slot) = rec.second_slot {
                    rec.nearest_slot = second_slot;
                    rec.nearest = rec.second;
                    let (s, sd) = second_nearest(d, medoids, id, second_slot, slot, dist);
                    rec.second_slot = Some(s);
                    rec.second = sd;
                }
            } else if dist < rec.nearest {
                rec.second_slot = Some(rec.nearest_slot);
                rec.second = rec.nearest;
                rec.nearest_slot = slot;
                rec.nearest = dist;
            } else if dist < rec.second {
                rec.second_slot = Some(slot);
                rec.second = dist;
            } else if rec.second_slot == Some(slot) {
                let (s, sd) = second_nearest(d, medoids, id, rec.nearest_slot, slot, dist);
                rec.second_slot = Some(s);
                rec.second = sd;
            }
            cost = cost + rec.nearest;
        }

        cost
    }

    /// Per slot, the cost increase of removing that medoid without a
    /// replacement: every assigned point falls back to its second nearest.
    pub fn removal_loss(&self, loss: &mut [T]) {
        loss.iter_mut().for_each(|l| *l = T::zero());
        for rec in &self.records {
            loss[rec.nearest_slot] = loss[rec.nearest_slot] + rec.second - rec.nearest;
        }
    }
}

/// Second nearest medoid of `id`, excluding `nearest`. The new medoid in
/// `replaced` is known to be at `dist`.
fn second_nearest<T: Float, M: Measurable<T>>(
    d: &M,
    medoids: &MedoidSet,
    id: PointId,
    nearest: Slot,
    replaced: Slot,
    dist: T,
) -> (Slot, T) {
    let mut best = (replaced, dist);
    for (slot, &medoid) in medoids.as_slice().iter().enumerate() {
        if slot == nearest || slot == replaced {
            continue;
        }
        let dist = d.measure(id, medoid);
        if dist < best.1 {
            best = (slot, dist);
        }
    }
    best
}
