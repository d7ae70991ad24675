use rand::Rng;

/// Returns the index and value of the first minimum element, ignoring NaN.
pub fn argmin<T: PartialOrd + Copy>(xs: &[T]) -> Option<(usize, T)> {
    let mut best: Option<(usize, T)> = None;
    for (i, &x) in xs.iter().enumerate() {
        if x.partial_cmp(&x).is_none() {
            continue;
        }
        match best {
            Some((_, b)) if x >= b => {}
            _ => best = Some((i, x)),
        }
    }
    best
}

/// Draws `size` distinct indices from `0..n`, returned in ascending order.
pub fn sample_indices<R: Rng + ?Sized>(n: usize, size: usize, rng: &mut R) -> Vec<usize> {
    let mut indices = rand::seq::index::sample(rng, n, size.min(n)).into_vec();
    indices.sort_unstable();
    indices
}
