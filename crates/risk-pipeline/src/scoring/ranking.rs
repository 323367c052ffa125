//! Dense ranking and top-N selection over the composite score.
//!
//! Order: higher scores first, and a missing score is lower than any real
//! number. Scores never hold NaN (the scorer maps undefined arithmetic to
//! `None`), so `partial_cmp` is total here and ties are exact equality.

use std::cmp::Ordering;

/// Descending order with missing values last.
fn descending(a: &Option<f64>, b: &Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.partial_cmp(x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Dense rank of every score, highest score = 1.
///
/// Equal scores share a rank and the next distinct score gets the next
/// integer. All missing scores share the rank after the lowest real one.
pub fn dense_rank(scores: &[Option<f64>]) -> Vec<u32> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| descending(&scores[a], &scores[b]));

    let mut ranks = vec![0u32; scores.len()];
    let mut current = 0u32;
    let mut previous: Option<Option<f64>> = None;

    for idx in order {
        let value = scores[idx];
        let changed = match previous {
            Some(prev) => descending(&prev, &value) != Ordering::Equal,
            None => true,
        };
        if changed {
            current += 1;
            previous = Some(value);
        }
        ranks[idx] = current;
    }

    ranks
}

/// Row indices of the `n` highest present scores.
///
/// Ties keep their original row order. Rows with a missing score are never
/// selected, so fewer than `n` indices come back when fewer scores exist.
pub fn top_n_indices(scores: &[Option<f64>], n: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len())
        .filter(|&i| scores[i].is_some())
        .collect();
    // sort_by is stable
    order.sort_by(|&a, &b| descending(&scores[a], &scores[b]));
    order.truncate(n);
    order
}
