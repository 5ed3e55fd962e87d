use crate::dimension::Neighbor;
use crate::oracle::EPSILON;

/// Merge two result lists sorted by distance into one, keeping the first `n` distinct elements.
///
/// Stops once `n` elements are taken or both lists are exhausted. An element equal to one
/// already taken is skipped, so a location found from both sides of the seam appears once.
/// Equal elements are at the same distance up to rounding, so only the taken results within
/// [`EPSILON`] of a candidate's distance are compared against it.
pub fn merge_nearest<'a, T: PartialEq>(
    l1: Vec<Neighbor<'a, T>>,
    l2: Vec<Neighbor<'a, T>>,
    n: usize,
) -> Vec<Neighbor<'a, T>> {
    let mut merged = Vec::with_capacity(n.min(l1.len() + l2.len()));
    let mut a = l1.into_iter().peekable();
    let mut b = l2.into_iter().peekable();

    while merged.len() < n {
        let take_b = match (a.peek(), b.peek()) {
            (Some(x), Some(y)) => y.distance < x.distance,
            (Some(_), None) => false,
            (None, Some(_)) => true,
            (None, None) => break,
        };
        let next = if take_b { b.next() } else { a.next() };
        if let Some(next) = next {
            if !already_taken(&merged, &next) {
                merged.push(next);
            }
        }
    }
    merged
}

/// Whether `merged`, sorted by distance, ends with an element equal to `next` at about the same
/// distance.
fn already_taken<T: PartialEq>(merged: &[Neighbor<'_, T>], next: &Neighbor<'_, T>) -> bool {
    merged
        .iter()
        .rev()
        .take_while(|taken| taken.distance >= next.distance - EPSILON)
        .any(|taken| taken.element == next.element)
}

/// Merge two result lists sorted by distance, keeping every distinct element.
pub fn merge_all<'a, T: PartialEq>(
    l1: Vec<Neighbor<'a, T>>,
    l2: Vec<Neighbor<'a, T>>,
) -> Vec<Neighbor<'a, T>> {
    merge_nearest(l1, l2, usize::MAX)
}
