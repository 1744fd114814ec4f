//! Pairwise vector similarity and distance
//!
//! Both functions accumulate in `f64` regardless of the `f32` input, and
//! compare only the overlapping prefix when lengths differ. Callers are
//! expected to validate dimensions beforehand.

/// Cosine similarity: `dot(a, b) / (|a| * |b|)`.
///
/// Returns exactly `0.0` when either vector has zero norm. That value is a
/// sentinel for "undefined" and is indistinguishable from a genuine
/// orthogonal pair; callers that care must check the norms themselves.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (&x, &y) in a.iter().zip(b.iter()) {
        let (x, y) = (x as f64, y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a <= 0.0 || norm_b <= 0.0 {
        return 0.0;
    }

    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Euclidean (L2) distance between two vectors. Always `>= 0`.
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| {
            let d = x as f64 - y as f64;
            d * d
        })
        .sum::<f64>()
        .sqrt()
}
