//! Vector math shared by embedding generation and similarity scoring.

/// Compute the L2 (Euclidean) norm of a vector.
pub fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Rescale a vector to unit length.
///
/// The zero vector is returned unchanged: normalization never divides by
/// zero. Idempotent within floating-point tolerance.
pub fn l2_normalize(mut v: Vec<f32>) -> Vec<f32> {
    let norm = l2_norm(&v);
    if norm > f32::EPSILON {
        for x in &mut v {
            *x /= norm;
        }
    }
    v
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 when the vectors differ in length or either has zero norm.
/// Both conditions are sentinels rather than errors: a similarity query
/// must never abort a ranking pass.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let norm_a = l2_norm(a);
    let norm_b = l2_norm(b);
    if norm_a < f32::EPSILON || norm_b < f32::EPSILON {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    dot_product / (norm_a * norm_b)
}
