use ndarray::{Array1, ArrayView1};
use ragstore_common::{RagStoreError, Result};

/// Cosine similarity between two vectors of equal length
///
/// Fails with `DegenerateVector` when either vector has zero norm and with
/// `DimensionMismatch` when the lengths differ. The result is clamped to
/// [-1.0, 1.0] to absorb rounding.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> Result<f64> {
    if a.len() != b.len() {
        return Err(RagStoreError::dimension_mismatch(a.len(), b.len()));
    }

    let a = ArrayView1::from(a);
    let b = ArrayView1::from(b);

    let norm_a = a.dot(&a).sqrt();
    let norm_b = b.dot(&b).sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return Err(RagStoreError::degenerate_vector(
            "cosine similarity is undefined for a zero-norm vector",
        ));
    }

    Ok((a.dot(&b) / (norm_a * norm_b)).clamp(-1.0, 1.0))
}

/// Coordinate-wise mean of equal-length vectors
///
/// Returns `None` for an empty input.
pub fn mean_vector<'a, I>(vectors: I) -> Option<Vec<f64>>
where
    I: IntoIterator<Item = &'a [f64]>,
{
    let mut iter = vectors.into_iter();
    let first = iter.next()?;
    let mut sum = Array1::from(first.to_vec());
    let mut count = 1.0;

    for vector in iter {
        sum += &ArrayView1::from(vector);
        count += 1.0;
    }

    Some((sum / count).to_vec())
}
