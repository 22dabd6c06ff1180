//! Embedding vectors and the cosine distance convention.

use std::ops::Deref;

use crate::EmbedError;

/// A fixed-length embedding vector.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Embedding(Vec<f32>);

impl Embedding {
    /// Wraps raw components.
    #[must_use]
    pub const fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    /// Returns the all-zero vector of the given dimension.
    #[must_use]
    pub fn zeros(dimension: usize) -> Self {
        Self(vec![0.0; dimension])
    }

    /// Returns the number of components.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.0.len()
    }

    /// Returns the components.
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Consumes the embedding and returns its components.
    #[must_use]
    pub fn into_inner(self) -> Vec<f32> {
        self.0
    }

    /// Euclidean norm, accumulated in `f64`.
    #[must_use]
    pub fn norm(&self) -> f64 {
        self.0
            .iter()
            .map(|&v| f64::from(v) * f64::from(v))
            .sum::<f64>()
            .sqrt()
    }

    /// Returns true if every component is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&v| v == 0.0)
    }

    /// Returns true if no component is NaN or infinite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }
}

impl Deref for Embedding {
    type Target = [f32];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<f32>> for Embedding {
    fn from(values: Vec<f32>) -> Self {
        Self(values)
    }
}

/// Cosine distance under the crate-wide convention.
///
/// `clamp(1 - cos(a, b), 0, 1)`: opposite and orthogonal vectors are both
/// maximally distant. A zero vector has no direction, so two zero vectors
/// are at distance 0 and a zero vector is at distance 1 from anything else.
///
/// # Errors
///
/// Returns `EmbedError::DimensionMismatch` if the vectors differ in length.
///
/// # Examples
///
/// ```
/// use text_tree_embed::{cosine_distance, Embedding};
///
/// let a = Embedding::new(vec![1.0, 0.0]);
/// let b = Embedding::new(vec![0.0, 1.0]);
/// assert!((cosine_distance(&a, &b).unwrap() - 1.0).abs() < 1e-12);
/// assert!(cosine_distance(&a, &a).unwrap().abs() < 1e-12);
/// ```
pub fn cosine_distance(a: &Embedding, b: &Embedding) -> Result<f64, EmbedError> {
    if a.dimension() != b.dimension() {
        return Err(EmbedError::DimensionMismatch {
            expected: a.dimension(),
            found: b.dimension(),
        });
    }
    let (norm_a, norm_b) = (a.norm(), b.norm());
    match (norm_a == 0.0, norm_b == 0.0) {
        (true, true) => return Ok(0.0),
        (true, false) | (false, true) => return Ok(1.0),
        (false, false) => {}
    }
    let dot: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(&x, &y)| f64::from(x) * f64::from(y))
        .sum();
    Ok((1.0 - dot / (norm_a * norm_b)).clamp(0.0, 1.0))
}
