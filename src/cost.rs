//! Edit-operation cost models.

use std::sync::Arc;

use crate::error::{CostError, CostOperation};

/// Supplies the cost of each tree edit operation.
///
/// The distance engine depends only on this interface, so semantic,
/// lexical and unit-cost scoring are interchangeable.
///
/// # Contract
///
/// - Every cost is finite and non-negative.
/// - `relabel(t, t) == 0` for identical text.
/// - `relabel(a, b) <= insert(b) + delete(a)`; otherwise the optimal
///   alignment never relabels and the model degenerates.
///
/// The engine checks the first condition and fails with
/// `DistanceError::InvalidCost`; the others are the implementor's duty.
pub trait CostModel: Send + Sync {
    /// Cost of turning a node with text `from` into one with text `to`.
    ///
    /// # Errors
    ///
    /// Returns `CostError` if the cost cannot be computed.
    fn relabel(&self, from: &str, to: &str) -> Result<f64, CostError>;

    /// Cost of inserting a node with text `text`.
    ///
    /// # Errors
    ///
    /// Returns `CostError` if the cost cannot be computed.
    fn insert(&self, text: &str) -> Result<f64, CostError>;

    /// Cost of deleting a node with text `text`.
    ///
    /// # Errors
    ///
    /// Returns `CostError` if the cost cannot be computed.
    fn delete(&self, text: &str) -> Result<f64, CostError>;

    /// Receives every node text of a tree pair before any cost is asked for.
    ///
    /// Models backed by a remote service batch their lookups here. The
    /// default does nothing.
    ///
    /// # Errors
    ///
    /// Returns `CostError` if the lookups fail.
    fn prepare(&self, _texts: &[&str]) -> Result<(), CostError> {
        Ok(())
    }
}

impl<C: CostModel + ?Sized> CostModel for &C {
    fn relabel(&self, from: &str, to: &str) -> Result<f64, CostError> {
        (**self).relabel(from, to)
    }

    fn insert(&self, text: &str) -> Result<f64, CostError> {
        (**self).insert(text)
    }

    fn delete(&self, text: &str) -> Result<f64, CostError> {
        (**self).delete(text)
    }

    fn prepare(&self, texts: &[&str]) -> Result<(), CostError> {
        (**self).prepare(texts)
    }
}

impl<C: CostModel + ?Sized> CostModel for Arc<C> {
    fn relabel(&self, from: &str, to: &str) -> Result<f64, CostError> {
        (**self).relabel(from, to)
    }

    fn insert(&self, text: &str) -> Result<f64, CostError> {
        (**self).insert(text)
    }

    fn delete(&self, text: &str) -> Result<f64, CostError> {
        (**self).delete(text)
    }

    fn prepare(&self, texts: &[&str]) -> Result<(), CostError> {
        (**self).prepare(texts)
    }
}

impl<C: CostModel + ?Sized> CostModel for Box<C> {
    fn relabel(&self, from: &str, to: &str) -> Result<f64, CostError> {
        (**self).relabel(from, to)
    }

    fn insert(&self, text: &str) -> Result<f64, CostError> {
        (**self).insert(text)
    }

    fn delete(&self, text: &str) -> Result<f64, CostError> {
        (**self).delete(text)
    }

    fn prepare(&self, texts: &[&str]) -> Result<(), CostError> {
        (**self).prepare(texts)
    }
}

/// Exact-match unit costs: the structural baseline.
///
/// Relabel costs 0 for identical text and 1 otherwise; insert and delete
/// cost 1. With this model the engine computes the classical
/// label-equality tree edit distance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnitCost;

impl CostModel for UnitCost {
    fn relabel(&self, from: &str, to: &str) -> Result<f64, CostError> {
        Ok(if from == to { 0.0 } else { 1.0 })
    }

    fn insert(&self, _text: &str) -> Result<f64, CostError> {
        Ok(1.0)
    }

    fn delete(&self, _text: &str) -> Result<f64, CostError> {
        Ok(1.0)
    }
}

/// Checks that a cost is finite and non-negative.
///
/// # Errors
///
/// Returns `CostError::InvalidCost` otherwise.
pub fn validate_cost(operation: CostOperation, value: f64) -> Result<f64, CostError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(CostError::InvalidCost { operation, value })
    }
}
