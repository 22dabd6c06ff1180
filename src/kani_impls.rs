//! Kani proof harnesses for the score normalizer.
//!
//! # Usage
//!
//! Kani is not a Cargo dependency. Install and run with:
//!
//! ```bash
//! cargo install --locked kani-verifier
//! cargo kani setup
//! cargo kani --features kani
//! ```
//!
//! This module is only compiled when using Kani (`#[cfg(kani)]`).

use crate::{IndelBounds, Normalization};

/// Bounds as the engine produces them: finite, non-negative, with the
/// raw distance never above the cost of deleting and reinserting everything.
fn arbitrary_case() -> (f64, IndelBounds) {
    let nodes: usize = kani::any();
    kani::assume(nodes <= 64);
    let max_weight: f64 = kani::any();
    kani::assume(max_weight.is_finite() && (0.0..=1e6).contains(&max_weight));
    let total: f64 = kani::any();
    #[allow(clippy::cast_precision_loss)]
    let ceiling = max_weight * nodes as f64;
    kani::assume(total.is_finite() && total >= 0.0 && total <= ceiling);
    let raw: f64 = kani::any();
    kani::assume(raw.is_finite() && raw >= 0.0 && raw <= total);
    (
        raw,
        IndelBounds {
            total,
            max_weight,
            nodes,
        },
    )
}

fn arbitrary_bounded_mode() -> Normalization {
    if kani::any() {
        Normalization::MaxCost
    } else {
        Normalization::Harmonic
    }
}

#[kani::proof]
fn bounded_modes_stay_in_unit_interval() {
    let (raw, bounds) = arbitrary_case();
    let score = arbitrary_bounded_mode().apply(raw, &bounds);
    assert!((0.0..=1.0).contains(&score));
}

#[kani::proof]
fn zero_distance_scores_zero() {
    let (_, bounds) = arbitrary_case();
    let score = arbitrary_bounded_mode().apply(0.0, &bounds);
    assert!(score == 0.0);
}

#[kani::proof]
fn bounded_modes_are_monotonic() {
    let (raw, bounds) = arbitrary_case();
    let smaller: f64 = kani::any();
    kani::assume(smaller.is_finite() && smaller >= 0.0 && smaller <= raw);
    let mode = arbitrary_bounded_mode();
    assert!(mode.apply(smaller, &bounds) <= mode.apply(raw, &bounds));
}
