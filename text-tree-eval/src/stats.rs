//! Summary statistics over metric responses.

use serde::{Deserialize, Serialize};

/// Converts a count to f64 for statistical calculations.
///
/// Evaluation counts must fit in u32 (< 4 billion), which converts
/// to f64 without precision loss.
///
/// # Panics
///
/// Panics if count exceeds `u32::MAX`.
#[inline]
pub(crate) fn count_as_f64(count: usize) -> f64 {
    f64::from(u32::try_from(count).expect("evaluation count exceeds u32::MAX"))
}

/// Computes mean of values.
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / count_as_f64(values.len())
}

/// Computes the median of values (mean of the middle pair for even lengths).
#[must_use]
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Computes standard deviation.
#[must_use]
pub fn stddev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance =
        values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / count_as_f64(values.len() - 1);
    variance.sqrt()
}

/// How per-magnitude responses and per-magnitude ratios are summarised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregate {
    /// Arithmetic mean.
    #[default]
    Mean,
    /// Median, robust to a few extreme samples.
    Median,
}

impl Aggregate {
    /// Applies the aggregate; NaN for no values.
    #[must_use]
    pub fn apply(self, values: &[f64]) -> f64 {
        if values.is_empty() {
            return f64::NAN;
        }
        match self {
            Self::Mean => mean(values),
            Self::Median => median(values),
        }
    }
}

/// Serde adapter writing NaN as `null` and reading `null` back as NaN.
///
/// JSON has no NaN, and undefined coefficients must stay distinguishable
/// from zero.
pub(crate) mod nullable_f64 {
    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_nan() {
            serializer.serialize_none()
        } else {
            serializer.serialize_some(value)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_and_median() {
        let values = [4.0, 1.0, 3.0, 2.0];
        assert!((mean(&values) - 2.5).abs() < f64::EPSILON);
        assert!((median(&values) - 2.5).abs() < f64::EPSILON);
        assert!((median(&[5.0, 1.0, 3.0]) - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn stddev_is_sample_deviation() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((stddev(&values) - 2.138_089_935_299_395).abs() < 1e-12);
        assert!(stddev(&[1.0]).abs() < f64::EPSILON);
    }

    #[test]
    fn aggregate_of_nothing_is_undefined() {
        assert!(Aggregate::Mean.apply(&[]).is_nan());
        assert!(Aggregate::Median.apply(&[]).is_nan());
        assert!((Aggregate::Median.apply(&[0.0, 10.0, 1.0]) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn nan_round_trips_through_null() {
        #[derive(Serialize, Deserialize)]
        struct Wrapper {
            #[serde(with = "nullable_f64")]
            value: f64,
        }
        let json = serde_json::to_string(&Wrapper { value: f64::NAN }).unwrap();
        assert_eq!(json, r#"{"value":null}"#);
        let back: Wrapper = serde_json::from_str(&json).unwrap();
        assert!(back.value.is_nan());

        let json = serde_json::to_string(&Wrapper { value: 0.5 }).unwrap();
        let back: Wrapper = serde_json::from_str(&json).unwrap();
        assert!((back.value - 0.5).abs() < f64::EPSILON);
    }
}
