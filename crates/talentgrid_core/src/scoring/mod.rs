//! Talent scoring algorithms.
//!
//! # Responsibility
//! - Reduce raw multi-source evaluation records to per-source averages.
//! - Combine averages into performance and potential scores.
//! - Bucket scores onto the fixed 9-box grid.
//!
//! # Invariants
//! - Pure functions over in-memory records; no I/O.
//! - Missing sources are omitted, never defaulted to a neutral value.
//! - All published scores are rounded to 1 decimal.

pub mod aggregation;
pub mod grid;
pub mod performance;
pub mod potential;

/// Rounds a score to 1 decimal, the precision every published score uses.
pub(crate) fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Mean over an iterator of scores; `None` for an empty iterator.
pub(crate) fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let mut sum = 0.0;
    let mut count = 0u32;
    for value in values {
        sum += value;
        count += 1;
    }
    if count == 0 {
        None
    } else {
        Some(sum / f64::from(count))
    }
}

#[cfg(test)]
mod tests {
    use super::{mean, round_to_tenth};

    #[test]
    fn mean_of_empty_input_is_none() {
        assert_eq!(mean(std::iter::empty()), None);
    }

    #[test]
    fn mean_averages_values() {
        assert_eq!(mean([2.0, 4.0]), Some(3.0));
    }

    #[test]
    fn rounding_keeps_one_decimal() {
        assert_eq!(round_to_tenth(3.84), 3.8);
        assert_eq!(round_to_tenth(3.85), 3.9);
        assert_eq!(round_to_tenth(4.0), 4.0);
    }
}
