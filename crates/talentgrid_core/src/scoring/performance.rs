//! Weighted performance score.
//!
//! # Responsibility
//! - Combine per-source averages into one performance score.
//!
//! # Invariants
//! - All three sources absent yields no score at all; the employee is
//!   excluded from the matrix rather than plotted at a default.
//! - Base weights: self 0.2, manager 0.5, peer 0.3. An absent source
//!   drops both its term and its weight.
//! - Redistribution happens only when the manager source is absent:
//!   self becomes 0.4 and peer 0.6. Absence of self or peer never
//!   redistributes the other source's weight.

use crate::scoring::aggregation::SourceAverages;
use crate::scoring::round_to_tenth;

const BASE_WEIGHT_SELF: f64 = 0.2;
const BASE_WEIGHT_MANAGER: f64 = 0.5;
const BASE_WEIGHT_PEER: f64 = 0.3;

const NO_MANAGER_WEIGHT_SELF: f64 = 0.4;
const NO_MANAGER_WEIGHT_PEER: f64 = 0.6;

/// Computes the weighted performance score, rounded to 1 decimal.
///
/// Returns `None` when no source is available for the employee/cycle.
pub fn performance_score(averages: &SourceAverages) -> Option<f64> {
    if averages.is_empty() {
        return None;
    }

    let (self_weight, peer_weight) = if averages.manager_avg.is_none() {
        (NO_MANAGER_WEIGHT_SELF, NO_MANAGER_WEIGHT_PEER)
    } else {
        (BASE_WEIGHT_SELF, BASE_WEIGHT_PEER)
    };

    let mut weighted_sum = 0.0;
    let mut weight_used = 0.0;
    if let Some(self_avg) = averages.self_avg {
        weighted_sum += self_weight * self_avg;
        weight_used += self_weight;
    }
    if let Some(manager_avg) = averages.manager_avg {
        weighted_sum += BASE_WEIGHT_MANAGER * manager_avg;
        weight_used += BASE_WEIGHT_MANAGER;
    }
    if let Some(peer_avg) = averages.peer_avg {
        weighted_sum += peer_weight * peer_avg;
        weight_used += peer_weight;
    }

    Some(round_to_tenth(weighted_sum / weight_used))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn averages(
        self_avg: Option<f64>,
        manager_avg: Option<f64>,
        peer_avg: Option<f64>,
    ) -> SourceAverages {
        SourceAverages {
            self_avg,
            manager_avg,
            peer_avg,
        }
    }

    #[test]
    fn all_sources_use_base_weights() {
        // 4*0.2 + 3*0.5 + 5*0.3 = 3.8
        let score = performance_score(&averages(Some(4.0), Some(3.0), Some(5.0)));
        assert_eq!(score, Some(3.8));
    }

    #[test]
    fn missing_manager_redistributes_to_self_and_peer() {
        // 4*0.4 + 4*0.6 = 4.0
        let score = performance_score(&averages(Some(4.0), None, Some(4.0)));
        assert_eq!(score, Some(4.0));
    }

    #[test]
    fn missing_self_keeps_base_weights_for_the_rest() {
        // (3*0.5 + 5*0.3) / 0.8 = 3.75 -> 3.8
        let score = performance_score(&averages(None, Some(3.0), Some(5.0)));
        assert_eq!(score, Some(3.8));
    }

    #[test]
    fn missing_peer_keeps_base_weights_for_the_rest() {
        // (4*0.2 + 3*0.5) / 0.7 = 3.2857 -> 3.3
        let score = performance_score(&averages(Some(4.0), Some(3.0), None));
        assert_eq!(score, Some(3.3));
    }

    #[test]
    fn single_source_collapses_to_that_average() {
        assert_eq!(performance_score(&averages(None, Some(3.4), None)), Some(3.4));
        assert_eq!(performance_score(&averages(Some(2.7), None, None)), Some(2.7));
        assert_eq!(performance_score(&averages(None, None, Some(4.9))), Some(4.9));
    }

    #[test]
    fn no_sources_yields_no_score() {
        assert_eq!(performance_score(&averages(None, None, None)), None);
    }
}
