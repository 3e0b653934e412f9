//! Potential estimation.
//!
//! # Responsibility
//! - Combine the seniority prior, potential-criteria signals and peer
//!   rating consistency into one potential score.
//!
//! # Invariants
//! - The seniority prior is always available; unknown labels map to 3.0.
//! - The criteria signal uses exactly the three designated potential
//!   criteria, weighted manager 0.6 / self 0.4 without renormalization
//!   when one side is missing.
//! - The consistency signal requires at least two peer overall scores;
//!   lower variance maps to higher assumed potential.

use crate::model::evaluation::{EvaluationRecord, EvaluationSource};
use crate::scoring::{mean, round_to_tenth};

/// Criterion ids that feed the potential estimate.
pub const POTENTIAL_CRITERIA: [&str; 3] = ["learning_agility", "leadership", "innovation"];

const CRITERIA_WEIGHT_MANAGER: f64 = 0.6;
const CRITERIA_WEIGHT_SELF: f64 = 0.4;

/// Fixed seniority prior. Junior employees are assumed to have the most
/// head-room; staff-level the least.
pub fn seniority_prior(label: &str) -> f64 {
    match label.trim().to_ascii_lowercase().as_str() {
        "junior" => 4.5,
        "mid" => 4.0,
        "senior" => 3.0,
        "staff" => 2.0,
        _ => 3.0,
    }
}

/// Estimates potential for one employee/cycle, rounded to 1 decimal.
///
/// The result is the mean of whichever factors are present; the
/// seniority prior always is.
pub fn potential_score(seniority_label: &str, records: &[EvaluationRecord]) -> f64 {
    let mut factors = vec![seniority_prior(seniority_label)];
    if let Some(signal) = criteria_signal(records) {
        factors.push(signal);
    }
    if let Some(signal) = consistency_signal(records) {
        factors.push(signal);
    }

    let total: f64 = factors.iter().sum();
    round_to_tenth(total / factors.len() as f64)
}

/// Weighted manager/self signal over the designated potential criteria.
///
/// Each term enters only when that source scored at least one of the
/// three criteria; the weighted sum is used as-is (no renormalization)
/// and only a positive sum becomes a factor.
fn criteria_signal(records: &[EvaluationRecord]) -> Option<f64> {
    let manager_avg = designated_criteria_avg(records, EvaluationSource::Manager);
    let self_avg = designated_criteria_avg(records, EvaluationSource::SelfReview);
    if manager_avg.is_none() && self_avg.is_none() {
        return None;
    }

    let mut sum = 0.0;
    if let Some(avg) = manager_avg {
        sum += CRITERIA_WEIGHT_MANAGER * avg;
    }
    if let Some(avg) = self_avg {
        sum += CRITERIA_WEIGHT_SELF * avg;
    }
    if sum > 0.0 {
        Some(sum)
    } else {
        None
    }
}

fn designated_criteria_avg(
    records: &[EvaluationRecord],
    source: EvaluationSource,
) -> Option<f64> {
    mean(
        records
            .iter()
            .filter(|record| record.is_submitted() && record.source == source)
            .flat_map(|record| record.criterion_scores.iter())
            .filter(|(criterion_id, _)| {
                POTENTIAL_CRITERIA.contains(&criterion_id.as_str())
            })
            .map(|(_, score)| f64::from(*score)),
    )
}

/// Maps peer rating spread to an assumed-potential factor.
///
/// Applies only when at least two peer overall scores exist; population
/// variance thresholds are fixed.
fn consistency_signal(records: &[EvaluationRecord]) -> Option<f64> {
    let scores: Vec<f64> = records
        .iter()
        .filter(|record| record.is_submitted() && record.source == EvaluationSource::Peer360)
        .filter_map(|record| record.overall_score)
        .collect();
    if scores.len() < 2 {
        return None;
    }

    let variance = population_variance(&scores);
    let factor = if variance <= 0.5 {
        4.5
    } else if variance <= 1.0 {
        4.0
    } else if variance <= 1.5 {
        3.5
    } else {
        3.0
    };
    Some(factor)
}

fn population_variance(values: &[f64]) -> f64 {
    let count = values.len() as f64;
    let mean = values.iter().sum::<f64>() / count;
    values
        .iter()
        .map(|value| {
            let delta = value - mean;
            delta * delta
        })
        .sum::<f64>()
        / count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::evaluation::EvaluationStatus;
    use std::collections::BTreeMap;
    use uuid::Uuid;

    fn record(source: EvaluationSource, scores: &[(&str, u8)]) -> EvaluationRecord {
        EvaluationRecord {
            id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            rater_id: Uuid::new_v4(),
            cycle_id: "2025.1".to_string(),
            source,
            status: EvaluationStatus::Submitted,
            criterion_scores: scores
                .iter()
                .map(|(criterion, score)| (criterion.to_string(), *score))
                .collect::<BTreeMap<_, _>>(),
            overall_score: None,
        }
    }

    fn peer(overall: f64) -> EvaluationRecord {
        let mut rec = record(EvaluationSource::Peer360, &[]);
        rec.overall_score = Some(overall);
        rec
    }

    #[test]
    fn prior_table_is_fixed() {
        assert_eq!(seniority_prior("junior"), 4.5);
        assert_eq!(seniority_prior("mid"), 4.0);
        assert_eq!(seniority_prior("senior"), 3.0);
        assert_eq!(seniority_prior("staff"), 2.0);
        assert_eq!(seniority_prior("principal wizard"), 3.0);
        assert_eq!(seniority_prior(" Junior "), 4.5);
    }

    #[test]
    fn prior_only_when_no_other_signal_exists() {
        // Fewer than 2 peer scores and no designated criteria anywhere.
        assert_eq!(potential_score("junior", &[peer(4.0)]), 4.5);
    }

    #[test]
    fn criteria_signal_weights_manager_over_self() {
        let records = [
            record(EvaluationSource::Manager, &[("leadership", 4), ("innovation", 4)]),
            record(EvaluationSource::SelfReview, &[("leadership", 5)]),
        ];
        // signal = 4*0.6 + 5*0.4 = 4.4; mean(4.5, 4.4) = 4.45 -> 4.5
        assert_eq!(potential_score("junior", &records), 4.5);
    }

    #[test]
    fn criteria_signal_is_not_renormalized_when_one_side_is_missing() {
        let records = [record(EvaluationSource::SelfReview, &[("leadership", 5)])];
        // signal = 5*0.4 = 2.0, entered as-is; mean(3.0, 2.0) = 2.5
        assert_eq!(potential_score("senior", &records), 2.5);
    }

    #[test]
    fn non_designated_criteria_do_not_feed_potential() {
        let records = [record(EvaluationSource::Manager, &[("delivery", 5)])];
        assert_eq!(potential_score("staff", &records), 2.0);
    }

    #[test]
    fn consistency_thresholds_map_variance_to_factor() {
        // variance 0.25 -> 4.5
        let tight = [peer(4.0), peer(5.0)];
        // mean(prior 3.0, 4.5) = 3.75 -> 3.8
        assert_eq!(potential_score("senior", &tight), 3.8);

        // variance 1.0 -> 4.0; mean(3.0, 4.0) = 3.5
        let medium = [peer(2.0), peer(4.0)];
        assert_eq!(potential_score("senior", &medium), 3.5);

        // variance 2.25 -> 3.0; mean(3.0, 3.0) = 3.0
        let wide = [peer(2.0), peer(5.0)];
        assert_eq!(potential_score("senior", &wide), 3.0);
    }

    #[test]
    fn single_peer_score_is_not_a_consistency_signal() {
        let records = [peer(1.0)];
        assert_eq!(potential_score("staff", &records), 2.0);
    }

    #[test]
    fn draft_records_are_ignored() {
        let mut draft = record(EvaluationSource::Manager, &[("leadership", 5)]);
        draft.status = EvaluationStatus::Draft;
        assert_eq!(potential_score("staff", &[draft]), 2.0);
    }
}
