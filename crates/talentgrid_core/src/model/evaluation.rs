//! Evaluation record model.
//!
//! # Responsibility
//! - Define the read-only evaluation record consumed by the scoring path.
//! - Validate score ranges and cycle identifiers.
//!
//! # Invariants
//! - Records are immutable once `Submitted`; this core never writes them.
//! - Criterion scores are integers in `[1, 5]`; overall score, when
//!   present, is a real number in `[1.0, 5.0]`.
//! - Cycle ids follow the `YYYY.N` convention (e.g. `2025.1`).

use crate::model::employee::EmployeeId;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for one evaluation record.
pub type EvaluationId = Uuid;

static CYCLE_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}\.\d$").expect("cycle id pattern must compile"));

/// Returns whether `value` is a well-formed cycle identifier.
pub fn is_valid_cycle_id(value: &str) -> bool {
    CYCLE_ID_RE.is_match(value)
}

/// Source of one evaluation record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationSource {
    /// Self-assessment; at most one per employee and cycle.
    #[serde(rename = "self")]
    SelfReview,
    /// Written by the employee's manager.
    Manager,
    /// 360-degree peer review; usually several per cycle.
    Peer360,
    /// Calibration committee record. Counts as evaluation presence but
    /// contributes no source average.
    Committee,
}

/// Submission state of one evaluation record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationStatus {
    Draft,
    Submitted,
}

/// Validation failures for persisted evaluation data.
#[derive(Debug)]
pub enum EvaluationValidationError {
    CriterionScoreOutOfRange { criterion_id: String, score: u8 },
    OverallScoreOutOfRange(f64),
    InvalidCycleId(String),
}

impl Display for EvaluationValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CriterionScoreOutOfRange {
                criterion_id,
                score,
            } => write!(
                f,
                "criterion `{criterion_id}` score {score} outside allowed range 1..=5"
            ),
            Self::OverallScoreOutOfRange(score) => {
                write!(f, "overall score {score} outside allowed range 1.0..=5.0")
            }
            Self::InvalidCycleId(cycle_id) => {
                write!(f, "cycle id `{cycle_id}` does not match YYYY.N")
            }
        }
    }
}

impl Error for EvaluationValidationError {}

/// One evaluation record with its criterion-score map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub id: EvaluationId,
    pub employee_id: EmployeeId,
    pub rater_id: EmployeeId,
    pub cycle_id: String,
    pub source: EvaluationSource,
    pub status: EvaluationStatus,
    /// Criterion id to integer score, keyed deterministically.
    pub criterion_scores: BTreeMap<String, u8>,
    /// Optional holistic score; the only scalar peer reviews contribute.
    pub overall_score: Option<f64>,
}

impl EvaluationRecord {
    /// Checks score ranges and cycle id shape.
    ///
    /// Read paths reject invalid persisted state instead of masking it.
    pub fn validate(&self) -> Result<(), EvaluationValidationError> {
        if !is_valid_cycle_id(&self.cycle_id) {
            return Err(EvaluationValidationError::InvalidCycleId(
                self.cycle_id.clone(),
            ));
        }
        for (criterion_id, score) in &self.criterion_scores {
            if !(1..=5).contains(score) {
                return Err(EvaluationValidationError::CriterionScoreOutOfRange {
                    criterion_id: criterion_id.clone(),
                    score: *score,
                });
            }
        }
        if let Some(overall) = self.overall_score {
            if !(1.0..=5.0).contains(&overall) {
                return Err(EvaluationValidationError::OverallScoreOutOfRange(overall));
            }
        }
        Ok(())
    }

    /// Returns whether this record counts as evaluation presence for the
    /// matrix inclusion rule.
    pub fn is_submitted(&self) -> bool {
        self.status == EvaluationStatus::Submitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn record() -> EvaluationRecord {
        EvaluationRecord {
            id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            rater_id: Uuid::new_v4(),
            cycle_id: "2025.1".to_string(),
            source: EvaluationSource::SelfReview,
            status: EvaluationStatus::Submitted,
            criterion_scores: BTreeMap::new(),
            overall_score: None,
        }
    }

    #[test]
    fn cycle_id_accepts_year_dot_digit_only() {
        assert!(is_valid_cycle_id("2025.1"));
        assert!(is_valid_cycle_id("1999.2"));
        assert!(!is_valid_cycle_id("2025"));
        assert!(!is_valid_cycle_id("2025.12"));
        assert!(!is_valid_cycle_id("25.1"));
        assert!(!is_valid_cycle_id(" 2025.1"));
    }

    #[test]
    fn validate_rejects_out_of_range_criterion_score() {
        let mut rec = record();
        rec.criterion_scores.insert("delivery".to_string(), 6);
        assert!(matches!(
            rec.validate(),
            Err(EvaluationValidationError::CriterionScoreOutOfRange { score: 6, .. })
        ));
    }

    #[test]
    fn validate_rejects_out_of_range_overall_score() {
        let mut rec = record();
        rec.overall_score = Some(0.5);
        assert!(matches!(
            rec.validate(),
            Err(EvaluationValidationError::OverallScoreOutOfRange(_))
        ));
    }

    #[test]
    fn validate_accepts_full_record() {
        let mut rec = record();
        rec.criterion_scores.insert("delivery".to_string(), 4);
        rec.overall_score = Some(3.5);
        assert!(rec.validate().is_ok());
    }
}
