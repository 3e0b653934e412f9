//! Per-source evaluation aggregation.
//!
//! # Responsibility
//! - Flatten one employee/cycle's raw records into at most one numeric
//!   average per source.
//!
//! # Invariants
//! - Only submitted records contribute.
//! - No cross-source weighting happens here; the output is three
//!   independent, possibly-absent scalars.
//! - Committee records are accepted but produce no average.

use crate::model::evaluation::{EvaluationRecord, EvaluationSource};
use crate::scoring::mean;
use log::warn;

/// Per-source averages for one employee and cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SourceAverages {
    /// Mean of the single self record's criterion scores.
    pub self_avg: Option<f64>,
    /// Mean over the pooled criterion scores of all manager records.
    pub manager_avg: Option<f64>,
    /// Mean of the peer records' overall scores.
    pub peer_avg: Option<f64>,
}

impl SourceAverages {
    /// Returns whether every source is absent.
    pub fn is_empty(&self) -> bool {
        self.self_avg.is_none() && self.manager_avg.is_none() && self.peer_avg.is_none()
    }
}

/// Reduces one employee/cycle's records to per-source averages.
///
/// At most one self record is permitted; if corrupted state holds more,
/// the first one wins and the surplus is logged, not silently folded in.
pub fn aggregate_sources(records: &[EvaluationRecord]) -> SourceAverages {
    let submitted: Vec<&EvaluationRecord> =
        records.iter().filter(|record| record.is_submitted()).collect();

    let self_records: Vec<&&EvaluationRecord> = submitted
        .iter()
        .filter(|record| record.source == EvaluationSource::SelfReview)
        .collect();
    if self_records.len() > 1 {
        warn!(
            "event=aggregate_sources module=scoring status=degraded reason=multiple_self_records employee_id={} count={}",
            self_records[0].employee_id,
            self_records.len()
        );
    }
    let self_avg = self_records.first().and_then(|record| {
        mean(record
            .criterion_scores
            .values()
            .map(|score| f64::from(*score)))
    });

    let manager_avg = mean(
        submitted
            .iter()
            .filter(|record| record.source == EvaluationSource::Manager)
            .flat_map(|record| record.criterion_scores.values())
            .map(|score| f64::from(*score)),
    );

    let peer_avg = mean(
        submitted
            .iter()
            .filter(|record| record.source == EvaluationSource::Peer360)
            .filter_map(|record| record.overall_score),
    );

    SourceAverages {
        self_avg,
        manager_avg,
        peer_avg,
    }
}
