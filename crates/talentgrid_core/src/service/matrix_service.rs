//! Talent matrix use-case service.
//!
//! # Responsibility
//! - Compute the whole-org 9-box matrix for one cycle from a store
//!   snapshot: gather, aggregate, score, bucket, summarize.
//!
//! # Invariants
//! - Pure read path; nothing is persisted and every call recomputes.
//! - Employees without any submitted record for the cycle, or without a
//!   computable performance score, are silently absent from positions
//!   and statistics alike.
//! - A cycle with zero submitted records org-wide returns
//!   `has_insufficient_data = true` and no positions; it is a normal
//!   documented result, not an error.

use crate::model::employee::EmployeeId;
use crate::model::evaluation::{is_valid_cycle_id, EvaluationRecord};
use crate::model::matrix::{MatrixPosition, MatrixStats, TalentMatrix};
use crate::repo::employee_repo::{EmployeeRepository, RepoError};
use crate::repo::evaluation_repo::EvaluationRepository;
use crate::scoring::aggregation::aggregate_sources;
use crate::scoring::grid::{classify, tertile_level, LOW_PERFORMER_CELLS, TOP_TALENT_CELLS};
use crate::scoring::performance::performance_score;
use crate::scoring::potential::potential_score;
use log::{error, info};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Errors from talent matrix computation.
#[derive(Debug)]
pub enum MatrixServiceError {
    /// Cycle id does not match the `YYYY.N` convention.
    InvalidCycleId(String),
    /// Repository-level failure.
    Repo(RepoError),
}

impl Display for MatrixServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCycleId(cycle_id) => {
                write!(f, "invalid cycle id `{cycle_id}`; expected YYYY.N")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for MatrixServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::InvalidCycleId(_) => None,
        }
    }
}

impl From<RepoError> for MatrixServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Talent matrix service facade.
pub struct MatrixService<E: EmployeeRepository, V: EvaluationRepository> {
    employees: E,
    evaluations: V,
}

impl<E: EmployeeRepository, V: EvaluationRepository> MatrixService<E, V> {
    /// Creates service from repository implementations.
    pub fn new(employees: E, evaluations: V) -> Self {
        Self {
            employees,
            evaluations,
        }
    }

    /// Computes the full talent matrix for one cycle.
    pub fn compute_talent_matrix(
        &self,
        cycle_id: &str,
    ) -> Result<TalentMatrix, MatrixServiceError> {
        if !is_valid_cycle_id(cycle_id) {
            return Err(MatrixServiceError::InvalidCycleId(cycle_id.to_string()));
        }

        let started_at = Instant::now();
        let result = self.compute_inner(cycle_id);
        match &result {
            Ok(matrix) => info!(
                "event=talent_matrix module=service status=ok cycle_id={} positions={} insufficient_data={} duration_ms={}",
                cycle_id,
                matrix.positions.len(),
                matrix.has_insufficient_data,
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=talent_matrix module=service status=error cycle_id={} duration_ms={} error={}",
                cycle_id,
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }

    fn compute_inner(&self, cycle_id: &str) -> Result<TalentMatrix, MatrixServiceError> {
        // Org-wide record count distinguishes "no data yet" from
        // "everyone scored low" before any per-employee work happens.
        let submitted_total = self.evaluations.count_submitted_for_cycle(cycle_id)?;
        if submitted_total == 0 {
            return Ok(TalentMatrix {
                cycle_id: cycle_id.to_string(),
                positions: Vec::new(),
                stats: MatrixStats::default(),
                has_insufficient_data: true,
            });
        }

        let employees = self.employees.list_rated_active()?;
        let records = self.evaluations.list_submitted_for_cycle(cycle_id)?;
        let mut by_employee: HashMap<EmployeeId, Vec<EvaluationRecord>> = HashMap::new();
        for record in records {
            by_employee.entry(record.employee_id).or_default().push(record);
        }

        let mut positions = Vec::new();
        for employee in &employees {
            let employee_records = match by_employee.get(&employee.id) {
                Some(records) => records,
                // No record of any kind for this cycle: excluded, not
                // plotted at a misleading neutral default.
                None => continue,
            };

            let averages = aggregate_sources(employee_records);
            let performance = match performance_score(&averages) {
                Some(score) => score,
                // Records exist (e.g. committee only) but no scoreable
                // source: still excluded.
                None => continue,
            };
            let potential = potential_score(&employee.seniority, employee_records);

            let cell = classify(tertile_level(performance), tertile_level(potential));
            positions.push(MatrixPosition {
                employee_id: employee.id,
                full_name: employee.full_name.clone(),
                business_unit: employee.business_unit.clone(),
                performance_score: performance,
                potential_score: potential,
                cell,
            });
        }

        let stats = build_stats(&positions);
        Ok(TalentMatrix {
            cycle_id: cycle_id.to_string(),
            positions,
            stats,
            has_insufficient_data: false,
        })
    }
}

fn build_stats(positions: &[MatrixPosition]) -> MatrixStats {
    let mut stats = MatrixStats {
        total_collaborators: positions.len() as u32,
        ..MatrixStats::default()
    };

    for position in positions {
        *stats
            .by_label
            .entry(position.cell.label.to_string())
            .or_insert(0) += 1;
        *stats
            .by_business_unit
            .entry(position.business_unit.clone())
            .or_insert(0) += 1;
        if TOP_TALENT_CELLS.contains(&position.cell.cell_id) {
            stats.top_talent += 1;
        }
        if LOW_PERFORMER_CELLS.contains(&position.cell.cell_id) {
            stats.low_performers += 1;
        }
    }

    stats
}
