//! Evaluation store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide read-only access to submitted evaluation records and their
//!   criterion scores for the scoring path.
//!
//! # Invariants
//! - This repository never writes; records are produced upstream and are
//!   immutable once submitted.
//! - Read paths validate score ranges and reject invalid persisted state.
//! - Listing order is deterministic (`employee_id ASC, id ASC`).

use crate::model::employee::EmployeeId;
use crate::model::evaluation::{
    EvaluationRecord, EvaluationSource, EvaluationStatus,
};
use crate::repo::employee_repo::{
    parse_uuid, table_exists, table_has_column, RepoError, RepoResult,
};
use rusqlite::{params, Connection, Row};
use std::collections::BTreeMap;

const EVALUATION_SELECT_SQL: &str = "SELECT
    id,
    employee_id,
    rater_id,
    cycle_id,
    source,
    status,
    overall_score
FROM evaluations";

/// Repository interface for the evaluation store (read-only).
pub trait EvaluationRepository {
    /// Lists all submitted records for one cycle, org-wide.
    fn list_submitted_for_cycle(&self, cycle_id: &str) -> RepoResult<Vec<EvaluationRecord>>;
    /// Lists all submitted records for one employee and cycle.
    fn list_for_employee_cycle(
        &self,
        employee_id: EmployeeId,
        cycle_id: &str,
    ) -> RepoResult<Vec<EvaluationRecord>>;
    /// Counts submitted records for one cycle, org-wide. Zero means the
    /// cycle has no data at all yet.
    fn count_submitted_for_cycle(&self, cycle_id: &str) -> RepoResult<u64>;
}

/// SQLite-backed evaluation store.
pub struct SqliteEvaluationRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEvaluationRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_evaluation_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl EvaluationRepository for SqliteEvaluationRepository<'_> {
    fn list_submitted_for_cycle(&self, cycle_id: &str) -> RepoResult<Vec<EvaluationRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "{EVALUATION_SELECT_SQL}
             WHERE cycle_id = ?1
               AND status = 'submitted'
             ORDER BY employee_id ASC, id ASC;"
        ))?;

        let mut rows = stmt.query([cycle_id])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_evaluation_row(self.conn, row)?);
        }

        Ok(records)
    }

    fn list_for_employee_cycle(
        &self,
        employee_id: EmployeeId,
        cycle_id: &str,
    ) -> RepoResult<Vec<EvaluationRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "{EVALUATION_SELECT_SQL}
             WHERE employee_id = ?1
               AND cycle_id = ?2
               AND status = 'submitted'
             ORDER BY id ASC;"
        ))?;

        let mut rows = stmt.query(params![employee_id.to_string(), cycle_id])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_evaluation_row(self.conn, row)?);
        }

        Ok(records)
    }

    fn count_submitted_for_cycle(&self, cycle_id: &str) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*)
             FROM evaluations
             WHERE cycle_id = ?1
               AND status = 'submitted';",
            [cycle_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}

fn parse_evaluation_row(conn: &Connection, row: &Row<'_>) -> RepoResult<EvaluationRecord> {
    let id_text: String = row.get("id")?;
    let employee_text: String = row.get("employee_id")?;
    let rater_text: String = row.get("rater_id")?;

    let source_text: String = row.get("source")?;
    let source = parse_source(&source_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid evaluation source `{source_text}` in evaluations.source"
        ))
    })?;

    let status_text: String = row.get("status")?;
    let status = parse_status(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid evaluation status `{status_text}` in evaluations.status"
        ))
    })?;

    let record = EvaluationRecord {
        id: parse_uuid(&id_text, "evaluations.id")?,
        employee_id: parse_uuid(&employee_text, "evaluations.employee_id")?,
        rater_id: parse_uuid(&rater_text, "evaluations.rater_id")?,
        cycle_id: row.get("cycle_id")?,
        source,
        status,
        criterion_scores: load_criterion_scores(conn, &id_text)?,
        overall_score: row.get("overall_score")?,
    };
    record
        .validate()
        .map_err(|err| RepoError::InvalidData(err.to_string()))?;
    Ok(record)
}

fn load_criterion_scores(conn: &Connection, evaluation_id: &str) -> RepoResult<BTreeMap<String, u8>> {
    let mut stmt = conn.prepare(
        "SELECT criterion_id, score
         FROM evaluation_scores
         WHERE evaluation_id = ?1
         ORDER BY criterion_id ASC;",
    )?;

    let mut rows = stmt.query([evaluation_id])?;
    let mut scores = BTreeMap::new();
    while let Some(row) = rows.next()? {
        let criterion_id: String = row.get(0)?;
        let score: i64 = row.get(1)?;
        let score = u8::try_from(score).map_err(|_| {
            RepoError::InvalidData(format!(
                "invalid score `{score}` in evaluation_scores.score"
            ))
        })?;
        scores.insert(criterion_id, score);
    }
    Ok(scores)
}

fn parse_source(value: &str) -> Option<EvaluationSource> {
    match value {
        "self" => Some(EvaluationSource::SelfReview),
        "manager" => Some(EvaluationSource::Manager),
        "peer360" => Some(EvaluationSource::Peer360),
        "committee" => Some(EvaluationSource::Committee),
        _ => None,
    }
}

fn parse_status(value: &str) -> Option<EvaluationStatus> {
    match value {
        "draft" => Some(EvaluationStatus::Draft),
        "submitted" => Some(EvaluationStatus::Submitted),
        _ => None,
    }
}

fn ensure_evaluation_connection_ready(conn: &Connection) -> RepoResult<()> {
    for table in ["evaluations", "evaluation_scores"] {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }

    for column in [
        "id",
        "employee_id",
        "rater_id",
        "cycle_id",
        "source",
        "status",
        "overall_score",
    ] {
        if !table_has_column(conn, "evaluations", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "evaluations",
                column,
            });
        }
    }

    for column in ["evaluation_id", "criterion_id", "score"] {
        if !table_has_column(conn, "evaluation_scores", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "evaluation_scores",
                column,
            });
        }
    }

    Ok(())
}
