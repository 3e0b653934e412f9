//! Talent matrix read models.
//!
//! # Responsibility
//! - Define the derived 9-box position and statistics shapes.
//!
//! # Invariants
//! - Never persisted; recomputed from a store snapshot on every request.
//! - An employee without evaluation data has no position at all (excluded,
//!   not plotted at a misleading neutral center).

use crate::model::employee::EmployeeId;
use serde::Serialize;
use std::collections::BTreeMap;

/// One cell of the fixed 3x3 grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MatrixCell {
    /// Grid cell number, 1 (top talent) through 9 (insufficient).
    pub cell_id: u8,
    pub label: &'static str,
    /// Presentation hint for matrix rendering, `#rrggbb`.
    pub color: &'static str,
}

/// Classified position of one employee for one cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatrixPosition {
    pub employee_id: EmployeeId,
    pub full_name: String,
    pub business_unit: String,
    /// Weighted multi-source performance score, 1 decimal.
    pub performance_score: f64,
    /// Estimated potential score, 1 decimal.
    pub potential_score: f64,
    pub cell: MatrixCell,
}

/// Org-wide aggregates over the classified positions only.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatrixStats {
    /// Number of classified employees. Employees excluded for missing
    /// data are not counted here.
    pub total_collaborators: u32,
    /// Cell label to position count.
    pub by_label: BTreeMap<String, u32>,
    /// Business unit to position count.
    pub by_business_unit: BTreeMap<String, u32>,
    /// Positions in cells 1, 2 and 4.
    pub top_talent: u32,
    /// Positions in cells 8 and 9.
    pub low_performers: u32,
}

/// Full talent matrix response for one cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TalentMatrix {
    pub cycle_id: String,
    pub positions: Vec<MatrixPosition>,
    pub stats: MatrixStats,
    /// True when the cycle has no submitted evaluation at all, org-wide.
    /// Distinguishes "no data yet" from "everyone scored low".
    pub has_insufficient_data: bool,
}
