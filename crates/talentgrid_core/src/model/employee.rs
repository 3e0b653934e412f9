//! Employee directory model.
//!
//! # Responsibility
//! - Define the canonical employee record and its organizational pointers.
//!
//! # Invariants
//! - `id` is stable and never reused for another employee.
//! - `manager_id` / `leader_id` / `mentor_id` are mutated only by the role
//!   service cascade; everything else treats them as read-only.
//! - Reciprocal sets (direct reports, direct leadership) are derived from
//!   these pointers by query, never stored.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for every employee in the directory.
pub type EmployeeId = Uuid;

/// Organization-level role of an employee, independent of per-project
/// role assignments. Drives which employees enter the talent matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrgRole {
    /// Regular contributor, rated in evaluation cycles.
    Collaborator,
    /// People manager, also rated.
    Manager,
    /// Evaluation committee member, also rated.
    Committee,
    /// Administrative account, never rated.
    Admin,
}

/// Canonical employee record.
///
/// Seniority is kept as the raw directory label; the scoring layer maps
/// it to a prior and tolerates unknown labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Stable global ID used for role links and evaluation references.
    pub id: EmployeeId,
    pub full_name: String,
    /// Raw seniority label (`junior`, `mid`, `senior`, `staff`, or free text).
    pub seniority: String,
    pub business_unit: String,
    pub org_role: OrgRole,
    pub is_active: bool,
    /// Current manager pointer. `None` until a cascade assigns one.
    pub manager_id: Option<EmployeeId>,
    /// Current leader pointer, symmetric to `manager_id`.
    pub leader_id: Option<EmployeeId>,
    /// Mentor pointer; part of the org graph but untouched by role cascades.
    pub mentor_id: Option<EmployeeId>,
}

impl Employee {
    /// Creates a new active employee with a generated stable ID.
    pub fn new(full_name: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), full_name)
    }

    /// Creates a new active employee with a caller-provided stable ID.
    ///
    /// Used by import paths where identity already exists externally.
    pub fn with_id(id: EmployeeId, full_name: impl Into<String>) -> Self {
        Self {
            id,
            full_name: full_name.into(),
            seniority: String::new(),
            business_unit: String::new(),
            org_role: OrgRole::Collaborator,
            is_active: true,
            manager_id: None,
            leader_id: None,
            mentor_id: None,
        }
    }

    /// Returns whether this employee participates in evaluation cycles.
    pub fn is_rated(&self) -> bool {
        !matches!(self.org_role, OrgRole::Admin)
    }
}
