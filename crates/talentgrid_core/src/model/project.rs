//! Project and project-role assignment models.
//!
//! # Invariants
//! - Per project, at most one active MANAGER and one active LEADER
//!   assignment exist at any time.
//! - `Project.leader_id` is the canonical project-level leader pointer,
//!   written together with the LEADER assignment.

use crate::model::employee::EmployeeId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a project.
pub type ProjectId = Uuid;

/// Role an employee holds on one project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectRole {
    Collaborator,
    Manager,
    Leader,
}

/// Canonical project record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    /// Canonical leader pointer; `None` until `assign_leader` runs.
    pub leader_id: Option<EmployeeId>,
    pub is_active: bool,
}

impl Project {
    /// Creates a new active project with a generated stable ID.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            leader_id: None,
            is_active: true,
        }
    }
}

/// One row of the role table (read model).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub employee_id: EmployeeId,
    pub project_id: ProjectId,
    pub role: ProjectRole,
    pub is_active: bool,
}
