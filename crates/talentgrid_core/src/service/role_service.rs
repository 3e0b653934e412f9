//! Role assignment use-case service.
//!
//! # Responsibility
//! - Expose manager/leader assignment and collaborator join operations.
//! - Surface role conflicts with the incumbent named for human-readable
//!   messages.
//!
//! # Invariants
//! - Repository-level atomicity is relied upon, never re-implemented:
//!   one call is one transaction.
//! - A second assignment attempt for a held role fails with
//!   `RoleConflict`; it is a documented business outcome, not a bug.

use crate::model::employee::EmployeeId;
use crate::model::project::{ProjectId, ProjectRole};
use crate::repo::role_repo::{RoleRepoError, RoleRepository};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Errors from role assignment operations.
#[derive(Debug)]
pub enum RoleServiceError {
    /// Target project does not exist or is inactive.
    ProjectNotFound(ProjectId),
    /// Target employee does not exist or is inactive.
    EmployeeNotFound(EmployeeId),
    /// The role is already held; carries the incumbent for messaging.
    RoleConflict {
        project_id: ProjectId,
        role: ProjectRole,
        incumbent_id: EmployeeId,
        incumbent_name: String,
    },
    /// The project roster exceeds the cascade rescan bound.
    RosterTooLarge { project_id: ProjectId, limit: usize },
    /// Repository-level failure.
    Repo(RoleRepoError),
}

impl Display for RoleServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ProjectNotFound(id) => write!(f, "project not found: {id}"),
            Self::EmployeeNotFound(id) => write!(f, "employee not found: {id}"),
            Self::RoleConflict {
                role,
                incumbent_name,
                ..
            } => write!(
                f,
                "role {role:?} is already held by {incumbent_name}"
            ),
            Self::RosterTooLarge { project_id, limit } => write!(
                f,
                "project {project_id} roster exceeds rescan limit of {limit}"
            ),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RoleServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RoleRepoError> for RoleServiceError {
    fn from(value: RoleRepoError) -> Self {
        match value {
            RoleRepoError::ProjectNotFound(id) => Self::ProjectNotFound(id),
            RoleRepoError::EmployeeNotFound(id) => Self::EmployeeNotFound(id),
            RoleRepoError::RoleAlreadyHeld {
                project_id,
                role,
                incumbent_id,
                incumbent_name,
            } => Self::RoleConflict {
                project_id,
                role,
                incumbent_id,
                incumbent_name,
            },
            RoleRepoError::RosterTooLarge { project_id, limit } => {
                Self::RosterTooLarge { project_id, limit }
            }
            other => Self::Repo(other),
        }
    }
}

/// Role assignment service facade.
pub struct RoleService<R: RoleRepository> {
    repo: R,
}

impl<R: RoleRepository> RoleService<R> {
    /// Creates service from repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Assigns the project manager and heals stale manager pointers
    /// across the roster. Returns the number of re-pointed collaborators.
    pub fn assign_manager(
        &self,
        project_id: ProjectId,
        candidate_id: EmployeeId,
    ) -> Result<usize, RoleServiceError> {
        self.assign_lead_role(project_id, candidate_id, ProjectRole::Manager)
    }

    /// Assigns the project leader, writes the canonical project leader
    /// pointer, and heals stale leader pointers across the roster.
    pub fn assign_leader(
        &self,
        project_id: ProjectId,
        candidate_id: EmployeeId,
    ) -> Result<usize, RoleServiceError> {
        self.assign_lead_role(project_id, candidate_id, ProjectRole::Leader)
    }

    /// Adds one collaborator to a project, idempotently, and points the
    /// joiner at the project's current manager and leader.
    pub fn join_collaborator(
        &self,
        employee_id: EmployeeId,
        project_id: ProjectId,
    ) -> Result<(), RoleServiceError> {
        let started_at = Instant::now();
        match self.repo.join_collaborator(employee_id, project_id) {
            Ok(created) => {
                info!(
                    "event=collaborator_join module=service status=ok project_id={} employee_id={} created={} duration_ms={}",
                    project_id,
                    employee_id,
                    created,
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=collaborator_join module=service status=error project_id={} employee_id={} duration_ms={} error={}",
                    project_id,
                    employee_id,
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err.into())
            }
        }
    }

    fn assign_lead_role(
        &self,
        project_id: ProjectId,
        candidate_id: EmployeeId,
        role: ProjectRole,
    ) -> Result<usize, RoleServiceError> {
        let started_at = Instant::now();
        let (role_name, outcome) = match role {
            ProjectRole::Manager => (
                "manager",
                self.repo.assign_manager(project_id, candidate_id),
            ),
            ProjectRole::Leader => (
                "leader",
                self.repo.assign_leader(project_id, candidate_id),
            ),
            ProjectRole::Collaborator => {
                return Err(RoleServiceError::Repo(RoleRepoError::InvalidData(
                    "collaborator is not a lead role".to_string(),
                )))
            }
        };

        match outcome {
            Ok(repointed) => {
                info!(
                    "event=role_assign module=service status=ok role={} project_id={} candidate_id={} repointed={} duration_ms={}",
                    role_name,
                    project_id,
                    candidate_id,
                    repointed,
                    started_at.elapsed().as_millis()
                );
                Ok(repointed)
            }
            Err(RoleRepoError::RoleAlreadyHeld {
                project_id,
                role,
                incumbent_id,
                incumbent_name,
            }) => {
                warn!(
                    "event=role_assign module=service status=conflict role={} project_id={} candidate_id={} incumbent_id={} duration_ms={}",
                    role_name,
                    project_id,
                    candidate_id,
                    incumbent_id,
                    started_at.elapsed().as_millis()
                );
                Err(RoleServiceError::RoleConflict {
                    project_id,
                    role,
                    incumbent_id,
                    incumbent_name,
                })
            }
            Err(err) => {
                error!(
                    "event=role_assign module=service status=error role={} project_id={} candidate_id={} duration_ms={} error={}",
                    role_name,
                    project_id,
                    candidate_id,
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err.into())
            }
        }
    }
}
