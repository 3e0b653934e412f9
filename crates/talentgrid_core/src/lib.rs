//! Core domain logic for TalentGrid.
//! This crate is the single source of truth for role-consistency
//! invariants and talent-matrix scoring.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod scoring;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::employee::{Employee, EmployeeId, OrgRole};
pub use model::evaluation::{
    is_valid_cycle_id, EvaluationRecord, EvaluationSource, EvaluationStatus,
};
pub use model::matrix::{MatrixCell, MatrixPosition, MatrixStats, TalentMatrix};
pub use model::project::{Project, ProjectId, ProjectRole};
pub use repo::employee_repo::{
    EmployeeRepository, RepoError, RepoResult, SqliteEmployeeRepository,
};
pub use repo::evaluation_repo::{EvaluationRepository, SqliteEvaluationRepository};
pub use repo::role_repo::{RoleRepoError, RoleRepository, SqliteRoleRepository};
pub use service::matrix_service::{MatrixService, MatrixServiceError};
pub use service::role_service::{RoleService, RoleServiceError};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
