//! Project/role store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide persistence APIs for projects and project-role assignments.
//! - Own the transactional role-assignment cascades that keep employee
//!   manager/leader pointers consistent with the role table.
//!
//! # Invariants
//! - Per project, at most one active MANAGER and one active LEADER
//!   assignment exist; the in-transaction check plus the partial unique
//!   indexes enforce this even under racing writers.
//! - Check, insert and cascade commit or roll back as one IMMEDIATE
//!   transaction; no partially re-pointed roster is ever visible.
//! - Roster rescans are bounded by `ROSTER_RESCAN_LIMIT`.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::employee::EmployeeId;
use crate::model::project::{Project, ProjectId, ProjectRole};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Upper bound on the collaborator roster one cascade will rescan.
/// An adversarially large project fails cleanly instead of stalling the
/// write lock.
pub const ROSTER_RESCAN_LIMIT: usize = 5_000;

pub type RoleRepoResult<T> = Result<T, RoleRepoError>;

/// Errors from project/role repository operations.
#[derive(Debug)]
pub enum RoleRepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Target project does not exist or is inactive.
    ProjectNotFound(ProjectId),
    /// Target employee does not exist or is inactive.
    EmployeeNotFound(EmployeeId),
    /// The project already has an active holder of this role.
    RoleAlreadyHeld {
        project_id: ProjectId,
        role: ProjectRole,
        incumbent_id: EmployeeId,
        incumbent_name: String,
    },
    /// The collaborator roster exceeds the rescan bound.
    RosterTooLarge {
        project_id: ProjectId,
        limit: usize,
    },
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
}

impl Display for RoleRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::ProjectNotFound(id) => write!(f, "project not found: {id}"),
            Self::EmployeeNotFound(id) => write!(f, "employee not found: {id}"),
            Self::RoleAlreadyHeld {
                project_id,
                role,
                incumbent_name,
                ..
            } => write!(
                f,
                "project {project_id} already has an active {} ({incumbent_name})",
                project_role_to_db(*role)
            ),
            Self::RosterTooLarge { project_id, limit } => write!(
                f,
                "project {project_id} roster exceeds rescan limit of {limit} collaborators"
            ),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "role repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::InvalidData(message) => write!(f, "invalid role data: {message}"),
        }
    }
}

impl Error for RoleRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RoleRepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RoleRepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for the project/role store.
pub trait RoleRepository {
    /// Creates one project and returns its stable id.
    fn create_project(&self, project: &Project) -> RoleRepoResult<ProjectId>;
    /// Loads one project by id, regardless of active state.
    fn get_project(&self, id: ProjectId) -> RoleRepoResult<Option<Project>>;
    /// Finds the employee holding an active assignment of `role` on the
    /// project, if any. Assignment-level: the employee's own active flag
    /// is not consulted here.
    fn find_active_role_holder(
        &self,
        project_id: ProjectId,
        role: ProjectRole,
    ) -> RoleRepoResult<Option<EmployeeId>>;
    /// Lists the project's active collaborator roster (active employees
    /// holding an active COLLABORATOR assignment).
    fn list_active_collaborators(&self, project_id: ProjectId) -> RoleRepoResult<Vec<EmployeeId>>;
    /// Assigns the project manager and re-points the roster's stale
    /// manager pointers. Returns the number of re-pointed collaborators.
    fn assign_manager(
        &self,
        project_id: ProjectId,
        candidate_id: EmployeeId,
    ) -> RoleRepoResult<usize>;
    /// Assigns the project leader, writes the project's canonical
    /// `leader_id`, and re-points stale leader pointers. Returns the
    /// number of re-pointed collaborators.
    fn assign_leader(
        &self,
        project_id: ProjectId,
        candidate_id: EmployeeId,
    ) -> RoleRepoResult<usize>;
    /// Idempotently adds one collaborator to the project and points the
    /// joiner at the project's current manager/leader. Returns whether a
    /// new assignment row was created.
    fn join_collaborator(
        &self,
        employee_id: EmployeeId,
        project_id: ProjectId,
    ) -> RoleRepoResult<bool>;
}

/// SQLite-backed project/role store.
pub struct SqliteRoleRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRoleRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    ///
    /// The uniqueness indexes land in the final migration, so the schema
    /// version gate is what makes the conflict backstop trustworthy.
    pub fn try_new(conn: &'conn Connection) -> RoleRepoResult<Self> {
        ensure_role_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl RoleRepository for SqliteRoleRepository<'_> {
    fn create_project(&self, project: &Project) -> RoleRepoResult<ProjectId> {
        self.conn.execute(
            "INSERT INTO projects (id, name, leader_id, is_active)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                project.id.to_string(),
                project.name.as_str(),
                project.leader_id.map(|id| id.to_string()),
                if project.is_active { 1 } else { 0 },
            ],
        )?;

        Ok(project.id)
    }

    fn get_project(&self, id: ProjectId) -> RoleRepoResult<Option<Project>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, leader_id, is_active
             FROM projects
             WHERE id = ?1;",
        )?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            let id_text: String = row.get("id")?;
            let leader_id = row
                .get::<_, Option<String>>("leader_id")?
                .map(|value| parse_uuid(&value, "projects.leader_id"))
                .transpose()?;
            return Ok(Some(Project {
                id: parse_uuid(&id_text, "projects.id")?,
                name: row.get("name")?,
                leader_id,
                is_active: row.get::<_, i64>("is_active")? == 1,
            }));
        }

        Ok(None)
    }

    fn find_active_role_holder(
        &self,
        project_id: ProjectId,
        role: ProjectRole,
    ) -> RoleRepoResult<Option<EmployeeId>> {
        Ok(active_assignment_holder(self.conn, project_id, role)?.map(|(id, _)| id))
    }

    fn list_active_collaborators(&self, project_id: ProjectId) -> RoleRepoResult<Vec<EmployeeId>> {
        let roster = collaborator_roster(self.conn, project_id, "manager_id")?;
        Ok(roster.into_iter().map(|member| member.employee_id).collect())
    }

    fn assign_manager(
        &self,
        project_id: ProjectId,
        candidate_id: EmployeeId,
    ) -> RoleRepoResult<usize> {
        self.assign_lead_role(project_id, candidate_id, ProjectRole::Manager)
    }

    fn assign_leader(
        &self,
        project_id: ProjectId,
        candidate_id: EmployeeId,
    ) -> RoleRepoResult<usize> {
        self.assign_lead_role(project_id, candidate_id, ProjectRole::Leader)
    }

    fn join_collaborator(
        &self,
        employee_id: EmployeeId,
        project_id: ProjectId,
    ) -> RoleRepoResult<bool> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        ensure_active_project(&tx, project_id)?;
        ensure_active_employee(&tx, employee_id)?;

        let created = if has_active_assignment(&tx, employee_id, project_id, ProjectRole::Collaborator)? {
            false
        } else {
            insert_assignment(&tx, employee_id, project_id, ProjectRole::Collaborator)?;
            true
        };

        // Single-entity version of the cascade rescan: adopt whoever
        // currently and effectively holds each lead role.
        if let Some(manager_id) = effective_role_holder(&tx, project_id, ProjectRole::Manager)? {
            if manager_id != employee_id {
                repoint_employee(&tx, employee_id, "manager_id", manager_id)?;
            }
        }
        if let Some(leader_id) = effective_role_holder(&tx, project_id, ProjectRole::Leader)? {
            if leader_id != employee_id {
                repoint_employee(&tx, employee_id, "leader_id", leader_id)?;
            }
        }

        tx.commit()?;
        Ok(created)
    }
}

impl SqliteRoleRepository<'_> {
    /// Shared manager/leader assignment path: conflict check, insert and
    /// full roster rescan in one transaction.
    fn assign_lead_role(
        &self,
        project_id: ProjectId,
        candidate_id: EmployeeId,
        role: ProjectRole,
    ) -> RoleRepoResult<usize> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        ensure_active_project(&tx, project_id)?;
        ensure_active_employee(&tx, candidate_id)?;

        if let Some((incumbent_id, incumbent_name)) =
            active_assignment_holder(&tx, project_id, role)?
        {
            return Err(RoleRepoError::RoleAlreadyHeld {
                project_id,
                role,
                incumbent_id,
                incumbent_name,
            });
        }

        insert_assignment(&tx, candidate_id, project_id, role)?;

        let pointer_column = match role {
            ProjectRole::Manager => "manager_id",
            ProjectRole::Leader => "leader_id",
            ProjectRole::Collaborator => {
                return Err(RoleRepoError::InvalidData(
                    "collaborator is not a lead role".to_string(),
                ));
            }
        };

        if role == ProjectRole::Leader {
            // The project row is the canonical leader pointer, unlike the
            // purely role-table-derived manager.
            tx.execute(
                "UPDATE projects
                 SET leader_id = ?2,
                     updated_at = (strftime('%s', 'now') * 1000)
                 WHERE id = ?1;",
                params![project_id.to_string(), candidate_id.to_string()],
            )?;
        }

        // Full rescan of the active collaborator roster, not an
        // incremental diff: members left stale by earlier corruption are
        // healed on every assignment.
        let roster = collaborator_roster(&tx, project_id, pointer_column)?;
        let mut repointed = 0usize;
        for member in roster {
            if member.employee_id == candidate_id {
                continue;
            }
            let stale = match member.pointer {
                None => true,
                Some(current) => !is_effective_role_holder(&tx, current, project_id, role)?,
            };
            if stale {
                repoint_employee(&tx, member.employee_id, pointer_column, candidate_id)?;
                repointed += 1;
            }
        }

        tx.commit()?;
        Ok(repointed)
    }
}

struct RosterMember {
    employee_id: EmployeeId,
    /// Current manager or leader pointer, depending on the cascade.
    pointer: Option<EmployeeId>,
}

fn ensure_active_project(conn: &Connection, project_id: ProjectId) -> RoleRepoResult<()> {
    let is_active: Option<i64> = conn
        .query_row(
            "SELECT is_active FROM projects WHERE id = ?1;",
            [project_id.to_string()],
            |row| row.get(0),
        )
        .optional()?;

    match is_active {
        Some(1) => Ok(()),
        _ => Err(RoleRepoError::ProjectNotFound(project_id)),
    }
}

fn ensure_active_employee(conn: &Connection, employee_id: EmployeeId) -> RoleRepoResult<()> {
    let is_active: Option<i64> = conn
        .query_row(
            "SELECT is_active FROM employees WHERE id = ?1;",
            [employee_id.to_string()],
            |row| row.get(0),
        )
        .optional()?;

    match is_active {
        Some(1) => Ok(()),
        _ => Err(RoleRepoError::EmployeeNotFound(employee_id)),
    }
}

/// Active assignment holder with display name, for conflict reporting.
fn active_assignment_holder(
    conn: &Connection,
    project_id: ProjectId,
    role: ProjectRole,
) -> RoleRepoResult<Option<(EmployeeId, String)>> {
    let row: Option<(String, String)> = conn
        .query_row(
            "SELECT pr.employee_id, e.full_name
             FROM project_roles pr
             INNER JOIN employees e ON e.id = pr.employee_id
             WHERE pr.project_id = ?1
               AND pr.role = ?2
               AND pr.is_active = 1;",
            params![project_id.to_string(), project_role_to_db(role)],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    match row {
        None => Ok(None),
        Some((id_text, full_name)) => Ok(Some((
            parse_uuid(&id_text, "project_roles.employee_id")?,
            full_name,
        ))),
    }
}

/// Role holder that is also an active employee; what cascade pointers
/// and joiners are allowed to adopt.
fn effective_role_holder(
    conn: &Connection,
    project_id: ProjectId,
    role: ProjectRole,
) -> RoleRepoResult<Option<EmployeeId>> {
    let id_text: Option<String> = conn
        .query_row(
            "SELECT pr.employee_id
             FROM project_roles pr
             INNER JOIN employees e ON e.id = pr.employee_id
             WHERE pr.project_id = ?1
               AND pr.role = ?2
               AND pr.is_active = 1
               AND e.is_active = 1;",
            params![project_id.to_string(), project_role_to_db(role)],
            |row| row.get(0),
        )
        .optional()?;

    id_text
        .map(|value| parse_uuid(&value, "project_roles.employee_id"))
        .transpose()
}

fn is_effective_role_holder(
    conn: &Connection,
    employee_id: EmployeeId,
    project_id: ProjectId,
    role: ProjectRole,
) -> RoleRepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM project_roles pr
            INNER JOIN employees e ON e.id = pr.employee_id
            WHERE pr.employee_id = ?1
              AND pr.project_id = ?2
              AND pr.role = ?3
              AND pr.is_active = 1
              AND e.is_active = 1
        );",
        params![
            employee_id.to_string(),
            project_id.to_string(),
            project_role_to_db(role)
        ],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn has_active_assignment(
    conn: &Connection,
    employee_id: EmployeeId,
    project_id: ProjectId,
    role: ProjectRole,
) -> RoleRepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM project_roles
            WHERE employee_id = ?1
              AND project_id = ?2
              AND role = ?3
              AND is_active = 1
        );",
        params![
            employee_id.to_string(),
            project_id.to_string(),
            project_role_to_db(role)
        ],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn insert_assignment(
    conn: &Connection,
    employee_id: EmployeeId,
    project_id: ProjectId,
    role: ProjectRole,
) -> RoleRepoResult<()> {
    let result = conn.execute(
        "INSERT INTO project_roles (employee_id, project_id, role, is_active)
         VALUES (?1, ?2, ?3, 1);",
        params![
            employee_id.to_string(),
            project_id.to_string(),
            project_role_to_db(role)
        ],
    );

    match result {
        Ok(_) => Ok(()),
        // The partial unique index is the backstop for writers that
        // raced past the in-transaction check; surface the same
        // conflict they would have seen.
        Err(rusqlite::Error::SqliteFailure(ffi_err, message))
            if ffi_err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            if let Some((incumbent_id, incumbent_name)) =
                active_assignment_holder(conn, project_id, role)?
            {
                return Err(RoleRepoError::RoleAlreadyHeld {
                    project_id,
                    role,
                    incumbent_id,
                    incumbent_name,
                });
            }
            Err(rusqlite::Error::SqliteFailure(ffi_err, message).into())
        }
        Err(err) => Err(err.into()),
    }
}

fn collaborator_roster(
    conn: &Connection,
    project_id: ProjectId,
    pointer_column: &'static str,
) -> RoleRepoResult<Vec<RosterMember>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT e.id, e.{pointer_column}
         FROM project_roles pr
         INNER JOIN employees e ON e.id = pr.employee_id
         WHERE pr.project_id = ?1
           AND pr.role = 'collaborator'
           AND pr.is_active = 1
           AND e.is_active = 1
         ORDER BY e.id ASC
         LIMIT {};",
        ROSTER_RESCAN_LIMIT + 1
    ))?;

    let mut rows = stmt.query([project_id.to_string()])?;
    let mut roster = Vec::new();
    while let Some(row) = rows.next()? {
        let id_text: String = row.get(0)?;
        let pointer = row
            .get::<_, Option<String>>(1)?
            .map(|value| parse_uuid(&value, pointer_column))
            .transpose()?;
        roster.push(RosterMember {
            employee_id: parse_uuid(&id_text, "employees.id")?,
            pointer,
        });
    }

    if roster.len() > ROSTER_RESCAN_LIMIT {
        return Err(RoleRepoError::RosterTooLarge {
            project_id,
            limit: ROSTER_RESCAN_LIMIT,
        });
    }

    Ok(roster)
}

fn repoint_employee(
    conn: &Connection,
    employee_id: EmployeeId,
    pointer_column: &'static str,
    target_id: EmployeeId,
) -> RoleRepoResult<()> {
    conn.execute(
        &format!(
            "UPDATE employees
             SET {pointer_column} = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;"
        ),
        params![employee_id.to_string(), target_id.to_string()],
    )?;
    Ok(())
}

pub(crate) fn project_role_to_db(role: ProjectRole) -> &'static str {
    match role {
        ProjectRole::Collaborator => "collaborator",
        ProjectRole::Manager => "manager",
        ProjectRole::Leader => "leader",
    }
}

fn parse_uuid(value: &str, column: &'static str) -> RoleRepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RoleRepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

fn ensure_role_connection_ready(conn: &Connection) -> RoleRepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RoleRepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    Ok(())
}
