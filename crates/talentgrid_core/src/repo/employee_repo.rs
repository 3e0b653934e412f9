//! Employee directory contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide directory CRUD and org-graph queries over `employees`.
//! - Derive reciprocal role sets (direct reports, direct leadership)
//!   from the pointer columns by query.
//!
//! # Invariants
//! - `manager_id` / `leader_id` columns are written only by the role
//!   repository cascade, never through this repository.
//! - Derived sets contain active employees only and are deterministic
//!   (`full_name ASC, id ASC`).

use crate::db::DbError;
use crate::model::employee::{Employee, EmployeeId, OrgRole};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const EMPLOYEE_SELECT_SQL: &str = "SELECT
    id,
    full_name,
    seniority,
    business_unit,
    org_role,
    is_active,
    manager_id,
    leader_id,
    mentor_id
FROM employees";

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for directory and evaluation access.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    EmployeeNotFound(EmployeeId),
    InvalidData(String),
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::EmployeeNotFound(id) => write!(f, "employee not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "repository requires column `{column}` in table `{table}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for the employee directory.
pub trait EmployeeRepository {
    /// Creates one employee and returns its stable id.
    fn create_employee(&self, employee: &Employee) -> RepoResult<EmployeeId>;
    /// Loads one employee by id, regardless of active state.
    fn get_employee(&self, id: EmployeeId) -> RepoResult<Option<Employee>>;
    /// Lists active employees that participate in evaluation cycles
    /// (org role collaborator, manager or committee).
    fn list_rated_active(&self) -> RepoResult<Vec<Employee>>;
    /// Derived set: active employees whose `manager_id` points at `id`.
    fn direct_reports(&self, id: EmployeeId) -> RepoResult<Vec<EmployeeId>>;
    /// Derived set: active employees whose `leader_id` points at `id`.
    fn direct_leadership(&self, id: EmployeeId) -> RepoResult<Vec<EmployeeId>>;
    /// Activates or deactivates one employee.
    fn set_active(&self, id: EmployeeId, is_active: bool) -> RepoResult<()>;
}

/// SQLite-backed employee directory.
pub struct SqliteEmployeeRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEmployeeRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_employee_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl EmployeeRepository for SqliteEmployeeRepository<'_> {
    fn create_employee(&self, employee: &Employee) -> RepoResult<EmployeeId> {
        self.conn.execute(
            "INSERT INTO employees (
                id,
                full_name,
                seniority,
                business_unit,
                org_role,
                is_active,
                manager_id,
                leader_id,
                mentor_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                employee.id.to_string(),
                employee.full_name.as_str(),
                employee.seniority.as_str(),
                employee.business_unit.as_str(),
                org_role_to_db(employee.org_role),
                bool_to_int(employee.is_active),
                employee.manager_id.map(|id| id.to_string()),
                employee.leader_id.map(|id| id.to_string()),
                employee.mentor_id.map(|id| id.to_string()),
            ],
        )?;

        Ok(employee.id)
    }

    fn get_employee(&self, id: EmployeeId) -> RepoResult<Option<Employee>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{EMPLOYEE_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_employee_row(row)?));
        }

        Ok(None)
    }

    fn list_rated_active(&self) -> RepoResult<Vec<Employee>> {
        let mut stmt = self.conn.prepare(&format!(
            "{EMPLOYEE_SELECT_SQL}
             WHERE is_active = 1
               AND org_role IN ('collaborator', 'manager', 'committee')
             ORDER BY full_name ASC, id ASC;"
        ))?;

        let mut rows = stmt.query([])?;
        let mut employees = Vec::new();
        while let Some(row) = rows.next()? {
            employees.push(parse_employee_row(row)?);
        }

        Ok(employees)
    }

    fn direct_reports(&self, id: EmployeeId) -> RepoResult<Vec<EmployeeId>> {
        pointer_back_references(self.conn, "manager_id", id)
    }

    fn direct_leadership(&self, id: EmployeeId) -> RepoResult<Vec<EmployeeId>> {
        pointer_back_references(self.conn, "leader_id", id)
    }

    fn set_active(&self, id: EmployeeId, is_active: bool) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE employees
             SET is_active = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![id.to_string(), bool_to_int(is_active)],
        )?;

        if changed == 0 {
            return Err(RepoError::EmployeeNotFound(id));
        }

        Ok(())
    }
}

fn pointer_back_references(
    conn: &Connection,
    pointer_column: &'static str,
    id: EmployeeId,
) -> RepoResult<Vec<EmployeeId>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT id
         FROM employees
         WHERE {pointer_column} = ?1
           AND is_active = 1
         ORDER BY full_name ASC, id ASC;"
    ))?;

    let mut rows = stmt.query([id.to_string()])?;
    let mut ids = Vec::new();
    while let Some(row) = rows.next()? {
        let value: String = row.get(0)?;
        ids.push(parse_uuid(&value, "employees.id")?);
    }
    Ok(ids)
}

pub(crate) fn parse_employee_row(row: &Row<'_>) -> RepoResult<Employee> {
    let id_text: String = row.get("id")?;
    let id = parse_uuid(&id_text, "employees.id")?;

    let org_role_text: String = row.get("org_role")?;
    let org_role = parse_org_role(&org_role_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid org role `{org_role_text}` in employees.org_role"
        ))
    })?;

    let manager_id = row
        .get::<_, Option<String>>("manager_id")?
        .map(|value| parse_uuid(&value, "employees.manager_id"))
        .transpose()?;
    let leader_id = row
        .get::<_, Option<String>>("leader_id")?
        .map(|value| parse_uuid(&value, "employees.leader_id"))
        .transpose()?;
    let mentor_id = row
        .get::<_, Option<String>>("mentor_id")?
        .map(|value| parse_uuid(&value, "employees.mentor_id"))
        .transpose()?;

    Ok(Employee {
        id,
        full_name: row.get("full_name")?,
        seniority: row.get("seniority")?,
        business_unit: row.get("business_unit")?,
        org_role,
        is_active: int_to_bool(row.get::<_, i64>("is_active")?, "employees.is_active")?,
        manager_id,
        leader_id,
        mentor_id,
    })
}

pub(crate) fn org_role_to_db(role: OrgRole) -> &'static str {
    match role {
        OrgRole::Collaborator => "collaborator",
        OrgRole::Manager => "manager",
        OrgRole::Committee => "committee",
        OrgRole::Admin => "admin",
    }
}

pub(crate) fn parse_org_role(value: &str) -> Option<OrgRole> {
    match value {
        "collaborator" => Some(OrgRole::Collaborator),
        "manager" => Some(OrgRole::Manager),
        "committee" => Some(OrgRole::Committee),
        "admin" => Some(OrgRole::Admin),
        _ => None,
    }
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

pub(crate) fn int_to_bool(value: i64, column: &'static str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}

pub(crate) fn parse_uuid(value: &str, column: &'static str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

fn ensure_employee_connection_ready(conn: &Connection) -> RepoResult<()> {
    if !table_exists(conn, "employees")? {
        return Err(RepoError::MissingRequiredTable("employees"));
    }

    for column in [
        "id",
        "full_name",
        "seniority",
        "business_unit",
        "org_role",
        "is_active",
        "manager_id",
        "leader_id",
        "mentor_id",
    ] {
        if !table_has_column(conn, "employees", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "employees",
                column,
            });
        }
    }

    Ok(())
}

pub(crate) fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

pub(crate) fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
