use talentgrid_core::db::open_db_in_memory;
use talentgrid_core::{
    Employee, EmployeeRepository, Project, ProjectRole, RoleRepository, RoleService,
    RoleServiceError, SqliteEmployeeRepository, SqliteRoleRepository,
};
use uuid::Uuid;

fn setup() -> rusqlite::Connection {
    open_db_in_memory().unwrap()
}

fn seed_employee(conn: &rusqlite::Connection, name: &str) -> Employee {
    let employee = Employee::new(name);
    SqliteEmployeeRepository::try_new(conn)
        .unwrap()
        .create_employee(&employee)
        .unwrap();
    employee
}

fn seed_project(conn: &rusqlite::Connection, name: &str) -> Project {
    let project = Project::new(name);
    SqliteRoleRepository::try_new(conn)
        .unwrap()
        .create_project(&project)
        .unwrap();
    project
}

fn role_service(conn: &rusqlite::Connection) -> RoleService<SqliteRoleRepository<'_>> {
    RoleService::new(SqliteRoleRepository::try_new(conn).unwrap())
}

fn join(conn: &rusqlite::Connection, employee: &Employee, project: &Project) {
    role_service(conn)
        .join_collaborator(employee.id, project.id)
        .unwrap();
}

fn manager_pointer(conn: &rusqlite::Connection, id: Uuid) -> Option<Uuid> {
    let value: Option<String> = conn
        .query_row(
            "SELECT manager_id FROM employees WHERE id = ?1;",
            [id.to_string()],
            |row| row.get(0),
        )
        .unwrap();
    value.map(|text| Uuid::parse_str(&text).unwrap())
}

fn leader_pointer(conn: &rusqlite::Connection, id: Uuid) -> Option<Uuid> {
    let value: Option<String> = conn
        .query_row(
            "SELECT leader_id FROM employees WHERE id = ?1;",
            [id.to_string()],
            |row| row.get(0),
        )
        .unwrap();
    value.map(|text| Uuid::parse_str(&text).unwrap())
}

#[test]
fn assign_manager_repoints_unmanaged_roster() {
    let conn = setup();
    let project = seed_project(&conn, "Apollo");
    let candidate = seed_employee(&conn, "Morgan Reis");
    let member_a = seed_employee(&conn, "Alice Prado");
    let member_b = seed_employee(&conn, "Bruno Costa");
    let member_c = seed_employee(&conn, "Carla Souza");
    for member in [&member_a, &member_b, &member_c] {
        join(&conn, member, &project);
    }

    let repointed = role_service(&conn)
        .assign_manager(project.id, candidate.id)
        .unwrap();
    assert_eq!(repointed, 3);

    for member in [&member_a, &member_b, &member_c] {
        assert_eq!(manager_pointer(&conn, member.id), Some(candidate.id));
    }

    let employee_repo = SqliteEmployeeRepository::try_new(&conn).unwrap();
    let reports = employee_repo.direct_reports(candidate.id).unwrap();
    assert_eq!(reports.len(), 3);
    for member in [&member_a, &member_b, &member_c] {
        assert!(reports.contains(&member.id));
    }
}

#[test]
fn assign_manager_conflict_names_incumbent() {
    let conn = setup();
    let project = seed_project(&conn, "Apollo");
    let incumbent = seed_employee(&conn, "Morgan Reis");
    let challenger = seed_employee(&conn, "Dana Lima");

    let service = role_service(&conn);
    service.assign_manager(project.id, incumbent.id).unwrap();

    let err = service.assign_manager(project.id, challenger.id).unwrap_err();
    assert!(matches!(
        err,
        RoleServiceError::RoleConflict {
            project_id,
            role: ProjectRole::Manager,
            incumbent_id,
            ref incumbent_name,
        } if project_id == project.id
            && incumbent_id == incumbent.id
            && incumbent_name.as_str() == "Morgan Reis"
    ));

    // The incumbent is still the only active manager.
    let repo = SqliteRoleRepository::try_new(&conn).unwrap();
    assert_eq!(
        repo.find_active_role_holder(project.id, ProjectRole::Manager)
            .unwrap(),
        Some(incumbent.id)
    );
}

#[test]
fn reassigning_the_same_manager_also_conflicts() {
    let conn = setup();
    let project = seed_project(&conn, "Apollo");
    let candidate = seed_employee(&conn, "Morgan Reis");

    let service = role_service(&conn);
    service.assign_manager(project.id, candidate.id).unwrap();

    // There is no replace/demote path; even the incumbent themselves
    // cannot be assigned twice.
    let err = service.assign_manager(project.id, candidate.id).unwrap_err();
    assert!(matches!(
        err,
        RoleServiceError::RoleConflict { incumbent_id, .. } if incumbent_id == candidate.id
    ));
}

#[test]
fn assign_leader_is_symmetric_and_sets_canonical_pointer() {
    let conn = setup();
    let project = seed_project(&conn, "Apollo");
    let leader = seed_employee(&conn, "Lia Martins");
    let member = seed_employee(&conn, "Alice Prado");
    join(&conn, &member, &project);

    let service = role_service(&conn);
    service.assign_leader(project.id, leader.id).unwrap();

    assert_eq!(leader_pointer(&conn, member.id), Some(leader.id));
    assert_eq!(manager_pointer(&conn, member.id), None);

    let repo = SqliteRoleRepository::try_new(&conn).unwrap();
    let stored = repo.get_project(project.id).unwrap().unwrap();
    assert_eq!(stored.leader_id, Some(leader.id));

    let employee_repo = SqliteEmployeeRepository::try_new(&conn).unwrap();
    let leadership = employee_repo.direct_leadership(leader.id).unwrap();
    assert_eq!(leadership, vec![member.id]);

    let err = service
        .assign_leader(project.id, seed_employee(&conn, "Other").id)
        .unwrap_err();
    assert!(matches!(
        err,
        RoleServiceError::RoleConflict {
            role: ProjectRole::Leader,
            incumbent_id,
            ..
        } if incumbent_id == leader.id
    ));
}

#[test]
fn join_collaborator_is_idempotent() {
    let conn = setup();
    let project = seed_project(&conn, "Apollo");
    let manager = seed_employee(&conn, "Morgan Reis");
    let member = seed_employee(&conn, "Alice Prado");

    let service = role_service(&conn);
    service.assign_manager(project.id, manager.id).unwrap();
    service.join_collaborator(member.id, project.id).unwrap();
    service.join_collaborator(member.id, project.id).unwrap();

    let role_rows: i64 = conn
        .query_row(
            "SELECT COUNT(*)
             FROM project_roles
             WHERE employee_id = ?1
               AND project_id = ?2
               AND role = 'collaborator'
               AND is_active = 1;",
            [member.id.to_string(), project.id.to_string()],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(role_rows, 1);

    let employee_repo = SqliteEmployeeRepository::try_new(&conn).unwrap();
    let reports = employee_repo.direct_reports(manager.id).unwrap();
    assert_eq!(reports, vec![member.id]);
}

#[test]
fn join_collaborator_adopts_current_manager_and_leader() {
    let conn = setup();
    let project = seed_project(&conn, "Apollo");
    let manager = seed_employee(&conn, "Morgan Reis");
    let leader = seed_employee(&conn, "Lia Martins");
    let joiner = seed_employee(&conn, "Alice Prado");

    let service = role_service(&conn);
    service.assign_manager(project.id, manager.id).unwrap();
    service.assign_leader(project.id, leader.id).unwrap();
    service.join_collaborator(joiner.id, project.id).unwrap();

    assert_eq!(manager_pointer(&conn, joiner.id), Some(manager.id));
    assert_eq!(leader_pointer(&conn, joiner.id), Some(leader.id));
}

#[test]
fn join_with_no_leads_leaves_pointers_untouched() {
    let conn = setup();
    let project = seed_project(&conn, "Apollo");
    let joiner = seed_employee(&conn, "Alice Prado");

    role_service(&conn)
        .join_collaborator(joiner.id, project.id)
        .unwrap();

    assert_eq!(manager_pointer(&conn, joiner.id), None);
    assert_eq!(leader_pointer(&conn, joiner.id), None);
}

#[test]
fn cascade_heals_stale_and_inactive_manager_pointers() {
    let conn = setup();
    let project = seed_project(&conn, "Apollo");
    let other_project = seed_project(&conn, "Hermes");
    let candidate = seed_employee(&conn, "Morgan Reis");
    let departed = seed_employee(&conn, "Gone Manager");
    let foreign_manager = seed_employee(&conn, "Foreign Manager");

    // Foreign manager legitimately manages another project.
    role_service(&conn)
        .assign_manager(other_project.id, foreign_manager.id)
        .unwrap();

    // One member points at a now-inactive employee, one points at a
    // manager of a different project: both pointers are stale here.
    let mut member_a = Employee::new("Alice Prado");
    member_a.manager_id = Some(departed.id);
    let mut member_b = Employee::new("Bruno Costa");
    member_b.manager_id = Some(foreign_manager.id);
    let employee_repo = SqliteEmployeeRepository::try_new(&conn).unwrap();
    employee_repo.create_employee(&member_a).unwrap();
    employee_repo.create_employee(&member_b).unwrap();
    employee_repo.set_active(departed.id, false).unwrap();

    join(&conn, &member_a, &project);
    join(&conn, &member_b, &project);

    let repointed = role_service(&conn)
        .assign_manager(project.id, candidate.id)
        .unwrap();
    assert_eq!(repointed, 2);
    assert_eq!(manager_pointer(&conn, member_a.id), Some(candidate.id));
    assert_eq!(manager_pointer(&conn, member_b.id), Some(candidate.id));
}

#[test]
fn leader_cascade_does_not_disturb_fresh_manager_pointers() {
    let conn = setup();
    let project = seed_project(&conn, "Apollo");
    let manager = seed_employee(&conn, "Morgan Reis");
    let leader = seed_employee(&conn, "Lia Martins");
    let member = seed_employee(&conn, "Alice Prado");
    join(&conn, &member, &project);

    let service = role_service(&conn);
    service.assign_manager(project.id, manager.id).unwrap();
    service.assign_leader(project.id, leader.id).unwrap();

    assert_eq!(manager_pointer(&conn, member.id), Some(manager.id));
    assert_eq!(leader_pointer(&conn, member.id), Some(leader.id));
}

#[test]
fn cascade_rolls_back_cleanly_on_forced_failure() {
    let conn = setup();
    let project = seed_project(&conn, "Apollo");
    let candidate = seed_employee(&conn, "Morgan Reis");
    let member_a = seed_employee(&conn, "Alice Prado");
    let member_b = seed_employee(&conn, "Bruno Costa");
    join(&conn, &member_a, &project);
    join(&conn, &member_b, &project);

    conn.execute_batch(&format!(
        "CREATE TRIGGER employees_fail_repoint_test
         BEFORE UPDATE OF manager_id ON employees
         WHEN NEW.id = '{}'
         BEGIN
             SELECT RAISE(ABORT, 'forced repoint failure');
         END;",
        member_b.id
    ))
    .unwrap();

    let result = role_service(&conn).assign_manager(project.id, candidate.id);
    assert!(result.is_err());

    // No partial cascade: neither the role row nor any re-point survived.
    let repo = SqliteRoleRepository::try_new(&conn).unwrap();
    assert_eq!(
        repo.find_active_role_holder(project.id, ProjectRole::Manager)
            .unwrap(),
        None
    );
    assert_eq!(manager_pointer(&conn, member_a.id), None);
    assert_eq!(manager_pointer(&conn, member_b.id), None);
}

#[test]
fn assign_manager_rejects_unknown_or_inactive_targets() {
    let conn = setup();
    let project = seed_project(&conn, "Apollo");
    let candidate = seed_employee(&conn, "Morgan Reis");
    let unknown = Uuid::new_v4();

    let service = role_service(&conn);

    let err = service.assign_manager(unknown, candidate.id).unwrap_err();
    assert!(matches!(
        err,
        RoleServiceError::ProjectNotFound(id) if id == unknown
    ));

    let err = service.assign_manager(project.id, unknown).unwrap_err();
    assert!(matches!(
        err,
        RoleServiceError::EmployeeNotFound(id) if id == unknown
    ));

    let employee_repo = SqliteEmployeeRepository::try_new(&conn).unwrap();
    employee_repo.set_active(candidate.id, false).unwrap();
    let err = service.assign_manager(project.id, candidate.id).unwrap_err();
    assert!(matches!(
        err,
        RoleServiceError::EmployeeNotFound(id) if id == candidate.id
    ));
}

#[test]
fn candidate_in_own_roster_is_not_self_pointed() {
    let conn = setup();
    let project = seed_project(&conn, "Apollo");
    let candidate = seed_employee(&conn, "Morgan Reis");
    join(&conn, &candidate, &project);

    role_service(&conn)
        .assign_manager(project.id, candidate.id)
        .unwrap();

    assert_eq!(manager_pointer(&conn, candidate.id), None);
}
