//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for the employee
//!   directory, the project/role store and the evaluation store.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Multi-entity role mutations run inside one IMMEDIATE transaction;
//!   a failure rolls back the whole cascade.
//! - Read paths reject invalid persisted state (`InvalidData`) instead
//!   of masking it.
//! - Evaluation access is strictly read-only.

pub mod employee_repo;
pub mod evaluation_repo;
pub mod role_repo;
