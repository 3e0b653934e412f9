//! Domain models for the role-consistency and talent-scoring engine.
//!
//! # Responsibility
//! - Define canonical records for employees, projects, role assignments
//!   and evaluation data.
//! - Define derived read models for the talent matrix.
//!
//! # Invariants
//! - Ids are stable and never reused.
//! - All evaluation scores live in `[1, 5]`.

pub mod employee;
pub mod evaluation;
pub mod matrix;
pub mod project;
