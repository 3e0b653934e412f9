//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls and scoring algorithms into use-case
//!   level APIs.
//! - Keep callers (HTTP, CLI, jobs) decoupled from storage details.

pub mod matrix_service;
pub mod role_service;
