//! Record store abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the student record store contract.
//! - Isolate SQLite query details from controller orchestration.
//!
//! # Invariants
//! - Store writes enforce `NewStudent::validate()` before persistence.
//! - Store APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod student_repo;
