//! Student marksheet domain model.
//!
//! # Responsibility
//! - Define the record shapes shared by storage, controller and export.
//!
//! # Invariants
//! - Derived fields (`total`, `percentage`) come only from `SubjectMarks`.

pub mod student;
