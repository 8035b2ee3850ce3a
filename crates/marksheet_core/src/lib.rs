//! Core domain logic for the student marksheet.
//! This crate is the single source of truth for record invariants.

pub mod config;
pub mod context;
pub mod db;
pub mod export;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::AppConfig;
pub use context::AppContext;
pub use export::{write_workbook, ExportError, ExportResult, ExportSummary, EXPORT_HEADERS};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::student::{
    compute_percentage, compute_total, Mark, NewStudent, StudentId, StudentRecord,
    StudentSummary, StudentValidationError, Subject, SubjectMarks, SUBJECT_COUNT,
};
pub use repo::student_repo::{
    DeleteOutcome, MatchMode, NameQuery, RepoError, RepoResult, SqliteStudentRepository,
    StudentRepository,
};
pub use service::form_controller::{
    parse_marks, parse_student_id, validate_marks, FormController, FormError, FormField,
    FormResult, MarkError, MarkErrorKind, ValidationError,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
