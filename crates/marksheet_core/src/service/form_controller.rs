//! Marksheet form use-case controller.
//!
//! # Responsibility
//! - Turn raw form text into validated records and store requests.
//! - Derive `total`/`percentage` before anything reaches storage.
//! - Hand all stored records to the spreadsheet export.
//!
//! # Invariants
//! - All validation happens before any store call; a rejected request
//!   never mutates storage.
//! - Mark validation is fail-closed: one bad value rejects all five.
//! - Logs carry ids and counts only, never names or marks.

use crate::export::{write_workbook, ExportError, ExportSummary};
use crate::model::student::{
    Mark, NewStudent, StudentId, StudentRecord, StudentSummary, Subject, SubjectMarks,
    SUBJECT_COUNT,
};
use crate::repo::student_repo::{
    DeleteOutcome, MatchMode, NameQuery, RepoError, StudentRepository,
};
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::num::IntErrorKind;
use std::path::Path;

pub use crate::model::student::{compute_percentage, compute_total};

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Why a single raw mark was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkErrorKind {
    /// Blank after trimming.
    Empty,
    /// Not an integer literal.
    NotInteger(String),
    /// An integer, but outside `0..=100`.
    OutOfRange(String),
}

/// Typed mark parse failure, naming the offending subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkError {
    pub subject: Subject,
    pub kind: MarkErrorKind,
}

impl Display for MarkError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            MarkErrorKind::Empty => write!(f, "{}: value is empty", self.subject),
            MarkErrorKind::NotInteger(raw) => {
                write!(f, "{}: `{raw}` is not an integer", self.subject)
            }
            MarkErrorKind::OutOfRange(raw) => {
                write!(f, "{}: `{raw}` is outside 0..=100", self.subject)
            }
        }
    }
}

impl Error for MarkError {}

/// Form field names used in required-field diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Section,
    Mark(Subject),
}

impl Display for FormField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Name => f.write_str("name"),
            Self::Section => f.write_str("section"),
            Self::Mark(subject) => write!(f, "{subject}"),
        }
    }
}

/// User input rejected before any store call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    MissingField(FormField),
    InvalidMarks(MarkError),
    InvalidId(String),
    EmptySearch,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(_) => write!(f, "All fields are required."),
            Self::InvalidMarks(_) => write!(f, "Marks must be integers between 0-100."),
            Self::InvalidId(raw) => write!(f, "Enter a valid ID (got `{raw}`)."),
            Self::EmptySearch => write!(f, "Enter a name to search."),
        }
    }
}

impl Error for ValidationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidMarks(err) => Some(err),
            _ => None,
        }
    }
}

/// Controller error surfaced to the front end.
#[derive(Debug)]
pub enum FormError {
    Validation(ValidationError),
    NotFound(StudentId),
    Storage(RepoError),
    Export(ExportError),
    /// Write succeeded but the read-back disagrees.
    InconsistentState(&'static str),
}

impl FormError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl Display for FormError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "No record with ID {id}."),
            Self::Storage(_) => write!(f, "storage failure"),
            Self::Export(_) => write!(f, "export failure"),
            Self::InconsistentState(details) => write!(f, "inconsistent student state: {details}"),
        }
    }
}

impl Error for FormError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            // Displayed as the inner message, so the chain resumes below it.
            Self::Validation(err) => err.source(),
            Self::Storage(err) => Some(err),
            Self::Export(err) => Some(err),
            Self::NotFound(_) | Self::InconsistentState(_) => None,
        }
    }
}

impl From<ValidationError> for FormError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for FormError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            other => Self::Storage(other),
        }
    }
}

impl From<ExportError> for FormError {
    fn from(value: ExportError) -> Self {
        Self::Export(value)
    }
}

pub type FormResult<T> = Result<T, FormError>;

/// Parses one raw mark for `subject`.
pub fn parse_mark(subject: Subject, raw: &str) -> Result<Mark, MarkError> {
    let fail = |kind| MarkError { subject, kind };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(fail(MarkErrorKind::Empty));
    }

    let value = trimmed.parse::<i64>().map_err(|err| match err.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
            fail(MarkErrorKind::OutOfRange(trimmed.to_string()))
        }
        _ => fail(MarkErrorKind::NotInteger(trimmed.to_string())),
    })?;

    Mark::new(value).map_err(|_| fail(MarkErrorKind::OutOfRange(trimmed.to_string())))
}

/// Parses five raw marks in `Subject::ALL` order, stopping at the first
/// failure.
pub fn parse_marks<S: AsRef<str>>(raw: &[S; SUBJECT_COUNT]) -> Result<SubjectMarks, MarkError> {
    let mut marks = [Mark::MIN; SUBJECT_COUNT];
    for ((slot, value), subject) in marks.iter_mut().zip(raw).zip(Subject::ALL) {
        *slot = parse_mark(subject, value.as_ref())?;
    }
    Ok(SubjectMarks::from_array(marks))
}

/// Returns `true` only when all five values are integers in `0..=100`.
pub fn validate_marks<S: AsRef<str>>(raw: &[S; SUBJECT_COUNT]) -> bool {
    parse_marks(raw).is_ok()
}

/// Parses a raw id: ASCII digits only, strictly positive.
pub fn parse_student_id(raw: &str) -> Result<StudentId, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(ValidationError::InvalidId(trimmed.to_string()));
    }
    match trimmed.parse::<StudentId>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ValidationError::InvalidId(trimmed.to_string())),
    }
}

/// Trims and collapses inner whitespace runs of a text field.
pub fn normalize_text_field(raw: &str) -> String {
    WHITESPACE_RE.replace_all(raw.trim(), " ").into_owned()
}

/// Form controller over a record store implementation.
pub struct FormController<R: StudentRepository> {
    repo: R,
}

impl<R: StudentRepository> FormController<R> {
    /// Creates a controller using the provided store implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Validates and adds one student, returning the stored record.
    ///
    /// # Errors
    /// - `MissingField` when name, section or any mark is blank.
    /// - `InvalidMarks` when a mark is not an integer in `0..=100`.
    pub fn submit<S: AsRef<str>>(
        &self,
        name: &str,
        section: &str,
        raw_marks: &[S; SUBJECT_COUNT],
    ) -> FormResult<StudentRecord> {
        let name = normalize_text_field(name);
        let section = normalize_text_field(section);

        let missing = if name.is_empty() {
            Some(FormField::Name)
        } else if section.is_empty() {
            Some(FormField::Section)
        } else {
            raw_marks
                .iter()
                .map(|raw| raw.as_ref().trim())
                .zip(Subject::ALL)
                .find(|(raw, _)| raw.is_empty())
                .map(|(_, subject)| FormField::Mark(subject))
        };
        if let Some(field) = missing {
            warn!("event=student_add module=form status=rejected reason=missing_field field={field}");
            return Err(ValidationError::MissingField(field).into());
        }

        let marks = parse_marks(raw_marks).map_err(|err| {
            warn!(
                "event=student_add module=form status=rejected reason=invalid_marks subject={}",
                err.subject
            );
            ValidationError::InvalidMarks(err)
        })?;

        let id = self
            .repo
            .insert_student(&NewStudent::new(name, section, marks))?;
        info!(
            "event=student_add module=form status=ok id={id} total={}",
            marks.total()
        );

        self.repo
            .get_student(id)?
            .ok_or(FormError::InconsistentState(
                "created student not found in read-back",
            ))
    }

    /// Replaces the marks of an existing student.
    ///
    /// Name and section are never touched. Unknown ids fail with
    /// `FormError::NotFound`.
    pub fn request_update<S: AsRef<str>>(
        &self,
        raw_id: &str,
        raw_marks: &[S; SUBJECT_COUNT],
    ) -> FormResult<StudentRecord> {
        let id = parse_student_id(raw_id).inspect_err(|_| {
            warn!("event=student_update module=form status=rejected reason=invalid_id");
        })?;
        let marks = parse_marks(raw_marks).map_err(|err| {
            warn!(
                "event=student_update module=form status=rejected reason=invalid_marks id={id} subject={}",
                err.subject
            );
            ValidationError::InvalidMarks(err)
        })?;

        if let Err(err) = self.repo.update_marks(id, &marks) {
            warn!("event=student_update module=form status=error id={id} error={err}");
            return Err(err.into());
        }
        info!(
            "event=student_update module=form status=ok id={id} total={}",
            marks.total()
        );

        self.repo
            .get_student(id)?
            .ok_or(FormError::InconsistentState(
                "updated student not found in read-back",
            ))
    }

    /// Deletes a student by id. A missing id yields `DeleteOutcome::NotFound`.
    pub fn request_delete(&self, raw_id: &str) -> FormResult<DeleteOutcome> {
        let id = parse_student_id(raw_id).inspect_err(|_| {
            warn!("event=student_delete module=form status=rejected reason=invalid_id");
        })?;

        let outcome = self.repo.delete_student(id)?;
        info!("event=student_delete module=form status=ok id={id} outcome={outcome:?}");
        Ok(outcome)
    }

    /// Lists every student as `(id, name, section, total, percentage)`.
    pub fn view(&self) -> FormResult<Vec<StudentSummary>> {
        let items = self.repo.list_summaries()?;
        info!("event=student_list module=form status=ok count={}", items.len());
        Ok(items)
    }

    /// Searches names by substring. Blank queries are rejected.
    pub fn search(&self, raw_query: &str, mode: MatchMode) -> FormResult<Vec<StudentRecord>> {
        let text = raw_query.trim();
        if text.is_empty() {
            return Err(ValidationError::EmptySearch.into());
        }

        let hits = self
            .repo
            .search_by_name(&NameQuery::new(text).with_mode(mode))?;
        info!(
            "event=student_search module=form status=ok mode={mode:?} hits={}",
            hits.len()
        );
        Ok(hits)
    }

    /// Writes every stored record to a workbook at `path`.
    pub fn export(&self, path: &Path) -> FormResult<ExportSummary> {
        let records = self.repo.list_students()?;
        Ok(write_workbook(&records, path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        normalize_text_field, parse_mark, parse_marks, parse_student_id, validate_marks,
        MarkErrorKind, ValidationError,
    };
    use crate::model::student::Subject;

    #[test]
    fn parse_mark_distinguishes_failure_kinds() {
        assert_eq!(
            parse_mark(Subject::Maths, "  ").unwrap_err().kind,
            MarkErrorKind::Empty
        );
        assert_eq!(
            parse_mark(Subject::Hindi, "9.5").unwrap_err().kind,
            MarkErrorKind::NotInteger("9.5".to_string())
        );
        assert_eq!(
            parse_mark(Subject::Sst, "101").unwrap_err().kind,
            MarkErrorKind::OutOfRange("101".to_string())
        );
        assert_eq!(
            parse_mark(Subject::Sst, "99999999999999999999").unwrap_err().kind,
            MarkErrorKind::OutOfRange("99999999999999999999".to_string())
        );
    }

    #[test]
    fn parse_mark_accepts_signs_and_padding() {
        assert_eq!(parse_mark(Subject::Maths, " 42 ").unwrap().value(), 42);
        assert_eq!(parse_mark(Subject::Maths, "+7").unwrap().value(), 7);
        assert_eq!(parse_mark(Subject::Maths, "-0").unwrap().value(), 0);
    }

    #[test]
    fn validate_marks_is_fail_closed() {
        assert!(validate_marks(&["0", "100", "50", "25", "75"]));
        assert!(!validate_marks(&["0", "100", "50", "25", "abc"]));
        assert!(!validate_marks(&["-1", "100", "50", "25", "75"]));
        assert!(!validate_marks(&["", "100", "50", "25", "75"]));
    }

    #[test]
    fn parse_marks_reports_first_offending_subject() {
        let err = parse_marks(&["10", "x", "101", "0", "0"]).unwrap_err();
        assert_eq!(err.subject, Subject::English);
    }

    #[test]
    fn parse_student_id_requires_positive_digits() {
        assert_eq!(parse_student_id(" 12 ").unwrap(), 12);
        for raw in ["", "0", "-3", "+3", "1.0", "abc"] {
            assert!(matches!(
                parse_student_id(raw),
                Err(ValidationError::InvalidId(_))
            ));
        }
    }

    #[test]
    fn normalize_text_field_collapses_whitespace() {
        assert_eq!(normalize_text_field("  Asha \t  Rao "), "Asha Rao");
        assert_eq!(normalize_text_field(" \n "), "");
    }
}
