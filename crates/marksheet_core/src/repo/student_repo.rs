//! Student record store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide insert/update/delete/list/search over the `students` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths call `NewStudent::validate()` before SQL mutations.
//! - `total`/`percentage` columns are always written from `SubjectMarks`.
//! - Read paths reject rows whose marks or derived columns are corrupt.
//! - Every listing is ordered by increasing `id` (insertion order).
//! - Each operation is a single SQL statement, so no partial writes.

use crate::db::DbError;
use crate::model::student::{
    NewStudent, StudentId, StudentRecord, StudentSummary, StudentValidationError, Subject,
    SubjectMarks, SUBJECT_COUNT,
};
use rusqlite::{params, Connection, Params, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const STUDENT_SELECT_SQL: &str = "SELECT
    id,
    name,
    section,
    maths,
    english,
    science,
    hindi,
    sst,
    total,
    percentage
FROM students";

const PERCENTAGE_TOLERANCE: f64 = 1e-9;

pub type RepoResult<T> = Result<T, RepoError>;

/// Error for student persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(StudentValidationError),
    Db(DbError),
    NotFound(StudentId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "student not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted student data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => err.source(),
            Self::Db(err) => err.source(),
            Self::NotFound(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<StudentValidationError> for RepoError {
    fn from(value: StudentValidationError) -> Self {
        Self::Validation(value)
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

/// Result of a delete-by-id request. Missing ids are not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

/// Case handling for name substring search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchMode {
    /// Exact byte-wise substring match.
    #[default]
    CaseSensitive,
    /// ASCII case-folded substring match.
    CaseInsensitive,
}

/// Name substring search request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameQuery {
    pub text: String,
    pub mode: MatchMode,
}

impl NameQuery {
    /// Creates a case-sensitive query.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            mode: MatchMode::CaseSensitive,
        }
    }

    pub fn with_mode(mut self, mode: MatchMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Record store interface for student rows.
pub trait StudentRepository {
    /// Persists a new row and returns the store-assigned id.
    fn insert_student(&self, student: &NewStudent) -> RepoResult<StudentId>;
    /// Replaces marks (and derived columns) of an existing row.
    ///
    /// Name and section are left untouched. Fails with `NotFound` when no
    /// row has `id`.
    fn update_marks(&self, id: StudentId, marks: &SubjectMarks) -> RepoResult<()>;
    fn delete_student(&self, id: StudentId) -> RepoResult<DeleteOutcome>;
    fn get_student(&self, id: StudentId) -> RepoResult<Option<StudentRecord>>;
    /// Lists `(id, name, section, total, percentage)` for every row.
    fn list_summaries(&self) -> RepoResult<Vec<StudentSummary>>;
    /// Lists full rows, used by export.
    fn list_students(&self) -> RepoResult<Vec<StudentRecord>>;
    fn search_by_name(&self, query: &NameQuery) -> RepoResult<Vec<StudentRecord>>;
    fn count_students(&self) -> RepoResult<u64>;
}

/// SQLite-backed student store.
pub struct SqliteStudentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStudentRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn query_students<P: Params>(&self, sql: &str, params: P) -> RepoResult<Vec<StudentRecord>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut students = Vec::new();

        while let Some(row) = rows.next()? {
            students.push(parse_student_row(row)?);
        }

        Ok(students)
    }
}

impl StudentRepository for SqliteStudentRepository<'_> {
    fn insert_student(&self, student: &NewStudent) -> RepoResult<StudentId> {
        student.validate()?;

        let [maths, english, science, hindi, sst] = mark_values(&student.marks);
        self.conn.execute(
            "INSERT INTO students (
                name,
                section,
                maths,
                english,
                science,
                hindi,
                sst,
                total,
                percentage
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                student.name.as_str(),
                student.section.as_str(),
                maths,
                english,
                science,
                hindi,
                sst,
                student.marks.total(),
                student.marks.percentage(),
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update_marks(&self, id: StudentId, marks: &SubjectMarks) -> RepoResult<()> {
        let [maths, english, science, hindi, sst] = mark_values(marks);
        let changed = self.conn.execute(
            "UPDATE students
             SET
                maths = ?1,
                english = ?2,
                science = ?3,
                hindi = ?4,
                sst = ?5,
                total = ?6,
                percentage = ?7
             WHERE id = ?8;",
            params![
                maths,
                english,
                science,
                hindi,
                sst,
                marks.total(),
                marks.percentage(),
                id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn delete_student(&self, id: StudentId) -> RepoResult<DeleteOutcome> {
        let changed = self
            .conn
            .execute("DELETE FROM students WHERE id = ?1;", [id])?;

        Ok(if changed == 0 {
            DeleteOutcome::NotFound
        } else {
            DeleteOutcome::Deleted
        })
    }

    fn get_student(&self, id: StudentId) -> RepoResult<Option<StudentRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{STUDENT_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_student_row(row)?));
        }

        Ok(None)
    }

    fn list_summaries(&self) -> RepoResult<Vec<StudentSummary>> {
        Ok(self
            .list_students()?
            .iter()
            .map(StudentRecord::summary)
            .collect())
    }

    fn list_students(&self) -> RepoResult<Vec<StudentRecord>> {
        self.query_students(&format!("{STUDENT_SELECT_SQL} ORDER BY id ASC;"), [])
    }

    fn search_by_name(&self, query: &NameQuery) -> RepoResult<Vec<StudentRecord>> {
        // `LIKE` folds ASCII case in SQLite; `instr` does not.
        let predicate = match query.mode {
            MatchMode::CaseSensitive => "instr(name, ?1) > 0",
            MatchMode::CaseInsensitive => "instr(lower(name), lower(?1)) > 0",
        };
        self.query_students(
            &format!("{STUDENT_SELECT_SQL} WHERE {predicate} ORDER BY id ASC;"),
            [query.text.as_str()],
        )
    }

    fn count_students(&self) -> RepoResult<u64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM students;", [], |row| row.get::<_, i64>(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative row count `{count}`")))
    }
}

fn mark_values(marks: &SubjectMarks) -> [i64; SUBJECT_COUNT] {
    marks.to_array().map(i64::from)
}

fn parse_student_row(row: &Row<'_>) -> RepoResult<StudentRecord> {
    let id: StudentId = row.get("id")?;

    let mut values = [0_i64; SUBJECT_COUNT];
    for (slot, subject) in values.iter_mut().zip(Subject::ALL) {
        *slot = row.get(subject.column())?;
    }
    let marks = SubjectMarks::try_from_values(values).map_err(|(subject, err)| {
        RepoError::InvalidData(format!("{err} in students.{} for id {id}", subject.column()))
    })?;

    let name: String = row.get("name")?;
    let section: String = row.get("section")?;
    let record = StudentRecord::new(id, name, section, marks);

    let stored_total: i64 = row.get("total")?;
    if stored_total != i64::from(record.total()) {
        return Err(RepoError::InvalidData(format!(
            "students.total `{stored_total}` does not match marks for id {id}"
        )));
    }

    let stored_percentage: f64 = row.get("percentage")?;
    if (stored_percentage - record.percentage()).abs() > PERCENTAGE_TOLERANCE {
        return Err(RepoError::InvalidData(format!(
            "students.percentage `{stored_percentage}` does not match marks for id {id}"
        )));
    }

    Ok(record)
}
