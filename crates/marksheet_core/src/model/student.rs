//! Student record domain model.
//!
//! # Responsibility
//! - Define the canonical student record and its derived totals.
//! - Make out-of-range marks unrepresentable once parsed.
//!
//! # Invariants
//! - Every `Mark` lies in `0..=100`.
//! - `total` is the sum of the five subject marks.
//! - `percentage` is `total / 5` rounded to two decimals (an average of the
//!   five subjects, not a share of 500).
//! - `total` and `percentage` are only ever derived from `SubjectMarks`.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned identifier of one student row.
pub type StudentId = i64;

/// Number of subjects carried by every record.
pub const SUBJECT_COUNT: usize = 5;
pub const MARK_MIN: u8 = 0;
pub const MARK_MAX: u8 = 100;

/// The five subjects in their fixed storage/display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subject {
    Maths,
    English,
    Science,
    Hindi,
    Sst,
}

impl Subject {
    /// All subjects, in column order.
    pub const ALL: [Subject; SUBJECT_COUNT] = [
        Subject::Maths,
        Subject::English,
        Subject::Science,
        Subject::Hindi,
        Subject::Sst,
    ];

    /// Human-facing label, also used as spreadsheet header.
    pub fn label(self) -> &'static str {
        match self {
            Self::Maths => "Maths",
            Self::English => "English",
            Self::Science => "Science",
            Self::Hindi => "Hindi",
            Self::Sst => "SST",
        }
    }

    /// Column name in the `students` table.
    pub fn column(self) -> &'static str {
        match self {
            Self::Maths => "maths",
            Self::English => "english",
            Self::Science => "science",
            Self::Hindi => "hindi",
            Self::Sst => "sst",
        }
    }
}

impl Display for Subject {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column())
    }
}

/// Raised when an integer outside `0..=100` is offered as a mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkRangeError {
    pub value: i64,
}

impl Display for MarkRangeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "mark {} is outside {MARK_MIN}..={MARK_MAX}",
            self.value
        )
    }
}

impl Error for MarkRangeError {}

/// A single subject mark, guaranteed to be within `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Mark(u8);

impl Mark {
    pub const MIN: Mark = Mark(MARK_MIN);
    pub const MAX: Mark = Mark(MARK_MAX);

    /// Validates and wraps one mark.
    pub fn new(value: i64) -> Result<Self, MarkRangeError> {
        if (i64::from(MARK_MIN)..=i64::from(MARK_MAX)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(MarkRangeError { value })
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Mark {
    type Error = MarkRangeError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Mark> for i64 {
    fn from(value: Mark) -> Self {
        i64::from(value.0)
    }
}

impl Display for Mark {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sum of five marks. Never exceeds `5 * MARK_MAX`.
pub fn compute_total(marks: &[Mark; SUBJECT_COUNT]) -> u32 {
    marks.iter().map(|mark| u32::from(mark.value())).sum()
}

/// `total / 5`, rounded to two decimal places.
pub fn compute_percentage(total: u32) -> f64 {
    let average = f64::from(total) / SUBJECT_COUNT as f64;
    (average * 100.0).round() / 100.0
}

/// The five subject marks of one student.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubjectMarks {
    pub maths: Mark,
    pub english: Mark,
    pub science: Mark,
    pub hindi: Mark,
    pub sst: Mark,
}

impl SubjectMarks {
    /// Builds marks from an array in `Subject::ALL` order.
    pub fn from_array(marks: [Mark; SUBJECT_COUNT]) -> Self {
        let [maths, english, science, hindi, sst] = marks;
        Self {
            maths,
            english,
            science,
            hindi,
            sst,
        }
    }

    /// Validates five plain integers in `Subject::ALL` order.
    ///
    /// Returns the first offending subject together with the range error.
    pub fn try_from_values(
        values: [i64; SUBJECT_COUNT],
    ) -> Result<Self, (Subject, MarkRangeError)> {
        let mut marks = [Mark::MIN; SUBJECT_COUNT];
        for ((slot, value), subject) in marks.iter_mut().zip(values).zip(Subject::ALL) {
            *slot = Mark::new(value).map_err(|err| (subject, err))?;
        }
        Ok(Self::from_array(marks))
    }

    pub fn to_array(&self) -> [Mark; SUBJECT_COUNT] {
        [self.maths, self.english, self.science, self.hindi, self.sst]
    }

    pub fn get(&self, subject: Subject) -> Mark {
        match subject {
            Subject::Maths => self.maths,
            Subject::English => self.english,
            Subject::Science => self.science,
            Subject::Hindi => self.hindi,
            Subject::Sst => self.sst,
        }
    }

    pub fn total(&self) -> u32 {
        compute_total(&self.to_array())
    }

    pub fn percentage(&self) -> f64 {
        compute_percentage(self.total())
    }
}

/// Rejection reasons for record text fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudentValidationError {
    EmptyName,
    EmptySection,
}

impl Display for StudentValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "student name must not be empty"),
            Self::EmptySection => write!(f, "student section must not be empty"),
        }
    }
}

impl Error for StudentValidationError {}

/// Insert input for one student; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    pub name: String,
    pub section: String,
    pub marks: SubjectMarks,
}

impl NewStudent {
    pub fn new(name: impl Into<String>, section: impl Into<String>, marks: SubjectMarks) -> Self {
        Self {
            name: name.into(),
            section: section.into(),
            marks,
        }
    }

    /// Checks text fields. Marks are range-checked by construction.
    pub fn validate(&self) -> Result<(), StudentValidationError> {
        if self.name.trim().is_empty() {
            return Err(StudentValidationError::EmptyName);
        }
        if self.section.trim().is_empty() {
            return Err(StudentValidationError::EmptySection);
        }
        Ok(())
    }
}

/// One persisted student with derived totals.
///
/// Fields are read-only so `total`/`percentage` cannot drift from `marks`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentRecord {
    id: StudentId,
    name: String,
    section: String,
    marks: SubjectMarks,
    total: u32,
    percentage: f64,
}

impl StudentRecord {
    pub fn new(
        id: StudentId,
        name: impl Into<String>,
        section: impl Into<String>,
        marks: SubjectMarks,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            section: section.into(),
            marks,
            total: marks.total(),
            percentage: marks.percentage(),
        }
    }

    pub fn id(&self) -> StudentId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn section(&self) -> &str {
        &self.section
    }

    pub fn marks(&self) -> &SubjectMarks {
        &self.marks
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn percentage(&self) -> f64 {
        self.percentage
    }

    /// Projects this record onto the list view shape.
    pub fn summary(&self) -> StudentSummary {
        StudentSummary {
            id: self.id,
            name: self.name.clone(),
            section: self.section.clone(),
            total: self.total,
            percentage: self.percentage,
        }
    }
}

/// List-view projection: `(id, name, section, total, percentage)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentSummary {
    pub id: StudentId,
    pub name: String,
    pub section: String,
    pub total: u32,
    pub percentage: f64,
}
