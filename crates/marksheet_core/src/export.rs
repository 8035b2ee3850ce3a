//! Spreadsheet export of student records.
//!
//! # Responsibility
//! - Turn a slice of records into a single-sheet `.xlsx` workbook.
//!
//! # Invariants
//! - Row 1 is always the header row, followed by one row per record in the
//!   order given (the store hands them over in id order).
//! - The target file is overwritten; nothing is appended.
//! - Numeric columns are written as numbers, text columns as strings.

use crate::model::student::{StudentRecord, Subject};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Instant;
use umya_spreadsheet::writer::xlsx::XlsxError;
use umya_spreadsheet::Worksheet;

/// Default export location relative to the working directory.
pub const DEFAULT_EXPORT_PATH: &str = "exports/student_marks.xlsx";
pub const SHEET_NAME: &str = "Students";
pub const EXPORT_HEADERS: [&str; 10] = [
    "ID",
    "Name",
    "Section",
    "Maths",
    "English",
    "Science",
    "Hindi",
    "SST",
    "Total",
    "Percentage",
];

pub type ExportResult<T> = Result<T, ExportError>;

#[derive(Debug)]
pub enum ExportError {
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The target path has no file extension to write through.
    MissingExtension(PathBuf),
    /// Workbook structure could not be built.
    Sheet(String),
    Write {
        path: PathBuf,
        source: XlsxError,
    },
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CreateDir { path, .. } => write!(
                f,
                "failed to create export directory `{}`",
                path.display()
            ),
            Self::MissingExtension(path) => write!(
                f,
                "export path `{}` needs a file extension such as .xlsx",
                path.display()
            ),
            Self::Sheet(message) => write!(f, "failed to build worksheet: {message}"),
            Self::Write { path, .. } => write!(f, "failed to write `{}`", path.display()),
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CreateDir { source, .. } => Some(source),
            Self::Write { source, .. } => Some(source),
            Self::MissingExtension(_) | Self::Sheet(_) => None,
        }
    }
}

/// What an export produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub path: PathBuf,
    /// Number of student rows, header excluded.
    pub records: usize,
}

impl ExportSummary {
    /// Sheet rows including the header.
    pub fn rows(&self) -> usize {
        self.records + 1
    }
}

/// Writes `records` to an `.xlsx` file at `path`, replacing any old file.
///
/// # Side effects
/// - Creates the parent directory when missing.
/// - Emits `export_write` logging events with row count and duration.
pub fn write_workbook(records: &[StudentRecord], path: &Path) -> ExportResult<ExportSummary> {
    let started_at = Instant::now();
    info!(
        "event=export_write module=export status=start records={}",
        records.len()
    );

    match build_and_write(records, path) {
        Ok(summary) => {
            info!(
                "event=export_write module=export status=ok records={} duration_ms={}",
                summary.records,
                started_at.elapsed().as_millis()
            );
            Ok(summary)
        }
        Err(err) => {
            error!(
                "event=export_write module=export status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn build_and_write(records: &[StudentRecord], path: &Path) -> ExportResult<ExportSummary> {
    if path.extension().is_none() {
        return Err(ExportError::MissingExtension(path.to_path_buf()));
    }
    if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| ExportError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let mut book = umya_spreadsheet::new_file_empty_worksheet();
    let sheet = book
        .new_sheet(SHEET_NAME)
        .map_err(|err| ExportError::Sheet(err.to_string()))?;

    for (col, header) in (1_u32..).zip(EXPORT_HEADERS) {
        sheet.get_cell_mut((col, 1_u32)).set_value_string(header);
    }
    for (row, record) in (2_u32..).zip(records) {
        write_record_row(sheet, row, record);
    }

    umya_spreadsheet::writer::xlsx::write(&book, path).map_err(|source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(ExportSummary {
        path: path.to_path_buf(),
        records: records.len(),
    })
}

fn write_record_row(sheet: &mut Worksheet, row: u32, record: &StudentRecord) {
    sheet
        .get_cell_mut((1_u32, row))
        .set_value_number(record.id() as f64);
    sheet.get_cell_mut((2_u32, row)).set_value_string(record.name());
    sheet.get_cell_mut((3_u32, row)).set_value_string(record.section());

    for (col, subject) in (4_u32..).zip(Subject::ALL) {
        sheet
            .get_cell_mut((col, row))
            .set_value_number(f64::from(record.marks().get(subject).value()));
    }

    sheet
        .get_cell_mut((9_u32, row))
        .set_value_number(f64::from(record.total()));
    sheet
        .get_cell_mut((10_u32, row))
        .set_value_number(record.percentage());
}

#[cfg(test)]
mod tests {
    use super::EXPORT_HEADERS;
    use crate::model::student::Subject;

    #[test]
    fn subject_headers_match_subject_labels() {
        let labels = Subject::ALL.map(Subject::label);
        assert_eq!(&EXPORT_HEADERS[3..8], labels.as_slice());
    }
}
