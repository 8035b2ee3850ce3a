//! Plain-text rendering of controller results.

use marksheet_core::{StudentRecord, StudentSummary};
use std::fmt::Write;

const RULE_WIDTH: usize = 60;

/// Fixed-width listing: ID(5) Name(20) Section(10) Total(10) Percentage(10).
pub fn summary_table(rows: &[StudentSummary]) -> String {
    if rows.is_empty() {
        return "No records found.\n".to_string();
    }

    let mut out = format!(
        "{:<5}{:<20}{:<10}{:<10}{:<10}\n",
        "ID", "Name", "Section", "Total", "Percentage"
    );
    out.push_str(&"-".repeat(RULE_WIDTH));
    out.push('\n');
    for row in rows {
        let _ = writeln!(
            out,
            "{:<5}{:<20}{:<10}{:<10}{:<10.2}",
            row.id, row.name, row.section, row.total, row.percentage
        );
    }
    out
}

/// One line per hit, including the individual marks. The percentage keeps
/// its shortest float form (`80.0`, `50.2`), unlike the table.
pub fn search_lines(hits: &[StudentRecord]) -> String {
    if hits.is_empty() {
        return "No student found with that name.\n".to_string();
    }

    let mut out = String::new();
    for hit in hits {
        let marks = hit
            .marks()
            .to_array()
            .map(|mark| mark.to_string())
            .join(", ");
        let _ = writeln!(
            out,
            "ID: {}, Name: {}, Section: {}, Marks: ({marks}), Total: {}, %: {:?}",
            hit.id(),
            hit.name(),
            hit.section(),
            hit.total(),
            hit.percentage()
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{search_lines, summary_table};
    use marksheet_core::{StudentRecord, SubjectMarks};

    fn asha() -> StudentRecord {
        let marks = SubjectMarks::try_from_values([90, 80, 70, 60, 100]).unwrap();
        StudentRecord::new(1, "Asha", "A", marks)
    }

    #[test]
    fn summary_table_pads_columns() {
        let table = summary_table(&[asha().summary()]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("ID   Name                Section   Total     Percentage"));
        assert_eq!(lines[1], "-".repeat(60));
        assert_eq!(
            lines[2],
            "1    Asha                A         400       80.00     "
        );
    }

    #[test]
    fn empty_results_use_form_messages() {
        assert_eq!(summary_table(&[]), "No records found.\n");
        assert_eq!(search_lines(&[]), "No student found with that name.\n");
    }

    #[test]
    fn search_lines_list_marks_in_subject_order() {
        let bob = StudentRecord::new(
            2,
            "Bob",
            "B",
            SubjectMarks::try_from_values([50, 50, 50, 50, 51]).unwrap(),
        );
        assert_eq!(
            search_lines(&[asha(), bob]),
            "ID: 1, Name: Asha, Section: A, Marks: (90, 80, 70, 60, 100), Total: 400, %: 80.0\n\
             ID: 2, Name: Bob, Section: B, Marks: (50, 50, 50, 50, 51), Total: 251, %: 50.2\n"
        );
    }
}
