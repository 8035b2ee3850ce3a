//! `marksheet` command-line front end.
//!
//! # Responsibility
//! - Map each form action (add, view, search, delete, update, export) to
//!   one controller call on a freshly opened application context.
//! - Report success on stdout and failures on stderr with a non-zero exit.

mod args;
mod render;

use args::{Cli, Command};
use clap::Parser;
use log::error;
use marksheet_core::{
    init_logging, AppConfig, AppContext, DeleteOutcome, FormError, MatchMode,
};
use std::error::Error;
use std::path::Path;
use std::process::ExitCode;

/// Exit status for rejected input or an unknown id.
const EXIT_USER_ERROR: u8 = 2;
/// Exit status for storage, export and startup failures.
const EXIT_FAILURE: u8 = 1;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let cwd = match std::env::current_dir() {
        Ok(cwd) => cwd,
        Err(err) => return report(&err, EXIT_FAILURE),
    };
    let config = build_config(&cli, &cwd);

    if let Err(err) = init_logging(&config.log_level, &config.log_dir) {
        eprintln!(
            "warning: file logging disabled: {}",
            error_lines(&err).join(": ")
        );
    }

    let ctx = match AppContext::open(config) {
        Ok(ctx) => ctx,
        Err(err) => {
            error!("event=cli_run module=cli status=error error_code=db_open_failed");
            return report(&err, EXIT_FAILURE);
        }
    };

    let outcome = run(&ctx, cli.command);
    if let Err(err) = ctx.close() {
        eprintln!("warning: {}", error_lines(&err).join(": "));
    }

    match outcome {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => report(&err, exit_status(&err)),
    }
}

fn exit_status(err: &FormError) -> u8 {
    match err {
        FormError::Validation(_) | FormError::NotFound(_) => EXIT_USER_ERROR,
        FormError::Storage(_) | FormError::Export(_) | FormError::InconsistentState(_) => {
            EXIT_FAILURE
        }
    }
}

/// Flags (or their `MARKSHEET_*` env vars) over defaults, resolved against `cwd`.
fn build_config(cli: &Cli, cwd: &Path) -> AppConfig {
    let mut config = AppConfig::default();
    if let Some(db) = &cli.db {
        config.db_path = db.clone();
    }
    if let Some(log_dir) = &cli.log_dir {
        config.log_dir = log_dir.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Command::Export { out: Some(out) } = &cli.command {
        config.export_path = out.clone();
    }

    config.resolved_against(cwd)
}

fn run(ctx: &AppContext, command: Command) -> Result<String, FormError> {
    let controller = ctx.controller();
    match command {
        Command::Add {
            name,
            section,
            marks,
        } => {
            let record = controller.submit(&name, &section, &marks.raw())?;
            Ok(format!("Student added with ID {}.\n", record.id()))
        }
        Command::View { json } => {
            let rows = controller.view()?;
            if json {
                Ok(to_json(&rows))
            } else {
                Ok(render::summary_table(&rows))
            }
        }
        Command::Search {
            name,
            ignore_case,
            json,
        } => {
            let mode = if ignore_case {
                MatchMode::CaseInsensitive
            } else {
                MatchMode::CaseSensitive
            };
            let hits = controller.search(&name, mode)?;
            if json {
                Ok(to_json(&hits))
            } else {
                Ok(render::search_lines(&hits))
            }
        }
        Command::Delete { id } => match controller.request_delete(&id)? {
            DeleteOutcome::Deleted => Ok(format!("Record with ID {} deleted.\n", id.trim())),
            DeleteOutcome::NotFound => Ok(format!(
                "No record with ID {}; nothing deleted.\n",
                id.trim()
            )),
        },
        Command::Update { id, marks } => {
            let record = controller.request_update(&id, &marks.raw())?;
            Ok(format!("Record ID {} updated.\n", record.id()))
        }
        Command::Export { .. } => {
            let summary = ctx.export_all()?;
            Ok(format!(
                "Exported {} record(s) to {}\n",
                summary.records,
                summary.path.display()
            ))
        }
    }
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> String {
    // Read models hold only strings and numbers, so serialization cannot fail.
    let mut out = serde_json::to_string_pretty(value).unwrap_or_else(|_| "[]".to_string());
    out.push('\n');
    out
}

/// The error followed by its causes, skipping a cause that repeats the line
/// before it.
fn error_lines(err: &dyn Error) -> Vec<String> {
    let mut lines = vec![err.to_string()];
    let mut source = err.source();
    while let Some(cause) = source {
        let line = cause.to_string();
        if lines.last() != Some(&line) {
            lines.push(line);
        }
        source = cause.source();
    }
    lines
}

fn report(err: &dyn Error, status: u8) -> ExitCode {
    let mut lines = error_lines(err).into_iter();
    if let Some(head) = lines.next() {
        eprintln!("Error: {head}");
    }
    for cause in lines {
        eprintln!("  caused by: {cause}");
    }
    ExitCode::from(status)
}

#[cfg(test)]
mod tests {
    use super::{build_config, error_lines, exit_status, run, Cli, EXIT_FAILURE, EXIT_USER_ERROR};
    use clap::Parser;
    use marksheet_core::{AppContext, FormError, ValidationError};
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    const ASHA: [&str; 14] = [
        "--name", "Asha", "--section", "A", "--maths", "90", "--english", "80", "--science",
        "70", "--hindi", "60", "--sst", "100",
    ];

    fn parse(args: &[&str], db: &Path) -> Cli {
        let mut argv = vec!["marksheet".to_string()];
        argv.extend(args.iter().map(|arg| arg.to_string()));
        argv.push("--db".to_string());
        argv.push(db.display().to_string());
        Cli::try_parse_from(argv).unwrap()
    }

    /// Runs one command on a fresh context, closing it afterwards.
    fn execute(dir: &TempDir, args: &[&str]) -> Result<String, FormError> {
        let cli = parse(args, &dir.path().join("marksheet.db"));
        let config = build_config(&cli, dir.path());
        let ctx = AppContext::open(config).unwrap();
        let outcome = run(&ctx, cli.command);
        ctx.close().unwrap();
        outcome
    }

    fn add_asha(dir: &TempDir) -> String {
        let mut args = vec!["add"];
        args.extend(ASHA);
        execute(dir, &args).unwrap()
    }

    #[test]
    fn add_view_and_search_print_form_messages() {
        let dir = tempfile::tempdir().unwrap();

        assert_eq!(add_asha(&dir), "Student added with ID 1.\n");
        let table = execute(&dir, &["view"]).unwrap();
        assert!(table.lines().nth(2).unwrap().starts_with("1    Asha"));
        assert_eq!(
            execute(&dir, &["search", "sh"]).unwrap(),
            "ID: 1, Name: Asha, Section: A, Marks: (90, 80, 70, 60, 100), Total: 400, %: 80.0\n"
        );
        assert_eq!(
            execute(&dir, &["search", "SH"]).unwrap(),
            "No student found with that name.\n"
        );
    }

    #[test]
    fn update_and_delete_report_the_id() {
        let dir = tempfile::tempdir().unwrap();
        add_asha(&dir);

        let updated = execute(
            &dir,
            &[
                "update", "1", "--maths", "50", "--english", "50", "--science", "50", "--hindi",
                "50", "--sst", "50",
            ],
        )
        .unwrap();
        assert_eq!(updated, "Record ID 1 updated.\n");

        assert_eq!(
            execute(&dir, &["delete", " 1 "]).unwrap(),
            "Record with ID 1 deleted.\n"
        );
        assert_eq!(
            execute(&dir, &["delete", "1"]).unwrap(),
            "No record with ID 1; nothing deleted.\n"
        );
        assert_eq!(execute(&dir, &["view"]).unwrap(), "No records found.\n");
    }

    #[test]
    fn export_reports_record_count_and_resolved_path() {
        let dir = tempfile::tempdir().unwrap();
        add_asha(&dir);

        let output = execute(&dir, &["export", "--out", "out/marks.xlsx"]).unwrap();
        let expected = dir.path().join("out").join("marks.xlsx");
        assert_eq!(
            output,
            format!("Exported 1 record(s) to {}\n", expected.display())
        );
        assert!(expected.is_file());
    }

    #[test]
    fn user_errors_exit_with_status_two() {
        let dir = tempfile::tempdir().unwrap();
        add_asha(&dir);

        let bad_id = execute(&dir, &["delete", "abc"]).unwrap_err();
        assert!(matches!(
            bad_id,
            FormError::Validation(ValidationError::InvalidId(_))
        ));
        assert_eq!(exit_status(&bad_id), EXIT_USER_ERROR);
        assert_eq!(error_lines(&bad_id), vec!["Enter a valid ID (got `abc`)."]);

        let mut args = vec!["add"];
        args.extend(ASHA);
        args[6] = "101";
        let bad_mark = execute(&dir, &args).unwrap_err();
        assert_eq!(exit_status(&bad_mark), EXIT_USER_ERROR);
        assert_eq!(
            error_lines(&bad_mark),
            vec![
                "Marks must be integers between 0-100.",
                "maths: `101` is outside 0..=100",
            ]
        );

        let missing = execute(
            &dir,
            &[
                "update", "9", "--maths", "1", "--english", "1", "--science", "1", "--hindi", "1",
                "--sst", "1",
            ],
        )
        .unwrap_err();
        assert!(matches!(missing, FormError::NotFound(9)));
        assert_eq!(exit_status(&missing), EXIT_USER_ERROR);
    }

    #[test]
    fn export_failure_exits_with_status_one() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("taken.xlsx")).unwrap();

        let err = execute(&dir, &["export", "--out", "taken.xlsx"]).unwrap_err();
        assert!(matches!(err, FormError::Export(_)));
        assert_eq!(exit_status(&err), EXIT_FAILURE);

        let lines = error_lines(&err);
        assert_eq!(lines[0], "export failure");
        assert!(lines[1].starts_with("failed to write"));
        assert!(lines[2].starts_with("IoError"));
    }

    #[test]
    fn relative_paths_resolve_against_working_directory() {
        let cwd = PathBuf::from("/srv/marks");
        let cli = Cli::try_parse_from([
            "marksheet",
            "--db",
            "school.db",
            "--log-dir",
            "/var/log/marksheet",
            "--log-level",
            "debug",
            "export",
            "--out",
            "sheets/all.xlsx",
        ])
        .unwrap();

        let config = build_config(&cli, &cwd);
        assert_eq!(config.db_path, cwd.join("school.db"));
        assert_eq!(config.export_path, cwd.join("sheets/all.xlsx"));
        assert_eq!(config.log_dir, Path::new("/var/log/marksheet"));
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn environment_supplies_unset_flags() {
        std::env::set_var("MARKSHEET_LOG_DIR", "env-logs");
        std::env::set_var("MARKSHEET_EXPORT", "env/marks.xlsx");
        let cli = Cli::try_parse_from(["marksheet", "--db", "flag.db", "export"]).unwrap();
        std::env::remove_var("MARKSHEET_LOG_DIR");
        std::env::remove_var("MARKSHEET_EXPORT");

        let cwd = PathBuf::from("/srv/marks");
        let config = build_config(&cli, &cwd);
        assert_eq!(config.db_path, cwd.join("flag.db"));
        assert_eq!(config.log_dir, cwd.join("env-logs"));
        assert_eq!(config.export_path, cwd.join("env/marks.xlsx"));
    }
}
