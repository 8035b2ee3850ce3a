//! Command-line surface of the marksheet.
//!
//! Values stay raw text here; the form controller owns all validation so
//! messages match the form exactly.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "marksheet")]
#[command(version)]
#[command(about = "Student marksheet: record, list, search and export marks", long_about = None)]
pub struct Cli {
    /// SQLite database file
    #[arg(long, global = true, env = "MARKSHEET_DB")]
    pub db: Option<PathBuf>,

    /// Directory for rolling log files
    #[arg(long, global = true, env = "MARKSHEET_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(long, global = true, env = "MARKSHEET_LOG_LEVEL")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a student
    Add {
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        section: String,
        #[command(flatten)]
        marks: MarkArgs,
    },

    /// List every student with total and percentage
    View {
        #[arg(long)]
        json: bool,
    },

    /// Find students whose name contains the given text
    Search {
        #[arg(default_value = "")]
        name: String,
        /// Fold ASCII case when matching
        #[arg(long, short = 'i')]
        ignore_case: bool,
        #[arg(long)]
        json: bool,
    },

    /// Delete a student by ID
    Delete {
        #[arg(default_value = "")]
        id: String,
    },

    /// Replace the marks of a student by ID
    Update {
        #[arg(default_value = "")]
        id: String,
        #[command(flatten)]
        marks: MarkArgs,
    },

    /// Write all records to a spreadsheet
    Export {
        /// Output .xlsx path
        #[arg(long, env = "MARKSHEET_EXPORT")]
        out: Option<PathBuf>,
    },
}

/// The five subject marks as typed on the command line.
#[derive(Args, Debug, Clone)]
pub struct MarkArgs {
    #[arg(long, default_value = "")]
    pub maths: String,
    #[arg(long, default_value = "")]
    pub english: String,
    #[arg(long, default_value = "")]
    pub science: String,
    #[arg(long, default_value = "")]
    pub hindi: String,
    #[arg(long, default_value = "")]
    pub sst: String,
}

impl MarkArgs {
    pub fn raw(&self) -> [&str; 5] {
        [
            self.maths.as_str(),
            self.english.as_str(),
            self.science.as_str(),
            self.hindi.as_str(),
            self.sst.as_str(),
        ]
    }
}
