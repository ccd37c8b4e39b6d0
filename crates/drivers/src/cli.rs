use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about = "Shelf location audit: master import, count sessions, exports")]
pub struct Cli {
    /// SQLite database file (overrides SHELF_AUDIT_DB)
    #[arg(long, global = true)]
    pub database: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP API
    Serve {
        /// Listen address (overrides SHELF_AUDIT_BIND)
        #[arg(long)]
        bind: Option<String>,
    },
    /// Replace the master location list from a spreadsheet or CSV file
    Import { file: PathBuf },
    /// Search part numbers by substring
    Search { query: String },
    /// List count sessions of a part number, newest first
    Sessions { part: String },
    /// Progress of every session of a part number
    History { part: String },
    /// Start a count session
    NewSession {
        part: String,
        #[arg(long)]
        operator: String,
        #[arg(long)]
        comment: Option<String>,
    },
    /// Show a session's locations with their check state
    Show { part: String, session: i64 },
    /// Mark a location as checked (or unchecked with --uncheck)
    Toggle {
        session: i64,
        location: i64,
        #[arg(long)]
        uncheck: bool,
    },
    /// Record a counted quantity; an empty value clears it
    Quantity {
        session: i64,
        location: i64,
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    /// Write the session's results as semicolon CSV
    ExportCsv {
        session: i64,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Write a printable PDF checklist of a part number's locations
    ExportPdf {
        part: String,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Freeze the session's current progress as a snapshot
    Snapshot { session: i64 },
    /// List recorded snapshots of a part number
    Snapshots { part: String },
}
