mod cli;
mod config;
mod http;
mod logging;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use cli::{Cli, Command};
use config::AppConfig;
use shelf_audit_adapters::{
    present_import_report, present_location_row, present_progress, present_session_row,
    present_snapshot, CalamineSpreadsheetReader, PrintPdfChecklistWriter, SemicolonCsvWriter,
    SqliteInventoryRepository, SystemClock,
};
use shelf_audit_application::{
    ApplicationError, ApplicationService, BootstrapInventoryCommand, CreateSessionCommand,
    ExportChecklistPdfCommand, ExportFile, ExportSessionCsvCommand, ImportMasterCommand,
    ListSessionsCommand, ListSnapshotsQuery, OpenSessionCommand, PartHistoryQuery,
    RecordSnapshotCommand, SearchPartsCommand, SetQuantityCommand, ToggleLocationCommand,
};
use shelf_audit_domain::{LocationId, SessionId};
use tracing::info;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let mut config = AppConfig::from_env().with_database(cli.database.clone());
    if let Command::Serve { bind } = &cli.command {
        config = config.with_bind(bind.clone());
    }
    logging::init_logging(config.log_json);

    let service = build_application_service(&config);
    if let Err(error) = service.bootstrap_inventory(BootstrapInventoryCommand) {
        eprintln!(
            "failed to open inventory database {}: {error}",
            config.database_path
        );
        return ExitCode::from(1);
    }

    match run_command(cli.command, service, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(CommandError::Usage(msg)) => {
            eprintln!("{msg}");
            ExitCode::from(2)
        }
        Err(CommandError::Runtime(msg)) => {
            eprintln!("{msg}");
            ExitCode::from(1)
        }
    }
}

fn build_application_service(config: &AppConfig) -> ApplicationService {
    ApplicationService::new(
        Box::new(SqliteInventoryRepository::new(config.database_path.clone())),
        Box::new(CalamineSpreadsheetReader),
        Box::new(SemicolonCsvWriter),
        Box::new(PrintPdfChecklistWriter),
        Box::new(SystemClock),
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum CommandError {
    Usage(String),
    Runtime(String),
}

impl CommandError {
    fn from_application(context: &str, error: ApplicationError) -> Self {
        if error.is_validation() {
            Self::Usage(format!("{context}: {error}"))
        } else {
            Self::Runtime(format!("{context}: {error}"))
        }
    }
}

fn run_command(
    command: Command,
    service: ApplicationService,
    config: &AppConfig,
) -> Result<(), CommandError> {
    match command {
        Command::Serve { .. } => {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .map_err(|error| CommandError::Runtime(format!("failed to start runtime: {error}")))?;
            runtime
                .block_on(http::serve(Arc::new(service), config.clone()))
                .map_err(CommandError::Runtime)
        }
        Command::Import { file } => {
            let bytes = std::fs::read(&file).map_err(|error| {
                CommandError::Runtime(format!("failed to read {}: {error}", file.display()))
            })?;
            let file_name = file
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            let report = service
                .import_master(ImportMasterCommand { file_name, bytes })
                .map_err(fail("import failed"))?;
            println!("{}", present_import_report(&report));
            Ok(())
        }
        Command::Search { query } => {
            let parts = service
                .search_parts(SearchPartsCommand { query })
                .map_err(fail("search failed"))?;
            if parts.is_empty() {
                println!("no matching part numbers");
            }
            for part in parts {
                println!("{part}");
            }
            Ok(())
        }
        Command::Sessions { part } => {
            let sessions = service
                .list_sessions(ListSessionsCommand { part_number: part })
                .map_err(fail("list sessions failed"))?;
            if sessions.is_empty() {
                println!("no sessions");
            }
            for session in &sessions {
                println!("{}", present_session_row(session));
            }
            Ok(())
        }
        Command::History { part } => {
            let history = service
                .part_history(PartHistoryQuery { part_number: part })
                .map_err(fail("history failed"))?;
            if history.is_empty() {
                println!("no sessions");
            }
            for entry in &history {
                println!("{}", present_progress(entry));
            }
            Ok(())
        }
        Command::NewSession {
            part,
            operator,
            comment,
        } => {
            let session = service
                .create_session(CreateSessionCommand {
                    part_number: part,
                    operator_name: operator,
                    comment,
                })
                .map_err(fail("create session failed"))?;
            println!("{}", present_session_row(&session));
            Ok(())
        }
        Command::Show { part, session } => {
            let view = service
                .open_session(OpenSessionCommand {
                    part_number: part,
                    session_id: session_id(session)?,
                })
                .map_err(fail("open session failed"))?;
            for row in &view.rows {
                println!("{}", present_location_row(row));
            }
            println!(
                "{}/{} checked ({:.1}%)",
                view.progress.checked, view.progress.total, view.progress.percentage
            );
            Ok(())
        }
        Command::Toggle {
            session,
            location,
            uncheck,
        } => {
            let detail = service
                .toggle_location(ToggleLocationCommand {
                    session_id: session_id(session)?,
                    location_id: location_id(location)?,
                    checked: !uncheck,
                })
                .map_err(fail("toggle failed"))?;
            println!(
                "location {} {}",
                detail.location_id,
                if detail.checked { "checked" } else { "unchecked" }
            );
            Ok(())
        }
        Command::Quantity {
            session,
            location,
            value,
        } => {
            let detail = service
                .set_quantity(SetQuantityCommand {
                    session_id: session_id(session)?,
                    location_id: location_id(location)?,
                    quantity: value,
                })
                .map_err(fail("set quantity failed"))?;
            match detail.quantity {
                Some(quantity) => println!("location {} quantity={quantity}", detail.location_id),
                None => println!("location {} quantity cleared", detail.location_id),
            }
            Ok(())
        }
        Command::ExportCsv { session, out } => {
            let file = service
                .export_session_csv(ExportSessionCsvCommand {
                    session_id: session_id(session)?,
                })
                .map_err(fail("csv export failed"))?;
            write_export(&file, out)
        }
        Command::ExportPdf { part, out } => {
            let file = service
                .export_checklist_pdf(ExportChecklistPdfCommand { part_number: part })
                .map_err(fail("pdf export failed"))?;
            write_export(&file, out)
        }
        Command::Snapshot { session } => {
            let snapshot = service
                .record_snapshot(RecordSnapshotCommand {
                    session_id: session_id(session)?,
                })
                .map_err(fail("snapshot failed"))?;
            println!("{}", present_snapshot(&snapshot));
            Ok(())
        }
        Command::Snapshots { part } => {
            let snapshots = service
                .list_snapshots(ListSnapshotsQuery { part_number: part })
                .map_err(fail("list snapshots failed"))?;
            if snapshots.is_empty() {
                println!("no snapshots");
            }
            for snapshot in &snapshots {
                println!("{}", present_snapshot(snapshot));
            }
            Ok(())
        }
    }
}

fn fail(context: &'static str) -> impl Fn(ApplicationError) -> CommandError {
    move |error| CommandError::from_application(context, error)
}

fn session_id(raw: i64) -> Result<SessionId, CommandError> {
    SessionId::new(raw).map_err(|error| CommandError::Usage(error.to_string()))
}

fn location_id(raw: i64) -> Result<LocationId, CommandError> {
    LocationId::new(raw).map_err(|error| CommandError::Usage(error.to_string()))
}

fn write_export(file: &ExportFile, out: Option<PathBuf>) -> Result<(), CommandError> {
    let path = out.unwrap_or_else(|| PathBuf::from(&file.file_name));
    std::fs::write(&path, &file.bytes).map_err(|error| {
        CommandError::Runtime(format!("failed to write {}: {error}", path.display()))
    })?;
    info!(path = %path.display(), bytes = file.bytes.len(), "export written");
    println!("wrote {}", path.display());
    Ok(())
}
