mod error;
mod ports;
mod service;
mod use_cases;
mod views;

pub use error::ApplicationError;
pub use ports::{ChecklistPdfWriter, Clock, InventoryRepository, SessionCsvWriter, SpreadsheetReader};
pub use service::ApplicationService;
pub use use_cases::{
    BootstrapInventoryCommand, CreateSessionCommand, ExportChecklistPdfCommand,
    ExportSessionCsvCommand, ImportMasterCommand, ListSessionsCommand, ListSnapshotsQuery,
    OpenSessionCommand, PartHistoryQuery, RecordSnapshotCommand, SearchPartsCommand,
    SessionProgressQuery, SetQuantityCommand, ToggleLocationCommand,
};
pub use views::{Checklist, ExportFile, SessionRow, SessionView};
