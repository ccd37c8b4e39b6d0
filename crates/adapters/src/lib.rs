pub mod clock;
pub mod migrations;
pub mod presenters;
pub mod reports;
pub mod spreadsheet;
pub mod sqlite;

pub use clock::SystemClock;
pub use presenters::{
    present_import_report, present_location_row, present_progress, present_session_row,
    present_snapshot,
};
pub use reports::{PrintPdfChecklistWriter, SemicolonCsvWriter};
pub use spreadsheet::CalamineSpreadsheetReader;
pub use sqlite::SqliteInventoryRepository;
