mod checklist_pdf;
mod session_csv;

pub use checklist_pdf::PrintPdfChecklistWriter;
pub use session_csv::SemicolonCsvWriter;
