use serde::Serialize;
use shelf_audit_domain::{CheckState, CountSession, LocationRecord, Progress};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionRow {
    pub location: LocationRecord,
    pub state: CheckState,
    pub quantity: Option<i64>,
}

/// Every active location of the session's part joined with the session's check state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    pub session: CountSession,
    pub rows: Vec<SessionRow>,
    pub progress: Progress,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checklist {
    pub part_number: String,
    pub generated_at: String,
    pub locations: Vec<LocationRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}
