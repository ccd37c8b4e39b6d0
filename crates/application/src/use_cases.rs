use shelf_audit_domain::{LocationId, SessionId};

#[derive(Debug, Clone, Default)]
pub struct BootstrapInventoryCommand;

#[derive(Debug, Clone)]
pub struct ImportMasterCommand {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct SearchPartsCommand {
    pub query: String,
}

#[derive(Debug, Clone)]
pub struct CreateSessionCommand {
    pub part_number: String,
    pub operator_name: String,
    pub comment: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ListSessionsCommand {
    pub part_number: String,
}

#[derive(Debug, Clone)]
pub struct OpenSessionCommand {
    pub part_number: String,
    pub session_id: SessionId,
}

#[derive(Debug, Clone, Copy)]
pub struct ToggleLocationCommand {
    pub session_id: SessionId,
    pub location_id: LocationId,
    pub checked: bool,
}

#[derive(Debug, Clone)]
pub struct SetQuantityCommand {
    pub session_id: SessionId,
    pub location_id: LocationId,
    pub quantity: String,
}

#[derive(Debug, Clone, Copy)]
pub struct SessionProgressQuery {
    pub session_id: SessionId,
}

#[derive(Debug, Clone)]
pub struct PartHistoryQuery {
    pub part_number: String,
}

#[derive(Debug, Clone, Copy)]
pub struct ExportSessionCsvCommand {
    pub session_id: SessionId,
}

#[derive(Debug, Clone)]
pub struct ExportChecklistPdfCommand {
    pub part_number: String,
}

#[derive(Debug, Clone, Copy)]
pub struct RecordSnapshotCommand {
    pub session_id: SessionId,
}

#[derive(Debug, Clone)]
pub struct ListSnapshotsQuery {
    pub part_number: String,
}
