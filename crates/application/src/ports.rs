use shelf_audit_domain::{
    CountDetail, CountSession, LocationId, LocationRecord, NewLocation, NewSession, Progress,
    ResultSnapshot, SessionId, SheetTable,
};

use crate::{ApplicationError, Checklist, SessionView};

pub trait InventoryRepository: Send + Sync {
    fn initialize(&self) -> Result<(), ApplicationError>;

    /// Swaps the whole location master for `rows` in one transaction.
    fn replace_master(&self, rows: &[NewLocation]) -> Result<usize, ApplicationError>;

    fn search_part_numbers(&self, query: &str) -> Result<Vec<String>, ApplicationError>;

    fn list_active_locations(
        &self,
        part_number: &str,
    ) -> Result<Vec<LocationRecord>, ApplicationError>;

    fn count_active_locations(&self, part_number: &str) -> Result<usize, ApplicationError>;

    fn find_location(
        &self,
        location_id: LocationId,
    ) -> Result<Option<LocationRecord>, ApplicationError>;

    fn insert_session(
        &self,
        session: &NewSession,
        created_at: &str,
    ) -> Result<CountSession, ApplicationError>;

    fn find_session(&self, session_id: SessionId)
        -> Result<Option<CountSession>, ApplicationError>;

    fn list_sessions(&self, part_number: &str) -> Result<Vec<CountSession>, ApplicationError>;

    fn list_details(&self, session_id: SessionId) -> Result<Vec<CountDetail>, ApplicationError>;

    fn upsert_check(
        &self,
        session_id: SessionId,
        location_id: LocationId,
        checked: bool,
        checked_at: Option<&str>,
    ) -> Result<CountDetail, ApplicationError>;

    fn upsert_quantity(
        &self,
        session_id: SessionId,
        location_id: LocationId,
        quantity: Option<i64>,
    ) -> Result<CountDetail, ApplicationError>;

    /// Checked details of the session that point at active locations of `part_number`.
    fn count_checked(
        &self,
        session_id: SessionId,
        part_number: &str,
    ) -> Result<usize, ApplicationError>;

    fn insert_snapshot(
        &self,
        part_number: &str,
        progress: &Progress,
        created_at: &str,
    ) -> Result<ResultSnapshot, ApplicationError>;

    fn list_snapshots(&self, part_number: &str) -> Result<Vec<ResultSnapshot>, ApplicationError>;
}

pub trait SpreadsheetReader: Send + Sync {
    fn read_table(&self, file_name: &str, bytes: &[u8]) -> Result<SheetTable, ApplicationError>;
}

pub trait SessionCsvWriter: Send + Sync {
    fn write_session(&self, view: &SessionView) -> Result<Vec<u8>, ApplicationError>;
}

pub trait ChecklistPdfWriter: Send + Sync {
    fn write_checklist(&self, checklist: &Checklist) -> Result<Vec<u8>, ApplicationError>;
}

pub trait Clock: Send + Sync {
    fn now_timestamp_string(&self) -> String;
}
