use std::collections::HashMap;

use shelf_audit_domain::{
    clean_table, parse_quantity, CheckState, CountDetail, CountSession, ImportReport, LocationId,
    LocationRecord, NewSession, Progress, ResultSnapshot, SessionId, SessionProgress,
};
use tracing::{debug, info};

use crate::{
    ApplicationError, BootstrapInventoryCommand, Checklist, ChecklistPdfWriter, Clock,
    CreateSessionCommand, ExportChecklistPdfCommand, ExportFile, ExportSessionCsvCommand,
    ImportMasterCommand, InventoryRepository, ListSessionsCommand, ListSnapshotsQuery,
    OpenSessionCommand, PartHistoryQuery, RecordSnapshotCommand, SearchPartsCommand,
    SessionCsvWriter, SessionProgressQuery, SessionRow, SessionView, SetQuantityCommand,
    SpreadsheetReader, ToggleLocationCommand,
};

pub struct ApplicationService {
    inventory: Box<dyn InventoryRepository>,
    spreadsheets: Box<dyn SpreadsheetReader>,
    csv: Box<dyn SessionCsvWriter>,
    pdf: Box<dyn ChecklistPdfWriter>,
    clock: Box<dyn Clock>,
}

impl ApplicationService {
    pub fn new(
        inventory: Box<dyn InventoryRepository>,
        spreadsheets: Box<dyn SpreadsheetReader>,
        csv: Box<dyn SessionCsvWriter>,
        pdf: Box<dyn ChecklistPdfWriter>,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            inventory,
            spreadsheets,
            csv,
            pdf,
            clock,
        }
    }

    pub fn bootstrap_inventory(
        &self,
        _command: BootstrapInventoryCommand,
    ) -> Result<(), ApplicationError> {
        self.inventory.initialize()
    }

    pub fn import_master(
        &self,
        command: ImportMasterCommand,
    ) -> Result<ImportReport, ApplicationError> {
        if command.bytes.is_empty() {
            return Err(ApplicationError::InvalidInput(
                "uploaded file is empty".to_string(),
            ));
        }

        let table = self
            .spreadsheets
            .read_table(&command.file_name, &command.bytes)?;
        let cleaned = clean_table(&table)?;
        let imported = self.inventory.replace_master(&cleaned.rows)?;

        info!(
            file = %command.file_name,
            rows_read = cleaned.rows_read,
            rows_skipped = cleaned.rows_skipped,
            duplicates_dropped = cleaned.duplicates_dropped,
            imported,
            "location master replaced"
        );

        Ok(ImportReport {
            rows_read: cleaned.rows_read,
            rows_skipped: cleaned.rows_skipped,
            duplicates_dropped: cleaned.duplicates_dropped,
            imported,
        })
    }

    pub fn search_parts(&self, command: SearchPartsCommand) -> Result<Vec<String>, ApplicationError> {
        let query = command.query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        self.inventory.search_part_numbers(query)
    }

    pub fn create_session(
        &self,
        command: CreateSessionCommand,
    ) -> Result<CountSession, ApplicationError> {
        let new_session = NewSession::new(
            &command.part_number,
            &command.operator_name,
            command.comment.as_deref(),
        )?;
        let now = self.clock.now_timestamp_string();
        let session = self.inventory.insert_session(&new_session, &now)?;
        info!(
            session_id = session.id.get(),
            part_number = %session.part_number,
            operator = %session.operator_name,
            "count session opened"
        );
        Ok(session)
    }

    pub fn list_sessions(
        &self,
        command: ListSessionsCommand,
    ) -> Result<Vec<CountSession>, ApplicationError> {
        self.inventory.list_sessions(command.part_number.trim())
    }

    pub fn open_session(&self, command: OpenSessionCommand) -> Result<SessionView, ApplicationError> {
        let session = self.load_session(command.session_id)?;
        if session.part_number != command.part_number.trim() {
            return Err(ApplicationError::NotFound(format!(
                "session id={} does not belong to part number {}",
                command.session_id,
                command.part_number.trim()
            )));
        }
        self.session_view(session)
    }

    pub fn toggle_location(
        &self,
        command: ToggleLocationCommand,
    ) -> Result<CountDetail, ApplicationError> {
        let session = self.load_session(command.session_id)?;
        let location = self.load_location_for(&session, command.location_id)?;

        let now = self.clock.now_timestamp_string();
        let checked_at = command.checked.then_some(now.as_str());
        let detail =
            self.inventory
                .upsert_check(session.id, location.id, command.checked, checked_at)?;
        debug!(
            session_id = session.id.get(),
            location_id = location.id.get(),
            checked = command.checked,
            "location toggled"
        );
        Ok(detail)
    }

    pub fn set_quantity(&self, command: SetQuantityCommand) -> Result<CountDetail, ApplicationError> {
        let session = self.load_session(command.session_id)?;
        let location = self.load_location_for(&session, command.location_id)?;
        let quantity = parse_quantity(&command.quantity)?;
        let detail = self
            .inventory
            .upsert_quantity(session.id, location.id, quantity)?;
        debug!(
            session_id = session.id.get(),
            location_id = location.id.get(),
            ?quantity,
            "quantity recorded"
        );
        Ok(detail)
    }

    pub fn session_progress(
        &self,
        query: SessionProgressQuery,
    ) -> Result<SessionProgress, ApplicationError> {
        let session = self.load_session(query.session_id)?;
        let total = self.inventory.count_active_locations(&session.part_number)?;
        let checked = self
            .inventory
            .count_checked(session.id, &session.part_number)?;
        Ok(SessionProgress {
            session,
            progress: Progress::compute(total, checked),
        })
    }

    /// Progress of every session of a part number, newest first.
    pub fn part_history(
        &self,
        query: PartHistoryQuery,
    ) -> Result<Vec<SessionProgress>, ApplicationError> {
        let part_number = query.part_number.trim();
        let sessions = self.inventory.list_sessions(part_number)?;
        let total = self.inventory.count_active_locations(part_number)?;
        sessions
            .into_iter()
            .map(|session| {
                let checked = self.inventory.count_checked(session.id, part_number)?;
                Ok(SessionProgress {
                    session,
                    progress: Progress::compute(total, checked),
                })
            })
            .collect()
    }

    pub fn export_session_csv(
        &self,
        command: ExportSessionCsvCommand,
    ) -> Result<ExportFile, ApplicationError> {
        let session = self.load_session(command.session_id)?;
        let view = self.session_view(session)?;
        let bytes = self.csv.write_session(&view)?;
        Ok(ExportFile {
            file_name: format!(
                "session_{}_{}.csv",
                view.session.id,
                file_name_safe(&view.session.part_number)
            ),
            content_type: "text/csv; charset=utf-8",
            bytes,
        })
    }

    pub fn export_checklist_pdf(
        &self,
        command: ExportChecklistPdfCommand,
    ) -> Result<ExportFile, ApplicationError> {
        let part_number = command.part_number.trim();
        if part_number.is_empty() {
            return Err(ApplicationError::InvalidInput(
                "part number must not be empty".to_string(),
            ));
        }

        let locations = self.inventory.list_active_locations(part_number)?;
        if locations.is_empty() {
            return Err(ApplicationError::NotFound(format!(
                "no active locations for part number {part_number}"
            )));
        }

        let checklist = Checklist {
            part_number: part_number.to_string(),
            generated_at: self.clock.now_timestamp_string(),
            locations,
        };
        let bytes = self.pdf.write_checklist(&checklist)?;
        Ok(ExportFile {
            file_name: format!("checklist_{}.pdf", file_name_safe(part_number)),
            content_type: "application/pdf",
            bytes,
        })
    }

    pub fn record_snapshot(
        &self,
        command: RecordSnapshotCommand,
    ) -> Result<ResultSnapshot, ApplicationError> {
        let current = self.session_progress(SessionProgressQuery {
            session_id: command.session_id,
        })?;
        let now = self.clock.now_timestamp_string();
        self.inventory
            .insert_snapshot(&current.session.part_number, &current.progress, &now)
    }

    pub fn list_snapshots(
        &self,
        query: ListSnapshotsQuery,
    ) -> Result<Vec<ResultSnapshot>, ApplicationError> {
        self.inventory.list_snapshots(query.part_number.trim())
    }

    fn load_session(&self, session_id: SessionId) -> Result<CountSession, ApplicationError> {
        self.inventory.find_session(session_id)?.ok_or_else(|| {
            ApplicationError::NotFound(format!("session not found for id={session_id}"))
        })
    }

    fn load_location_for(
        &self,
        session: &CountSession,
        location_id: LocationId,
    ) -> Result<LocationRecord, ApplicationError> {
        let location = self
            .inventory
            .find_location(location_id)?
            .ok_or_else(|| {
                ApplicationError::NotFound(format!("location not found for id={location_id}"))
            })?;
        if location.part_number != session.part_number {
            return Err(ApplicationError::InvalidInput(format!(
                "location id={} belongs to part number {}, session id={} counts {}",
                location.id, location.part_number, session.id, session.part_number
            )));
        }
        Ok(location)
    }

    fn session_view(&self, session: CountSession) -> Result<SessionView, ApplicationError> {
        let locations = self.inventory.list_active_locations(&session.part_number)?;
        let mut details: HashMap<_, _> = self
            .inventory
            .list_details(session.id)?
            .into_iter()
            .map(|detail| (detail.location_id, detail))
            .collect();

        let rows: Vec<SessionRow> = locations
            .into_iter()
            .map(|location| {
                let detail = details.remove(&location.id);
                SessionRow {
                    state: CheckState::from_detail(detail.as_ref()),
                    quantity: detail.and_then(|detail| detail.quantity),
                    location,
                }
            })
            .collect();
        let checked = rows.iter().filter(|row| row.state.is_checked()).count();
        let progress = Progress::compute(rows.len(), checked);

        Ok(SessionView {
            session,
            rows,
            progress,
        })
    }
}

fn file_name_safe(part_number: &str) -> String {
    part_number
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '-' {
                ch
            } else {
                '_'
            }
        })
        .collect()
}
