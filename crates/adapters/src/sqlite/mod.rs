mod queries;

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use rusqlite::Connection;
use shelf_audit_application::{ApplicationError, InventoryRepository};
use shelf_audit_domain::{
    CountDetail, CountSession, LocationId, LocationRecord, NewLocation, NewSession, Progress,
    ResultSnapshot, SessionId,
};
use tracing::debug;

use crate::migrations::MIGRATIONS;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct SqliteInventoryRepository {
    path: PathBuf,
}

impl SqliteInventoryRepository {
    pub fn new(path: String) -> Self {
        Self {
            path: PathBuf::from(path),
        }
    }

    fn open_connection(&self) -> Result<Connection, ApplicationError> {
        let conn = Connection::open(&self.path).map_err(persistence)?;
        conn.busy_timeout(BUSY_TIMEOUT).map_err(persistence)?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")
            .map_err(persistence)?;
        Ok(conn)
    }
}

fn persistence(error: rusqlite::Error) -> ApplicationError {
    ApplicationError::Persistence(error.to_string())
}

impl InventoryRepository for SqliteInventoryRepository {
    fn initialize(&self) -> Result<(), ApplicationError> {
        if self.path.as_os_str().is_empty() {
            return Err(ApplicationError::InvalidInput(
                "database path must not be empty".to_string(),
            ));
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|error| ApplicationError::Io(error.to_string()))?;
            }
        }

        let conn = self.open_connection()?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .map_err(persistence)?;

        for migration in MIGRATIONS {
            conn.execute_batch(migration).map_err(persistence)?;
        }

        debug!(path = %self.path.display(), "inventory schema ready");
        Ok(())
    }

    fn replace_master(&self, rows: &[NewLocation]) -> Result<usize, ApplicationError> {
        let mut conn = self.open_connection()?;
        queries::replace_master(&mut conn, rows).map_err(persistence)
    }

    fn search_part_numbers(&self, query: &str) -> Result<Vec<String>, ApplicationError> {
        let conn = self.open_connection()?;
        queries::search_part_numbers(&conn, query).map_err(persistence)
    }

    fn list_active_locations(
        &self,
        part_number: &str,
    ) -> Result<Vec<LocationRecord>, ApplicationError> {
        let conn = self.open_connection()?;
        queries::list_active_locations(&conn, part_number).map_err(persistence)
    }

    fn count_active_locations(&self, part_number: &str) -> Result<usize, ApplicationError> {
        let conn = self.open_connection()?;
        queries::count_active_locations(&conn, part_number).map_err(persistence)
    }

    fn find_location(
        &self,
        location_id: LocationId,
    ) -> Result<Option<LocationRecord>, ApplicationError> {
        let conn = self.open_connection()?;
        queries::find_location(&conn, location_id.get()).map_err(persistence)
    }

    fn insert_session(
        &self,
        session: &NewSession,
        created_at: &str,
    ) -> Result<CountSession, ApplicationError> {
        let conn = self.open_connection()?;
        queries::insert_session(&conn, session, created_at).map_err(persistence)
    }

    fn find_session(
        &self,
        session_id: SessionId,
    ) -> Result<Option<CountSession>, ApplicationError> {
        let conn = self.open_connection()?;
        queries::find_session(&conn, session_id.get()).map_err(persistence)
    }

    fn list_sessions(&self, part_number: &str) -> Result<Vec<CountSession>, ApplicationError> {
        let conn = self.open_connection()?;
        queries::list_sessions(&conn, part_number).map_err(persistence)
    }

    fn list_details(&self, session_id: SessionId) -> Result<Vec<CountDetail>, ApplicationError> {
        let conn = self.open_connection()?;
        queries::list_details(&conn, session_id.get()).map_err(persistence)
    }

    fn upsert_check(
        &self,
        session_id: SessionId,
        location_id: LocationId,
        checked: bool,
        checked_at: Option<&str>,
    ) -> Result<CountDetail, ApplicationError> {
        let conn = self.open_connection()?;
        queries::upsert_check(
            &conn,
            session_id.get(),
            location_id.get(),
            checked,
            checked_at,
        )
        .map_err(persistence)
    }

    fn upsert_quantity(
        &self,
        session_id: SessionId,
        location_id: LocationId,
        quantity: Option<i64>,
    ) -> Result<CountDetail, ApplicationError> {
        let conn = self.open_connection()?;
        queries::upsert_quantity(&conn, session_id.get(), location_id.get(), quantity)
            .map_err(persistence)
    }

    fn count_checked(
        &self,
        session_id: SessionId,
        part_number: &str,
    ) -> Result<usize, ApplicationError> {
        let conn = self.open_connection()?;
        queries::count_checked(&conn, session_id.get(), part_number).map_err(persistence)
    }

    fn insert_snapshot(
        &self,
        part_number: &str,
        progress: &Progress,
        created_at: &str,
    ) -> Result<ResultSnapshot, ApplicationError> {
        let conn = self.open_connection()?;
        queries::insert_snapshot(&conn, part_number, progress, created_at).map_err(persistence)
    }

    fn list_snapshots(&self, part_number: &str) -> Result<Vec<ResultSnapshot>, ApplicationError> {
        let conn = self.open_connection()?;
        queries::list_snapshots(&conn, part_number).map_err(persistence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn repo(dir: &TempDir) -> SqliteInventoryRepository {
        let db_path = dir.path().join("inventory.sqlite3");
        let repo = SqliteInventoryRepository::new(db_path.to_string_lossy().to_string());
        repo.initialize().expect("initialize");
        repo
    }

    fn rows(pairs: &[(&str, &str, &str)]) -> Vec<NewLocation> {
        pairs
            .iter()
            .map(|(part, location, description)| {
                NewLocation::new(part, location, description).expect("row")
            })
            .collect()
    }

    fn session(repo: &SqliteInventoryRepository, part: &str, created_at: &str) -> CountSession {
        repo.insert_session(
            &NewSession::new(part, "Ana", Some("aisle 4")).expect("session"),
            created_at,
        )
        .expect("insert session")
    }

    #[test]
    fn initialize_creates_schema() {
        let dir = TempDir::new().expect("tempdir");
        let db_path = dir.path().join("nested").join("inventory.sqlite3");
        let repo = SqliteInventoryRepository::new(db_path.to_string_lossy().to_string());
        repo.initialize().expect("initialize");
        repo.initialize().expect("initialize is idempotent");

        let conn = Connection::open(db_path).expect("open");
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table'
                 AND name IN ('location_base', 'count_sessions', 'count_details', 'result_snapshots')",
                [],
                |row| row.get(0),
            )
            .expect("query");
        assert_eq!(count, 4);
    }

    #[test]
    fn replace_master_keeps_only_latest_import() {
        let dir = TempDir::new().expect("tempdir");
        let repo = repo(&dir);

        repo.replace_master(&rows(&[("P1", "A-01", "old"), ("P9", "Z-01", "")]))
            .expect("first import");
        let written = repo
            .replace_master(&rows(&[("P1", "A-02", "new"), ("P2", "B-01", "")]))
            .expect("second import");
        assert_eq!(written, 2);

        let p1 = repo.list_active_locations("P1").expect("list");
        assert_eq!(p1.len(), 1);
        assert_eq!(p1[0].location, "A-02");
        assert_eq!(p1[0].description, "new");
        assert!(p1[0].active);
        assert!(repo.list_active_locations("P9").expect("list").is_empty());
    }

    #[test]
    fn failed_replace_leaves_master_untouched() {
        let dir = TempDir::new().expect("tempdir");
        let repo = repo(&dir);
        repo.replace_master(&rows(&[("P1", "A-01", "")]))
            .expect("seed");

        let duplicated = rows(&[("P2", "B-01", ""), ("P2", "B-01", "")]);
        assert!(matches!(
            repo.replace_master(&duplicated),
            Err(ApplicationError::Persistence(_))
        ));

        assert_eq!(repo.count_active_locations("P1").expect("count"), 1);
        assert_eq!(repo.count_active_locations("P2").expect("count"), 0);
    }

    #[test]
    fn search_is_case_insensitive_and_distinct() {
        let dir = TempDir::new().expect("tempdir");
        let repo = repo(&dir);
        repo.replace_master(&rows(&[
            ("ABC-1", "A-01", ""),
            ("ABC-1", "A-02", ""),
            ("abc-2", "B-01", ""),
            ("XYZ", "C-01", ""),
        ]))
        .expect("import");

        let parts = repo.search_part_numbers("abc").expect("search");
        assert_eq!(parts, vec!["ABC-1".to_string(), "abc-2".to_string()]);
        assert!(repo.search_part_numbers("%").expect("search").is_empty());
    }

    #[test]
    fn toggle_then_untoggle_clears_checked_at() {
        let dir = TempDir::new().expect("tempdir");
        let repo = repo(&dir);
        repo.replace_master(&rows(&[("P1", "A-01", "")]))
            .expect("import");
        let location = repo.list_active_locations("P1").expect("list").remove(0);
        let session = session(&repo, "P1", "2026-10-16T08:00:00Z");

        let on = repo
            .upsert_check(session.id, location.id, true, Some("2026-10-16T08:05:00Z"))
            .expect("check");
        assert!(on.checked);
        let off = repo
            .upsert_check(session.id, location.id, false, None)
            .expect("uncheck");
        assert!(!off.checked);
        assert_eq!(off.checked_at, None);

        let details = repo.list_details(session.id).expect("details");
        assert_eq!(details.len(), 1);
    }

    #[test]
    fn quantity_upsert_preserves_check_flag() {
        let dir = TempDir::new().expect("tempdir");
        let repo = repo(&dir);
        repo.replace_master(&rows(&[("P1", "A-01", "")]))
            .expect("import");
        let location = repo.list_active_locations("P1").expect("list").remove(0);
        let session = session(&repo, "P1", "2026-10-16T08:00:00Z");

        repo.upsert_check(session.id, location.id, true, Some("2026-10-16T08:05:00Z"))
            .expect("check");
        let detail = repo
            .upsert_quantity(session.id, location.id, Some(12))
            .expect("quantity");
        assert!(detail.checked);
        assert_eq!(detail.quantity, Some(12));
        assert_eq!(detail.checked_at.as_deref(), Some("2026-10-16T08:05:00Z"));

        let cleared = repo
            .upsert_quantity(session.id, location.id, None)
            .expect("clear");
        assert_eq!(cleared.quantity, None);
    }

    #[test]
    fn sessions_list_newest_first_and_count_checked() {
        let dir = TempDir::new().expect("tempdir");
        let repo = repo(&dir);
        repo.replace_master(&rows(&[
            ("P1", "A-01", ""),
            ("P1", "A-02", ""),
            ("P1", "A-03", ""),
        ]))
        .expect("import");
        let older = session(&repo, "P1", "2026-10-15T08:00:00Z");
        let newer = session(&repo, "P1", "2026-10-16T08:00:00Z");
        session(&repo, "P2", "2026-10-17T08:00:00Z");

        let listed = repo.list_sessions("P1").expect("list");
        assert_eq!(
            listed.iter().map(|s| s.id).collect::<Vec<_>>(),
            vec![newer.id, older.id]
        );
        assert_eq!(listed[0].comment.as_deref(), Some("aisle 4"));

        let location = repo.list_active_locations("P1").expect("list").remove(0);
        repo.upsert_check(older.id, location.id, true, Some("2026-10-15T09:00:00Z"))
            .expect("check");
        assert_eq!(repo.count_checked(older.id, "P1").expect("count"), 1);
        assert_eq!(repo.count_checked(newer.id, "P1").expect("count"), 0);
        assert_eq!(repo.count_active_locations("P1").expect("count"), 3);
    }

    #[test]
    fn reimport_drops_details_of_removed_locations() {
        let dir = TempDir::new().expect("tempdir");
        let repo = repo(&dir);
        repo.replace_master(&rows(&[("P1", "A-01", "")]))
            .expect("import");
        let location = repo.list_active_locations("P1").expect("list").remove(0);
        let session = session(&repo, "P1", "2026-10-16T08:00:00Z");
        repo.upsert_check(session.id, location.id, true, Some("2026-10-16T08:05:00Z"))
            .expect("check");

        repo.replace_master(&rows(&[("P1", "A-01", "")]))
            .expect("reimport");

        assert!(repo.list_details(session.id).expect("details").is_empty());
        assert!(repo.find_location(location.id).expect("find").is_none());
        assert!(repo.find_session(session.id).expect("find").is_some());
    }

    #[test]
    fn snapshots_roundtrip_newest_first() {
        let dir = TempDir::new().expect("tempdir");
        let repo = repo(&dir);

        let first = repo
            .insert_snapshot("P1", &Progress::compute(3, 1), "2026-10-16T08:00:00Z")
            .expect("snapshot");
        let second = repo
            .insert_snapshot("P1", &Progress::compute(3, 3), "2026-10-16T09:00:00Z")
            .expect("snapshot");
        assert_eq!(first.percentage, 33.3);

        let listed = repo.list_snapshots("P1").expect("list");
        assert_eq!(listed, vec![second, first]);
    }
}
