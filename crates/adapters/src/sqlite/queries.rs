use rusqlite::{params, Connection, OptionalExtension, Result, Row};
use shelf_audit_domain::{
    CountDetail, CountSession, LocationId, LocationRecord, NewLocation, NewSession, Progress,
    ResultSnapshot, SessionId, SnapshotId,
};

const LOCATION_COLUMNS: &str = "id, part_number, location, description, active";
const SESSION_COLUMNS: &str = "id, part_number, operator_name, comment, created_at";
const DETAIL_COLUMNS: &str = "session_id, location_id, checked, checked_at, quantity";
const SNAPSHOT_COLUMNS: &str = "id, part_number, total, checked_count, percentage, created_at";

pub fn replace_master(conn: &mut Connection, rows: &[NewLocation]) -> Result<usize> {
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM location_base", [])?;
    let mut written = 0;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO location_base (part_number, location, description, active)
             VALUES (?1, ?2, ?3, 1)",
        )?;
        for row in rows {
            written += stmt.execute(params![row.part_number, row.location, row.description])?;
        }
    }
    tx.commit()?;
    Ok(written)
}

pub fn search_part_numbers(conn: &Connection, query: &str) -> Result<Vec<String>> {
    let pattern = format!("%{}%", escape_like(query));
    let mut stmt = conn.prepare(
        "SELECT DISTINCT part_number
         FROM location_base
         WHERE active = 1 AND part_number LIKE ?1 ESCAPE '\\'
         ORDER BY part_number",
    )?;
    let rows = stmt.query_map(params![pattern], |row| row.get(0))?;
    rows.collect()
}

pub fn list_active_locations(conn: &Connection, part_number: &str) -> Result<Vec<LocationRecord>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {LOCATION_COLUMNS}
         FROM location_base
         WHERE part_number = ?1 AND active = 1
         ORDER BY location"
    ))?;
    let rows = stmt.query_map(params![part_number], location_from_row)?;
    rows.collect()
}

pub fn count_active_locations(conn: &Connection, part_number: &str) -> Result<usize> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM location_base WHERE part_number = ?1 AND active = 1",
        params![part_number],
        |row| row.get(0),
    )?;
    Ok(to_count(count))
}

pub fn find_location(conn: &Connection, location_id: i64) -> Result<Option<LocationRecord>> {
    conn.query_row(
        &format!("SELECT {LOCATION_COLUMNS} FROM location_base WHERE id = ?1"),
        params![location_id],
        location_from_row,
    )
    .optional()
}

pub fn insert_session(
    conn: &Connection,
    session: &NewSession,
    created_at: &str,
) -> Result<CountSession> {
    conn.query_row(
        &format!(
            "INSERT INTO count_sessions (part_number, operator_name, comment, created_at)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING {SESSION_COLUMNS}"
        ),
        params![
            session.part_number,
            session.operator_name,
            session.comment,
            created_at
        ],
        session_from_row,
    )
}

pub fn find_session(conn: &Connection, session_id: i64) -> Result<Option<CountSession>> {
    conn.query_row(
        &format!("SELECT {SESSION_COLUMNS} FROM count_sessions WHERE id = ?1"),
        params![session_id],
        session_from_row,
    )
    .optional()
}

pub fn list_sessions(conn: &Connection, part_number: &str) -> Result<Vec<CountSession>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SESSION_COLUMNS}
         FROM count_sessions
         WHERE part_number = ?1
         ORDER BY created_at DESC, id DESC"
    ))?;
    let rows = stmt.query_map(params![part_number], session_from_row)?;
    rows.collect()
}

pub fn list_details(conn: &Connection, session_id: i64) -> Result<Vec<CountDetail>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {DETAIL_COLUMNS}
         FROM count_details
         WHERE session_id = ?1
         ORDER BY location_id"
    ))?;
    let rows = stmt.query_map(params![session_id], detail_from_row)?;
    rows.collect()
}

pub fn upsert_check(
    conn: &Connection,
    session_id: i64,
    location_id: i64,
    checked: bool,
    checked_at: Option<&str>,
) -> Result<CountDetail> {
    conn.query_row(
        &format!(
            "INSERT INTO count_details (session_id, location_id, checked, checked_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(session_id, location_id) DO UPDATE SET
                checked = excluded.checked,
                checked_at = excluded.checked_at
             RETURNING {DETAIL_COLUMNS}"
        ),
        params![session_id, location_id, checked, checked_at],
        detail_from_row,
    )
}

pub fn upsert_quantity(
    conn: &Connection,
    session_id: i64,
    location_id: i64,
    quantity: Option<i64>,
) -> Result<CountDetail> {
    conn.query_row(
        &format!(
            "INSERT INTO count_details (session_id, location_id, quantity)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(session_id, location_id) DO UPDATE SET
                quantity = excluded.quantity
             RETURNING {DETAIL_COLUMNS}"
        ),
        params![session_id, location_id, quantity],
        detail_from_row,
    )
}

pub fn count_checked(conn: &Connection, session_id: i64, part_number: &str) -> Result<usize> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*)
         FROM count_details d
         JOIN location_base l ON l.id = d.location_id
         WHERE d.session_id = ?1
           AND d.checked = 1
           AND l.part_number = ?2
           AND l.active = 1",
        params![session_id, part_number],
        |row| row.get(0),
    )?;
    Ok(to_count(count))
}

pub fn insert_snapshot(
    conn: &Connection,
    part_number: &str,
    progress: &Progress,
    created_at: &str,
) -> Result<ResultSnapshot> {
    conn.query_row(
        &format!(
            "INSERT INTO result_snapshots (part_number, total, checked_count, percentage, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING {SNAPSHOT_COLUMNS}"
        ),
        params![
            part_number,
            to_sql_count(progress.total),
            to_sql_count(progress.checked),
            progress.percentage,
            created_at
        ],
        snapshot_from_row,
    )
}

pub fn list_snapshots(conn: &Connection, part_number: &str) -> Result<Vec<ResultSnapshot>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SNAPSHOT_COLUMNS}
         FROM result_snapshots
         WHERE part_number = ?1
         ORDER BY created_at DESC, id DESC"
    ))?;
    let rows = stmt.query_map(params![part_number], snapshot_from_row)?;
    rows.collect()
}

fn location_from_row(row: &Row<'_>) -> Result<LocationRecord> {
    Ok(LocationRecord {
        id: LocationId::new(row.get(0)?).map_err(|_| out_of_range(row, 0))?,
        part_number: row.get(1)?,
        location: row.get(2)?,
        description: row.get(3)?,
        active: row.get(4)?,
    })
}

fn session_from_row(row: &Row<'_>) -> Result<CountSession> {
    Ok(CountSession {
        id: SessionId::new(row.get(0)?).map_err(|_| out_of_range(row, 0))?,
        part_number: row.get(1)?,
        operator_name: row.get(2)?,
        comment: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn detail_from_row(row: &Row<'_>) -> Result<CountDetail> {
    Ok(CountDetail {
        session_id: SessionId::new(row.get(0)?).map_err(|_| out_of_range(row, 0))?,
        location_id: LocationId::new(row.get(1)?).map_err(|_| out_of_range(row, 1))?,
        checked: row.get(2)?,
        checked_at: row.get(3)?,
        quantity: row.get(4)?,
    })
}

fn snapshot_from_row(row: &Row<'_>) -> Result<ResultSnapshot> {
    Ok(ResultSnapshot {
        id: SnapshotId::new(row.get(0)?).map_err(|_| out_of_range(row, 0))?,
        part_number: row.get(1)?,
        total: to_count(row.get(2)?),
        checked_count: to_count(row.get(3)?),
        percentage: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn out_of_range(row: &Row<'_>, index: usize) -> rusqlite::Error {
    let value = row.get::<_, i64>(index).unwrap_or_default();
    rusqlite::Error::IntegralValueOutOfRange(index, value)
}

fn to_count(value: i64) -> usize {
    usize::try_from(value).unwrap_or_default()
}

fn to_sql_count(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for ch in query.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
