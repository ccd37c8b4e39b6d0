use shelf_audit_application::SessionRow;
use shelf_audit_domain::{CheckState, CountSession, ImportReport, ResultSnapshot, SessionProgress};

pub fn present_import_report(report: &ImportReport) -> String {
    format!(
        "import finished: rows_read={}, skipped={}, duplicates={}, imported={}",
        report.rows_read, report.rows_skipped, report.duplicates_dropped, report.imported
    )
}

pub fn present_session_row(session: &CountSession) -> String {
    format!(
        "{}\t{}\t{}\t{}\t{}",
        session.id,
        session.part_number,
        session.created_at,
        session.operator_name,
        session.comment.as_deref().unwrap_or_default()
    )
}

pub fn present_progress(entry: &SessionProgress) -> String {
    format!(
        "{}\t{}\t{}\t{}/{}\t{:.1}%",
        entry.session.id,
        entry.session.created_at,
        entry.session.operator_name,
        entry.progress.checked,
        entry.progress.total,
        entry.progress.percentage
    )
}

pub fn present_location_row(row: &SessionRow) -> String {
    let mark = match &row.state {
        CheckState::Checked { .. } => "[x]",
        CheckState::Unchecked => "[ ]",
        CheckState::NotRecorded => "[.]",
    };
    let quantity = row
        .quantity
        .map(|quantity| quantity.to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{mark} {}\t{}\t{}\tqty={quantity}",
        row.location.id, row.location.location, row.location.description
    )
}

pub fn present_snapshot(snapshot: &ResultSnapshot) -> String {
    format!(
        "snapshot {} for {}: {}/{} ({:.1}%) at {}",
        snapshot.id,
        snapshot.part_number,
        snapshot.checked_count,
        snapshot.total,
        snapshot.percentage,
        snapshot.created_at
    )
}
