use shelf_audit_application::{ApplicationError, SessionCsvWriter, SessionView};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

const HEADER: [&str; 9] = [
    "Part number",
    "Operator",
    "Session created",
    "Location",
    "Description",
    "Checked",
    "Quantity",
    "Checked at",
    "Comment",
];

/// Semicolon separated, BOM-prefixed UTF-8 with CRLF line endings, which spreadsheet
/// tools open without an import wizard.
#[derive(Debug, Default)]
pub struct SemicolonCsvWriter;

impl SessionCsvWriter for SemicolonCsvWriter {
    fn write_session(&self, view: &SessionView) -> Result<Vec<u8>, ApplicationError> {
        let mut out = UTF8_BOM.to_vec();
        {
            let mut writer = csv::WriterBuilder::new()
                .delimiter(b';')
                .terminator(csv::Terminator::CRLF)
                .from_writer(&mut out);

            writer.write_record(HEADER).map_err(report_error)?;

            let session = &view.session;
            let comment = session.comment.as_deref().unwrap_or_default();
            for row in &view.rows {
                let quantity = row
                    .quantity
                    .map(|quantity| quantity.to_string())
                    .unwrap_or_default();
                writer
                    .write_record([
                        session.part_number.as_str(),
                        session.operator_name.as_str(),
                        session.created_at.as_str(),
                        row.location.location.as_str(),
                        row.location.description.as_str(),
                        if row.state.is_checked() { "yes" } else { "no" },
                        quantity.as_str(),
                        row.state.checked_at().unwrap_or_default(),
                        comment,
                    ])
                    .map_err(report_error)?;
            }

            writer
                .flush()
                .map_err(|error| ApplicationError::Report(error.to_string()))?;
        }
        Ok(out)
    }
}

fn report_error(error: csv::Error) -> ApplicationError {
    ApplicationError::Report(format!("failed to write csv: {error}"))
}

#[cfg(test)]
mod tests {
    use shelf_audit_application::SessionRow;
    use shelf_audit_domain::{
        CheckState, CountSession, LocationId, LocationRecord, Progress, SessionId,
    };

    use super::*;

    fn location(id: i64, location: &str, description: &str) -> LocationRecord {
        LocationRecord {
            id: LocationId::new(id).expect("id"),
            part_number: "P1".to_string(),
            location: location.to_string(),
            description: description.to_string(),
            active: true,
        }
    }

    #[test]
    fn writes_one_row_per_location_with_blank_unset_fields() {
        let view = SessionView {
            session: CountSession {
                id: SessionId::new(3).expect("id"),
                part_number: "P1".to_string(),
                operator_name: "Ana".to_string(),
                comment: Some("aisle; north".to_string()),
                created_at: "2026-10-16T08:00:00Z".to_string(),
            },
            rows: vec![
                SessionRow {
                    location: location(1, "A-01", "Tornillo"),
                    state: CheckState::Checked {
                        at: "2026-10-16T08:10:00Z".to_string(),
                    },
                    quantity: Some(5),
                },
                SessionRow {
                    location: location(2, "A-02", ""),
                    state: CheckState::NotRecorded,
                    quantity: None,
                },
            ],
            progress: Progress::compute(2, 1),
        };

        let bytes = SemicolonCsvWriter.write_session(&view).expect("csv");
        assert!(bytes.starts_with(UTF8_BOM));

        let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).expect("utf8");
        let lines: Vec<&str> = text.split("\r\n").collect();
        assert_eq!(
            lines,
            vec![
                "Part number;Operator;Session created;Location;Description;Checked;Quantity;Checked at;Comment",
                "P1;Ana;2026-10-16T08:00:00Z;A-01;Tornillo;yes;5;2026-10-16T08:10:00Z;\"aisle; north\"",
                "P1;Ana;2026-10-16T08:00:00Z;A-02;;no;;;\"aisle; north\"",
                "",
            ]
        );
    }
}
