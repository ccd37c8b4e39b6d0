use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use shelf_audit_application::{ApplicationError, SpreadsheetReader};
use shelf_audit_domain::SheetTable;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Reads the first worksheet of an Excel/OpenDocument workbook, or a delimited text file.
#[derive(Debug, Default)]
pub struct CalamineSpreadsheetReader;

impl SpreadsheetReader for CalamineSpreadsheetReader {
    fn read_table(&self, file_name: &str, bytes: &[u8]) -> Result<SheetTable, ApplicationError> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("xlsx" | "xlsm" | "xlsb" | "xls" | "ods") => read_workbook(bytes),
            Some("csv" | "txt") => read_delimited(bytes),
            _ => Err(ApplicationError::Spreadsheet(format!(
                "unsupported file type: {file_name} (expected .xlsx, .xls, .ods or .csv)"
            ))),
        }
    }
}

fn read_workbook(bytes: &[u8]) -> Result<SheetTable, ApplicationError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(|error| {
        ApplicationError::Spreadsheet(format!("failed to open workbook: {error}"))
    })?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ApplicationError::Spreadsheet("workbook has no worksheet".to_string()))?
        .map_err(|error| {
            ApplicationError::Spreadsheet(format!("failed to read worksheet: {error}"))
        })?;

    let mut rows = range.rows();
    let header_row = rows.next().ok_or_else(|| {
        ApplicationError::Spreadsheet("worksheet has no header row".to_string())
    })?;

    Ok(SheetTable {
        headers: header_row.iter().map(cell_text).collect(),
        rows: rows
            .map(|row| row.iter().map(cell_text).collect())
            .collect(),
    })
}

fn read_delimited(bytes: &[u8]) -> Result<SheetTable, ApplicationError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(sniff_delimiter(bytes))
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(delimited_error)?
        .iter()
        .map(|header| header.trim().to_string())
        .collect();
    if headers.iter().all(String::is_empty) {
        return Err(ApplicationError::Spreadsheet(
            "file has no header row".to_string(),
        ));
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(delimited_error)?;
        rows.push(record.iter().map(|cell| cell.trim().to_string()).collect());
    }

    Ok(SheetTable { headers, rows })
}

fn delimited_error(error: csv::Error) -> ApplicationError {
    ApplicationError::Spreadsheet(format!("failed to read delimited file: {error}"))
}

/// Spreadsheet tools in comma-decimal locales save `;`-separated files.
fn sniff_delimiter(bytes: &[u8]) -> u8 {
    let first_line = bytes.split(|byte| *byte == b'\n').next().unwrap_or_default();
    let semicolons = first_line.iter().filter(|byte| **byte == b';').count();
    let commas = first_line.iter().filter(|byte| **byte == b',').count();
    if semicolons > commas {
        b';'
    } else {
        b','
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(value) => value.trim().to_string(),
        Data::Int(value) => value.to_string(),
        Data::Float(value) if value.fract() == 0.0 && value.abs() < 1e15 => {
            format!("{}", *value as i64)
        }
        Data::Float(value) => value.to_string(),
        Data::Bool(value) => value.to_string(),
        other => other.to_string().trim().to_string(),
    }
}
