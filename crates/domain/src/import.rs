use std::collections::HashMap;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::{DomainError, NewLocation};

const PART_NUMBER_ALIASES: &[&str] = &[
    "pn",
    "partnumber",
    "material",
    "code",
    "materialcode",
    "codigo",
    "codigomaterial",
];

const LOCATION_ALIASES: &[&str] = &[
    "locations",
    "location",
    "saplocation",
    "physicallocation",
    "ubicaciones",
    "ubicacion",
    "ubicacionessap",
    "ubicacionfisica",
];

const DESCRIPTION_ALIASES: &[&str] = &["description", "desc", "descripcion"];

/// Header row plus data rows, every cell already rendered as text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMapping {
    pub part_number: usize,
    pub location: usize,
    pub description: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanedImport {
    pub rows: Vec<NewLocation>,
    pub rows_read: usize,
    pub rows_skipped: usize,
    pub duplicates_dropped: usize,
}

/// Lower-cases, folds accented letters to their base letter and drops everything
/// that is not a letter or digit: `"Ubicación SAP"` becomes `"ubicacionsap"`.
pub fn normalize_header(raw: &str) -> String {
    raw.nfkd()
        .filter(|ch| !is_combining_mark(*ch))
        .flat_map(char::to_lowercase)
        .filter(|ch| ch.is_alphanumeric())
        .collect()
}

impl ColumnMapping {
    pub fn resolve(headers: &[String]) -> Result<Self, DomainError> {
        let mut by_key: HashMap<String, usize> = HashMap::new();
        for (index, header) in headers.iter().enumerate() {
            let key = normalize_header(header);
            if !key.is_empty() {
                by_key.insert(key, index);
            }
        }

        let pick = |aliases: &[&str]| aliases.iter().find_map(|alias| by_key.get(*alias).copied());

        let part_number = pick(PART_NUMBER_ALIASES);
        let location = pick(LOCATION_ALIASES);
        match (part_number, location) {
            (Some(part_number), Some(location)) => Ok(Self {
                part_number,
                location,
                description: pick(DESCRIPTION_ALIASES),
            }),
            (part_number, location) => {
                let mut missing = Vec::new();
                if part_number.is_none() {
                    missing.push("part number");
                }
                if location.is_none() {
                    missing.push("location");
                }
                Err(DomainError::MissingColumns {
                    missing,
                    found: headers.to_vec(),
                })
            }
        }
    }
}

/// Maps, trims and de-duplicates the rows of an uploaded master sheet.
///
/// Rows with a blank part number or location are skipped. When the same
/// `(part_number, location)` pair appears more than once the last row wins,
/// keeping the position of the first appearance.
pub fn clean_table(table: &SheetTable) -> Result<CleanedImport, DomainError> {
    let mapping = ColumnMapping::resolve(&table.headers)?;
    let mut cleaned = CleanedImport {
        rows_read: table.rows.len(),
        ..CleanedImport::default()
    };
    let mut seen: HashMap<(String, String), usize> = HashMap::new();

    for row in &table.rows {
        let cell = |index: usize| row.get(index).map(String::as_str).unwrap_or_default();
        let description = mapping.description.map(cell).unwrap_or_default();
        let Ok(location) =
            NewLocation::new(cell(mapping.part_number), cell(mapping.location), description)
        else {
            cleaned.rows_skipped += 1;
            continue;
        };

        let key = (location.part_number.clone(), location.location.clone());
        match seen.get(&key) {
            Some(&position) => {
                cleaned.rows[position] = location;
                cleaned.duplicates_dropped += 1;
            }
            None => {
                seen.insert(key, cleaned.rows.len());
                cleaned.rows.push(location);
            }
        }
    }

    Ok(cleaned)
}
