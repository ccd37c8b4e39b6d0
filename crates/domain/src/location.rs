use serde::{Deserialize, Serialize};

use crate::{DomainError, LocationId};

/// One row of the location master: a storage slot that should hold stock for a part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub id: LocationId,
    pub part_number: String,
    pub location: String,
    pub description: String,
    pub active: bool,
}

/// A cleaned master row ready to be written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLocation {
    pub part_number: String,
    pub location: String,
    pub description: String,
}

impl NewLocation {
    pub fn new(part_number: &str, location: &str, description: &str) -> Result<Self, DomainError> {
        let part_number = part_number.trim();
        let location = location.trim();
        if part_number.is_empty() {
            return Err(DomainError::EmptyPartNumber);
        }
        if location.is_empty() {
            return Err(DomainError::EmptyLocation);
        }
        Ok(Self {
            part_number: part_number.to_string(),
            location: location.to_string(),
            description: description.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    pub rows_read: usize,
    pub rows_skipped: usize,
    pub duplicates_dropped: usize,
    pub imported: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_location_trims_every_field() {
        let row = NewLocation::new("  PN-1 ", " A-01-02\t", "  bolt  ").expect("valid row");
        assert_eq!(row.part_number, "PN-1");
        assert_eq!(row.location, "A-01-02");
        assert_eq!(row.description, "bolt");
    }

    #[test]
    fn new_location_rejects_blank_keys() {
        assert_eq!(
            NewLocation::new("  ", "A1", ""),
            Err(DomainError::EmptyPartNumber)
        );
        assert_eq!(
            NewLocation::new("PN", "", ""),
            Err(DomainError::EmptyLocation)
        );
    }
}
