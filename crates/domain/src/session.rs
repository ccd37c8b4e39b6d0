use serde::{Deserialize, Serialize};

use crate::{DomainError, LocationId, SessionId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountSession {
    pub id: SessionId,
    pub part_number: String,
    pub operator_name: String,
    pub comment: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSession {
    pub part_number: String,
    pub operator_name: String,
    pub comment: Option<String>,
}

impl NewSession {
    pub fn new(
        part_number: &str,
        operator_name: &str,
        comment: Option<&str>,
    ) -> Result<Self, DomainError> {
        let part_number = part_number.trim();
        let operator_name = operator_name.trim();
        if part_number.is_empty() {
            return Err(DomainError::EmptyPartNumber);
        }
        if operator_name.is_empty() {
            return Err(DomainError::EmptyOperator);
        }
        let comment = comment
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string);
        Ok(Self {
            part_number: part_number.to_string(),
            operator_name: operator_name.to_string(),
            comment,
        })
    }
}

/// Stored per-session state of one location. Absent until first touched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountDetail {
    pub session_id: SessionId,
    pub location_id: LocationId,
    pub checked: bool,
    pub checked_at: Option<String>,
    pub quantity: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CheckState {
    NotRecorded,
    Unchecked,
    Checked { at: String },
}

impl CheckState {
    pub fn from_detail(detail: Option<&CountDetail>) -> Self {
        match detail {
            None => Self::NotRecorded,
            Some(CountDetail {
                checked: true,
                checked_at,
                ..
            }) => Self::Checked {
                at: checked_at.clone().unwrap_or_default(),
            },
            Some(_) => Self::Unchecked,
        }
    }

    pub fn is_checked(&self) -> bool {
        matches!(self, Self::Checked { .. })
    }

    pub fn checked_at(&self) -> Option<&str> {
        match self {
            Self::Checked { at } => Some(at.as_str()),
            _ => None,
        }
    }
}

/// Parses operator input for a counted quantity. Blank input clears the quantity.
pub fn parse_quantity(raw: &str) -> Result<Option<i64>, DomainError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let value = trimmed
        .parse::<i64>()
        .map_err(|_| DomainError::NonNumericQuantity(trimmed.to_string()))?;
    if value < 0 {
        return Err(DomainError::NegativeQuantity(value));
    }
    Ok(Some(value))
}
