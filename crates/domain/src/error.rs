use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("{kind} id must be positive, got {value}")]
    InvalidId { kind: &'static str, value: i64 },
    #[error("part number must not be empty")]
    EmptyPartNumber,
    #[error("location must not be empty")]
    EmptyLocation,
    #[error("operator name must not be empty")]
    EmptyOperator,
    #[error("missing required columns {missing:?}; headers found: {found:?}")]
    MissingColumns {
        missing: Vec<&'static str>,
        found: Vec<String>,
    },
    #[error("quantity must be a whole number, got {0:?}")]
    NonNumericQuantity(String),
    #[error("quantity must not be negative, got {0}")]
    NegativeQuantity(i64),
}
