use shelf_audit_domain::DomainError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("io error: {0}")]
    Io(String),
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("spreadsheet error: {0}")]
    Spreadsheet(String),
    #[error("report error: {0}")]
    Report(String),
}

impl ApplicationError {
    /// True when the caller sent something unusable, as opposed to the system failing.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Domain(_) | Self::InvalidInput(_) | Self::Spreadsheet(_)
        )
    }
}
