mod error;
mod ids;
mod import;
mod location;
mod progress;
mod session;

pub use error::DomainError;
pub use ids::{LocationId, SessionId, SnapshotId};
pub use import::{clean_table, normalize_header, CleanedImport, ColumnMapping, SheetTable};
pub use location::{ImportReport, LocationRecord, NewLocation};
pub use progress::{Progress, ResultSnapshot, SessionProgress};
pub use session::{parse_quantity, CheckState, CountDetail, CountSession, NewSession};
