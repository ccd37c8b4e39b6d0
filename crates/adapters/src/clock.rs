use shelf_audit_application::Clock;
use time::macros::format_description;
use time::OffsetDateTime;
use tracing::warn;

/// UTC wall clock, second precision, fixed width so timestamps sort lexically.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_timestamp_string(&self) -> String {
        format_timestamp(OffsetDateTime::now_utc())
    }
}

fn format_timestamp(at: OffsetDateTime) -> String {
    let format = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]Z");
    at.format(format).unwrap_or_else(|error| {
        warn!(%error, "timestamp formatting failed, using component layout");
        component_timestamp(at)
    })
}

/// Same layout as the format description, built from the date parts.
fn component_timestamp(at: OffsetDateTime) -> String {
    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
        at.year(),
        u8::from(at.month()),
        at.day(),
        at.hour(),
        at.minute(),
        at.second()
    )
}
