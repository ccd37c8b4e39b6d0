use std::env;

const DEFAULT_DATABASE: &str = "shelf-audit.sqlite3";
const DEFAULT_BIND: &str = "127.0.0.1:8080";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database_path: String,
    pub bind_addr: String,
    pub max_upload_bytes: usize,
    pub log_json: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: DEFAULT_DATABASE.to_string(),
            bind_addr: DEFAULT_BIND.to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            log_json: false,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            database_path: non_empty(lookup("SHELF_AUDIT_DB")).unwrap_or(defaults.database_path),
            bind_addr: non_empty(lookup("SHELF_AUDIT_BIND")).unwrap_or(defaults.bind_addr),
            max_upload_bytes: lookup("SHELF_AUDIT_MAX_UPLOAD_BYTES")
                .and_then(|value| value.trim().parse::<usize>().ok())
                .filter(|value| *value > 0)
                .unwrap_or(defaults.max_upload_bytes),
            log_json: lookup("SHELF_AUDIT_LOG_JSON")
                .and_then(|value| parse_bool(&value))
                .unwrap_or(defaults.log_json),
        }
    }

    pub fn with_database(mut self, database: Option<String>) -> Self {
        if let Some(path) = non_empty(database) {
            self.database_path = path;
        }
        self
    }

    pub fn with_bind(mut self, bind: Option<String>) -> Self {
        if let Some(addr) = non_empty(bind) {
            self.bind_addr = addr;
        }
        self
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim() {
        "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
        "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
        _ => None,
    }
}
