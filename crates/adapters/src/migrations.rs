pub const MIGRATIONS: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS location_base (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        part_number TEXT NOT NULL,
        location TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        active INTEGER NOT NULL DEFAULT 1,
        UNIQUE (part_number, location)
    );
    CREATE INDEX IF NOT EXISTS idx_location_base_part
        ON location_base (part_number, active);",
    "CREATE TABLE IF NOT EXISTS count_sessions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        part_number TEXT NOT NULL,
        operator_name TEXT NOT NULL,
        comment TEXT,
        created_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_count_sessions_part
        ON count_sessions (part_number, created_at);",
    "CREATE TABLE IF NOT EXISTS count_details (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        session_id INTEGER NOT NULL REFERENCES count_sessions (id) ON DELETE CASCADE,
        location_id INTEGER NOT NULL REFERENCES location_base (id) ON DELETE CASCADE,
        checked INTEGER NOT NULL DEFAULT 0,
        checked_at TEXT,
        quantity INTEGER,
        UNIQUE (session_id, location_id)
    );",
    "CREATE TABLE IF NOT EXISTS result_snapshots (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        part_number TEXT NOT NULL,
        total INTEGER NOT NULL,
        checked_count INTEGER NOT NULL,
        percentage REAL NOT NULL,
        created_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_result_snapshots_part
        ON result_snapshots (part_number, created_at);",
];
