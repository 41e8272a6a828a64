//! Database schema and additive migrations.

pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS photos (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    path TEXT NOT NULL UNIQUE,
    filename TEXT NOT NULL,
    directory TEXT NOT NULL,
    size_bytes INTEGER NOT NULL DEFAULT 0,
    width INTEGER,
    height INTEGER,
    camera_make TEXT,
    camera_model TEXT,
    taken_at TEXT,
    modified_at TEXT,
    imported_at TEXT DEFAULT CURRENT_TIMESTAMP,
    flagged INTEGER NOT NULL DEFAULT 0,
    trashed INTEGER NOT NULL DEFAULT 0,
    trashed_at TEXT
);

CREATE INDEX IF NOT EXISTS idx_photos_directory ON photos(directory);
CREATE INDEX IF NOT EXISTS idx_photos_flagged ON photos(flagged);
CREATE INDEX IF NOT EXISTS idx_photos_trashed ON photos(trashed);
CREATE INDEX IF NOT EXISTS idx_photos_taken_at ON photos(taken_at);

CREATE TABLE IF NOT EXISTS photo_work (
    photo_path TEXT PRIMARY KEY,
    work TEXT NOT NULL,
    updated_at TEXT DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS tags (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    created_at TEXT DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS photo_tags (
    photo_id INTEGER NOT NULL REFERENCES photos(id),
    tag_id INTEGER NOT NULL REFERENCES tags(id),
    PRIMARY KEY (photo_id, tag_id)
);
"#;

/// Applied with errors ignored so databases created by older versions pick up
/// columns added since.
pub const MIGRATIONS: &[&str] = &[
    "ALTER TABLE photos ADD COLUMN trashed_at TEXT",
    "ALTER TABLE photos ADD COLUMN modified_at TEXT",
    "ALTER TABLE photo_work ADD COLUMN updated_at TEXT",
];
