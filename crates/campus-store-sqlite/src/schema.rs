//! SQL schema for the Campus SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS subjects (
    subject_id    TEXT PRIMARY KEY,
    canonical_id  TEXT NOT NULL UNIQUE,   -- e.g. 'admin@school.local'
    created_at    TEXT NOT NULL
);

-- At most one role record per subject; removed together with its subject.
CREATE TABLE IF NOT EXISTS role_records (
    subject_id  TEXT PRIMARY KEY REFERENCES subjects(subject_id) ON DELETE CASCADE,
    role        TEXT NOT NULL CHECK (role IN (
                  'owner', 'admin', 'teacher', 'class_supervisor',
                  'student', 'parent', 'accountant'
                )),
    updated_at  TEXT NOT NULL
);

-- Written by the login flow. Only the SHA-256 of the cookie token is kept.
CREATE TABLE IF NOT EXISTS sessions (
    token_hash  TEXT PRIMARY KEY,
    subject_id  TEXT NOT NULL REFERENCES subjects(subject_id) ON DELETE CASCADE,
    issued_at   TEXT NOT NULL,
    expires_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS sessions_subject_idx ON sessions(subject_id);

PRAGMA user_version = 1;
";
