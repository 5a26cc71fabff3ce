//! SQL schema for the Parish SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! the `PRAGMA user_version` number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- The submission row is the durability boundary. The data column holds the
-- submitted field set verbatim and is the single source of truth.
CREATE TABLE IF NOT EXISTS form_submissions (
    id          TEXT PRIMARY KEY,
    form_name   TEXT NOT NULL,
    form_type   TEXT NOT NULL,
    email       TEXT,
    name        TEXT,
    phone       TEXT,
    data        TEXT NOT NULL,   -- JSON document
    status      TEXT NOT NULL DEFAULT 'new',
    ip_address  TEXT NOT NULL DEFAULT 'unknown',
    user_agent  TEXT NOT NULL DEFAULT 'unknown',
    created_at  TEXT NOT NULL    -- ISO 8601 UTC; server-assigned
);

-- Flattened projection of form_submissions.data, one row per top-level key.
-- Written best-effort after the submission commits; rebuildable from data.
CREATE TABLE IF NOT EXISTS form_responses (
    id                 TEXT PRIMARY KEY,
    form_submission_id TEXT NOT NULL REFERENCES form_submissions(id),
    field_name         TEXT NOT NULL,
    field_value        TEXT NOT NULL,
    field_type         TEXT NOT NULL   -- 'string' | 'number' | 'boolean' | 'object'
);

CREATE TABLE IF NOT EXISTS registrations (
    id                  TEXT PRIMARY KEY,
    name                TEXT NOT NULL,
    email               TEXT NOT NULL COLLATE NOCASE UNIQUE,
    phone               TEXT,
    password_hash       TEXT NOT NULL,   -- argon2 PHC string; no read path selects it
    registration_type   TEXT NOT NULL DEFAULT 'member',
    status              TEXT NOT NULL DEFAULT 'active',
    email_verified      INTEGER NOT NULL DEFAULT 0,
    email_verified_at   TEXT,
    date_of_birth       TEXT,
    address             TEXT,
    city                TEXT,
    state               TEXT,
    country             TEXT,
    postal_code         TEXT,
    bio                 TEXT,
    profile_picture_url TEXT,
    ip_address          TEXT NOT NULL DEFAULT 'unknown',
    user_agent          TEXT NOT NULL DEFAULT 'unknown',
    created_at          TEXT NOT NULL,
    updated_at          TEXT NOT NULL
);

-- Named records: one JSON document per caller-chosen key, replaced wholesale
-- on every save.
CREATE TABLE IF NOT EXISTS data_store (
    key         TEXT PRIMARY KEY,
    value       TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS submissions_form_idx     ON form_submissions(form_name);
CREATE INDEX IF NOT EXISTS submissions_status_idx   ON form_submissions(status);
CREATE INDEX IF NOT EXISTS submissions_created_idx  ON form_submissions(created_at);
CREATE INDEX IF NOT EXISTS responses_submission_idx ON form_responses(form_submission_id);
CREATE INDEX IF NOT EXISTS registrations_created_idx ON registrations(created_at);

PRAGMA user_version = 1;
";
