//! SQL schema for the Loft SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS pigeons (
    pigeon_id     TEXT PRIMARY KEY,
    nickname      TEXT NOT NULL UNIQUE,
    photo_url     TEXT,
    average_speed REAL NOT NULL,
    is_active     INTEGER NOT NULL DEFAULT 1,  -- retirement is one-way
    created_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS customers (
    customer_id TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    email       TEXT NOT NULL UNIQUE,
    birth_date  TEXT NOT NULL,   -- ISO 8601 calendar date, no time-of-day
    address     TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

-- Only `status` and `updated_at` are ever updated on this table; no DELETE
-- is ever issued against it.
CREATE TABLE IF NOT EXISTS letters (
    letter_id         TEXT PRIMARY KEY,
    content           TEXT NOT NULL,
    recipient_name    TEXT NOT NULL,
    recipient_address TEXT NOT NULL,
    status            TEXT NOT NULL DEFAULT 'QUEUED'
                      CHECK (status IN ('QUEUED', 'SENT', 'DELIVERED')),
    sender_id         TEXT NOT NULL REFERENCES customers(customer_id),
    pigeon_id         TEXT NOT NULL REFERENCES pigeons(pigeon_id),
    created_at        TEXT NOT NULL,
    updated_at        TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS letters_sender_idx  ON letters(sender_id);
CREATE INDEX IF NOT EXISTS letters_pigeon_idx  ON letters(pigeon_id);
CREATE INDEX IF NOT EXISTS letters_status_idx  ON letters(status);
CREATE INDEX IF NOT EXISTS letters_created_idx ON letters(created_at);

PRAGMA user_version = 1;
";
