//! SQL schema for the registrar SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// Usernames carry no UNIQUE constraint on purpose: uniqueness is checked
/// by the signup flow before insert.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name TEXT NOT NULL,
    last_name  TEXT NOT NULL,
    username   TEXT NOT NULL,
    password   TEXT NOT NULL,   -- stored verbatim; compared by the active CredentialVerifier
    avatar     TEXT
);

CREATE TABLE IF NOT EXISTS faculties (
    id   INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS students (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name TEXT NOT NULL,
    last_name  TEXT NOT NULL,
    faculty_id INTEGER NOT NULL REFERENCES faculties(id),
    direction  TEXT NOT NULL,
    avatar     TEXT
);

-- Single global session slot; at most one row.
CREATE TABLE IF NOT EXISTS session (
    key   TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS students_faculty_idx ON students(faculty_id);

PRAGMA user_version = 1;
";

/// Key of the signed-in-username row in the `session` table.
pub const SESSION_USERNAME_KEY: &str = "signed_in_username";
