//! SQL schema for the SQLite document store.
//!
//! Executed on every open. Every statement is idempotent, so several
//! processes may open the same file concurrently.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS collections (
    name  TEXT PRIMARY KEY,
    kind  TEXT NOT NULL    -- 'document' | 'edge'
);

-- One row per document. The body holds every attribute except the
-- identity triple, which lives in its own columns.
CREATE TABLE IF NOT EXISTS documents (
    collection  TEXT NOT NULL REFERENCES collections(name),
    doc_key     TEXT NOT NULL,
    rev         TEXT NOT NULL,
    body        TEXT NOT NULL,   -- JSON object
    PRIMARY KEY (collection, doc_key)
);

PRAGMA user_version = 1;
";
