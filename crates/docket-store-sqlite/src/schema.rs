//! SQL schema for the docket SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS workspaces (
    workspace_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name         TEXT NOT NULL,
    code         TEXT NOT NULL UNIQUE,   -- ticket_no prefix, e.g. 'SUP'
    enabled      INTEGER NOT NULL DEFAULT 1,
    created_at   TEXT NOT NULL           -- ISO 8601 UTC; server-assigned
);

CREATE TABLE IF NOT EXISTS users (
    user_id        INTEGER PRIMARY KEY AUTOINCREMENT,
    display_name   TEXT NOT NULL,
    channel_handle TEXT,                 -- external chat id; NULL = no DMs
    created_at     TEXT NOT NULL
);

-- One row per workspace; `counter` is the last issued sequence number.
-- Incremented and read in the same transaction as the ticket insert.
CREATE TABLE IF NOT EXISTS ticket_sequences (
    workspace_id INTEGER PRIMARY KEY REFERENCES workspaces(workspace_id),
    counter      INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS tickets (
    ticket_id       INTEGER PRIMARY KEY AUTOINCREMENT,
    ticket_no       TEXT NOT NULL UNIQUE,
    title           TEXT NOT NULL,
    content         TEXT NOT NULL,
    priority        TEXT NOT NULL,       -- 'LOW' | 'MEDIUM' | 'HIGH' | 'URGENT'
    kind            TEXT NOT NULL,       -- 'BUG' | 'FEATURE' | ...
    status          TEXT NOT NULL,       -- 'OPEN' | 'IN_PROGRESS' | ...
    workspace_id    INTEGER NOT NULL REFERENCES workspaces(workspace_id),
    creator_id      INTEGER NOT NULL REFERENCES users(user_id),
    assignee_id     INTEGER REFERENCES users(user_id),
    resolver_id     INTEGER REFERENCES users(user_id),
    estimated_hours REAL,
    actual_hours    REAL,
    due_date        TEXT,
    resolved_at     TEXT,
    closed_at       TEXT,
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL
);

-- Flow entries are strictly append-only.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS ticket_flows (
    flow_id      INTEGER PRIMARY KEY AUTOINCREMENT,
    ticket_id    INTEGER NOT NULL REFERENCES tickets(ticket_id),
    from_user_id INTEGER NOT NULL REFERENCES users(user_id),
    to_user_id   INTEGER REFERENCES users(user_id),
    from_status  TEXT NOT NULL,          -- free-form status label
    to_status    TEXT NOT NULL,
    action       TEXT NOT NULL,          -- 'ASSIGN' | 'TRANSFER' | ...
    reason       TEXT,
    created_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS ticket_comments (
    comment_id INTEGER PRIMARY KEY AUTOINCREMENT,
    ticket_id  INTEGER NOT NULL REFERENCES tickets(ticket_id),
    author_id  INTEGER NOT NULL REFERENCES users(user_id),
    content    TEXT NOT NULL,
    kind       TEXT NOT NULL,            -- 'COMMENT' | 'SYSTEM'
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS tickets_workspace_idx ON tickets(workspace_id);
CREATE INDEX IF NOT EXISTS tickets_status_idx    ON tickets(status);
CREATE INDEX IF NOT EXISTS flows_ticket_idx      ON ticket_flows(ticket_id);
CREATE INDEX IF NOT EXISTS flows_from_user_idx   ON ticket_flows(from_user_id);
CREATE INDEX IF NOT EXISTS flows_to_user_idx     ON ticket_flows(to_user_id);
CREATE INDEX IF NOT EXISTS comments_ticket_idx   ON ticket_comments(ticket_id);

PRAGMA user_version = 1;
";
