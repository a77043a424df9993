//! Error type for `docket-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A stored enum column held a label no current variant matches.
  #[error("decode error: {0}")]
  Decode(String),

  /// Attempted to patch, transition, or number a row that was not found.
  #[error("ticket not found: {0}")]
  TicketNotFound(i64),

  #[error("comment not found: {0}")]
  CommentNotFound(i64),

  #[error("workspace not found: {0}")]
  WorkspaceNotFound(i64),

  /// The sequence produced a `ticket_no` that already exists and the
  /// internal retry also collided. Indicates a hand-edited counter row.
  #[error("ticket number collision in workspace {0}")]
  SequenceConflict(i64),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
