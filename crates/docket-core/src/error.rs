//! Error taxonomy for `docket-core`.
//!
//! Workflow operations surface exactly these categories: bad input, a
//! missing entity, a comment-ownership violation, or a storage failure.
//! Notification failures never appear here; the dispatcher owns them
//! entirely and keeps them invisible to workflow callers.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("ticket not found: {0}")]
  TicketNotFound(i64),

  #[error("comment not found: {0}")]
  CommentNotFound(i64),

  #[error("workspace not found: {0}")]
  WorkspaceNotFound(i64),

  #[error("user not found: {0}")]
  UserNotFound(i64),

  /// Missing required field, unknown enum label, or an out-of-range value.
  #[error("validation failed: {0}")]
  Validation(String),

  /// Only the author of a comment may edit or delete it.
  #[error("user {actor_id} is not the author of comment {comment_id}")]
  NotCommentAuthor { comment_id: i64, actor_id: i64 },

  /// System comments echo the audit trail and are never user-editable.
  #[error("comment {0} is system-generated and cannot be modified")]
  SystemComment(i64),

  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a backend error as [`Error::Storage`].
  pub fn storage(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Storage(Box::new(e))
  }

  /// Shorthand for [`Error::Validation`] with an owned message.
  pub fn validation(msg: impl Into<String>) -> Self {
    Self::Validation(msg.into())
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
