//! Comment types — narrative entries attached to a ticket.
//!
//! User comments are mutable by their author only. System comments are
//! synthesized by the workflow engine alongside each flow entry as its
//! human-readable echo, and are never editable through the engine's
//! contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who wrote a comment: a person, or the engine itself.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
  strum::IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CommentKind {
  Comment,
  System,
}

/// A narrative entry on a ticket. `author_id` never changes after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
  pub comment_id: i64,
  pub ticket_id:  i64,
  pub author_id:  i64,
  pub content:    String,
  #[serde(rename = "type")]
  pub kind:       CommentKind,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Input to [`crate::store::TicketStore::add_comment`].
/// Timestamps are set by the store; they are not accepted from callers.
#[derive(Debug, Clone)]
pub struct NewComment {
  pub ticket_id: i64,
  pub author_id: i64,
  pub content:   String,
  pub kind:      CommentKind,
}
