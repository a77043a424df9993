//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Enum columns store the
//! SCREAMING_SNAKE wire labels the strum derives define, so the database
//! values match the JSON wire form exactly.

use chrono::{DateTime, Utc};
use docket_core::{
  comment::{Comment, CommentKind},
  directory::{User, Workspace},
  flow::{FlowAction, FlowEntry},
  ticket::{Priority, Status, Ticket, TicketKind},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

fn decode_dt_opt(s: Option<&str>) -> Result<Option<DateTime<Utc>>> {
  s.map(decode_dt).transpose()
}

// ─── Enum labels ─────────────────────────────────────────────────────────────

pub fn encode_status(s: Status) -> &'static str { s.into() }

pub fn decode_status(s: &str) -> Result<Status> {
  s.parse()
    .map_err(|_| Error::Decode(format!("unknown status: {s:?}")))
}

pub fn encode_priority(p: Priority) -> &'static str { p.into() }

pub fn decode_priority(s: &str) -> Result<Priority> {
  s.parse()
    .map_err(|_| Error::Decode(format!("unknown priority: {s:?}")))
}

pub fn encode_kind(k: TicketKind) -> &'static str { k.into() }

pub fn decode_kind(s: &str) -> Result<TicketKind> {
  s.parse()
    .map_err(|_| Error::Decode(format!("unknown ticket kind: {s:?}")))
}

pub fn encode_action(a: FlowAction) -> &'static str { a.into() }

pub fn decode_action(s: &str) -> Result<FlowAction> {
  s.parse()
    .map_err(|_| Error::Decode(format!("unknown flow action: {s:?}")))
}

pub fn encode_comment_kind(k: CommentKind) -> &'static str { k.into() }

pub fn decode_comment_kind(s: &str) -> Result<CommentKind> {
  s.parse()
    .map_err(|_| Error::Decode(format!("unknown comment kind: {s:?}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `tickets` row.
pub struct RawTicket {
  pub ticket_id:       i64,
  pub ticket_no:       String,
  pub title:           String,
  pub content:         String,
  pub priority:        String,
  pub kind:            String,
  pub status:          String,
  pub workspace_id:    i64,
  pub creator_id:      i64,
  pub assignee_id:     Option<i64>,
  pub resolver_id:     Option<i64>,
  pub estimated_hours: Option<f64>,
  pub actual_hours:    Option<f64>,
  pub due_date:        Option<String>,
  pub resolved_at:     Option<String>,
  pub closed_at:       Option<String>,
  pub created_at:      String,
  pub updated_at:      String,
}

impl RawTicket {
  pub fn into_ticket(self) -> Result<Ticket> {
    Ok(Ticket {
      ticket_id:       self.ticket_id,
      ticket_no:       self.ticket_no,
      title:           self.title,
      content:         self.content,
      priority:        decode_priority(&self.priority)?,
      kind:            decode_kind(&self.kind)?,
      status:          decode_status(&self.status)?,
      workspace_id:    self.workspace_id,
      creator_id:      self.creator_id,
      assignee_id:     self.assignee_id,
      resolver_id:     self.resolver_id,
      estimated_hours: self.estimated_hours,
      actual_hours:    self.actual_hours,
      due_date:        decode_dt_opt(self.due_date.as_deref())?,
      resolved_at:     decode_dt_opt(self.resolved_at.as_deref())?,
      closed_at:       decode_dt_opt(self.closed_at.as_deref())?,
      created_at:      decode_dt(&self.created_at)?,
      updated_at:      decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from a `ticket_flows` row.
pub struct RawFlowEntry {
  pub flow_id:      i64,
  pub ticket_id:    i64,
  pub from_user_id: i64,
  pub to_user_id:   Option<i64>,
  pub from_status:  String,
  pub to_status:    String,
  pub action:       String,
  pub reason:       Option<String>,
  pub created_at:   String,
}

impl RawFlowEntry {
  pub fn into_flow(self) -> Result<FlowEntry> {
    Ok(FlowEntry {
      flow_id:      self.flow_id,
      ticket_id:    self.ticket_id,
      from_user_id: self.from_user_id,
      to_user_id:   self.to_user_id,
      from_status:  self.from_status,
      to_status:    self.to_status,
      action:       decode_action(&self.action)?,
      reason:       self.reason,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `ticket_comments` row.
pub struct RawComment {
  pub comment_id: i64,
  pub ticket_id:  i64,
  pub author_id:  i64,
  pub content:    String,
  pub kind:       String,
  pub created_at: String,
  pub updated_at: String,
}

impl RawComment {
  pub fn into_comment(self) -> Result<Comment> {
    Ok(Comment {
      comment_id: self.comment_id,
      ticket_id:  self.ticket_id,
      author_id:  self.author_id,
      content:    self.content,
      kind:       decode_comment_kind(&self.kind)?,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from a `workspaces` row.
pub struct RawWorkspace {
  pub workspace_id: i64,
  pub name:         String,
  pub code:         String,
  pub enabled:      bool,
  pub created_at:   String,
}

impl RawWorkspace {
  pub fn into_workspace(self) -> Result<Workspace> {
    Ok(Workspace {
      workspace_id: self.workspace_id,
      name:         self.name,
      code:         self.code,
      enabled:      self.enabled,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub user_id:        i64,
  pub display_name:   String,
  pub channel_handle: Option<String>,
  pub created_at:     String,
}

impl RawUser {
  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:        self.user_id,
      display_name:   self.display_name,
      channel_handle: self.channel_handle,
      created_at:     decode_dt(&self.created_at)?,
    })
  }
}
