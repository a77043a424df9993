//! Ticket types — the central entity of the docket engine.
//!
//! A ticket moves through a lifecycle of statuses; every status change is
//! echoed in the append-only flow log and in a synthesized system comment.
//! The enums here are closed sets. Their SCREAMING_SNAKE wire labels double
//! as the stored column values; the human-facing strings live in the
//! `label()` lookups and never participate in workflow logic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Classification ──────────────────────────────────────────────────────────

/// How urgently a ticket needs attention.
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
pub enum Priority {
  Low,
  Medium,
  High,
  Urgent,
}

impl Priority {
  /// Presentation label; not used by any workflow decision.
  pub fn label(self) -> &'static str {
    match self {
      Self::Low => "Low",
      Self::Medium => "Medium",
      Self::High => "High",
      Self::Urgent => "Urgent",
    }
  }
}

/// The nature of the work a ticket asks for.
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
pub enum TicketKind {
  Bug,
  Feature,
  Improvement,
  Question,
  Other,
}

impl TicketKind {
  /// Presentation label; not used by any workflow decision.
  pub fn label(self) -> &'static str {
    match self {
      Self::Bug => "Bug",
      Self::Feature => "Feature",
      Self::Improvement => "Improvement",
      Self::Question => "Question",
      Self::Other => "Other",
    }
  }
}

// ─── Status ──────────────────────────────────────────────────────────────────

/// Lifecycle status. The engine accepts any requested transition between
/// these; it only guarantees that ticket, flow entry, and system comment
/// change together and that the status-dependent timestamp fields stay
/// consistent.
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
pub enum Status {
  Open,
  InProgress,
  Resolved,
  Closed,
  Cancelled,
}

impl Status {
  /// Presentation label; not used by any workflow decision.
  pub fn label(self) -> &'static str {
    match self {
      Self::Open => "Open",
      Self::InProgress => "In Progress",
      Self::Resolved => "Resolved",
      Self::Closed => "Closed",
      Self::Cancelled => "Cancelled",
    }
  }
}

// ─── Ticket ──────────────────────────────────────────────────────────────────

/// A unit of work tracked from creation to resolution or closure.
///
/// `ticket_id`, `ticket_no`, `workspace_id`, and `creator_id` never change
/// after creation. `resolved_at` is non-null exactly while the ticket is
/// RESOLVED or was CLOSED out of RESOLVED; reopening clears `resolved_at`
/// and `closed_at` both.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
  pub ticket_id:       i64,
  /// Display identifier: workspace code plus a zero-padded per-workspace
  /// counter, e.g. `SUP-0001`. Unique across the store.
  pub ticket_no:       String,
  pub title:           String,
  pub content:         String,
  pub priority:        Priority,
  #[serde(rename = "type")]
  pub kind:            TicketKind,
  pub status:          Status,
  pub workspace_id:    i64,
  pub creator_id:      i64,
  pub assignee_id:     Option<i64>,
  pub resolver_id:     Option<i64>,
  /// Fractional hours, caller-estimated.
  pub estimated_hours: Option<f64>,
  /// Fractional hours actually spent, recorded through the update path.
  pub actual_hours:    Option<f64>,
  pub due_date:        Option<DateTime<Utc>>,
  pub resolved_at:     Option<DateTime<Utc>>,
  pub closed_at:       Option<DateTime<Utc>>,
  /// Server-assigned; never changes after creation.
  pub created_at:      DateTime<Utc>,
  pub updated_at:      DateTime<Utc>,
}

// ─── NewTicket ───────────────────────────────────────────────────────────────

/// Input to [`crate::store::TicketStore::create_ticket`].
///
/// The store assigns id, `ticket_no`, both timestamps, and the initial
/// OPEN status; none of those are accepted from callers.
#[derive(Debug, Clone)]
pub struct NewTicket {
  pub title:           String,
  pub content:         String,
  pub priority:        Priority,
  pub kind:            TicketKind,
  pub workspace_id:    i64,
  pub creator_id:      i64,
  pub assignee_id:     Option<i64>,
  pub estimated_hours: Option<f64>,
  pub due_date:        Option<DateTime<Utc>>,
}

// ─── TicketPatch ─────────────────────────────────────────────────────────────

/// A partial update to one ticket.
///
/// `None` leaves a field untouched. For nullable columns the inner option
/// distinguishes "set" (`Some(Some(v))`) from "clear" (`Some(None)`).
#[derive(Debug, Clone, Default)]
pub struct TicketPatch {
  pub ticket_id:       i64,
  pub title:           Option<String>,
  pub content:         Option<String>,
  pub priority:        Option<Priority>,
  pub kind:            Option<TicketKind>,
  pub status:          Option<Status>,
  pub assignee_id:     Option<Option<i64>>,
  pub resolver_id:     Option<Option<i64>>,
  pub estimated_hours: Option<Option<f64>>,
  pub actual_hours:    Option<Option<f64>>,
  pub due_date:        Option<Option<DateTime<Utc>>>,
  pub resolved_at:     Option<Option<DateTime<Utc>>>,
  pub closed_at:       Option<Option<DateTime<Utc>>>,
}

impl TicketPatch {
  /// An empty patch for `ticket_id` — a starting point for builders.
  pub fn new(ticket_id: i64) -> Self {
    Self { ticket_id, ..Self::default() }
  }
}
