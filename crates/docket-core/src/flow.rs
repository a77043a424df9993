//! Flow entries — the append-only audit trail of workflow actions.
//!
//! One entry is written per workflow operation, inside the same transaction
//! as the ticket update it describes. Entries are never updated or deleted;
//! replaying them in creation order reconstructs a ticket's full history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Action ──────────────────────────────────────────────────────────────────

/// What a flow entry records. Derived from the requested target status for
/// status changes; ASSIGN and TRANSFER are recorded by their own operations.
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
pub enum FlowAction {
  Assign,
  Transfer,
  Resolve,
  Close,
  Reopen,
  Start,
  Cancel,
  Update,
}

// ─── FlowEntry ───────────────────────────────────────────────────────────────

/// One immutable record of a workflow action on a ticket.
///
/// `from_status` and `to_status` are free-form labels rather than typed
/// statuses: a transfer legitimately records the same status on both sides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowEntry {
  pub flow_id:      i64,
  pub ticket_id:    i64,
  /// The acting user.
  pub from_user_id: i64,
  /// The receiving user, where the action has one (assign, transfer).
  pub to_user_id:   Option<i64>,
  pub from_status:  String,
  pub to_status:    String,
  pub action:       FlowAction,
  pub reason:       Option<String>,
  /// Server-assigned; never changes after creation.
  pub created_at:   DateTime<Utc>,
}

// ─── NewFlowEntry ────────────────────────────────────────────────────────────

/// Input half of a flow append. `flow_id` and `created_at` are set by the
/// store; they are not accepted from callers.
#[derive(Debug, Clone)]
pub struct NewFlowEntry {
  pub ticket_id:    i64,
  pub from_user_id: i64,
  pub to_user_id:   Option<i64>,
  pub from_status:  String,
  pub to_status:    String,
  pub action:       FlowAction,
  pub reason:       Option<String>,
}
