//! The notifier seam and the event snapshots handed across it.
//!
//! Dispatch runs outside the transactional core, after commit, on a
//! detached task. Events therefore carry everything a message needs —
//! ticket fields, display names, channel handles — resolved at schedule
//! time, so the dispatcher never reads mutable ticket state that could
//! race with later operations.

use std::future::Future;

use docket_core::{
  directory::User,
  ticket::{Priority, Status, Ticket, TicketKind},
};

// ─── Snapshots ───────────────────────────────────────────────────────────────

/// The ticket fields a notification message is composed from.
#[derive(Debug, Clone)]
pub struct TicketDigest {
  pub ticket_id:      i64,
  pub ticket_no:      String,
  pub title:          String,
  pub priority:       Priority,
  pub kind:           TicketKind,
  pub status:         Status,
  pub workspace_name: String,
}

impl TicketDigest {
  pub fn of(ticket: &Ticket, workspace_name: impl Into<String>) -> Self {
    Self {
      ticket_id:      ticket.ticket_id,
      ticket_no:      ticket.ticket_no.clone(),
      title:          ticket.title.clone(),
      priority:       ticket.priority,
      kind:           ticket.kind,
      status:         ticket.status,
      workspace_name: workspace_name.into(),
    }
  }
}

/// A person a message talks about or is delivered to. A recipient without
/// a channel handle is skipped for direct delivery.
#[derive(Debug, Clone)]
pub struct Recipient {
  pub user_id:        i64,
  pub display_name:   String,
  pub channel_handle: Option<String>,
}

impl Recipient {
  pub fn of(user: &User) -> Self {
    Self {
      user_id:        user.user_id,
      display_name:   user.display_name.clone(),
      channel_handle: user.channel_handle.clone(),
    }
  }
}

// ─── Events ──────────────────────────────────────────────────────────────────

/// One workflow event, scheduled after its transaction committed.
#[derive(Debug, Clone)]
pub enum TicketEvent {
  Created {
    ticket:  TicketDigest,
    creator: Recipient,
  },
  Assigned {
    ticket:   TicketDigest,
    operator: Recipient,
    assignee: Recipient,
  },
  Transferred {
    ticket:    TicketDigest,
    operator:  Recipient,
    recipient: Recipient,
    reason:    Option<String>,
  },
  Resolved {
    ticket:   TicketDigest,
    resolver: Recipient,
  },
  /// Any status change other than resolve. Whether these are forwarded is
  /// dispatcher policy, not an engine decision.
  StatusChanged {
    ticket:      TicketDigest,
    operator:    Recipient,
    from_status: String,
    to_status:   String,
  },
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Best-effort, fire-and-forget delivery of workflow events.
///
/// `dispatch` is infallible from the caller's point of view: transport
/// failures are the implementation's to catch, log, and discard. At most
/// one delivery attempt per event; no ordering guarantee.
pub trait Notifier: Send + Sync + 'static {
  fn dispatch(&self, event: TicketEvent)
  -> impl Future<Output = ()> + Send;
}

/// A notifier that drops every event — for tests and deployments without
/// an outbound channel.
pub struct NullNotifier;

impl Notifier for NullNotifier {
  async fn dispatch(&self, _event: TicketEvent) {}
}
