//! [`WorkflowEngine`] — create/assign/transfer/status-change orchestration.
//!
//! Every operation takes an explicit `actor_id`; there is no ambient
//! current-user context. Each state-changing operation commits exactly one
//! ticket patch, one flow entry, and one system comment through the
//! store's transition unit, then schedules its notification on a detached
//! task.
//!
//! The engine does not police transition legality: any requested status
//! change is applied, and the contract is only that the three writes land
//! together and the status-dependent fields stay consistent. Stricter
//! legality would be a policy layered on top, not a change here.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use docket_core::{
  comment::{CommentKind, NewComment},
  directory::{User, Workspace},
  flow::{FlowAction, NewFlowEntry},
  store::{TicketStore, TransitionWrite},
  ticket::{NewTicket, Priority, Status, Ticket, TicketKind, TicketPatch},
  Error, Result,
};

use crate::{
  narrate,
  notify::{Notifier, Recipient, TicketDigest, TicketEvent},
};

// ─── Requests ────────────────────────────────────────────────────────────────

/// Input to [`WorkflowEngine::create`].
#[derive(Debug, Clone)]
pub struct CreateTicket {
  pub title:           String,
  pub content:         String,
  pub priority:        Priority,
  pub kind:            TicketKind,
  pub workspace_id:    i64,
  pub assignee_id:     Option<i64>,
  pub estimated_hours: Option<f64>,
  pub due_date:        Option<DateTime<Utc>>,
}

/// Input to [`WorkflowEngine::update`] — the generic edit path. Touches no
/// status, flow, or comment; the workflow-managed fields are deliberately
/// absent.
#[derive(Debug, Clone, Default)]
pub struct UpdateTicket {
  pub ticket_id:       i64,
  pub title:           Option<String>,
  pub content:         Option<String>,
  pub priority:        Option<Priority>,
  pub kind:            Option<TicketKind>,
  pub assignee_id:     Option<Option<i64>>,
  pub estimated_hours: Option<Option<f64>>,
  pub actual_hours:    Option<Option<f64>>,
  pub due_date:        Option<Option<DateTime<Utc>>>,
}

// ─── Engine ──────────────────────────────────────────────────────────────────

/// The workflow engine over a store backend `S` and a notifier `N`.
///
/// Cheap to clone; both collaborators are behind `Arc`.
pub struct WorkflowEngine<S, N> {
  store:    Arc<S>,
  notifier: Arc<N>,
}

impl<S, N> Clone for WorkflowEngine<S, N> {
  fn clone(&self) -> Self {
    Self {
      store:    Arc::clone(&self.store),
      notifier: Arc::clone(&self.notifier),
    }
  }
}

impl<S, N> WorkflowEngine<S, N>
where
  S: TicketStore,
  N: Notifier,
{
  pub fn new(store: Arc<S>, notifier: Arc<N>) -> Self {
    Self { store, notifier }
  }

  // ── Operations ────────────────────────────────────────────────────────────

  /// File a new ticket. Status starts OPEN; the ticket number comes from
  /// the workspace's sequence. Creation is not a transition, so no flow
  /// entry or comment is written; a `Created` event is scheduled.
  pub async fn create(&self, req: CreateTicket, actor_id: i64) -> Result<Ticket> {
    if req.title.trim().is_empty() {
      return Err(Error::validation("title must not be empty"));
    }
    if req.content.trim().is_empty() {
      return Err(Error::validation("content must not be empty"));
    }
    if req.estimated_hours.is_some_and(|h| h < 0.0) {
      return Err(Error::validation("estimated hours must not be negative"));
    }

    let workspace = self
      .store
      .workspace_by_id(req.workspace_id)
      .await
      .map_err(Error::storage)?
      .ok_or_else(|| {
        Error::validation(format!("unknown workspace: {}", req.workspace_id))
      })?;
    if !workspace.enabled {
      return Err(Error::validation(format!(
        "workspace {} is disabled",
        workspace.code
      )));
    }

    let creator = self.require_user(actor_id).await?;

    let ticket = self
      .store
      .create_ticket(NewTicket {
        title:           req.title,
        content:         req.content,
        priority:        req.priority,
        kind:            req.kind,
        workspace_id:    req.workspace_id,
        creator_id:      actor_id,
        assignee_id:     req.assignee_id,
        estimated_hours: req.estimated_hours,
        due_date:        req.due_date,
      })
      .await
      .map_err(Error::storage)?;

    tracing::info!(ticket_no = %ticket.ticket_no, "ticket created");
    self.spawn_dispatch(TicketEvent::Created {
      ticket:  TicketDigest::of(&ticket, workspace.name),
      creator: Recipient::of(&creator),
    });

    Ok(ticket)
  }

  /// Put the ticket in `assignee_id`'s hands, forcing IN_PROGRESS whatever
  /// the prior status. Re-assignment to the same person is legal and
  /// records a fresh flow entry.
  pub async fn assign(
    &self,
    ticket_id:   i64,
    assignee_id: i64,
    actor_id:    i64,
  ) -> Result<Ticket> {
    let ticket = self.require_ticket(ticket_id).await?;
    let actor = self.require_user(actor_id).await?;
    let assignee = self.require_user(assignee_id).await?;

    let transition = self
      .store
      .apply_transition(TransitionWrite {
        patch:   TicketPatch {
          status: Some(Status::InProgress),
          assignee_id: Some(Some(assignee_id)),
          ..TicketPatch::new(ticket_id)
        },
        flow:    NewFlowEntry {
          ticket_id,
          from_user_id: actor_id,
          to_user_id: Some(assignee_id),
          from_status: ticket.status.to_string(),
          to_status: Status::InProgress.to_string(),
          action: FlowAction::Assign,
          reason: None,
        },
        comment: NewComment {
          ticket_id,
          author_id: actor_id,
          content: narrate::assigned(&actor.display_name, &assignee.display_name),
          kind: CommentKind::System,
        },
      })
      .await
      .map_err(Error::storage)?;

    let workspace = self.require_workspace(transition.ticket.workspace_id).await?;
    self.spawn_dispatch(TicketEvent::Assigned {
      ticket:   TicketDigest::of(&transition.ticket, workspace.name),
      operator: Recipient::of(&actor),
      assignee: Recipient::of(&assignee),
    });

    Ok(transition.ticket)
  }

  /// Hand the ticket to a new owner: one TRANSFER flow entry capturing the
  /// ticket's current status, then the same update assign performs.
  pub async fn transfer(
    &self,
    ticket_id:  i64,
    to_user_id: i64,
    reason:     Option<String>,
    actor_id:   i64,
  ) -> Result<Ticket> {
    let ticket = self.require_ticket(ticket_id).await?;
    let actor = self.require_user(actor_id).await?;
    let recipient = self.require_user(to_user_id).await?;

    let transition = self
      .store
      .apply_transition(TransitionWrite {
        patch:   TicketPatch {
          status: Some(Status::InProgress),
          assignee_id: Some(Some(to_user_id)),
          ..TicketPatch::new(ticket_id)
        },
        flow:    NewFlowEntry {
          ticket_id,
          from_user_id: actor_id,
          to_user_id: Some(to_user_id),
          from_status: ticket.status.to_string(),
          to_status: Status::InProgress.to_string(),
          action: FlowAction::Transfer,
          reason: reason.clone(),
        },
        comment: NewComment {
          ticket_id,
          author_id: actor_id,
          content: narrate::transferred(
            &actor.display_name,
            &recipient.display_name,
            reason.as_deref(),
          ),
          kind: CommentKind::System,
        },
      })
      .await
      .map_err(Error::storage)?;

    let workspace = self.require_workspace(transition.ticket.workspace_id).await?;
    self.spawn_dispatch(TicketEvent::Transferred {
      ticket:    TicketDigest::of(&transition.ticket, workspace.name),
      operator:  Recipient::of(&actor),
      recipient: Recipient::of(&recipient),
      reason,
    });

    Ok(transition.ticket)
  }

  /// Move the ticket to `new_status`. The flow action is derived from the
  /// target status; resolve/close/reopen also maintain the resolver and
  /// timestamp fields.
  pub async fn change_status(
    &self,
    ticket_id:  i64,
    new_status: Status,
    reason:     Option<String>,
    actor_id:   i64,
  ) -> Result<Ticket> {
    let ticket = self.require_ticket(ticket_id).await?;
    let actor = self.require_user(actor_id).await?;

    let action = action_for(new_status);
    let mut patch = TicketPatch {
      status: Some(new_status),
      ..TicketPatch::new(ticket_id)
    };
    match new_status {
      Status::Resolved => {
        patch.resolver_id = Some(Some(actor_id));
        patch.resolved_at = Some(Some(Utc::now()));
      }
      Status::Closed => {
        patch.closed_at = Some(Some(Utc::now()));
      }
      Status::Open => {
        // Reopening: the ticket is live again, so both completion
        // timestamps go away.
        patch.resolved_at = Some(None);
        patch.closed_at = Some(None);
      }
      Status::InProgress | Status::Cancelled => {}
    }

    let from_label = ticket.status.to_string();
    let to_label = new_status.to_string();

    let transition = self
      .store
      .apply_transition(TransitionWrite {
        patch,
        flow: NewFlowEntry {
          ticket_id,
          from_user_id: actor_id,
          to_user_id: Some(actor_id),
          from_status: from_label.clone(),
          to_status: to_label.clone(),
          action,
          reason: reason.clone(),
        },
        comment: NewComment {
          ticket_id,
          author_id: actor_id,
          content: narrate::status_changed(
            action,
            &actor.display_name,
            &from_label,
            &to_label,
            reason.as_deref(),
          ),
          kind: CommentKind::System,
        },
      })
      .await
      .map_err(Error::storage)?;

    tracing::debug!(
      ticket_no = %transition.ticket.ticket_no,
      %from_label,
      %to_label,
      "status changed"
    );

    let workspace = self.require_workspace(transition.ticket.workspace_id).await?;
    let digest = TicketDigest::of(&transition.ticket, workspace.name);
    let event = if action == FlowAction::Resolve {
      TicketEvent::Resolved {
        ticket:   digest,
        resolver: Recipient::of(&actor),
      }
    } else {
      TicketEvent::StatusChanged {
        ticket:      digest,
        operator:    Recipient::of(&actor),
        from_status: from_label,
        to_status:   to_label,
      }
    };
    self.spawn_dispatch(event);

    Ok(transition.ticket)
  }

  /// Mark the ticket RESOLVED; sets the resolver and `resolved_at`.
  pub async fn resolve(
    &self,
    ticket_id: i64,
    reason:    Option<String>,
    actor_id:  i64,
  ) -> Result<Ticket> {
    self
      .change_status(ticket_id, Status::Resolved, reason, actor_id)
      .await
  }

  /// Mark the ticket CLOSED; sets `closed_at` and leaves `resolved_at` as
  /// it stands, so a close out of RESOLVED keeps its resolution record.
  pub async fn close(
    &self,
    ticket_id: i64,
    reason:    Option<String>,
    actor_id:  i64,
  ) -> Result<Ticket> {
    self
      .change_status(ticket_id, Status::Closed, reason, actor_id)
      .await
  }

  /// Put the ticket back to OPEN, clearing `resolved_at` and `closed_at`.
  pub async fn reopen(
    &self,
    ticket_id: i64,
    reason:    Option<String>,
    actor_id:  i64,
  ) -> Result<Ticket> {
    self
      .change_status(ticket_id, Status::Open, reason, actor_id)
      .await
  }

  /// Generic edit of non-workflow fields. Writes no flow entry, no
  /// comment, and schedules no notification.
  pub async fn update(&self, req: UpdateTicket, _actor_id: i64) -> Result<Ticket> {
    if req.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
      return Err(Error::validation("title must not be empty"));
    }
    if req.content.as_deref().is_some_and(|c| c.trim().is_empty()) {
      return Err(Error::validation("content must not be empty"));
    }
    for (field, hours) in [
      ("estimated", req.estimated_hours),
      ("actual", req.actual_hours),
    ] {
      if hours.flatten().is_some_and(|h| h < 0.0) {
        return Err(Error::validation(format!(
          "{field} hours must not be negative"
        )));
      }
    }

    let ticket_id = req.ticket_id;
    self.require_ticket(ticket_id).await?;

    self
      .store
      .update_ticket(TicketPatch {
        ticket_id,
        title: req.title,
        content: req.content,
        priority: req.priority,
        kind: req.kind,
        assignee_id: req.assignee_id,
        estimated_hours: req.estimated_hours,
        actual_hours: req.actual_hours,
        due_date: req.due_date,
        ..TicketPatch::new(ticket_id)
      })
      .await
      .map_err(Error::storage)
  }

  // ── Helpers ───────────────────────────────────────────────────────────────

  async fn require_ticket(&self, id: i64) -> Result<Ticket> {
    self
      .store
      .ticket_by_id(id)
      .await
      .map_err(Error::storage)?
      .ok_or(Error::TicketNotFound(id))
  }

  async fn require_user(&self, id: i64) -> Result<User> {
    self
      .store
      .user_by_id(id)
      .await
      .map_err(Error::storage)?
      .ok_or(Error::UserNotFound(id))
  }

  async fn require_workspace(&self, id: i64) -> Result<Workspace> {
    self
      .store
      .workspace_by_id(id)
      .await
      .map_err(Error::storage)?
      .ok_or(Error::WorkspaceNotFound(id))
  }

  /// Hand `event` to the notifier on a detached task. The workflow result
  /// is already decided; whatever happens in dispatch stays there.
  fn spawn_dispatch(&self, event: TicketEvent) {
    let notifier = Arc::clone(&self.notifier);
    tokio::spawn(async move {
      notifier.dispatch(event).await;
    });
  }
}

/// The flow action a status change is recorded as.
fn action_for(status: Status) -> FlowAction {
  match status {
    Status::Resolved => FlowAction::Resolve,
    Status::Closed => FlowAction::Close,
    Status::Open => FlowAction::Reopen,
    Status::InProgress => FlowAction::Start,
    Status::Cancelled => FlowAction::Cancel,
  }
}
