//! Webhook notification dispatcher.
//!
//! Implements the engine's [`Notifier`] seam over an outbound chat
//! webhook: broadcast events go to a room webhook URL, person-directed
//! events additionally go to the recipient's channel handle as a titled
//! direct message. Delivery is best-effort and at-most-once — every
//! transport failure is caught, logged at WARN, and discarded, and a
//! recipient without a channel handle is skipped silently.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use docket_engine::{Notifier, Recipient, TicketDigest, TicketEvent};

// ─── Configuration ───────────────────────────────────────────────────────────

/// Outbound channel settings, deserialised from the server config.
#[derive(Debug, Clone, Deserialize)]
pub struct NotifyConfig {
  /// Room webhook for broadcast messages; `None` disables broadcasts.
  pub webhook_url:        Option<String>,
  /// Endpoint for per-user titled messages; `None` disables direct
  /// delivery.
  pub direct_message_url: Option<String>,
  /// Forward plain status changes in addition to the main events.
  #[serde(default = "default_status_changes")]
  pub status_changes:     bool,
}

impl Default for NotifyConfig {
  fn default() -> Self {
    Self {
      webhook_url:        None,
      direct_message_url: None,
      status_changes:     default_status_changes(),
    }
  }
}

fn default_status_changes() -> bool { true }

// ─── Dispatcher ──────────────────────────────────────────────────────────────

/// A [`Notifier`] that posts JSON messages over HTTP.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct WebhookNotifier {
  client: Client,
  config: NotifyConfig,
}

impl WebhookNotifier {
  pub fn new(config: NotifyConfig) -> Result<Self, reqwest::Error> {
    let client = Client::builder()
      .timeout(Duration::from_secs(10))
      .build()?;
    Ok(Self { client, config })
  }

  async fn post_broadcast(&self, text: String) {
    let Some(url) = &self.config.webhook_url else {
      return;
    };
    let body = json!({ "msgtype": "text", "text": { "content": text } });
    match self.client.post(url).json(&body).send().await {
      Ok(resp) if resp.status().is_success() => {
        tracing::debug!("broadcast notification delivered");
      }
      Ok(resp) => {
        tracing::warn!(status = %resp.status(), "broadcast notification rejected");
      }
      Err(e) => {
        tracing::warn!(error = %e, "broadcast notification failed");
      }
    }
  }

  async fn post_direct(&self, to: &Recipient, title: &str, text: String) {
    let Some(url) = &self.config.direct_message_url else {
      return;
    };
    let Some(handle) = &to.channel_handle else {
      tracing::debug!(
        user = %to.display_name,
        "no channel handle configured, skipping direct notification"
      );
      return;
    };
    let body = json!({
      "touser": handle,
      "title": title,
      "text": { "content": text },
    });
    match self.client.post(url).json(&body).send().await {
      Ok(resp) if resp.status().is_success() => {
        tracing::debug!(user = %to.display_name, "direct notification delivered");
      }
      Ok(resp) => {
        tracing::warn!(status = %resp.status(), "direct notification rejected");
      }
      Err(e) => {
        tracing::warn!(error = %e, "direct notification failed");
      }
    }
  }
}

impl Notifier for WebhookNotifier {
  async fn dispatch(&self, event: TicketEvent) {
    match event {
      TicketEvent::Created { ticket, creator } => {
        self.post_broadcast(created_message(&ticket, &creator)).await;
      }
      TicketEvent::Assigned { ticket, operator, assignee } => {
        // Assigning a ticket to yourself is a claim; the room hears a
        // different headline and nobody needs a direct message.
        if operator.user_id == assignee.user_id {
          self.post_broadcast(claimed_message(&ticket, &assignee)).await;
        } else {
          self
            .post_broadcast(assigned_message(&ticket, &operator, &assignee))
            .await;
          self
            .post_direct(
              &assignee,
              "Ticket assigned to you",
              assigned_message(&ticket, &operator, &assignee),
            )
            .await;
        }
      }
      TicketEvent::Transferred { ticket, operator, recipient, reason } => {
        self
          .post_direct(
            &recipient,
            "Ticket transferred to you",
            transferred_message(&ticket, &operator, reason.as_deref()),
          )
          .await;
      }
      TicketEvent::Resolved { ticket, resolver } => {
        self.post_broadcast(resolved_message(&ticket, &resolver)).await;
      }
      TicketEvent::StatusChanged { ticket, operator, from_status, to_status } => {
        if self.config.status_changes {
          self
            .post_broadcast(status_changed_message(
              &ticket,
              &operator,
              &from_status,
              &to_status,
            ))
            .await;
        }
      }
    }
  }
}

// ─── Message composition ─────────────────────────────────────────────────────

fn priority_icon(p: docket_core::ticket::Priority) -> &'static str {
  use docket_core::ticket::Priority;
  match p {
    Priority::Urgent => "🔴",
    Priority::High => "🟠",
    Priority::Medium => "🟡",
    Priority::Low => "🟢",
  }
}

fn created_message(t: &TicketDigest, creator: &Recipient) -> String {
  format!(
    "📋 New ticket filed\n\n\
     Ticket: {no}\n\
     Title: {title}\n\
     Priority: {icon} {priority}\n\
     Kind: {kind}\n\
     Filed by: {creator}\n\
     Workspace: {workspace}\n\n\
     Please triage.",
    no = t.ticket_no,
    title = t.title,
    icon = priority_icon(t.priority),
    priority = t.priority.label(),
    kind = t.kind.label(),
    creator = creator.display_name,
    workspace = t.workspace_name,
  )
}

fn assigned_message(
  t:        &TicketDigest,
  operator: &Recipient,
  assignee: &Recipient,
) -> String {
  format!(
    "👤 Ticket assigned\n\n\
     Ticket: {no}\n\
     Title: {title}\n\
     Assigned by: {operator}\n\
     Assigned to: {assignee}\n\
     Priority: {icon} {priority}\n\
     Workspace: {workspace}\n\n\
     @{assignee} please pick this up.",
    no = t.ticket_no,
    title = t.title,
    operator = operator.display_name,
    assignee = assignee.display_name,
    icon = priority_icon(t.priority),
    priority = t.priority.label(),
    workspace = t.workspace_name,
  )
}

fn claimed_message(t: &TicketDigest, claimant: &Recipient) -> String {
  format!(
    "🙋 Ticket claimed\n\n\
     Ticket: {no}\n\
     Title: {title}\n\
     Claimed by: {claimant}\n\
     Priority: {icon} {priority}\n\
     Workspace: {workspace}",
    no = t.ticket_no,
    title = t.title,
    claimant = claimant.display_name,
    icon = priority_icon(t.priority),
    priority = t.priority.label(),
    workspace = t.workspace_name,
  )
}

fn transferred_message(
  t:        &TicketDigest,
  operator: &Recipient,
  reason:   Option<&str>,
) -> String {
  let mut message = format!(
    "🔁 Ticket transferred to you\n\n\
     Ticket: {no}\n\
     Title: {title}\n\
     Transferred by: {operator}\n\
     Workspace: {workspace}",
    no = t.ticket_no,
    title = t.title,
    operator = operator.display_name,
    workspace = t.workspace_name,
  );
  if let Some(reason) = reason {
    message.push_str(&format!("\nReason: {reason}"));
  }
  message.push_str("\n\nPlease take it from here.");
  message
}

fn resolved_message(t: &TicketDigest, resolver: &Recipient) -> String {
  format!(
    "✅ Ticket resolved\n\n\
     Ticket: {no}\n\
     Title: {title}\n\
     Resolved by: {resolver}\n\
     Workspace: {workspace}\n\n\
     Please confirm the fix.",
    no = t.ticket_no,
    title = t.title,
    resolver = resolver.display_name,
    workspace = t.workspace_name,
  )
}

fn status_changed_message(
  t:        &TicketDigest,
  operator: &Recipient,
  from:     &str,
  to:       &str,
) -> String {
  format!(
    "🔄 Ticket status changed\n\n\
     Ticket: {no}\n\
     Title: {title}\n\
     Changed by: {operator}\n\
     Status: {from} -> {to}\n\
     Workspace: {workspace}",
    no = t.ticket_no,
    title = t.title,
    operator = operator.display_name,
    workspace = t.workspace_name,
  )
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use docket_core::ticket::{Priority, Status, TicketKind};

  use super::*;

  fn digest() -> TicketDigest {
    TicketDigest {
      ticket_id:      1,
      ticket_no:      "SUP-0001".into(),
      title:          "printer on fire".into(),
      priority:       Priority::Urgent,
      kind:           TicketKind::Bug,
      status:         Status::Open,
      workspace_name: "Support".into(),
    }
  }

  fn person(id: i64, name: &str, handle: Option<&str>) -> Recipient {
    Recipient {
      user_id:        id,
      display_name:   name.into(),
      channel_handle: handle.map(Into::into),
    }
  }

  #[test]
  fn created_message_carries_the_facts() {
    let text = created_message(&digest(), &person(1, "Alice", None));
    assert!(text.contains("SUP-0001"));
    assert!(text.contains("printer on fire"));
    assert!(text.contains("Alice"));
    assert!(text.contains("Support"));
    assert!(text.contains("Urgent"));
  }

  #[test]
  fn assigned_message_names_both_parties() {
    let text = assigned_message(
      &digest(),
      &person(1, "Alice", None),
      &person(2, "Bob", Some("bob.chat")),
    );
    assert!(text.contains("Assigned by: Alice"));
    assert!(text.contains("Assigned to: Bob"));
  }

  #[test]
  fn self_assignment_reads_as_a_claim() {
    let text = claimed_message(&digest(), &person(1, "Alice", None));
    assert!(text.contains("claimed"));
    assert!(text.contains("Claimed by: Alice"));
    assert!(text.contains("SUP-0001"));
  }

  #[test]
  fn transferred_message_includes_the_reason_when_given() {
    let with = transferred_message(
      &digest(),
      &person(1, "Alice", None),
      Some("on call this week"),
    );
    assert!(with.contains("Reason: on call this week"));

    let without = transferred_message(&digest(), &person(1, "Alice", None), None);
    assert!(!without.contains("Reason:"));
  }

  #[tokio::test]
  async fn unreachable_transport_is_swallowed() {
    // Nothing listens on the discard port; both sends must fail quietly.
    let notifier = WebhookNotifier::new(NotifyConfig {
      webhook_url:        Some("http://127.0.0.1:9/hook".into()),
      direct_message_url: Some("http://127.0.0.1:9/dm".into()),
      status_changes:     true,
    })
    .unwrap();

    notifier
      .dispatch(TicketEvent::Created {
        ticket:  digest(),
        creator: person(1, "Alice", None),
      })
      .await;
    notifier
      .dispatch(TicketEvent::Transferred {
        ticket:    digest(),
        operator:  person(1, "Alice", None),
        recipient: person(2, "Bob", Some("bob.chat")),
        reason:    None,
      })
      .await;
  }

  #[tokio::test]
  async fn recipient_without_handle_is_skipped() {
    let notifier = WebhookNotifier::new(NotifyConfig {
      webhook_url:        None,
      direct_message_url: Some("http://127.0.0.1:9/dm".into()),
      status_changes:     true,
    })
    .unwrap();

    // Bob has no handle: the dispatcher returns without attempting I/O.
    notifier
      .dispatch(TicketEvent::Transferred {
        ticket:    digest(),
        operator:  person(1, "Alice", None),
        recipient: person(2, "Bob", None),
        reason:    None,
      })
      .await;
  }
}
