//! System-comment text synthesis.
//!
//! One sentence per flow entry, readable on the ticket's timeline. The
//! wording here is presentation; the flow log stays the authoritative
//! record.

use docket_core::flow::FlowAction;

/// "{actor} assigned the ticket to {assignee}"
pub fn assigned(actor: &str, assignee: &str) -> String {
  format!("{actor} assigned the ticket to {assignee}")
}

/// "{actor} transferred the ticket to {recipient}[, reason: {reason}]"
pub fn transferred(actor: &str, recipient: &str, reason: Option<&str>) -> String {
  with_reason(
    format!("{actor} transferred the ticket to {recipient}"),
    reason,
  )
}

/// Sentence for a status-change flow entry. Resolve, close, and reopen get
/// their own phrasing; everything else falls back to the generic
/// from -> to form.
pub fn status_changed(
  action: FlowAction,
  actor:  &str,
  from:   &str,
  to:     &str,
  reason: Option<&str>,
) -> String {
  let base = match action {
    FlowAction::Resolve => format!("{actor} resolved the ticket"),
    FlowAction::Close => format!("{actor} closed the ticket"),
    FlowAction::Reopen => format!("{actor} reopened the ticket"),
    _ => format!("{actor} updated the ticket status: {from} -> {to}"),
  };
  with_reason(base, reason)
}

fn with_reason(base: String, reason: Option<&str>) -> String {
  match reason {
    Some(r) if !r.trim().is_empty() => format!("{base}, reason: {r}"),
    _ => base,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn transfer_mentions_both_parties_and_reason() {
    let text = transferred("Alice", "Bob", Some("on call this week"));
    assert_eq!(
      text,
      "Alice transferred the ticket to Bob, reason: on call this week"
    );
  }

  #[test]
  fn blank_reason_is_omitted() {
    assert_eq!(
      transferred("Alice", "Bob", Some("   ")),
      "Alice transferred the ticket to Bob"
    );
  }

  #[test]
  fn generic_status_change_names_both_labels() {
    let text =
      status_changed(FlowAction::Cancel, "Alice", "OPEN", "CANCELLED", None);
    assert_eq!(text, "Alice updated the ticket status: OPEN -> CANCELLED");
  }
}
