//! Integration tests for `SqliteStore` against an in-memory database.

use docket_core::{
  comment::{CommentKind, NewComment},
  directory::{NewUser, NewWorkspace},
  flow::{FlowAction, NewFlowEntry},
  store::{TicketStore, TransitionWrite},
  ticket::{NewTicket, Priority, Status, TicketKind, TicketPatch},
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn support_workspace() -> NewWorkspace {
  NewWorkspace {
    name:    "Support".into(),
    code:    "SUP".into(),
    enabled: true,
  }
}

fn user(name: &str) -> NewUser {
  NewUser {
    display_name:   name.into(),
    channel_handle: None,
  }
}

fn new_ticket(workspace_id: i64, creator_id: i64, title: &str) -> NewTicket {
  NewTicket {
    title:           title.into(),
    content:         "something is broken".into(),
    priority:        Priority::Medium,
    kind:            TicketKind::Bug,
    workspace_id,
    creator_id,
    assignee_id:     None,
    estimated_hours: None,
    due_date:        None,
  }
}

/// A minimal RESOLVE transition for `ticket_id`, acted by `actor_id`.
fn resolve_write(ticket_id: i64, actor_id: i64) -> TransitionWrite {
  TransitionWrite {
    patch:   TicketPatch {
      status: Some(Status::Resolved),
      resolver_id: Some(Some(actor_id)),
      resolved_at: Some(Some(chrono::Utc::now())),
      ..TicketPatch::new(ticket_id)
    },
    flow:    NewFlowEntry {
      ticket_id,
      from_user_id: actor_id,
      to_user_id: Some(actor_id),
      from_status: "IN_PROGRESS".into(),
      to_status: "RESOLVED".into(),
      action: FlowAction::Resolve,
      reason: None,
    },
    comment: NewComment {
      ticket_id,
      author_id: actor_id,
      content: "Alice resolved the ticket".into(),
      kind: CommentKind::System,
    },
  }
}

// ─── Workspaces and users ────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_workspace() {
  let s = store().await;

  let ws = s.add_workspace(support_workspace()).await.unwrap();
  assert_eq!(ws.code, "SUP");
  assert!(ws.enabled);

  let fetched = s.workspace_by_id(ws.workspace_id).await.unwrap().unwrap();
  assert_eq!(fetched.workspace_id, ws.workspace_id);
  assert_eq!(fetched.name, "Support");
}

#[tokio::test]
async fn get_workspace_missing_returns_none() {
  let s = store().await;
  assert!(s.workspace_by_id(42).await.unwrap().is_none());
}

#[tokio::test]
async fn add_and_get_user() {
  let s = store().await;

  let mut input = user("Alice");
  input.channel_handle = Some("alice.chat".into());
  let alice = s.add_user(input).await.unwrap();

  let fetched = s.user_by_id(alice.user_id).await.unwrap().unwrap();
  assert_eq!(fetched.display_name, "Alice");
  assert_eq!(fetched.channel_handle.as_deref(), Some("alice.chat"));
}

// ─── Ticket numbering ────────────────────────────────────────────────────────

#[tokio::test]
async fn first_two_tickets_get_sequential_numbers() {
  let s = store().await;
  let ws = s.add_workspace(support_workspace()).await.unwrap();
  let alice = s.add_user(user("Alice")).await.unwrap();

  let t1 = s
    .create_ticket(new_ticket(ws.workspace_id, alice.user_id, "first"))
    .await
    .unwrap();
  let t2 = s
    .create_ticket(new_ticket(ws.workspace_id, alice.user_id, "second"))
    .await
    .unwrap();

  assert_eq!(t1.ticket_no, "SUP-0001");
  assert_eq!(t2.ticket_no, "SUP-0002");
  assert_eq!(t1.status, Status::Open);
}

#[tokio::test]
async fn numbers_are_distinct_and_increasing_in_creation_order() {
  let s = store().await;
  let ws = s.add_workspace(support_workspace()).await.unwrap();
  let alice = s.add_user(user("Alice")).await.unwrap();

  let mut numbers = Vec::new();
  for i in 0..12 {
    let t = s
      .create_ticket(new_ticket(ws.workspace_id, alice.user_id, &format!("t{i}")))
      .await
      .unwrap();
    numbers.push(t.ticket_no);
  }

  let mut sorted = numbers.clone();
  sorted.sort();
  sorted.dedup();
  assert_eq!(sorted.len(), 12, "numbers must be pairwise distinct");
  assert_eq!(sorted, numbers, "numbers must increase in creation order");
}

#[tokio::test]
async fn sequences_do_not_leak_across_workspaces() {
  let s = store().await;
  let sup = s.add_workspace(support_workspace()).await.unwrap();
  let ops = s
    .add_workspace(NewWorkspace {
      name:    "Operations".into(),
      code:    "OPS".into(),
      enabled: true,
    })
    .await
    .unwrap();
  let alice = s.add_user(user("Alice")).await.unwrap();

  let a = s
    .create_ticket(new_ticket(sup.workspace_id, alice.user_id, "a"))
    .await
    .unwrap();
  let b = s
    .create_ticket(new_ticket(ops.workspace_id, alice.user_id, "b"))
    .await
    .unwrap();

  assert_eq!(a.ticket_no, "SUP-0001");
  assert_eq!(b.ticket_no, "OPS-0001");
}

#[tokio::test]
async fn concurrent_creates_never_share_a_number() {
  let s = store().await;
  let ws = s.add_workspace(support_workspace()).await.unwrap();
  let alice = s.add_user(user("Alice")).await.unwrap();

  let mut handles = Vec::new();
  for i in 0..8 {
    let s = s.clone();
    let input = new_ticket(ws.workspace_id, alice.user_id, &format!("c{i}"));
    handles.push(tokio::spawn(async move { s.create_ticket(input).await }));
  }

  let mut numbers = Vec::new();
  for h in handles {
    numbers.push(h.await.unwrap().unwrap().ticket_no);
  }
  numbers.sort();
  numbers.dedup();
  assert_eq!(numbers.len(), 8);
}

#[tokio::test]
async fn create_in_unknown_workspace_errors() {
  let s = store().await;
  let alice = s.add_user(user("Alice")).await.unwrap();

  let err = s
    .create_ticket(new_ticket(404, alice.user_id, "lost"))
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::WorkspaceNotFound(404)));
}

// ─── Ticket reads and patches ────────────────────────────────────────────────

#[tokio::test]
async fn ticket_by_no_roundtrip() {
  let s = store().await;
  let ws = s.add_workspace(support_workspace()).await.unwrap();
  let alice = s.add_user(user("Alice")).await.unwrap();

  let t = s
    .create_ticket(new_ticket(ws.workspace_id, alice.user_id, "findable"))
    .await
    .unwrap();

  let by_no = s.ticket_by_no("SUP-0001").await.unwrap().unwrap();
  assert_eq!(by_no.ticket_id, t.ticket_id);

  assert!(s.ticket_by_no("SUP-9999").await.unwrap().is_none());
}

#[tokio::test]
async fn patch_sets_and_clears_nullable_fields() {
  let s = store().await;
  let ws = s.add_workspace(support_workspace()).await.unwrap();
  let alice = s.add_user(user("Alice")).await.unwrap();
  let bob = s.add_user(user("Bob")).await.unwrap();

  let t = s
    .create_ticket(new_ticket(ws.workspace_id, alice.user_id, "patchable"))
    .await
    .unwrap();

  let updated = s
    .update_ticket(TicketPatch {
      title: Some("patched title".into()),
      assignee_id: Some(Some(bob.user_id)),
      estimated_hours: Some(Some(2.5)),
      ..TicketPatch::new(t.ticket_id)
    })
    .await
    .unwrap();
  assert_eq!(updated.title, "patched title");
  assert_eq!(updated.assignee_id, Some(bob.user_id));
  assert_eq!(updated.estimated_hours, Some(2.5));
  // Untouched fields survive.
  assert_eq!(updated.content, t.content);
  assert_eq!(updated.ticket_no, t.ticket_no);

  let cleared = s
    .update_ticket(TicketPatch {
      assignee_id: Some(None),
      estimated_hours: Some(None),
      ..TicketPatch::new(t.ticket_id)
    })
    .await
    .unwrap();
  assert_eq!(cleared.assignee_id, None);
  assert_eq!(cleared.estimated_hours, None);
}

#[tokio::test]
async fn patch_missing_ticket_errors() {
  let s = store().await;
  let err = s
    .update_ticket(TicketPatch {
      title: Some("ghost".into()),
      ..TicketPatch::new(404)
    })
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::TicketNotFound(404)));
}

// ─── Transitions ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn transition_commits_all_three_writes() {
  let s = store().await;
  let ws = s.add_workspace(support_workspace()).await.unwrap();
  let alice = s.add_user(user("Alice")).await.unwrap();

  let t = s
    .create_ticket(new_ticket(ws.workspace_id, alice.user_id, "fixme"))
    .await
    .unwrap();

  let out = s
    .apply_transition(resolve_write(t.ticket_id, alice.user_id))
    .await
    .unwrap();

  assert_eq!(out.ticket.status, Status::Resolved);
  assert_eq!(out.ticket.resolver_id, Some(alice.user_id));
  assert!(out.ticket.resolved_at.is_some());
  assert_eq!(out.flow.action, FlowAction::Resolve);
  assert_eq!(out.flow.to_status, "RESOLVED");
  assert_eq!(out.comment.kind, CommentKind::System);

  assert_eq!(s.flows_by_ticket(t.ticket_id).await.unwrap().len(), 1);
  assert_eq!(s.comments_by_ticket(t.ticket_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn transition_on_missing_ticket_errors_and_writes_nothing() {
  let s = store().await;
  let ws = s.add_workspace(support_workspace()).await.unwrap();
  let alice = s.add_user(user("Alice")).await.unwrap();
  s.create_ticket(new_ticket(ws.workspace_id, alice.user_id, "real"))
    .await
    .unwrap();

  let err = s
    .apply_transition(resolve_write(404, alice.user_id))
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::TicketNotFound(404)));

  assert!(s.flows_by_user(alice.user_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn failed_flow_append_rolls_back_the_ticket_patch() {
  let s = store().await;
  let ws = s.add_workspace(support_workspace()).await.unwrap();
  let alice = s.add_user(user("Alice")).await.unwrap();

  let t = s
    .create_ticket(new_ticket(ws.workspace_id, alice.user_id, "atomic"))
    .await
    .unwrap();

  // from_user_id 404 violates the users foreign key, so the flow append
  // fails after the ticket patch has already executed inside the
  // transaction. Nothing may survive.
  let mut write = resolve_write(t.ticket_id, alice.user_id);
  write.flow.from_user_id = 404;
  assert!(s.apply_transition(write).await.is_err());

  let after = s.ticket_by_id(t.ticket_id).await.unwrap().unwrap();
  assert_eq!(after.status, Status::Open);
  assert!(after.resolved_at.is_none());
  assert!(s.flows_by_ticket(t.ticket_id).await.unwrap().is_empty());
  assert!(s.comments_by_ticket(t.ticket_id).await.unwrap().is_empty());
}

// ─── Flow log reads ──────────────────────────────────────────────────────────

#[tokio::test]
async fn flows_by_user_sees_actor_and_recipient_sides() {
  let s = store().await;
  let ws = s.add_workspace(support_workspace()).await.unwrap();
  let alice = s.add_user(user("Alice")).await.unwrap();
  let bob = s.add_user(user("Bob")).await.unwrap();

  let t = s
    .create_ticket(new_ticket(ws.workspace_id, alice.user_id, "handoff"))
    .await
    .unwrap();

  // Alice assigns to Bob: Alice is actor, Bob is recipient.
  let mut write = resolve_write(t.ticket_id, alice.user_id);
  write.flow.action = FlowAction::Assign;
  write.flow.to_user_id = Some(bob.user_id);
  s.apply_transition(write).await.unwrap();

  let as_actor = s.flows_by_user(alice.user_id).await.unwrap();
  let as_recipient = s.flows_by_user(bob.user_id).await.unwrap();
  assert_eq!(as_actor.len(), 1);
  assert_eq!(as_recipient.len(), 1);
  assert_eq!(as_actor[0].flow_id, as_recipient[0].flow_id);
}

#[tokio::test]
async fn flows_come_back_in_creation_order() {
  let s = store().await;
  let ws = s.add_workspace(support_workspace()).await.unwrap();
  let alice = s.add_user(user("Alice")).await.unwrap();

  let t = s
    .create_ticket(new_ticket(ws.workspace_id, alice.user_id, "history"))
    .await
    .unwrap();

  for action in [FlowAction::Start, FlowAction::Resolve, FlowAction::Reopen] {
    let mut write = resolve_write(t.ticket_id, alice.user_id);
    write.flow.action = action;
    s.apply_transition(write).await.unwrap();
  }

  let flows = s.flows_by_ticket(t.ticket_id).await.unwrap();
  let actions: Vec<_> = flows.iter().map(|f| f.action).collect();
  assert_eq!(
    actions,
    [FlowAction::Start, FlowAction::Resolve, FlowAction::Reopen]
  );
}

// ─── Comments ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn comment_crud_roundtrip() {
  let s = store().await;
  let ws = s.add_workspace(support_workspace()).await.unwrap();
  let alice = s.add_user(user("Alice")).await.unwrap();
  let t = s
    .create_ticket(new_ticket(ws.workspace_id, alice.user_id, "chatty"))
    .await
    .unwrap();

  let c = s
    .add_comment(NewComment {
      ticket_id: t.ticket_id,
      author_id: alice.user_id,
      content:   "first!".into(),
      kind:      CommentKind::Comment,
    })
    .await
    .unwrap();
  assert_eq!(c.kind, CommentKind::Comment);

  let updated = s.update_comment(c.comment_id, "edited").await.unwrap();
  assert_eq!(updated.content, "edited");

  assert!(s.delete_comment(c.comment_id).await.unwrap());
  assert!(s.comment_by_id(c.comment_id).await.unwrap().is_none());
  assert!(!s.delete_comment(c.comment_id).await.unwrap());
}

#[tokio::test]
async fn update_missing_comment_errors() {
  let s = store().await;
  let err = s.update_comment(404, "nope").await.unwrap_err();
  assert!(matches!(err, crate::Error::CommentNotFound(404)));
}

#[tokio::test]
async fn count_matches_listing_length() {
  let s = store().await;
  let ws = s.add_workspace(support_workspace()).await.unwrap();
  let alice = s.add_user(user("Alice")).await.unwrap();
  let t = s
    .create_ticket(new_ticket(ws.workspace_id, alice.user_id, "counted"))
    .await
    .unwrap();

  for i in 0..3 {
    s.add_comment(NewComment {
      ticket_id: t.ticket_id,
      author_id: alice.user_id,
      content:   format!("note {i}"),
      kind:      CommentKind::Comment,
    })
    .await
    .unwrap();
  }

  let listed = s.comments_by_ticket(t.ticket_id).await.unwrap();
  let counted = s.count_comments(t.ticket_id).await.unwrap();
  assert_eq!(listed.len() as u64, counted);
  assert_eq!(counted, 3);
}
