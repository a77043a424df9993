//! The `TicketStore` trait and the transition unit-of-work types.
//!
//! The trait is implemented by storage backends (e.g.
//! `docket-store-sqlite`). Higher layers (`docket-engine`, `docket-api`)
//! depend on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::{
  comment::{Comment, NewComment},
  directory::{NewUser, NewWorkspace, User, Workspace},
  flow::{FlowEntry, NewFlowEntry},
  ticket::{NewTicket, Ticket, TicketPatch},
};

// ─── Transition unit of work ─────────────────────────────────────────────────

/// The three writes of one workflow transition, committed atomically:
/// the ticket patch, the flow append, and the system-comment append.
/// Either all three land or none do.
#[derive(Debug, Clone)]
pub struct TransitionWrite {
  pub patch:   TicketPatch,
  pub flow:    NewFlowEntry,
  pub comment: NewComment,
}

/// The persisted result of a committed [`TransitionWrite`].
#[derive(Debug, Clone)]
pub struct Transition {
  pub ticket:  Ticket,
  pub flow:    FlowEntry,
  pub comment: Comment,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a docket storage backend.
///
/// Flow entries are append-only; the backend must never expose a way to
/// mutate or delete them. `create_ticket` and `apply_transition` are each
/// one atomic unit: concurrent callers observe either all of an operation's
/// writes or none of them.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait TicketStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Workspaces (collaborator seam) ────────────────────────────────────

  /// Persist a workspace row. Exists for seeding; workspace management
  /// proper lives outside this engine.
  fn add_workspace(
    &self,
    input: NewWorkspace,
  ) -> impl Future<Output = Result<Workspace, Self::Error>> + Send + '_;

  /// Retrieve a workspace by id. Returns `None` if not found.
  fn workspace_by_id(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Workspace>, Self::Error>> + Send + '_;

  // ── Users (collaborator seam) ─────────────────────────────────────────

  /// Persist a user row. Exists for seeding; account management proper
  /// lives outside this engine.
  fn add_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Retrieve a user by id. Returns `None` if not found.
  fn user_by_id(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  // ── Tickets ───────────────────────────────────────────────────────────

  /// Persist a new ticket with status OPEN.
  ///
  /// Assigns the id, both timestamps, and the next `ticket_no` for the
  /// owning workspace. The per-workspace counter increment and the ticket
  /// insert happen in one transaction, so two concurrent creations in the
  /// same workspace can never receive the same number.
  fn create_ticket(
    &self,
    input: NewTicket,
  ) -> impl Future<Output = Result<Ticket, Self::Error>> + Send + '_;

  /// Retrieve a ticket by id. Returns `None` if not found.
  fn ticket_by_id(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Ticket>, Self::Error>> + Send + '_;

  /// Retrieve a ticket by its display number. Returns `None` if not found.
  fn ticket_by_no<'a>(
    &'a self,
    ticket_no: &'a str,
  ) -> impl Future<Output = Result<Option<Ticket>, Self::Error>> + Send + 'a;

  /// Apply a bare field patch with no flow or comment side effects.
  /// Used by the generic edit path, not by workflow transitions.
  fn update_ticket(
    &self,
    patch: TicketPatch,
  ) -> impl Future<Output = Result<Ticket, Self::Error>> + Send + '_;

  // ── Transitions — the atomic unit ─────────────────────────────────────

  /// Commit one workflow transition: ticket patch + flow append + comment
  /// append, all-or-nothing. On any failure no partial write persists.
  fn apply_transition(
    &self,
    write: TransitionWrite,
  ) -> impl Future<Output = Result<Transition, Self::Error>> + Send + '_;

  // ── Flow log reads ────────────────────────────────────────────────────

  /// All flow entries for a ticket, in creation order.
  fn flows_by_ticket(
    &self,
    ticket_id: i64,
  ) -> impl Future<Output = Result<Vec<FlowEntry>, Self::Error>> + Send + '_;

  /// All flow entries where the user appears as actor or recipient,
  /// in creation order.
  fn flows_by_user(
    &self,
    user_id: i64,
  ) -> impl Future<Output = Result<Vec<FlowEntry>, Self::Error>> + Send + '_;

  // ── Comments ──────────────────────────────────────────────────────────

  /// Persist a comment and return it with id and timestamps assigned.
  fn add_comment(
    &self,
    input: NewComment,
  ) -> impl Future<Output = Result<Comment, Self::Error>> + Send + '_;

  /// Retrieve a comment by id. Returns `None` if not found.
  fn comment_by_id(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Comment>, Self::Error>> + Send + '_;

  /// Replace a comment's content and bump its `updated_at`.
  /// Ownership checks are the engine's responsibility, not the store's.
  fn update_comment<'a>(
    &'a self,
    id: i64,
    content: &'a str,
  ) -> impl Future<Output = Result<Comment, Self::Error>> + Send + 'a;

  /// Delete a comment. Returns `false` if no row existed.
  fn delete_comment(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// All comments on a ticket, in creation order.
  fn comments_by_ticket(
    &self,
    ticket_id: i64,
  ) -> impl Future<Output = Result<Vec<Comment>, Self::Error>> + Send + '_;

  /// Number of comments on a ticket; always equals the length of
  /// [`TicketStore::comments_by_ticket`] for the same ticket.
  fn count_comments(
    &self,
    ticket_id: i64,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;
}
