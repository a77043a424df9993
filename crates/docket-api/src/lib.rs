//! JSON REST API for the docket engine.
//!
//! Exposes an axum [`Router`] backed by any
//! [`docket_core::store::TicketStore`]. Auth, TLS, and transport concerns
//! are the caller's responsibility; the acting user arrives as an
//! `X-Actor-Id` header set by the upstream auth layer.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", docket_api::api_router(state))
//! ```

pub mod actor;
pub mod comments;
pub mod error;
pub mod flows;
pub mod tickets;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};

use docket_core::store::TicketStore;
use docket_engine::{CommentDesk, Notifier, WorkflowEngine};

pub use error::ApiError;

// ─── State ───────────────────────────────────────────────────────────────────

/// Shared state threaded through all handlers: the raw store for reads,
/// the engine for workflow writes, the desk for comment writes.
pub struct ApiState<S, N> {
  pub store:    Arc<S>,
  pub engine:   WorkflowEngine<S, N>,
  pub comments: CommentDesk<S>,
}

impl<S, N> Clone for ApiState<S, N> {
  fn clone(&self) -> Self {
    Self {
      store:    Arc::clone(&self.store),
      engine:   self.engine.clone(),
      comments: self.comments.clone(),
    }
  }
}

impl<S, N> ApiState<S, N>
where
  S: TicketStore,
  N: Notifier,
{
  pub fn new(store: Arc<S>, notifier: Arc<N>) -> Self {
    Self {
      engine:   WorkflowEngine::new(Arc::clone(&store), notifier),
      comments: CommentDesk::new(Arc::clone(&store)),
      store,
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router
/// regardless of its own state type.
pub fn api_router<S, N>(state: ApiState<S, N>) -> Router<()>
where
  S: TicketStore + 'static,
  N: Notifier,
{
  Router::new()
    // Tickets
    .route("/tickets", post(tickets::create::<S, N>))
    .route(
      "/tickets/{id}",
      get(tickets::get_one::<S, N>).patch(tickets::update::<S, N>),
    )
    .route("/tickets/no/{ticket_no}", get(tickets::get_by_no::<S, N>))
    .route("/tickets/{id}/assign", post(tickets::assign::<S, N>))
    .route("/tickets/{id}/transfer", post(tickets::transfer::<S, N>))
    .route("/tickets/{id}/status", post(tickets::change_status::<S, N>))
    // Flow log
    .route("/tickets/{id}/flows", get(flows::by_ticket::<S, N>))
    .route("/users/{id}/flows", get(flows::by_user::<S, N>))
    // Comments
    .route(
      "/tickets/{id}/comments",
      get(comments::list::<S, N>).post(comments::create::<S, N>),
    )
    .route("/tickets/{id}/comments/count", get(comments::count::<S, N>))
    .route(
      "/comments/{id}",
      put(comments::update::<S, N>).delete(comments::delete::<S, N>),
    )
    .with_state(state)
}

// ─── Integration tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{header, Request, StatusCode},
  };
  use docket_core::directory::{NewUser, NewWorkspace};
  use docket_engine::NullNotifier;
  use docket_store_sqlite::SqliteStore;
  use serde_json::{json, Value};
  use tower::ServiceExt as _;

  async fn make_state() -> ApiState<SqliteStore, NullNotifier> {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    store
      .add_workspace(NewWorkspace {
        name:    "Support".into(),
        code:    "SUP".into(),
        enabled: true,
      })
      .await
      .unwrap();
    store
      .add_user(NewUser {
        display_name:   "Alice".into(),
        channel_handle: None,
      })
      .await
      .unwrap();
    store
      .add_user(NewUser {
        display_name:   "Bob".into(),
        channel_handle: None,
      })
      .await
      .unwrap();
    ApiState::new(store, Arc::new(NullNotifier))
  }

  async fn send(
    state:  ApiState<SqliteStore, NullNotifier>,
    method: &str,
    uri:    &str,
    actor:  Option<i64>,
    body:   Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(actor) = actor {
      builder = builder.header("x-actor-id", actor.to_string());
    }
    let request = match body {
      Some(v) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(v.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };

    let response = api_router(state).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
      .await
      .unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
  }

  fn create_body() -> Value {
    json!({
      "title": "printer on fire",
      "content": "smoke coming out of tray 2",
      "priority": "HIGH",
      "type": "BUG",
      "workspace_id": 1,
    })
  }

  // ── Tickets ─────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_returns_201_with_the_first_number() {
    let state = make_state().await;
    let (status, body) =
      send(state, "POST", "/tickets", Some(1), Some(create_body())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["ticket_no"], "SUP-0001");
    assert_eq!(body["status"], "OPEN");
  }

  #[tokio::test]
  async fn create_without_actor_header_is_400() {
    let state = make_state().await;
    let (status, body) =
      send(state, "POST", "/tickets", None, Some(create_body())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("X-Actor-Id"));
  }

  #[tokio::test]
  async fn create_with_unknown_priority_is_400() {
    let state = make_state().await;
    let mut body = create_body();
    body["priority"] = json!("ASAP");
    let (status, body) = send(state, "POST", "/tickets", Some(1), Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("priority"));
  }

  #[tokio::test]
  async fn get_missing_ticket_is_404() {
    let state = make_state().await;
    let (status, _) = send(state, "GET", "/tickets/404", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn lookup_by_number_roundtrips() {
    let state = make_state().await;
    send(state.clone(), "POST", "/tickets", Some(1), Some(create_body())).await;

    let (status, body) =
      send(state, "GET", "/tickets/no/SUP-0001", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "printer on fire");
  }

  #[tokio::test]
  async fn assign_moves_to_in_progress_and_logs_a_flow() {
    let state = make_state().await;
    send(state.clone(), "POST", "/tickets", Some(1), Some(create_body())).await;

    let (status, body) = send(
      state.clone(),
      "POST",
      "/tickets/1/assign",
      Some(1),
      Some(json!({ "assignee_id": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "IN_PROGRESS");
    assert_eq!(body["assignee_id"], 2);

    let (_, flows) = send(state, "GET", "/tickets/1/flows", None, None).await;
    let flows = flows.as_array().unwrap();
    assert_eq!(flows.len(), 1);
    assert_eq!(flows[0]["action"], "ASSIGN");
  }

  #[tokio::test]
  async fn resolve_via_status_endpoint_sets_the_resolution_fields() {
    let state = make_state().await;
    send(state.clone(), "POST", "/tickets", Some(1), Some(create_body())).await;

    let (status, body) = send(
      state,
      "POST",
      "/tickets/1/status",
      Some(2),
      Some(json!({ "status": "RESOLVED", "reason": "fixed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "RESOLVED");
    assert_eq!(body["resolver_id"], 2);
    assert!(!body["resolved_at"].is_null());
  }

  #[tokio::test]
  async fn unknown_status_label_is_400() {
    let state = make_state().await;
    send(state.clone(), "POST", "/tickets", Some(1), Some(create_body())).await;

    let (status, _) = send(
      state,
      "POST",
      "/tickets/1/status",
      Some(1),
      Some(json!({ "status": "DONE" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  // ── Comments ────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn comment_lifecycle_over_http() {
    let state = make_state().await;
    send(state.clone(), "POST", "/tickets", Some(1), Some(create_body())).await;

    let (status, comment) = send(
      state.clone(),
      "POST",
      "/tickets/1/comments",
      Some(1),
      Some(json!({ "content": "looking into it" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let comment_id = comment["comment_id"].as_i64().unwrap();

    // Someone else may not edit it.
    let (status, _) = send(
      state.clone(),
      "PUT",
      &format!("/comments/{comment_id}"),
      Some(2),
      Some(json!({ "content": "hijacked" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The author may.
    let (status, updated) = send(
      state.clone(),
      "PUT",
      &format!("/comments/{comment_id}"),
      Some(1),
      Some(json!({ "content": "root cause found" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["content"], "root cause found");

    let (_, count) =
      send(state.clone(), "GET", "/tickets/1/comments/count", None, None).await;
    assert_eq!(count["count"], 1);

    let (status, _) = send(
      state,
      "DELETE",
      &format!("/comments/{comment_id}"),
      Some(1),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
  }
}
