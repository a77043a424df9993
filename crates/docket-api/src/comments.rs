//! Handlers for comment endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/tickets/:id/comments` | Creation order |
//! | `POST`   | `/tickets/:id/comments` | Body: `{"content": "..."}` |
//! | `GET`    | `/tickets/:id/comments/count` | `{"count": n}` |
//! | `PUT`    | `/comments/:id` | Author only; 403 otherwise |
//! | `DELETE` | `/comments/:id` | Author only; no-op when absent |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use docket_core::{comment::Comment, store::TicketStore};
use docket_engine::Notifier;

use crate::{actor::ActorId, error::ApiError, ApiState};

/// `GET /tickets/:id/comments`
pub async fn list<S, N>(
  State(state): State<ApiState<S, N>>,
  Path(ticket_id): Path<i64>,
) -> Result<Json<Vec<Comment>>, ApiError>
where
  S: TicketStore,
  N: Notifier,
{
  let comments = state.comments.by_ticket(ticket_id).await?;
  Ok(Json(comments))
}

/// `GET /tickets/:id/comments/count`
pub async fn count<S, N>(
  State(state): State<ApiState<S, N>>,
  Path(ticket_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError>
where
  S: TicketStore,
  N: Notifier,
{
  let count = state.comments.count_by_ticket(ticket_id).await?;
  Ok(Json(json!({ "count": count })))
}

#[derive(Debug, Deserialize)]
pub struct CommentBody {
  pub content: String,
}

/// `POST /tickets/:id/comments`
pub async fn create<S, N>(
  State(state): State<ApiState<S, N>>,
  Path(ticket_id): Path<i64>,
  ActorId(actor_id): ActorId,
  Json(body): Json<CommentBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: TicketStore,
  N: Notifier,
{
  let comment = state
    .comments
    .create(ticket_id, actor_id, body.content)
    .await?;
  Ok((StatusCode::CREATED, Json(comment)))
}

/// `PUT /comments/:id`
pub async fn update<S, N>(
  State(state): State<ApiState<S, N>>,
  Path(comment_id): Path<i64>,
  ActorId(actor_id): ActorId,
  Json(body): Json<CommentBody>,
) -> Result<Json<Comment>, ApiError>
where
  S: TicketStore,
  N: Notifier,
{
  let comment = state
    .comments
    .update(comment_id, body.content, actor_id)
    .await?;
  Ok(Json(comment))
}

/// `DELETE /comments/:id`
pub async fn delete<S, N>(
  State(state): State<ApiState<S, N>>,
  Path(comment_id): Path<i64>,
  ActorId(actor_id): ActorId,
) -> Result<impl IntoResponse, ApiError>
where
  S: TicketStore,
  N: Notifier,
{
  state.comments.delete(comment_id, actor_id).await?;
  Ok(StatusCode::NO_CONTENT)
}
