//! Handlers for flow-log read endpoints.
//!
//! The flow log is append-only; these are the only verbs it has.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/tickets/:id/flows` | Creation order |
//! | `GET`  | `/users/:id/flows` | Entries where the user is actor or recipient |

use axum::{
  Json,
  extract::{Path, State},
};

use docket_core::{flow::FlowEntry, store::TicketStore};
use docket_engine::Notifier;

use crate::{error::ApiError, ApiState};

/// `GET /tickets/:id/flows`
pub async fn by_ticket<S, N>(
  State(state): State<ApiState<S, N>>,
  Path(ticket_id): Path<i64>,
) -> Result<Json<Vec<FlowEntry>>, ApiError>
where
  S: TicketStore,
  N: Notifier,
{
  let flows = state
    .store
    .flows_by_ticket(ticket_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(flows))
}

/// `GET /users/:id/flows`
pub async fn by_user<S, N>(
  State(state): State<ApiState<S, N>>,
  Path(user_id): Path<i64>,
) -> Result<Json<Vec<FlowEntry>>, ApiError>
where
  S: TicketStore,
  N: Notifier,
{
  let flows = state
    .store
    .flows_by_user(user_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(flows))
}
