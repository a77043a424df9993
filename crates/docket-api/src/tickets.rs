//! Handlers for `/tickets` endpoints.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `POST`  | `/tickets` | File a new ticket |
//! | `GET`   | `/tickets/:id` | 404 if not found |
//! | `PATCH` | `/tickets/:id` | Generic edit, no workflow side effects |
//! | `GET`   | `/tickets/no/:ticket_no` | Lookup by display number |
//! | `POST`  | `/tickets/:id/assign` | Body: `{"assignee_id": 7}` |
//! | `POST`  | `/tickets/:id/transfer` | Body: `{"to_user_id": 7, "reason": "..."}` |
//! | `POST`  | `/tickets/:id/status` | Body: `{"status": "RESOLVED", "reason": "..."}` |
//!
//! Enum fields arrive as their SCREAMING_SNAKE labels; an unknown label is
//! a 400, never a 500.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use docket_core::{
  store::TicketStore,
  ticket::{Priority, Status, Ticket, TicketKind},
};
use docket_engine::{CreateTicket, Notifier, UpdateTicket};

use crate::{actor::ActorId, error::ApiError, ApiState};

// ─── Enum parsing ────────────────────────────────────────────────────────────

fn parse_priority(s: &str) -> Result<Priority, ApiError> {
  s.parse()
    .map_err(|_| ApiError::BadRequest(format!("unknown priority: {s:?}")))
}

fn parse_kind(s: &str) -> Result<TicketKind, ApiError> {
  s.parse()
    .map_err(|_| ApiError::BadRequest(format!("unknown ticket type: {s:?}")))
}

fn parse_status(s: &str) -> Result<Status, ApiError> {
  s.parse()
    .map_err(|_| ApiError::BadRequest(format!("unknown status: {s:?}")))
}

// ─── Create ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub title:           String,
  pub content:         String,
  pub priority:        String,
  #[serde(rename = "type")]
  pub kind:            String,
  pub workspace_id:    i64,
  pub assignee_id:     Option<i64>,
  pub estimated_hours: Option<f64>,
  pub due_date:        Option<DateTime<Utc>>,
}

/// `POST /tickets`
pub async fn create<S, N>(
  State(state): State<ApiState<S, N>>,
  ActorId(actor_id): ActorId,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: TicketStore,
  N: Notifier,
{
  let ticket = state
    .engine
    .create(
      CreateTicket {
        title:           body.title,
        content:         body.content,
        priority:        parse_priority(&body.priority)?,
        kind:            parse_kind(&body.kind)?,
        workspace_id:    body.workspace_id,
        assignee_id:     body.assignee_id,
        estimated_hours: body.estimated_hours,
        due_date:        body.due_date,
      },
      actor_id,
    )
    .await?;
  Ok((StatusCode::CREATED, Json(ticket)))
}

// ─── Reads ───────────────────────────────────────────────────────────────────

/// `GET /tickets/:id`
pub async fn get_one<S, N>(
  State(state): State<ApiState<S, N>>,
  Path(id): Path<i64>,
) -> Result<Json<Ticket>, ApiError>
where
  S: TicketStore,
  N: Notifier,
{
  let ticket = state
    .store
    .ticket_by_id(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("ticket {id} not found")))?;
  Ok(Json(ticket))
}

/// `GET /tickets/no/:ticket_no`
pub async fn get_by_no<S, N>(
  State(state): State<ApiState<S, N>>,
  Path(ticket_no): Path<String>,
) -> Result<Json<Ticket>, ApiError>
where
  S: TicketStore,
  N: Notifier,
{
  let ticket = state
    .store
    .ticket_by_no(&ticket_no)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("ticket {ticket_no} not found")))?;
  Ok(Json(ticket))
}

// ─── Generic update ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UpdateBody {
  pub title:           Option<String>,
  pub content:         Option<String>,
  pub priority:        Option<String>,
  #[serde(rename = "type")]
  pub kind:            Option<String>,
  pub assignee_id:     Option<i64>,
  pub estimated_hours: Option<f64>,
  pub actual_hours:    Option<f64>,
  pub due_date:        Option<DateTime<Utc>>,
}

/// `PATCH /tickets/:id` — absent fields stay untouched.
pub async fn update<S, N>(
  State(state): State<ApiState<S, N>>,
  Path(id): Path<i64>,
  ActorId(actor_id): ActorId,
  Json(body): Json<UpdateBody>,
) -> Result<Json<Ticket>, ApiError>
where
  S: TicketStore,
  N: Notifier,
{
  let ticket = state
    .engine
    .update(
      UpdateTicket {
        ticket_id:       id,
        title:           body.title,
        content:         body.content,
        priority:        body.priority.as_deref().map(parse_priority).transpose()?,
        kind:            body.kind.as_deref().map(parse_kind).transpose()?,
        assignee_id:     body.assignee_id.map(Some),
        estimated_hours: body.estimated_hours.map(Some),
        actual_hours:    body.actual_hours.map(Some),
        due_date:        body.due_date.map(Some),
      },
      actor_id,
    )
    .await?;
  Ok(Json(ticket))
}

// ─── Workflow operations ─────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AssignBody {
  pub assignee_id: i64,
}

/// `POST /tickets/:id/assign`
pub async fn assign<S, N>(
  State(state): State<ApiState<S, N>>,
  Path(id): Path<i64>,
  ActorId(actor_id): ActorId,
  Json(body): Json<AssignBody>,
) -> Result<Json<Ticket>, ApiError>
where
  S: TicketStore,
  N: Notifier,
{
  let ticket = state.engine.assign(id, body.assignee_id, actor_id).await?;
  Ok(Json(ticket))
}

#[derive(Debug, Deserialize)]
pub struct TransferBody {
  pub to_user_id: i64,
  pub reason:     Option<String>,
}

/// `POST /tickets/:id/transfer`
pub async fn transfer<S, N>(
  State(state): State<ApiState<S, N>>,
  Path(id): Path<i64>,
  ActorId(actor_id): ActorId,
  Json(body): Json<TransferBody>,
) -> Result<Json<Ticket>, ApiError>
where
  S: TicketStore,
  N: Notifier,
{
  let ticket = state
    .engine
    .transfer(id, body.to_user_id, body.reason, actor_id)
    .await?;
  Ok(Json(ticket))
}

#[derive(Debug, Deserialize)]
pub struct StatusBody {
  pub status: String,
  pub reason: Option<String>,
}

/// `POST /tickets/:id/status`
pub async fn change_status<S, N>(
  State(state): State<ApiState<S, N>>,
  Path(id): Path<i64>,
  ActorId(actor_id): ActorId,
  Json(body): Json<StatusBody>,
) -> Result<Json<Ticket>, ApiError>
where
  S: TicketStore,
  N: Notifier,
{
  let status = parse_status(&body.status)?;
  let ticket = state
    .engine
    .change_status(id, status, body.reason, actor_id)
    .await?;
  Ok(Json(ticket))
}
