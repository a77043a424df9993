//! The `X-Actor-Id` extractor.
//!
//! Every workflow call takes an explicit acting user; the header is how
//! that identity enters over HTTP. Authentication itself is an upstream
//! concern — by the time a request reaches this router, the header is
//! trusted.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::ApiError;

/// The id of the authenticated user performing the request.
#[derive(Debug, Clone, Copy)]
pub struct ActorId(pub i64);

impl<S> FromRequestParts<S> for ActorId
where
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &S,
  ) -> Result<Self, Self::Rejection> {
    let value = parts
      .headers
      .get("x-actor-id")
      .ok_or_else(|| ApiError::BadRequest("missing X-Actor-Id header".into()))?;
    let id = value
      .to_str()
      .ok()
      .and_then(|s| s.parse().ok())
      .ok_or_else(|| ApiError::BadRequest("invalid X-Actor-Id header".into()))?;
    Ok(Self(id))
  }
}
