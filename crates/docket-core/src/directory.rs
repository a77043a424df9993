//! Workspace and user lookup types.
//!
//! Both entities are owned by excluded collaborators (workspace management,
//! authentication); the engine consumes them read-mostly — the workspace
//! for its ticket-number prefix and enabled flag, the user for display
//! names and notification handles. The `add_*` seams exist so stores and
//! tests can seed rows without a full CRUD surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named partition owning its own ticket numbering sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workspace {
  pub workspace_id: i64,
  pub name:         String,
  /// Short uppercase prefix for ticket numbers, e.g. `SUP`.
  pub code:         String,
  pub enabled:      bool,
  pub created_at:   DateTime<Utc>,
}

/// Input to [`crate::store::TicketStore::add_workspace`].
#[derive(Debug, Clone)]
pub struct NewWorkspace {
  pub name:    String,
  pub code:    String,
  pub enabled: bool,
}

/// A user as the engine sees one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
  pub user_id:      i64,
  pub display_name: String,
  /// External chat identity for direct notifications. A user without one
  /// is silently skipped by the dispatcher.
  pub channel_handle: Option<String>,
  pub created_at:   DateTime<Utc>,
}

/// Input to [`crate::store::TicketStore::add_user`].
#[derive(Debug, Clone)]
pub struct NewUser {
  pub display_name:   String,
  pub channel_handle: Option<String>,
}
