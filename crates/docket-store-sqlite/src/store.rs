//! [`SqliteStore`] — the SQLite implementation of [`TicketStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;

use docket_core::{
  comment::{Comment, NewComment},
  directory::{NewUser, NewWorkspace, User, Workspace},
  flow::{FlowEntry, NewFlowEntry},
  store::{TicketStore, Transition, TransitionWrite},
  ticket::{NewTicket, Status, Ticket, TicketPatch},
};

use crate::{
  encode::{
    encode_action, encode_comment_kind, encode_dt, encode_kind,
    encode_priority, encode_status, RawComment, RawFlowEntry, RawTicket,
    RawUser, RawWorkspace,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Column lists ────────────────────────────────────────────────────────────

const TICKET_COLS: &str = "ticket_id, ticket_no, title, content, priority, \
   kind, status, workspace_id, creator_id, assignee_id, resolver_id, \
   estimated_hours, actual_hours, due_date, resolved_at, closed_at, \
   created_at, updated_at";

const FLOW_COLS: &str = "flow_id, ticket_id, from_user_id, to_user_id, \
   from_status, to_status, action, reason, created_at";

const COMMENT_COLS: &str =
  "comment_id, ticket_id, author_id, content, kind, created_at, updated_at";

// ─── Row readers ─────────────────────────────────────────────────────────────

fn ticket_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawTicket> {
  Ok(RawTicket {
    ticket_id:       row.get(0)?,
    ticket_no:       row.get(1)?,
    title:           row.get(2)?,
    content:         row.get(3)?,
    priority:        row.get(4)?,
    kind:            row.get(5)?,
    status:          row.get(6)?,
    workspace_id:    row.get(7)?,
    creator_id:      row.get(8)?,
    assignee_id:     row.get(9)?,
    resolver_id:     row.get(10)?,
    estimated_hours: row.get(11)?,
    actual_hours:    row.get(12)?,
    due_date:        row.get(13)?,
    resolved_at:     row.get(14)?,
    closed_at:       row.get(15)?,
    created_at:      row.get(16)?,
    updated_at:      row.get(17)?,
  })
}

fn flow_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawFlowEntry> {
  Ok(RawFlowEntry {
    flow_id:      row.get(0)?,
    ticket_id:    row.get(1)?,
    from_user_id: row.get(2)?,
    to_user_id:   row.get(3)?,
    from_status:  row.get(4)?,
    to_status:    row.get(5)?,
    action:       row.get(6)?,
    reason:       row.get(7)?,
    created_at:   row.get(8)?,
  })
}

fn comment_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawComment> {
  Ok(RawComment {
    comment_id: row.get(0)?,
    ticket_id:  row.get(1)?,
    author_id:  row.get(2)?,
    content:    row.get(3)?,
    kind:       row.get(4)?,
    created_at: row.get(5)?,
    updated_at: row.get(6)?,
  })
}

// ─── In-transaction helpers ──────────────────────────────────────────────────
// Plain functions over `&Connection` so both the single-statement methods
// and the transition transaction can share them. `Transaction` derefs to
// `Connection`.

fn read_ticket(
  conn: &rusqlite::Connection,
  id: i64,
) -> rusqlite::Result<Option<RawTicket>> {
  conn
    .query_row(
      &format!("SELECT {TICKET_COLS} FROM tickets WHERE ticket_id = ?1"),
      rusqlite::params![id],
      ticket_from_row,
    )
    .optional()
}

fn read_comment(
  conn: &rusqlite::Connection,
  id: i64,
) -> rusqlite::Result<Option<RawComment>> {
  conn
    .query_row(
      &format!("SELECT {COMMENT_COLS} FROM ticket_comments WHERE comment_id = ?1"),
      rusqlite::params![id],
      comment_from_row,
    )
    .optional()
}

/// Apply `patch` to its ticket row, always bumping `updated_at`.
/// Returns the number of rows touched (0 when the ticket is absent).
fn patch_ticket(
  conn:  &rusqlite::Connection,
  patch: &TicketPatch,
  now:   &str,
) -> rusqlite::Result<usize> {
  let mut sets: Vec<&'static str> = vec!["updated_at = ?"];
  let mut args: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(now.to_owned())];

  if let Some(v) = &patch.title {
    sets.push("title = ?");
    args.push(Box::new(v.clone()));
  }
  if let Some(v) = &patch.content {
    sets.push("content = ?");
    args.push(Box::new(v.clone()));
  }
  if let Some(v) = patch.priority {
    sets.push("priority = ?");
    args.push(Box::new(encode_priority(v)));
  }
  if let Some(v) = patch.kind {
    sets.push("kind = ?");
    args.push(Box::new(encode_kind(v)));
  }
  if let Some(v) = patch.status {
    sets.push("status = ?");
    args.push(Box::new(encode_status(v)));
  }
  if let Some(v) = patch.assignee_id {
    sets.push("assignee_id = ?");
    args.push(Box::new(v));
  }
  if let Some(v) = patch.resolver_id {
    sets.push("resolver_id = ?");
    args.push(Box::new(v));
  }
  if let Some(v) = patch.estimated_hours {
    sets.push("estimated_hours = ?");
    args.push(Box::new(v));
  }
  if let Some(v) = patch.actual_hours {
    sets.push("actual_hours = ?");
    args.push(Box::new(v));
  }
  if let Some(v) = patch.due_date {
    sets.push("due_date = ?");
    args.push(Box::new(v.map(encode_dt)));
  }
  if let Some(v) = patch.resolved_at {
    sets.push("resolved_at = ?");
    args.push(Box::new(v.map(encode_dt)));
  }
  if let Some(v) = patch.closed_at {
    sets.push("closed_at = ?");
    args.push(Box::new(v.map(encode_dt)));
  }

  args.push(Box::new(patch.ticket_id));
  let sql = format!(
    "UPDATE tickets SET {} WHERE ticket_id = ?",
    sets.join(", ")
  );
  conn.execute(&sql, rusqlite::params_from_iter(args.iter().map(|a| a.as_ref())))
}

fn insert_flow(
  conn: &rusqlite::Connection,
  flow: &NewFlowEntry,
  now:  &str,
) -> rusqlite::Result<i64> {
  conn.execute(
    "INSERT INTO ticket_flows (
       ticket_id, from_user_id, to_user_id, from_status, to_status,
       action, reason, created_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    rusqlite::params![
      flow.ticket_id,
      flow.from_user_id,
      flow.to_user_id,
      flow.from_status,
      flow.to_status,
      encode_action(flow.action),
      flow.reason,
      now,
    ],
  )?;
  Ok(conn.last_insert_rowid())
}

fn insert_comment(
  conn:    &rusqlite::Connection,
  comment: &NewComment,
  now:     &str,
) -> rusqlite::Result<i64> {
  conn.execute(
    "INSERT INTO ticket_comments (ticket_id, author_id, content, kind, created_at, updated_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
    rusqlite::params![
      comment.ticket_id,
      comment.author_id,
      comment.content,
      encode_comment_kind(comment.kind),
      now,
    ],
  )?;
  Ok(conn.last_insert_rowid())
}

/// True when an insert died on the `tickets.ticket_no` UNIQUE constraint.
fn is_ticket_no_conflict(e: &tokio_rusqlite::Error) -> bool {
  matches!(
    e,
    tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(f, Some(msg)))
      if f.code == rusqlite::ErrorCode::ConstraintViolation
        && msg.contains("tickets.ticket_no")
  )
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A docket store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. All calls
/// run serially on the connection's thread, which is what makes
/// `create_ticket`'s counter increment atomic per workspace.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// One sequence-increment + ticket-insert transaction.
  async fn try_create_ticket(&self, input: NewTicket) -> Result<Ticket> {
    let workspace_id = input.workspace_id;
    let now = encode_dt(Utc::now());

    let raw: Option<RawTicket> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let code: Option<String> = tx
          .query_row(
            "SELECT code FROM workspaces WHERE workspace_id = ?1",
            rusqlite::params![input.workspace_id],
            |r| r.get(0),
          )
          .optional()?;
        let Some(code) = code else { return Ok(None) };

        // Atomic increment-and-read of the per-workspace counter.
        let seq: i64 = tx.query_row(
          "INSERT INTO ticket_sequences (workspace_id, counter)
           VALUES (?1, 1)
           ON CONFLICT (workspace_id) DO UPDATE SET counter = counter + 1
           RETURNING counter",
          rusqlite::params![input.workspace_id],
          |r| r.get(0),
        )?;
        let ticket_no = format!("{code}-{seq:04}");

        tx.execute(
          "INSERT INTO tickets (
             ticket_no, title, content, priority, kind, status,
             workspace_id, creator_id, assignee_id,
             estimated_hours, due_date, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)",
          rusqlite::params![
            ticket_no,
            input.title,
            input.content,
            encode_priority(input.priority),
            encode_kind(input.kind),
            encode_status(Status::Open),
            input.workspace_id,
            input.creator_id,
            input.assignee_id,
            input.estimated_hours,
            input.due_date.map(encode_dt),
            now,
          ],
        )?;

        let id = tx.last_insert_rowid();
        let raw = read_ticket(&tx, id)?
          .ok_or(rusqlite::Error::QueryReturnedNoRows)?;
        tx.commit()?;
        Ok(Some(raw))
      })
      .await?;

    raw
      .ok_or(Error::WorkspaceNotFound(workspace_id))?
      .into_ticket()
  }
}

// ─── TicketStore impl ────────────────────────────────────────────────────────

impl TicketStore for SqliteStore {
  type Error = Error;

  // ── Workspaces ────────────────────────────────────────────────────────────

  async fn add_workspace(&self, input: NewWorkspace) -> Result<Workspace> {
    let now = encode_dt(Utc::now());

    let raw: RawWorkspace = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO workspaces (name, code, enabled, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![input.name, input.code, input.enabled, now],
        )?;
        let id = conn.last_insert_rowid();
        Ok(RawWorkspace {
          workspace_id: id,
          name:         input.name,
          code:         input.code,
          enabled:      input.enabled,
          created_at:   now,
        })
      })
      .await?;

    raw.into_workspace()
  }

  async fn workspace_by_id(&self, id: i64) -> Result<Option<Workspace>> {
    let raw: Option<RawWorkspace> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT workspace_id, name, code, enabled, created_at
               FROM workspaces WHERE workspace_id = ?1",
              rusqlite::params![id],
              |row| {
                Ok(RawWorkspace {
                  workspace_id: row.get(0)?,
                  name:         row.get(1)?,
                  code:         row.get(2)?,
                  enabled:      row.get(3)?,
                  created_at:   row.get(4)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawWorkspace::into_workspace).transpose()
  }

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn add_user(&self, input: NewUser) -> Result<User> {
    let now = encode_dt(Utc::now());

    let raw: RawUser = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (display_name, channel_handle, created_at)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![input.display_name, input.channel_handle, now],
        )?;
        let id = conn.last_insert_rowid();
        Ok(RawUser {
          user_id:        id,
          display_name:   input.display_name,
          channel_handle: input.channel_handle,
          created_at:     now,
        })
      })
      .await?;

    raw.into_user()
  }

  async fn user_by_id(&self, id: i64) -> Result<Option<User>> {
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, display_name, channel_handle, created_at
               FROM users WHERE user_id = ?1",
              rusqlite::params![id],
              |row| {
                Ok(RawUser {
                  user_id:        row.get(0)?,
                  display_name:   row.get(1)?,
                  channel_handle: row.get(2)?,
                  created_at:     row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  // ── Tickets ───────────────────────────────────────────────────────────────

  async fn create_ticket(&self, input: NewTicket) -> Result<Ticket> {
    // A ticket_no collision is only possible if a counter row was edited
    // behind the store's back; one retry re-increments past it.
    let workspace_id = input.workspace_id;
    match self.try_create_ticket(input.clone()).await {
      Err(Error::Database(e)) if is_ticket_no_conflict(&e) => {
        match self.try_create_ticket(input).await {
          Err(Error::Database(e)) if is_ticket_no_conflict(&e) => {
            Err(Error::SequenceConflict(workspace_id))
          }
          other => other,
        }
      }
      other => other,
    }
  }

  async fn ticket_by_id(&self, id: i64) -> Result<Option<Ticket>> {
    let raw: Option<RawTicket> = self
      .conn
      .call(move |conn| Ok(read_ticket(conn, id)?))
      .await?;

    raw.map(RawTicket::into_ticket).transpose()
  }

  async fn ticket_by_no(&self, ticket_no: &str) -> Result<Option<Ticket>> {
    let no = ticket_no.to_owned();

    let raw: Option<RawTicket> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {TICKET_COLS} FROM tickets WHERE ticket_no = ?1"),
              rusqlite::params![no],
              ticket_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawTicket::into_ticket).transpose()
  }

  async fn update_ticket(&self, patch: TicketPatch) -> Result<Ticket> {
    let ticket_id = patch.ticket_id;
    let now = encode_dt(Utc::now());

    let raw: Option<RawTicket> = self
      .conn
      .call(move |conn| {
        let touched = patch_ticket(conn, &patch, &now)?;
        if touched == 0 {
          return Ok(None);
        }
        Ok(read_ticket(conn, patch.ticket_id)?)
      })
      .await?;

    raw
      .ok_or(Error::TicketNotFound(ticket_id))?
      .into_ticket()
  }

  // ── Transitions — the atomic unit ─────────────────────────────────────────

  async fn apply_transition(&self, write: TransitionWrite) -> Result<Transition> {
    let ticket_id = write.patch.ticket_id;
    let now = encode_dt(Utc::now());

    let out: Option<(RawTicket, RawFlowEntry, RawComment)> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        if read_ticket(&tx, ticket_id)?.is_none() {
          return Ok(None);
        }

        patch_ticket(&tx, &write.patch, &now)?;
        let flow_id = insert_flow(&tx, &write.flow, &now)?;
        let comment_id = insert_comment(&tx, &write.comment, &now)?;

        let ticket = read_ticket(&tx, ticket_id)?
          .ok_or(rusqlite::Error::QueryReturnedNoRows)?;
        let flow = tx.query_row(
          &format!("SELECT {FLOW_COLS} FROM ticket_flows WHERE flow_id = ?1"),
          rusqlite::params![flow_id],
          flow_from_row,
        )?;
        let comment = read_comment(&tx, comment_id)?
          .ok_or(rusqlite::Error::QueryReturnedNoRows)?;

        tx.commit()?;
        Ok(Some((ticket, flow, comment)))
      })
      .await?;

    let (ticket, flow, comment) =
      out.ok_or(Error::TicketNotFound(ticket_id))?;
    Ok(Transition {
      ticket:  ticket.into_ticket()?,
      flow:    flow.into_flow()?,
      comment: comment.into_comment()?,
    })
  }

  // ── Flow log reads ────────────────────────────────────────────────────────

  async fn flows_by_ticket(&self, ticket_id: i64) -> Result<Vec<FlowEntry>> {
    let raws: Vec<RawFlowEntry> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {FLOW_COLS} FROM ticket_flows
           WHERE ticket_id = ?1 ORDER BY flow_id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![ticket_id], flow_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawFlowEntry::into_flow).collect()
  }

  async fn flows_by_user(&self, user_id: i64) -> Result<Vec<FlowEntry>> {
    let raws: Vec<RawFlowEntry> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {FLOW_COLS} FROM ticket_flows
           WHERE from_user_id = ?1 OR to_user_id = ?1 ORDER BY flow_id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![user_id], flow_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawFlowEntry::into_flow).collect()
  }

  // ── Comments ──────────────────────────────────────────────────────────────

  async fn add_comment(&self, input: NewComment) -> Result<Comment> {
    let now = encode_dt(Utc::now());

    let raw: RawComment = self
      .conn
      .call(move |conn| {
        let id = insert_comment(conn, &input, &now)?;
        Ok(read_comment(conn, id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)?)
      })
      .await?;

    raw.into_comment()
  }

  async fn comment_by_id(&self, id: i64) -> Result<Option<Comment>> {
    let raw: Option<RawComment> = self
      .conn
      .call(move |conn| Ok(read_comment(conn, id)?))
      .await?;

    raw.map(RawComment::into_comment).transpose()
  }

  async fn update_comment(&self, id: i64, content: &str) -> Result<Comment> {
    let content = content.to_owned();
    let now = encode_dt(Utc::now());

    let raw: Option<RawComment> = self
      .conn
      .call(move |conn| {
        let touched = conn.execute(
          "UPDATE ticket_comments SET content = ?2, updated_at = ?3
           WHERE comment_id = ?1",
          rusqlite::params![id, content, now],
        )?;
        if touched == 0 {
          return Ok(None);
        }
        Ok(read_comment(conn, id)?)
      })
      .await?;

    raw.ok_or(Error::CommentNotFound(id))?.into_comment()
  }

  async fn delete_comment(&self, id: i64) -> Result<bool> {
    let deleted: bool = self
      .conn
      .call(move |conn| {
        let touched = conn.execute(
          "DELETE FROM ticket_comments WHERE comment_id = ?1",
          rusqlite::params![id],
        )?;
        Ok(touched > 0)
      })
      .await?;

    Ok(deleted)
  }

  async fn comments_by_ticket(&self, ticket_id: i64) -> Result<Vec<Comment>> {
    let raws: Vec<RawComment> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {COMMENT_COLS} FROM ticket_comments
           WHERE ticket_id = ?1 ORDER BY comment_id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![ticket_id], comment_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawComment::into_comment).collect()
  }

  async fn count_comments(&self, ticket_id: i64) -> Result<u64> {
    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM ticket_comments WHERE ticket_id = ?1",
          rusqlite::params![ticket_id],
          |r| r.get(0),
        )?)
      })
      .await?;

    Ok(count as u64)
  }
}
