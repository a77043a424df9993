//! [`CommentDesk`] — the comment subsystem.
//!
//! User comments belong to their author: nobody else may edit or delete
//! them, and system comments may not be touched by anyone, since they are
//! the readable echo of the audit trail. The transition path writes its
//! system comments atomically through the store's unit of work;
//! [`CommentDesk::create_system`] covers engine-internal notes made
//! outside a transition.

use std::sync::Arc;

use docket_core::{
  comment::{Comment, CommentKind, NewComment},
  store::TicketStore,
  Error, Result,
};

/// Comment operations over a store backend `S`. Cheap to clone.
pub struct CommentDesk<S> {
  store: Arc<S>,
}

impl<S> Clone for CommentDesk<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store) }
  }
}

impl<S: TicketStore> CommentDesk<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self { store }
  }

  /// Attach a user comment to a ticket.
  pub async fn create(
    &self,
    ticket_id: i64,
    author_id: i64,
    content:   impl Into<String>,
  ) -> Result<Comment> {
    self
      .create_of_kind(ticket_id, author_id, content.into(), CommentKind::Comment)
      .await
  }

  /// Attach a system comment. Engine-internal; system comments written
  /// alongside a flow entry go through the transition unit instead.
  pub async fn create_system(
    &self,
    ticket_id: i64,
    author_id: i64,
    content:   impl Into<String>,
  ) -> Result<Comment> {
    self
      .create_of_kind(ticket_id, author_id, content.into(), CommentKind::System)
      .await
  }

  async fn create_of_kind(
    &self,
    ticket_id: i64,
    author_id: i64,
    content:   String,
    kind:      CommentKind,
  ) -> Result<Comment> {
    if content.trim().is_empty() {
      return Err(Error::validation("comment content must not be empty"));
    }
    self
      .store
      .ticket_by_id(ticket_id)
      .await
      .map_err(Error::storage)?
      .ok_or(Error::TicketNotFound(ticket_id))?;

    self
      .store
      .add_comment(NewComment { ticket_id, author_id, content, kind })
      .await
      .map_err(Error::storage)
  }

  /// Replace a comment's content. Author-only; system comments are
  /// immutable.
  pub async fn update(
    &self,
    comment_id: i64,
    content:    impl Into<String>,
    actor_id:   i64,
  ) -> Result<Comment> {
    let content = content.into();
    if content.trim().is_empty() {
      return Err(Error::validation("comment content must not be empty"));
    }

    let existing = self
      .store
      .comment_by_id(comment_id)
      .await
      .map_err(Error::storage)?
      .ok_or(Error::CommentNotFound(comment_id))?;
    self.check_writable(&existing, actor_id)?;

    self
      .store
      .update_comment(comment_id, &content)
      .await
      .map_err(Error::storage)
  }

  /// Delete a comment. Author-only; deleting a comment that is already
  /// gone is a no-op.
  pub async fn delete(&self, comment_id: i64, actor_id: i64) -> Result<()> {
    let existing = match self
      .store
      .comment_by_id(comment_id)
      .await
      .map_err(Error::storage)?
    {
      Some(c) => c,
      None => return Ok(()),
    };
    self.check_writable(&existing, actor_id)?;

    self
      .store
      .delete_comment(comment_id)
      .await
      .map_err(Error::storage)?;
    Ok(())
  }

  /// All comments on a ticket, in creation order.
  pub async fn by_ticket(&self, ticket_id: i64) -> Result<Vec<Comment>> {
    self
      .store
      .comments_by_ticket(ticket_id)
      .await
      .map_err(Error::storage)
  }

  /// Number of comments on a ticket.
  pub async fn count_by_ticket(&self, ticket_id: i64) -> Result<u64> {
    self
      .store
      .count_comments(ticket_id)
      .await
      .map_err(Error::storage)
  }

  fn check_writable(&self, comment: &Comment, actor_id: i64) -> Result<()> {
    if comment.kind == CommentKind::System {
      return Err(Error::SystemComment(comment.comment_id));
    }
    if comment.author_id != actor_id {
      return Err(Error::NotCommentAuthor {
        comment_id: comment.comment_id,
        actor_id,
      });
    }
    Ok(())
  }
}
