//! The docket workflow engine.
//!
//! Orchestrates the ticket store, the flow log, and the comment subsystem:
//! every workflow operation validates its inputs, commits its three writes
//! as one unit of work through [`docket_core::store::TicketStore`], and only
//! then hands an immutable event snapshot to the [`Notifier`] on a detached
//! task. Notification failures can never reach a workflow caller.

pub mod comments;
pub mod narrate;
pub mod notify;
pub mod workflow;

pub use comments::CommentDesk;
pub use notify::{Notifier, NullNotifier, Recipient, TicketDigest, TicketEvent};
pub use workflow::{CreateTicket, UpdateTicket, WorkflowEngine};
