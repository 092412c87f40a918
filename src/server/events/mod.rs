//! Deferred, ordered publication of catalog events.
//!
//! Repository mutations enqueue [`ServerEvent`] values; nothing is delivered
//! until the host calls [`EventQueue::start_publishing`].

mod event;
mod queue;

pub use event::{ServerEvent, ServerEventKind};
pub use queue::{EventHandler, EventQueue};
