//! # Receiver capability
//!
//! A Receiver is any host object that accepts routed events: a mount point
//! that wants to intercept events for its own tree, or the screen that owns
//! one or more trees. The two are unrelated types; the router picks one by
//! resolution order (mount point first, owner second), never by inheritance.
//!
//! Receivers always run on the host main context, so implementations may
//! touch host UI state directly.

use crate::{message::Event, reply::ReplySink};

/// Accepts routed events and optionally answers them.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot receive bridged events",
    label = "missing `Receiver` implementation",
    note = "Receivers must implement `handle`; implement `handle_with_callback` to answer requests."
)]
pub trait Receiver: Send + Sync + 'static {
    /// Event names this receiver advertises.
    ///
    /// Informational: the router delivers every event and lets the
    /// receiver decline by returning `false`.
    fn supported_events(&self) -> &[&str] {
        &[]
    }

    /// Whether `name` is in [`supported_events`](Self::supported_events).
    fn supports(&self, name: &str) -> bool {
        self.supported_events().contains(&name)
    }

    /// Handle a fire-and-forget event. Returns whether it was handled.
    fn handle(&self, event: &Event) -> bool;

    /// Handle an event whose sender waits for a reply.
    ///
    /// Return `false` without touching `reply` to decline; the dispatcher
    /// then answers the caller itself. Once `true` is returned the receiver
    /// owns the reply and may finish it later from any thread.
    fn handle_with_callback(&self, event: &Event, reply: ReplySink) -> bool {
        let _ = (event, reply);
        false
    }
}
