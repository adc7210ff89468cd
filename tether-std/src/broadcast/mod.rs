//! # Broadcast Channel
//!
//! Outbound path from the host back into embedded trees. Host code never
//! calls into a tree directly; it publishes a [`BroadcastEvent`] on a named
//! topic and every mounted tree that subscribed gets a copy.
//!
//! ```text
//!  host code (any thread)        SubscriptionTable          tree contexts
//!  BroadcastChannel::publish ──► snapshot(topic) ──► [queue A] ──► TreeLoop A ──► handlers
//!                                                ├─► [queue B] ──► TreeLoop B ──► handlers
//!                                                └─► [stream]  ──► drained by the tree
//! ```
//!
//! Publishing only enqueues and returns; it never waits for a handler. Each
//! subscription is bound to a [`TreeContext`] chosen when subscribing, and
//! its handler runs wherever the matching [`TreeLoop`] is driven. Per
//! context, envelopes arrive in publish order and, within one publish, in
//! subscription order.
//!
//! The channel is multicast. The optional tag hint rides in the envelope
//! and each tree filters on it itself (see [`ListenerGroup`]).
//!
//! A subscriber added while a publish is in progress does not receive that
//! publish: delivery works on the snapshot taken when the publish started.
//! A subscription removed before its tree loop gets to a queued envelope
//! never sees it.
//!
//! [`BroadcastEvent`]: tether_core::BroadcastEvent

mod channel;
mod context;
mod listener;
mod table;

pub use channel::BroadcastChannel;
pub use context::{TreeContext, TreeLoop, tree_context};
pub use listener::ListenerGroup;
pub use table::{Subscription, SubscriptionTable};
