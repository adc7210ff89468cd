//! Process-wide subscription table.

use super::context::{Delivery, TreeContext};
use futures::channel::mpsc;
use std::{
    collections::HashMap,
    fmt,
    sync::{
        Arc, PoisonError, RwLock,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
};
use tether_core::BroadcastEvent;

type Handler = Arc<dyn Fn(&BroadcastEvent) + Send + Sync>;

enum Target {
    Context {
        tx: mpsc::UnboundedSender<Delivery>,
        handler: Handler,
    },
    Stream(mpsc::UnboundedSender<BroadcastEvent>),
}

pub(crate) struct Entry {
    id: u64,
    active: AtomicBool,
    target: Target,
}

impl Entry {
    pub(crate) fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    pub(crate) fn handler(&self) -> Option<&Handler> {
        match &self.target {
            Target::Context { handler, .. } => Some(handler),
            Target::Stream(_) => None,
        }
    }

    // Hands the envelope to the subscriber's queue; never runs the handler.
    fn enqueue(self: &Arc<Self>, event: &Arc<BroadcastEvent>) -> bool {
        match &self.target {
            Target::Context { tx, .. } => tx
                .unbounded_send(Delivery {
                    event: Arc::clone(event),
                    entry: Arc::clone(self),
                })
                .is_ok(),
            Target::Stream(tx) => tx.unbounded_send(BroadcastEvent::clone(event)).is_ok(),
        }
    }
}

/// Binding a tree installs on mount and removes on unmount.
///
/// Unsubscribe exactly once through [`SubscriptionTable::unsubscribe`]
/// (or hand it to a [`ListenerGroup`](super::ListenerGroup)).
#[must_use = "a subscription stays installed until it is unsubscribed"]
pub struct Subscription {
    channel: String,
    entry: Arc<Entry>,
}

impl Subscription {
    /// Channel this subscription listens on.
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Whether the subscription still receives events.
    pub fn is_active(&self) -> bool {
        self.entry.is_active()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("channel", &self.channel)
            .field("id", &self.entry.id)
            .field("active", &self.is_active())
            .finish()
    }
}

/// Subscriber lists per channel name.
///
/// Constructed explicitly and shared through `Arc` by whoever publishes and
/// whoever subscribes. A channel's list is created by its first subscriber
/// and removed with its last one; the whole table is torn down when no
/// channel is left.
pub struct SubscriptionTable {
    channels: RwLock<Option<HashMap<String, Vec<Arc<Entry>>>>>,
    next_id: AtomicU64,
}

impl Default for SubscriptionTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SubscriptionTable {
    /// An empty, uninitialized table.
    pub fn new() -> Self {
        Self {
            channels: RwLock::new(None),
            next_id: AtomicU64::new(1),
        }
    }

    /// Append `handler` to `channel`'s subscriber list. It runs on
    /// `context`'s [`TreeLoop`](super::TreeLoop).
    ///
    /// Registering the same handler twice yields two deliveries per publish.
    pub fn subscribe<F>(&self, channel: &str, context: &TreeContext, handler: F) -> Subscription
    where
        F: Fn(&BroadcastEvent) + Send + Sync + 'static,
    {
        self.install(
            channel,
            Target::Context {
                tx: context.sender(),
                handler: Arc::new(handler),
            },
        )
    }

    /// Append a queue to `channel`'s subscriber list; the caller drains the
    /// returned receiver wherever it likes.
    pub fn subscribe_stream(&self, channel: &str) -> (Subscription, mpsc::UnboundedReceiver<BroadcastEvent>) {
        let (tx, rx) = mpsc::unbounded();
        (self.install(channel, Target::Stream(tx)), rx)
    }

    fn install(&self, channel: &str, target: Target) -> Subscription {
        let entry = Arc::new(Entry {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            active: AtomicBool::new(true),
            target,
        });

        let mut guard = self.channels.write().unwrap_or_else(PoisonError::into_inner);
        let channels = guard.get_or_insert_with(|| {
            tracing::info!("subscription table initialized");
            HashMap::new()
        });
        channels
            .entry(channel.to_string())
            .or_default()
            .push(Arc::clone(&entry));
        tracing::debug!(channel, id = entry.id, "subscribed");

        Subscription {
            channel: channel.to_string(),
            entry,
        }
    }

    /// Remove a subscription. Returns whether it was still installed.
    ///
    /// Envelopes already queued for it are dropped by its tree loop.
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        subscription.entry.active.store(false, Ordering::Release);
        let id = subscription.entry.id;

        let mut guard = self.channels.write().unwrap_or_else(PoisonError::into_inner);
        let Some(channels) = guard.as_mut() else {
            return false;
        };
        let Some(entries) = channels.get_mut(&subscription.channel) else {
            return false;
        };

        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        let removed = entries.len() != before;

        if entries.is_empty() {
            channels.remove(&subscription.channel);
            tracing::debug!(channel = %subscription.channel, "last subscriber left channel");
        }
        if channels.is_empty() {
            *guard = None;
            tracing::info!("subscription table torn down");
        }
        removed
    }

    /// Queue `event` for every active subscriber of `channel`, in
    /// subscription order, and return without running any handler.
    ///
    /// Returns how many subscriber queues accepted the envelope.
    pub fn publish(&self, channel: &str, event: BroadcastEvent) -> usize {
        let snapshot: Vec<Arc<Entry>> = {
            let guard = self.channels.read().unwrap_or_else(PoisonError::into_inner);
            guard
                .as_ref()
                .and_then(|channels| channels.get(channel))
                .cloned()
                .unwrap_or_default()
        };

        let event = Arc::new(event);
        let mut queued = 0;
        for entry in snapshot {
            if !entry.is_active() {
                continue;
            }
            if entry.enqueue(&event) {
                queued += 1;
            } else {
                tracing::debug!(channel, id = entry.id, "subscriber context closed; envelope dropped");
            }
        }
        tracing::debug!(channel, event = %event.event_name, tag = ?event.tag, queued, "published");
        queued
    }

    /// Number of subscribers on `channel`.
    pub fn subscriber_count(&self, channel: &str) -> usize {
        let guard = self.channels.read().unwrap_or_else(PoisonError::into_inner);
        guard
            .as_ref()
            .and_then(|channels| channels.get(channel))
            .map_or(0, Vec::len)
    }

    /// Whether any channel currently has subscribers.
    pub fn is_initialized(&self) -> bool {
        self.channels
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl fmt::Debug for SubscriptionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionTable")
            .field("initialized", &self.is_initialized())
            .finish_non_exhaustive()
    }
}
