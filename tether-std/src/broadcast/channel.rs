//! Host-side publisher bound to one topic.

use super::{
    context::TreeContext,
    table::{Subscription, SubscriptionTable},
};
use crate::registry;
use futures::channel::mpsc;
use std::sync::Arc;
use tether_core::{BroadcastEvent, HostNode, Payload, RootContainerProvider, Screen, Tag};

/// Publishes host events onto the bridge topic.
///
/// Cheap to clone; clones share the same table and topic. Safe to use from
/// any thread: publishing only enqueues.
#[derive(Clone, Debug)]
pub struct BroadcastChannel {
    table: Arc<SubscriptionTable>,
    topic: String,
}

impl BroadcastChannel {
    /// Bind `topic` on `table`.
    pub fn new(table: Arc<SubscriptionTable>, topic: impl Into<String>) -> Self {
        Self {
            table,
            topic: topic.into(),
        }
    }

    /// Topic name.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Underlying subscription table.
    pub fn table(&self) -> &Arc<SubscriptionTable> {
        &self.table
    }

    /// Publish one envelope. Returns how many subscriber queues took it.
    ///
    /// Tree-side tag filtering happens later, on each tree's context.
    pub fn publish(&self, name: impl Into<String>, payload: Payload, tag: Option<Tag>) -> usize {
        self.table
            .publish(&self.topic, BroadcastEvent::new(name, payload, tag))
    }

    /// Publish to every mounted tree.
    pub fn emit_event(&self, name: impl Into<String>, payload: Payload) -> usize {
        self.publish(name, payload, None)
    }

    /// Publish one tagged envelope per tree mounted on `screen`.
    ///
    /// Walks the screen's content, so call it from the host main context.
    /// Returns how many tagged envelopes reached at least one subscriber.
    pub fn emit_event_for_screen(&self, screen: &dyn Screen, name: &str, payload: Payload) -> usize {
        self.emit_to_roots(registry::roots_on_screen(screen), name, payload)
    }

    /// Like [`emit_event_for_screen`](Self::emit_event_for_screen) for the
    /// provider's active screen. Returns 0 when no screen is open.
    pub fn emit_event_for_active_screen<P>(&self, provider: &P, name: &str, payload: Payload) -> usize
    where
        P: RootContainerProvider + ?Sized,
    {
        match provider.active_screen() {
            Some(screen) => self.emit_event_for_screen(screen.as_ref(), name, payload),
            None => {
                tracing::debug!(event = name, "no active screen; nothing emitted");
                0
            }
        }
    }

    /// Publish one tagged envelope per tree mounted under `container`.
    pub fn emit_event_for_container(
        &self,
        container: &Arc<dyn HostNode>,
        name: &str,
        payload: Payload,
    ) -> usize {
        self.emit_to_roots(registry::find_all_roots(container), name, payload)
    }

    fn emit_to_roots(&self, roots: Vec<registry::RootHandle>, name: &str, payload: Payload) -> usize {
        if roots.is_empty() {
            tracing::debug!(event = name, "no mounted trees; nothing emitted");
            return 0;
        }
        roots
            .iter()
            .filter(|root| self.publish(name, payload.clone(), Some(root.tag())) > 0)
            .count()
    }

    /// Subscribe a raw handler that runs on `context`.
    pub fn subscribe<F>(&self, context: &TreeContext, handler: F) -> Subscription
    where
        F: Fn(&BroadcastEvent) + Send + Sync + 'static,
    {
        self.table.subscribe(&self.topic, context, handler)
    }

    /// Subscribe and receive envelopes on a queue the tree drains itself.
    pub fn subscribe_stream(&self) -> (Subscription, mpsc::UnboundedReceiver<BroadcastEvent>) {
        self.table.subscribe_stream(&self.topic)
    }

    /// Listen on behalf of the tree mounted at `root`, running `callback`
    /// on `context`.
    ///
    /// The callback sees envelopes tagged for `root` and untagged ones.
    pub fn add_event_listener<F>(&self, root: Tag, context: &TreeContext, callback: F) -> Subscription
    where
        F: Fn(&str, &Payload) + Send + Sync + 'static,
    {
        self.subscribe(context, move |event| {
            if event.is_for(root) {
                callback(&event.event_name, &event.payload);
            }
        })
    }

    /// Remove a subscription from the table.
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        self.table.unsubscribe(subscription)
    }
}
