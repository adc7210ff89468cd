//! Mount-scoped subscription ownership.

use super::{channel::BroadcastChannel, context::TreeContext, table::Subscription};
use tether_core::{Payload, Tag};

/// Owns every subscription a mounted tree installed and removes them all
/// when the tree unmounts (explicitly or on drop).
///
/// Every listener runs on the tree's [`TreeContext`].
///
/// After unmount, new listeners are ignored and adopted subscriptions are
/// removed right away.
#[derive(Debug)]
pub struct ListenerGroup {
    channel: BroadcastChannel,
    context: TreeContext,
    root: Tag,
    subscriptions: Vec<Subscription>,
    mounted: bool,
}

impl ListenerGroup {
    /// Group for the tree mounted at `root`, delivering on `context`.
    pub fn new(channel: BroadcastChannel, context: TreeContext, root: Tag) -> Self {
        Self {
            channel,
            context,
            root,
            subscriptions: Vec::new(),
            mounted: true,
        }
    }

    /// Root tag of the owning tree.
    pub fn root(&self) -> Tag {
        self.root
    }

    /// Listen for envelopes meant for this tree.
    pub fn register_event_listener<F>(&mut self, callback: F) -> &mut Self
    where
        F: Fn(&str, &Payload) + Send + Sync + 'static,
    {
        if !self.mounted {
            tracing::debug!(root = %self.root, "tree unmounted; listener ignored");
            return self;
        }
        let subscription = self
            .channel
            .add_event_listener(self.root, &self.context, callback);
        self.subscriptions.push(subscription);
        self
    }

    /// Take ownership of subscriptions created elsewhere.
    pub fn adopt(&mut self, subscriptions: impl IntoIterator<Item = Subscription>) -> &mut Self {
        for subscription in subscriptions {
            if self.mounted {
                self.subscriptions.push(subscription);
            } else {
                self.channel.unsubscribe(subscription);
            }
        }
        self
    }

    /// Number of live subscriptions.
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    /// Whether the group holds no subscriptions.
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Whether the tree is still mounted.
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Remove every subscription. Returns how many were removed.
    pub fn unmount(&mut self) -> usize {
        self.mounted = false;
        let subscriptions = std::mem::take(&mut self.subscriptions);
        let removed = subscriptions
            .into_iter()
            .map(|subscription| self.channel.unsubscribe(subscription))
            .filter(|removed| *removed)
            .count();
        tracing::debug!(root = %self.root, removed, "tree listeners removed");
        removed
    }
}

impl Drop for ListenerGroup {
    fn drop(&mut self) {
        if self.mounted {
            self.unmount();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        broadcast::{SubscriptionTable, TreeLoop, tree_context},
        testing::RecordingSubscriber,
    };
    use std::sync::Arc;

    fn setup() -> (BroadcastChannel, TreeContext, TreeLoop) {
        let channel = BroadcastChannel::new(Arc::new(SubscriptionTable::new()), "topic");
        let (context, tree_loop) = tree_context();
        (channel, context, tree_loop)
    }

    #[test]
    fn test_unmount_removes_all() {
        let (channel, context, mut tree_loop) = setup();
        let seen = RecordingSubscriber::new();
        let mut group = ListenerGroup::new(channel.clone(), context, Tag::new(3));
        group
            .register_event_listener(seen.callback())
            .register_event_listener(seen.callback());
        assert_eq!(group.len(), 2);

        channel.emit_event("One", Payload::new());
        tree_loop.run_pending();
        assert_eq!(group.unmount(), 2);
        channel.emit_event("Two", Payload::new());
        tree_loop.run_pending();

        assert_eq!(seen.names(), vec!["One", "One"]);
        assert!(!channel.table().is_initialized());
    }

    #[test]
    fn test_unmount_discards_queued_envelopes() {
        let (channel, context, mut tree_loop) = setup();
        let seen = RecordingSubscriber::new();
        let mut group = ListenerGroup::new(channel.clone(), context, Tag::new(3));
        group.register_event_listener(seen.callback());

        channel.emit_event("Queued", Payload::new());
        group.unmount();

        assert_eq!(tree_loop.run_pending(), 0);
        assert!(seen.names().is_empty());
    }

    #[test]
    fn test_drop_unmounts() {
        let (channel, context, _tree_loop) = setup();
        {
            let mut group = ListenerGroup::new(channel.clone(), context, Tag::new(3));
            group.register_event_listener(|_, _| {});
            assert_eq!(channel.table().subscriber_count("topic"), 1);
        }
        assert_eq!(channel.table().subscriber_count("topic"), 0);
    }

    #[test]
    fn test_after_unmount_registrations_are_ignored() {
        let (channel, context, _tree_loop) = setup();
        let mut group = ListenerGroup::new(channel.clone(), context.clone(), Tag::new(3));
        group.unmount();

        group.register_event_listener(|_, _| {});
        group.adopt([channel.subscribe(&context, |_| {})]);
        assert!(group.is_empty());
        assert_eq!(channel.table().subscriber_count("topic"), 0);
    }

    #[test]
    fn test_filters_other_roots() {
        let (channel, context, mut tree_loop) = setup();
        let seen = RecordingSubscriber::new();
        let mut group = ListenerGroup::new(channel.clone(), context, Tag::new(3));
        group.register_event_listener(seen.callback());

        channel.publish("Mine", Payload::new(), Some(Tag::new(3)));
        channel.publish("Theirs", Payload::new(), Some(Tag::new(4)));
        tree_loop.run_pending();
        assert_eq!(seen.names(), vec!["Mine"]);
    }
}
