//! # EventBridge
//!
//! Wires a [`Dispatcher`], its [`MainLoop`], a [`SubscriptionTable`] and a
//! [`BroadcastChannel`] from one [`BridgeConfig`]. The returned bridge is a
//! cheap, cloneable handle for both directions; the main loop goes to the
//! host main context.
//!
//! ```rust,ignore
//! let (bridge, main_loop) = EventBridge::new(provider, BridgeConfig::default());
//! host_runtime.spawn_local(main_loop.run());
//!
//! // Embedded tree -> host
//! bridge.dispatch(tag, "DidSelectRow", payload);
//!
//! // Embedded tree subscribes on its own context
//! let (context, tree_loop) = bridge.tree_context();
//! tree_runtime.spawn_local(tree_loop.run());
//! let mut listeners = bridge.listener_group(&context, root_tag);
//! listeners.register_event_listener(|name, payload| { /* re-emit */ });
//!
//! // Host -> embedded trees
//! bridge.emit_event("Refresh", Payload::new());
//! ```

use crate::{
    broadcast::{
        BroadcastChannel, ListenerGroup, Subscription, SubscriptionTable, TreeContext, TreeLoop,
        tree_context,
    },
    config::{BridgeConfig, BridgeConstants},
    dispatch::{self, Dispatcher, MainLoop, ReplyFuture},
};
use std::sync::Arc;
use tether_core::{CorrelationId, Payload, Reply, RootContainerProvider, Screen, Tag};

/// Both directions of the bridge behind one handle.
#[derive(Clone, Debug)]
pub struct EventBridge {
    config: Arc<BridgeConfig>,
    dispatcher: Dispatcher,
    broadcast: BroadcastChannel,
}

impl EventBridge {
    /// Build a bridge with its own subscription table.
    pub fn new<P: RootContainerProvider>(provider: P, config: BridgeConfig) -> (Self, MainLoop<P>) {
        let table = Arc::new(SubscriptionTable::new());
        Self::with_table(provider, config, table)
    }

    /// Build a bridge that publishes through an existing table.
    pub fn with_table<P: RootContainerProvider>(
        provider: P,
        config: BridgeConfig,
        table: Arc<SubscriptionTable>,
    ) -> (Self, MainLoop<P>) {
        let (dispatcher, main_loop) = dispatch::channel(provider, config.catch_panics);
        let broadcast = BroadcastChannel::new(table, config.topic.clone());
        tracing::info!(module = %config.module_name, topic = %config.topic, "event bridge created");
        let bridge = Self {
            config: Arc::new(config),
            dispatcher,
            broadcast,
        };
        (bridge, main_loop)
    }

    /// Active configuration.
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Constants the embedded layer needs.
    pub fn constants(&self) -> BridgeConstants {
        self.config.constants()
    }

    /// Inbound handle.
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Outbound handle.
    pub fn broadcast(&self) -> &BroadcastChannel {
        &self.broadcast
    }

    /// See [`Dispatcher::dispatch`].
    pub fn dispatch(&self, tag: Tag, name: impl Into<String>, payload: Payload) {
        self.dispatcher.dispatch(tag, name, payload);
    }

    /// See [`Dispatcher::dispatch_with_callback`].
    pub fn dispatch_with_callback<F>(
        &self,
        tag: Tag,
        name: impl Into<String>,
        payload: Payload,
        on_result: F,
    ) -> CorrelationId
    where
        F: FnOnce(Reply) + Send + 'static,
    {
        self.dispatcher
            .dispatch_with_callback(tag, name, payload, on_result)
    }

    /// See [`Dispatcher::request`].
    pub fn request(&self, tag: Tag, name: impl Into<String>, payload: Payload) -> ReplyFuture {
        self.dispatcher.request(tag, name, payload)
    }

    /// See [`BroadcastChannel::publish`].
    pub fn publish(&self, name: impl Into<String>, payload: Payload, tag: Option<Tag>) -> usize {
        self.broadcast.publish(name, payload, tag)
    }

    /// See [`BroadcastChannel::emit_event`].
    pub fn emit_event(&self, name: impl Into<String>, payload: Payload) -> usize {
        self.broadcast.emit_event(name, payload)
    }

    /// See [`BroadcastChannel::emit_event_for_screen`].
    pub fn emit_event_for_screen(&self, screen: &dyn Screen, name: &str, payload: Payload) -> usize {
        self.broadcast.emit_event_for_screen(screen, name, payload)
    }

    /// See [`BroadcastChannel::emit_event_for_active_screen`].
    pub fn emit_event_for_active_screen<P>(&self, provider: &P, name: &str, payload: Payload) -> usize
    where
        P: RootContainerProvider + ?Sized,
    {
        self.broadcast
            .emit_event_for_active_screen(provider, name, payload)
    }

    /// Delivery context for one tree, honoring `catch_panics`.
    pub fn tree_context(&self) -> (TreeContext, TreeLoop) {
        let (context, tree_loop) = tree_context();
        (context, tree_loop.with_catch_panics(self.config.catch_panics))
    }

    /// See [`BroadcastChannel::add_event_listener`].
    pub fn add_event_listener<F>(&self, root: Tag, context: &TreeContext, callback: F) -> Subscription
    where
        F: Fn(&str, &Payload) + Send + Sync + 'static,
    {
        self.broadcast.add_event_listener(root, context, callback)
    }

    /// Listener group for a tree mounting at `root`, delivering on `context`.
    pub fn listener_group(&self, context: &TreeContext, root: Tag) -> ListenerGroup {
        ListenerGroup::new(self.broadcast.clone(), context.clone(), root)
    }
}
