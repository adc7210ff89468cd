//! Testing utilities for Tether.
//!
//! In-memory stand-ins for the host so routing can be exercised without a
//! real UI toolkit.
//!
//! - [`MockNode`], [`MockScreen`], [`MockProvider`]: a host tree
//! - [`RecordingReceiver`]: a receiver that records events and replies as told
//! - [`RecordingSubscriber`]: a tree-side listener that records envelopes

use serde_json::Value;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};
use tether_core::{
    Event, HostNode, NodeClass, Payload, Receiver, ReplySink, RootContainerProvider, Screen, Tag,
};

// ============================================================================
// Host tree
// ============================================================================

/// A host node with a fixed class and mutable children.
pub struct MockNode {
    class: NodeClass,
    children: Mutex<Vec<Arc<dyn HostNode>>>,
    receiver: Option<Arc<dyn Receiver>>,
}

impl MockNode {
    fn build(
        class: NodeClass,
        children: Vec<Arc<dyn HostNode>>,
        receiver: Option<Arc<dyn Receiver>>,
    ) -> Arc<MockNode> {
        Arc::new(Self {
            class,
            children: Mutex::new(children),
            receiver,
        })
    }

    /// A plain leaf.
    pub fn leaf() -> Arc<dyn HostNode> {
        Self::build(NodeClass::Leaf, Vec::new(), None)
    }

    /// A container holding `children`.
    pub fn container(children: Vec<Arc<dyn HostNode>>) -> Arc<dyn HostNode> {
        Self::build(NodeClass::Container, children, None)
    }

    /// A container plus a handle for mutating it later.
    pub fn mutable_container(children: Vec<Arc<dyn HostNode>>) -> (Arc<dyn HostNode>, MockNodeHandle) {
        let node = Self::build(NodeClass::Container, children, None);
        let host: Arc<dyn HostNode> = node.clone();
        (host, MockNodeHandle(node))
    }

    /// A mount point without its own receiver.
    pub fn root(tag: u64) -> Arc<dyn HostNode> {
        Self::build(NodeClass::Root(Tag::new(tag)), Vec::new(), None)
    }

    /// A mount point that intercepts its own events.
    pub fn root_with_receiver(tag: u64, receiver: Arc<dyn Receiver>) -> Arc<dyn HostNode> {
        Self::build(NodeClass::Root(Tag::new(tag)), Vec::new(), Some(receiver))
    }

    /// A mount point whose internals hold more nodes.
    pub fn root_with_children(tag: u64, children: Vec<Arc<dyn HostNode>>) -> Arc<dyn HostNode> {
        Self::build(NodeClass::Root(Tag::new(tag)), children, None)
    }
}

impl HostNode for MockNode {
    fn classify(&self) -> NodeClass {
        self.class
    }

    fn children(&self) -> Vec<Arc<dyn HostNode>> {
        self.children.lock().unwrap().clone()
    }

    fn receiver(&self) -> Option<Arc<dyn Receiver>> {
        self.receiver.clone()
    }
}

/// Mutates a [`MockNode`] container after construction.
#[derive(Clone)]
pub struct MockNodeHandle(Arc<MockNode>);

impl MockNodeHandle {
    /// Append a child.
    pub fn push(&self, child: Arc<dyn HostNode>) {
        self.0.children.lock().unwrap().push(child);
    }

    /// Remove the child at `index`.
    pub fn remove_at(&self, index: usize) {
        self.0.children.lock().unwrap().remove(index);
    }

    /// Remove every child.
    pub fn clear(&self) {
        self.0.children.lock().unwrap().clear();
    }
}

/// A screen with optional content and an optional owner receiver.
pub struct MockScreen {
    content: Mutex<Option<Arc<dyn HostNode>>>,
    receiver: Option<Arc<dyn Receiver>>,
}

impl MockScreen {
    /// A screen that does not receive events itself.
    pub fn new(content: Arc<dyn HostNode>) -> Arc<dyn Screen> {
        Arc::new(Self {
            content: Mutex::new(Some(content)),
            receiver: None,
        })
    }

    /// A screen that handles events for its trees.
    pub fn with_receiver(content: Arc<dyn HostNode>, receiver: Arc<dyn Receiver>) -> Arc<dyn Screen> {
        Arc::new(Self {
            content: Mutex::new(Some(content)),
            receiver: Some(receiver),
        })
    }

    /// A screen whose content has not been loaded.
    pub fn unloaded() -> Arc<dyn Screen> {
        Arc::new(Self {
            content: Mutex::new(None),
            receiver: None,
        })
    }
}

impl Screen for MockScreen {
    fn content(&self) -> Option<Arc<dyn HostNode>> {
        self.content.lock().unwrap().clone()
    }

    fn receiver(&self) -> Option<Arc<dyn Receiver>> {
        self.receiver.clone()
    }
}

/// A provider over a shared, mutable list of screens.
///
/// Clones share state, so a test can keep one clone after moving another
/// into a main loop.
#[derive(Clone, Default)]
pub struct MockProvider {
    screens: Arc<Mutex<Vec<Arc<dyn Screen>>>>,
    root_tags: Arc<Mutex<HashMap<Tag, Tag>>>,
}

impl MockProvider {
    /// Provider over `screens`; the last one is the active screen.
    pub fn new(screens: Vec<Arc<dyn Screen>>) -> Self {
        Self {
            screens: Arc::new(Mutex::new(screens)),
            root_tags: Arc::default(),
        }
    }

    /// Map a descendant tag to its root tag.
    pub fn with_root_tag(self, descendant: Tag, root: Tag) -> Self {
        self.root_tags.lock().unwrap().insert(descendant, root);
        self
    }

    /// Open another screen.
    pub fn push_screen(&self, screen: Arc<dyn Screen>) {
        self.screens.lock().unwrap().push(screen);
    }

    /// Close every screen.
    pub fn close_all(&self) {
        self.screens.lock().unwrap().clear();
    }
}

impl RootContainerProvider for MockProvider {
    fn screens(&self) -> Vec<Arc<dyn Screen>> {
        self.screens.lock().unwrap().clone()
    }

    fn root_tag_for(&self, tag: Tag) -> Tag {
        self.root_tags.lock().unwrap().get(&tag).copied().unwrap_or(tag)
    }
}

// ============================================================================
// Recording Receiver
// ============================================================================

/// How a [`RecordingReceiver`] answers callback-bearing events.
#[derive(Debug, Clone)]
pub enum ReplyMode {
    /// Reply `on_success` with the value.
    Succeed(Value),
    /// Reply `on_failure` with the value.
    Fail(Value),
    /// Reply `on_success` twice with the value.
    Twice(Value),
    /// Return `false` without replying.
    Decline,
    /// Return `true` and drop the sink.
    Drop,
    /// Return `true` and keep the sink until [`RecordingReceiver::release_held`].
    Hold,
    /// Panic after recording the event.
    Panic,
}

struct Recorder {
    supported: Vec<&'static str>,
    handled: Mutex<bool>,
    reply: Mutex<ReplyMode>,
    events: Mutex<Vec<Event>>,
    held: Mutex<Vec<ReplySink>>,
}

/// A receiver that records every event it gets.
#[derive(Clone)]
pub struct RecordingReceiver {
    inner: Arc<Recorder>,
}

impl RecordingReceiver {
    /// Advertise `supported`, handle everything, reply with `null`.
    pub fn new(supported: &[&'static str]) -> Self {
        Self {
            inner: Arc::new(Recorder {
                supported: supported.to_vec(),
                handled: Mutex::new(true),
                reply: Mutex::new(ReplyMode::Succeed(Value::Null)),
                events: Mutex::new(Vec::new()),
                held: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Set what `handle` returns.
    pub fn with_handled(self, handled: bool) -> Self {
        *self.inner.handled.lock().unwrap() = handled;
        self
    }

    /// Set how callback-bearing events are answered.
    pub fn with_reply(self, mode: ReplyMode) -> Self {
        *self.inner.reply.lock().unwrap() = mode;
        self
    }

    /// This receiver as a trait object.
    pub fn arc(&self) -> Arc<dyn Receiver> {
        Arc::new(self.clone())
    }

    /// Recorded events, oldest first.
    pub fn events(&self) -> Vec<Event> {
        self.inner.events.lock().unwrap().clone()
    }

    /// Names of recorded events.
    pub fn names(&self) -> Vec<String> {
        self.events().iter().map(|e| e.name().to_string()).collect()
    }

    /// Number of recorded events.
    pub fn count(&self) -> usize {
        self.inner.events.lock().unwrap().len()
    }

    /// Answer the oldest held sink with `null`. Returns whether it delivered.
    pub fn release_held(&self) -> Option<bool> {
        let mut held = self.inner.held.lock().unwrap();
        if held.is_empty() {
            return None;
        }
        let sink = held.remove(0);
        drop(held);
        Some(sink.on_success(Value::Null))
    }

    fn record(&self, event: &Event) {
        self.inner.events.lock().unwrap().push(event.clone());
    }
}

impl Receiver for RecordingReceiver {
    fn supported_events(&self) -> &[&str] {
        &self.inner.supported
    }

    fn handle(&self, event: &Event) -> bool {
        self.record(event);
        *self.inner.handled.lock().unwrap()
    }

    fn handle_with_callback(&self, event: &Event, reply: ReplySink) -> bool {
        self.record(event);
        let mode = self.inner.reply.lock().unwrap().clone();
        match mode {
            ReplyMode::Succeed(value) => {
                reply.on_success(value);
                true
            }
            ReplyMode::Fail(value) => {
                reply.on_failure(value);
                true
            }
            ReplyMode::Twice(value) => {
                reply.on_success(value.clone());
                reply.on_success(value);
                true
            }
            ReplyMode::Decline => false,
            ReplyMode::Drop => true,
            ReplyMode::Hold => {
                self.inner.held.lock().unwrap().push(reply);
                true
            }
            ReplyMode::Panic => panic!("receiver failed on `{}`", event.name()),
        }
    }
}

// ============================================================================
// Recording Subscriber
// ============================================================================

/// Tree-side listener that records `(name, payload)` pairs.
#[derive(Clone, Default)]
pub struct RecordingSubscriber {
    received: Arc<Mutex<Vec<(String, Payload)>>>,
}

impl RecordingSubscriber {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Callback suitable for `add_event_listener`.
    pub fn callback(&self) -> impl Fn(&str, &Payload) + Send + Sync + 'static {
        let received = self.received.clone();
        move |name, payload| {
            received
                .lock()
                .unwrap()
                .push((name.to_string(), payload.clone()))
        }
    }

    /// Names received, oldest first.
    pub fn names(&self) -> Vec<String> {
        self.received
            .lock()
            .unwrap()
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Everything received.
    pub fn received(&self) -> Vec<(String, Payload)> {
        self.received.lock().unwrap().clone()
    }
}
