//! Events, tags and the broadcast envelope.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Untyped structured payload carried by every event.
pub type Payload = Map<String, Value>;

/// Opaque identifier of a mount point in an embedded tree.
///
/// Tags are assigned by the embedded layer and only ever resolved by the
/// bridge, never minted by it. They are not stable across remounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tag(u64);

impl Tag {
    /// Wrap a raw tag value.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw tag value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for Tag {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Token binding one outstanding request to its reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CorrelationId(u64);

impl CorrelationId {
    /// Wrap a raw correlation value.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw correlation value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A named event routed from an embedded tree to the host.
///
/// Immutable once built; receivers only get `&Event`.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    name: String,
    payload: Payload,
    target: Tag,
    correlation: Option<CorrelationId>,
}

impl Event {
    /// Create a fire-and-forget event addressed to `target`.
    pub fn new(target: Tag, name: impl Into<String>, payload: Payload) -> Self {
        Self {
            name: name.into(),
            payload,
            target,
            correlation: None,
        }
    }

    /// Attach the correlation token of a pending reply.
    pub fn with_correlation(mut self, id: CorrelationId) -> Self {
        self.correlation = Some(id);
        self
    }

    /// Event name as chosen by the sender.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Structured payload.
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Look up a single payload field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }

    /// Tag the event was addressed to.
    pub fn target(&self) -> Tag {
        self.target
    }

    /// Correlation token, present only for callback-bearing dispatches.
    pub fn correlation(&self) -> Option<CorrelationId> {
        self.correlation
    }

    /// Whether the sender is waiting for a reply.
    pub fn expects_reply(&self) -> bool {
        self.correlation.is_some()
    }
}

/// Envelope published from the host back into embedded trees.
///
/// `tag` is advisory: the channel is multicast and each tree filters on it
/// itself. An envelope without a tag is meant for every tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BroadcastEvent {
    /// Name of the event the tree should re-emit.
    #[serde(rename = "eventName")]
    pub event_name: String,
    /// Event payload.
    #[serde(rename = "info", default)]
    pub payload: Payload,
    /// Root tag of the tree the host meant to reach, if any.
    #[serde(rename = "tag", default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<Tag>,
}

impl BroadcastEvent {
    /// Build an envelope.
    pub fn new(event_name: impl Into<String>, payload: Payload, tag: Option<Tag>) -> Self {
        Self {
            event_name: event_name.into(),
            payload,
            tag,
        }
    }

    /// Whether a tree mounted at `root` should accept this envelope.
    pub fn is_for(&self, root: Tag) -> bool {
        self.tag.is_none_or(|tag| tag == root)
    }
}
