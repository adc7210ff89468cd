//! Bridge configuration.
//!
//! Every field has a default, so an empty JSON object is a valid config.

use serde::{Deserialize, Serialize};
use tether_core::{BridgeError, BroadcastEvent, Map, Value};

/// Settings shared by the dispatcher and the broadcast channel.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Name the embedded layer uses to look the bridge up.
    pub module_name: String,
    /// Topic every mounted tree subscribes to for host-to-tree events.
    pub topic: String,
    /// Envelope key holding the target tag hint.
    pub tag_key: String,
    /// Envelope key holding the event name.
    pub name_key: String,
    /// Envelope key holding the payload.
    pub info_key: String,
    /// Catch panics raised by receivers and subscribers.
    pub catch_panics: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            module_name: "EventBridge".to_string(),
            topic: "EventBridgeEvent".to_string(),
            tag_key: "tag".to_string(),
            name_key: "eventName".to_string(),
            info_key: "info".to_string(),
            catch_panics: true,
        }
    }
}

impl BridgeConfig {
    /// Default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON document; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, BridgeError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set the module name.
    pub fn with_module_name(mut self, name: impl Into<String>) -> Self {
        self.module_name = name.into();
        self
    }

    /// Set the broadcast topic.
    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = topic.into();
        self
    }

    /// Enable or disable panic isolation.
    pub fn with_catch_panics(mut self, catch: bool) -> Self {
        self.catch_panics = catch;
        self
    }

    /// Constants the embedded layer needs to decode envelopes.
    pub fn constants(&self) -> BridgeConstants {
        BridgeConstants {
            event_name: self.topic.clone(),
            event_tag_key: self.tag_key.clone(),
            event_name_key: self.name_key.clone(),
            event_info_key: self.info_key.clone(),
        }
    }

    /// Encode `event` as the wire envelope using the configured key names.
    pub fn envelope(&self, event: &BroadcastEvent) -> Value {
        let mut envelope = Map::new();
        envelope.insert(self.name_key.clone(), Value::String(event.event_name.clone()));
        envelope.insert(self.info_key.clone(), Value::Object(event.payload.clone()));
        if let Some(tag) = event.tag {
            envelope.insert(self.tag_key.clone(), Value::from(tag.get()));
        }
        Value::Object(envelope)
    }
}

/// Constants exported to the embedded layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct BridgeConstants {
    /// Topic name.
    pub event_name: String,
    /// Key of the tag hint.
    pub event_tag_key: String,
    /// Key of the event name.
    pub event_name_key: String,
    /// Key of the payload.
    pub event_info_key: String,
}
