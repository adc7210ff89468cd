//! # tether-core
//!
//! Core types and capability traits for the Tether event bridge.
//!
//! Tether lets a *host* layer (windows, screens, activities) and one or more
//! *embedded component trees* exchange named events without holding
//! references to each other's objects. This crate only defines the shared
//! vocabulary; the routing machinery lives in `tether-std`.
//!
//! # Pieces
//!
//! - [`Event`], [`Tag`], [`Payload`] - what travels across the bridge
//! - [`Receiver`] - the host-implemented capability that accepts routed events
//! - [`ReplySink`] - one-shot reply handle for request/response events
//! - [`HostNode`], [`Screen`], [`RootContainerProvider`] - the view of the
//!   host tree the router walks to find mount points
//!
//! # Error Types
//!
//! - [`ReplyError`] - why a callback-bearing dispatch resolved with a failure
//! - [`BridgeError`] - setup errors (configuration)

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod error;
mod host;
mod message;
mod receiver;
mod reply;

// Re-exports
pub use error::{BridgeError, ReplyError};
pub use host::{HostNode, NodeClass, RootContainerProvider, Screen};
pub use message::{BroadcastEvent, CorrelationId, Event, Payload, Tag};
pub use receiver::Receiver;
pub use reply::{Reply, ReplySink};

/// Re-exported so hosts can build payloads without a direct dependency.
pub use serde_json::{Map, Value, json};
