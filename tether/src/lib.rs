//! # tether - Event bridge between a host and embedded component trees
//!
//! A host layer (screens, windows, activities) and embedded component trees
//! exchange named events without holding references to each other's
//! objects. Trees address the host with an opaque [`Tag`]; the host answers
//! through a multicast [`BroadcastChannel`].
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tether::prelude::*;
//!
//! struct Checkout;
//!
//! impl Receiver for Checkout {
//!     fn supported_events(&self) -> &[&str] {
//!         &["DidSelectRow"]
//!     }
//!
//!     fn handle(&self, event: &Event) -> bool {
//!         event.name() == "DidSelectRow"
//!     }
//! }
//!
//! let (bridge, main_loop) = EventBridge::new(my_provider, BridgeConfig::default());
//! // run `main_loop` on the host main context, hand `bridge` to the tree layer
//! bridge.dispatch(Tag::new(42), "DidSelectRow", Payload::new());
//! ```

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub use tether_core::{
    // Errors
    BridgeError,
    // Messages
    BroadcastEvent,
    CorrelationId,
    Event,
    // Host capabilities
    HostNode,
    Map,
    NodeClass,
    Payload,
    // Receiver / reply
    Receiver,
    Reply,
    ReplyError,
    ReplySink,
    RootContainerProvider,
    Screen,
    Tag,
    Value,
    json,
};

pub use tether_std::{
    AddressResolver, BridgeConfig, BridgeConstants, BroadcastChannel, Dispatcher, EventBridge,
    ListenerGroup, MainLoop, ReplyFuture, Resolved, ResolvedVia, RootHandle, Subscription,
    SubscriptionTable, TreeContext, TreeLoop,
};

/// Host-to-tree broadcast.
pub mod broadcast {
    pub use tether_std::broadcast::{
        BroadcastChannel, ListenerGroup, Subscription, SubscriptionTable, TreeContext, TreeLoop,
        tree_context,
    };
}

/// Root Registry traversal.
pub mod registry {
    pub use tether_std::registry::{RootHandle, find_all_roots, find_root, roots_on_screen};
}

/// Testing utilities.
pub mod testing {
    #![allow(clippy::wildcard_imports)]
    pub use tether_std::testing::*;
}

/// Prelude module - common imports for Tether.
///
/// # Usage
///
/// ```rust,ignore
/// use tether::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        BridgeConfig, BroadcastEvent, Event, EventBridge, HostNode, ListenerGroup, NodeClass,
        Payload, Receiver, Reply, ReplyError, ReplySink, RootContainerProvider, Screen, Tag,
        TreeContext, TreeLoop,
    };
}
