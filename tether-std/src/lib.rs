//! # tether-std
//!
//! Standard routing machinery for the Tether event bridge.
//!
//! This crate provides:
//! - **Root Registry**: [`registry::find_all_roots`] walks a host container for mount points
//! - **Address Resolver**: [`AddressResolver`] picks the receiver for a tag
//! - **Dispatcher**: [`Dispatcher`] + [`MainLoop`] move events onto the host main context
//! - **Broadcast**: [`BroadcastChannel`] + [`SubscriptionTable`] queue host events for each
//!   tree's [`TreeLoop`]
//! - **Facade**: [`EventBridge`] assembles everything from a [`BridgeConfig`]
//! - **Testing**: in-memory host doubles in [`testing`]

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core traits
pub use tether_core;

// Modules
pub mod bridge;
pub mod broadcast;
pub mod config;
pub mod dispatch;
mod isolate;
pub mod registry;
pub mod resolver;
pub mod testing;
#[cfg(feature = "timeout")]
mod timeout;

pub use bridge::EventBridge;
pub use broadcast::{
    BroadcastChannel, ListenerGroup, Subscription, SubscriptionTable, TreeContext, TreeLoop,
};
pub use config::{BridgeConfig, BridgeConstants};
pub use dispatch::{Dispatcher, MainLoop, ReplyFuture};
pub use registry::RootHandle;
pub use resolver::{AddressResolver, Resolved, ResolvedVia};
