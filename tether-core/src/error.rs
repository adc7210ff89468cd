//! Error types for Tether.
//!
//! - [`ReplyError`] - delivered to the caller of a callback-bearing dispatch
//! - [`BridgeError`] - setup failures
//!
//! Routing failures never cross the dispatch boundary as an `Err`; they
//! reach the caller only through a reply, or end up in the log.

use crate::message::Tag;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Why a request did not produce a success payload.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReplyError {
    /// The tag resolved to neither a root receiver nor an owner receiver.
    #[error("no receiver for tag {tag}")]
    NoReceiver {
        /// Tag that missed.
        tag: Tag,
    },

    /// The receiver returned `false` for the event.
    #[error("receiver did not handle event `{name}`")]
    Unhandled {
        /// Event name that was declined.
        name: String,
    },

    /// The receiver replied through `on_failure`.
    #[error("receiver reported failure: {0}")]
    Failed(Value),

    /// Every reply sink was dropped without a reply.
    #[error("reply sink dropped without a reply")]
    Abandoned,

    /// The main loop is gone; nothing will ever run the request.
    #[error("dispatcher main loop is closed")]
    Closed,

    /// The caller stopped waiting.
    #[error("no reply within {0:?}")]
    TimedOut(Duration),
}

impl ReplyError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ReplyError::NoReceiver { .. } => "routing_miss",
            ReplyError::Unhandled { .. } => "unsupported_event",
            ReplyError::Failed(_) => "receiver_failure",
            ReplyError::Abandoned => "reply_abandoned",
            ReplyError::Closed => "loop_closed",
            ReplyError::TimedOut(_) => "reply_timed_out",
        }
    }

    /// Whether the failure came from address resolution.
    pub fn is_routing_miss(&self) -> bool {
        matches!(self, ReplyError::NoReceiver { .. })
    }
}

/// Errors raised while setting up a bridge.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum BridgeError {
    /// Configuration could not be parsed.
    #[error("invalid bridge configuration: {0}")]
    Config(#[from] serde_json::Error),
}
