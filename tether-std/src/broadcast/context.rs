//! Per-tree delivery context.
//!
//! Publishing never runs tree callbacks. It pushes the envelope onto the
//! queue of the context each subscription was bound to, and the tree drains
//! that queue on its own thread or task through a [`TreeLoop`].

use super::table::Entry;
use crate::isolate::guarded;
use futures::{FutureExt, StreamExt, channel::mpsc};
use std::{fmt, sync::Arc};
use tether_core::BroadcastEvent;

pub(crate) struct Delivery {
    pub(crate) event: Arc<BroadcastEvent>,
    pub(crate) entry: Arc<Entry>,
}

/// Create a connected context / loop pair for one tree.
pub fn tree_context() -> (TreeContext, TreeLoop) {
    let (tx, rx) = mpsc::unbounded();
    (
        TreeContext { tx },
        TreeLoop {
            rx,
            catch_panics: true,
        },
    )
}

/// Where a subscription's handler runs. Chosen when subscribing.
///
/// Cloneable and `Send + Sync`; every subscription bound to the same context
/// is delivered in publish order, and within one publish in subscription
/// order.
#[derive(Clone)]
pub struct TreeContext {
    tx: mpsc::UnboundedSender<Delivery>,
}

impl TreeContext {
    /// Whether the matching [`TreeLoop`] is still alive.
    pub fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }

    pub(crate) fn sender(&self) -> mpsc::UnboundedSender<Delivery> {
        self.tx.clone()
    }
}

impl fmt::Debug for TreeContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeContext")
            .field("open", &self.is_open())
            .finish()
    }
}

/// Consumer half; run it where the tree wants its callbacks.
pub struct TreeLoop {
    rx: mpsc::UnboundedReceiver<Delivery>,
    catch_panics: bool,
}

impl TreeLoop {
    /// Enable or disable panic isolation for handlers run by this loop.
    pub fn with_catch_panics(mut self, catch: bool) -> Self {
        self.catch_panics = catch;
        self
    }

    /// Run handlers until the context and every subscription bound to it
    /// are gone.
    pub async fn run(mut self) {
        while let Some(delivery) = self.rx.next().await {
            self.deliver(delivery);
        }
        tracing::debug!("tree context closed; tree loop finished");
    }

    /// Run handlers for whatever is queued right now without waiting.
    ///
    /// Returns how many handlers ran. Deliveries for subscriptions removed
    /// after the publish are skipped and not counted.
    pub fn run_pending(&mut self) -> usize {
        let mut ran = 0;
        while let Some(Some(delivery)) = self.rx.next().now_or_never() {
            if self.deliver(delivery) {
                ran += 1;
            }
        }
        ran
    }

    fn deliver(&self, delivery: Delivery) -> bool {
        let Delivery { event, entry } = delivery;
        if !entry.is_active() {
            return false;
        }
        let Some(handler) = entry.handler() else {
            return false;
        };
        guarded(self.catch_panics, "subscriber", || (**handler)(event.as_ref())).is_some()
    }
}

impl fmt::Debug for TreeLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeLoop")
            .field("catch_panics", &self.catch_panics)
            .finish_non_exhaustive()
    }
}
