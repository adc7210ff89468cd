//! # Callback Correlator
//!
//! [`ReplySink`] binds one request to exactly one reply. Every clone of a
//! sink shares a single cell guarded by an atomic flag:
//!
//! - the first `on_success` / `on_failure` wins and runs the caller's
//!   continuation;
//! - later calls are no-ops that return `false`;
//! - dropping the last clone without replying resolves the caller with
//!   [`ReplyError::Abandoned`].
//!
//! If the caller has already gone away, the continuation swallows the reply.
//! A continuation that panics is logged and contained; the context that
//! resolved the sink keeps running.

use crate::{error::ReplyError, message::CorrelationId};
use serde_json::Value;
use std::{
    fmt,
    panic::{self, AssertUnwindSafe},
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
};

/// Outcome delivered to the original caller.
pub type Reply = Result<Value, ReplyError>;

type Continuation = Box<dyn FnOnce(Reply) + Send + 'static>;

struct Correlation {
    id: CorrelationId,
    fired: AtomicBool,
    continuation: Mutex<Option<Continuation>>,
}

impl Correlation {
    fn resolve(&self, reply: Reply) -> bool {
        if self.fired.swap(true, Ordering::AcqRel) {
            tracing::warn!(correlation = %self.id, "reply sink invoked more than once; ignored");
            return false;
        }
        let continuation = self
            .continuation
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match continuation {
            Some(continuation) => {
                run_continuation(self.id, continuation, reply);
                true
            }
            None => false,
        }
    }
}

fn run_continuation(id: CorrelationId, continuation: Continuation, reply: Reply) {
    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(move || continuation(reply))) {
        let message = payload
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
            .unwrap_or("unknown panic");
        tracing::error!(correlation = %id, panic = message, "reply continuation panicked");
    }
}

impl Drop for Correlation {
    fn drop(&mut self) {
        if *self.fired.get_mut() {
            return;
        }
        let continuation = self
            .continuation
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(continuation) = continuation {
            tracing::debug!(correlation = %self.id, "reply sink dropped without a reply");
            run_continuation(self.id, continuation, Err(ReplyError::Abandoned));
        }
    }
}

/// Single-use reply handle for a callback-bearing dispatch.
///
/// Cheap to clone; all clones share the same one-shot cell.
#[derive(Clone)]
pub struct ReplySink {
    inner: Arc<Correlation>,
}

impl ReplySink {
    /// Create a sink that runs `continuation` with the eventual reply.
    pub fn new<F>(id: CorrelationId, continuation: F) -> Self
    where
        F: FnOnce(Reply) + Send + 'static,
    {
        Self {
            inner: Arc::new(Correlation {
                id,
                fired: AtomicBool::new(false),
                continuation: Mutex::new(Some(Box::new(continuation))),
            }),
        }
    }

    /// Correlation token of the request this sink answers.
    pub fn id(&self) -> CorrelationId {
        self.inner.id
    }

    /// Reply with a success payload. Returns whether this call delivered it.
    pub fn on_success(&self, data: Value) -> bool {
        self.inner.resolve(Ok(data))
    }

    /// Reply with a failure payload. Returns whether this call delivered it.
    pub fn on_failure(&self, error: Value) -> bool {
        self.inner.resolve(Err(ReplyError::Failed(error)))
    }

    /// Resolve with an arbitrary outcome. Used by the router itself.
    pub fn resolve(&self, reply: Reply) -> bool {
        self.inner.resolve(reply)
    }

    /// Whether a reply has already been sent.
    pub fn is_resolved(&self) -> bool {
        self.inner.fired.load(Ordering::Acquire)
    }
}

impl fmt::Debug for ReplySink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReplySink")
            .field("id", &self.inner.id)
            .field("resolved", &self.is_resolved())
            .finish()
    }
}
