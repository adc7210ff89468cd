//! Panic isolation for host callbacks.

use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
};

/// Run `f`, turning a panic into `None` and an `error!` log entry.
pub(crate) fn guarded<R>(enabled: bool, what: &str, f: impl FnOnce() -> R) -> Option<R> {
    if !enabled {
        return Some(f());
    }
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => Some(value),
        Err(payload) => {
            tracing::error!(target_kind = what, panic = %panic_message(&*payload), "callback panicked");
            None
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg
    } else {
        "unknown panic"
    }
}
