#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use tether::{Payload, Reply, Value};

pub fn payload(value: Value) -> Payload {
    value.as_object().cloned().unwrap_or_default()
}

/// Collects replies handed to a `dispatch_with_callback` continuation.
#[derive(Clone, Default)]
pub struct Replies(Arc<Mutex<Vec<Reply>>>);

impl Replies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sink(&self) -> impl FnOnce(Reply) + Send + 'static {
        let replies = self.0.clone();
        move |reply| replies.lock().unwrap().push(reply)
    }

    pub fn all(&self) -> Vec<Reply> {
        self.0.lock().unwrap().clone()
    }
}
