//! Bounded waiting for replies.
//!
//! **Note**: requires the `timeout` feature, which pulls in the `tokio`
//! timer. The bridge itself never times out a request; this only stops the
//! caller from waiting.

use crate::dispatch::ReplyFuture;
use std::time::Duration;
use tether_core::{Reply, ReplyError};

impl ReplyFuture {
    /// Wait at most `duration` for the reply.
    ///
    /// On expiry the reply is abandoned and [`ReplyError::TimedOut`] is
    /// returned; a late reply from the receiver is discarded.
    pub async fn timeout(self, duration: Duration) -> Reply {
        let id = self.id();
        match tokio::time::timeout(duration, self).await {
            Ok(reply) => reply,
            Err(_) => {
                tracing::debug!(correlation = %id, ?duration, "gave up waiting for reply");
                Err(ReplyError::TimedOut(duration))
            }
        }
    }
}
