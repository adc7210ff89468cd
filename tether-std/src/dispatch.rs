//! # Dispatcher
//!
//! Inbound path from embedded trees to the host, split in two halves:
//!
//! - [`Dispatcher`] - cloneable, `Send + Sync` handle. Safe to call from any
//!   thread; it only enqueues and never blocks.
//! - [`MainLoop`] - single consumer that owns the host provider and runs on
//!   the host main context. It resolves each tag and invokes the receiver.
//!
//! ```text
//!  tree / bridge threads           host main context
//!  Dispatcher::dispatch ──┐
//!  Dispatcher::request  ──┼──► [unbounded FIFO] ──► MainLoop ──► AddressResolver ──► Receiver
//!  Dispatcher::dispatch ──┘                            └──► ReplySink ──► caller continuation
//! ```
//!
//! Commands run in enqueue order. A routing miss drops fire-and-forget
//! events and answers callback-bearing ones with [`ReplyError::NoReceiver`].

use crate::{isolate::guarded, resolver::AddressResolver};
use futures::{
    FutureExt, StreamExt,
    channel::{mpsc, oneshot},
};
use std::{
    fmt,
    future::Future,
    pin::Pin,
    sync::{
        Arc,
        atomic::{AtomicU64, AtomicUsize, Ordering},
    },
    task::{Context, Poll},
};
use tether_core::{
    CorrelationId, Event, Payload, Reply, ReplyError, ReplySink, RootContainerProvider, Tag,
};

pub(crate) enum Command {
    Deliver(Event),
    Request(Event, ReplySink),
}

/// Create a connected dispatcher / main loop pair.
pub fn channel<P: RootContainerProvider>(provider: P, catch_panics: bool) -> (Dispatcher, MainLoop<P>) {
    let (tx, rx) = mpsc::unbounded();
    let dispatcher = Dispatcher {
        tx,
        next_id: Arc::new(AtomicU64::new(1)),
        outstanding: Arc::new(AtomicUsize::new(0)),
    };
    let main_loop = MainLoop {
        rx,
        resolver: AddressResolver::new(provider),
        catch_panics,
    };
    (dispatcher, main_loop)
}

/// Entry point the embedded-tree layer calls.
#[derive(Clone)]
pub struct Dispatcher {
    tx: mpsc::UnboundedSender<Command>,
    next_id: Arc<AtomicU64>,
    outstanding: Arc<AtomicUsize>,
}

impl Dispatcher {
    /// Fire-and-forget delivery to whatever `tag` resolves to.
    pub fn dispatch(&self, tag: Tag, name: impl Into<String>, payload: Payload) {
        let event = Event::new(tag, name, payload);
        if self.tx.unbounded_send(Command::Deliver(event)).is_err() {
            tracing::warn!(%tag, "main loop closed; event dropped");
        }
    }

    /// Deliver an event and run `on_result` exactly once with the reply.
    pub fn dispatch_with_callback<F>(
        &self,
        tag: Tag,
        name: impl Into<String>,
        payload: Payload,
        on_result: F,
    ) -> CorrelationId
    where
        F: FnOnce(Reply) + Send + 'static,
    {
        let id = CorrelationId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let outstanding = Arc::clone(&self.outstanding);
        outstanding.fetch_add(1, Ordering::AcqRel);
        let sink = ReplySink::new(id, move |reply| {
            outstanding.fetch_sub(1, Ordering::AcqRel);
            on_result(reply);
        });

        let event = Event::new(tag, name, payload).with_correlation(id);
        if let Err(err) = self.tx.unbounded_send(Command::Request(event, sink)) {
            tracing::warn!(%tag, correlation = %id, "main loop closed; request failed");
            if let Command::Request(_, sink) = err.into_inner() {
                sink.resolve(Err(ReplyError::Closed));
            }
        }
        id
    }

    /// Awaitable form of [`dispatch_with_callback`](Self::dispatch_with_callback).
    ///
    /// Dropping the future abandons the request; a late reply is discarded.
    pub fn request(&self, tag: Tag, name: impl Into<String>, payload: Payload) -> ReplyFuture {
        let (tx, rx) = oneshot::channel();
        let id = self.dispatch_with_callback(tag, name, payload, move |reply| {
            let _ = tx.send(reply);
        });
        ReplyFuture { id, rx }
    }

    /// Requests whose reply has not been delivered yet.
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::Acquire)
    }

    /// Whether the main loop still accepts work.
    pub fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("open", &self.is_open())
            .field("outstanding", &self.outstanding())
            .finish()
    }
}

/// Reply to a [`Dispatcher::request`].
#[must_use = "dropping a ReplyFuture abandons the reply"]
pub struct ReplyFuture {
    id: CorrelationId,
    rx: oneshot::Receiver<Reply>,
}

impl ReplyFuture {
    /// Correlation token of the request.
    pub fn id(&self) -> CorrelationId {
        self.id
    }
}

impl Future for ReplyFuture {
    type Output = Reply;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match self.rx.poll_unpin(cx) {
            Poll::Ready(Ok(reply)) => Poll::Ready(reply),
            Poll::Ready(Err(oneshot::Canceled)) => Poll::Ready(Err(ReplyError::Abandoned)),
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Consumer half; run it on the host main context.
pub struct MainLoop<P> {
    rx: mpsc::UnboundedReceiver<Command>,
    resolver: AddressResolver<P>,
    catch_panics: bool,
}

impl<P: RootContainerProvider> MainLoop<P> {
    /// Process commands until every [`Dispatcher`] clone is dropped.
    pub async fn run(mut self) {
        while let Some(command) = self.rx.next().await {
            self.execute(command);
        }
        tracing::debug!("all dispatchers dropped; main loop finished");
    }

    /// Process whatever is queued right now without waiting.
    ///
    /// Returns how many commands ran. For hosts that pump the bridge from
    /// their own frame loop.
    pub fn run_pending(&mut self) -> usize {
        let mut ran = 0;
        while let Some(Some(command)) = self.rx.next().now_or_never() {
            self.execute(command);
            ran += 1;
        }
        ran
    }

    /// The resolver, for host code running on the main context.
    pub fn resolver(&self) -> &AddressResolver<P> {
        &self.resolver
    }

    /// The host provider.
    pub fn provider(&self) -> &P {
        self.resolver.provider()
    }

    fn execute(&self, command: Command) {
        match command {
            Command::Deliver(event) => self.deliver(event),
            Command::Request(event, sink) => self.request(event, sink),
        }
    }

    fn deliver(&self, event: Event) {
        let tag = event.target();
        let Some(resolved) = self.resolver.resolve(tag) else {
            tracing::debug!(%tag, event = event.name(), "no receiver; event dropped");
            return;
        };

        let receiver = &resolved.receiver;
        let handled = guarded(self.catch_panics, "receiver", || receiver.handle(&event));
        match handled {
            Some(true) => {
                tracing::debug!(%tag, event = event.name(), via = ?resolved.via, "event handled");
            }
            Some(false) => {
                tracing::debug!(%tag, event = event.name(), via = ?resolved.via, "event not handled");
            }
            None => {}
        }
    }

    fn request(&self, event: Event, sink: ReplySink) {
        let tag = event.target();
        let Some(resolved) = self.resolver.resolve(tag) else {
            tracing::warn!(%tag, event = event.name(), correlation = %sink.id(), "no receiver for request");
            sink.resolve(Err(ReplyError::NoReceiver { tag }));
            return;
        };

        let receiver = &resolved.receiver;
        let handed = sink.clone();
        let handled = guarded(self.catch_panics, "receiver", || {
            receiver.handle_with_callback(&event, handed)
        });
        match handled {
            Some(true) => {
                tracing::debug!(%tag, event = event.name(), correlation = %sink.id(), "request accepted");
            }
            Some(false) => {
                tracing::debug!(%tag, event = event.name(), correlation = %sink.id(), "request not handled");
                sink.resolve(Err(ReplyError::Unhandled {
                    name: event.name().to_string(),
                }));
            }
            None => {
                sink.resolve(Err(ReplyError::Abandoned));
            }
        }
    }
}
