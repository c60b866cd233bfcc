//! Chain session - one registered chain behind a request/response API.
//!
//! This module implements the correlation layer on top of the light-client
//! boundary. It handles:
//! - Allocating unique request ids and serializing the JSON-RPC envelope
//! - Correlating inbound responses with pending requests
//! - Distinguishing notifications from responses
//! - Fanning notifications out to subscribers
//!
//! # Message Flow
//!
//! 1. Caller invokes [`ChainSession::call`] with method and params
//! 2. Session allocates a unique id and creates a oneshot channel
//! 3. Request is serialized and submitted via the chain handle
//! 4. Caller awaits on the oneshot receiver
//! 5. Reader task receives a message from the light client
//! 6. Response is correlated by id and sent via the oneshot channel
//! 7. Caller receives the result
//!
//! Requests may complete out of submission order; callers must not assume
//! FIFO completion.

use crate::client::ChainHandle;
use crate::correlator::RequestCorrelator;
use crate::error::{Error, Result};
use futures_util::Stream;
use lightlink_protocol::{Message, Notification, Request};
use parking_lot::Mutex;
use serde_json::Value;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// RAII guard ensuring the pending entry is removed when a call future is
/// dropped (or times out) before its completion arrives.
struct PendingGuard<'a> {
    correlator: &'a RequestCorrelator,
    id: u64,
    armed: bool,
}

impl<'a> PendingGuard<'a> {
    fn new(correlator: &'a RequestCorrelator, id: u64) -> Self {
        Self {
            correlator,
            id,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if self.armed && self.correlator.forget(self.id) {
            tracing::debug!(id = self.id, "removed pending entry for abandoned request");
        }
    }
}

/// One registered chain: its handle, pending-request table, and notification
/// subscribers.
///
/// Sessions are independent of one another and may be operated concurrently;
/// each owns a disjoint pending table.
pub struct ChainSession {
    /// Underlying chain handle; taken on close so late calls fail fast.
    handle: Mutex<Option<Box<dyn ChainHandle>>>,
    correlator: RequestCorrelator,
    /// Live notification subscribers. Senders are pruned on delivery failure.
    subscribers: Mutex<Vec<mpsc::UnboundedSender<Notification>>>,
    /// Reader task draining the light client's message stream.
    reader: Mutex<Option<JoinHandle<()>>>,
    closed: AtomicBool,
    call_timeout: Option<Duration>,
}

impl ChainSession {
    pub fn new(handle: Box<dyn ChainHandle>, call_timeout: Option<Duration>) -> Self {
        Self {
            handle: Mutex::new(Some(handle)),
            correlator: RequestCorrelator::new(),
            subscribers: Mutex::new(Vec::new()),
            reader: Mutex::new(None),
            closed: AtomicBool::new(false),
            call_timeout,
        }
    }

    /// Spawns the reader task consuming the chain's inbound message stream.
    ///
    /// There is exactly one inbound stream per session; every message it
    /// yields goes through [`ChainSession::dispatch`].
    pub fn spawn_reader(self: &Arc<Self>, mut inbound: mpsc::UnboundedReceiver<String>) {
        let session = Arc::clone(self);
        let task = tokio::spawn(async move {
            while let Some(raw) = inbound.recv().await {
                session.dispatch(&raw);
            }
            tracing::debug!("inbound message stream ended");
        });
        *self.reader.lock() = Some(task);
    }

    /// Submits a JSON-RPC request and suspends until the matching response
    /// arrives, the configured timeout expires, or the session closes.
    pub async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(Error::SessionClosed);
        }

        let id = self.correlator.allocate();
        let (sender, receiver) = oneshot::channel();
        self.correlator.register(id, sender)?;
        let guard = PendingGuard::new(&self.correlator, id);

        let raw = serde_json::to_string(&Request::new(id, method, params))?;
        tracing::debug!(id, method, "submitting request");

        {
            let handle = self.handle.lock();
            match handle.as_ref() {
                Some(handle) => handle.send_json_rpc(raw)?,
                None => return Err(Error::SessionClosed),
            }
        }

        let outcome = match self.call_timeout {
            Some(window) => match tokio::time::timeout(window, receiver).await {
                Ok(received) => received,
                Err(_) => {
                    tracing::debug!(id, method, "request timed out");
                    return Err(Error::Timeout(window));
                }
            },
            None => receiver.await,
        };

        guard.disarm();
        outcome.map_err(|_| Error::ChannelClosed)?
    }

    /// Correlates one raw inbound message.
    ///
    /// Responses resolve (or reject) the matching pending request; messages
    /// without an id are notifications and go to the subscriber streams.
    /// Response-shaped ids matching no live request, and messages of
    /// unrecognized shape, are protocol anomalies: logged and dropped.
    pub fn dispatch(&self, raw: &str) {
        let message = match serde_json::from_str::<Message>(raw) {
            Ok(message) => message,
            Err(error) => {
                tracing::warn!(%error, "discarding malformed inbound message");
                return;
            }
        };

        match message {
            Message::Response(response) => {
                let outcome = match response.error {
                    Some(payload) => Err(Error::Rpc {
                        code: payload.code,
                        message: payload.message,
                        data: payload.data,
                    }),
                    None => Ok(response.result.unwrap_or(Value::Null)),
                };
                self.correlator.complete(response.id, outcome);
            }
            Message::Notification(notification) => self.publish(notification),
            Message::Unknown(value) => {
                tracing::warn!(message = %value, "discarding message with unrecognized shape");
            }
        }
    }

    /// Returns a fresh notification stream starting from now.
    ///
    /// The stream is unbounded and ends when the session closes or the
    /// subscriber is dropped. Subscribing to a closed session yields an
    /// immediately-ended stream.
    pub fn subscribe(&self) -> NotificationStream {
        let (sender, receiver) = mpsc::unbounded_channel();
        // The flag must be checked while holding the lock: close() sets it
        // before clearing subscribers under the same lock, so no sender can
        // slip into the vec after the final clear.
        let mut subscribers = self.subscribers.lock();
        if !self.closed.load(Ordering::SeqCst) {
            subscribers.push(sender);
        }
        NotificationStream { receiver }
    }

    fn publish(&self, notification: Notification) {
        let mut subscribers = self.subscribers.lock();
        subscribers.retain(|sender| sender.send(notification.clone()).is_ok());
        if subscribers.is_empty() {
            tracing::trace!(
                method = %notification.method,
                "notification with no live subscribers"
            );
        }
    }

    /// Closes the session: stops the reader, releases the chain handle,
    /// rejects all pending requests, and ends every notification stream.
    ///
    /// Idempotent; a second close is a no-op.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }

        if let Some(task) = self.reader.lock().take() {
            task.abort();
        }
        self.handle.lock().take();
        self.correlator.drain();
        self.subscribers.lock().clear();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Number of requests submitted but not yet resolved, rejected, or
    /// timed out.
    pub fn pending_requests(&self) -> usize {
        self.correlator.pending_len()
    }
}

/// Lazy, unbounded sequence of notifications for one subscriber.
#[derive(Debug)]
pub struct NotificationStream {
    receiver: mpsc::UnboundedReceiver<Notification>,
}

impl NotificationStream {
    /// Receives the next notification, or `None` once the session closes.
    pub async fn recv(&mut self) -> Option<Notification> {
        self.receiver.recv().await
    }
}

impl Stream for NotificationStream {
    type Item = Notification;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}
