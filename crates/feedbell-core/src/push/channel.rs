use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use parking_lot::Mutex;
use tokio::task::JoinHandle;

use super::sse::SseFrame;
use super::transport::PushTransport;
use crate::constants::events;
use crate::error::FeedError;
use crate::format::truncate_with_ellipsis;
use crate::models::NotificationRecord;

type OpenCallback = Arc<dyn Fn() + Send + Sync>;
type FrameCallback = Arc<dyn Fn(&SseFrame) + Send + Sync>;
type RecordCallback = Arc<dyn Fn(NotificationRecord) + Send + Sync>;
type ErrorCallback = Arc<dyn Fn(&FeedError) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Disconnected,
    Connecting,
    Connected,
}

/// Identifies one connection attempt. Repeated `connect` calls on a live
/// channel return the id of the existing connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ConnectionId(u64);

/// Callbacks invoked from the channel's reader task. All are optional;
/// "connected" and "heartbeat" events are accepted without one.
#[derive(Clone, Default)]
pub struct PushHandlers {
    on_open: Option<OpenCallback>,
    on_message: Option<FrameCallback>,
    named: HashMap<String, FrameCallback>,
    on_notification: Option<RecordCallback>,
    on_error: Option<ErrorCallback>,
}

impl PushHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_open(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_open = Some(Arc::new(f));
        self
    }

    /// Unnamed ("message") events
    pub fn on_message(mut self, f: impl Fn(&SseFrame) + Send + Sync + 'static) -> Self {
        self.on_message = Some(Arc::new(f));
        self
    }

    /// Raw frames for one named event
    pub fn on_event(
        mut self,
        name: impl Into<String>,
        f: impl Fn(&SseFrame) + Send + Sync + 'static,
    ) -> Self {
        self.named.insert(name.into(), Arc::new(f));
        self
    }

    /// Parsed "notification" events. Payloads that aren't a valid record are dropped.
    pub fn on_notification(
        mut self,
        f: impl Fn(NotificationRecord) + Send + Sync + 'static,
    ) -> Self {
        self.on_notification = Some(Arc::new(f));
        self
    }

    pub fn on_error(mut self, f: impl Fn(&FeedError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(f));
        self
    }

    fn opened(&self) {
        if let Some(cb) = &self.on_open {
            cb();
        }
    }

    fn errored(&self, error: &FeedError) {
        if let Some(cb) = &self.on_error {
            cb(error);
        }
    }

    fn dispatch(&self, frame: &SseFrame) {
        if frame.is_default_event() {
            if let Some(cb) = &self.on_message {
                cb(frame);
            }
            return;
        }

        let mut handled = false;
        if let Some(cb) = self.named.get(&frame.event) {
            cb(frame);
            handled = true;
        }

        if frame.event == events::NOTIFICATION {
            if let Some(cb) = &self.on_notification {
                handled = true;
                match NotificationRecord::from_event_data(&frame.data) {
                    Some(record) => cb(record),
                    None => tracing::debug!(
                        data = %truncate_with_ellipsis(&frame.data, 120),
                        "dropping malformed notification payload"
                    ),
                }
            }
        }

        if !handled {
            match frame.event.as_str() {
                events::CONNECTED | events::HEARTBEAT => {
                    tracing::trace!(event = %frame.event, "push keep-alive");
                }
                other => tracing::debug!(event = other, "no handler for push event"),
            }
        }
    }
}

struct Inner {
    state: ChannelState,
    // Bumped on every connect/disconnect; tasks from older generations are stale
    generation: u64,
    endpoint: Option<String>,
    handlers: Option<PushHandlers>,
    reader: Option<JoinHandle<()>>,
    reconnect: Option<JoinHandle<()>>,
}

struct Shared {
    transport: Arc<dyn PushTransport>,
    reconnect_delay: Duration,
    inner: Mutex<Inner>,
}

impl Shared {
    fn start(self: &Arc<Self>, inner: &mut Inner) -> Option<ConnectionId> {
        let endpoint = inner.endpoint.clone()?;
        let handlers = inner.handlers.clone()?;

        inner.generation += 1;
        let generation = inner.generation;
        inner.state = ChannelState::Connecting;
        if let Some(timer) = inner.reconnect.take() {
            timer.abort();
        }

        let shared = Arc::clone(self);
        inner.reader = Some(tokio::spawn(async move {
            shared.run(generation, endpoint, handlers).await;
        }));
        Some(ConnectionId(generation))
    }

    async fn run(self: Arc<Self>, generation: u64, endpoint: String, handlers: PushHandlers) {
        let error = match self.transport.open(&endpoint).await {
            Ok(mut frames) => {
                if !self.mark_connected(generation) {
                    return;
                }
                tracing::info!(endpoint = %endpoint, "push channel connected");
                handlers.opened();

                loop {
                    match frames.next().await {
                        Some(Ok(frame)) => handlers.dispatch(&frame),
                        Some(Err(e)) => break e,
                        None => {
                            break FeedError::Stream {
                                message: "stream closed by server".to_string(),
                            }
                        }
                    }
                }
            }
            Err(e) => e,
        };

        self.fail(generation, error, &handlers);
    }

    fn mark_connected(&self, generation: u64) -> bool {
        let mut inner = self.inner.lock();
        if inner.generation != generation {
            return false;
        }
        inner.state = ChannelState::Connected;
        true
    }

    fn fail(self: &Arc<Self>, generation: u64, error: FeedError, handlers: &PushHandlers) {
        {
            let mut inner = self.inner.lock();
            if inner.generation != generation {
                return;
            }
            inner.state = ChannelState::Disconnected;
            inner.reader = None;
            if inner.reconnect.is_none() {
                let shared = Arc::clone(self);
                let delay = self.reconnect_delay;
                inner.reconnect = Some(tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    shared.reconnect(generation);
                }));
            }
        }

        tracing::warn!(
            error = %error,
            delay_ms = self.reconnect_delay.as_millis() as u64,
            "push channel dropped, scheduling reconnect"
        );
        handlers.errored(&error);
    }

    fn reconnect(self: &Arc<Self>, generation: u64) {
        let mut inner = self.inner.lock();
        if inner.generation != generation || inner.state != ChannelState::Disconnected {
            return;
        }
        inner.reconnect = None;
        tracing::debug!("push channel reconnect attempt");
        self.start(&mut inner);
    }
}

/// Owns at most one live event-stream connection.
///
/// Transport failures never propagate: the failed connection is closed, the
/// error is handed to `on_error`, and a single reconnect is scheduled after
/// the configured delay. Must be used from within a tokio runtime.
pub struct PushChannel {
    shared: Arc<Shared>,
}

impl PushChannel {
    pub fn new(transport: Arc<dyn PushTransport>, reconnect_delay: Duration) -> Self {
        Self {
            shared: Arc::new(Shared {
                transport,
                reconnect_delay,
                inner: Mutex::new(Inner {
                    state: ChannelState::Disconnected,
                    generation: 0,
                    endpoint: None,
                    handlers: None,
                    reader: None,
                    reconnect: None,
                }),
            }),
        }
    }

    /// Open the connection unless one is already live or being opened.
    pub fn connect(&self, endpoint: impl Into<String>, handlers: PushHandlers) -> ConnectionId {
        let mut inner = self.shared.inner.lock();
        if inner.state != ChannelState::Disconnected {
            return ConnectionId(inner.generation);
        }

        inner.endpoint = Some(endpoint.into());
        inner.handlers = Some(handlers);
        match self.shared.start(&mut inner) {
            Some(id) => id,
            None => ConnectionId(inner.generation),
        }
    }

    /// Close the connection and cancel any pending reconnect. Safe to call repeatedly.
    pub fn disconnect(&self) {
        let mut inner = self.shared.inner.lock();
        let was = inner.state;

        inner.generation += 1;
        if let Some(reader) = inner.reader.take() {
            reader.abort();
        }
        if let Some(timer) = inner.reconnect.take() {
            timer.abort();
        }
        inner.state = ChannelState::Disconnected;
        inner.endpoint = None;
        inner.handlers = None;

        if was != ChannelState::Disconnected {
            tracing::info!("push channel disconnected");
        }
    }

    pub fn state(&self) -> ChannelState {
        self.shared.inner.lock().state
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ChannelState::Connected
    }

    pub fn has_pending_reconnect(&self) -> bool {
        self.shared.inner.lock().reconnect.is_some()
    }
}

impl Drop for PushChannel {
    fn drop(&mut self) {
        self.disconnect();
    }
}
