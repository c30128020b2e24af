//! Core adapter implementation.
//!
//! [`SyncAdapter::sync`] is the persistence entry point. Each call either
//! executes immediately, is queued until the connection opens, or fails.
//!
//! # Call States
//!
//! | Connection | Backlog | [`SyncMode::Queue`] | [`SyncMode::Strict`] |
//! |------------|---------|---------------------|----------------------|
//! | not located | - | `TransportUnavailable` | `TransportUnavailable` |
//! | located, closed | - | queued, [`SyncOutcome::Pending`] | `NotConnected` |
//! | open | non-empty | queued behind backlog | n/a |
//! | open | empty | dispatched, [`SyncOutcome::Dispatched`] | dispatched |
//!
//! Only an immediately dispatched call returns an [`InFlight`] handle. A
//! queued call is observable only through its `success` callback and the
//! target's `request` event when it replays.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::result::Result as StdResult;
use std::sync::Arc;

use serde_json::Value;
use tokio::runtime::Handle;
use tracing::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::events::{EventBus, InboundBridge, RequestEvent, TargetEvent};
use crate::identifiers::RequestId;
use crate::model::{CallOptions, TargetRef};
use crate::protocol::{InFlight, SyncMethod, TransportRequest};
use crate::transport::{ConnectionLocator, Located, SlotRegistry, is_healthy};

use super::builder::SyncBuilder;
use super::queue::{PendingCall, RequestQueue};
use super::translate::{build_payload, resolve_url};
use super::{AcquisitionRetryLoop, ReadyPoller, SyncMode, SyncOptions};

// ============================================================================
// SyncOutcome
// ============================================================================

/// Result of a successful [`SyncAdapter::sync`] call.
#[derive(Debug, Clone)]
#[must_use]
pub enum SyncOutcome {
    /// Sent now; the handle tracks the response.
    Dispatched(InFlight),
    /// Queued until the connection opens. No handle is available.
    Pending,
}

impl SyncOutcome {
    /// Returns the in-flight handle if the call was sent immediately.
    #[inline]
    #[must_use]
    pub fn handle(&self) -> Option<&InFlight> {
        match self {
            Self::Dispatched(handle) => Some(handle),
            Self::Pending => None,
        }
    }

    /// Returns `true` if the call was queued.
    #[inline]
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

// ============================================================================
// Drain
// ============================================================================

/// Outcome of one drain pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Drain {
    /// Queue emptied; the poller may stop.
    Complete,
    /// Connection not healthy; calls remain queued.
    NotReady,
}

// ============================================================================
// AdapterInner
// ============================================================================

/// Shared adapter state.
pub(crate) struct AdapterInner {
    options: SyncOptions,
    registry: Arc<SlotRegistry>,
    bus: Arc<EventBus<Value>>,
    locator: Arc<ConnectionLocator>,
    queue: RequestQueue,
    retry: Arc<AcquisitionRetryLoop>,
    poller: ReadyPoller,
    runtime: Handle,
}

impl AdapterInner {
    /// Translates and sends one call over a located connection.
    fn execute(
        &self,
        method: &SyncMethod,
        target: &TargetRef,
        options: &CallOptions,
        located: &Located,
    ) -> Result<InFlight> {
        let url = resolve_url(options, target.as_ref())?;
        let payload = build_payload(options, target.as_ref());
        let verb = method.verb();

        let id = RequestId::generate();
        let handle = InFlight::new(id, url.as_str(), verb.clone());

        let callback = {
            let handle = handle.clone();
            let success = options.success.clone();
            Box::new(move |response: Value| {
                if let Some(success) = success {
                    success(response);
                }
                handle.settle();
            })
        };

        located
            .connection
            .request(id, TransportRequest::new(url, payload, verb), callback)?;

        debug!(%id, method = %method, verb = %handle.verb(), url = %handle.url(), "Request dispatched");

        target.trigger(&TargetEvent::Request(RequestEvent {
            target: Arc::clone(target),
            handle: handle.clone(),
            options: options.clone(),
        }));

        Ok(handle)
    }

    /// Replays queued calls in order while the connection stays healthy.
    pub(crate) fn drain_queue(&self) -> Drain {
        loop {
            let Some(located) = self.locator.located() else {
                return Drain::NotReady;
            };
            if !is_healthy(Some(located.connection.as_ref())) {
                return Drain::NotReady;
            }

            let Some(call) = self.queue.next_or_idle() else {
                return Drain::Complete;
            };

            match self.execute(&call.method, &call.target, &call.options, &located) {
                Ok(handle) => trace!(id = %handle.id(), "Queued call replayed"),
                Err(Error::ConnectionClosed) => {
                    self.queue.requeue_front(call);
                    return Drain::NotReady;
                }
                Err(e) => {
                    warn!(method = %call.method, error = %e, "Queued call failed on replay");
                    call.options.fail(&e);
                }
            }
        }
    }

    /// Drops every queued call, reporting it to its error callback.
    pub(crate) fn abandon_queue(&self, ticks: u32) {
        let abandoned = self.queue.abandon();
        warn!(
            ticks,
            count = abandoned.len(),
            "Connection never became healthy; abandoning queued calls"
        );

        let error = Error::queue_abandoned(ticks);
        for call in &abandoned {
            call.options.fail(&error);
        }
    }

    fn enqueue(self: &Arc<Self>, call: PendingCall) {
        trace!(method = %call.method, "Call queued until connection opens");
        if self.queue.enqueue(call) {
            self.spawn_poller();
        }
    }

    /// Queues the call behind a backlog or an unfinished replay.
    ///
    /// Gives the call back when nothing is ahead of it.
    fn enqueue_if_busy(self: &Arc<Self>, call: PendingCall) -> StdResult<(), PendingCall> {
        let method = call.method.clone();
        let start_poller = self.queue.enqueue_if_busy(call)?;
        trace!(method = %method, "Call queued behind backlog");
        if start_poller {
            self.spawn_poller();
        }
        Ok(())
    }

    fn spawn_poller(self: &Arc<Self>) {
        self.poller.spawn(&self.runtime, Arc::downgrade(self));
    }
}

// ============================================================================
// SyncAdapter
// ============================================================================

/// Routes persistence calls over the shared connection.
///
/// Cheap to clone. Intended as one instance per process, matching the one
/// connection per process it serves.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use socket_sync::{CallOptions, Resource, SlotRegistry, SocketConnection, SyncAdapter};
///
/// # async fn example() -> socket_sync::Result<()> {
/// let socket = SocketConnection::open("ws://localhost:1337")?;
/// SlotRegistry::global().publish("global.socket", Arc::new(socket));
///
/// let adapter = SyncAdapter::builder().build()?;
/// let todos = Arc::new(Resource::collection().with_url("/todo"));
///
/// // Queued until the socket finishes connecting.
/// let outcome = adapter.sync(
///     "read",
///     todos,
///     CallOptions::new().on_success(|body| println!("{body}")),
/// )?;
/// assert!(outcome.is_pending());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SyncAdapter {
    inner: Arc<AdapterInner>,
}

// ============================================================================
// SyncAdapter - Constructor
// ============================================================================

impl SyncAdapter {
    /// Creates a new builder.
    #[inline]
    #[must_use]
    pub fn builder() -> SyncBuilder {
        SyncBuilder::new()
    }

    /// Creates the adapter and starts the acquisition loop.
    pub(crate) fn new(
        options: SyncOptions,
        registry: Arc<SlotRegistry>,
        bus: Arc<EventBus<Value>>,
        runtime: Handle,
    ) -> Self {
        let locator = Arc::new(ConnectionLocator::new(
            Arc::clone(&registry),
            options.slots.clone(),
            InboundBridge::new(Arc::clone(&bus)),
        ));
        let retry = Arc::new(AcquisitionRetryLoop::new(&options));
        let poller = ReadyPoller::new(&options);

        retry.spawn(&runtime, Arc::downgrade(&locator));

        debug!(slots = ?options.slots, mode = ?options.mode, "Sync adapter created");

        Self {
            inner: Arc::new(AdapterInner {
                options,
                registry,
                bus,
                locator,
                queue: RequestQueue::new(),
                retry,
                poller,
                runtime,
            }),
        }
    }
}

// ============================================================================
// SyncAdapter - Public API
// ============================================================================

impl SyncAdapter {
    /// Performs a persistence call.
    ///
    /// `options` becomes the adapter's own copy; the caller's value is never
    /// touched afterwards.
    ///
    /// # Returns
    ///
    /// - [`SyncOutcome::Dispatched`] with an in-flight handle if sent now
    /// - [`SyncOutcome::Pending`] if queued until the connection opens
    ///
    /// # Errors
    ///
    /// - [`Error::TransportUnavailable`] if no connection can be located
    /// - [`Error::NotConnected`] in strict mode if the connection is not open
    /// - [`Error::MissingUrl`] if neither options nor target give a URL
    /// - [`Error::ConnectionClosed`] if the connection refused the request
    pub fn sync(
        &self,
        method: impl Into<SyncMethod>,
        target: TargetRef,
        options: CallOptions,
    ) -> Result<SyncOutcome> {
        let method = method.into();
        let inner = &self.inner;

        let located = inner
            .locator
            .locate()
            .ok_or_else(|| Error::transport_unavailable(inner.locator.slots().iter().cloned()))?;

        let healthy = is_healthy(Some(located.connection.as_ref()));

        let call = PendingCall {
            method,
            target,
            options,
        };

        let call = match inner.options.mode {
            SyncMode::Strict if !healthy => return Err(Error::not_connected(located.source)),
            SyncMode::Strict => call,

            SyncMode::Queue if !healthy => {
                inner.enqueue(call);
                return Ok(SyncOutcome::Pending);
            }
            SyncMode::Queue => match inner.enqueue_if_busy(call) {
                Ok(()) => return Ok(SyncOutcome::Pending),
                Err(call) => call,
            },
        };

        inner
            .execute(&call.method, &call.target, &call.options, &located)
            .map(SyncOutcome::Dispatched)
    }

    /// Locates the connection now if it is not already.
    pub fn locate(&self) -> Option<Located> {
        self.inner.locator.locate()
    }

    /// Returns `true` if a connection has been located.
    #[inline]
    #[must_use]
    pub fn is_located(&self) -> bool {
        self.inner.locator.is_located()
    }

    /// Returns `true` if the located connection is open.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        let located = self.inner.locator.located();
        is_healthy(located.as_ref().map(|l| l.connection.as_ref()))
    }

    /// Returns the slot the connection was located in.
    #[must_use]
    pub fn connection_source(&self) -> Option<String> {
        self.inner.locator.located().map(|l| l.source)
    }

    /// Returns the number of queued calls.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.inner.queue.len()
    }

    /// Returns the startup acquisition attempts made so far.
    #[inline]
    #[must_use]
    pub fn acquire_attempts(&self) -> u32 {
        self.inner.retry.attempts()
    }

    /// Returns the shared bus push messages are re-emitted on.
    #[inline]
    #[must_use]
    pub fn bus(&self) -> &Arc<EventBus<Value>> {
        &self.inner.bus
    }

    /// Returns the slot registry connections are located in.
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &Arc<SlotRegistry> {
        &self.inner.registry
    }

    /// Returns the adapter options.
    #[inline]
    #[must_use]
    pub fn options(&self) -> &SyncOptions {
        &self.inner.options
    }
}

impl fmt::Debug for SyncAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncAdapter")
            .field("mode", &self.inner.options.mode)
            .field("locator", &self.inner.locator)
            .field("queue", &self.inner.queue)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::time::Duration;

    use parking_lot::Mutex;
    use serde_json::{Map, json};
    use tokio::sync::oneshot;
    use tokio::time::{sleep, timeout};

    use crate::events::{COMET_CHANNEL, INBOUND_EVENT, REQUEST_EVENT};
    use crate::model::Resource;
    use crate::protocol::Verb;
    use crate::transport::{Connection, ConnectionRef, LoopbackConnection, MessageHandler, ResponseCallback};

    const POLL: Duration = Duration::from_millis(500);

    /// Blocks inside the request for `gate_url` until released.
    struct GatedConnection {
        connected: AtomicBool,
        gate_url: String,
        entered: Mutex<Option<mpsc::Sender<()>>>,
        release: Mutex<Option<mpsc::Receiver<()>>>,
        sent: Mutex<Vec<String>>,
    }

    impl GatedConnection {
        fn new(gate_url: &str, entered: mpsc::Sender<()>, release: mpsc::Receiver<()>) -> Self {
            Self {
                connected: AtomicBool::new(false),
                gate_url: gate_url.to_string(),
                entered: Mutex::new(Some(entered)),
                release: Mutex::new(Some(release)),
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    impl Connection for GatedConnection {
        fn on(&self, _event: &str, _handler: MessageHandler) {}

        fn is_connected(&self) -> bool {
            self.connected.load(Ordering::SeqCst)
        }

        fn request(
            &self,
            _id: RequestId,
            request: TransportRequest,
            callback: ResponseCallback,
        ) -> Result<()> {
            if request.url == self.gate_url {
                if let Some(entered) = self.entered.lock().take() {
                    let _ = entered.send(());
                }
                let release = self.release.lock().take();
                if let Some(release) = release {
                    let _ = release.recv_timeout(Duration::from_secs(5));
                }
            }
            self.sent.lock().push(request.url);
            callback(Value::Null);
            Ok(())
        }
    }

    /// Reports connected but refuses its first `refusals` requests.
    struct RefusingConnection {
        connected: AtomicBool,
        refusals: AtomicUsize,
        sent: Mutex<Vec<String>>,
    }

    impl RefusingConnection {
        fn new(refusals: usize) -> Self {
            Self {
                connected: AtomicBool::new(false),
                refusals: AtomicUsize::new(refusals),
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    impl Connection for RefusingConnection {
        fn on(&self, _event: &str, _handler: MessageHandler) {}

        fn is_connected(&self) -> bool {
            self.connected.load(Ordering::SeqCst)
        }

        fn request(
            &self,
            _id: RequestId,
            request: TransportRequest,
            callback: ResponseCallback,
        ) -> Result<()> {
            let refused = self
                .refusals
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if refused {
                return Err(Error::ConnectionClosed);
            }
            self.sent.lock().push(request.url);
            callback(Value::Null);
            Ok(())
        }
    }

    fn adapter_on(connection: ConnectionRef, options: SyncOptions) -> SyncAdapter {
        let registry = Arc::new(SlotRegistry::new());
        registry.publish("global.socket", connection);
        SyncAdapter::builder()
            .options(options)
            .registry(registry)
            .build()
            .expect("adapter")
    }

    /// Loopback answering each request with `{"verb": .., "url": ..}`.
    fn echo_connection() -> LoopbackConnection {
        LoopbackConnection::new().with_responder(|request| {
            json!({"verb": request.verb.as_str(), "url": request.url})
        })
    }

    fn adapter_with(connection: &LoopbackConnection, options: SyncOptions) -> SyncAdapter {
        adapter_on(Arc::new(connection.clone()), options.with_poll_interval(POLL))
    }

    fn collection(url: &str) -> TargetRef {
        Arc::new(Resource::collection().with_url(url))
    }

    fn recorder() -> (Arc<Mutex<Vec<Value>>>, CallOptions) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        let options = CallOptions::new().on_success(move |body| seen_clone.lock().push(body));
        (seen, options)
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_unavailable_without_connection() {
        let adapter = SyncAdapter::builder()
            .registry(Arc::new(SlotRegistry::new()))
            .build()
            .expect("adapter");

        let err = adapter
            .sync("read", collection("/todos"), CallOptions::new())
            .unwrap_err();
        assert!(matches!(err, Error::TransportUnavailable { .. }));
        assert!(err.to_string().contains("adapter.socket, global.socket"));
        assert_eq!(adapter.pending_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispatches_immediately_when_healthy() {
        let connection = echo_connection();
        connection.set_connected(true);
        let adapter = adapter_with(&connection, SyncOptions::new());

        let (tx, rx) = oneshot::channel();
        let tx = Mutex::new(Some(tx));
        let options = CallOptions::new().on_success(move |body| {
            if let Some(tx) = tx.lock().take() {
                let _ = tx.send(body);
            }
        });

        let outcome = adapter
            .sync("create", collection("/todos"), options)
            .expect("sync");
        let handle = outcome.handle().expect("dispatched").clone();
        assert_eq!(handle.verb(), &Verb::Post);

        let body = rx.await.expect("success called");
        assert_eq!(body, json!({"verb": "post", "url": "/todos"}));
        handle.settled().await;
        assert!(handle.is_settled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_queued_call_replays_when_connection_opens() {
        let connection = echo_connection();
        let adapter = adapter_with(&connection, SyncOptions::new());
        let (seen, options) = recorder();

        let outcome = adapter
            .sync("read", collection("/todos"), options)
            .expect("sync");
        assert!(outcome.is_pending());
        assert_eq!(adapter.pending_count(), 1);

        // Ticks 1 and 2 find the socket closed.
        sleep(POLL * 2 + POLL / 2).await;
        assert!(connection.sent().is_empty());
        assert!(seen.lock().is_empty());

        // Tick 3 finds it open.
        connection.set_connected(true);
        sleep(POLL).await;

        let sent = connection.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].verb, Verb::Get);
        assert_eq!(sent[0].url, "/todos");
        assert_eq!(adapter.pending_count(), 0);

        sleep(Duration::from_millis(1)).await;
        assert_eq!(*seen.lock(), vec![json!({"verb": "get", "url": "/todos"})]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_replay_preserves_submission_order() {
        let connection = echo_connection();
        let adapter = adapter_with(&connection, SyncOptions::new());

        for url in ["/1", "/2", "/3"] {
            let outcome = adapter
                .sync("read", collection(url), CallOptions::new())
                .expect("sync");
            assert!(outcome.is_pending());
        }

        // Opened between ticks: a new call still waits behind the backlog.
        connection.set_connected(true);
        let late = adapter
            .sync("read", collection("/4"), CallOptions::new())
            .expect("sync");
        assert!(late.is_pending());

        sleep(POLL + POLL / 2).await;

        let urls: Vec<_> = connection.sent().into_iter().map(|r| r.url).collect();
        assert_eq!(urls, vec!["/1", "/2", "/3", "/4"]);

        // Each call executed exactly once.
        sleep(POLL * 4).await;
        assert_eq!(connection.sent().len(), 4);

        // With the backlog gone, calls dispatch immediately again.
        let now = adapter
            .sync("read", collection("/5"), CallOptions::new())
            .expect("sync");
        assert!(now.handle().is_some());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_call_during_last_replay_waits_its_turn() {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let connection = Arc::new(GatedConnection::new("/1", entered_tx, release_rx));
        let adapter = adapter_on(
            connection.clone(),
            SyncOptions::new().with_poll_interval(Duration::from_millis(10)),
        );

        let first = adapter
            .sync("read", collection("/1"), CallOptions::new())
            .expect("sync");
        assert!(first.is_pending());
        connection.connected.store(true, Ordering::SeqCst);

        // The poller is now inside the replay of "/1" and the queue is empty.
        tokio::task::spawn_blocking(move || entered_rx.recv_timeout(Duration::from_secs(5)))
            .await
            .expect("join")
            .expect("replay started");
        assert_eq!(adapter.pending_count(), 0);

        let second = adapter
            .sync("read", collection("/2"), CallOptions::new())
            .expect("sync");
        assert!(second.is_pending());

        release_tx.send(()).expect("release");
        timeout(Duration::from_secs(5), async {
            while connection.sent.lock().len() < 2 {
                sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("replayed in time");

        assert_eq!(*connection.sent.lock(), vec!["/1", "/2"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refused_replay_keeps_position() {
        let connection = Arc::new(RefusingConnection::new(1));
        let adapter = adapter_on(connection.clone(), SyncOptions::new().with_poll_interval(POLL));

        let failures = Arc::new(AtomicUsize::new(0));
        let failures_clone = Arc::clone(&failures);
        let options = CallOptions::new().on_error(move |_| {
            failures_clone.fetch_add(1, Ordering::SeqCst);
        });

        let _ = adapter.sync("read", collection("/1"), options).expect("queued");
        let _ = adapter
            .sync("read", collection("/2"), CallOptions::new())
            .expect("queued");
        connection.connected.store(true, Ordering::SeqCst);

        // Tick 1: healthy, but "/1" is refused and goes back to the head.
        sleep(POLL + POLL / 2).await;
        assert!(connection.sent.lock().is_empty());
        assert_eq!(adapter.pending_count(), 2);

        // Tick 2: both replay in order.
        sleep(POLL).await;
        assert_eq!(*connection.sent.lock(), vec!["/1", "/2"]);
        assert_eq!(adapter.pending_count(), 0);

        sleep(POLL * 3).await;
        assert_eq!(connection.sent.lock().len(), 2);
        assert_eq!(failures.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_strict_mode_fails_fast_when_closed() {
        let connection = echo_connection();
        let adapter = adapter_with(&connection, SyncOptions::new().with_mode(SyncMode::Strict));

        let err = adapter
            .sync("read", collection("/todos"), CallOptions::new())
            .unwrap_err();
        match &err {
            Error::NotConnected { source_slot } => assert_eq!(source_slot, "global.socket"),
            other => panic!("expected NotConnected, got {other:?}"),
        }
        assert_eq!(adapter.pending_count(), 0);

        connection.set_connected(true);
        let outcome = adapter
            .sync("read", collection("/todos"), CallOptions::new())
            .expect("sync");
        assert!(outcome.handle().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_url_is_synchronous_when_healthy() {
        let connection = echo_connection();
        connection.set_connected(true);
        let adapter = adapter_with(&connection, SyncOptions::new());

        let err = adapter
            .sync("read", Arc::new(Resource::model()), CallOptions::new())
            .unwrap_err();
        assert!(matches!(err, Error::MissingUrl));
        assert!(connection.sent().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_url_on_replay_reaches_error_callback() {
        let connection = echo_connection();
        let adapter = adapter_with(&connection, SyncOptions::new());

        let failures = Arc::new(Mutex::new(Vec::new()));
        let failures_clone = Arc::clone(&failures);
        let options =
            CallOptions::new().on_error(move |e| failures_clone.lock().push(e.to_string()));

        let _ = adapter
            .sync("read", Arc::new(Resource::model()), options)
            .expect("queued");
        let _ = adapter
            .sync("read", collection("/ok"), CallOptions::new())
            .expect("queued");

        connection.set_connected(true);
        sleep(POLL + POLL / 2).await;

        assert_eq!(failures.lock().len(), 1);
        assert!(failures.lock()[0].contains("url"));
        let urls: Vec<_> = connection.sent().into_iter().map(|r| r.url).collect();
        assert_eq!(urls, vec!["/ok"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_bounded_poller_abandons_queue() {
        let connection = echo_connection();
        let adapter = adapter_with(&connection, SyncOptions::new().with_max_poll_ticks(3));

        let abandoned = Arc::new(Mutex::new(None));
        let abandoned_clone = Arc::clone(&abandoned);
        let options = CallOptions::new().on_error(move |e| {
            if let Error::QueueAbandoned { ticks } = e {
                *abandoned_clone.lock() = Some(*ticks);
            }
        });

        let _ = adapter
            .sync("read", collection("/todos"), options)
            .expect("queued");
        sleep(POLL * 4).await;

        assert_eq!(*abandoned.lock(), Some(3));
        assert_eq!(adapter.pending_count(), 0);

        // Opening later does not resurrect the abandoned call.
        connection.set_connected(true);
        sleep(POLL * 2).await;
        assert!(connection.sent().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_request_event_emitted_on_dispatch() {
        let connection = echo_connection();
        connection.set_connected(true);
        let adapter = adapter_with(&connection, SyncOptions::new());

        let todo = Arc::new(
            Resource::model()
                .with_url("/todos/42")
                .with_attribute("id", json!(42)),
        );
        let events = Arc::new(Mutex::new(Vec::new()));
        let events_clone = Arc::clone(&events);
        todo.events().on(REQUEST_EVENT, move |event: &TargetEvent| {
            let TargetEvent::Request(request) = event;
            events_clone
                .lock()
                .push((request.handle.url().to_string(), request.options.patch));
        });

        let mut attrs = Map::new();
        attrs.insert("done".into(), json!(true));
        let outcome = adapter
            .sync(
                "patch",
                todo.clone(),
                CallOptions::new().with_patch().with_attrs(attrs),
            )
            .expect("sync");

        assert!(outcome.handle().is_some());
        assert_eq!(*events.lock(), vec![("/todos/42".to_string(), true)]);

        let sent = connection.sent();
        assert_eq!(sent[0].verb.as_str(), "patch");
        assert_eq!(Value::Object(sent[0].payload.clone()), json!({"done": true, "id": 42}));
    }

    #[tokio::test(start_paused = true)]
    async fn test_push_messages_reach_bus_once() {
        let connection = echo_connection();
        connection.set_connected(true);
        let adapter = adapter_with(&connection, SyncOptions::new());

        let comets = Arc::new(Mutex::new(Vec::new()));
        let comets_clone = Arc::clone(&comets);
        adapter
            .bus()
            .on(COMET_CHANNEL, move |m: &Value| comets_clone.lock().push(m.clone()));

        for _ in 0..3 {
            let _ = adapter
                .sync("read", collection("/todos"), CallOptions::new())
                .expect("sync");
        }

        assert_eq!(connection.handler_count(INBOUND_EVENT), 1);
        connection.push(INBOUND_EVENT, json!({"verb": "destroy", "id": 1}));
        assert_eq!(*comets.lock(), vec![json!({"verb": "destroy", "id": 1})]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_acquisition_loop_is_bounded() {
        let registry = Arc::new(SlotRegistry::new());
        let adapter = SyncAdapter::builder()
            .registry(Arc::clone(&registry))
            .build()
            .expect("adapter");

        // 250ms, then 1500ms apart: attempts at 250, 1750, 3250.
        sleep(Duration::from_secs(10)).await;
        assert_eq!(adapter.acquire_attempts(), 3);
        assert!(!adapter.is_located());

        // A call still locates on demand after the loop gave up.
        registry.publish("adapter.socket", Arc::new(LoopbackConnection::new()));
        let outcome = adapter
            .sync("read", collection("/todos"), CallOptions::new())
            .expect("sync");
        assert!(outcome.is_pending());
        assert_eq!(adapter.connection_source().as_deref(), Some("adapter.socket"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_acquisition_loop_stops_once_located() {
        let registry = Arc::new(SlotRegistry::new());
        let adapter = SyncAdapter::builder()
            .registry(Arc::clone(&registry))
            .build()
            .expect("adapter");

        sleep(Duration::from_millis(500)).await;
        assert_eq!(adapter.acquire_attempts(), 1);

        registry.publish("global.socket", Arc::new(LoopbackConnection::new()));
        sleep(Duration::from_secs(10)).await;

        assert_eq!(adapter.acquire_attempts(), 2);
        assert!(adapter.is_located());
        assert!(!adapter.is_healthy());
    }
}
