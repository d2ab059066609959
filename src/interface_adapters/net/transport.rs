// Reconnecting transport: owns the single logical connection to the server,
// decodes inbound frames and reconnects after a fixed backoff forever.

use crate::domain::{ConnectionStatus, TransportEvent};
use crate::interface_adapters::protocol::decode_message;
use crate::interface_adapters::utils::LogThrottle;
use crate::use_cases::SpectatorEvent;
use async_trait::async_trait;
use std::{sync::Arc, time::Duration};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};
use url::Url;

/// One inbound frame as seen above the WebSocket layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Text(String),
    Binary(Vec<u8>),
    Close,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    Connect(String),
    Receive(String),
    Protocol(String),
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportError::Connect(err) => write!(f, "connect failed: {err}"),
            TransportError::Receive(err) => write!(f, "receive failed: {err}"),
            TransportError::Protocol(err) => write!(f, "protocol error: {err}"),
        }
    }
}

impl std::error::Error for TransportError {}

/// An open connection yielding frames until it ends (`None`).
#[async_trait]
pub trait FrameSource: Send {
    async fn next_frame(&mut self) -> Option<Result<Frame, TransportError>>;
    async fn close(&mut self);
}

/// Port for opening connections to the spectate endpoint.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, endpoint: &Url) -> Result<Box<dyn FrameSource>, TransportError>;
}

/// Receives every connection status transition.
pub trait StatusObserver: Send + Sync {
    fn on_status(&self, status: ConnectionStatus);
}

impl StatusObserver for watch::Sender<ConnectionStatus> {
    fn on_status(&self, status: ConnectionStatus) {
        self.send_replace(status);
    }
}

/// A single pending reconnect. Dropping or cancelling it aborts the timer.
pub struct ScheduledRetry {
    timer: JoinHandle<()>,
    fired: oneshot::Receiver<()>,
}

impl ScheduledRetry {
    pub fn schedule(delay: Duration) -> Self {
        let (tx, fired) = oneshot::channel();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(());
        });
        Self { timer, fired }
    }

    pub fn cancel(&mut self) {
        self.timer.abort();
    }

    /// Resolves when the delay elapses (`true`) or the retry was cancelled (`false`).
    pub async fn fired(&mut self) -> bool {
        (&mut self.fired).await.is_ok()
    }
}

impl Drop for ScheduledRetry {
    fn drop(&mut self) {
        self.timer.abort();
    }
}

enum SessionEnd {
    // Connection ended; schedule the next attempt.
    Closed,
    Shutdown,
    // Event receiver dropped; nobody is left to consume frames.
    ConsumerGone,
}

enum Step {
    Frame(Option<Result<Frame, TransportError>>),
    Shutdown,
}

// Outcome of handing one text frame to the consumer.
enum Forwarded {
    Continue,
    ConsumerGone,
    Shutdown,
}

pub struct ReconnectingTransport {
    connector: Arc<dyn Connector>,
    endpoint: Url,
    backoff: Duration,
    observer: Box<dyn StatusObserver>,
    status: ConnectionStatus,
    decode_log: LogThrottle,
    binary_log: LogThrottle,
}

impl ReconnectingTransport {
    pub fn new(
        connector: Arc<dyn Connector>,
        endpoint: Url,
        backoff: Duration,
        observer: impl StatusObserver + 'static,
    ) -> Self {
        let status = ConnectionStatus::Connecting;
        observer.on_status(status);
        Self {
            connector,
            endpoint,
            backoff,
            observer: Box::new(observer),
            status,
            decode_log: LogThrottle::default(),
            binary_log: LogThrottle::default(),
        }
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    /// Starts the connect/reconnect loop on its own task.
    pub fn spawn(self, events: mpsc::Sender<SpectatorEvent>) -> TransportHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(self.run(events, shutdown_rx));
        TransportHandle {
            shutdown: shutdown_tx,
            task,
        }
    }

    pub async fn run(
        mut self,
        events: mpsc::Sender<SpectatorEvent>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        loop {
            self.transition(TransportEvent::Attempt);

            match self.connect_and_pump(&events, &mut shutdown).await {
                SessionEnd::Closed => {}
                SessionEnd::Shutdown => {
                    self.transition(TransportEvent::Closed);
                    info!(endpoint = %self.endpoint, "transport shut down");
                    return;
                }
                SessionEnd::ConsumerGone => {
                    self.transition(TransportEvent::Closed);
                    info!("event consumer dropped; transport exiting");
                    return;
                }
            }

            debug!(backoff_ms = self.backoff.as_millis() as u64, "reconnect scheduled");
            let mut retry = ScheduledRetry::schedule(self.backoff);
            let cancelled = tokio::select! {
                biased;
                _ = wait_for_shutdown(&mut shutdown) => true,
                fired = retry.fired() => !fired,
            };
            if cancelled {
                retry.cancel();
                info!(endpoint = %self.endpoint, "transport shut down");
                return;
            }
        }
    }

    async fn connect_and_pump(
        &mut self,
        events: &mpsc::Sender<SpectatorEvent>,
        shutdown: &mut watch::Receiver<bool>,
    ) -> SessionEnd {
        let connected = tokio::select! {
            biased;
            _ = wait_for_shutdown(shutdown) => return SessionEnd::Shutdown,
            result = self.connector.connect(&self.endpoint) => result,
        };

        let mut source = match connected {
            Ok(source) => source,
            Err(error) => {
                warn!(endpoint = %self.endpoint, %error, "connection attempt failed");
                // A failed attempt is an error that funnels into close.
                self.transition(TransportEvent::Failed);
                self.transition(TransportEvent::Closed);
                return SessionEnd::Closed;
            }
        };

        self.transition(TransportEvent::Opened);
        info!(endpoint = %self.endpoint, "spectator connected");

        loop {
            let step = tokio::select! {
                biased;
                _ = wait_for_shutdown(shutdown) => Step::Shutdown,
                frame = source.next_frame() => Step::Frame(frame),
            };

            match step {
                Step::Shutdown => {
                    source.close().await;
                    return SessionEnd::Shutdown;
                }
                Step::Frame(Some(Ok(Frame::Text(text)))) => {
                    match self.forward(&text, events, shutdown).await {
                        Forwarded::Continue => {}
                        Forwarded::ConsumerGone => {
                            source.close().await;
                            return SessionEnd::ConsumerGone;
                        }
                        Forwarded::Shutdown => {
                            source.close().await;
                            return SessionEnd::Shutdown;
                        }
                    }
                }
                Step::Frame(Some(Ok(Frame::Binary(bytes)))) => {
                    if self.binary_log.should_log() {
                        warn!(len = bytes.len(), "binary frame ignored");
                    }
                }
                Step::Frame(Some(Ok(Frame::Close))) | Step::Frame(None) => {
                    info!(endpoint = %self.endpoint, "connection closed");
                    break;
                }
                Step::Frame(Some(Err(error))) => {
                    warn!(endpoint = %self.endpoint, %error, "connection error");
                    self.transition(TransportEvent::Failed);
                    source.close().await;
                    break;
                }
            }
        }

        self.transition(TransportEvent::Closed);
        SessionEnd::Closed
    }

    // A full event channel must not hold off a shutdown request.
    async fn forward(
        &mut self,
        text: &str,
        events: &mpsc::Sender<SpectatorEvent>,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Forwarded {
        match decode_message(text) {
            Ok(Some(event)) => tokio::select! {
                biased;
                _ = wait_for_shutdown(shutdown) => Forwarded::Shutdown,
                sent = events.send(event) => match sent {
                    Ok(()) => Forwarded::Continue,
                    Err(_) => Forwarded::ConsumerGone,
                },
            },
            Ok(None) => {
                trace!("ignoring message of unconsumed kind");
                Forwarded::Continue
            }
            Err(error) => {
                if self.decode_log.should_log() {
                    warn!(%error, "dropping undecodable frame");
                }
                Forwarded::Continue
            }
        }
    }

    fn transition(&mut self, event: TransportEvent) {
        let next = self.status.on(event);
        if next == self.status {
            return;
        }
        debug!(from = ?self.status, to = ?next, "connection status changed");
        self.status = next;
        self.observer.on_status(next);
    }
}

// Resolves once shutdown was requested. A dropped handle never requests it.
async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow_and_update() {
            return;
        }
        if shutdown.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Handle to a spawned transport task.
pub struct TransportHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl TransportHandle {
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Closes the live connection, cancels any pending retry and waits for the task.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        if let Err(error) = self.task.await {
            warn!(%error, "transport task failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ConnectionStatus::{Connected, Connecting, Disconnected, Error};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tokio::time::Instant;

    const BACKOFF: Duration = Duration::from_secs(1);

    enum ScriptStep {
        Frame(Frame),
        Error,
    }

    enum Attempt {
        Refuse,
        Accept(Vec<ScriptStep>),
    }

    #[derive(Clone, Default)]
    struct Recorder {
        statuses: Arc<Mutex<Vec<ConnectionStatus>>>,
        connects: Arc<Mutex<Vec<Instant>>>,
        closes: Arc<Mutex<usize>>,
    }

    impl Recorder {
        fn statuses(&self) -> Vec<ConnectionStatus> {
            self.statuses.lock().expect("statuses lock").clone()
        }

        fn connects(&self) -> Vec<Instant> {
            self.connects.lock().expect("connects lock").clone()
        }

        fn closes(&self) -> usize {
            *self.closes.lock().expect("closes lock")
        }
    }

    impl StatusObserver for Recorder {
        fn on_status(&self, status: ConnectionStatus) {
            self.statuses.lock().expect("statuses lock").push(status);
        }
    }

    struct ScriptedConnector {
        attempts: Mutex<VecDeque<Attempt>>,
        seen: Recorder,
    }

    struct ScriptedSource {
        steps: VecDeque<ScriptStep>,
        seen: Recorder,
    }

    #[async_trait]
    impl Connector for ScriptedConnector {
        async fn connect(&self, _endpoint: &Url) -> Result<Box<dyn FrameSource>, TransportError> {
            self.seen
                .connects
                .lock()
                .expect("connects lock")
                .push(Instant::now());
            let attempt = self.attempts.lock().expect("attempts lock").pop_front();
            match attempt {
                Some(Attempt::Accept(steps)) => Ok(Box::new(ScriptedSource {
                    steps: steps.into(),
                    seen: self.seen.clone(),
                })),
                Some(Attempt::Refuse) => Err(TransportError::Connect("refused".to_string())),
                // Script exhausted: keep the test in a stable state.
                None => std::future::pending().await,
            }
        }
    }

    #[async_trait]
    impl FrameSource for ScriptedSource {
        async fn next_frame(&mut self) -> Option<Result<Frame, TransportError>> {
            match self.steps.pop_front() {
                Some(ScriptStep::Frame(frame)) => Some(Ok(frame)),
                Some(ScriptStep::Error) => Some(Err(TransportError::Receive("reset".to_string()))),
                None => std::future::pending().await,
            }
        }

        async fn close(&mut self) {
            *self.seen.closes.lock().expect("closes lock") += 1;
        }
    }

    fn transport(attempts: Vec<Attempt>) -> (ReconnectingTransport, Recorder) {
        let seen = Recorder::default();
        let connector = ScriptedConnector {
            attempts: Mutex::new(attempts.into()),
            seen: seen.clone(),
        };
        let endpoint = Url::parse("ws://127.0.0.1:3000/spectate").expect("endpoint");
        let transport =
            ReconnectingTransport::new(Arc::new(connector), endpoint, BACKOFF, seen.clone());
        (transport, seen)
    }

    fn text(raw: &str) -> ScriptStep {
        ScriptStep::Frame(Frame::Text(raw.to_string()))
    }

    async fn wait_until(mut done: impl FnMut() -> bool) {
        for _ in 0..1000 {
            if done() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("condition not reached");
    }

    fn assert_backoff(gap: Duration) {
        assert!(
            gap >= BACKOFF && gap < BACKOFF + Duration::from_millis(5),
            "unexpected reconnect gap {gap:?}"
        );
    }

    #[test]
    fn when_transport_is_constructed_then_status_is_connecting() {
        let (transport, seen) = transport(vec![]);
        assert_eq!(transport.status(), Connecting);
        assert_eq!(seen.statuses(), vec![Connecting]);
    }

    #[tokio::test(start_paused = true)]
    async fn when_frames_arrive_then_consumed_kinds_are_forwarded_in_order() {
        let (transport, seen) = transport(vec![Attempt::Accept(vec![
            text(r#"{"e":"teamnames","data":{"1":"Alpha"}}"#),
            text("{broken"),
            ScriptStep::Frame(Frame::Binary(vec![1, 2, 3])),
            text(r#"{"e":"pong","data":null}"#),
            text(r#"{"e":"state","data":{"bounds":[10,10]}}"#),
        ])]);
        let (tx, mut rx) = mpsc::channel(16);
        let handle = transport.spawn(tx);

        let first = rx.recv().await.expect("team names");
        let second = rx.recv().await.expect("state");
        assert!(matches!(first, SpectatorEvent::TeamNames(_)));
        assert!(matches!(second, SpectatorEvent::State(_)));
        assert_eq!(seen.statuses(), vec![Connecting, Connected]);

        handle.shutdown().await;
        assert_eq!(seen.closes(), 1);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn when_server_closes_then_reconnect_happens_after_backoff() {
        let (transport, seen) = transport(vec![
            Attempt::Accept(vec![ScriptStep::Frame(Frame::Close)]),
            Attempt::Accept(vec![]),
        ]);
        let (tx, _rx) = mpsc::channel(16);
        let handle = transport.spawn(tx);

        wait_until(|| seen.connects().len() == 2).await;
        wait_until(|| seen.statuses().last() == Some(&Connected)).await;

        let connects = seen.connects();
        assert_backoff(connects[1] - connects[0]);
        assert_eq!(
            seen.statuses(),
            vec![Connecting, Connected, Disconnected, Connecting, Connected]
        );
        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn when_stream_errors_then_error_funnels_into_close() {
        let (transport, seen) = transport(vec![
            Attempt::Accept(vec![ScriptStep::Error]),
            Attempt::Accept(vec![]),
        ]);
        let (tx, _rx) = mpsc::channel(16);
        let handle = transport.spawn(tx);

        wait_until(|| seen.connects().len() == 2).await;

        assert_eq!(seen.closes(), 1);
        assert_eq!(
            &seen.statuses()[..4],
            &[Connecting, Connected, Error, Disconnected]
        );
        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn when_failures_repeat_then_status_recovers_within_one_backoff() {
        let (transport, seen) = transport(vec![
            Attempt::Refuse,
            Attempt::Accept(vec![ScriptStep::Error]),
            Attempt::Refuse,
            Attempt::Accept(vec![ScriptStep::Frame(Frame::Close)]),
            Attempt::Accept(vec![]),
        ]);
        let (tx, _rx) = mpsc::channel(16);
        let handle = transport.spawn(tx);

        wait_until(|| seen.connects().len() == 5).await;
        wait_until(|| seen.statuses().last() == Some(&Connected)).await;

        let connects = seen.connects();
        for pair in connects.windows(2) {
            assert_backoff(pair[1] - pair[0]);
        }
        let statuses = seen.statuses();
        assert_eq!(
            &statuses[..4],
            &[Connecting, Error, Disconnected, Connecting]
        );
        assert_eq!(statuses.iter().filter(|s| **s == Connected).count(), 3);
        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn when_shutdown_during_backoff_then_no_further_attempt_is_made() {
        let (transport, seen) = transport(vec![Attempt::Refuse, Attempt::Accept(vec![])]);
        let (tx, _rx) = mpsc::channel(16);
        let handle = transport.spawn(tx);

        wait_until(|| seen.statuses().last() == Some(&Disconnected)).await;
        handle.shutdown().await;
        tokio::time::sleep(BACKOFF * 3).await;

        assert_eq!(seen.connects().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn when_event_receiver_is_dropped_then_transport_exits() {
        let (transport, seen) = transport(vec![Attempt::Accept(vec![text(
            r#"{"e":"state","data":{"bounds":[10,10]}}"#,
        )])]);
        let (tx, rx) = mpsc::channel(16);
        drop(rx);
        let handle = transport.spawn(tx);

        wait_until(|| handle.is_finished()).await;

        assert_eq!(seen.closes(), 1);
        assert_eq!(seen.statuses().last(), Some(&Disconnected));
    }

    #[tokio::test(start_paused = true)]
    async fn when_consumer_stalls_then_shutdown_still_completes() {
        let state = r#"{"e":"state","data":{"bounds":[10,10]}}"#;
        let (transport, seen) = transport(vec![Attempt::Accept(vec![
            text(state),
            text(state),
            text(state),
        ])]);
        // Room for one event; the receiver is kept alive but never read.
        let (tx, rx) = mpsc::channel(1);
        let handle = transport.spawn(tx);

        wait_until(|| rx.len() == 1).await;
        tokio::time::sleep(Duration::from_millis(50)).await;

        tokio::time::timeout(BACKOFF, handle.shutdown())
            .await
            .expect("shutdown should not wait for the consumer");
        assert_eq!(seen.closes(), 1);
        assert_eq!(seen.statuses().last(), Some(&Disconnected));
        assert_eq!(rx.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn when_retry_is_cancelled_then_it_never_fires() {
        let mut retry = ScheduledRetry::schedule(BACKOFF);
        retry.cancel();
        assert!(!retry.fired().await);

        let mut retry = ScheduledRetry::schedule(BACKOFF);
        let started = Instant::now();
        assert!(retry.fired().await);
        assert_backoff(started.elapsed());
    }
}
