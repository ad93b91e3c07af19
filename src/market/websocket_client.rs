//! Generic WebSocket client for exchange push streams.
//!
//! Lifecycle: `Disconnected -> Connecting -> Subscribing -> Streaming`, then
//! `Reconnecting -> Connecting -> ...` after each transport failure, until
//! `close` moves the client to the terminal `Closed` state.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use parking_lot::RwLock;
use tokio::net::TcpStream;
use tokio::sync::{Mutex, watch};
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::config::StreamConfig;
use crate::error::StreamError;
use crate::market::codec::{self, Frame, PONG_TEXT};
use crate::market::dispatcher::{Dispatcher, PriceCallback};
use crate::market::message_parser::MessageParser;
use crate::market::stats::{ClientStats, StatsSnapshot};
use crate::market::subscription::build_requests;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Subscribing,
    Streaming,
    Reconnecting,
    Closed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Subscribing => "subscribing",
            ConnectionState::Streaming => "streaming",
            ConnectionState::Reconnecting => "reconnecting",
            ConnectionState::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Write half of one dialed connection. Replaced, never reused, on reconnect.
struct Connection {
    generation: u64,
    sink: Mutex<WsSink>,
}

impl Connection {
    async fn send_text(&self, text: String) -> Result<(), tungstenite::Error> {
        self.sink.lock().await.send(Message::Text(text.into())).await
    }

    async fn close(&self) -> Result<(), tungstenite::Error> {
        match self.sink.lock().await.close().await {
            Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => Ok(()),
            other => other,
        }
    }
}

enum ReadOutcome {
    Shutdown,
    Failed(String),
}

/// State shared between the facade and the background read task.
struct Session<P: MessageParser> {
    parser: P,
    config: StreamConfig,
    dispatcher: Dispatcher,
    stats: Arc<ClientStats>,
    // At most one live connection. Readers clone the Arc; swap and close
    // take the write lock.
    slot: RwLock<Option<Arc<Connection>>>,
    generation: AtomicU64,
    shutdown: CancellationToken,
    state: watch::Sender<ConnectionState>,
}

impl<P: MessageParser> Session<P> {
    fn name(&self) -> &'static str {
        self.parser.name()
    }

    fn endpoint(&self) -> &str {
        self.config
            .endpoint
            .as_deref()
            .unwrap_or_else(|| self.parser.endpoint())
    }

    /// Moves to `next` unless the client is already closed.
    fn transition(&self, next: ConnectionState) {
        self.state.send_if_modified(|state| {
            if *state == ConnectionState::Closed || *state == next {
                return false;
            }
            trace!(from = %state, to = %next, "[{}] state change", self.parser.name());
            *state = next;
            true
        });
    }

    fn current(&self) -> Option<Arc<Connection>> {
        self.slot.read().clone()
    }

    /// Publishes a freshly dialed connection. Refuses once shutdown is
    /// requested, so `close` never races a reconnect into a live handle.
    fn publish(&self, sink: WsSink) -> Option<u64> {
        let mut slot = self.slot.write();
        if self.shutdown.is_cancelled() {
            return None;
        }
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *slot = Some(Arc::new(Connection {
            generation,
            sink: Mutex::new(sink),
        }));
        Some(generation)
    }

    /// Takes the live connection out of the slot and closes it.
    async fn retire(&self) {
        let taken = self.slot.write().take();
        if let Some(conn) = taken {
            if let Err(e) = conn.close().await {
                debug!(generation = conn.generation, "[{}] close after failure: {}", self.name(), e);
            }
        }
    }

    /// Dials, publishes the connection and subscribes every channel.
    async fn establish(&self) -> Result<WsSource, StreamError> {
        self.transition(ConnectionState::Connecting);
        let endpoint = self.endpoint();
        info!("[{}] Connecting to {}...", self.name(), endpoint);

        let (ws_stream, _response) = connect_async(endpoint).await.map_err(StreamError::Dial)?;
        let (sink, source) = ws_stream.split();
        let generation = self.publish(sink).ok_or(StreamError::Closed)?;
        info!(generation, "[{}] Connected", self.name());

        self.transition(ConnectionState::Subscribing);
        if let Err(e) = self.subscribe_all().await {
            self.retire().await;
            return Err(e);
        }

        Ok(source)
    }

    /// Sends one subscribe request per channel, in order, pausing between
    /// sends but not after the last. The first failure stops the sequence.
    /// A `close` during the pause surfaces as `Closed`; `ConnectionUnavailable`
    /// means the slot was emptied without a shutdown.
    async fn subscribe_all(&self) -> Result<(), StreamError> {
        let requests = build_requests(&self.config.channels);
        let total = requests.len();

        for (i, request) in requests.iter().enumerate() {
            let msg = self.parser.format_subscribe(request)?;
            let conn = self.current().ok_or(StreamError::ConnectionUnavailable)?;
            conn.send_text(msg).await.map_err(StreamError::Send)?;
            info!("[{}] Subscribed to {} ({}/{})", self.name(), request.channel, i + 1, total);

            if i + 1 < total {
                tokio::select! {
                    _ = self.shutdown.cancelled() => return Err(StreamError::Closed),
                    _ = tokio::time::sleep(self.config.subscribe_delay) => {}
                }
            }
        }

        Ok(())
    }

    /// Owns the read half for as long as the session streams. On a read
    /// failure it retires the connection, waits the fixed backoff and runs
    /// the full connect sequence again. A failed reconnect is logged and
    /// leaves the client `Disconnected`.
    async fn supervise(self: Arc<Self>, first: WsSource) {
        let mut source = first;

        loop {
            let reason = match self.read_loop(source).await {
                ReadOutcome::Shutdown => break,
                ReadOutcome::Failed(reason) => reason,
            };
            if self.shutdown.is_cancelled() {
                break;
            }

            warn!("[{}] WebSocket read error: {}", self.name(), reason);
            self.transition(ConnectionState::Reconnecting);
            self.stats.record_reconnect();
            self.retire().await;

            info!(
                delay = ?self.config.reconnect_delay,
                "[{}] Attempting WebSocket reconnection...",
                self.name()
            );
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = tokio::time::sleep(self.config.reconnect_delay) => {}
            }

            match self.establish().await {
                Ok(next) => {
                    self.transition(ConnectionState::Streaming);
                    info!("[{}] Reconnected successfully", self.name());
                    source = next;
                }
                Err(_) if self.shutdown.is_cancelled() => break,
                Err(e) => {
                    warn!("[{}] Reconnection failed: {}", self.name(), e);
                    self.transition(ConnectionState::Disconnected);
                    break;
                }
            }
        }

        debug!("[{}] Read task ended", self.name());
    }

    async fn read_loop(&self, mut source: WsSource) -> ReadOutcome {
        loop {
            if self.shutdown.is_cancelled() {
                return ReadOutcome::Shutdown;
            }

            // Dropping `source` on shutdown releases the socket, which is
            // what interrupts a pending read.
            let next = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => return ReadOutcome::Shutdown,
                next = source.next() => next,
            };

            match next {
                Some(Ok(Message::Binary(data))) => self.handle_frame(&data).await,
                Some(Ok(Message::Text(text))) => self.handle_frame(text.as_bytes()).await,
                Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_))) => {
                    // transport-level; tungstenite answers pings itself
                }
                Some(Ok(Message::Close(frame))) => {
                    return ReadOutcome::Failed(format!("connection closed by peer: {frame:?}"));
                }
                Some(Err(e)) => return ReadOutcome::Failed(e.to_string()),
                None => return ReadOutcome::Failed("stream ended".to_string()),
            }
        }
    }

    async fn handle_frame(&self, raw: &[u8]) {
        self.stats.record_frame();

        match codec::decode_frame(raw) {
            Ok(Frame::Ping) => self.send_pong().await,
            Ok(Frame::Pong) => trace!("[{}] Pong received", self.name()),
            Ok(Frame::Data(payload)) => match self.parser.parse_message(&payload) {
                Ok(frame) => {
                    self.dispatcher.dispatch(&frame);
                }
                Err(e) => {
                    self.stats.record_payload_failure();
                    warn!("[{}] JSON decode failed: {}", self.name(), e);
                }
            },
            Err(e) => {
                self.stats.record_codec_failure();
                warn!("[{}] {}", self.name(), e);
            }
        }
    }

    /// Best effort: a failed write is logged and otherwise ignored.
    async fn send_pong(&self) {
        let Some(conn) = self.current() else {
            return;
        };
        match conn.send_text(PONG_TEXT.to_string()).await {
            Ok(()) => {
                self.stats.record_ping_answered();
                trace!(generation = conn.generation, "[{}] Ping answered", self.name());
            }
            Err(e) => debug!("[{}] Pong not sent: {}", self.name(), e),
        }
    }
}

/// Streaming client over one exchange push endpoint.
///
/// `connect` returns once the initial dial and subscriptions are done;
/// reading, heartbeats and reconnects run on a background task. The price
/// callback runs on that task too, so a slow callback delays `Pong` replies.
///
/// Dropping the client requests shutdown like `close` does, without
/// waiting for the socket to close.
pub struct WebSocketClient<P: MessageParser> {
    session: Arc<Session<P>>,
}

impl<P: MessageParser> WebSocketClient<P> {
    /// Builds the client. No network I/O happens until [`connect`](Self::connect).
    pub fn new(parser: P, config: StreamConfig, callback: Option<PriceCallback>) -> Self {
        let stats = Arc::new(ClientStats::default());
        let (state, _) = watch::channel(ConnectionState::Disconnected);

        Self {
            session: Arc::new(Session {
                parser,
                config,
                dispatcher: Dispatcher::new(callback, Arc::clone(&stats)),
                stats,
                slot: RwLock::new(None),
                generation: AtomicU64::new(0),
                shutdown: CancellationToken::new(),
                state,
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.session.name()
    }

    pub fn endpoint(&self) -> &str {
        self.session.endpoint()
    }

    pub fn channels(&self) -> &[String] {
        &self.session.config.channels
    }

    pub fn state(&self) -> ConnectionState {
        *self.session.state.borrow()
    }

    /// Receiver that observes every lifecycle transition.
    pub fn state_changes(&self) -> watch::Receiver<ConnectionState> {
        self.session.state.subscribe()
    }

    /// True while a transport handle is published.
    pub fn is_connected(&self) -> bool {
        self.session.current().is_some()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.session
            .stats
            .snapshot(self.session.generation.load(Ordering::SeqCst))
    }

    /// Dials the endpoint, subscribes every channel and starts streaming.
    ///
    /// Only valid while `Disconnected`; a closed client cannot reconnect.
    pub async fn connect(&self) -> Result<(), StreamError> {
        let session = &self.session;

        let mut claimed = false;
        session.state.send_if_modified(|state| {
            if *state == ConnectionState::Disconnected {
                *state = ConnectionState::Connecting;
                claimed = true;
            }
            claimed
        });

        if !claimed {
            return Err(match self.state() {
                ConnectionState::Closed => StreamError::Closed,
                other => StreamError::InvalidState(other),
            });
        }

        match session.establish().await {
            Ok(source) => {
                session.transition(ConnectionState::Streaming);
                tokio::spawn(Arc::clone(session).supervise(source));
                Ok(())
            }
            Err(e) => {
                session.transition(ConnectionState::Disconnected);
                Err(e)
            }
        }
    }

    /// Stops streaming for good and closes the live connection, if any.
    /// Safe to call more than once.
    pub async fn close(&self) -> Result<(), StreamError> {
        let session = &self.session;
        session.shutdown.cancel();
        session.state.send_if_modified(|state| {
            if *state == ConnectionState::Closed {
                return false;
            }
            *state = ConnectionState::Closed;
            true
        });

        let taken = session.slot.write().take();
        if let Some(conn) = taken {
            conn.close().await.map_err(StreamError::Send)?;
            info!(generation = conn.generation, "[{}] WebSocket closed", self.name());
        }

        Ok(())
    }
}

impl<P: MessageParser> Drop for WebSocketClient<P> {
    fn drop(&mut self) {
        self.session.shutdown.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::providers::bingx::{BINGX_SWAP_WSS_ENDPOINT, BingxParser};

    fn client(config: StreamConfig) -> WebSocketClient<BingxParser> {
        WebSocketClient::new(BingxParser::new(), config, None)
    }

    async fn unused_endpoint() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("ws://{addr}")
    }

    #[test]
    fn test_new_is_idle() {
        let client = client(StreamConfig::new(["BTC-USDT@trade", "ETH-USDT@trade"]));

        assert_eq!(client.state(), ConnectionState::Disconnected);
        assert!(!client.is_connected());
        assert_eq!(client.endpoint(), BINGX_SWAP_WSS_ENDPOINT);
        assert_eq!(client.channels(), ["BTC-USDT@trade", "ETH-USDT@trade"]);
        assert_eq!(client.stats(), StatsSnapshot::default());
    }

    #[test]
    fn test_endpoint_override() {
        let client = client(StreamConfig::new(["BTC-USDT@trade"]).with_endpoint("ws://localhost:1"));
        assert_eq!(client.endpoint(), "ws://localhost:1");
    }

    #[test]
    fn test_state_display() {
        assert_eq!(ConnectionState::Reconnecting.to_string(), "reconnecting");
        assert_eq!(
            StreamError::InvalidState(ConnectionState::Streaming).to_string(),
            "cannot connect while streaming"
        );
    }

    #[tokio::test]
    async fn test_close_before_connect() {
        let client = client(StreamConfig::new(["BTC-USDT@trade"]));

        client.close().await.unwrap();
        client.close().await.unwrap();

        assert_eq!(client.state(), ConnectionState::Closed);
        assert!(matches!(client.connect().await, Err(StreamError::Closed)));
        assert!(!client.is_connected());
    }

    #[tokio::test]
    async fn test_dial_failure_returns_to_disconnected() {
        let endpoint = unused_endpoint().await;
        let client = client(StreamConfig::new(["BTC-USDT@trade"]).with_endpoint(endpoint));

        assert!(matches!(client.connect().await, Err(StreamError::Dial(_))));
        assert_eq!(client.state(), ConnectionState::Disconnected);

        // still connectable after a failed dial
        assert!(matches!(client.connect().await, Err(StreamError::Dial(_))));
        assert_eq!(client.stats().generation, 0);
    }
}
