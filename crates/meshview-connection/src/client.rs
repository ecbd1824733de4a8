//! Reconnecting duplex-message client.
//!
//! One owning task drives the whole lifecycle: connect, pump events,
//! disconnect, wait out the reconnect delay, connect again. Because the
//! sequence is strictly serial there is never more than one live transport
//! handle or more than one pending reconnect delay, and a reconnect cannot
//! race a live connection.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};

use crate::message::InboundMessage;
use crate::transport::{Connector, TransportEvent};
use crate::ws::WsConnector;

pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(5000);

const STATUS_DISCONNECTED: &str = "Disconnected";
const STATUS_CONNECTED: &str = "Connected";
const STATUS_CONNECTION_ERROR: &str = "Connection error";
const STATUS_SEND_FAILED: &str = "Send failed: not connected";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    /// Transient: entered on a transport error signal, always followed by
    /// the transport's own close signal.
    Error,
}

struct Shared {
    state: ConnectionState,
    status: String,
    last_response_size: Option<usize>,
    outbound: Option<mpsc::UnboundedSender<String>>,
}

impl Shared {
    fn new() -> Self {
        Self {
            state: ConnectionState::Disconnected,
            status: STATUS_DISCONNECTED.to_owned(),
            last_response_size: None,
            outbound: None,
        }
    }
}

/// Handle to a running connection. Failures never surface as errors here;
/// they are observable only through `state()`/`status()` while the client
/// recovers on its own.
pub struct SocketClient {
    shared: Arc<Mutex<Shared>>,
    shutdown_tx: watch::Sender<bool>,
    task: Option<tokio::task::JoinHandle<()>>,
}

impl SocketClient {
    /// Connect to `url` over WebSocket with the default reconnect delay.
    pub fn connect(url: &str) -> (Self, mpsc::UnboundedReceiver<InboundMessage>) {
        Self::connect_with(url, DEFAULT_RECONNECT_DELAY, WsConnector)
    }

    pub fn connect_with<C: Connector>(
        url: &str,
        reconnect_delay: Duration,
        connector: C,
    ) -> (Self, mpsc::UnboundedReceiver<InboundMessage>) {
        let shared = Arc::new(Mutex::new(Shared::new()));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();

        let task = tokio::spawn(run(
            connector,
            url.to_owned(),
            reconnect_delay,
            shared.clone(),
            inbound_tx,
            shutdown_rx,
        ));

        (
            Self {
                shared,
                shutdown_tx,
                task: Some(task),
            },
            inbound_rx,
        )
    }

    pub fn state(&self) -> ConnectionState {
        self.shared.lock().state
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    pub fn status(&self) -> String {
        self.shared.lock().status.clone()
    }

    pub fn last_response_size(&self) -> Option<usize> {
        self.shared.lock().last_response_size
    }

    /// Forward `message` when connected. Never fails; a send attempt while
    /// not connected only flips the status string.
    pub fn send(&self, message: &str) {
        let mut shared = self.shared.lock();
        if shared.state == ConnectionState::Connected {
            if let Some(outbound) = &shared.outbound {
                log::debug!("Sending message: {message}");
                let _ = outbound.send(message.to_owned());
                return;
            }
        }
        log::error!("WebSocket is not connected");
        shared.status = STATUS_SEND_FAILED.to_owned();
    }

    /// Terminal teardown: cancels any pending reconnect and closes the
    /// live transport. The client is not reusable afterwards.
    pub async fn shutdown(mut self) {
        let _ = self.shutdown_tx.send(true);
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for SocketClient {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(true);
    }
}

async fn run<C: Connector>(
    connector: C,
    url: String,
    reconnect_delay: Duration,
    shared: Arc<Mutex<Shared>>,
    inbound_tx: mpsc::UnboundedSender<InboundMessage>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    loop {
        let mut handle = connector.connect(&url);
        {
            let mut shared = shared.lock();
            shared.state = ConnectionState::Connecting;
            shared.outbound = Some(handle.outbound.clone());
        }

        loop {
            tokio::select! {
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        drop(handle);
                        finish_disconnect(&shared);
                        return;
                    }
                }
                event = handle.events.recv() => match event {
                    Some(TransportEvent::Opened) => {
                        log::info!("WebSocket connected");
                        let mut shared = shared.lock();
                        shared.state = ConnectionState::Connected;
                        shared.status = STATUS_CONNECTED.to_owned();
                    }
                    Some(TransportEvent::Frame(frame)) => {
                        let message = InboundMessage::classify(frame);
                        shared.lock().last_response_size = Some(message.size());
                        let _ = inbound_tx.send(message);
                    }
                    Some(TransportEvent::Error(err)) => {
                        // The transport's close signal drives recovery;
                        // an error alone only updates the status.
                        log::error!("WebSocket error: {err}");
                        let mut shared = shared.lock();
                        shared.state = ConnectionState::Error;
                        shared.status = STATUS_CONNECTION_ERROR.to_owned();
                    }
                    Some(TransportEvent::Closed) | None => break,
                },
            }
        }

        drop(handle);
        log::info!("WebSocket disconnected");
        finish_disconnect(&shared);

        // Exactly one reconnect is scheduled per close.
        tokio::select! {
            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    return;
                }
            }
            _ = tokio::time::sleep(reconnect_delay) => {}
        }
    }
}

fn finish_disconnect(shared: &Mutex<Shared>) {
    let mut shared = shared.lock();
    shared.state = ConnectionState::Disconnected;
    shared.status = STATUS_DISCONNECTED.to_owned();
    shared.outbound = None;
}
