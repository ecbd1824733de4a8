//! Transport seam between the connection state machine and the wire.
//!
//! A connector hands out channel-based transport handles: outbound text
//! goes into a sender, lifecycle signals and frames come back as events.
//! The production implementation lives in [`crate::ws`]; tests script the
//! event stream directly.

use tokio::sync::mpsc;

use crate::message::Frame;

#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// The connection finished opening and is ready for traffic.
    Opened,
    /// One inbound frame.
    Frame(Frame),
    /// A transport-level error. Does not terminate the transport by
    /// itself; a `Closed` event always follows eventually.
    Error(String),
    /// The connection closed, whether locally or remotely initiated.
    Closed,
}

/// The single live handle to one transport instance. Dropping it tears the
/// underlying connection down.
pub struct TransportHandle {
    pub outbound: mpsc::UnboundedSender<String>,
    pub events: mpsc::UnboundedReceiver<TransportEvent>,
}

pub trait Connector: Send + Sync + 'static {
    /// Start opening a connection to `url`. Must return immediately; the
    /// outcome is reported through the handle's event stream (`Opened`, or
    /// `Error` followed by `Closed`).
    fn connect(&self, url: &str) -> TransportHandle;
}
