pub mod client;
pub mod message;
pub mod transport;
pub mod ws;

pub use client::{ConnectionState, SocketClient, DEFAULT_RECONNECT_DELAY};
pub use message::{Frame, InboundMessage};
pub use transport::{Connector, TransportEvent, TransportHandle};
pub use ws::WsConnector;
