//! WebSocket transport over tokio-tungstenite.

use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

use crate::message::Frame;
use crate::transport::{Connector, TransportEvent, TransportHandle};

/// Production connector: one spawned I/O task per connection attempt,
/// bridging the socket to the transport handle's channels.
#[derive(Debug, Default, Clone, Copy)]
pub struct WsConnector;

impl Connector for WsConnector {
    fn connect(&self, url: &str) -> TransportHandle {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let url = url.to_owned();
        tokio::spawn(run_socket(url, outbound_rx, event_tx));

        TransportHandle {
            outbound: outbound_tx,
            events: event_rx,
        }
    }
}

async fn run_socket(
    url: String,
    mut outbound_rx: mpsc::UnboundedReceiver<String>,
    event_tx: mpsc::UnboundedSender<TransportEvent>,
) {
    let mut stream = match tokio_tungstenite::connect_async(url.as_str()).await {
        Ok((stream, _response)) => stream,
        Err(err) => {
            let _ = event_tx.send(TransportEvent::Error(err.to_string()));
            let _ = event_tx.send(TransportEvent::Closed);
            return;
        }
    };

    let _ = event_tx.send(TransportEvent::Opened);

    loop {
        tokio::select! {
            outgoing = outbound_rx.recv() => match outgoing {
                Some(text) => {
                    if let Err(err) = stream.send(Message::Text(text)).await {
                        let _ = event_tx.send(TransportEvent::Error(err.to_string()));
                        let _ = event_tx.send(TransportEvent::Closed);
                        return;
                    }
                }
                // Handle dropped: local teardown.
                None => {
                    let _ = stream.close(None).await;
                    let _ = event_tx.send(TransportEvent::Closed);
                    return;
                }
            },
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Binary(data))) => {
                    let _ = event_tx.send(TransportEvent::Frame(Frame::Binary(data)));
                }
                Some(Ok(Message::Text(text))) => {
                    let _ = event_tx.send(TransportEvent::Frame(Frame::Text(text)));
                }
                // Control frames are handled inside tungstenite.
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    let _ = event_tx.send(TransportEvent::Error(err.to_string()));
                    let _ = event_tx.send(TransportEvent::Closed);
                    return;
                }
                None => {
                    let _ = event_tx.send(TransportEvent::Closed);
                    return;
                }
            },
        }
    }
}
