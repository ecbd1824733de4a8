//! Inbound frame classification.
//!
//! Every frame received over the socket is classified purely from its wire
//! representation: binary frames pass through untouched, text frames are
//! opportunistically parsed as JSON and fall back to plain text.

/// One discrete message unit as it arrived at the transport layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Binary(Vec<u8>),
    Text(String),
}

/// A classified inbound message. `size` is always the byte length of the
/// original frame payload.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    Binary { data: Vec<u8>, size: usize },
    Structured { data: serde_json::Value, size: usize },
    Text { data: String, size: usize },
}

impl InboundMessage {
    pub fn classify(frame: Frame) -> Self {
        match frame {
            Frame::Binary(data) => {
                let size = data.len();
                log::debug!("Received binary data: {size} bytes");
                Self::Binary { data, size }
            }
            Frame::Text(text) => {
                let size = text.len();
                match serde_json::from_str::<serde_json::Value>(&text) {
                    Ok(data) => {
                        log::debug!("Received JSON: {data}");
                        Self::Structured { data, size }
                    }
                    Err(_) => {
                        // Expected fallback, not an error.
                        log::debug!("Received text: {text}");
                        Self::Text { data: text, size }
                    }
                }
            }
        }
    }

    pub fn size(&self) -> usize {
        match self {
            Self::Binary { size, .. } | Self::Structured { size, .. } | Self::Text { size, .. } => {
                *size
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn binary_frame_passes_through() {
        let message = InboundMessage::classify(Frame::Binary(vec![0xde, 0xad, 0xbe, 0xef]));
        assert_eq!(
            message,
            InboundMessage::Binary {
                data: vec![0xde, 0xad, 0xbe, 0xef],
                size: 4,
            }
        );
    }

    #[test]
    fn valid_json_text_is_structured() {
        let text = r#"{"key":"value"}"#;
        let message = InboundMessage::classify(Frame::Text(text.to_owned()));
        assert_eq!(
            message,
            InboundMessage::Structured {
                data: json!({"key": "value"}),
                size: text.len(),
            }
        );
        assert_eq!(message.size(), 15);
    }

    #[test]
    fn invalid_json_text_falls_back_to_plain() {
        let message = InboundMessage::classify(Frame::Text("plain text".to_owned()));
        assert_eq!(
            message,
            InboundMessage::Text {
                data: "plain text".to_owned(),
                size: 10,
            }
        );
    }

    #[test]
    fn json_array_is_structured() {
        let message = InboundMessage::classify(Frame::Text("[1,2,3]".to_owned()));
        assert!(matches!(message, InboundMessage::Structured { size: 7, .. }));
    }
}
