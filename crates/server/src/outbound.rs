//! Outbound frame channel and writer task
//!
//! Everything the server sends to the client goes through one mpsc
//! channel consumed by a single writer task. That task is the only
//! place that touches the WebSocket sink, which is what guarantees
//! that frames for one turn are never interleaved with another's.

use axum::extract::ws::{Message, WebSocket};
use futures::stream::SplitSink;
use futures::SinkExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Prefix for the finalized-utterance notification
pub const FINAL_TRANSCRIPT_PREFIX: &str = "FINAL_TRANSCRIPT:";
/// Prefix for the response text, sent before its audio
pub const AI_RESPONSE_PREFIX: &str = "AI_RESPONSE:";
/// Marker sent when a turn closes, before response generation begins
pub const END_OF_TURN: &str = "END_OF_TURN";

/// One frame bound for the client, in delivery order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundFrame {
    /// Text frame: partial transcript, prefixed notification, or marker
    Text(String),
    /// Binary frame: one synthesized audio chunk
    Audio(Vec<u8>),
}

impl OutboundFrame {
    pub fn partial(text: impl Into<String>) -> Self {
        OutboundFrame::Text(text.into())
    }

    pub fn final_transcript(text: &str) -> Self {
        OutboundFrame::Text(format!("{}{}", FINAL_TRANSCRIPT_PREFIX, text))
    }

    pub fn response(text: &str) -> Self {
        OutboundFrame::Text(format!("{}{}", AI_RESPONSE_PREFIX, text))
    }

    pub fn end_of_turn() -> Self {
        OutboundFrame::Text(END_OF_TURN.to_string())
    }
}

/// Spawn the writer task owning the WebSocket sink.
///
/// Ends when the frame channel closes or a send fails; either way the
/// sink is dropped and pending senders start failing, which winds the
/// session down.
pub fn spawn_writer(
    mut sink: SplitSink<WebSocket, Message>,
    mut frames: mpsc::Receiver<OutboundFrame>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = frames.recv().await {
            let message = match frame {
                OutboundFrame::Text(text) => Message::Text(text),
                OutboundFrame::Audio(bytes) => Message::Binary(bytes),
            };
            if let Err(e) = sink.send(message).await {
                tracing::debug!("outbound write failed, stopping writer: {}", e);
                break;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_constructors() {
        assert_eq!(
            OutboundFrame::final_transcript("tell me a story"),
            OutboundFrame::Text("FINAL_TRANSCRIPT:tell me a story".to_string())
        );
        assert_eq!(
            OutboundFrame::response("Once upon a time"),
            OutboundFrame::Text("AI_RESPONSE:Once upon a time".to_string())
        );
        assert_eq!(
            OutboundFrame::end_of_turn(),
            OutboundFrame::Text("END_OF_TURN".to_string())
        );
    }
}
