//! Audio chunk types
//!
//! Audio is treated as opaque bytes: inbound chunks are raw PCM from the
//! client microphone, outbound chunks are whatever the synthesis engine
//! produced. No decoding or resampling happens in this system.

use serde::{Deserialize, Serialize};

/// Direction of an audio chunk relative to the session connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioDirection {
    /// Raw microphone audio from the client
    Inbound,
    /// Synthesized speech heading back to the client
    Outbound,
}

/// An opaque, directionally typed byte sequence
///
/// Chunks are pass-through data: they are never persisted and never
/// inspected beyond their length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioChunk {
    pub data: Vec<u8>,
    pub direction: AudioDirection,
}

impl AudioChunk {
    /// Create an inbound (microphone) chunk
    pub fn inbound(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            direction: AudioDirection::Inbound,
        }
    }

    /// Create an outbound (synthesized) chunk
    pub fn outbound(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            direction: AudioDirection::Outbound,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_direction() {
        let mic = AudioChunk::inbound(vec![0u8; 320]);
        assert_eq!(mic.direction, AudioDirection::Inbound);
        assert_eq!(mic.len(), 320);

        let speech = AudioChunk::outbound(vec![1u8, 2, 3]);
        assert_eq!(speech.direction, AudioDirection::Outbound);
        assert!(!speech.is_empty());
    }
}
