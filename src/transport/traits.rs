//
// Copyright 2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Transport trait definitions.

use crate::transport::TransportError;
use async_trait::async_trait;

/// One discrete message on the wire.
///
/// The variant is the `binary` flag of the underlying transport: text codecs
/// produce [`Frame::Text`], binary codecs produce [`Frame::Binary`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A text frame, e.g. a websocket text message.
    Text(String),
    /// A binary frame, e.g. a websocket binary message.
    Binary(Vec<u8>),
}

impl Frame {
    /// Returns `true` for binary frames.
    #[must_use]
    pub fn is_binary(&self) -> bool {
        matches!(self, Self::Binary(_))
    }

    /// Returns the frame's size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Text(text) => text.len(),
            Self::Binary(bytes) => bytes.len(),
        }
    }

    /// Returns `true` if the frame carries no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The outbound half of a duplex, message-oriented connection.
///
/// Implementations must be thread-safe: the multiplexer shares the
/// connection between its driver task and the tasks it spawns to transmit
/// replies. The inbound half is not a trait method; inbound frames reach
/// the multiplexer as an `mpsc::Receiver<Frame>` supplied at construction,
/// which keeps the receive loop in one place.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use wiremux::transport::{Connection, Frame, TransportError};
///
/// struct LoggingConnection;
///
/// #[async_trait]
/// impl Connection for LoggingConnection {
///     async fn send(&self, frame: Frame) -> Result<(), TransportError> {
///         println!("would transmit {} bytes", frame.len());
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Connection: Send + Sync + 'static {
    /// Transmits one frame to the peer.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if the frame could not be handed to the
    /// transport, typically because the connection is closed.
    async fn send(&self, frame: Frame) -> Result<(), TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_flags() {
        let text = Frame::Text("hello".to_string());
        assert!(!text.is_binary());
        assert_eq!(text.len(), 5);
        assert!(!text.is_empty());

        let binary = Frame::Binary(vec![1, 2, 3]);
        assert!(binary.is_binary());
        assert_eq!(binary.len(), 3);

        assert!(Frame::Binary(Vec::new()).is_empty());
    }
}
