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

//! In-memory connections for testing.
//!
//! [`pair`] builds two connected endpoints over Tokio channels, each shaped
//! exactly the way a [`Multiplexer`](crate::mux::Multiplexer) wants its
//! transport: a [`Connection`] for outbound frames and an `mpsc::Receiver`
//! of inbound frames. Frames written to one endpoint arrive at the other
//! unchanged and in order.

use crate::transport::{Connection, Frame, TransportError};
use async_trait::async_trait;
use tokio::sync::mpsc;

/// One endpoint of an in-memory connection pair.
#[derive(Debug, Clone)]
pub struct MemoryConnection {
    tx: mpsc::Sender<Frame>,
}

/// Creates a pair of connected in-memory endpoints.
///
/// Each element is `(connection, inbound)`: frames sent on the first
/// endpoint's connection arrive on the second endpoint's inbound receiver,
/// and vice versa. `buffer` is the channel capacity in frames; a full
/// buffer makes `send` wait.
///
/// # Example
///
/// ```rust
/// use wiremux::transport::{memory, Connection, Frame};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let ((alice, _alice_inbound), (_bob, mut bob_inbound)) = memory::pair(16);
///
/// alice.send(Frame::Text("hi".to_string())).await?;
/// assert_eq!(bob_inbound.recv().await, Some(Frame::Text("hi".to_string())));
/// # Ok(())
/// # }
/// ```
#[must_use]
pub fn pair(
    buffer: usize,
) -> (
    (MemoryConnection, mpsc::Receiver<Frame>),
    (MemoryConnection, mpsc::Receiver<Frame>),
) {
    let (a_to_b, b_inbound) = mpsc::channel(buffer);
    let (b_to_a, a_inbound) = mpsc::channel(buffer);
    (
        (MemoryConnection { tx: a_to_b }, a_inbound),
        (MemoryConnection { tx: b_to_a }, b_inbound),
    )
}

#[async_trait]
impl Connection for MemoryConnection {
    async fn send(&self, frame: Frame) -> Result<(), TransportError> {
        self.tx
            .send(frame)
            .await
            .map_err(|_| TransportError::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_frames_cross_in_both_directions() {
        let ((alice, mut alice_inbound), (bob, mut bob_inbound)) = pair(4);

        alice.send(Frame::Text("ping".to_string())).await.unwrap();
        bob.send(Frame::Binary(vec![7])).await.unwrap();

        assert_eq!(
            bob_inbound.recv().await,
            Some(Frame::Text("ping".to_string()))
        );
        assert_eq!(alice_inbound.recv().await, Some(Frame::Binary(vec![7])));
    }

    #[tokio::test]
    async fn test_order_is_preserved() {
        let ((alice, _alice_inbound), (_bob, mut bob_inbound)) = pair(8);

        for n in 0..5 {
            alice.send(Frame::Text(n.to_string())).await.unwrap();
        }
        for n in 0..5 {
            assert_eq!(bob_inbound.recv().await, Some(Frame::Text(n.to_string())));
        }
    }

    #[tokio::test]
    async fn test_send_after_peer_dropped_is_closed() {
        let ((alice, _alice_inbound), (bob, bob_inbound)) = pair(4);
        drop(bob_inbound);
        drop(bob);

        let result = alice.send(Frame::Text("hello?".to_string())).await;
        assert!(matches!(result, Err(TransportError::Closed)));
    }
}
