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

//! Error types for the multiplexer engine.

use crate::codec::CodecError;
use crate::transport::TransportError;
use std::fmt;

/// Ways a single exchange's future can fail.
///
/// Every variant is local to one exchange: no failure here aborts the
/// sweep, the dispatch loop, or any other in-flight exchange.
#[derive(Debug)]
pub enum MuxError<P> {
    /// The deadline passed before a reply arrived.
    Expired,

    /// The peer answered this exchange with a failure payload.
    ///
    /// The payload has already been passed through the instance's remote
    /// error mapper, when one is configured.
    Remote(P),

    /// The request could not be encoded for the wire.
    Codec(CodecError),

    /// The request could not be handed to the transport.
    Transport(TransportError),

    /// The connection's inbound stream ended while the exchange was
    /// outstanding.
    ConnectionClosed,

    /// The multiplexer was shut down while the exchange was outstanding.
    ShuttingDown,
}

impl<P> MuxError<P> {
    /// Returns `true` if the exchange timed out.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        matches!(self, Self::Expired)
    }

    /// Returns the peer's failure payload, if that is what this error is.
    #[must_use]
    pub fn remote_payload(&self) -> Option<&P> {
        match self {
            Self::Remote(payload) => Some(payload),
            _ => None,
        }
    }
}

impl<P: fmt::Debug> fmt::Display for MuxError<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expired => write!(f, "Request expired before a reply arrived"),
            Self::Remote(payload) => write!(f, "Peer reported failure: {:?}", payload),
            Self::Codec(error) => write!(f, "Request could not be encoded: {}", error),
            Self::Transport(error) => write!(f, "Request could not be transmitted: {}", error),
            Self::ConnectionClosed => write!(f, "Connection closed with the request outstanding"),
            Self::ShuttingDown => write!(f, "Multiplexer shut down with the request outstanding"),
        }
    }
}

impl<P: fmt::Debug> std::error::Error for MuxError<P> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Codec(error) => Some(error),
            Self::Transport(error) => Some(error),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expired_predicate() {
        let error: MuxError<()> = MuxError::Expired;
        assert!(error.is_expired());
        assert!(error.remote_payload().is_none());
    }

    #[test]
    fn test_remote_payload_accessor() {
        let error = MuxError::Remote("boom");
        assert!(!error.is_expired());
        assert_eq!(error.remote_payload(), Some(&"boom"));
    }

    #[test]
    fn test_display() {
        let error: MuxError<()> = MuxError::Expired;
        assert_eq!(error.to_string(), "Request expired before a reply arrived");

        let error = MuxError::Remote(505);
        assert!(error.to_string().contains("505"));
    }
}
