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

//! Out-of-band notifications from the multiplexer.
//!
//! Everything the engine wants to tell the application that does not belong
//! to a specific request future arrives here. Events are delivered at most
//! once, on the `mpsc::Receiver` returned by [`Multiplexer::new`]; a
//! receiver that falls behind loses the oldest events rather than stalling
//! the engine.
//!
//! [`Multiplexer::new`]: crate::mux::Multiplexer::new

use crate::codec::{CodecError, Envelope};
use crate::mux::ExchangeId;
use crate::transport::TransportError;
use std::fmt;

/// A non-fatal notification from the multiplexer.
#[derive(Debug)]
pub enum MuxEvent<P> {
    /// A reply arrived whose correlated id matches no pending exchange.
    ///
    /// Either the id was never sent by this endpoint, or the exchange was
    /// already settled (by an earlier reply or by expiry). No other
    /// exchange is affected.
    UnexpectedReply {
        /// The decoded envelope of the orphaned reply.
        envelope: Envelope<P>,
    },

    /// An inbound frame failed to decode and was dropped.
    DecodeFailed {
        /// What went wrong while decoding.
        error: CodecError,
    },

    /// A reply to an inbound request could not be produced or transmitted.
    ReplyFailed {
        /// Id of the inbound request the reply was answering.
        request_id: ExchangeId,
        /// What went wrong while encoding or transmitting the reply.
        error: ReplyError,
    },
}

/// Why a reply to an inbound request never reached the wire.
#[derive(Debug)]
pub enum ReplyError {
    /// The reply payload could not be encoded.
    Codec(CodecError),
    /// The transport rejected the reply frame.
    Transport(TransportError),
}

impl fmt::Display for ReplyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Codec(error) => write!(f, "Reply could not be encoded: {}", error),
            Self::Transport(error) => write!(f, "Reply could not be transmitted: {}", error),
        }
    }
}

impl std::error::Error for ReplyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Codec(error) => Some(error),
            Self::Transport(error) => Some(error),
        }
    }
}
