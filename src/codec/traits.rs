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

//! Codec trait definitions.

use crate::codec::{CodecError, Envelope};
use crate::mux::DispatchError;
use crate::transport::Frame;

/// Strategy for translating between envelopes and transportable frames.
///
/// A codec is chosen once per multiplexer instance and must agree between
/// the two endpoints of a connection. Implementations must be thread-safe:
/// the engine shares the codec between its driver task and spawned reply
/// tasks.
///
/// # Implementations
///
/// Wiremux provides two built-in codecs:
///
/// - [`JsonCodec`](crate::codec::JsonCodec): text frames, structural payloads
/// - [`BinaryCodec`](crate::codec::BinaryCodec): binary frames, payload
///   schemas resolved through a [`TypeRegistry`](crate::codec::TypeRegistry)
pub trait WireCodec: Send + Sync + 'static {
    /// The payload value type this codec carries.
    type Payload: Send + 'static;

    /// Encodes an envelope into a transportable frame.
    ///
    /// # Errors
    ///
    /// Returns a [`CodecError`] if the payload cannot be serialized.
    fn encode(&self, envelope: &Envelope<Self::Payload>) -> Result<Frame, CodecError>;

    /// Decodes a transportable frame back into an envelope.
    ///
    /// # Errors
    ///
    /// Returns a [`CodecError`] if the frame is malformed or, for binary
    /// frames, if the declared payload type cannot be resolved. A decode
    /// failure is fatal to that frame only.
    fn decode(&self, frame: &Frame) -> Result<Envelope<Self::Payload>, CodecError>;

    /// Derives the routing-table key for a fresh inbound request.
    ///
    /// Returns `None` when the payload carries no routable identity, in
    /// which case a routing-table dispatch ignores the request.
    fn route_key(&self, payload: &Self::Payload) -> Option<String>;

    /// Converts a local dispatch failure into a wire payload for a failure
    /// reply.
    ///
    /// # Errors
    ///
    /// Returns a [`CodecError`] when the failure cannot be represented in
    /// this codec's payload space (for example, an untyped failure on a
    /// binary wire).
    fn failure_payload(
        &self,
        error: DispatchError<Self::Payload>,
    ) -> Result<Self::Payload, CodecError>;
}
