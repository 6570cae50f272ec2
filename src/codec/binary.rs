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

//! Binary encoding of the wire envelope.
//!
//! The binary codec wraps the envelope in a postcard-encoded container
//! `{ id, type, reqId, success, body }`, where `body` is the payload's own
//! encoding and `type` names its schema. Decoding resolves `type` through an
//! application-supplied [`TypeRegistry`]; an unresolvable type fails that
//! frame with [`CodecError::UnknownType`].

use crate::codec::{CodecError, Envelope, WireCodec};
use crate::mux::{DispatchError, ExchangeId};
use crate::transport::Frame;
use serde::{Deserialize, Serialize};

/// A payload value that knows its own schema tag and binary encoding.
///
/// The tag must be stable and symmetric: the value a sender derives from a
/// payload is the value the receiver's registry resolves a decoder under.
pub trait TaggedPayload: Send + 'static {
    /// Returns the stable tag naming this payload's schema.
    fn type_tag(&self) -> &str;

    /// Encodes this payload's body bytes.
    ///
    /// # Errors
    ///
    /// Returns a [`CodecError`] if the payload cannot be serialized.
    fn encode_body(&self) -> Result<Vec<u8>, CodecError>;
}

/// Decodes one payload schema's body bytes back into a value.
pub trait PayloadDecoder<V>: Send + Sync {
    /// Decodes `body` into a payload value.
    ///
    /// # Errors
    ///
    /// Returns a [`CodecError`] if the bytes do not match the schema.
    fn decode(&self, body: &[u8]) -> Result<V, CodecError>;
}

impl<V, F> PayloadDecoder<V> for F
where
    F: Fn(&[u8]) -> Result<V, CodecError> + Send + Sync,
{
    fn decode(&self, body: &[u8]) -> Result<V, CodecError> {
        self(body)
    }
}

/// Maps payload type tags to decoders, supplied by the application.
///
/// # Example
///
/// ```rust
/// use wiremux::codec::{CodecError, PayloadDecoder, TaggedPayload, TypeRegistry};
///
/// #[derive(Debug, PartialEq)]
/// enum Payload {
///     Ping(String),
/// }
///
/// impl TaggedPayload for Payload {
///     fn type_tag(&self) -> &str {
///         "demo.Ping"
///     }
///
///     fn encode_body(&self) -> Result<Vec<u8>, CodecError> {
///         let Payload::Ping(text) = self;
///         Ok(text.as_bytes().to_vec())
///     }
/// }
///
/// struct Registry;
///
/// impl TypeRegistry for Registry {
///     type Value = Payload;
///
///     fn lookup(&self, tag: &str) -> Option<&dyn PayloadDecoder<Payload>> {
///         fn ping(body: &[u8]) -> Result<Payload, CodecError> {
///             String::from_utf8(body.to_vec())
///                 .map(Payload::Ping)
///                 .map_err(|e| CodecError::malformed_with_source("body is not UTF-8", e))
///         }
///         match tag {
///             "demo.Ping" => Some(&ping),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait TypeRegistry: Send + Sync + 'static {
    /// The payload value type this registry decodes into.
    type Value: TaggedPayload;

    /// Resolves a schema tag to its decoder, or `None` if unknown.
    fn lookup(&self, tag: &str) -> Option<&dyn PayloadDecoder<Self::Value>>;
}

/// The on-wire container for binary frames.
///
/// Field order is the wire contract; postcard encodes fields positionally.
#[derive(Debug, Serialize, Deserialize)]
struct Container {
    id: u64,
    type_tag: String,
    request_id: Option<u64>,
    success: bool,
    body: Vec<u8>,
}

/// Binary codec: a postcard container with registry-resolved payload bodies.
///
/// Encoding derives the container's `type` tag from the concrete payload via
/// [`TaggedPayload::type_tag`]; decoding resolves the tag through the
/// registry the codec was built with.
#[derive(Debug)]
pub struct BinaryCodec<R> {
    registry: R,
}

impl<R: TypeRegistry> BinaryCodec<R> {
    /// Creates a binary codec around an application-supplied registry.
    #[must_use]
    pub fn new(registry: R) -> Self {
        Self { registry }
    }
}

impl<R: TypeRegistry> WireCodec for BinaryCodec<R> {
    type Payload = R::Value;

    fn encode(&self, envelope: &Envelope<R::Value>) -> Result<Frame, CodecError> {
        let container = Container {
            id: envelope.id.value(),
            type_tag: envelope.payload.type_tag().to_owned(),
            request_id: envelope.request_id.map(ExchangeId::value),
            success: envelope.success,
            body: envelope.payload.encode_body()?,
        };
        Ok(Frame::Binary(postcard::to_allocvec(&container)?))
    }

    fn decode(&self, frame: &Frame) -> Result<Envelope<R::Value>, CodecError> {
        let Frame::Binary(bytes) = frame else {
            return Err(CodecError::malformed(
                "binary codec received a text frame",
            ));
        };
        let container: Container = postcard::from_bytes(bytes)?;

        let decoder = self
            .registry
            .lookup(&container.type_tag)
            .ok_or(CodecError::UnknownType {
                tag: container.type_tag.clone(),
            })?;
        let payload = decoder.decode(&container.body)?;

        Ok(Envelope {
            id: ExchangeId::from(container.id),
            request_id: container.request_id.map(ExchangeId::from),
            success: container.success,
            payload,
        })
    }

    fn route_key(&self, payload: &R::Value) -> Option<String> {
        Some(payload.type_tag().to_owned())
    }

    fn failure_payload(
        &self,
        error: DispatchError<R::Value>,
    ) -> Result<R::Value, CodecError> {
        match error {
            DispatchError::Typed(payload) => Ok(payload),
            DispatchError::Local { .. } => Err(CodecError::UntypedFailure),
        }
    }
}
