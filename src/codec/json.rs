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

//! JSON text encoding of the wire envelope.

use crate::codec::{CodecError, Envelope, WireCodec};
use crate::mux::{DispatchError, ExchangeId};
use crate::transport::Frame;
use serde_json::{json, Value};

/// Text codec: the envelope as the JSON array `[id, requestId, success,
/// payload]`.
///
/// `requestId` is `null` on fresh requests. The payload is any structurally
/// serializable JSON value; failure payloads are error records carrying at
/// least a `message` and a `stack` field, with any additional fields copied
/// across verbatim.
///
/// # Example
///
/// ```rust
/// use wiremux::codec::{Envelope, JsonCodec, WireCodec};
/// use wiremux::mux::ExchangeId;
/// use wiremux::transport::Frame;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let codec = JsonCodec::new();
/// let envelope = Envelope::request(ExchangeId::from(0), serde_json::json!({ "type": "ping" }));
///
/// let frame = codec.encode(&envelope)?;
/// assert_eq!(frame, Frame::Text(r#"[0,null,false,{"type":"ping"}]"#.to_string()));
///
/// let decoded = codec.decode(&frame)?;
/// assert_eq!(decoded, envelope);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl JsonCodec {
    /// Creates a new JSON codec.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl WireCodec for JsonCodec {
    type Payload = Value;

    fn encode(&self, envelope: &Envelope<Value>) -> Result<Frame, CodecError> {
        let tuple = json!([
            envelope.id.value(),
            envelope.request_id.map(ExchangeId::value),
            envelope.success,
            envelope.payload,
        ]);
        Ok(Frame::Text(tuple.to_string()))
    }

    fn decode(&self, frame: &Frame) -> Result<Envelope<Value>, CodecError> {
        let value: Value = match frame {
            Frame::Text(text) => serde_json::from_str(text)?,
            Frame::Binary(bytes) => serde_json::from_slice(bytes)?,
        };

        let Value::Array(mut fields) = value else {
            return Err(CodecError::malformed("frame is not a JSON array"));
        };
        if fields.len() != 4 {
            return Err(CodecError::malformed(format!(
                "envelope has {} elements, expected 4",
                fields.len()
            )));
        }

        let payload = fields[3].take();
        let success = fields[2]
            .as_bool()
            .ok_or_else(|| CodecError::malformed("success flag is not a boolean"))?;
        let request_id = match &fields[1] {
            Value::Null => None,
            value => Some(ExchangeId::from(value.as_u64().ok_or_else(|| {
                CodecError::malformed("request id is neither null nor an unsigned integer")
            })?)),
        };
        let id = ExchangeId::from(
            fields[0]
                .as_u64()
                .ok_or_else(|| CodecError::malformed("message id is not an unsigned integer"))?,
        );

        Ok(Envelope {
            id,
            request_id,
            success,
            payload,
        })
    }

    fn route_key(&self, payload: &Value) -> Option<String> {
        payload.get("type").and_then(Value::as_str).map(str::to_owned)
    }

    fn failure_payload(&self, error: DispatchError<Value>) -> Result<Value, CodecError> {
        match error {
            DispatchError::Typed(payload) => Ok(payload),
            DispatchError::Local {
                message,
                trace,
                fields,
            } => {
                let mut record = serde_json::Map::new();
                record.insert("message".to_string(), Value::String(message));
                record.insert("stack".to_string(), Value::String(trace));
                // Application-defined fields are copied across verbatim and
                // may shadow the two standard ones.
                for (key, value) in fields {
                    record.insert(key, value);
                }
                Ok(Value::Object(record))
            }
        }
    }
}
