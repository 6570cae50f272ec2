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

//! Wire codecs for the multiplexer envelope.
//!
//! Every frame on the wire carries the same logical envelope: a message id,
//! the id of the request it answers (absent for fresh requests), a success
//! flag, and the payload. This module provides two interchangeable encodings
//! of that envelope:
//!
//! - [`JsonCodec`]: the envelope as the JSON array
//!   `[id, requestId, success, payload]` in a text frame
//! - [`BinaryCodec`]: a postcard-encoded container in a binary frame, with
//!   the payload's own encoding embedded as bytes and resolved on decode
//!   through an application-supplied [`TypeRegistry`]

mod binary;
mod envelope;
mod error;
mod json;
mod traits;

pub use binary::{BinaryCodec, PayloadDecoder, TaggedPayload, TypeRegistry};
pub use envelope::Envelope;
pub use error::CodecError;
pub use json::JsonCodec;
pub use traits::WireCodec;
