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

#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

//! # Wiremux - Request/Response Multiplexing
//!
//! Wiremux multiplexes many concurrent request/response exchanges over a
//! single duplex, message-oriented connection:
//!
//! - **Bidirectional**: either peer can initiate a request
//! - **Correlation**: replies are matched to requests by message id, in any
//!   order
//! - **Expiry**: every request carries a deadline; a periodic sweep settles
//!   overdue requests as expired without scanning the whole pending set
//! - **Pluggable codecs**: JSON text frames or registry-driven binary frames
//!
//! ## Architecture
//!
//! Wiremux is organized into four layers:
//!
//! - **[`skiplist`]**: the ordered index the expiry sweep walks
//! - **[`codec`]**: wire envelope encoding/decoding
//! - **[`transport`]**: the connection seam and an in-memory test transport
//! - **[`mux`]**: the multiplexer engine itself
//!
//! ## Concurrency
//!
//! Each [`Multiplexer`] owns a single driver task that performs all mutation
//! of the correlation table and the expiry index. Callers interact with the
//! driver through message passing, so no locks guard the hot state. Multiple
//! multiplexer instances are fully independent.
//!
//! ## Safety
//!
//! Wiremux is written in 100% safe Rust with `#![deny(unsafe_code)]`.
//! All concurrency is handled through Tokio's async runtime.

pub mod codec;
pub mod mux;
pub mod skiplist;
pub mod transport;

pub use codec::{BinaryCodec, CodecError, Envelope, JsonCodec, WireCodec};
pub use mux::{
    Dispatch, DispatchError, ExchangeId, Multiplexer, MuxError, MuxEvent, MuxOptions, RoutingTable,
};
pub use skiplist::SkipList;
pub use transport::{Connection, Frame, TransportError};
