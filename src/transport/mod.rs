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

//! The connection seam between the multiplexer and its transport.
//!
//! The multiplexer does not own a socket. It consumes a [`Connection`] that
//! can transmit opaque [`Frame`]s, and receives inbound frames through a
//! Tokio channel supplied at construction. Anything that delivers discrete
//! messages works: a websocket, a datagram socket, or the in-memory
//! [`memory::pair`] used throughout the test suite.
//!
//! Connection lifecycle, reconnection, and ordering guarantees beyond what
//! the transport itself provides are out of scope.

pub mod memory;

mod error;
mod traits;

pub use error::TransportError;
pub use traits::{Connection, Frame};
