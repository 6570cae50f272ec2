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

//! The multiplexer engine.
//!
//! A [`Multiplexer`] correlates asynchronous replies to outstanding requests
//! over one connection. Sending registers a pending exchange under a fresh
//! id and returns a future; inbound replies settle the matching future;
//! inbound requests are dispatched to the application and answered when the
//! handler's future settles; a periodic sweep walks a skip list of
//! one-second expiry buckets and fails every exchange whose deadline has
//! passed.
//!
//! All mutation of the correlation table and the expiry index happens on a
//! single driver task owned by the multiplexer, so the hot state needs no
//! locks. Everything the engine wants to tell the application outside a
//! request future — unexpected replies, frames that failed to decode —
//! arrives on a typed [`MuxEvent`] channel.

mod correlation;
mod dispatch;
mod engine;
mod error;
mod event;
mod pending;

pub use correlation::{ExchangeId, ExchangeIdGenerator};
pub use dispatch::{
    Dispatch, DispatchError, DispatchErrorMapper, Handler, HandlerFuture, RemoteErrorMapper,
    RoutingTable,
};
pub use engine::{Multiplexer, MuxOptions};
pub use error::MuxError;
pub use event::{MuxEvent, ReplyError};

pub(crate) use pending::{PendingExchange, PendingTable, Settlement};
