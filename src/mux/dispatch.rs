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

//! Application-side handling of inbound requests.
//!
//! Fresh inbound requests (frames without a correlated request id) are
//! handed to a [`Dispatch`]: a single function receiving every request, or
//! a [`RoutingTable`] of handlers keyed by the payload's route key (the
//! JSON payload's `"type"` field, or the binary payload's type tag). A
//! handler's future settles the reply: `Ok` crosses the wire as a success
//! frame, `Err` as a failure frame.

use serde_json::Value;
use std::backtrace::Backtrace;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// The future a request handler returns.
pub type HandlerFuture<P> = Pin<Box<dyn Future<Output = Result<P, DispatchError<P>>> + Send>>;

/// A request handler: payload in, future of reply-or-failure out.
pub type Handler<P> = Arc<dyn Fn(P) -> HandlerFuture<P> + Send + Sync>;

/// Hook applied to a peer's failure payload before it reaches the caller's
/// future.
pub type RemoteErrorMapper<P> = Arc<dyn Fn(P) -> P + Send + Sync>;

/// Hook applied to a local handler failure before it crosses the wire.
pub type DispatchErrorMapper<P> = Arc<dyn Fn(DispatchError<P>) -> DispatchError<P> + Send + Sync>;

/// A failed handler outcome.
#[derive(Debug)]
pub enum DispatchError<P> {
    /// A typed failure payload the codec can carry as-is.
    ///
    /// This is the only failure shape a binary codec can transmit.
    Typed(P),

    /// An untyped local failure.
    ///
    /// A text codec serializes this as an error record carrying at least
    /// the message and trace, with the extra fields copied across verbatim.
    Local {
        /// Human-readable description of the failure.
        message: String,
        /// Stack trace captured where the failure was raised.
        trace: String,
        /// Application-defined fields for the error record.
        fields: serde_json::Map<String, Value>,
    },
}

impl<P> DispatchError<P> {
    /// Creates an untyped local failure, capturing a backtrace.
    #[must_use]
    pub fn local(message: impl Into<String>) -> Self {
        Self::Local {
            message: message.into(),
            trace: Backtrace::capture().to_string(),
            fields: serde_json::Map::new(),
        }
    }

    /// Creates an untyped local failure from any error value.
    #[must_use]
    pub fn from_error(error: &(dyn std::error::Error)) -> Self {
        Self::local(error.to_string())
    }

    /// Attaches an application-defined field to a local failure.
    ///
    /// On a [`DispatchError::Typed`] failure this is a no-op.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        if let Self::Local { fields, .. } = &mut self {
            fields.insert(key.into(), value);
        }
        self
    }
}

/// How the multiplexer hands inbound requests to the application.
pub enum Dispatch<P> {
    /// Drop every inbound request unanswered.
    Ignore,

    /// One function receives every inbound request.
    Function(Handler<P>),

    /// Requests are routed to a handler by the payload's route key.
    ///
    /// Requests whose payload has no route key, or whose key has no
    /// handler, are dropped unanswered.
    Routes(RoutingTable<P>),
}

impl<P> Dispatch<P> {
    /// Wraps a plain async function as a [`Dispatch::Function`].
    ///
    /// # Example
    ///
    /// ```rust
    /// use serde_json::Value;
    /// use wiremux::mux::Dispatch;
    ///
    /// let echo = Dispatch::function(|payload: Value| async move { Ok(payload) });
    /// # let _ = echo;
    /// ```
    pub fn function<F, Fut>(handler: F) -> Self
    where
        F: Fn(P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<P, DispatchError<P>>> + Send + 'static,
    {
        Self::Function(Arc::new(move |payload| Box::pin(handler(payload))))
    }
}

/// A table of request handlers keyed by route key.
///
/// The table may carry its own error mapper; it takes precedence over the
/// multiplexer-wide one for failures raised by these handlers.
///
/// # Example
///
/// ```rust
/// use serde_json::{json, Value};
/// use wiremux::mux::{Dispatch, DispatchError, RoutingTable};
///
/// let routes = RoutingTable::new()
///     .route("greet", |payload: Value| async move {
///         let name = payload["name"].as_str().unwrap_or("stranger").to_owned();
///         Ok(json!({ "text": format!("hello, {name}") }))
///     })
///     .route("fail", |_payload: Value| async move {
///         Err(DispatchError::local("oh hey").with_field("code", json!(505)))
///     });
///
/// let dispatch = Dispatch::Routes(routes);
/// # let _ = dispatch;
/// ```
pub struct RoutingTable<P> {
    routes: HashMap<String, Handler<P>>,
    error_mapper: Option<DispatchErrorMapper<P>>,
}

impl<P> RoutingTable<P> {
    /// Creates an empty routing table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
            error_mapper: None,
        }
    }

    /// Adds a handler under `key`, replacing any previous handler for it.
    #[must_use]
    pub fn route<F, Fut>(mut self, key: impl Into<String>, handler: F) -> Self
    where
        F: Fn(P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<P, DispatchError<P>>> + Send + 'static,
    {
        self.routes.insert(
            key.into(),
            Arc::new(move |payload| Box::pin(handler(payload))),
        );
        self
    }

    /// Sets the error mapper applied to failures from these handlers.
    #[must_use]
    pub fn with_error_mapper(mut self, mapper: DispatchErrorMapper<P>) -> Self {
        self.error_mapper = Some(mapper);
        self
    }

    /// Looks up the handler registered under `key`.
    #[must_use]
    pub fn handler_for(&self, key: &str) -> Option<Handler<P>> {
        self.routes.get(key).cloned()
    }

    /// Returns this table's error mapper, if one was set.
    #[must_use]
    pub fn error_mapper(&self) -> Option<&DispatchErrorMapper<P>> {
        self.error_mapper.as_ref()
    }
}

impl<P> Default for RoutingTable<P> {
    fn default() -> Self {
        Self::new()
    }
}
