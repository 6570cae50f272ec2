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

//! The multiplexer engine and its driver task.

use crate::codec::{Envelope, WireCodec};
use crate::mux::{
    Dispatch, DispatchErrorMapper, ExchangeIdGenerator, MuxError, MuxEvent, PendingExchange,
    PendingTable, RemoteErrorMapper, ReplyError, Settlement,
};
use crate::transport::{Connection, Frame};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, warn};

/// Default lifetime of a request that was sent without an explicit max age.
const DEFAULT_MAX_AGE: Duration = Duration::from_millis(10_000);

/// Default period of the expiry sweep.
const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_millis(250);

/// Default capacity of the event channel.
const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Configuration for a [`Multiplexer`] instance.
pub struct MuxOptions<P> {
    /// Lifetime of requests sent via [`Multiplexer::request`]. Default 10 s.
    pub max_age: Duration,
    /// Period of the expiry sweep. Default 250 ms.
    pub sweep_interval: Duration,
    /// Capacity of the [`MuxEvent`] channel. Default 64.
    pub event_capacity: usize,
    /// Hook applied to a peer's failure payload before the caller sees it.
    pub remote_error_mapper: Option<RemoteErrorMapper<P>>,
    /// Hook applied to local handler failures before they cross the wire.
    /// A [`RoutingTable`](crate::mux::RoutingTable) mapper takes precedence.
    pub dispatch_error_mapper: Option<DispatchErrorMapper<P>>,
}

impl<P> Default for MuxOptions<P> {
    fn default() -> Self {
        Self {
            max_age: DEFAULT_MAX_AGE,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            event_capacity: DEFAULT_EVENT_CAPACITY,
            remote_error_mapper: None,
            dispatch_error_mapper: None,
        }
    }
}

/// Messages from a [`Multiplexer`] handle to its driver task.
enum Command<P> {
    Request {
        payload: P,
        max_age: Duration,
        settle: oneshot::Sender<Settlement<P>>,
    },
    PendingCount {
        reply: oneshot::Sender<usize>,
    },
    Shutdown,
}

/// Why the driver loop ended.
#[derive(Clone, Copy)]
enum CloseReason {
    ConnectionClosed,
    Shutdown,
}

/// A bidirectional request/response multiplexer over one connection.
///
/// The handle is cheap to use from many tasks; all state lives on a driver
/// task spawned at construction. Dropping the handle (or calling
/// [`shutdown`](Self::shutdown)) stops the driver and settles every
/// outstanding request with [`MuxError::ShuttingDown`].
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use wiremux::codec::JsonCodec;
/// use wiremux::mux::{Dispatch, Multiplexer, MuxOptions};
/// use wiremux::transport::memory;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let ((conn, inbound), _peer) = memory::pair(64);
///
/// let (mux, mut events) = Multiplexer::new(
///     Arc::new(conn),
///     inbound,
///     JsonCodec::new(),
///     Dispatch::function(|payload: serde_json::Value| async move { Ok(payload) }),
///     MuxOptions::default(),
/// );
///
/// let reply = mux.request(serde_json::json!({ "type": "ping" })).await?;
/// # let _ = (reply, &mut events);
/// # Ok(())
/// # }
/// ```
pub struct Multiplexer<C: WireCodec> {
    commands: mpsc::Sender<Command<C::Payload>>,
    max_age: Duration,
}

impl<C: WireCodec> Multiplexer<C> {
    /// Creates a multiplexer over a connection and spawns its driver task.
    ///
    /// `inbound` delivers the connection's received frames; when it ends,
    /// outstanding requests settle with [`MuxError::ConnectionClosed`].
    /// Returns the handle and the receiver for out-of-band [`MuxEvent`]s.
    #[must_use]
    pub fn new(
        conn: Arc<dyn Connection>,
        inbound: mpsc::Receiver<Frame>,
        codec: C,
        dispatch: Dispatch<C::Payload>,
        options: MuxOptions<C::Payload>,
    ) -> (Self, mpsc::Receiver<MuxEvent<C::Payload>>) {
        let (commands, command_rx) = mpsc::channel(64);
        let (events, event_rx) = mpsc::channel(options.event_capacity);

        let driver = Driver {
            conn,
            codec: Arc::new(codec),
            dispatch,
            pending: PendingTable::new(),
            ids: ExchangeIdGenerator::new(),
            events,
            remote_error_mapper: options.remote_error_mapper,
            dispatch_error_mapper: options.dispatch_error_mapper,
            epoch: Instant::now(),
            sweep_interval: options.sweep_interval,
        };
        tokio::spawn(driver.run(command_rx, inbound));

        (
            Self {
                commands,
                max_age: options.max_age,
            },
            event_rx,
        )
    }

    /// Sends a request and awaits the correlated reply.
    ///
    /// Uses the instance's default max age (10 s unless configured).
    ///
    /// # Errors
    ///
    /// Returns a [`MuxError`] when the exchange settles with anything but a
    /// successful reply: expiry, a remote failure payload, an encode or
    /// transmit failure, or engine shutdown.
    pub async fn request(&self, payload: C::Payload) -> Result<C::Payload, MuxError<C::Payload>> {
        self.request_with_max_age(payload, self.max_age).await
    }

    /// Sends a request with an explicit lifetime and awaits the reply.
    ///
    /// If no reply arrives within `max_age`, the next sweep settles the
    /// exchange with [`MuxError::Expired`].
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn request_with_max_age(
        &self,
        payload: C::Payload,
        max_age: Duration,
    ) -> Result<C::Payload, MuxError<C::Payload>> {
        let (settle, outcome) = oneshot::channel();
        self.commands
            .send(Command::Request {
                payload,
                max_age,
                settle,
            })
            .await
            .map_err(|_| MuxError::ShuttingDown)?;
        match outcome.await {
            Ok(settlement) => settlement,
            Err(_) => Err(MuxError::ShuttingDown),
        }
    }

    /// Returns the number of outstanding requests, for monitoring.
    pub async fn pending_count(&self) -> usize {
        let (reply, count) = oneshot::channel();
        if self
            .commands
            .send(Command::PendingCount { reply })
            .await
            .is_err()
        {
            return 0;
        }
        count.await.unwrap_or(0)
    }

    /// Stops the driver task, settling outstanding requests with
    /// [`MuxError::ShuttingDown`], and waits for it to finish.
    pub async fn shutdown(&self) {
        let _ = self.commands.send(Command::Shutdown).await;
        // The driver drops its command receiver when its loop exits.
        self.commands.closed().await;
    }
}

/// The driver task: sole owner of the correlation table and expiry index.
struct Driver<C: WireCodec> {
    conn: Arc<dyn Connection>,
    codec: Arc<C>,
    dispatch: Dispatch<C::Payload>,
    pending: PendingTable<C::Payload>,
    ids: ExchangeIdGenerator,
    events: mpsc::Sender<MuxEvent<C::Payload>>,
    remote_error_mapper: Option<RemoteErrorMapper<C::Payload>>,
    dispatch_error_mapper: Option<DispatchErrorMapper<C::Payload>>,
    epoch: Instant,
    sweep_interval: Duration,
}

impl<C: WireCodec> Driver<C> {
    async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command<C::Payload>>,
        mut inbound: mpsc::Receiver<Frame>,
    ) {
        let mut sweep = tokio::time::interval(self.sweep_interval);
        sweep.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let reason = loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Request { payload, max_age, settle }) => {
                        self.handle_request(payload, max_age, settle).await;
                    }
                    Some(Command::PendingCount { reply }) => {
                        let _ = reply.send(self.pending.len());
                    }
                    Some(Command::Shutdown) | None => break CloseReason::Shutdown,
                },
                frame = inbound.recv() => match frame {
                    Some(frame) => self.handle_frame(frame).await,
                    None => break CloseReason::ConnectionClosed,
                },
                _ = sweep.tick() => self.sweep(),
            }
        };

        debug!(
            outstanding = self.pending.len(),
            "multiplexer driver stopping"
        );
        for exchange in self.pending.drain() {
            exchange.settle(Err(match reason {
                CloseReason::ConnectionClosed => MuxError::ConnectionClosed,
                CloseReason::Shutdown => MuxError::ShuttingDown,
            }));
        }
    }

    /// Milliseconds since this instance started.
    fn now_ms(&self) -> u64 {
        u64::try_from(self.epoch.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    async fn handle_request(
        &mut self,
        payload: C::Payload,
        max_age: Duration,
        settle: oneshot::Sender<Settlement<C::Payload>>,
    ) {
        let id = self.ids.next();
        let now = self.now_ms();
        let expires_at = now.saturating_add(u64::try_from(max_age.as_millis()).unwrap_or(u64::MAX));

        let envelope = Envelope::request(id, payload);
        let frame = match self.codec.encode(&envelope) {
            Ok(frame) => frame,
            Err(error) => {
                let _ = settle.send(Err(MuxError::Codec(error)));
                return;
            }
        };

        debug!(id = %id, expires_at, "registering outbound request");
        self.pending.insert(PendingExchange::new(
            id,
            envelope.payload,
            now,
            expires_at,
            settle,
        ));

        if let Err(error) = self.conn.send(frame).await {
            if let Some(exchange) = self.pending.take(id) {
                exchange.settle(Err(MuxError::Transport(error)));
            }
        }
    }

    async fn handle_frame(&mut self, frame: Frame) {
        let envelope = match self.codec.decode(&frame) {
            Ok(envelope) => envelope,
            Err(error) => {
                warn!(%error, "dropping inbound frame that failed to decode");
                self.emit(MuxEvent::DecodeFailed { error });
                return;
            }
        };

        match envelope.request_id {
            Some(_) => self.settle_reply(envelope),
            None => self.dispatch_request(envelope),
        }
    }

    /// Routes a reply to the pending exchange it answers.
    fn settle_reply(&mut self, envelope: Envelope<C::Payload>) {
        let Some(request_id) = envelope.request_id else {
            return;
        };
        let Some(exchange) = self.pending.take(request_id) else {
            warn!(id = %request_id, "reply matches no pending exchange");
            self.emit(MuxEvent::UnexpectedReply { envelope });
            return;
        };

        debug!(id = %request_id, success = envelope.success, "settling exchange");
        if envelope.success {
            exchange.settle(Ok(envelope.payload));
        } else {
            let mut payload = envelope.payload;
            if let Some(mapper) = &self.remote_error_mapper {
                payload = mapper(payload);
            }
            exchange.settle(Err(MuxError::Remote(payload)));
        }
    }

    /// Hands a fresh inbound request to the application and answers it when
    /// the handler's future settles.
    fn dispatch_request(&mut self, envelope: Envelope<C::Payload>) {
        // The reply consumes an id from the same counter as requests.
        let reply_id = self.ids.next();
        let request_id = envelope.id;

        let (handler, mapper) = match &self.dispatch {
            Dispatch::Ignore => {
                debug!(id = %request_id, "no dispatch configured, dropping inbound request");
                return;
            }
            Dispatch::Function(handler) => (handler.clone(), self.dispatch_error_mapper.clone()),
            Dispatch::Routes(table) => {
                let Some(key) = self.codec.route_key(&envelope.payload) else {
                    debug!(id = %request_id, "inbound request has no route key, dropping");
                    return;
                };
                let Some(handler) = table.handler_for(&key) else {
                    debug!(id = %request_id, key = %key, "no handler registered, dropping");
                    return;
                };
                let mapper = table
                    .error_mapper()
                    .cloned()
                    .or_else(|| self.dispatch_error_mapper.clone());
                (handler, mapper)
            }
        };

        let codec = self.codec.clone();
        let conn = self.conn.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let envelope = match handler(envelope.payload).await {
                Ok(payload) => Envelope::reply(reply_id, request_id, true, payload),
                Err(error) => {
                    let error = match mapper {
                        Some(mapper) => mapper(error),
                        None => error,
                    };
                    match codec.failure_payload(error) {
                        Ok(payload) => Envelope::reply(reply_id, request_id, false, payload),
                        Err(error) => {
                            warn!(id = %request_id, %error, "handler failure has no wire form");
                            let _ = events.try_send(MuxEvent::ReplyFailed {
                                request_id,
                                error: ReplyError::Codec(error),
                            });
                            return;
                        }
                    }
                }
            };

            let frame = match codec.encode(&envelope) {
                Ok(frame) => frame,
                Err(error) => {
                    warn!(id = %request_id, %error, "reply failed to encode");
                    let _ = events.try_send(MuxEvent::ReplyFailed {
                        request_id,
                        error: ReplyError::Codec(error),
                    });
                    return;
                }
            };
            if let Err(error) = conn.send(frame).await {
                warn!(id = %request_id, %error, "reply failed to transmit");
                let _ = events.try_send(MuxEvent::ReplyFailed {
                    request_id,
                    error: ReplyError::Transport(error),
                });
            }
        });
    }

    /// Settles every exchange whose deadline has passed.
    fn sweep(&mut self) {
        let now = self.now_ms();
        for exchange in self.pending.expire_due(now) {
            debug!(
                id = %exchange.id,
                age_ms = now.saturating_sub(exchange.created_at),
                "request expired before a reply arrived"
            );
            exchange.settle(Err(MuxError::Expired));
        }
    }

    fn emit(&self, event: MuxEvent<C::Payload>) {
        if self.events.try_send(event).is_err() {
            warn!("event channel is full or closed, dropping event");
        }
    }
}
