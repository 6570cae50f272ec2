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

//! Tracking of outstanding exchanges and their expiry deadlines.
//!
//! A [`PendingTable`] holds every exchange this endpoint has sent and not
//! yet seen settled, indexed two ways: by id for reply correlation, and by
//! one-second expiry bucket in a skip list for the sweep. An exchange is in
//! the id map if and only if it is in exactly one bucket.

use crate::mux::{ExchangeId, MuxError};
use crate::skiplist::SkipList;
use std::collections::HashMap;
use tokio::sync::oneshot;

/// Rounds a millisecond timestamp down to its one-second bucket.
pub(crate) fn bucket_time(time_ms: u64) -> u64 {
    time_ms / 1000 * 1000
}

/// How one exchange's future settles.
pub(crate) type Settlement<P> = Result<P, MuxError<P>>;

/// One outstanding exchange initiated by this endpoint.
#[derive(Debug)]
pub(crate) struct PendingExchange<P> {
    /// Id assigned at send time.
    pub(crate) id: ExchangeId,
    /// The original outgoing payload.
    #[allow(dead_code)]
    pub(crate) payload: P,
    /// Milliseconds since the engine epoch when the request was sent.
    pub(crate) created_at: u64,
    /// `created_at` plus the request's max age.
    pub(crate) expires_at: u64,
    /// Single-shot settlement channel to the caller's future.
    settle: oneshot::Sender<Settlement<P>>,
}

impl<P> PendingExchange<P> {
    pub(crate) fn new(
        id: ExchangeId,
        payload: P,
        created_at: u64,
        expires_at: u64,
        settle: oneshot::Sender<Settlement<P>>,
    ) -> Self {
        Self {
            id,
            payload,
            created_at,
            expires_at,
            settle,
        }
    }

    /// Settles the exchange's future. A caller that dropped its future is
    /// not an error; the outcome is discarded.
    pub(crate) fn settle(self, outcome: Settlement<P>) {
        let _ = self.settle.send(outcome);
    }
}

/// The correlation table plus the ordered index of expiry buckets.
pub(crate) struct PendingTable<P> {
    /// Pending exchanges by id.
    entries: HashMap<ExchangeId, PendingExchange<P>>,
    /// Bucket key (one-second-rounded expiry) to the ids due that second.
    buckets: SkipList<u64, Vec<ExchangeId>>,
}

impl<P> PendingTable<P> {
    pub(crate) fn new() -> Self {
        Self {
            entries: HashMap::new(),
            buckets: SkipList::new(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Registers an exchange in both indexes.
    pub(crate) fn insert(&mut self, exchange: PendingExchange<P>) {
        let key = bucket_time(exchange.expires_at);
        if let Some(bucket) = self.buckets.get_mut(&key) {
            bucket.push(exchange.id);
        } else {
            self.buckets.insert(key, vec![exchange.id]);
        }
        self.entries.insert(exchange.id, exchange);
    }

    /// Removes and returns the exchange with the given id, if pending.
    ///
    /// The id is removed from its bucket as well; a bucket emptied here is
    /// left in the index and reclaimed by the next sweep that reaches it.
    pub(crate) fn take(&mut self, id: ExchangeId) -> Option<PendingExchange<P>> {
        let exchange = self.entries.remove(&id)?;
        let key = bucket_time(exchange.expires_at);
        if let Some(bucket) = self.buckets.get_mut(&key) {
            bucket.retain(|pending| *pending != id);
        }
        Some(exchange)
    }

    /// Removes and returns every exchange whose deadline is at or before
    /// `now` (milliseconds since the engine epoch).
    ///
    /// Walks buckets in ascending order and stops at the first bucket
    /// strictly later than the current second; later buckets cannot hold
    /// anything due. Buckets that end up empty — including those emptied
    /// earlier by [`take`](Self::take) — are removed from the index.
    pub(crate) fn expire_due(&mut self, now: u64) -> Vec<PendingExchange<P>> {
        let now_bucket = bucket_time(now);

        let mut due_keys = Vec::new();
        for (&key, _) in self.buckets.iter() {
            if key > now_bucket {
                break;
            }
            due_keys.push(key);
        }

        let mut expired = Vec::new();
        for key in due_keys {
            let mut remaining = Vec::new();
            if let Some(bucket) = self.buckets.get_mut(&key) {
                for id in bucket.drain(..) {
                    // A bucket spans a whole second; entries at its tail end
                    // may not be due yet.
                    let due = self
                        .entries
                        .get(&id)
                        .is_some_and(|exchange| exchange.expires_at <= now);
                    if due {
                        if let Some(exchange) = self.entries.remove(&id) {
                            expired.push(exchange);
                        }
                    } else {
                        remaining.push(id);
                    }
                }
            }
            if remaining.is_empty() {
                self.buckets.remove(&key);
            } else if let Some(bucket) = self.buckets.get_mut(&key) {
                *bucket = remaining;
            }
        }
        expired
    }

    /// Removes and returns every pending exchange, in no particular order.
    pub(crate) fn drain(&mut self) -> Vec<PendingExchange<P>> {
        self.buckets = SkipList::new();
        self.entries.drain().map(|(_, exchange)| exchange).collect()
    }
}
