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

//! Message id generation for request-response matching.

use std::fmt;

/// Id of one message on the wire, unique per sending endpoint.
///
/// Ids are assigned at send time from an instance-local counter and are
/// never reused for the instance's lifetime. Both fresh requests and
/// replies consume an id from the same counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExchangeId(u64);

impl ExchangeId {
    /// Returns the raw id value.
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

impl From<u64> for ExchangeId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for ExchangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Allocates strictly increasing [`ExchangeId`]s, starting at 0.
///
/// The generator is owned by one multiplexer's driver task and mutated only
/// there, so it is a plain counter rather than an atomic.
#[derive(Debug, Default)]
pub struct ExchangeIdGenerator {
    next: u64,
}

impl ExchangeIdGenerator {
    /// Creates a generator whose first id is 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next id and advances the counter.
    pub fn next(&mut self) -> ExchangeId {
        let id = ExchangeId(self.next);
        self.next += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_id_is_zero() {
        let mut ids = ExchangeIdGenerator::new();
        assert_eq!(ids.next(), ExchangeId::from(0));
    }

    #[test]
    fn test_ids_are_strictly_increasing() {
        let mut ids = ExchangeIdGenerator::new();
        let mut previous = ids.next();
        for _ in 0..1000 {
            let id = ids.next();
            assert!(id > previous);
            previous = id;
        }
    }

    #[test]
    fn test_ids_are_unique() {
        let mut ids = ExchangeIdGenerator::new();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..1000 {
            assert!(seen.insert(ids.next()));
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(ExchangeId::from(42).to_string(), "42");
    }
}
