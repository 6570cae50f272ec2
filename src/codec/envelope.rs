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

//! The logical envelope shared by every wire encoding.

use crate::mux::ExchangeId;

/// The four-field header common to both wire encodings, plus the payload.
///
/// A frame with `request_id: None` is a fresh request; a frame with
/// `request_id: Some(..)` is the reply to the exchange with that id. The
/// `success` flag distinguishes a successful reply payload from a failure
/// payload. It is always `false` on fresh requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope<P> {
    /// Id of this message, unique per sending endpoint.
    pub id: ExchangeId,
    /// Id of the request this message answers, if it is a reply.
    pub request_id: Option<ExchangeId>,
    /// Whether a reply carries a result (`true`) or an error (`false`).
    pub success: bool,
    /// The application payload, or the failure payload on error replies.
    pub payload: P,
}

impl<P> Envelope<P> {
    /// Creates a fresh-request envelope for `payload`.
    #[must_use]
    pub fn request(id: ExchangeId, payload: P) -> Self {
        Self {
            id,
            request_id: None,
            success: false,
            payload,
        }
    }

    /// Creates a reply envelope answering `request_id`.
    #[must_use]
    pub fn reply(id: ExchangeId, request_id: ExchangeId, success: bool, payload: P) -> Self {
        Self {
            id,
            request_id: Some(request_id),
            success,
            payload,
        }
    }

    /// Returns `true` if this envelope answers an earlier request.
    #[must_use]
    pub fn is_reply(&self) -> bool {
        self.request_id.is_some()
    }
}
