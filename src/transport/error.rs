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

//! Error types for the transport layer.

use std::fmt;

/// Errors that can occur while transmitting a frame.
#[derive(Debug)]
pub enum TransportError {
    /// The connection is closed and cannot accept frames.
    Closed,

    /// The transport's own I/O failed.
    Io {
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

impl TransportError {
    /// Returns `true` if this error indicates the connection is closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => write!(f, "Connection is closed"),
            Self::Io { source } => write!(f, "Transport I/O failed: {}", source),
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Closed => None,
            Self::Io { source } => Some(source),
        }
    }
}

impl From<std::io::Error> for TransportError {
    fn from(source: std::io::Error) -> Self {
        Self::Io { source }
    }
}
