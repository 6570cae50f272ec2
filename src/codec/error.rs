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

//! Error types for the codec layer.

use std::fmt;

/// Errors that can occur while encoding or decoding a wire frame.
///
/// A codec error is fatal to the single frame being processed and never to
/// the multiplexer instance: the engine surfaces it on its event channel and
/// carries on with the next frame.
#[derive(Debug)]
pub enum CodecError {
    /// A binary frame declared a payload type the registry cannot resolve.
    UnknownType {
        /// The type tag that failed to resolve.
        tag: String,
    },

    /// The frame (or its payload body) does not match the expected shape.
    Malformed {
        /// A description of what was wrong with the frame.
        message: String,
        /// The underlying parser error, when one exists.
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An untyped local failure cannot cross a typed binary wire.
    ///
    /// The binary codec can only transmit failure payloads the application
    /// registered a schema for; a plain message/trace record has none.
    UntypedFailure,
}

impl CodecError {
    /// Creates a [`CodecError::Malformed`] with a message.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a [`CodecError::Malformed`] with a message and source error.
    pub fn malformed_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Malformed {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Returns `true` if this error is an unresolvable payload type.
    #[must_use]
    pub fn is_unknown_type(&self) -> bool {
        matches!(self, Self::UnknownType { .. })
    }
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownType { tag } => {
                write!(f, "Could not locate payload type '{}'", tag)
            }
            Self::Malformed { message, source } => {
                write!(f, "Malformed frame: {}", message)?;
                if let Some(source) = source {
                    write!(f, " (caused by: {})", source)?;
                }
                Ok(())
            }
            Self::UntypedFailure => {
                write!(f, "Untyped failure cannot be encoded as a binary payload")
            }
        }
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Malformed {
                source: Some(source),
                ..
            } => Some(source.as_ref() as &(dyn std::error::Error + 'static)),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for CodecError {
    fn from(err: serde_json::Error) -> Self {
        Self::malformed_with_source("JSON frame did not parse", err)
    }
}

impl From<postcard::Error> for CodecError {
    fn from(err: postcard::Error) -> Self {
        Self::malformed_with_source("binary container did not parse", err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_unknown_type_display() {
        let error = CodecError::UnknownType {
            tag: "Demo.Missing".to_string(),
        };
        assert_eq!(error.to_string(), "Could not locate payload type 'Demo.Missing'");
        assert!(error.is_unknown_type());
    }

    #[test]
    fn test_malformed_with_source() {
        let source = std::io::Error::other("broken");
        let error = CodecError::malformed_with_source("bad frame", source);
        assert!(error.to_string().contains("bad frame"));
        assert!(error.source().is_some());
    }

    #[test]
    fn test_malformed_without_source() {
        let error = CodecError::malformed("not an array");
        assert_eq!(error.to_string(), "Malformed frame: not an array");
        assert!(error.source().is_none());
    }
}
