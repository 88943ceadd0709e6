//! Unified error type.

use std::fmt;

/// The error type returned by waku's fallible operations.
///
/// A route miss is not an `Error` — the dispatcher answers it with a fixed
/// 404 response and application code never sees it. What this type surfaces
/// is everything a handler (or `main`) must decide about itself: body-read
/// failures, malformed JSON, unserializable payloads, and the fatal bind
/// failure.
#[derive(Debug)]
pub enum Error {
    /// Reading the request body off the wire failed.
    BodyRead(hyper::Error),
    /// The request body was not valid JSON for the requested type.
    Decode(serde_json::Error),
    /// The response payload could not be serialized to JSON.
    Encode(serde_json::Error),
    /// The listen address could not be bound. Fatal — there is no retry.
    Bind(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BodyRead(e) => write!(f, "read body failed: {e}"),
            Self::Decode(e) => write!(f, "decode body failed: {e}"),
            Self::Encode(e) => write!(f, "encode response failed: {e}"),
            Self::Bind(e) => write!(f, "bind failed: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::BodyRead(e) => Some(e),
            Self::Decode(e) | Self::Encode(e) => Some(e),
            Self::Bind(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Bind(e)
    }
}
