use std::error::Error as StdError;
use std::fmt;

use reqwest::{Method, StatusCode};

/// Broad classification of an [`Error`].
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Kind {
    /// The service answered with a non-success status and no usable error envelope.
    Status,
    /// Caller-supplied input was rejected before anything was sent.
    Validation,
    /// Connecting, sending, or reading the response failed (including timeouts).
    Transport,
    /// Something that should not happen under well-formed input.
    Internal,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Status => "status",
            Kind::Validation => "validation",
            Kind::Transport => "transport",
            Kind::Internal => "internal",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
pub struct Error {
    kind: Kind,
    message: String,
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl Error {
    fn new(kind: Kind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    fn with_source<E>(kind: Kind, message: impl Into<String>, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    #[must_use]
    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::new(Kind::Validation, message)
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::new(Kind::Internal, message)
    }

    /// Builds a [`Kind::Status`] error from a rejected response.
    pub fn status<S: Into<String>>(
        status_code: StatusCode,
        method: Method,
        path: S,
        body: &str,
    ) -> Self {
        let path = path.into();
        Self::new(
            Kind::Status,
            format!("{method} {path} failed with {status_code}: {body}"),
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error: {}", self.kind, self.message)
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn StdError + 'static))
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        let message = if e.is_timeout() {
            "request timed out".to_owned()
        } else if e.is_connect() {
            "failed to connect".to_owned()
        } else {
            e.to_string()
        };
        Error::with_source(Kind::Transport, message, e)
    }
}

impl From<reqwest::header::InvalidHeaderValue> for Error {
    fn from(e: reqwest::header::InvalidHeaderValue) -> Self {
        Error::with_source(Kind::Validation, "invalid header value", e)
    }
}

impl From<reqwest::header::InvalidHeaderName> for Error {
    fn from(e: reqwest::header::InvalidHeaderName) -> Self {
        Error::with_source(Kind::Validation, "invalid header name", e)
    }
}

impl From<url::ParseError> for Error {
    fn from(e: url::ParseError) -> Self {
        Error::with_source(Kind::Validation, "invalid url", e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::with_source(Kind::Internal, "failed to serialize request body", e)
    }
}

impl From<hmac::digest::InvalidLength> for Error {
    fn from(e: hmac::digest::InvalidLength) -> Self {
        Error::internal(format!("hmac rejected signing key: {e}"))
    }
}
