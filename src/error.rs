use std::error::Error as StdError;
use std::fmt;

use reqwest::{Method, StatusCode};

/// Broad classification of an [`Error`].
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Kind {
    /// The request never produced a response (connect failure, timeout, broken body).
    Transport,
    /// The server answered with a non-2xx status.
    Rejected,
    /// Parameters were rejected locally before any request was sent.
    Validation,
    /// A response could not be decoded or a URL could not be built.
    Internal,
}

#[derive(Debug)]
pub struct Error {
    kind: Kind,
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl Error {
    pub fn with_source<S: StdError + Send + Sync + 'static>(kind: Kind, source: S) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
        }
    }

    #[must_use]
    pub fn kind(&self) -> Kind {
        self.kind
    }

    #[must_use]
    pub fn inner(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.source.as_deref()
    }

    /// Returns the typed payload behind this error, e.g. [`Rejected`] or [`Validation`].
    #[must_use]
    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        let source = self.source.as_deref()?;
        source.downcast_ref::<E>()
    }

    pub fn validation<S: Into<String>>(reason: S) -> Self {
        Self::with_source(
            Kind::Validation,
            Validation {
                reason: reason.into(),
            },
        )
    }

    pub fn rejected<S: Into<String>>(
        status_code: StatusCode,
        method: Method,
        path: String,
        code: Option<u64>,
        message: S,
    ) -> Self {
        Self::with_source(
            Kind::Rejected,
            Rejected {
                status_code,
                method,
                path,
                code,
                message: message.into(),
            },
        )
    }

    pub(crate) fn transport(source: reqwest::Error) -> Self {
        Self::with_source(Kind::Transport, source)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(src) => write!(f, "{:?}: {}", self.kind, src),
            None => write!(f, "{:?}", self.kind),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn StdError + 'static))
    }
}

/// Payload of a [`Kind::Rejected`] error.
#[non_exhaustive]
#[derive(Clone, Debug)]
pub struct Rejected {
    pub status_code: StatusCode,
    pub method: Method,
    pub path: String,
    /// Upstream error code, when the body carried one.
    pub code: Option<u64>,
    pub message: String,
}

impl fmt::Display for Rejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} rejected with {}: {}",
            self.method, self.path, self.status_code, self.message
        )
    }
}

impl StdError for Rejected {}

/// Payload of a [`Kind::Validation`] error.
#[non_exhaustive]
#[derive(Clone, Debug)]
pub struct Validation {
    pub reason: String,
}

impl fmt::Display for Validation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid: {}", self.reason)
    }
}

impl StdError for Validation {}

impl From<url::ParseError> for Error {
    fn from(e: url::ParseError) -> Self {
        Error::with_source(Kind::Internal, e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::with_source(Kind::Internal, e)
    }
}

impl From<serde_html_form::ser::Error> for Error {
    fn from(e: serde_html_form::ser::Error) -> Self {
        Error::with_source(Kind::Internal, e)
    }
}

impl From<reqwest::header::InvalidHeaderValue> for Error {
    fn from(e: reqwest::header::InvalidHeaderValue) -> Self {
        Error::with_source(Kind::Validation, e)
    }
}

#[cfg(feature = "tracing")]
impl From<serde_path_to_error::Error<serde_json::Error>> for Error {
    fn from(e: serde_path_to_error::Error<serde_json::Error>) -> Self {
        Error::with_source(Kind::Internal, e)
    }
}
