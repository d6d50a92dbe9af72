//! Error taxonomy for the blog pipeline.
//!
//! Each stage owns one error type. [`PipelineError`] wraps the stage errors that
//! abort a request; [`PublishError`] never aborts anything and is folded into a
//! [`crate::PublishResult`] instead. [`ConfigError`] only occurs while the
//! process is starting.

use thiserror::Error;

/// Invalid or missing configuration. Prevents startup; never produced per request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Configuration error: {message}")]
pub struct ConfigError {
    /// Description of the configuration problem.
    pub message: String,
}

impl ConfigError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The authorization header for one outbound request could not be produced.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignatureError {
    /// The HTTP method was empty or not upper-case.
    #[error("Signature generation failed: method '{method}' must be upper-case")]
    InvalidMethod { method: String },

    /// The MAC could not be computed.
    #[error("Signature generation failed: {reason}")]
    Mac { reason: String },
}

/// A third-party service answered with something other than success, or could
/// not be reached.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    /// Non-200 status (or an empty body).
    #[error("{service} API error: {status} - {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    /// The body was present but did not have the expected shape.
    #[error("{service} API returned a malformed body: {reason}")]
    Malformed {
        service: &'static str,
        reason: String,
    },

    /// Connection, timeout, or other transport failure.
    #[error("{service} API call failed: {reason}")]
    Transport {
        service: &'static str,
        reason: String,
    },
}

impl UpstreamError {
    /// The HTTP status, when the service answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Malformed { .. } | Self::Transport { .. } => None,
        }
    }
}

/// The generative-text API did not produce usable content.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// Network, quota, authentication, or protocol failure from the provider.
    #[error("Text generation failed: {0}")]
    Provider(String),

    /// The provider answered but returned no text.
    #[error("Text generation failed: the model returned no content")]
    EmptyResponse,

    /// There was nothing to write about.
    #[error("Text generation failed: no products to write about")]
    NoProducts,
}

/// A CMS submission failed. Captured into a publish result, never propagated.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PublishError {
    #[error("WordPress API error: {status} - {body}")]
    Status { status: u16, body: String },

    #[error("WordPress API call failed: {0}")]
    Transport(String),

    #[error("WordPress API returned a malformed body: {0}")]
    Malformed(String),
}

/// Errors from the product search stage: signing or the call itself.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error(transparent)]
    Signature(#[from] SignatureError),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

/// Errors that abort a whole pipeline run.
///
/// Every variant surfaces to the HTTP caller as `{success:false, error}` with
/// the `Display` text verbatim.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// The request itself was unusable (missing keyword or content).
    #[error("{0}")]
    InvalidInput(String),

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error(transparent)]
    Generation(#[from] GenerationError),
}

impl PipelineError {
    /// Returns `true` if the caller, not a collaborator, caused the failure.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}
