//! Error types for llm-connector modules using thiserror.

use thiserror::Error;

/// A required request field was missing or blank.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Malformed request body: {0}")]
    MalformedBody(String),
}

/// The caller asked for something the service is not configured to do.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Unsupported prompting strategy: {0}")]
    UnsupportedStrategy(String),

    #[error("Unknown environment '{0}' (expected development, production or testing)")]
    UnknownEnvironment(String),
}

/// Errors from a provider round-trip.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("{0}")]
    Transport(#[source] reqwest::Error),

    #[error("{provider} API error ({status}): {message}")]
    Api {
        provider: &'static str,
        status: u16,
        message: String,
    },

    #[error("{provider} returned a malformed response: {detail}")]
    MalformedResponse {
        provider: &'static str,
        detail: String,
    },
}

/// Everything a single relay call can fail with.
///
/// The HTTP layer is the only place that turns these into responses.
#[derive(Error, Debug)]
pub enum RelayError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl RelayError {
    /// Whether the failure is attributable to the caller's input.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            RelayError::Validation(_) | RelayError::Configuration(_)
        )
    }
}
