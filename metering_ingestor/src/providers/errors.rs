use thiserror::Error;

/// Errors that can occur within a `ConsumptionDataProvider` implementation.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// An error during an API request (e.g., network failure, timeout).
    #[error("API request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The portal returned a specific error response (e.g., expired session).
    #[error("API error: {0}")]
    Api(String),

    /// The request parameters were invalid for this specific provider.
    #[error("Invalid parameters for provider: {0}")]
    Validation(String),

    /// A credential could not be turned into a request header.
    #[error("Invalid session credential: {0}")]
    Credential(#[from] reqwest::header::InvalidHeaderValue),

    /// An internal error occurred while processing data within the provider.
    #[error("Internal provider error: {0}")]
    Internal(String),
}
