//! Error types for the relay pipeline.

use thiserror::Error;

/// The inbound body could not be decoded into an alert batch.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct DecodeError(#[from] serde_json::Error);

/// Errors that can occur when delivering a card to Teams.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The HTTP client could not be built
    #[error("HTTP client setup failed: {0}")]
    Client(#[source] reqwest::Error),

    /// The request could not be sent (connection refused, DNS, timeout, ...)
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Teams answered with something other than 200 OK
    #[error("Error: {status}")]
    Delivery {
        /// Status line as returned by the endpoint, e.g. `400 Bad Request`
        status: String,
        /// Response body, if any could be read
        body: String,
    },

    /// The card could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DispatchError {
    /// Returns `true` if the endpoint was reached but rejected the card.
    #[must_use]
    pub const fn is_delivery(&self) -> bool {
        matches!(self, Self::Delivery { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reqwest_error() -> reqwest::Error {
        reqwest::Client::new().get("not a url").build().unwrap_err()
    }

    #[test]
    fn test_client_error_is_not_transport() {
        let err = DispatchError::Client(reqwest_error());
        assert!(!matches!(err, DispatchError::Transport(_)));
        assert!(!err.is_delivery());
        assert!(err.to_string().starts_with("HTTP client setup failed: "));
    }

    #[test]
    fn test_reqwest_error_converts_to_transport() {
        let err = DispatchError::from(reqwest_error());
        assert!(matches!(err, DispatchError::Transport(_)));
    }
}
