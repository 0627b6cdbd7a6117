//! Error types for the todo API client.
//!
//! # Design
//! One variant per failure the services distinguish: `Auth` and `Validation`
//! carry the server's message for login and register rejections, `Network`
//! covers transport failures where no response arrived at all, and
//! `InvalidResponse` covers 2xx bodies that do not match the expected shape.
//! The `Display` text of each variant is what the services ultimately show
//! to the user, so message-bearing variants print the message alone.

use thiserror::Error;

/// Errors returned by [`ApiClient`](crate::ApiClient) operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced an HTTP response. Carries the transport's
    /// own message, which may be empty; see [`user_message`].
    #[error("{0}")]
    Network(String),

    /// The server rejected a login (non-2xx), e.g. invalid credentials.
    #[error("{message}")]
    Auth { status: u16, message: String },

    /// The server rejected a registration payload, e.g. a duplicate email.
    #[error("{message}")]
    Validation { status: u16, message: String },

    /// Any other non-2xx status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// A 2xx response whose body could not be deserialized.
    #[error("unexpected response body: {0}")]
    InvalidResponse(String),

    /// The request payload could not be serialized to JSON.
    #[error("request serialization failed: {0}")]
    Serialization(String),
}

/// Fallback shown when a propagated error carries no usable message.
pub(crate) const UNKNOWN_ERROR: &str = "An unknown error occurred";

/// The string a service surfaces to the user for a propagated error.
pub(crate) fn user_message(err: &ApiError) -> String {
    let message = err.to_string();
    if message.trim().is_empty() {
        UNKNOWN_ERROR.to_string()
    } else {
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_passes_server_text_through() {
        let err = ApiError::Auth {
            status: 401,
            message: "invalid credentials".to_string(),
        };
        assert_eq!(user_message(&err), "invalid credentials");
    }

    #[test]
    fn user_message_falls_back_when_empty() {
        let err = ApiError::Network(String::new());
        assert_eq!(user_message(&err), UNKNOWN_ERROR);
    }
}
