// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client error types shared by the session, API, and store layers.

/// Client error type surfaced to embedders.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("No active session")]
    NoSession,

    #[error("Session expired and could not be refreshed")]
    SessionExpired,

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    #[error("API error (HTTP {status}): {detail}")]
    Api { status: u16, detail: String },

    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("Invalid input: {0}")]
    Invalid(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ClientError {
    /// True when the caller should send the user back to sign-in.
    pub fn is_auth_rejection(&self) -> bool {
        matches!(self, ClientError::NoSession | ClientError::SessionExpired)
    }

    /// Map a transport-level reqwest failure to the matching client error.
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
