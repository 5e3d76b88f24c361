// ABOUTME: Error type for the Repforge API client
// ABOUTME: Separates server-responded failures from transport, decoding, and session failures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::fmt::Display;

use thiserror::Error;

/// Errors raised by the client crate
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with a non-success status
    #[error("{message}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Server-supplied message, or the status reason when none was sent
        message: String,
    },

    /// No response was received
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body did not match the expected shape
    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// The local session store failed
    #[error("Session storage error: {0}")]
    Session(String),

    /// The call needs a signed-in session
    #[error("Not signed in")]
    NotAuthenticated,
}

impl ClientError {
    /// Whether the server produced a response for this failure
    #[must_use]
    pub const fn has_response(&self) -> bool {
        matches!(self, Self::Http { .. })
    }

    /// HTTP status of a server-responded failure
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub(crate) fn session(error: impl Display) -> Self {
        Self::Session(error.to_string())
    }
}

/// Result alias for client operations
pub type ClientResult<T> = Result<T, ClientError>;
