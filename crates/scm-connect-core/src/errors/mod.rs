// ABOUTME: Error taxonomy for provider registry, handshake, token exchange, fetch, and disconnect
// ABOUTME: Every failure maps to an ErrorCode that tells the orchestrator whether the operator can retry
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Error Handling
//!
//! Each component owns a small `thiserror` enum. The enums share one
//! [`ErrorCode`] table so the orchestrator can decide how to surface a failure
//! without matching on every variant of every component.
//!
//! Backend failures are values, never panics: every backend call returns a
//! [`BackendError`] that carries the HTTP status and the message extracted from
//! the response body.

use crate::models::ProviderIdentity;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

/// Standard error codes used throughout the orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Provider identity outside the registry
    UnknownProvider,
    /// Handshake requested for a provider without OAuth
    OAuthNotSupported,
    /// Secondary browser context could not be opened
    BrowserUnavailable,
    /// Handshake started outside an async runtime
    RuntimeUnavailable,
    /// Redirect did not carry a usable authorization artifact
    InvalidAuthorization,
    /// Provider or backend refused the authorization artifact
    ExchangeFailed,
    /// Token could not be stored against the target
    PersistFailed,
    /// Connection state could not be read
    FetchFailed,
    /// Clearing the provider setting failed
    ConfigUpdateFailed,
    /// Provider setting cleared but linkage record still present
    PartialDisconnect,
    /// Another connect or disconnect is already running
    OperationInProgress,
}

impl ErrorCode {
    /// Whether re-invoking the same action can succeed
    ///
    /// Only programmer errors are fatal; everything else is retried by the
    /// operator, never automatically.
    #[must_use]
    pub const fn is_recoverable(self) -> bool {
        !matches!(
            self,
            Self::UnknownProvider | Self::OAuthNotSupported | Self::RuntimeUnavailable
        )
    }

    /// Human-readable description for logs
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::UnknownProvider => "Provider is not part of the registry",
            Self::OAuthNotSupported => "Provider does not use an OAuth handshake",
            Self::BrowserUnavailable => "Authorization window could not be opened",
            Self::RuntimeUnavailable => "Handshake needs a running Tokio runtime",
            Self::InvalidAuthorization => "Authorization redirect carried no usable artifact",
            Self::ExchangeFailed => "Authorization artifact could not be exchanged for a token",
            Self::PersistFailed => "Access token could not be stored",
            Self::FetchFailed => "Connection state could not be read",
            Self::ConfigUpdateFailed => "Deployment target configuration could not be updated",
            Self::PartialDisconnect => {
                "Provider setting was cleared but the source control link remains"
            }
            Self::OperationInProgress => "Another connection operation is already running",
        }
    }
}

/// Failure reported by the backend collaborator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// Request never produced a response
    #[error("Transport failure: {0}")]
    Transport(String),

    /// Backend answered with a non-success status
    #[error("Backend returned {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Structured error code from the response body, if any
        code: Option<String>,
        /// Message extracted from the response body
        message: String,
    },

    /// Success status but a body that could not be decoded
    #[error("Unexpected response body: {0}")]
    InvalidResponse(String),
}

impl BackendError {
    /// Message suitable for a diagnostic payload
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Transport(message) | Self::InvalidResponse(message) => message,
            Self::Status { message, .. } => message,
        }
    }

    /// HTTP status, when the backend answered
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(_) | Self::InvalidResponse(_) => None,
        }
    }

    /// Structured form used in diagnostic events
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Transport(message) => json!({ "kind": "transport", "message": message }),
            Self::Status {
                status,
                code,
                message,
            } => json!({ "kind": "status", "status": status, "code": code, "message": message }),
            Self::InvalidResponse(message) => {
                json!({ "kind": "invalid_response", "message": message })
            }
        }
    }
}

/// Provider registry lookup failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Identity or wire name outside the enumerated set
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),
}

impl RegistryError {
    /// Error classification
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        ErrorCode::UnknownProvider
    }
}

/// Authorization handshake could not be started
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandshakeError {
    /// Provider has no OAuth flow
    #[error("Provider {0} does not use an OAuth handshake")]
    OAuthNotSupported(ProviderIdentity),

    /// Provider missing from the registry
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Browser launcher refused to open the secondary context
    #[error("Could not open authorization window: {0}")]
    BrowserUnavailable(String),

    /// Called outside a Tokio runtime, so the completion wait cannot be spawned
    #[error("No Tokio runtime available to wait for the handshake")]
    RuntimeUnavailable,
}

impl HandshakeError {
    /// Error classification
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::OAuthNotSupported(_) => ErrorCode::OAuthNotSupported,
            Self::Registry(_) => ErrorCode::UnknownProvider,
            Self::BrowserUnavailable(_) => ErrorCode::BrowserUnavailable,
            Self::RuntimeUnavailable => ErrorCode::RuntimeUnavailable,
        }
    }
}

/// Authorization artifact could not be exchanged for a token
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExchangeError {
    /// Redirect payload is not a URL
    #[error("Invalid redirect URL: {0}")]
    InvalidRedirect(String),

    /// Redirect carried neither a code nor a token
    #[error("Redirect URL carries no authorization artifact")]
    MissingArtifact,

    /// Provider redirected back with an error
    #[error("Provider denied authorization: {error}")]
    ProviderDenied {
        /// OAuth error code (e.g. `access_denied`)
        error: String,
        /// Optional human-readable description
        description: Option<String>,
    },

    /// Backend rejected the artifact or could not be reached
    #[error("Token exchange failed: {0}")]
    Backend(#[from] BackendError),
}

impl ExchangeError {
    /// Error classification
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidRedirect(_) | Self::MissingArtifact | Self::ProviderDenied { .. } => {
                ErrorCode::InvalidAuthorization
            }
            Self::Backend(_) => ErrorCode::ExchangeFailed,
        }
    }
}

/// Token could not be stored
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistError {
    /// Backend refused or was unreachable
    #[error("Token persistence failed: {0}")]
    Backend(#[from] BackendError),
}

impl PersistError {
    /// Error classification
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        ErrorCode::PersistFailed
    }
}

/// Connection state could not be read
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Backend refused or was unreachable
    #[error("Fetch failed: {0}")]
    Backend(#[from] BackendError),

    /// Provider answered but without a usable display name
    #[error("No signed-in account for {0}")]
    MissingDisplayName(ProviderIdentity),

    /// Site configuration names a provider outside the enumerated set
    #[error(transparent)]
    UnknownProvider(#[from] RegistryError),
}

impl FetchError {
    /// Error classification
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::UnknownProvider(_) => ErrorCode::UnknownProvider,
            Self::Backend(_) | Self::MissingDisplayName(_) => ErrorCode::FetchFailed,
        }
    }

    /// Message suitable for a diagnostic payload
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Backend(err) => err.message().to_owned(),
            other => other.to_string(),
        }
    }
}

/// Disconnect workflow failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DisconnectError {
    /// Clearing the provider setting failed; nothing changed
    #[error("Could not clear provider setting: {0}")]
    ConfigUpdate(BackendError),

    /// Provider setting cleared but the linkage record could not be deleted
    #[error("Provider setting cleared but source control link could not be deleted: {0}")]
    LinkageDelete(BackendError),
}

impl DisconnectError {
    /// Error classification
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::ConfigUpdate(_) => ErrorCode::ConfigUpdateFailed,
            Self::LinkageDelete(_) => ErrorCode::PartialDisconnect,
        }
    }

    /// Whether the backend was left with the setting cleared but the link intact
    #[must_use]
    pub const fn is_partial(&self) -> bool {
        matches!(self, Self::LinkageDelete(_))
    }

    /// Underlying backend failure
    #[must_use]
    pub const fn backend(&self) -> &BackendError {
        match self {
            Self::ConfigUpdate(err) | Self::LinkageDelete(err) => err,
        }
    }
}

/// Failure surfaced by the orchestrator facade
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrchestratorError {
    /// A connect or disconnect is already running on this instance
    #[error("Another connection operation is already in progress")]
    OperationInProgress,

    /// Handshake could not be started
    #[error(transparent)]
    Handshake(#[from] HandshakeError),

    /// Token exchange failed
    #[error(transparent)]
    Exchange(#[from] ExchangeError),

    /// Token persistence failed
    #[error(transparent)]
    Persist(#[from] PersistError),

    /// Disconnect failed
    #[error(transparent)]
    Disconnect(#[from] DisconnectError),

    /// Connection record could not be read before acting on it
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Provider lookup failed
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl OrchestratorError {
    /// Error classification
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::OperationInProgress => ErrorCode::OperationInProgress,
            Self::Handshake(err) => err.code(),
            Self::Exchange(err) => err.code(),
            Self::Persist(err) => err.code(),
            Self::Disconnect(err) => err.code(),
            Self::Fetch(err) => err.code(),
            Self::Registry(err) => err.code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn not_found() -> BackendError {
        BackendError::Status {
            status: 404,
            code: Some("NotFound".to_owned()),
            message: "Source control not found".to_owned(),
        }
    }

    #[test]
    fn test_unknown_provider_is_fatal() {
        let err = RegistryError::UnknownProvider("Codeplex".to_owned());
        assert_eq!(err.to_string(), "Unknown provider: Codeplex");
        assert!(!err.code().is_recoverable());
    }

    #[test]
    fn test_backend_error_message_and_status() {
        let err = not_found();
        assert_eq!(err.message(), "Source control not found");
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.to_json()["code"], "NotFound");

        let transport = BackendError::Transport("connection reset".to_owned());
        assert_eq!(transport.status(), None);
        assert_eq!(transport.to_json()["kind"], "transport");
    }

    #[test]
    fn test_partial_disconnect_is_recoverable() {
        let err = DisconnectError::LinkageDelete(not_found());
        assert!(err.is_partial());
        assert_eq!(err.code(), ErrorCode::PartialDisconnect);
        assert!(err.code().is_recoverable());
        assert_eq!(err.backend().status(), Some(404));

        let config = DisconnectError::ConfigUpdate(not_found());
        assert!(!config.is_partial());
    }

    #[test]
    fn test_exchange_error_codes() {
        assert_eq!(
            ExchangeError::MissingArtifact.code(),
            ErrorCode::InvalidAuthorization
        );
        assert_eq!(
            ExchangeError::from(not_found()).code(),
            ErrorCode::ExchangeFailed
        );
    }

    #[test]
    fn test_orchestrator_error_delegates_code() {
        let err: OrchestratorError =
            HandshakeError::OAuthNotSupported(ProviderIdentity::LocalGit).into();
        assert_eq!(err.code(), ErrorCode::OAuthNotSupported);
        assert_eq!(
            err.to_string(),
            "Provider LocalGit does not use an OAuth handshake"
        );
        assert_eq!(
            OrchestratorError::OperationInProgress.code(),
            ErrorCode::OperationInProgress
        );
    }

    #[test]
    fn test_fetch_error_message_prefers_backend_text() {
        let err = FetchError::from(not_found());
        assert_eq!(err.message(), "Source control not found");
        let missing = FetchError::MissingDisplayName(ProviderIdentity::Dropbox);
        assert_eq!(missing.message(), "No signed-in account for Dropbox");
    }
}
