// ABOUTME: Handshake session identifiers, completion signals, and authorization outcomes
// ABOUTME: AuthorizationResult is produced exactly once per handshake attempt
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::ProviderIdentity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Correlation token for one handshake attempt
///
/// Travels to the provider as the `state` parameter and comes back with the
/// completion signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Fresh random session token
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a token echoed back in a redirect
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Uuid::parse_str(value).ok().map(Self)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// In-flight authorization attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeSession {
    /// Correlation token
    pub id: SessionId,
    /// Provider being authorized
    pub provider: ProviderIdentity,
    /// When the secondary browser context was opened
    pub started_at: DateTime<Utc>,
}

impl HandshakeSession {
    /// Start a new session for `provider`
    #[must_use]
    pub fn start(provider: ProviderIdentity) -> Self {
        Self {
            id: SessionId::generate(),
            provider,
            started_at: Utc::now(),
        }
    }
}

/// Message posted back by the secondary browser context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionSignal {
    /// Session the signal claims to belong to
    pub session: SessionId,
    /// Final URL the provider redirected to, absent if the flow was abandoned
    pub redirect_url: Option<String>,
}

/// Why a handshake finished without a redirect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelReason {
    /// The user closed the secondary context (or it reported no redirect)
    ContextClosed,
    /// The bounded wait elapsed
    TimedOut,
    /// A newer attempt replaced this one
    Superseded,
}

/// Outcome of one handshake attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationResult {
    /// The provider redirected back; the URL carries the authorization artifact
    Redirect {
        /// Session that completed
        session: SessionId,
        /// Raw redirect URL
        redirect_url: String,
    },
    /// The attempt ended without an artifact
    Cancelled {
        /// Session that ended
        session: SessionId,
        /// Why it ended
        reason: CancelReason,
    },
}

impl AuthorizationResult {
    /// Redirect payload, if the attempt succeeded
    #[must_use]
    pub fn redirect_url(&self) -> Option<&str> {
        match self {
            Self::Redirect { redirect_url, .. } => Some(redirect_url),
            Self::Cancelled { .. } => None,
        }
    }

    /// Session this result belongs to
    #[must_use]
    pub const fn session(&self) -> SessionId {
        match self {
            Self::Redirect { session, .. } | Self::Cancelled { session, .. } => *session,
        }
    }

    /// Whether the attempt ended without an artifact
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}
