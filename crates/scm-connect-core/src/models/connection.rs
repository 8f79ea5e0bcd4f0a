// ABOUTME: Deployment target identifiers, connection records, and provider account identity
// ABOUTME: ConnectionRecord is replaced wholesale, never patched field by field
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::ProviderIdentity;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Resource identifier of a deployment target (e.g. `/subscriptions/.../sites/my-app`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetId(String);

impl TargetId {
    /// Wrap a resource identifier
    #[must_use]
    pub fn new(resource_id: impl Into<String>) -> Self {
        Self(resource_id.into())
    }

    /// Borrow the raw resource identifier
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TargetId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TargetId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Backend-held linkage between a deployment target and its provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionRecord {
    /// Connected provider
    pub provider_identity: ProviderIdentity,
    /// Repository URL or folder path, when the provider has a linkage record
    pub repository_reference: Option<String>,
    /// Account name reported alongside the linkage, if any
    pub account_display_name: Option<String>,
}

impl ConnectionRecord {
    /// Record for a target with nothing attached
    #[must_use]
    pub const fn disconnected() -> Self {
        Self {
            provider_identity: ProviderIdentity::None,
            repository_reference: None,
            account_display_name: None,
        }
    }

    /// Whether a provider is attached
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        !self.provider_identity.is_none()
    }
}

impl Default for ConnectionRecord {
    fn default() -> Self {
        Self::disconnected()
    }
}

/// Signed-in identity at the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountIdentity {
    /// Provider the identity belongs to
    pub provider: ProviderIdentity,
    /// Name shown in the "signed in as" field
    pub display_name: String,
}
