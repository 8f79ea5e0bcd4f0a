// ABOUTME: Backend collaborator interface for site configuration, linkage records, and provider tokens
// ABOUTME: DeploymentBackend trait plus the request and response payloads it exchanges
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Backend Collaborator
//!
//! Everything the orchestrator knows about the outside world goes through
//! [`DeploymentBackend`]. The HTTP implementation lives in [`http`]; tests use
//! in-memory fakes.
//!
//! Every method returns `Result<_, BackendError>`: transport failures, error
//! statuses, and undecodable bodies are all values the caller maps to a state
//! transition.

/// Resource-manager-style HTTP implementation
pub mod http;

pub use http::HttpDeploymentBackend;

use crate::errors::BackendError;
use crate::models::{AuthToken, ProviderIdentity, TargetId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Partial update of a target's site configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteConfigPatch {
    /// Properties to change
    pub properties: SiteConfigPatchProperties,
}

/// Properties carried by a [`SiteConfigPatch`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteConfigPatchProperties {
    /// New provider setting
    pub scm_type: ProviderIdentity,
}

impl SiteConfigPatch {
    /// Patch that detaches whatever provider is configured
    #[must_use]
    pub const fn clear_provider() -> Self {
        Self {
            properties: SiteConfigPatchProperties {
                scm_type: ProviderIdentity::None,
            },
        }
    }
}

/// Site configuration as reported by the backend
///
/// `scm_type` stays a raw string so an unrecognized value reaches the
/// registry and is reported as `UnknownProvider` rather than a decode error.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteConfig {
    /// Raw `scmType` value
    pub scm_type: String,
}

/// Linkage record between a target and its provider
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceControl {
    /// Repository URL or folder path
    pub repo_url: String,
    /// Deployed branch, for git providers
    #[serde(default)]
    pub branch: Option<String>,
    /// Account name, when the backend reports one
    #[serde(default)]
    pub account_name: Option<String>,
}

/// Provider account as reported by the identity endpoint
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderUser {
    /// Name to show in the "signed in as" field
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Artifact extracted from an authorization redirect
#[derive(Clone, PartialEq, Eq)]
pub enum AuthorizationArtifact {
    /// Authorization code (authorization-code grant)
    Code(String),
    /// Access token carried in the URL fragment (implicit grant)
    Token(String),
}

impl std::fmt::Debug for AuthorizationArtifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Code(_) => f.write_str("Code([REDACTED])"),
            Self::Token(_) => f.write_str("Token([REDACTED])"),
        }
    }
}

/// Body of the token exchange call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenExchangeRequest {
    /// Raw redirect URL, forwarded so the backend can validate the redirect URI
    pub redirect_url: String,
    /// Parsed artifact
    pub artifact: AuthorizationArtifact,
}

/// Backend operations consumed by the orchestrator
#[async_trait]
pub trait DeploymentBackend: Send + Sync {
    /// `PATCH` the target's site configuration
    async fn update_site_config(
        &self,
        target: &TargetId,
        patch: &SiteConfigPatch,
    ) -> Result<(), BackendError>;

    /// `GET` the target's site configuration
    async fn get_site_config(&self, target: &TargetId) -> Result<SiteConfig, BackendError>;

    /// `GET` the target's linkage record
    async fn get_source_control(&self, target: &TargetId) -> Result<SourceControl, BackendError>;

    /// `DELETE` the target's linkage record
    async fn delete_source_control(&self, target: &TargetId) -> Result<(), BackendError>;

    /// `GET` the signed-in account at the provider, using the stored token
    async fn get_account_identity(
        &self,
        provider: ProviderIdentity,
    ) -> Result<ProviderUser, BackendError>;

    /// `POST` an authorization artifact in exchange for a token
    async fn exchange_authorization(
        &self,
        provider: ProviderIdentity,
        request: &TokenExchangeRequest,
    ) -> Result<AuthToken, BackendError>;

    /// `PUT` a token against the target; replacing an identical token is a no-op
    async fn store_token(
        &self,
        target: &TargetId,
        provider: ProviderIdentity,
        token: &AuthToken,
    ) -> Result<(), BackendError>;
}
