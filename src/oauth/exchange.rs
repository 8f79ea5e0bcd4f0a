// ABOUTME: Token exchange client turning an authorization redirect into a stored access token
// ABOUTME: Parses code or fragment tokens, calls the backend exchange, and persists idempotently
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use crate::backend::{AuthorizationArtifact, DeploymentBackend, TokenExchangeRequest};
use crate::errors::{ExchangeError, PersistError};
use crate::models::{AuthToken, ProviderIdentity, TargetId};
use std::sync::Arc;
use tracing::{info, warn};
use url::Url;

/// Extract the authorization artifact from a provider redirect
///
/// Authorization-code providers put `code` in the query string; implicit-grant
/// providers put `access_token` in the fragment. An `error` parameter in
/// either place means the provider refused.
///
/// # Errors
///
/// - `InvalidRedirect` if the payload is not a URL
/// - `ProviderDenied` if the redirect carries an OAuth error
/// - `MissingArtifact` if neither a code nor a token is present
pub fn parse_artifact(redirect_url: &str) -> Result<AuthorizationArtifact, ExchangeError> {
    let url =
        Url::parse(redirect_url).map_err(|e| ExchangeError::InvalidRedirect(e.to_string()))?;

    let query: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    let fragment: Vec<(String, String)> = url
        .fragment()
        .map(|fragment| {
            url::form_urlencoded::parse(fragment.as_bytes())
                .into_owned()
                .collect()
        })
        .unwrap_or_default();

    let lookup = |key: &str| {
        query
            .iter()
            .chain(fragment.iter())
            .find(|(name, value)| name == key && !value.is_empty())
            .map(|(_, value)| value.clone())
    };

    if let Some(error) = lookup("error") {
        return Err(ExchangeError::ProviderDenied {
            error,
            description: lookup("error_description"),
        });
    }

    if let Some(code) = query
        .iter()
        .find(|(name, value)| name == "code" && !value.is_empty())
    {
        return Ok(AuthorizationArtifact::Code(code.1.clone()));
    }

    fragment
        .iter()
        .find(|(name, value)| name == "access_token" && !value.is_empty())
        .map(|(_, token)| AuthorizationArtifact::Token(token.clone()))
        .ok_or(ExchangeError::MissingArtifact)
}

/// Exchanges authorization artifacts for tokens and stores them
#[derive(Clone)]
pub struct TokenExchangeClient {
    backend: Arc<dyn DeploymentBackend>,
}

impl TokenExchangeClient {
    /// Client over the given backend
    #[must_use]
    pub fn new(backend: Arc<dyn DeploymentBackend>) -> Self {
        Self { backend }
    }

    /// Exchange the artifact in `redirect_url` for a provider token
    ///
    /// # Errors
    ///
    /// Returns an error if the redirect carries no usable artifact or the
    /// backend refuses the exchange
    pub async fn exchange_token(
        &self,
        provider: ProviderIdentity,
        redirect_url: &str,
    ) -> Result<AuthToken, ExchangeError> {
        let artifact = parse_artifact(redirect_url).inspect_err(|e| {
            warn!(scm.provider = %provider, "Rejected authorization redirect: {e}");
        })?;

        let request = TokenExchangeRequest {
            redirect_url: redirect_url.to_owned(),
            artifact,
        };
        let token = self
            .backend
            .exchange_authorization(provider, &request)
            .await?;

        info!(scm.provider = %provider, "Authorization artifact exchanged for token");
        Ok(token)
    }

    /// Store `token` against `target`
    ///
    /// Storing the same token twice leaves the backend in the same state.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses the write
    #[allow(clippy::needless_pass_by_value)]
    pub async fn persist_token(
        &self,
        target: &TargetId,
        provider: ProviderIdentity,
        token: AuthToken,
    ) -> Result<(), PersistError> {
        self.backend.store_token(target, provider, &token).await?;
        info!(scm.target = %target, scm.provider = %provider, "Access token stored");
        Ok(())
    }
}
