// ABOUTME: reqwest implementation of the deployment backend against resource-manager style endpoints
// ABOUTME: Unwraps the properties envelope and turns error bodies into structured BackendError values
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::{
    AuthorizationArtifact, DeploymentBackend, ProviderUser, SiteConfig, SiteConfigPatch,
    SourceControl, TokenExchangeRequest,
};
use crate::config::{BackendConfig, HttpClientConfig};
use crate::errors::BackendError;
use crate::logging::ConnectionLogger;
use crate::models::{AuthToken, ProviderIdentity, TargetId};
use crate::utils::http_client::backend_client;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

const SITE_CONFIG_SUFFIX: &str = "/config/web";
const SOURCE_CONTROL_SUFFIX: &str = "/sourcecontrols/web";

/// `{"properties": {...}}` wrapper used by every resource-manager payload
#[derive(Deserialize)]
struct Envelope<T> {
    properties: T,
}

/// Error body shapes: `{"error":{"code","message"}}` or `{"Code","Message"}`
#[derive(Deserialize, Default)]
struct ErrorBody {
    #[serde(default)]
    error: Option<ErrorDetail>,
    #[serde(default, rename = "Code")]
    code: Option<String>,
    #[serde(default, rename = "Message")]
    message: Option<String>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExchangeBody<'a> {
    redirect_url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    access_token: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StoreTokenBody<'a> {
    resource_id: &'a str,
    token: &'a AuthToken,
}

/// Deployment backend speaking HTTP
#[derive(Debug, Clone)]
pub struct HttpDeploymentBackend {
    client: Client,
    config: BackendConfig,
}

impl HttpDeploymentBackend {
    /// Backend with a freshly built client
    #[must_use]
    pub fn new(config: BackendConfig, http: &HttpClientConfig) -> Self {
        Self::from_client(backend_client(http), config)
    }

    /// Backend sharing an existing client
    #[must_use]
    pub const fn from_client(client: Client, config: BackendConfig) -> Self {
        Self { client, config }
    }

    fn resource_url(&self, target: &TargetId, suffix: &str) -> String {
        let base = self.config.management_url.as_str().trim_end_matches('/');
        let path = target.as_str().trim_start_matches('/');
        format!("{base}/{path}{suffix}")
    }

    fn auth_url(&self, provider: ProviderIdentity, endpoint: &str) -> String {
        let base = self.config.auth_url.as_str().trim_end_matches('/');
        format!("{base}/auth/{}/{endpoint}", provider.slug())
    }

    fn with_api_version(&self, request: RequestBuilder) -> RequestBuilder {
        request.query(&[("api-version", self.config.api_version.as_str())])
    }

    async fn send(operation: &str, request: RequestBuilder) -> Result<Response, BackendError> {
        let response = request.send().await.map_err(|e| {
            let err = BackendError::Transport(e.to_string());
            ConnectionLogger::log_backend_failure(operation, None, err.message());
            err
        })?;

        let status = response.status();
        if status.is_success() {
            debug!(backend.operation = %operation, backend.status = status.as_u16(), "Backend call succeeded");
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let err = status_error(status.as_u16(), &text);
        ConnectionLogger::log_backend_failure(operation, err.status(), err.message());
        Err(err)
    }

    async fn decode<T: DeserializeOwned>(
        operation: &str,
        response: Response,
    ) -> Result<T, BackendError> {
        let text = response
            .text()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        serde_json::from_str(&text).map_err(|e| {
            let err = BackendError::InvalidResponse(format!("{operation}: {e}"));
            ConnectionLogger::log_backend_failure(operation, None, err.message());
            err
        })
    }
}

/// Build a `Status` error from a non-success response body
fn status_error(status: u16, body: &str) -> BackendError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let (code, message) = match parsed.error {
        Some(detail) => (detail.code, detail.message),
        None => (parsed.code, parsed.message),
    };
    let message = message
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| if body.is_empty() { format!("HTTP {status}") } else { body.to_owned() });

    BackendError::Status {
        status,
        code,
        message,
    }
}

#[async_trait]
impl DeploymentBackend for HttpDeploymentBackend {
    async fn update_site_config(
        &self,
        target: &TargetId,
        patch: &SiteConfigPatch,
    ) -> Result<(), BackendError> {
        let url = self.resource_url(target, SITE_CONFIG_SUFFIX);
        let request = self.with_api_version(self.client.patch(url).json(patch));
        Self::send("updateSiteConfig", request).await.map(drop)
    }

    async fn get_site_config(&self, target: &TargetId) -> Result<SiteConfig, BackendError> {
        let url = self.resource_url(target, SITE_CONFIG_SUFFIX);
        let response = Self::send("getSiteConfig", self.with_api_version(self.client.get(url))).await?;
        let envelope: Envelope<SiteConfig> = Self::decode("getSiteConfig", response).await?;
        Ok(envelope.properties)
    }

    async fn get_source_control(&self, target: &TargetId) -> Result<SourceControl, BackendError> {
        let url = self.resource_url(target, SOURCE_CONTROL_SUFFIX);
        let response =
            Self::send("getSourceControls", self.with_api_version(self.client.get(url))).await?;
        let envelope: Envelope<SourceControl> =
            Self::decode("getSourceControls", response).await?;
        Ok(envelope.properties)
    }

    async fn delete_source_control(&self, target: &TargetId) -> Result<(), BackendError> {
        let url = self.resource_url(target, SOURCE_CONTROL_SUFFIX);
        let request = self.with_api_version(self.client.delete(url));
        Self::send("deleteSourceControls", request).await.map(drop)
    }

    async fn get_account_identity(
        &self,
        provider: ProviderIdentity,
    ) -> Result<ProviderUser, BackendError> {
        let response = Self::send(
            "getAccountIdentity",
            self.client.get(self.auth_url(provider, "user")),
        )
        .await?;
        Self::decode("getAccountIdentity", response).await
    }

    async fn exchange_authorization(
        &self,
        provider: ProviderIdentity,
        request: &TokenExchangeRequest,
    ) -> Result<AuthToken, BackendError> {
        let (code, access_token) = match &request.artifact {
            AuthorizationArtifact::Code(code) => (Some(code.as_str()), None),
            AuthorizationArtifact::Token(token) => (None, Some(token.as_str())),
        };
        let body = ExchangeBody {
            redirect_url: &request.redirect_url,
            code,
            access_token,
        };
        let response = Self::send(
            "exchangeToken",
            self.client.post(self.auth_url(provider, "token")).json(&body),
        )
        .await?;
        Self::decode("exchangeToken", response).await
    }

    async fn store_token(
        &self,
        target: &TargetId,
        provider: ProviderIdentity,
        token: &AuthToken,
    ) -> Result<(), BackendError> {
        let body = StoreTokenBody {
            resource_id: target.as_str(),
            token,
        };
        let request = self
            .client
            .put(self.auth_url(provider, "storedtoken"))
            .json(&body);
        Self::send("storeToken", request).await.map(drop)
    }
}
