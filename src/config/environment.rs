// ABOUTME: Environment configuration for backend endpoints, handshake limits, and HTTP timeouts
// ABOUTME: Parses SCM_* variables with defaults and contextual errors for malformed values
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Environment-based configuration for the connection orchestrator

use crate::constants::defaults;
use crate::models::ProviderIdentity;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::env;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Limits for the authorization handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandshakeConfig {
    /// Maximum wait for the secondary browser context to complete
    pub timeout: Duration,
    /// How often the secondary context is checked for being closed
    pub poll_interval: Duration,
}

impl Default for HandshakeConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(defaults::HANDSHAKE_TIMEOUT_SECS),
            poll_interval: Duration::from_millis(defaults::HANDSHAKE_POLL_MS),
        }
    }
}

/// Timeouts for the shared HTTP client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpClientConfig {
    /// Whole-request timeout
    pub timeout_secs: u64,
    /// Connection establishment timeout
    pub connect_timeout_secs: u64,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: defaults::HTTP_TIMEOUT_SECS,
            connect_timeout_secs: defaults::HTTP_CONNECT_TIMEOUT_SECS,
        }
    }
}

/// Backend endpoint settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    /// Resource manager base URL (site config and source control calls)
    pub management_url: Url,
    /// Host serving `/auth/{provider}/...` token and identity endpoints
    pub auth_url: Url,
    /// `api-version` query parameter for resource manager calls
    pub api_version: String,
}

impl BackendConfig {
    /// Backend settings with the default API version
    #[must_use]
    pub fn new(management_url: Url, auth_url: Url) -> Self {
        Self {
            management_url,
            auth_url,
            api_version: defaults::API_VERSION.to_owned(),
        }
    }
}

/// Complete orchestrator configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Backend endpoints
    pub backend: BackendConfig,
    /// Handshake limits
    pub handshake: HandshakeConfig,
    /// HTTP client timeouts
    pub http: HttpClientConfig,
    /// Per-provider authorization URL overrides
    pub authorize_urls: HashMap<ProviderIdentity, Url>,
}

impl OrchestratorConfig {
    /// Configuration with default limits for the given backend
    #[must_use]
    pub fn new(backend: BackendConfig) -> Self {
        Self {
            backend,
            handshake: HandshakeConfig::default(),
            http: HttpClientConfig::default(),
            authorize_urls: HashMap::new(),
        }
    }

    /// Load configuration from `SCM_*` environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a URL or numeric variable is present but malformed
    pub fn from_env() -> Result<Self> {
        let backend = BackendConfig {
            management_url: env_url("SCM_BACKEND_URL", defaults::BACKEND_URL)?,
            auth_url: env_url("SCM_AUTH_BASE_URL", defaults::AUTH_BASE_URL)?,
            api_version: env_var_or("SCM_API_VERSION", defaults::API_VERSION),
        };

        let handshake = HandshakeConfig {
            timeout: Duration::from_secs(env_u64(
                "SCM_HANDSHAKE_TIMEOUT_SECS",
                defaults::HANDSHAKE_TIMEOUT_SECS,
            )?),
            poll_interval: Duration::from_millis(env_u64(
                "SCM_HANDSHAKE_POLL_MS",
                defaults::HANDSHAKE_POLL_MS,
            )?),
        };
        if handshake.poll_interval.is_zero() {
            anyhow::bail!("SCM_HANDSHAKE_POLL_MS must be greater than zero");
        }

        let http = HttpClientConfig {
            timeout_secs: env_u64("SCM_HTTP_TIMEOUT_SECS", defaults::HTTP_TIMEOUT_SECS)?,
            connect_timeout_secs: env_u64(
                "SCM_HTTP_CONNECT_TIMEOUT_SECS",
                defaults::HTTP_CONNECT_TIMEOUT_SECS,
            )?,
        };

        let mut authorize_urls = HashMap::new();
        for provider in ProviderIdentity::ALL {
            let key = format!("SCM_{}_AUTHORIZE_URL", provider.slug().to_uppercase());
            if let Ok(raw) = env::var(&key) {
                let url = Url::parse(&raw).with_context(|| format!("{key} is not a valid URL"))?;
                debug!("Authorization URL override for {provider}: {url}");
                authorize_urls.insert(provider, url);
            }
        }

        let config = Self {
            backend,
            handshake,
            http,
            authorize_urls,
        };
        info!("{}", config.summary());
        Ok(config)
    }

    /// Configuration summary for logging (contains no secrets)
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "SCM connection orchestrator configuration:\n\
             - Management URL: {}\n\
             - Auth URL: {}\n\
             - API version: {}\n\
             - Handshake timeout: {}s (poll every {}ms)\n\
             - HTTP timeout: {}s (connect {}s)\n\
             - Authorization URL overrides: {}",
            self.backend.management_url,
            self.backend.auth_url,
            self.backend.api_version,
            self.handshake.timeout.as_secs(),
            self.handshake.poll_interval.as_millis(),
            self.http.timeout_secs,
            self.http.connect_timeout_secs,
            self.authorize_urls.len()
        )
    }
}

/// Get environment variable or default value
fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn env_u64(key: &str, default: u64) -> Result<u64> {
    env::var(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse()
            .with_context(|| format!("{key} must be a non-negative integer, got {raw:?}"))
    })
}

fn env_url(key: &str, default: &str) -> Result<Url> {
    let raw = env_var_or(key, default);
    Url::parse(&raw).with_context(|| format!("{key} is not a valid URL: {raw:?}"))
}
