// ABOUTME: HTTP client construction with connection pooling and timeout configuration
// ABOUTME: Builds the reqwest client shared by all backend calls of one orchestrator

use crate::config::HttpClientConfig;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;

/// Create the HTTP client used for backend calls
///
/// Falls back to a default client if the builder rejects the configuration,
/// so a bad timeout never prevents the orchestrator from starting.
#[must_use]
pub fn backend_client(config: &HttpClientConfig) -> Client {
    create_client_with_timeout(config.timeout_secs, config.connect_timeout_secs)
}

/// Create a new HTTP client with custom timeout settings
///
/// # Arguments
/// * `timeout_secs` - Request timeout in seconds
/// * `connect_timeout_secs` - Connection timeout in seconds
#[must_use]
pub fn create_client_with_timeout(timeout_secs: u64, connect_timeout_secs: u64) -> Client {
    ClientBuilder::new()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(connect_timeout_secs))
        .user_agent(concat!("scm-connect/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|_| Client::new())
}
