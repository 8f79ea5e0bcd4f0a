// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Wire names, resource paths, notification keys, and diagnostic identifiers
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Constants module
//!
//! Constants are grouped by the collaborator that consumes them rather than
//! kept in a single flat list.

/// `scmType` values used by the backend site configuration
pub mod scm_types {
    /// GitHub repository
    pub const GITHUB: &str = "GitHub";
    /// Bitbucket (git flavour, the one written back by this crate)
    pub const BITBUCKET_GIT: &str = "BitbucketGit";
    /// Bitbucket (mercurial flavour, accepted on read)
    pub const BITBUCKET_HG: &str = "BitbucketHg";
    /// Dropbox folder
    pub const DROPBOX: &str = "Dropbox";
    /// OneDrive folder
    pub const ONEDRIVE: &str = "OneDrive";
    /// Azure Repos (written back by this crate)
    pub const VSO: &str = "VSO";
    /// Azure Repos through release management (accepted on read)
    pub const VSTSRM: &str = "VSTSRM";
    /// Built-in local git repository
    pub const LOCAL_GIT: &str = "LocalGit";
    /// Arbitrary external git remote
    pub const EXTERNAL_GIT: &str = "ExternalGit";
    /// No provider configured
    pub const NONE: &str = "None";
}

/// Short provider slugs used in authorization and token endpoints
pub mod provider_slugs {
    /// GitHub
    pub const GITHUB: &str = "github";
    /// Bitbucket
    pub const BITBUCKET: &str = "bitbucket";
    /// Dropbox
    pub const DROPBOX: &str = "dropbox";
    /// OneDrive
    pub const ONEDRIVE: &str = "onedrive";
    /// Azure Repos
    pub const AZURE_REPOS: &str = "vso";
    /// Local git
    pub const LOCAL_GIT: &str = "localgit";
    /// External git
    pub const EXTERNAL_GIT: &str = "externalgit";
    /// No provider
    pub const NONE: &str = "none";
}

/// Display label keys handed to the localization layer
pub mod label_keys {
    /// GitHub source label
    pub const GITHUB: &str = "deploymentCenterCodeSettingsSourceGitHub";
    /// Bitbucket source label
    pub const BITBUCKET: &str = "deploymentCenterCodeSettingsSourceBitbucket";
    /// Dropbox source label
    pub const DROPBOX: &str = "deploymentCenterCodeSettingsSourceDropbox";
    /// OneDrive source label
    pub const ONEDRIVE: &str = "deploymentCenterCodeSettingsSourceOneDrive";
    /// Azure Repos source label
    pub const AZURE_REPOS: &str = "deploymentCenterCodeSettingsSourceAzureRepos";
    /// Local git source label
    pub const LOCAL_GIT: &str = "deploymentCenterCodeSettingsSourceLocalGit";
    /// External git source label
    pub const EXTERNAL_GIT: &str = "deploymentCenterCodeSettingsSourceExternalGit";
    /// No provider renders an empty label
    pub const NONE: &str = "";
}

/// Notification and confirmation message keys
pub mod messages {
    /// Title and description of the in-flight disconnect notification
    pub const DISCONNECTING: &str = "disconnectingDeployment";
    /// Successful disconnect
    pub const DISCONNECT_SUCCESS: &str = "disconnectingDeploymentSuccess";
    /// Failed disconnect
    pub const DISCONNECT_FAIL: &str = "disconnectingDeploymentFail";
    /// Confirmation dialog title
    pub const DISCONNECT_CONFIRM_TITLE: &str = "kuduDisconnectConfirmationTitle";
    /// Confirmation dialog body
    pub const DISCONNECT_CONFIRM_CONTENT: &str = "disconnectConfirm";
    /// Primary action label
    pub const OK: &str = "ok";
    /// Secondary action label
    pub const CANCEL: &str = "cancel";
}

/// Diagnostic event identifiers
pub mod diagnostics {
    /// Account identity lookup
    pub const GET_ACCOUNT_IDENTITY: &str = "getAccountIdentity";
    /// Linkage record lookup
    pub const GET_SOURCE_CONTROLS: &str = "getSourceControls";
    /// Site configuration lookup
    pub const GET_SITE_CONFIG: &str = "getSiteConfig";
    /// Repository reference parsing
    pub const SPLIT_REPOSITORY_URL: &str = "splitRepositoryUrl";
    /// Disconnect workflow
    pub const DISCONNECT: &str = "disconnect";
    /// Result value for failures
    pub const FAILED: &str = "failed";
}

/// Default values for configuration
pub mod defaults {
    /// Resource manager endpoint
    pub const BACKEND_URL: &str = "https://management.azure.com";
    /// Host serving the provider authorization redirects
    pub const AUTH_BASE_URL: &str = "http://localhost:8081";
    /// Resource manager API version for site config and source control calls
    pub const API_VERSION: &str = "2018-11-01";
    /// Maximum wait for a handshake to complete
    pub const HANDSHAKE_TIMEOUT_SECS: u64 = 300;
    /// Browser context liveness poll interval
    pub const HANDSHAKE_POLL_MS: u64 = 500;
    /// Request timeout for backend calls
    pub const HTTP_TIMEOUT_SECS: u64 = 30;
    /// Connect timeout for backend calls
    pub const HTTP_CONNECT_TIMEOUT_SECS: u64 = 10;
    /// Service name used in structured logs
    pub const SERVICE_NAME: &str = "scm-connect";
}
