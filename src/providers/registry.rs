// ABOUTME: Provider registry mapping each provider identity to its OAuth capabilities
// ABOUTME: Single capability table for authorization URLs, OAuth usage, and display label keys
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use crate::config::OrchestratorConfig;
use crate::constants::label_keys;
use crate::errors::RegistryError;
use crate::models::ProviderIdentity;
use std::collections::HashMap;
use tracing::{info, warn};
use url::Url;

/// Static capability row: identity, authorization path, display label key
type CapabilityRow = (ProviderIdentity, Option<&'static str>, &'static str);

/// Default capability table
///
/// A `Some` authorization path means the provider is authorized through an
/// OAuth handshake in a secondary browser context.
const CAPABILITIES: [CapabilityRow; 8] = [
    (
        ProviderIdentity::GitHub,
        Some("/auth/github/authorize"),
        label_keys::GITHUB,
    ),
    (
        ProviderIdentity::Bitbucket,
        Some("/auth/bitbucket/authorize"),
        label_keys::BITBUCKET,
    ),
    (
        ProviderIdentity::Dropbox,
        Some("/auth/dropbox/authorize"),
        label_keys::DROPBOX,
    ),
    (
        ProviderIdentity::OneDrive,
        Some("/auth/onedrive/authorize"),
        label_keys::ONEDRIVE,
    ),
    (ProviderIdentity::AzureRepos, None, label_keys::AZURE_REPOS),
    (ProviderIdentity::LocalGit, None, label_keys::LOCAL_GIT),
    (ProviderIdentity::ExternalGit, None, label_keys::EXTERNAL_GIT),
    (ProviderIdentity::None, None, label_keys::NONE),
];

/// Capabilities of one provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderDescriptor {
    /// Provider this row describes
    pub identity: ProviderIdentity,
    /// Where the secondary browser context is pointed, for OAuth providers
    pub authorization_url: Option<Url>,
    /// Whether connecting requires an OAuth handshake
    pub uses_oauth: bool,
    /// Localization key for the source label
    pub display_label_key: &'static str,
}

/// Registry of provider capabilities
///
/// Every branch on provider identity outside the exhaustive enum matches goes
/// through this table, so adding or removing a provider is a one-row change.
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    descriptors: HashMap<ProviderIdentity, ProviderDescriptor>,
}

impl ProviderRegistry {
    /// Registry with the default capability table rooted at `auth_base`
    #[must_use]
    pub fn new(auth_base: &Url) -> Self {
        let mut registry = Self::empty();
        for (identity, path, label) in CAPABILITIES {
            let authorization_url = path.and_then(|path| match auth_base.join(path) {
                Ok(url) => Some(url),
                Err(e) => {
                    warn!("Invalid authorization URL for {identity}: {e}");
                    None
                }
            });
            registry.register(ProviderDescriptor {
                identity,
                uses_oauth: authorization_url.is_some(),
                authorization_url,
                display_label_key: label,
            });
        }

        let oauth = registry
            .oauth_providers()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        info!("Provider registry initialized; OAuth providers: {oauth}");
        registry
    }

    /// Registry built from configuration, applying authorization URL overrides
    #[must_use]
    pub fn from_config(config: &OrchestratorConfig) -> Self {
        let mut registry = Self::new(&config.backend.auth_url);
        for (identity, url) in &config.authorize_urls {
            if let Some(descriptor) = registry.descriptors.get_mut(identity) {
                if descriptor.uses_oauth {
                    descriptor.authorization_url = Some(url.clone());
                } else {
                    warn!("Ignoring authorization URL override for non-OAuth provider {identity}");
                }
            }
        }
        registry
    }

    /// Registry with no providers
    #[must_use]
    pub fn empty() -> Self {
        Self {
            descriptors: HashMap::new(),
        }
    }

    /// Register or replace a provider row
    pub fn register(&mut self, descriptor: ProviderDescriptor) {
        self.descriptors.insert(descriptor.identity, descriptor);
    }

    /// Look up a provider's capabilities
    ///
    /// # Errors
    ///
    /// Returns `UnknownProvider` if the identity has no row
    pub fn resolve(&self, identity: ProviderIdentity) -> Result<&ProviderDescriptor, RegistryError> {
        self.descriptors
            .get(&identity)
            .ok_or_else(|| RegistryError::UnknownProvider(identity.to_string()))
    }

    /// Look up a provider by its backend `scmType` value
    ///
    /// # Errors
    ///
    /// Returns `UnknownProvider` for names outside the enumerated set
    pub fn resolve_scm_type(&self, scm_type: &str) -> Result<&ProviderDescriptor, RegistryError> {
        self.resolve(scm_type.parse()?)
    }

    /// Display label key for a provider, empty when unknown
    #[must_use]
    pub fn display_label_key(&self, identity: ProviderIdentity) -> &'static str {
        self.resolve(identity)
            .map_or(label_keys::NONE, |descriptor| descriptor.display_label_key)
    }

    /// Whether the provider is authorized through a handshake
    #[must_use]
    pub fn uses_oauth(&self, identity: ProviderIdentity) -> bool {
        self.resolve(identity)
            .is_ok_and(|descriptor| descriptor.uses_oauth)
    }

    /// Providers with a registry row, in display order
    #[must_use]
    pub fn supported_providers(&self) -> Vec<ProviderIdentity> {
        ProviderIdentity::ALL
            .into_iter()
            .filter(|identity| self.descriptors.contains_key(identity))
            .collect()
    }

    /// Providers that use an OAuth handshake, in display order
    #[must_use]
    pub fn oauth_providers(&self) -> Vec<ProviderIdentity> {
        self.supported_providers()
            .into_iter()
            .filter(|identity| self.uses_oauth(*identity))
            .collect()
    }
}
