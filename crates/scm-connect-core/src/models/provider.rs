// ABOUTME: Closed set of source-control provider identities and their wire names
// ABOUTME: ProviderIdentity enum with scmType parsing, slugs, and linkage-record semantics
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use crate::constants::{provider_slugs, scm_types};
use crate::errors::RegistryError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Source-control provider attached to a deployment target
///
/// The set is closed: every branch on provider identity in the workspace is an
/// exhaustive `match`, so adding a provider is a compile-checked change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ProviderIdentity {
    /// GitHub repository
    GitHub,
    /// Bitbucket repository
    Bitbucket,
    /// Dropbox folder
    Dropbox,
    /// OneDrive folder
    OneDrive,
    /// Azure Repos repository
    AzureRepos,
    /// Built-in local git repository
    LocalGit,
    /// External git remote
    ExternalGit,
    /// Nothing connected
    None,
}

impl ProviderIdentity {
    /// Every identity, in display order
    pub const ALL: [Self; 8] = [
        Self::GitHub,
        Self::Bitbucket,
        Self::Dropbox,
        Self::OneDrive,
        Self::AzureRepos,
        Self::LocalGit,
        Self::ExternalGit,
        Self::None,
    ];

    /// Value written to the target's `scmType` setting
    #[must_use]
    pub const fn scm_type(self) -> &'static str {
        match self {
            Self::GitHub => scm_types::GITHUB,
            Self::Bitbucket => scm_types::BITBUCKET_GIT,
            Self::Dropbox => scm_types::DROPBOX,
            Self::OneDrive => scm_types::ONEDRIVE,
            Self::AzureRepos => scm_types::VSO,
            Self::LocalGit => scm_types::LOCAL_GIT,
            Self::ExternalGit => scm_types::EXTERNAL_GIT,
            Self::None => scm_types::NONE,
        }
    }

    /// Lowercase slug used in authorization and token endpoint paths
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::GitHub => provider_slugs::GITHUB,
            Self::Bitbucket => provider_slugs::BITBUCKET,
            Self::Dropbox => provider_slugs::DROPBOX,
            Self::OneDrive => provider_slugs::ONEDRIVE,
            Self::AzureRepos => provider_slugs::AZURE_REPOS,
            Self::LocalGit => provider_slugs::LOCAL_GIT,
            Self::ExternalGit => provider_slugs::EXTERNAL_GIT,
            Self::None => provider_slugs::NONE,
        }
    }

    /// Whether the backend keeps a separate linkage record for this provider
    ///
    /// Local git lives entirely in the site configuration and "no provider"
    /// has nothing to link.
    #[must_use]
    pub const fn has_linkage_record(self) -> bool {
        !matches!(self, Self::LocalGit | Self::None)
    }

    /// True for the "nothing connected" sentinel
    #[must_use]
    pub const fn is_none(self) -> bool {
        matches!(self, Self::None)
    }
}

impl fmt::Display for ProviderIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.scm_type())
    }
}

impl FromStr for ProviderIdentity {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            scm_types::GITHUB => Ok(Self::GitHub),
            scm_types::BITBUCKET_GIT | scm_types::BITBUCKET_HG => Ok(Self::Bitbucket),
            scm_types::DROPBOX => Ok(Self::Dropbox),
            scm_types::ONEDRIVE => Ok(Self::OneDrive),
            scm_types::VSO | scm_types::VSTSRM => Ok(Self::AzureRepos),
            scm_types::LOCAL_GIT => Ok(Self::LocalGit),
            scm_types::EXTERNAL_GIT => Ok(Self::ExternalGit),
            scm_types::NONE => Ok(Self::None),
            other => Err(RegistryError::UnknownProvider(other.to_owned())),
        }
    }
}

impl TryFrom<String> for ProviderIdentity {
    type Error = RegistryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ProviderIdentity> for String {
    fn from(identity: ProviderIdentity) -> Self {
        identity.scm_type().to_owned()
    }
}
