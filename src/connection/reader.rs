// ABOUTME: Connection state reader fetching account identity and the connection record from the backend
// ABOUTME: Publishes each slice on its own watch channel and logs diagnostics for failed fetches
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::state::{AccountSlice, ConnectionSlice, ConnectionView, Loadable};
use crate::backend::DeploymentBackend;
use crate::constants::diagnostics;
use crate::errors::FetchError;
use crate::models::{AccountIdentity, ConnectionRecord, ProviderIdentity, TargetId};
use crate::presentation::{DiagnosticEvent, DiagnosticSink};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Reads connection state and publishes it as two independent slices
///
/// The reader is the single writer of both channels. Views subscribe and only
/// ever see snapshots.
pub struct ConnectionStateReader {
    backend: Arc<dyn DeploymentBackend>,
    diagnostics: Arc<dyn DiagnosticSink>,
    account_tx: watch::Sender<AccountSlice>,
    connection_tx: watch::Sender<ConnectionSlice>,
}

impl ConnectionStateReader {
    /// Reader with both slices in their initial `Loading` state
    #[must_use]
    pub fn new(backend: Arc<dyn DeploymentBackend>, diagnostics: Arc<dyn DiagnosticSink>) -> Self {
        let (account_tx, _) = watch::channel(AccountSlice::default());
        let (connection_tx, _) = watch::channel(ConnectionSlice::default());
        Self {
            backend,
            diagnostics,
            account_tx,
            connection_tx,
        }
    }

    /// Signed-in account at `provider`
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails or the provider reports no
    /// display name
    pub async fn fetch_account_identity(
        &self,
        provider: ProviderIdentity,
    ) -> Result<AccountIdentity, FetchError> {
        let result = match self.backend.get_account_identity(provider).await {
            Ok(user) => user
                .display_name
                .filter(|name| !name.trim().is_empty())
                .map(|display_name| AccountIdentity {
                    provider,
                    display_name,
                })
                .ok_or(FetchError::MissingDisplayName(provider)),
            Err(e) => Err(e.into()),
        };

        if let Err(e) = &result {
            self.report_failure(diagnostics::GET_ACCOUNT_IDENTITY, e, Some(provider));
        }
        result
    }

    /// Connection record of `target`
    ///
    /// Reads the provider from the site configuration, then the repository
    /// reference from the linkage record for providers that keep one.
    ///
    /// # Errors
    ///
    /// Returns an error if either backend call fails or the configured
    /// provider is not recognized
    pub async fn fetch_connection_record(
        &self,
        target: &TargetId,
    ) -> Result<ConnectionRecord, FetchError> {
        let site_config = self
            .backend
            .get_site_config(target)
            .await
            .map_err(FetchError::from)
            .inspect_err(|e| self.report_failure(diagnostics::GET_SITE_CONFIG, e, None))?;

        let provider_identity: ProviderIdentity = site_config
            .scm_type
            .parse()
            .map_err(FetchError::from)
            .inspect_err(|e| self.report_failure(diagnostics::GET_SITE_CONFIG, e, None))?;

        if !provider_identity.has_linkage_record() {
            return Ok(ConnectionRecord {
                provider_identity,
                repository_reference: None,
                account_display_name: None,
            });
        }

        let source_control = self
            .backend
            .get_source_control(target)
            .await
            .map_err(FetchError::from)
            .inspect_err(|e| {
                self.report_failure(diagnostics::GET_SOURCE_CONTROLS, e, Some(provider_identity));
            })?;

        Ok(ConnectionRecord {
            provider_identity,
            repository_reference: Some(source_control.repo_url),
            account_display_name: source_control.account_name,
        })
    }

    /// Folder path shown for a folder-sync linkage
    ///
    /// `https://host/org/repo` yields `/repo`. A reference without a `/` yields
    /// an empty folder and one diagnostic event.
    pub fn folder_from_repository_reference(&self, reference: &str) -> String {
        let segments: Vec<&str> = reference.split('/').collect();
        match segments.as_slice() {
            [_, .., last] => format!("/{last}"),
            _ => {
                self.diagnostics.log(DiagnosticEvent::failure(
                    diagnostics::SPLIT_REPOSITORY_URL,
                    json!({ "message": "Repository URL has no path separator", "repoUrl": reference }),
                ));
                String::new()
            }
        }
    }

    /// Re-read the account slice
    ///
    /// With no provider the slice becomes `Fresh(None)`.
    pub async fn refresh_account(&self, provider: Option<ProviderIdentity>) {
        self.account_tx
            .send_modify(|slice| *slice = std::mem::take(slice).into_loading());

        let next = match provider {
            None => Ok(None),
            Some(provider) => self.fetch_account_identity(provider).await.map(Some),
        };

        self.account_tx.send_modify(|slice| {
            *slice = match next {
                Ok(account) => Loadable::Fresh(account),
                Err(e) => std::mem::take(slice).into_stale(e.message()),
            };
        });
        debug!(scm.provider = ?provider, "Account slice refreshed");
    }

    /// Re-read the connection slice; returns the record on success
    pub async fn refresh_connection(&self, target: &TargetId) -> Option<ConnectionRecord> {
        self.connection_tx
            .send_modify(|slice| *slice = std::mem::take(slice).into_loading());

        match self.fetch_connection_record(target).await {
            Ok(record) => {
                let folder = match (&record.provider_identity, &record.repository_reference) {
                    (ProviderIdentity::Dropbox | ProviderIdentity::OneDrive, Some(reference)) => {
                        self.folder_from_repository_reference(reference)
                    }
                    _ => String::new(),
                };
                info!(scm.target = %target, scm.provider = %record.provider_identity, "Connection record refreshed");
                self.connection_tx.send_replace(Loadable::Fresh(ConnectionView {
                    record: record.clone(),
                    folder,
                }));
                Some(record)
            }
            Err(e) => {
                self.connection_tx
                    .send_modify(|slice| *slice = std::mem::take(slice).into_stale(e.message()));
                None
            }
        }
    }

    /// Replace the connection slice with a known value without a fetch
    pub fn publish_connection(&self, view: ConnectionView) {
        self.connection_tx.send_replace(Loadable::Fresh(view));
    }

    /// Subscribe to the account slice
    #[must_use]
    pub fn subscribe_account(&self) -> watch::Receiver<AccountSlice> {
        self.account_tx.subscribe()
    }

    /// Subscribe to the connection slice
    #[must_use]
    pub fn subscribe_connection(&self) -> watch::Receiver<ConnectionSlice> {
        self.connection_tx.subscribe()
    }

    /// Current account slice
    #[must_use]
    pub fn account_snapshot(&self) -> AccountSlice {
        self.account_tx.borrow().clone()
    }

    /// Current connection slice
    #[must_use]
    pub fn connection_snapshot(&self) -> ConnectionSlice {
        self.connection_tx.borrow().clone()
    }

    fn report_failure(&self, action: &str, error: &FetchError, provider: Option<ProviderIdentity>) {
        warn!(diagnostic.action = %action, scm.provider = ?provider, "Fetch failed: {error}");
        let detail = match error {
            FetchError::Backend(backend) => backend.to_json(),
            other => json!({ "kind": format!("{:?}", other.code()) }),
        };
        self.diagnostics.log(DiagnosticEvent::failure(
            action,
            json!({ "message": error.message(), "error": detail }),
        ));
    }
}
