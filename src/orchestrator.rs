// ABOUTME: Provider connection orchestrator facade combining registry, handshake, exchange, reader, and disconnect
// ABOUTME: Serializes connect and disconnect operations per instance and exposes read-only state snapshots
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Provider Connection Orchestrator
//!
//! One orchestrator manages one deployment target. Views call its operations
//! and subscribe to its watch channels; they never mutate state directly.
//!
//! At most one authorization or disconnect runs at a time. A second request
//! fails fast with [`OrchestratorError::OperationInProgress`].

use crate::backend::{DeploymentBackend, HttpDeploymentBackend};
use crate::config::{HandshakeConfig, OrchestratorConfig};
use crate::connection::{AccountSlice, ConnectionSlice, ConnectionStateReader, ConnectionView};
use crate::disconnect::{DisconnectState, DisconnectWorkflow};
use crate::errors::{ErrorCode, HandshakeError, OrchestratorError};
use crate::models::{
    AuthorizationResult, CompletionSignal, HandshakeSession, ProviderIdentity, TargetId,
};
use crate::oauth::{HandshakeController, TokenExchangeClient};
use crate::presentation::{
    BrowserLauncher, ConfirmRequest, ConfirmationPrompt, DiagnosticEvent, DiagnosticSink,
    Notifier,
};
use crate::providers::ProviderRegistry;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

/// Presentation collaborators handed to the orchestrator
#[derive(Clone)]
pub struct Collaborators {
    /// Operation toasts
    pub notifier: Arc<dyn Notifier>,
    /// Telemetry sink
    pub diagnostics: Arc<dyn DiagnosticSink>,
    /// Yes/no dialog
    pub prompt: Arc<dyn ConfirmationPrompt>,
    /// Secondary browser contexts
    pub launcher: Arc<dyn BrowserLauncher>,
}

/// Outcome of [`ProviderConnectionOrchestrator::authorize_and_connect`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// Token exchanged and stored
    Authorized,
    /// The handshake ended without a redirect; nothing was exchanged
    Cancelled(AuthorizationResult),
}

/// RAII claim on the per-instance operation slot
struct BusyGuard<'a> {
    busy: &'a AtomicBool,
    busy_tx: &'a watch::Sender<bool>,
}

impl<'a> BusyGuard<'a> {
    fn acquire(
        busy: &'a AtomicBool,
        busy_tx: &'a watch::Sender<bool>,
    ) -> Result<Self, OrchestratorError> {
        busy.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| OrchestratorError::OperationInProgress)?;
        busy_tx.send_replace(true);
        Ok(Self { busy, busy_tx })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
        self.busy_tx.send_replace(false);
    }
}

/// Facade over every connection operation for one deployment target
pub struct ProviderConnectionOrchestrator {
    target: TargetId,
    registry: Arc<ProviderRegistry>,
    handshake: HandshakeController,
    exchange: TokenExchangeClient,
    reader: ConnectionStateReader,
    disconnect: DisconnectWorkflow,
    prompt: Arc<dyn ConfirmationPrompt>,
    diagnostics: Arc<dyn DiagnosticSink>,
    busy: AtomicBool,
    busy_tx: watch::Sender<bool>,
}

impl ProviderConnectionOrchestrator {
    /// Orchestrator over an explicit backend and registry
    #[must_use]
    pub fn new(
        target: TargetId,
        registry: Arc<ProviderRegistry>,
        backend: Arc<dyn DeploymentBackend>,
        handshake: HandshakeConfig,
        collaborators: Collaborators,
    ) -> Self {
        let Collaborators {
            notifier,
            diagnostics,
            prompt,
            launcher,
        } = collaborators;
        let (busy_tx, _) = watch::channel(false);

        Self {
            handshake: HandshakeController::new(Arc::clone(&registry), launcher, handshake),
            exchange: TokenExchangeClient::new(Arc::clone(&backend)),
            reader: ConnectionStateReader::new(Arc::clone(&backend), Arc::clone(&diagnostics)),
            disconnect: DisconnectWorkflow::new(backend, notifier, Arc::clone(&diagnostics)),
            target,
            registry,
            prompt,
            diagnostics,
            busy: AtomicBool::new(false),
            busy_tx,
        }
    }

    /// Orchestrator talking HTTP to the configured backend
    #[must_use]
    pub fn from_config(
        target: TargetId,
        config: &OrchestratorConfig,
        collaborators: Collaborators,
    ) -> Self {
        let backend = HttpDeploymentBackend::new(config.backend.clone(), &config.http);
        Self::new(
            target,
            Arc::new(ProviderRegistry::from_config(config)),
            Arc::new(backend),
            config.handshake,
            collaborators,
        )
    }

    /// Deployment target this instance manages
    #[must_use]
    pub const fn target(&self) -> &TargetId {
        &self.target
    }

    /// Provider registry in use
    #[must_use]
    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Re-read both slices
    ///
    /// The account slice follows the provider of the last known record. When
    /// the refreshed record names a different OAuth provider the account slice
    /// is read again for it.
    pub async fn refresh(&self) {
        let hint = self.account_provider(
            self.reader
                .connection_snapshot()
                .value()
                .map(ConnectionView::provider),
        );
        let (record, ()) = tokio::join!(
            self.reader.refresh_connection(&self.target),
            self.reader.refresh_account(hint),
        );

        if let Some(record) = record {
            let current = self.account_provider(Some(record.provider_identity));
            if current != hint {
                self.reader.refresh_account(current).await;
            }
        }
    }

    /// Start a handshake for `provider`; `on_complete` receives the outcome
    ///
    /// # Errors
    ///
    /// Returns an error if the provider has no OAuth flow, the browser
    /// context could not be opened, or no Tokio runtime is running
    pub fn start_authorization<F>(
        &self,
        provider: ProviderIdentity,
        on_complete: F,
    ) -> Result<HandshakeSession, OrchestratorError>
    where
        F: FnOnce(AuthorizationResult) + Send + 'static,
    {
        if !self.registry.uses_oauth(provider) {
            return Err(HandshakeError::OAuthNotSupported(provider).into());
        }
        Ok(self.handshake.start_authorization(provider, on_complete)?)
    }

    /// Forward a completion signal from the secondary browser context
    pub fn deliver_completion(&self, signal: CompletionSignal) -> bool {
        self.handshake.deliver(signal)
    }

    /// Authorize `provider`, store its token, then refresh both slices
    ///
    /// The refresh runs whatever the handshake or exchange outcome was.
    ///
    /// # Errors
    ///
    /// - `OperationInProgress` if another operation is running
    /// - `Handshake` if the handshake could not start
    /// - `Exchange` / `Persist` if the token could not be obtained or stored
    pub async fn authorize_and_connect(
        &self,
        provider: ProviderIdentity,
    ) -> Result<ConnectOutcome, OrchestratorError> {
        let _guard = BusyGuard::acquire(&self.busy, &self.busy_tx)?;

        if !self.registry.uses_oauth(provider) {
            return Err(HandshakeError::OAuthNotSupported(provider).into());
        }

        let result = self.handshake.authorize(provider).await?;
        let outcome = self.complete_authorization(provider, result).await;

        let (record, ()) = tokio::join!(
            self.reader.refresh_connection(&self.target),
            self.reader.refresh_account(Some(provider)),
        );
        if record.is_some_and(|record| record.provider_identity == provider) {
            self.disconnect.reset();
        }
        outcome
    }

    /// Disconnect the target from its current provider
    ///
    /// With nothing cached yet the record is read from the backend first. On
    /// success the cached record is replaced with a disconnected record and
    /// both slices are refreshed. On failure the cached record is left as it was.
    ///
    /// # Errors
    ///
    /// - `OperationInProgress` if another operation is running
    /// - `Fetch` if there was no cached record and it could not be read
    /// - `Disconnect` if either backend step failed
    pub async fn disconnect(&self) -> Result<(), OrchestratorError> {
        let _guard = BusyGuard::acquire(&self.busy, &self.busy_tx)?;

        let cached = self
            .reader
            .connection_snapshot()
            .value()
            .map(|view| view.record.clone());
        let current = match cached {
            Some(record) => record,
            None => self.reader.fetch_connection_record(&self.target).await?,
        };

        self.disconnect.disconnect(&self.target, &current).await?;

        self.reader.publish_connection(ConnectionView::disconnected());
        info!(scm.target = %self.target, "Deployment target disconnected");
        self.refresh().await;
        Ok(())
    }

    /// Ask for confirmation, then disconnect
    ///
    /// Returns `Ok(false)` if the operator dismissed the dialog.
    ///
    /// # Errors
    ///
    /// Same as [`Self::disconnect`]
    pub async fn request_disconnect(&self) -> Result<bool, OrchestratorError> {
        if self.is_busy() {
            return Err(OrchestratorError::OperationInProgress);
        }
        if !self.prompt.confirm(&ConfirmRequest::disconnect()).await {
            info!(scm.target = %self.target, "Disconnect dismissed");
            return Ok(false);
        }
        self.disconnect().await.map(|()| true)
    }

    /// Display label key for the cached provider
    #[must_use]
    pub fn source_label_key(&self) -> &'static str {
        let provider = self
            .reader
            .connection_snapshot()
            .value()
            .map_or(ProviderIdentity::None, ConnectionView::provider);
        self.registry.display_label_key(provider)
    }

    /// Whether an authorization or disconnect is running
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Subscribe to the busy flag
    #[must_use]
    pub fn subscribe_busy(&self) -> watch::Receiver<bool> {
        self.busy_tx.subscribe()
    }

    /// Subscribe to the account slice
    #[must_use]
    pub fn subscribe_account(&self) -> watch::Receiver<AccountSlice> {
        self.reader.subscribe_account()
    }

    /// Subscribe to the connection slice
    #[must_use]
    pub fn subscribe_connection(&self) -> watch::Receiver<ConnectionSlice> {
        self.reader.subscribe_connection()
    }

    /// Subscribe to disconnect progress
    #[must_use]
    pub fn subscribe_disconnect(&self) -> watch::Receiver<DisconnectState> {
        self.disconnect.subscribe()
    }

    /// Current account slice
    #[must_use]
    pub fn account_snapshot(&self) -> AccountSlice {
        self.reader.account_snapshot()
    }

    /// Current connection slice
    #[must_use]
    pub fn connection_snapshot(&self) -> ConnectionSlice {
        self.reader.connection_snapshot()
    }

    /// Current disconnect state
    #[must_use]
    pub fn disconnect_state(&self) -> DisconnectState {
        self.disconnect.state()
    }

    async fn complete_authorization(
        &self,
        provider: ProviderIdentity,
        result: AuthorizationResult,
    ) -> Result<ConnectOutcome, OrchestratorError> {
        let Some(redirect_url) = result.redirect_url() else {
            info!(scm.provider = %provider, "Authorization cancelled; skipping token exchange");
            return Ok(ConnectOutcome::Cancelled(result));
        };

        let token = self
            .exchange
            .exchange_token(provider, redirect_url)
            .await
            .inspect_err(|e| {
                self.report_authorization_failure(provider, &e.to_string(), e.code());
            })?;

        self.exchange
            .persist_token(&self.target, provider, token)
            .await
            .inspect_err(|e| {
                self.report_authorization_failure(provider, &e.to_string(), e.code());
            })?;

        Ok(ConnectOutcome::Authorized)
    }

    fn report_authorization_failure(
        &self,
        provider: ProviderIdentity,
        message: &str,
        code: ErrorCode,
    ) {
        warn!(scm.provider = %provider, "Authorization failed: {message}");
        self.diagnostics.log(DiagnosticEvent::failure(
            format!("authorize{provider:?}Account"),
            json!({ "message": message, "error": { "code": code } }),
        ));
    }

    fn account_provider(&self, provider: Option<ProviderIdentity>) -> Option<ProviderIdentity> {
        provider.filter(|provider| self.registry.uses_oauth(*provider))
    }
}
