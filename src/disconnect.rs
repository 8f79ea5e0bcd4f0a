// ABOUTME: Disconnect workflow detaching a deployment target from its source control provider
// ABOUTME: Clears the provider setting, deletes the linkage record, and reports one notification per run
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Disconnect Workflow
//!
//! ```text
//! Connected -> Disconnecting -> Disconnected
//!                            \-> DisconnectFailed
//! ```
//!
//! The provider setting is cleared first. `LocalGit` keeps no linkage record,
//! so it is done at that point; every other provider also has its linkage
//! record deleted. A failed delete after a successful clear leaves the target
//! with no provider but a dangling link, reported as
//! [`DisconnectError::LinkageDelete`] so the operator can retry.

use crate::backend::{DeploymentBackend, SiteConfigPatch};
use crate::constants::{diagnostics, messages};
use crate::errors::DisconnectError;
use crate::logging::ConnectionLogger;
use crate::models::{ConnectionRecord, ProviderIdentity, TargetId};
use crate::presentation::{DiagnosticEvent, DiagnosticSink, NotificationId, Notifier};
use serde_json::json;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;

/// Disconnect progress
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DisconnectState {
    /// Nothing has been attempted since the last connection
    #[default]
    Connected,
    /// Backend calls are in flight
    Disconnecting,
    /// Provider setting cleared and linkage removed
    Disconnected,
    /// The run stopped; see the error for how far it got
    DisconnectFailed(DisconnectError),
}

impl DisconnectState {
    /// Whether the workflow reached a terminal state
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Disconnected | Self::DisconnectFailed(_))
    }
}

impl fmt::Display for DisconnectState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Connected => "connected",
            Self::Disconnecting => "disconnecting",
            Self::Disconnected => "disconnected",
            Self::DisconnectFailed(_) => "disconnect_failed",
        })
    }
}

/// Runs disconnects and publishes their state
pub struct DisconnectWorkflow {
    backend: Arc<dyn DeploymentBackend>,
    notifier: Arc<dyn Notifier>,
    diagnostics: Arc<dyn DiagnosticSink>,
    state_tx: watch::Sender<DisconnectState>,
}

impl DisconnectWorkflow {
    /// Workflow in the `Connected` state
    #[must_use]
    pub fn new(
        backend: Arc<dyn DeploymentBackend>,
        notifier: Arc<dyn Notifier>,
        diagnostics: Arc<dyn DiagnosticSink>,
    ) -> Self {
        let (state_tx, _) = watch::channel(DisconnectState::default());
        Self {
            backend,
            notifier,
            diagnostics,
            state_tx,
        }
    }

    /// Detach `target` from the provider in `current`
    ///
    /// # Errors
    ///
    /// - `ConfigUpdate` if the provider setting could not be cleared (nothing changed)
    /// - `LinkageDelete` if the setting was cleared but the linkage record remains
    pub async fn disconnect(
        &self,
        target: &TargetId,
        current: &ConnectionRecord,
    ) -> Result<(), DisconnectError> {
        let provider = current.provider_identity;
        self.transition(target, provider, DisconnectState::Disconnecting);
        let notification = self
            .notifier
            .start(messages::DISCONNECTING, messages::DISCONNECTING);

        let outcome = self.run(target, provider).await;
        self.finish(target, provider, &notification, outcome)
    }

    /// Return to `Connected` after a new connection is established
    pub fn reset(&self) {
        self.state_tx.send_replace(DisconnectState::Connected);
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> DisconnectState {
        self.state_tx.borrow().clone()
    }

    /// Subscribe to state changes
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<DisconnectState> {
        self.state_tx.subscribe()
    }

    async fn run(&self, target: &TargetId, provider: ProviderIdentity) -> Result<(), DisconnectError> {
        self.backend
            .update_site_config(target, &SiteConfigPatch::clear_provider())
            .await
            .map_err(DisconnectError::ConfigUpdate)?;

        if provider == ProviderIdentity::LocalGit {
            return Ok(());
        }

        self.backend
            .delete_source_control(target)
            .await
            .map_err(DisconnectError::LinkageDelete)
    }

    fn finish(
        &self,
        target: &TargetId,
        provider: ProviderIdentity,
        notification: &NotificationId,
        outcome: Result<(), DisconnectError>,
    ) -> Result<(), DisconnectError> {
        match &outcome {
            Ok(()) => {
                self.transition(target, provider, DisconnectState::Disconnected);
                self.notifier
                    .stop(notification, true, messages::DISCONNECT_SUCCESS);
            }
            Err(e) => {
                self.diagnostics.log(DiagnosticEvent::failure(
                    diagnostics::DISCONNECT,
                    json!({
                        "message": e.backend().message(),
                        "error": e.backend().to_json(),
                        "partial": e.is_partial(),
                        "provider": provider.scm_type(),
                    }),
                ));
                self.transition(target, provider, DisconnectState::DisconnectFailed(e.clone()));
                self.notifier
                    .stop(notification, false, messages::DISCONNECT_FAIL);
            }
        }
        outcome
    }

    fn transition(&self, target: &TargetId, provider: ProviderIdentity, next: DisconnectState) {
        ConnectionLogger::log_disconnect_transition(
            target.as_str(),
            provider.scm_type(),
            &next.to_string(),
        );
        self.state_tx.send_replace(next);
    }
}
