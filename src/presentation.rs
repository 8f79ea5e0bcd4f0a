// ABOUTME: Interfaces to presentation collaborators: notifications, diagnostics, confirmation, browser
// ABOUTME: Includes tracing-backed defaults so the orchestrator runs headless without a UI layer
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Presentation Collaborators
//!
//! The orchestrator never renders anything. It talks to the UI through the
//! traits in this module:
//!
//! - [`Notifier`]: long-running operation toasts (`start` / `stop`)
//! - [`DiagnosticSink`]: telemetry events for failures worth investigating
//! - [`ConfirmationPrompt`]: yes/no dialog before destructive actions
//! - [`BrowserLauncher`] / [`BrowserContext`]: the secondary window used by
//!   the authorization handshake

use crate::constants::{diagnostics, messages};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use tracing::{error, info, warn};
use url::Url;
use uuid::Uuid;

/// Handle for an in-flight notification
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NotificationId(pub String);

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Toast-style notification primitive
pub trait Notifier: Send + Sync {
    /// Show an in-progress notification
    fn start(&self, title: &str, description: &str) -> NotificationId;

    /// Resolve a notification with its final outcome
    fn stop(&self, id: &NotificationId, success: bool, message: &str);
}

/// Severity of a diagnostic event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    /// Something failed
    Error,
    /// Something looked wrong but the flow continued
    Warning,
    /// Informational
    Info,
}

/// Telemetry event emitted for failures and noteworthy transitions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosticEvent {
    /// Severity
    pub level: DiagnosticLevel,
    /// Operation that produced the event (e.g. `getSourceControls`)
    pub action: String,
    /// Outcome (e.g. `failed`)
    pub result: String,
    /// Free-form payload
    pub data: serde_json::Value,
    /// When the event was produced
    pub timestamp: DateTime<Utc>,
}

impl DiagnosticEvent {
    /// Build an event
    #[must_use]
    pub fn new(
        level: DiagnosticLevel,
        action: impl Into<String>,
        result: impl Into<String>,
        data: serde_json::Value,
    ) -> Self {
        Self {
            level,
            action: action.into(),
            result: result.into(),
            data,
            timestamp: Utc::now(),
        }
    }

    /// Error-level `failed` event for `action`
    #[must_use]
    pub fn failure(action: impl Into<String>, data: serde_json::Value) -> Self {
        Self::new(DiagnosticLevel::Error, action, diagnostics::FAILED, data)
    }
}

/// Diagnostic logging primitive
pub trait DiagnosticSink: Send + Sync {
    /// Record one event
    fn log(&self, event: DiagnosticEvent);
}

/// Forwards diagnostic events to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl DiagnosticSink for TracingDiagnostics {
    fn log(&self, event: DiagnosticEvent) {
        match event.level {
            DiagnosticLevel::Error => error!(
                diagnostic.action = %event.action,
                diagnostic.result = %event.result,
                diagnostic.data = %event.data,
                "Diagnostic event"
            ),
            DiagnosticLevel::Warning => warn!(
                diagnostic.action = %event.action,
                diagnostic.result = %event.result,
                diagnostic.data = %event.data,
                "Diagnostic event"
            ),
            DiagnosticLevel::Info => info!(
                diagnostic.action = %event.action,
                diagnostic.result = %event.result,
                diagnostic.data = %event.data,
                "Diagnostic event"
            ),
        }
    }
}

/// Notifier that only writes to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn start(&self, title: &str, description: &str) -> NotificationId {
        let id = NotificationId(Uuid::new_v4().to_string());
        info!(notification.id = %id, notification.title = %title, "{description}");
        id
    }

    fn stop(&self, id: &NotificationId, success: bool, message: &str) {
        if success {
            info!(notification.id = %id, "{message}");
        } else {
            warn!(notification.id = %id, "{message}");
        }
    }
}

/// Content of a confirmation dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmRequest {
    /// Title localization key
    pub title_key: &'static str,
    /// Body localization key
    pub content_key: &'static str,
    /// Primary (confirm) button key
    pub primary_key: &'static str,
    /// Secondary (dismiss) button key
    pub secondary_key: &'static str,
}

impl ConfirmRequest {
    /// Dialog shown before disconnecting a provider
    #[must_use]
    pub const fn disconnect() -> Self {
        Self {
            title_key: messages::DISCONNECT_CONFIRM_TITLE,
            content_key: messages::DISCONNECT_CONFIRM_CONTENT,
            primary_key: messages::OK,
            secondary_key: messages::CANCEL,
        }
    }
}

/// Confirmation dialog primitive
///
/// Resolves `true` when the primary action is chosen and `false` on the
/// secondary action or dismissal.
#[async_trait]
pub trait ConfirmationPrompt: Send + Sync {
    /// Ask the operator
    async fn confirm(&self, request: &ConfirmRequest) -> bool;
}

/// Prompt that always confirms, for headless use
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoConfirm;

#[async_trait]
impl ConfirmationPrompt for AutoConfirm {
    async fn confirm(&self, _request: &ConfirmRequest) -> bool {
        true
    }
}

/// Secondary browser context opened for a handshake
pub trait BrowserContext: Send + Sync {
    /// Whether the user (or the platform) closed the context
    fn is_closed(&self) -> bool;

    /// Close or abandon the context
    fn close(&self);
}

/// Opens secondary browser contexts
pub trait BrowserLauncher: Send + Sync {
    /// Open a context at `url`
    ///
    /// # Errors
    ///
    /// Returns a description of why the context could not be opened
    /// (e.g. a popup blocker)
    fn open(&self, url: &Url) -> Result<Box<dyn BrowserContext>, String>;
}
