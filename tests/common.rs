// ABOUTME: Shared test utilities and in-memory collaborators for integration tests
// ABOUTME: Provides a recording backend, notifier, diagnostics sink, scripted browser, and prompt
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `scm_connect`

use async_trait::async_trait;
use scm_connect::backend::{
    DeploymentBackend, ProviderUser, SiteConfig, SiteConfigPatch, SourceControl,
    TokenExchangeRequest,
};
use scm_connect::config::HandshakeConfig;
use scm_connect::errors::BackendError;
use scm_connect::models::{AuthToken, ProviderIdentity, SessionId, TargetId};
use scm_connect::presentation::{
    BrowserContext, BrowserLauncher, ConfirmRequest, ConfirmationPrompt, DiagnosticEvent,
    DiagnosticSink, NotificationId, Notifier,
};
use scm_connect::providers::ProviderRegistry;
use scm_connect::{Collaborators, ProviderConnectionOrchestrator};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;
use url::Url;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

pub const TARGET: &str = "/subscriptions/s1/resourceGroups/rg/providers/Microsoft.Web/sites/app";

pub fn target() -> TargetId {
    TargetId::new(TARGET)
}

pub fn registry() -> Arc<ProviderRegistry> {
    Arc::new(ProviderRegistry::new(
        &Url::parse("https://portal.example.com").unwrap(),
    ))
}

pub fn handshake_config() -> HandshakeConfig {
    HandshakeConfig {
        timeout: Duration::from_secs(300),
        poll_interval: Duration::from_millis(500),
    }
}

pub fn server_error(message: &str) -> BackendError {
    BackendError::Status {
        status: 500,
        code: Some("InternalServerError".to_owned()),
        message: message.to_owned(),
    }
}

// ============================================================================
// Backend
// ============================================================================

/// Mutable state behind [`FakeBackend`]
#[derive(Default)]
pub struct BackendState {
    pub scm_type: String,
    pub repo_url: Option<String>,
    pub display_name: Option<String>,
    pub issued_token: Option<AuthToken>,
    pub stored_token: Option<AuthToken>,

    pub fail_site_config: Option<BackendError>,
    pub fail_update: Option<BackendError>,
    pub fail_delete: Option<BackendError>,
    pub fail_account: Option<BackendError>,
    pub fail_exchange: Option<BackendError>,
    pub fail_store: Option<BackendError>,

    pub update_calls: usize,
    pub delete_calls: usize,
    pub site_config_calls: usize,
    pub source_control_calls: usize,
    pub account_calls: usize,
    pub exchange_calls: usize,
    pub store_calls: usize,
    pub exchange_requests: Vec<TokenExchangeRequest>,
}

/// In-memory backend that records every call
#[derive(Default)]
pub struct FakeBackend {
    pub state: Mutex<BackendState>,
}

impl FakeBackend {
    /// Backend reporting `provider` connected to `repo_url`
    pub fn connected(provider: ProviderIdentity, repo_url: Option<&str>) -> Arc<Self> {
        let backend = Self::default();
        {
            let mut state = backend.state.lock().unwrap();
            state.scm_type = provider.scm_type().to_owned();
            state.repo_url = repo_url.map(str::to_owned);
            state.display_name = Some("Ada Lovelace".to_owned());
            state.issued_token = Some(AuthToken::bearer("issued-token"));
        }
        Arc::new(backend)
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut BackendState) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }
}

#[async_trait]
impl DeploymentBackend for FakeBackend {
    async fn update_site_config(
        &self,
        _target: &TargetId,
        patch: &SiteConfigPatch,
    ) -> Result<(), BackendError> {
        self.with(|state| {
            state.update_calls += 1;
            if let Some(err) = state.fail_update.clone() {
                return Err(err);
            }
            state.scm_type = patch.properties.scm_type.scm_type().to_owned();
            Ok(())
        })
    }

    async fn get_site_config(&self, _target: &TargetId) -> Result<SiteConfig, BackendError> {
        self.with(|state| {
            state.site_config_calls += 1;
            if let Some(err) = state.fail_site_config.clone() {
                return Err(err);
            }
            Ok(SiteConfig {
                scm_type: state.scm_type.clone(),
            })
        })
    }

    async fn get_source_control(&self, _target: &TargetId) -> Result<SourceControl, BackendError> {
        self.with(|state| {
            state.source_control_calls += 1;
            state
                .repo_url
                .clone()
                .map(|repo_url| SourceControl {
                    repo_url,
                    branch: Some("main".to_owned()),
                    account_name: None,
                })
                .ok_or_else(|| BackendError::Status {
                    status: 404,
                    code: Some("NotFound".to_owned()),
                    message: "Source control not found".to_owned(),
                })
        })
    }

    async fn delete_source_control(&self, _target: &TargetId) -> Result<(), BackendError> {
        self.with(|state| {
            state.delete_calls += 1;
            if let Some(err) = state.fail_delete.clone() {
                return Err(err);
            }
            state.repo_url = None;
            Ok(())
        })
    }

    async fn get_account_identity(
        &self,
        _provider: ProviderIdentity,
    ) -> Result<ProviderUser, BackendError> {
        self.with(|state| {
            state.account_calls += 1;
            if let Some(err) = state.fail_account.clone() {
                return Err(err);
            }
            Ok(ProviderUser {
                display_name: state.display_name.clone(),
            })
        })
    }

    async fn exchange_authorization(
        &self,
        _provider: ProviderIdentity,
        request: &TokenExchangeRequest,
    ) -> Result<AuthToken, BackendError> {
        self.with(|state| {
            state.exchange_calls += 1;
            state.exchange_requests.push(request.clone());
            if let Some(err) = state.fail_exchange.clone() {
                return Err(err);
            }
            state
                .issued_token
                .clone()
                .ok_or_else(|| BackendError::InvalidResponse("no token".to_owned()))
        })
    }

    async fn store_token(
        &self,
        _target: &TargetId,
        _provider: ProviderIdentity,
        token: &AuthToken,
    ) -> Result<(), BackendError> {
        self.with(|state| {
            state.store_calls += 1;
            if let Some(err) = state.fail_store.clone() {
                return Err(err);
            }
            state.stored_token = Some(token.clone());
            Ok(())
        })
    }
}

// ============================================================================
// Presentation
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationEvent {
    Start { id: String, title: String },
    Stop { id: String, success: bool, message: String },
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub events: Mutex<Vec<NotificationEvent>>,
    next: AtomicUsize,
}

impl RecordingNotifier {
    pub fn events(&self) -> Vec<NotificationEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn stops(&self) -> Vec<(bool, String)> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                NotificationEvent::Stop {
                    success, message, ..
                } => Some((success, message)),
                NotificationEvent::Start { .. } => None,
            })
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn start(&self, title: &str, _description: &str) -> NotificationId {
        let id = format!("n{}", self.next.fetch_add(1, Ordering::SeqCst));
        self.events.lock().unwrap().push(NotificationEvent::Start {
            id: id.clone(),
            title: title.to_owned(),
        });
        NotificationId(id)
    }

    fn stop(&self, id: &NotificationId, success: bool, message: &str) {
        self.events.lock().unwrap().push(NotificationEvent::Stop {
            id: id.0.clone(),
            success,
            message: message.to_owned(),
        });
    }
}

#[derive(Default)]
pub struct RecordingDiagnostics {
    pub events: Mutex<Vec<DiagnosticEvent>>,
}

impl RecordingDiagnostics {
    pub fn actions(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|event| event.action.clone())
            .collect()
    }
}

impl DiagnosticSink for RecordingDiagnostics {
    fn log(&self, event: DiagnosticEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Secondary context whose closed flag the test controls
#[derive(Default)]
pub struct FakeWindow {
    pub closed: AtomicBool,
    pub url: Mutex<Option<Url>>,
}

impl FakeWindow {
    pub fn close_now(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn is_open(&self) -> bool {
        !self.closed.load(Ordering::SeqCst)
    }
}

struct WindowHandle(Arc<FakeWindow>);

impl BrowserContext for WindowHandle {
    fn is_closed(&self) -> bool {
        self.0.closed.load(Ordering::SeqCst)
    }

    fn close(&self) {
        self.0.close_now();
    }
}

/// Launcher recording every window it opens
#[derive(Default)]
pub struct ScriptedBrowser {
    pub windows: Mutex<Vec<Arc<FakeWindow>>>,
    pub blocked: AtomicBool,
}

impl ScriptedBrowser {
    pub fn opened(&self) -> usize {
        self.windows.lock().unwrap().len()
    }

    pub fn window(&self, index: usize) -> Arc<FakeWindow> {
        Arc::clone(&self.windows.lock().unwrap()[index])
    }
}

impl BrowserLauncher for ScriptedBrowser {
    fn open(&self, url: &Url) -> Result<Box<dyn BrowserContext>, String> {
        if self.blocked.load(Ordering::SeqCst) {
            return Err("popup blocked".to_owned());
        }
        let window = Arc::new(FakeWindow::default());
        *window.url.lock().unwrap() = Some(url.clone());
        self.windows.lock().unwrap().push(Arc::clone(&window));
        Ok(Box::new(WindowHandle(window)))
    }
}

/// Prompt answering with a fixed choice
pub struct ScriptedPrompt {
    pub answer: bool,
    pub asked: Mutex<Vec<ConfirmRequest>>,
}

impl ScriptedPrompt {
    pub fn answering(answer: bool) -> Arc<Self> {
        Arc::new(Self {
            answer,
            asked: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl ConfirmationPrompt for ScriptedPrompt {
    async fn confirm(&self, request: &ConfirmRequest) -> bool {
        self.asked.lock().unwrap().push(request.clone());
        self.answer
    }
}

// ============================================================================
// Orchestrator harness
// ============================================================================

pub struct Harness {
    pub backend: Arc<FakeBackend>,
    pub notifier: Arc<RecordingNotifier>,
    pub diagnostics: Arc<RecordingDiagnostics>,
    pub browser: Arc<ScriptedBrowser>,
    pub prompt: Arc<ScriptedPrompt>,
    pub orchestrator: Arc<ProviderConnectionOrchestrator>,
}

impl Harness {
    pub fn new(backend: Arc<FakeBackend>) -> Self {
        Self::with_prompt(backend, ScriptedPrompt::answering(true))
    }

    pub fn with_prompt(backend: Arc<FakeBackend>, prompt: Arc<ScriptedPrompt>) -> Self {
        init_test_logging();
        let notifier = Arc::new(RecordingNotifier::default());
        let diagnostics = Arc::new(RecordingDiagnostics::default());
        let browser = Arc::new(ScriptedBrowser::default());

        let orchestrator = ProviderConnectionOrchestrator::new(
            target(),
            registry(),
            Arc::clone(&backend) as Arc<dyn DeploymentBackend>,
            handshake_config(),
            Collaborators {
                notifier: Arc::clone(&notifier) as Arc<dyn Notifier>,
                diagnostics: Arc::clone(&diagnostics) as Arc<dyn DiagnosticSink>,
                prompt: Arc::clone(&prompt) as Arc<dyn ConfirmationPrompt>,
                launcher: Arc::clone(&browser) as Arc<dyn BrowserLauncher>,
            },
        );

        Self {
            backend,
            notifier,
            diagnostics,
            browser,
            prompt,
            orchestrator: Arc::new(orchestrator),
        }
    }

    /// Session token embedded in the `index`-th opened window
    pub fn session(&self, index: usize) -> SessionId {
        let url = self.browser.window(index).url.lock().unwrap().clone().unwrap();
        let state = url
            .query_pairs()
            .find(|(key, _)| key == "state")
            .map(|(_, value)| value.into_owned())
            .unwrap();
        SessionId::parse(&state).unwrap()
    }

    /// Wait until the handshake has opened `count` windows
    pub async fn wait_for_windows(&self, count: usize) {
        while self.browser.opened() < count {
            tokio::task::yield_now().await;
        }
    }
}
