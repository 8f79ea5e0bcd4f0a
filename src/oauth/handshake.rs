// ABOUTME: Authorization handshake controller driving the provider OAuth flow in a secondary browser context
// ABOUTME: One oneshot completion slot per session, with close polling, a bounded wait, and supersession
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Authorization Handshake
//!
//! A handshake opens the provider's authorization page in a secondary browser
//! context and waits for the context to post back the final redirect URL.
//!
//! Each attempt owns a fresh [`SessionId`] that travels as the `state` query
//! parameter, and a oneshot completion slot. The slot lives in the controller
//! only while the attempt is active:
//!
//! - [`HandshakeController::deliver`] sends into the slot when the signal's
//!   session matches, and ignores it otherwise
//! - starting a new attempt drops the previous slot, which wakes the previous
//!   waiter with [`CancelReason::Superseded`]
//! - the waiter polls [`BrowserContext::is_closed`] and gives up after the
//!   configured timeout

use crate::config::HandshakeConfig;
use crate::errors::HandshakeError;
use crate::logging::ConnectionLogger;
use crate::models::{
    AuthorizationResult, CancelReason, CompletionSignal, HandshakeSession, ProviderIdentity,
    SessionId,
};
use crate::presentation::{BrowserContext, BrowserLauncher};
use crate::providers::ProviderRegistry;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;
use tokio::time::MissedTickBehavior;
use tracing::debug;
use url::Url;

/// Smallest poll interval accepted by the waiter
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Completion slot of the active attempt
struct ActiveSession {
    session: HandshakeSession,
    tx: oneshot::Sender<Option<String>>,
}

type ActiveSlot = Arc<Mutex<Option<ActiveSession>>>;

/// Drives provider authorization handshakes
pub struct HandshakeController {
    registry: Arc<ProviderRegistry>,
    launcher: Arc<dyn BrowserLauncher>,
    config: HandshakeConfig,
    active: ActiveSlot,
}

impl HandshakeController {
    /// Controller resolving providers through `registry` and opening contexts with `launcher`
    #[must_use]
    pub fn new(
        registry: Arc<ProviderRegistry>,
        launcher: Arc<dyn BrowserLauncher>,
        config: HandshakeConfig,
    ) -> Self {
        Self {
            registry,
            launcher,
            config,
            active: Arc::new(Mutex::new(None)),
        }
    }

    /// Start an authorization attempt and invoke `on_complete` with its outcome
    ///
    /// `on_complete` runs exactly once unless the attempt is superseded by a
    /// newer one, in which case it is dropped without being called.
    ///
    /// # Errors
    ///
    /// - `OAuthNotSupported` if the provider does not authorize through a handshake
    /// - `Registry` if the provider has no registry row
    /// - `BrowserUnavailable` if the secondary context could not be opened
    /// - `RuntimeUnavailable` if called outside a Tokio runtime; no window is
    ///   opened in that case
    pub fn start_authorization<F>(
        &self,
        provider: ProviderIdentity,
        on_complete: F,
    ) -> Result<HandshakeSession, HandshakeError>
    where
        F: FnOnce(AuthorizationResult) + Send + 'static,
    {
        self.launch(provider, false, on_complete)
    }

    /// Run an authorization attempt to completion
    ///
    /// A superseded attempt resolves with `Cancelled { Superseded }`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::start_authorization`]
    pub async fn authorize(
        &self,
        provider: ProviderIdentity,
    ) -> Result<AuthorizationResult, HandshakeError> {
        let (result_tx, result_rx) = oneshot::channel();
        let session = self.launch(provider, true, move |result| {
            // Receiver is gone only if the caller stopped awaiting
            let _ = result_tx.send(result);
        })?;

        Ok(result_rx
            .await
            .unwrap_or(AuthorizationResult::Cancelled {
                session: session.id,
                reason: CancelReason::Superseded,
            }))
    }

    /// Hand a completion signal to the matching attempt
    ///
    /// Returns `false` when the signal belongs to a retired or unknown session.
    pub fn deliver(&self, signal: CompletionSignal) -> bool {
        let slot = {
            let mut active = lock(&self.active);
            match active.as_ref() {
                Some(current) if current.session.id == signal.session => active.take(),
                _ => None,
            }
        };

        let Some(slot) = slot else {
            debug!(handshake.session = %signal.session, "Ignoring completion signal for inactive session");
            return false;
        };

        ConnectionLogger::log_handshake_event(
            slot.session.provider.slug(),
            &slot.session.id.to_string(),
            "signal_received",
        );
        slot.tx.send(signal.redirect_url).is_ok()
    }

    /// Attempt currently waiting for a completion signal
    #[must_use]
    pub fn active_session(&self) -> Option<HandshakeSession> {
        lock(&self.active)
            .as_ref()
            .map(|active| active.session.clone())
    }

    fn launch<F>(
        &self,
        provider: ProviderIdentity,
        report_superseded: bool,
        on_complete: F,
    ) -> Result<HandshakeSession, HandshakeError>
    where
        F: FnOnce(AuthorizationResult) + Send + 'static,
    {
        let runtime = Handle::try_current().map_err(|_| HandshakeError::RuntimeUnavailable)?;
        let descriptor = self.registry.resolve(provider)?;
        let base_url = descriptor
            .authorization_url
            .as_ref()
            .filter(|_| descriptor.uses_oauth)
            .ok_or(HandshakeError::OAuthNotSupported(provider))?;

        let session = HandshakeSession::start(provider);
        let url = authorization_url(base_url, session.id);
        let context = self
            .launcher
            .open(&url)
            .map_err(HandshakeError::BrowserUnavailable)?;

        let (tx, rx) = oneshot::channel();
        let previous = lock(&self.active).replace(ActiveSession {
            session: session.clone(),
            tx,
        });
        if let Some(previous) = previous {
            ConnectionLogger::log_handshake_event(
                previous.session.provider.slug(),
                &previous.session.id.to_string(),
                "superseded",
            );
        }
        ConnectionLogger::log_handshake_event(provider.slug(), &session.id.to_string(), "started");

        let active = Arc::clone(&self.active);
        let config = self.config;
        let id = session.id;
        runtime.spawn(async move {
            let result = wait_for_completion(id, rx, context.as_ref(), config).await;
            context.close();
            retire(&active, id);

            let event = match &result {
                AuthorizationResult::Redirect { .. } => "redirect",
                AuthorizationResult::Cancelled { reason, .. } => match reason {
                    CancelReason::ContextClosed => "context_closed",
                    CancelReason::TimedOut => "timed_out",
                    CancelReason::Superseded => "superseded_finished",
                },
            };
            ConnectionLogger::log_handshake_event(provider.slug(), &id.to_string(), event);

            let superseded = matches!(
                result,
                AuthorizationResult::Cancelled {
                    reason: CancelReason::Superseded,
                    ..
                }
            );
            if superseded && !report_superseded {
                debug!(handshake.session = %id, "Dropping continuation of superseded session");
            } else {
                on_complete(result);
            }
        });

        Ok(session)
    }
}

/// Authorization URL with the session token as `state`
fn authorization_url(base: &Url, session: SessionId) -> Url {
    let mut url = base.clone();
    url.query_pairs_mut()
        .append_pair("state", &session.to_string());
    url
}

fn lock(slot: &Mutex<Option<ActiveSession>>) -> MutexGuard<'_, Option<ActiveSession>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Clear the active slot if it still belongs to `id`
fn retire(active: &ActiveSlot, id: SessionId) {
    let mut active = lock(active);
    if active.as_ref().is_some_and(|current| current.session.id == id) {
        *active = None;
    }
}

fn received(session: SessionId, redirect_url: Option<String>) -> AuthorizationResult {
    match redirect_url {
        Some(redirect_url) => AuthorizationResult::Redirect {
            session,
            redirect_url,
        },
        None => AuthorizationResult::Cancelled {
            session,
            reason: CancelReason::ContextClosed,
        },
    }
}

async fn wait_for_completion(
    session: SessionId,
    mut rx: oneshot::Receiver<Option<String>>,
    context: &dyn BrowserContext,
    config: HandshakeConfig,
) -> AuthorizationResult {
    let cancelled = |reason| AuthorizationResult::Cancelled { session, reason };

    let deadline = tokio::time::sleep(config.timeout);
    tokio::pin!(deadline);
    let mut poll = tokio::time::interval(config.poll_interval.max(MIN_POLL_INTERVAL));
    poll.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            signal = &mut rx => {
                return signal.map_or_else(
                    |_| cancelled(CancelReason::Superseded),
                    |redirect_url| received(session, redirect_url),
                );
            }
            () = &mut deadline => return cancelled(CancelReason::TimedOut),
            _ = poll.tick() => {
                if context.is_closed() {
                    // A signal posted right before the close still wins
                    return match rx.try_recv() {
                        Ok(redirect_url) => received(session, redirect_url),
                        Err(TryRecvError::Closed) => cancelled(CancelReason::Superseded),
                        Err(TryRecvError::Empty) => cancelled(CancelReason::ContextClosed),
                    };
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[derive(Default)]
    struct Window {
        closed: AtomicBool,
    }

    impl BrowserContext for Arc<Window> {
        fn is_closed(&self) -> bool {
            self.closed.load(Ordering::SeqCst)
        }

        fn close(&self) {
            self.closed.store(true, Ordering::SeqCst);
        }
    }

    #[derive(Default)]
    struct Launcher {
        opened: AtomicUsize,
        window: Arc<Window>,
    }

    impl BrowserLauncher for Launcher {
        fn open(&self, _url: &Url) -> Result<Box<dyn BrowserContext>, String> {
            self.opened.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(Arc::clone(&self.window)))
        }
    }

    fn controller(launcher: Arc<Launcher>) -> HandshakeController {
        let registry = ProviderRegistry::new(&Url::parse("https://portal.example.com").unwrap());
        HandshakeController::new(
            Arc::new(registry),
            launcher,
            HandshakeConfig {
                timeout: Duration::from_secs(5),
                poll_interval: Duration::from_millis(50),
            },
        )
    }

    #[test]
    fn test_authorization_url_carries_state() {
        let session = SessionId::generate();
        let url = authorization_url(
            &Url::parse("https://portal.example.com/auth/github/authorize").unwrap(),
            session,
        );
        assert_eq!(
            url.query_pairs().find(|(key, _)| key == "state").unwrap().1,
            session.to_string()
        );
    }

    #[tokio::test]
    async fn test_non_oauth_provider_never_opens_browser() {
        let launcher = Arc::new(Launcher::default());
        let controller = controller(Arc::clone(&launcher));

        let err = controller
            .start_authorization(ProviderIdentity::LocalGit, |_| {})
            .unwrap_err();
        assert_eq!(err, HandshakeError::OAuthNotSupported(ProviderIdentity::LocalGit));
        assert_eq!(launcher.opened.load(Ordering::SeqCst), 0);
        assert!(controller.active_session().is_none());
    }

    #[tokio::test]
    async fn test_deliver_resolves_matching_session() {
        let launcher = Arc::new(Launcher::default());
        let controller = Arc::new(controller(Arc::clone(&launcher)));

        let waiter = {
            let controller = Arc::clone(&controller);
            tokio::spawn(async move { controller.authorize(ProviderIdentity::Dropbox).await })
        };
        let session = loop {
            if let Some(session) = controller.active_session() {
                break session;
            }
            tokio::task::yield_now().await;
        };

        assert!(!controller.deliver(CompletionSignal {
            session: SessionId::generate(),
            redirect_url: Some("https://portal.example.com/callback?code=wrong".to_owned()),
        }));
        assert!(controller.deliver(CompletionSignal {
            session: session.id,
            redirect_url: Some("https://portal.example.com/callback?code=abc".to_owned()),
        }));

        let result = waiter.await.unwrap().unwrap();
        assert_eq!(
            result.redirect_url(),
            Some("https://portal.example.com/callback?code=abc")
        );
        assert!(launcher.window.is_closed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_window_cancels() {
        let launcher = Arc::new(Launcher::default());
        let controller = controller(Arc::clone(&launcher));
        launcher.window.close();

        let result = controller.authorize(ProviderIdentity::GitHub).await.unwrap();
        assert!(matches!(
            result,
            AuthorizationResult::Cancelled {
                reason: CancelReason::ContextClosed,
                ..
            }
        ));
        assert!(controller.active_session().is_none());
    }
}
