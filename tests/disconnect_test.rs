// ABOUTME: Integration tests for the disconnect workflow state machine
// ABOUTME: Checks backend call counts, terminal states, and single-notification behavior
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{
    init_test_logging, server_error, target, FakeBackend, NotificationEvent, RecordingDiagnostics,
    RecordingNotifier,
};
use scm_connect::disconnect::{DisconnectState, DisconnectWorkflow};
use scm_connect::errors::DisconnectError;
use scm_connect::models::{ConnectionRecord, ProviderIdentity};
use std::sync::Arc;

struct Fixture {
    backend: Arc<FakeBackend>,
    notifier: Arc<RecordingNotifier>,
    diagnostics: Arc<RecordingDiagnostics>,
    workflow: DisconnectWorkflow,
}

fn fixture(backend: Arc<FakeBackend>) -> Fixture {
    init_test_logging();
    let notifier = Arc::new(RecordingNotifier::default());
    let diagnostics = Arc::new(RecordingDiagnostics::default());
    let workflow = DisconnectWorkflow::new(
        Arc::clone(&backend) as _,
        Arc::clone(&notifier) as _,
        Arc::clone(&diagnostics) as _,
    );
    Fixture {
        backend,
        notifier,
        diagnostics,
        workflow,
    }
}

fn record(provider: ProviderIdentity, repo: Option<&str>) -> ConnectionRecord {
    ConnectionRecord {
        provider_identity: provider,
        repository_reference: repo.map(str::to_owned),
        account_display_name: None,
    }
}

#[tokio::test]
async fn test_local_git_skips_linkage_delete() {
    let f = fixture(FakeBackend::connected(ProviderIdentity::LocalGit, None));

    f.workflow
        .disconnect(&target(), &record(ProviderIdentity::LocalGit, None))
        .await
        .unwrap();

    f.backend.with(|state| {
        assert_eq!(state.update_calls, 1);
        assert_eq!(state.delete_calls, 0);
        assert_eq!(state.scm_type, "None");
    });
    assert_eq!(f.workflow.state(), DisconnectState::Disconnected);
    assert_eq!(
        f.notifier.stops(),
        vec![(true, "disconnectingDeploymentSuccess".to_owned())]
    );
}

#[tokio::test]
async fn test_github_disconnect_deletes_linkage() {
    let repo = "https://github.com/contoso/web";
    let f = fixture(FakeBackend::connected(ProviderIdentity::GitHub, Some(repo)));
    let mut state_rx = f.workflow.subscribe();

    f.workflow
        .disconnect(&target(), &record(ProviderIdentity::GitHub, Some(repo)))
        .await
        .unwrap();

    f.backend.with(|state| {
        assert_eq!(state.update_calls, 1);
        assert_eq!(state.delete_calls, 1);
        assert_eq!(state.repo_url, None);
    });
    assert_eq!(*state_rx.borrow_and_update(), DisconnectState::Disconnected);
    assert!(f.diagnostics.actions().is_empty());
}

#[tokio::test]
async fn test_linkage_delete_failure_is_partial() {
    let repo = "https://github.com/contoso/web";
    let f = fixture(FakeBackend::connected(ProviderIdentity::GitHub, Some(repo)));
    f.backend
        .with(|state| state.fail_delete = Some(server_error("linkage locked")));

    let err = f
        .workflow
        .disconnect(&target(), &record(ProviderIdentity::GitHub, Some(repo)))
        .await
        .unwrap_err();

    assert_eq!(err, DisconnectError::LinkageDelete(server_error("linkage locked")));
    assert!(err.is_partial());
    assert_eq!(f.workflow.state(), DisconnectState::DisconnectFailed(err));
    assert_eq!(
        f.notifier.stops(),
        vec![(false, "disconnectingDeploymentFail".to_owned())]
    );
    assert_eq!(f.diagnostics.actions(), vec!["disconnect".to_owned()]);
    let events = f.diagnostics.events.lock().unwrap();
    assert_eq!(events[0].data["partial"], true);
}

#[tokio::test]
async fn test_config_update_failure_changes_nothing() {
    let f = fixture(FakeBackend::connected(
        ProviderIdentity::Dropbox,
        Some("https://dropbox/apps/site"),
    ));
    f.backend
        .with(|state| state.fail_update = Some(server_error("conflict")));

    let err = f
        .workflow
        .disconnect(
            &target(),
            &record(ProviderIdentity::Dropbox, Some("https://dropbox/apps/site")),
        )
        .await
        .unwrap_err();

    assert_eq!(err, DisconnectError::ConfigUpdate(server_error("conflict")));
    f.backend.with(|state| {
        assert_eq!(state.delete_calls, 0);
        assert_eq!(state.scm_type, "Dropbox");
    });
    assert!(matches!(
        f.workflow.state(),
        DisconnectState::DisconnectFailed(DisconnectError::ConfigUpdate(_))
    ));
}

#[tokio::test]
async fn test_one_notification_per_run() {
    let f = fixture(FakeBackend::connected(ProviderIdentity::LocalGit, None));

    for _ in 0..2 {
        f.workflow
            .disconnect(&target(), &record(ProviderIdentity::LocalGit, None))
            .await
            .unwrap();
    }

    let events = f.notifier.events();
    assert_eq!(events.len(), 4);
    assert!(matches!(&events[0], NotificationEvent::Start { title, .. } if title == "disconnectingDeployment"));
    assert!(matches!(&events[1], NotificationEvent::Stop { id, .. } if id == "n0"));
    assert!(matches!(&events[3], NotificationEvent::Stop { id, .. } if id == "n1"));
}
