// ABOUTME: Domain models for provider connections shared across the workspace
// ABOUTME: Re-exports provider identities, connection records, tokens, and handshake types
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

/// Handshake sessions, completion signals, and outcomes
pub mod authorization;
/// Deployment targets, connection records, and account identity
pub mod connection;
/// Closed provider identity set
pub mod provider;
/// Provider access token material
pub mod token;

pub use authorization::{
    AuthorizationResult, CancelReason, CompletionSignal, HandshakeSession, SessionId,
};
pub use connection::{AccountIdentity, ConnectionRecord, TargetId};
pub use provider::ProviderIdentity;
pub use token::AuthToken;
