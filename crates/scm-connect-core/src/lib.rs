// ABOUTME: Core types and constants for deployment source-control connections
// ABOUTME: Foundation crate with provider identities, connection records, and the error taxonomy
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

#![deny(unsafe_code)]

//! # SCM Connect Core
//!
//! Shared types for the provider connection orchestrator. This crate has no
//! I/O and changes infrequently, so the orchestrator crate and its tests can
//! depend on it without pulling in the HTTP stack.
//!
//! ## Modules
//!
//! - **models**: `ProviderIdentity`, `ConnectionRecord`, `AuthToken`, `AuthorizationResult`
//! - **errors**: Error taxonomy with `ErrorCode` classification
//! - **constants**: Wire names, notification keys, diagnostic actions, defaults

/// Error taxonomy for registry, handshake, exchange, fetch, and disconnect failures
pub mod errors;

/// Constants organized by domain
pub mod constants;

/// Domain models shared across components
pub mod models;
