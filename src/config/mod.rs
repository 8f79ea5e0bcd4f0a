// ABOUTME: Configuration module for backend endpoints, handshake limits, and HTTP timeouts
// ABOUTME: Re-exports the environment-driven orchestrator configuration types
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Configuration for the connection orchestrator
//!
//! All settings come from `SCM_*` environment variables; there is no
//! configuration file.

/// Environment-driven configuration
pub mod environment;

pub use environment::{BackendConfig, HandshakeConfig, HttpClientConfig, OrchestratorConfig};
