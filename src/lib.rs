// ABOUTME: Main library entry point for the source control provider connection orchestrator
// ABOUTME: Connects, authorizes, reads, and disconnects deployment targets from their SCM providers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![deny(unsafe_code)]

//! # SCM Connect
//!
//! Manages the link between a deployment target and its source control
//! provider (GitHub, Bitbucket, Dropbox, `OneDrive`, Azure Repos, local git,
//! external git).
//!
//! ## Features
//!
//! - **Provider registry**: one capability table for OAuth usage and labels
//! - **Authorization handshake**: secondary browser context with session
//!   correlation, close detection, and a bounded wait
//! - **Token exchange**: redirect artifact to stored provider token
//! - **Connection state**: account and connection slices published on watch
//!   channels, keeping the previous value while loading
//! - **Disconnect**: two-step detach with a single notification per run
//!
//! ## Architecture
//!
//! - **Backend**: [`backend::DeploymentBackend`] and its HTTP implementation
//! - **Presentation**: notifier, diagnostics, confirmation, and browser traits
//! - **Orchestrator**: [`orchestrator::ProviderConnectionOrchestrator`] ties
//!   the components together for one deployment target
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use scm_connect::config::OrchestratorConfig;
//! use scm_connect::models::TargetId;
//! use scm_connect::orchestrator::{Collaborators, ProviderConnectionOrchestrator};
//!
//! # fn collaborators() -> Collaborators { unimplemented!() }
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     scm_connect::logging::init_from_env()?;
//!     let config = OrchestratorConfig::from_env()?;
//!
//!     let orchestrator = ProviderConnectionOrchestrator::from_config(
//!         TargetId::new("/subscriptions/s1/resourceGroups/rg/providers/Microsoft.Web/sites/app"),
//!         &config,
//!         collaborators(),
//!     );
//!     orchestrator.refresh().await;
//!     println!("Source: {}", orchestrator.source_label_key());
//!     Ok(())
//! }
//! ```

/// Backend collaborator trait and HTTP implementation
pub mod backend;

/// Environment configuration
pub mod config;

/// Connection state slices and their reader
pub mod connection;

/// Shared constants
pub mod constants;

/// Disconnect workflow
pub mod disconnect;

/// Error taxonomy
pub mod errors;

/// Structured logging setup
pub mod logging;

/// Domain models
pub mod models;

/// Authorization handshake and token exchange
pub mod oauth;

/// Orchestrator facade
pub mod orchestrator;

/// Presentation collaborator traits
pub mod presentation;

/// Provider capability registry
pub mod providers;

/// HTTP client helpers
pub mod utils;

pub use orchestrator::{Collaborators, ConnectOutcome, ProviderConnectionOrchestrator};
