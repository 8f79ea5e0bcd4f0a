// ABOUTME: Provider module exposing the capability registry for source-control providers
// ABOUTME: Maps provider identities to authorization URLs, OAuth usage, and display labels
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

/// Provider capability registry
pub mod registry;

pub use registry::{ProviderDescriptor, ProviderRegistry};
