// ABOUTME: Application constants re-exported from scm-connect-core
// ABOUTME: Wire names, message keys, diagnostic identifiers, and configuration defaults
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

pub use scm_connect_core::constants::*;
