// ABOUTME: Domain models re-exported from scm-connect-core
// ABOUTME: Provider identities, connection records, tokens, and handshake outcomes
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

pub use scm_connect_core::models::*;
