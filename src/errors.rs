// ABOUTME: Error taxonomy re-exported from scm-connect-core
// ABOUTME: Component errors with ErrorCode classification and the orchestrator aggregate
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

pub use scm_connect_core::errors::*;
