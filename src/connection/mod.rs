// ABOUTME: Connection state module: loading-state slices and the reader that fills them
// ABOUTME: Account identity and connection record are fetched and published independently
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

/// Backend reads and slice publication
pub mod reader;
/// Loadable slices
pub mod state;

pub use reader::ConnectionStateReader;
pub use state::{AccountSlice, ConnectionSlice, ConnectionView, Loadable};
