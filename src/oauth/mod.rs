// ABOUTME: OAuth module grouping the authorization handshake and the token exchange client
// ABOUTME: Handshake yields a redirect URL; exchange turns it into a stored provider token
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # OAuth
//!
//! Provider authorization happens in two steps: [`handshake`] drives the
//! secondary browser context until the provider redirects back, and
//! [`exchange`] trades the artifact in that redirect for a token and stores
//! it against the deployment target.

/// Token exchange and persistence
pub mod exchange;
/// Secondary-context authorization handshake
pub mod handshake;

pub use exchange::{parse_artifact, TokenExchangeClient};
pub use handshake::HandshakeController;
