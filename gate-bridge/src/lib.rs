//! Outbound plumbing for the skill gateway.
//!
//! [`HttpTransport`] is the single HTTPS client used for webhook, template,
//! and remote-server traffic. It enforces deadlines and body caps, and refuses
//! redirects. [`RemoteToolClient`] layers the JSON-RPC `tools/list` and
//! `tools/call` exchange on top of it.

#![warn(missing_docs, clippy::pedantic)]

mod error;
mod http_client;
pub mod remote;
pub mod rpc;
#[cfg(any(test, feature = "test-util"))]
pub mod testing;
pub mod transport;

pub use error::{BridgeError, BridgeResult};
pub use remote::{RemoteClientConfig, RemoteToolClient, RemoteToolDescriptor};
pub use transport::{BytesResponse, HttpTransport, OutboundRequest, TextResponse};

/// HTTP types used in the public API.
pub use hyper::{Method, StatusCode};
