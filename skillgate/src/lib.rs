//! Tool assembly and secure invocation gateway for LLM agents.
//!
//! Depend on this crate via `cargo add skillgate`. It bundles the gateway
//! crates behind feature flags so embedders can pick only the pieces they
//! need, for example the security gate without the HTTP bridge.

#![warn(missing_docs, clippy::pedantic)]

/// Re-export shared primitives for convenience.
pub use gate_primitives as primitives;

/// Capability registry adapter (enabled by `registry` feature).
#[cfg(feature = "registry")]
pub use gate_registry as registry;

/// Outbound HTTP and remote tool protocol (enabled by `bridge` feature).
#[cfg(feature = "bridge")]
pub use gate_bridge as bridge;

/// Security gate (enabled by `policy` feature).
#[cfg(feature = "policy")]
pub use gate_policy as policy;

/// Audit trail (enabled by `audit` feature).
#[cfg(feature = "audit")]
pub use gate_audit as audit;

/// Gated tools and executors (enabled by `tools` feature).
#[cfg(feature = "tools")]
pub use gate_tools as tools;

/// Tool assembly and bootstrap (enabled by `kernel` feature).
#[cfg(feature = "kernel")]
pub use gate_kernel as kernel;

/// Layered configuration (enabled by `config` feature).
#[cfg(feature = "config")]
pub use gate_config as config;

/// Tracing setup (enabled by `telemetry` feature).
#[cfg(feature = "telemetry")]
pub use gate_telemetry as telemetry;
