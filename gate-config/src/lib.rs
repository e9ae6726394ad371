//! Layered configuration for the skill gateway.
//!
//! Values are resolved in order: built-in defaults, an optional TOML file,
//! then `SKILLGATE__*` environment variables.

#![warn(missing_docs, clippy::pedantic)]

mod error;
mod loader;
mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{CONFIG_PATH_VAR, ConfigLoader, ENV_PREFIX};
pub use schema::{
    AuditSettings, GatewayConfig, HttpSettings, LimitSettings, PeerSettings, PolicySettings,
    TelemetrySettings,
};
