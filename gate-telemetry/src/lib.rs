//! Tracing subscriber setup for processes embedding the gateway.

#![warn(missing_docs, clippy::pedantic)]

use anyhow::Context;
use gate_config::TelemetrySettings;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Builds the event filter: `RUST_LOG` when set, otherwise `settings.filter`.
///
/// # Errors
///
/// Returns an error when `settings.filter` is not a valid directive list.
pub fn filter(settings: &TelemetrySettings) -> anyhow::Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&settings.filter)
            .with_context(|| format!("invalid telemetry filter `{}`", settings.filter)),
    }
}

/// Installs a global `fmt` subscriber.
///
/// # Errors
///
/// Returns an error when the filter is invalid or a global subscriber is
/// already installed.
pub fn init(settings: &TelemetrySettings) -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(filter(settings)?)
        .with(tracing_subscriber::fmt::layer().with_target(settings.with_target))
        .try_init()
        .context("failed to install tracing subscriber")?;
    tracing::debug!(filter = %settings.filter, "telemetry initialised");
    Ok(())
}
