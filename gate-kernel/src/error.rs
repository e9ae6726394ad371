use gate_audit::AuditError;
use gate_bridge::BridgeError;
use gate_config::ConfigError;
use gate_registry::RegistryError;
use thiserror::Error;

/// Result alias for assembly and bootstrap.
pub type KernelResult<T> = Result<T, KernelError>;

/// Failures that abort a whole assembly or bootstrap.
///
/// Per-tool and per-server problems never surface here.
#[derive(Debug, Error)]
pub enum KernelError {
    /// The registry could not say what is approved or assigned.
    #[error("tool assembly failed: {0}")]
    Registry(#[from] RegistryError),

    /// The outbound transport could not be built.
    #[error("transport setup failed: {0}")]
    Transport(#[from] BridgeError),

    /// The audit journal could not be opened.
    #[error("audit setup failed: {0}")]
    Audit(#[from] AuditError),

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
