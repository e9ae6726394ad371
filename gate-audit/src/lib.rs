//! Audit trail for the skill gateway.
//!
//! Every tool invocation attempt produces exactly one [`InvocationRecord`];
//! every peer question produces one [`AgentInteraction`]. Sinks only append.

#![warn(missing_docs, clippy::pedantic)]

mod error;
pub mod journal;
pub mod record;
pub mod sink;

pub use error::{AuditError, AuditResult};
pub use journal::FileAuditLog;
pub use record::{AgentInteraction, AuditEntry, InvocationRecord, now_millis, truncate_for_log};
pub use sink::{AuditLog, CompositeAuditLog, MemoryAuditLog, TracingAuditLog};
