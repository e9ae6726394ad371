//! Tool assembly for the skill gateway.
//!
//! [`ToolAssembler`] turns live registry state into the flat, name-sanitized
//! tool set a model sees for one turn. [`GatewayBuilder`] wires the gate,
//! audit sink, transport, and assembler from configuration.

#![warn(missing_docs, clippy::pedantic)]

mod assembler;
mod bootstrap;
mod error;
pub mod scope;

pub use assembler::ToolAssembler;
pub use bootstrap::{GatewayBuilder, execution_limits, policy_gate};
pub use error::{KernelError, KernelResult};
pub use scope::Scope;
