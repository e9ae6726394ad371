//! Security gate evaluated before every tool invocation.
//!
//! [`PolicyGate`] runs an ordered list of [`GateRule`]s where the first
//! denial wins. The gate never errors: rule failures and panics resolve to a
//! `gate_error` denial so the invocation fails closed.

#![warn(missing_docs, clippy::pedantic)]

pub mod contracts;
pub mod decision;
pub mod engine;
pub mod integrations;
pub mod network;
pub mod rate;
pub mod rules;

pub use contracts::CheckRequest;
pub use decision::{SecurityCheck, codes};
pub use engine::{PolicyError, PolicyGate, PolicyGateBuilder, PolicyResult, SecurityGate};
pub use integrations::{GovernanceClient, RemoteGate};
pub use network::{DomainAllowlist, is_private_host};
pub use rate::{Clock, ManualClock, RateLimiter, SystemClock};
pub use rules::{GateRule, Verdict};
