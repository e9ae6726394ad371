//! Gated tool set for the skill gateway.
//!
//! Every callable handed to a model is a [`ToolHandle`] whose implementation
//! runs the same pipeline: the security gate decides, the executor runs only
//! when allowed, and exactly one audit record is written. [`ToolFactory`]
//! builds such handles for local skills, remote server tools, and peer agents.

#![warn(missing_docs, clippy::pedantic)]

pub mod calculator;
pub mod cancel;
pub mod code;
mod error;
pub mod factory;
pub mod gated;
pub mod limits;
mod outbound;
pub mod peer;
pub mod registry;
mod remote;
pub mod secrets;
mod skill;
pub mod template;
mod webhook;

pub use cancel::{CancelToken, TurnCancellation};
pub use error::{ToolError, ToolResult};
pub use factory::{PEER_KIND, REMOTE_KIND, ToolFactory};
pub use gated::{Executor, GateProfile, GatedTool, Pipeline};
pub use limits::ExecutionLimits;
pub use peer::{PeerConversations, PeerLineage, PeerReply, PeerRequest};
pub use registry::{InvocationContext, Tool, ToolHandle, ToolMetadata, ToolSet};
pub use template::TemplateRoutine;
