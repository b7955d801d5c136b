//! Ninja graph generation.
//!
//! This module turns targets into build steps and build steps into a Ninja
//! document.

pub mod context;
pub mod document;
pub mod errors;
pub mod plan;
pub mod toolchain;
pub mod unity;
pub mod vars;

pub use context::{BuildContext, GenerateOptions};
pub use document::GraphDocument;
pub use errors::GenerationError;
pub use plan::{BuildPlan, BuildStep};
pub use toolchain::{BuildType, ToolchainPlatform, ToolchainProfile};
pub use vars::Bindings;
