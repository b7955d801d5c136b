//! High-level operations.
//!
//! This module contains the implementation of dockyard commands.

pub mod clean;
pub mod descriptor;
pub mod generate;
pub mod project;

pub use clean::{clean, CleanSummary};
pub use descriptor::{discover_targets, load_descriptor, Descriptor, TargetSpec, DESCRIPTOR_FILE};
pub use generate::{builtin_bindings, generate, plan, render, GenerateSummary};
pub use project::{Project, ProjectOverrides};
