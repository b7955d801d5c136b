//! dockyard - a Ninja build-file generator for C and C++
//!
//! Targets (executables, static and shared libraries) are expanded into
//! compile, link, archive and unity steps, and written as a single
//! `build.ninja` for the selected toolchain profile.

pub mod builder;
pub mod core;
pub mod ninja;
pub mod ops;
pub mod util;

/// Test utilities for dockyard unit tests.
///
/// Only available when compiling tests.
#[cfg(test)]
pub mod test_support;

pub use builder::{Bindings, GenerateOptions, GenerationError, ToolchainProfile};
pub use core::{Target, TargetKind};
pub use ops::generate::{generate, render};
pub use util::context::GlobalContext;
