//! Test utilities for dockyard unit tests.
//!
//! Target constructors for the common shapes plus on-disk project fixtures.

pub mod fixtures;

pub use fixtures::*;

use crate::core::target::{Target, TargetKind};

/// An executable written to `{BUILD_DIR}/<name>`.
pub fn exe(name: &str, sources: &[&str]) -> Target {
    Target::new(name, TargetKind::Exe, format!("{{BUILD_DIR}}/{}", name))
        .with_sources(sources.iter().copied())
}

/// A static library written to `{BUILD_DIR}/lib<name>.a`.
pub fn static_lib(name: &str, sources: &[&str]) -> Target {
    Target::new(
        name,
        TargetKind::StaticLib,
        format!("{{BUILD_DIR}}/lib{}.a", name),
    )
    .with_sources(sources.iter().copied())
}

/// A shared library written to `{BUILD_DIR}/lib<name>.so`.
pub fn shared_lib(name: &str, sources: &[&str]) -> Target {
    Target::new(
        name,
        TargetKind::SharedLib,
        format!("{{BUILD_DIR}}/lib{}.so", name),
    )
    .with_sources(sources.iter().copied())
}
