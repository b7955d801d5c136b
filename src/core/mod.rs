//! Core data structures for dockyard.
//!
//! Targets, their kinds and settings, and source language classes.

pub mod target;

pub use target::{Language, SourceFile, Target, TargetKind, TargetSettings};
