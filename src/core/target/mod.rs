//! Target definitions - what gets built.
//!
//! A Target represents a buildable artifact: executable, static library,
//! or shared library.

mod core;
mod language;

pub use self::core::{Target, TargetKind, TargetSettings};
pub use self::language::{Language, SourceFile};
