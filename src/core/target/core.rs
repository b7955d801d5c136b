//! Core target types.
//!
//! This module contains the main Target struct and the settings overlay
//! used to layer per-target values on top of shared defaults.

use serde::{Deserialize, Serialize};

/// The kind of target being built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    /// Executable binary
    #[default]
    #[serde(alias = "bin", alias = "executable")]
    Exe,

    /// Static library (.a / .lib)
    #[serde(alias = "lib", alias = "static")]
    StaticLib,

    /// Shared/dynamic library (.so / .dylib / .dll)
    #[serde(alias = "dylib", alias = "dynamic", alias = "shared")]
    SharedLib,
}

impl TargetKind {
    /// Get the kind name as written in descriptors.
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::Exe => "exe",
            TargetKind::StaticLib => "staticlib",
            TargetKind::SharedLib => "sharedlib",
        }
    }
}

/// Compile and link settings that can be inherited from shared defaults.
///
/// Every field is optional so that an override can say "keep the base value"
/// by leaving it out. See [`TargetSettings::merge`] for precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetSettings {
    /// Flags for C sources
    pub cflags: Option<Vec<String>>,

    /// Flags for C++ sources
    pub cxxflags: Option<Vec<String>>,

    /// Linker flags (executables and shared libraries)
    pub ldflags: Option<Vec<String>>,

    /// Header search paths
    pub include_dirs: Option<Vec<String>>,

    /// Preprocessor defines (`NAME` or `NAME=VALUE`)
    pub defines: Option<Vec<String>>,

    /// Libraries passed on the link command line
    pub libs: Option<Vec<String>>,

    /// Files the link step depends on without naming them on the command line
    pub link_deps: Option<Vec<String>>,

    /// Merge sources into unity batches
    pub unity: Option<bool>,
}

impl TargetSettings {
    /// Merge another set of settings into this one (other takes precedence).
    ///
    /// A field present in `other` replaces the field in `self`; lists are
    /// replaced, not concatenated.
    pub fn merge(&mut self, other: TargetSettings) {
        if other.cflags.is_some() {
            self.cflags = other.cflags;
        }
        if other.cxxflags.is_some() {
            self.cxxflags = other.cxxflags;
        }
        if other.ldflags.is_some() {
            self.ldflags = other.ldflags;
        }
        if other.include_dirs.is_some() {
            self.include_dirs = other.include_dirs;
        }
        if other.defines.is_some() {
            self.defines = other.defines;
        }
        if other.libs.is_some() {
            self.libs = other.libs;
        }
        if other.link_deps.is_some() {
            self.link_deps = other.link_deps;
        }
        if other.unity.is_some() {
            self.unity = other.unity;
        }
    }

    /// Return `base` overlaid with `overrides`.
    pub fn overlay(base: &TargetSettings, overrides: TargetSettings) -> TargetSettings {
        let mut merged = base.clone();
        merged.merge(overrides);
        merged
    }
}

/// A fully specified build target.
///
/// Targets are produced by the descriptor loader (or built directly through
/// the library API) and are only ever read by the generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Target name, used in diagnostics and comments
    pub name: String,

    /// What kind of artifact to produce
    pub kind: TargetKind,

    /// Output path template (may contain `{placeholders}`)
    pub output: String,

    /// Source files in declaration order
    pub sources: Vec<String>,

    /// Flags for C sources
    pub cflags: Vec<String>,

    /// Flags for C++ sources
    pub cxxflags: Vec<String>,

    /// Linker flags
    pub ldflags: Vec<String>,

    /// Header search paths
    pub include_dirs: Vec<String>,

    /// Preprocessor defines
    pub defines: Vec<String>,

    /// Libraries passed on the link command line
    pub libs: Vec<String>,

    /// Implicit link dependencies
    pub link_deps: Vec<String>,

    /// Whether unity batching is enabled
    pub unity: bool,
}

impl Target {
    /// Create a target with no sources and empty settings.
    pub fn new(name: impl Into<String>, kind: TargetKind, output: impl Into<String>) -> Self {
        Target {
            name: name.into(),
            kind,
            output: output.into(),
            sources: Vec::new(),
            cflags: Vec::new(),
            cxxflags: Vec::new(),
            ldflags: Vec::new(),
            include_dirs: Vec::new(),
            defines: Vec::new(),
            libs: Vec::new(),
            link_deps: Vec::new(),
            unity: false,
        }
    }

    /// Create a target from resolved settings.
    pub fn from_settings(
        name: impl Into<String>,
        kind: TargetKind,
        output: impl Into<String>,
        sources: Vec<String>,
        settings: TargetSettings,
    ) -> Self {
        Target {
            sources,
            cflags: settings.cflags.unwrap_or_default(),
            cxxflags: settings.cxxflags.unwrap_or_default(),
            ldflags: settings.ldflags.unwrap_or_default(),
            include_dirs: settings.include_dirs.unwrap_or_default(),
            defines: settings.defines.unwrap_or_default(),
            libs: settings.libs.unwrap_or_default(),
            link_deps: settings.link_deps.unwrap_or_default(),
            unity: settings.unity.unwrap_or(false),
            ..Target::new(name, kind, output)
        }
    }

    /// Set the source list.
    pub fn with_sources(mut self, sources: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.sources = sources.into_iter().map(Into::into).collect();
        self
    }

    /// Enable or disable unity batching.
    pub fn with_unity(mut self, unity: bool) -> Self {
        self.unity = unity;
        self
    }
}
