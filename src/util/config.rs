//! Configuration file support for dockyard.
//!
//! dockyard reads two configuration file locations:
//! - Global: `~/.dockyard/config.toml` - User-wide defaults
//! - Project: `.dockyard/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::builder::context::GenerateOptions;
use crate::builder::toolchain::{infer_cxx, BuildType, ToolchainPlatform, ToolchainProfile};
use crate::core::target::TargetSettings;

/// dockyard configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Build settings
    pub build: BuildConfig,

    /// Toolchain selection and executable overrides
    pub toolchain: ToolchainSettings,

    /// Extra placeholder bindings
    pub vars: BTreeMap<String, String>,

    /// Settings applied under every target
    pub defaults: TargetSettings,
}

/// Build-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Build root (default `build`)
    pub build_dir: Option<PathBuf>,

    /// `debug` or `release`
    pub build_type: Option<BuildType>,

    /// Generated file (default `build.ninja`)
    pub output: Option<PathBuf>,

    /// Maximum number of sources per unity batch
    pub unity_batch_size: Option<usize>,

    /// Maximum line width of the generated file
    pub line_width: Option<usize>,

    /// Emit the `all` phony target and make it the default
    pub emit_default: Option<bool>,
}

/// Toolchain settings for C/C++ compilation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainSettings {
    /// Compiler family: gcc, clang or msvc
    pub profile: Option<String>,

    /// C compiler (e.g., /usr/bin/clang). An empty string disables C.
    pub cc: Option<String>,

    /// C++ compiler (e.g., /usr/bin/clang++). An empty string disables C++.
    pub cxx: Option<String>,

    /// Linker driver
    pub linker: Option<String>,

    /// Path to the archiver (e.g., /usr/bin/llvm-ar)
    pub ar: Option<String>,
}

/// Default generated file name.
pub const DEFAULT_OUTPUT: &str = "build.ninja";

impl ToolchainSettings {
    /// Merge another section into this one (other takes precedence).
    pub fn merge(&mut self, other: ToolchainSettings) {
        if other.profile.is_some() {
            self.profile = other.profile;
        }
        if other.cc.is_some() {
            self.cc = other.cc;
        }
        if other.cxx.is_some() {
            self.cxx = other.cxx;
        }
        if other.linker.is_some() {
            self.linker = other.linker;
        }
        if other.ar.is_some() {
            self.ar = other.ar;
        }
    }

    /// Build the toolchain profile these settings describe.
    ///
    /// `platform` overrides the configured profile name. When only `cc` is
    /// set, the C++ compiler and linker are inferred from it.
    pub fn to_profile(&self, platform: Option<ToolchainPlatform>) -> Result<ToolchainProfile> {
        let platform = match platform {
            Some(p) => p,
            None => match &self.profile {
                Some(name) => name
                    .parse::<ToolchainPlatform>()
                    .map_err(anyhow::Error::msg)
                    .context("invalid [toolchain] profile")?,
                None => ToolchainPlatform::Gcc,
            },
        };

        let mut profile = ToolchainProfile::for_platform(platform);

        if let Some(cc) = &self.cc {
            profile.c_compiler = Some(cc.clone());
            if self.cxx.is_none() && !cc.is_empty() {
                let cxx = infer_cxx(Path::new(cc)).to_string_lossy().into_owned();
                if self.linker.is_none() && platform != ToolchainPlatform::Msvc {
                    profile.linker = cxx.clone();
                }
                profile.cxx_compiler = Some(cxx);
            }
        }
        if let Some(cxx) = &self.cxx {
            profile.cxx_compiler = Some(cxx.clone());
            if self.linker.is_none() && !cxx.is_empty() && platform != ToolchainPlatform::Msvc {
                profile.linker = cxx.clone();
            }
        }
        if let Some(linker) = &self.linker {
            profile.linker = linker.clone();
        }
        if let Some(ar) = &self.ar {
            profile.archiver = ar.clone();
        }

        Ok(profile)
    }
}

impl BuildConfig {
    /// Merge another section into this one (other takes precedence).
    pub fn merge(&mut self, other: BuildConfig) {
        if other.build_dir.is_some() {
            self.build_dir = other.build_dir;
        }
        if other.build_type.is_some() {
            self.build_type = other.build_type;
        }
        if other.output.is_some() {
            self.output = other.output;
        }
        if other.unity_batch_size.is_some() {
            self.unity_batch_size = other.unity_batch_size;
        }
        if other.line_width.is_some() {
            self.line_width = other.line_width;
        }
        if other.emit_default.is_some() {
            self.emit_default = other.emit_default;
        }
    }

    /// Generation options with unset values at their defaults.
    ///
    /// `.` components are dropped from the build root, so `./build` and
    /// `build` name the same root.
    pub fn to_options(&self) -> GenerateOptions {
        let defaults = GenerateOptions::default();
        let build_root = match &self.build_dir {
            Some(dir) => dir
                .components()
                .filter(|c| !matches!(c, Component::CurDir))
                .collect(),
            None => defaults.build_root,
        };
        GenerateOptions {
            build_root,
            build_type: self.build_type.unwrap_or(defaults.build_type),
            unity_batch_size: self.unity_batch_size.unwrap_or(defaults.unity_batch_size),
            line_width: self.line_width.unwrap_or(defaults.line_width),
            emit_default: self.emit_default.unwrap_or(defaults.emit_default),
        }
    }

    /// Path of the generated file.
    pub fn output(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT))
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Merge another config into this one (other takes precedence).
    ///
    /// `[vars]` are merged key by key; every other field is replaced only
    /// when set in `other`.
    pub fn merge(&mut self, other: Config) {
        self.build.merge(other.build);
        self.toolchain.merge(other.toolchain);
        self.vars.extend(other.vars);
        self.defaults.merge(other.defaults);
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.dockyard/config.toml)
/// 2. Global config (~/.dockyard/config.toml)
/// 3. Defaults
///
/// Unlike a missing file, a file that exists but cannot be parsed is an
/// error.
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Result<Config> {
    let mut config = Config::default();

    // Load global config first
    if let Some(global_path) = global_path.filter(|p| p.exists()) {
        tracing::debug!("loading global config from {}", global_path.display());
        config.merge(Config::load(global_path)?);
    }

    // Project config overrides global
    if project_path.exists() {
        tracing::debug!("loading project config from {}", project_path.display());
        config.merge(Config::load(project_path)?);
    }

    Ok(config)
}

/// Get the global dockyard config directory (~/.dockyard).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".dockyard"))
}

/// Get the project config path (.dockyard/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".dockyard").join("config.toml")
}
