//! Build context - toolchain, bindings and output layout for one run.

use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::builder::toolchain::{BuildType, ToolchainProfile};
use crate::builder::unity::DEFAULT_BATCH_SIZE;
use crate::builder::vars::Bindings;
use crate::ninja::DEFAULT_WIDTH;

/// Options controlling a generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// Root directory for every generated artifact
    pub build_root: PathBuf,

    /// Debug or release
    pub build_type: BuildType,

    /// Maximum number of sources per unity batch
    pub unity_batch_size: usize,

    /// Maximum width of a line in the generated file
    pub line_width: usize,

    /// Emit an `all` phony target and make it the default
    pub emit_default: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        GenerateOptions {
            build_root: PathBuf::from("build"),
            build_type: BuildType::Debug,
            unity_batch_size: DEFAULT_BATCH_SIZE,
            line_width: DEFAULT_WIDTH,
            emit_default: true,
        }
    }
}

/// Everything target expansion reads besides the target itself.
#[derive(Debug, Clone, Copy)]
pub struct BuildContext<'a> {
    /// Selected toolchain
    pub profile: &'a ToolchainProfile,

    /// Placeholder bindings
    pub bindings: &'a Bindings,

    /// Run options
    pub options: &'a GenerateOptions,
}

impl<'a> BuildContext<'a> {
    pub fn new(
        profile: &'a ToolchainProfile,
        bindings: &'a Bindings,
        options: &'a GenerateOptions,
    ) -> Self {
        BuildContext {
            profile,
            bindings,
            options,
        }
    }

    /// Root directory for generated artifacts.
    pub fn build_root(&self) -> &Path {
        &self.options.build_root
    }

    /// Compile flags contributed by the build type.
    pub fn profile_flags(&self) -> &[String] {
        self.profile.build_type_flags(self.options.build_type)
    }

    /// Place `path` under the build root unless it is already there.
    ///
    /// Absolute paths lose their root and `..` components become `__`, so
    /// the result never escapes the build root. `.` components are ignored.
    pub fn under_build_root(&self, path: &Path) -> PathBuf {
        let root = self.build_root();
        let path: PathBuf = path
            .components()
            .filter(|c| !matches!(c, Component::CurDir))
            .collect();
        if path.starts_with(root) {
            return path;
        }

        let mut out = root.to_path_buf();
        for component in path.components() {
            match component {
                Component::Prefix(_) | Component::RootDir | Component::CurDir => {}
                Component::ParentDir => out.push("__"),
                Component::Normal(part) => out.push(part),
            }
        }
        out
    }

    /// Object file for a source: `<build_root>/<source><object_extension>`.
    pub fn object_path(&self, source: &Path) -> PathBuf {
        let mut path: OsString = self.under_build_root(source).into_os_string();
        path.push(&self.profile.object_extension);
        PathBuf::from(path)
    }
}
