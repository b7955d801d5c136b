//! A project: configuration, toolchain and targets resolved for one run.

use std::path::PathBuf;

use anyhow::{bail, Result};

use crate::builder::context::GenerateOptions;
use crate::builder::toolchain::{BuildType, ToolchainPlatform, ToolchainProfile};
use crate::builder::vars::Bindings;
use crate::core::target::Target;
use crate::ops::descriptor::discover_targets;
use crate::ops::generate::builtin_bindings;
use crate::util::config::Config;
use crate::util::context::GlobalContext;

/// Command-line overrides, applied on top of the configuration.
#[derive(Debug, Clone, Default)]
pub struct ProjectOverrides {
    /// Build in release mode
    pub release: bool,

    /// Toolchain family
    pub profile: Option<ToolchainPlatform>,

    /// Build root
    pub build_dir: Option<PathBuf>,

    /// Generated file
    pub output: Option<PathBuf>,

    /// Maximum number of sources per unity batch
    pub unity_batch_size: Option<usize>,

    /// Extra bindings; these win over config and built-ins
    pub vars: Vec<(String, String)>,
}

/// Everything needed to generate for one project.
#[derive(Debug, Clone)]
pub struct Project {
    /// Project root
    pub root: PathBuf,

    /// Merged configuration
    pub config: Config,

    pub options: GenerateOptions,

    pub profile: ToolchainProfile,

    pub bindings: Bindings,

    /// Generated file, absolute
    pub output: PathBuf,
}

impl Project {
    /// Load configuration and apply `overrides`.
    ///
    /// Binding precedence, lowest first: built-ins, config `[vars]`,
    /// `overrides.vars`.
    pub fn load(gctx: &GlobalContext, overrides: &ProjectOverrides) -> Result<Self> {
        let mut config = gctx.load_config()?;

        if let Some(dir) = &overrides.build_dir {
            config.build.build_dir = Some(dir.clone());
        }
        if overrides.release {
            config.build.build_type = Some(BuildType::Release);
        }
        if let Some(size) = overrides.unity_batch_size {
            config.build.unity_batch_size = Some(size);
        }
        if let Some(output) = &overrides.output {
            config.build.output = Some(output.clone());
        }

        let options = config.build.to_options();
        if options.build_root.as_os_str().is_empty() {
            bail!("build_dir must not be empty");
        }

        let profile = config.toolchain.to_profile(overrides.profile)?;

        let mut bindings = builtin_bindings(&options, &profile);
        bindings.extend(&config.vars.iter().collect());
        bindings.extend(&overrides.vars.iter().cloned().collect());

        let output = gctx.resolve(&config.build.output());

        tracing::debug!(
            "project at {}: profile {}, {} build, build root {}",
            gctx.cwd().display(),
            profile.platform,
            options.build_type,
            options.build_root.display()
        );

        Ok(Project {
            root: gctx.cwd().to_path_buf(),
            config,
            options,
            profile,
            bindings,
            output,
        })
    }

    /// Discover and load every target in the project.
    pub fn targets(&self) -> Result<Vec<Target>> {
        discover_targets(
            &self.root,
            &self.options.build_root,
            &self.config.defaults,
            &self.bindings,
        )
    }

    /// Build root, absolute.
    pub fn build_root(&self) -> PathBuf {
        self.root.join(&self.options.build_root)
    }
}
