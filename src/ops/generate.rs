//! Implementation of `dockyard generate`.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::builder::context::{BuildContext, GenerateOptions};
use crate::builder::document::GraphDocument;
use crate::builder::errors::GenerationError;
use crate::builder::plan::BuildPlan;
use crate::builder::toolchain::ToolchainProfile;
use crate::builder::vars::Bindings;
use crate::core::target::Target;

/// What a generation run produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerateSummary {
    /// Generated file
    pub output: PathBuf,
    /// Number of targets
    pub targets: usize,
    /// Number of build edges, excluding the `all` aggregate
    pub steps: usize,
    /// Size of the generated file
    pub bytes: usize,
}

/// Bindings every run provides: `build_dir`/`BUILD_DIR`, `build_type` and
/// `profile`.
pub fn builtin_bindings(options: &GenerateOptions, profile: &ToolchainProfile) -> Bindings {
    let build_dir = options.build_root.to_string_lossy().into_owned();
    Bindings::new()
        .with("build_dir", build_dir.clone())
        .with("BUILD_DIR", build_dir)
        .with("build_type", options.build_type.as_str())
        .with("profile", profile.platform.as_str())
}

/// Expand `targets` into a plan without rendering it.
pub fn plan(
    targets: &[Target],
    profile: &ToolchainProfile,
    bindings: &Bindings,
    options: &GenerateOptions,
) -> Result<BuildPlan, GenerationError> {
    BuildPlan::new(targets, &BuildContext::new(profile, bindings, options))
}

/// Render the `build.ninja` text for `targets`.
pub fn render(
    targets: &[Target],
    profile: &ToolchainProfile,
    bindings: &Bindings,
    options: &GenerateOptions,
) -> Result<String, GenerationError> {
    let ctx = BuildContext::new(profile, bindings, options);
    let plan = BuildPlan::new(targets, &ctx)?;
    GraphDocument::from_plan(&plan, &ctx)?.render()
}

/// Generate `output` for `targets`.
///
/// The whole document is rendered before anything is written; on error the
/// previous file, if any, is left untouched.
pub fn generate(
    targets: &[Target],
    profile: &ToolchainProfile,
    bindings: &Bindings,
    output: &Path,
    options: &GenerateOptions,
) -> Result<GenerateSummary, GenerationError> {
    let ctx = BuildContext::new(profile, bindings, options);
    let plan = BuildPlan::new(targets, &ctx)?;
    let document = GraphDocument::from_plan(&plan, &ctx)?;
    let bytes = document.write_to(output)?;

    let summary = GenerateSummary {
        output: output.to_path_buf(),
        targets: plan.targets.len(),
        steps: plan.steps().count(),
        bytes,
    };

    tracing::info!(
        "wrote {} ({} targets, {} steps)",
        output.display(),
        summary.targets,
        summary.steps
    );

    Ok(summary)
}
