//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use dockyard::builder::ToolchainPlatform;
use dockyard::ops::ProjectOverrides;

/// dockyard - generate Ninja build files for C and C++ targets
#[derive(Parser)]
#[command(name = "dockyard")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Run as if started in DIR
    #[arg(short = 'C', long, global = true, value_name = "DIR")]
    pub directory: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write build.ninja for every target in the project
    Generate(GenerateArgs),

    /// Print the expanded build steps as JSON
    Plan(PlanArgs),

    /// Remove the build root and the generated file
    Clean(CleanArgs),
}

/// Options shared by every command that expands targets.
#[derive(Args)]
pub struct ProjectArgs {
    /// Use release flags instead of debug flags
    #[arg(short, long)]
    pub release: bool,

    /// Toolchain profile (gcc, clang, msvc)
    #[arg(long, env = "DOCKYARD_PROFILE")]
    pub profile: Option<ToolchainPlatform>,

    /// Build root for all generated artifacts
    #[arg(long, value_name = "DIR")]
    pub build_dir: Option<PathBuf>,

    /// Bind a placeholder, e.g. `--var GEN=build/gen`
    #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_var)]
    pub vars: Vec<(String, String)>,

    /// Maximum number of sources per unity batch
    #[arg(long, value_name = "N")]
    pub unity_batch_size: Option<usize>,
}

impl ProjectArgs {
    pub fn overrides(&self, output: Option<PathBuf>) -> ProjectOverrides {
        ProjectOverrides {
            release: self.release,
            profile: self.profile,
            build_dir: self.build_dir.clone(),
            output,
            unity_batch_size: self.unity_batch_size,
            vars: self.vars.clone(),
        }
    }
}

#[derive(Args)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// File to write (default: build.ninja)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Print to stdout instead of writing a file
    #[arg(long, conflicts_with = "output")]
    pub stdout: bool,
}

#[derive(Args)]
pub struct PlanArgs {
    #[command(flatten)]
    pub project: ProjectArgs,
}

#[derive(Args)]
pub struct CleanArgs {
    /// Build root to remove
    #[arg(long, value_name = "DIR")]
    pub build_dir: Option<PathBuf>,

    /// Generated file to remove
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

fn parse_var(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{}`", s))?;

    let valid = key
        .chars()
        .enumerate()
        .all(|(i, c)| c == '_' || c.is_ascii_alphabetic() || (i > 0 && c.is_ascii_digit()));
    if key.is_empty() || !valid {
        return Err(format!("`{}` is not a valid placeholder name", key));
    }

    Ok((key.to_string(), value.to_string()))
}
