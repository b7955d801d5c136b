//! Build plan generation.
//!
//! A BuildPlan describes every unity, compile, link and archive step needed
//! to produce a set of targets. Each target is expanded independently; the
//! plan then checks that no two steps claim the same output.

use std::collections::{HashMap, HashSet};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::builder::context::BuildContext;
use crate::builder::errors::GenerationError;
use crate::builder::unity::batch_sources;
use crate::core::target::{Language, SourceFile, Target, TargetKind};

/// A complete build plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildPlan {
    /// Expanded targets in input order
    pub targets: Vec<PlannedTarget>,
}

/// The steps produced by one target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedTarget {
    /// Target name
    pub name: String,

    /// Target kind
    pub kind: TargetKind,

    /// Final artifact path
    pub output: PathBuf,

    /// Steps in emission order: unity, compile, then link or archive
    pub steps: Vec<BuildStep>,
}

/// A build step in the plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BuildStep {
    /// Synthesize a unity source from a batch of members
    Unity(UnityStep),
    /// Compile a source file to an object file
    Compile(CompileStep),
    /// Link objects into an executable or shared library
    Link(LinkStep),
    /// Create a static library from object files
    Archive(ArchiveStep),
}

/// A step that writes a unity source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnityStep {
    /// Synthesized source file
    pub output: PathBuf,

    /// Sources it includes, in order
    pub members: Vec<PathBuf>,

    /// Language class of every member
    pub lang: Language,

    /// Target name
    pub target: String,
}

/// A single compilation step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileStep {
    /// Source file
    pub source: PathBuf,

    /// Output object file
    pub output: PathBuf,

    /// Source language (C or C++)
    pub lang: Language,

    /// Compiler flags: build-type flags, then the target's language flags
    pub flags: Vec<String>,

    /// Include directories
    pub include_dirs: Vec<String>,

    /// Preprocessor defines
    pub defines: Vec<String>,

    /// Target name
    pub target: String,
}

/// How a link step is invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkMode {
    Executable,
    SharedLib,
}

/// A single link step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkStep {
    /// Object files to link
    pub objects: Vec<PathBuf>,

    /// Output file
    pub output: PathBuf,

    /// Files that trigger a relink without appearing on the command line
    pub implicit_inputs: Vec<PathBuf>,

    /// Libraries passed on the command line
    pub libs: Vec<String>,

    /// Linker flags
    pub flags: Vec<String>,

    pub mode: LinkMode,

    /// Target name
    pub target: String,
}

/// A step to create a static library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveStep {
    /// Object files to archive
    pub objects: Vec<PathBuf>,

    /// Output archive file
    pub output: PathBuf,

    /// Target name
    pub target: String,
}

/// Ninja rules a plan can use, in the order they are declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RuleKind {
    CompileC,
    CompileCxx,
    Link,
    Archive,
    Unity,
}

impl RuleKind {
    pub const ALL: [RuleKind; 5] = [
        RuleKind::CompileC,
        RuleKind::CompileCxx,
        RuleKind::Link,
        RuleKind::Archive,
        RuleKind::Unity,
    ];

    /// Rule name in the generated file.
    pub fn name(&self) -> &'static str {
        match self {
            RuleKind::CompileC => "cc",
            RuleKind::CompileCxx => "cxx",
            RuleKind::Link => "link",
            RuleKind::Archive => "ar",
            RuleKind::Unity => "unity",
        }
    }

    pub fn compile(lang: Language) -> Self {
        match lang {
            Language::C => RuleKind::CompileC,
            Language::Cxx => RuleKind::CompileCxx,
        }
    }
}

impl BuildStep {
    /// The file this step produces.
    pub fn output(&self) -> &Path {
        match self {
            BuildStep::Unity(s) => &s.output,
            BuildStep::Compile(s) => &s.output,
            BuildStep::Link(s) => &s.output,
            BuildStep::Archive(s) => &s.output,
        }
    }

    /// Name of the target that owns this step.
    pub fn target(&self) -> &str {
        match self {
            BuildStep::Unity(s) => &s.target,
            BuildStep::Compile(s) => &s.target,
            BuildStep::Link(s) => &s.target,
            BuildStep::Archive(s) => &s.target,
        }
    }

    /// Rule used to run this step.
    pub fn rule(&self) -> RuleKind {
        match self {
            BuildStep::Unity(_) => RuleKind::Unity,
            BuildStep::Compile(s) => RuleKind::compile(s.lang),
            BuildStep::Link(_) => RuleKind::Link,
            BuildStep::Archive(_) => RuleKind::Archive,
        }
    }

    /// Human description used in duplicate-output reports.
    pub fn describe(&self) -> String {
        let what = match self {
            BuildStep::Unity(_) => "unity source",
            BuildStep::Compile(s) => {
                return format!(
                    "compile of `{}` in target `{}`",
                    s.source.display(),
                    s.target
                )
            }
            BuildStep::Link(_) => "link",
            BuildStep::Archive(_) => "archive",
        };
        format!("{} step of target `{}`", what, self.target())
    }
}

impl BuildPlan {
    /// Expand every target and verify output uniqueness across the run.
    pub fn new(targets: &[Target], ctx: &BuildContext<'_>) -> Result<Self, GenerationError> {
        let mut planned = Vec::with_capacity(targets.len());
        let mut owners: HashMap<PathBuf, String> = HashMap::new();

        for target in targets {
            let expanded = expand_target(target, ctx).map_err(|e| e.in_target(&target.name))?;

            for step in &expanded.steps {
                let output = step.output().to_path_buf();
                if let Some(first) = owners.get(&output) {
                    return Err(GenerationError::DuplicateOutput {
                        path: output.display().to_string(),
                        first: first.clone(),
                        second: step.describe(),
                    });
                }
                owners.insert(output, step.describe());
            }

            planned.push(expanded);
        }

        tracing::debug!(
            "planned {} targets, {} steps",
            planned.len(),
            planned.iter().map(|t| t.steps.len()).sum::<usize>()
        );

        Ok(BuildPlan { targets: planned })
    }

    /// All steps across all targets, in emission order.
    pub fn steps(&self) -> impl Iterator<Item = &BuildStep> {
        self.targets.iter().flat_map(|t| t.steps.iter())
    }

    /// Rules referenced by at least one step, in declaration order.
    pub fn used_rules(&self) -> Vec<RuleKind> {
        RuleKind::ALL
            .into_iter()
            .filter(|rule| self.steps().any(|s| s.rule() == *rule))
            .collect()
    }

    /// Final artifact of each target, in input order.
    pub fn final_outputs(&self) -> Vec<&Path> {
        self.targets.iter().map(|t| t.output.as_path()).collect()
    }

    /// Get the number of compilation steps.
    pub fn compile_count(&self) -> usize {
        self.steps()
            .filter(|s| matches!(s, BuildStep::Compile(_)))
            .count()
    }

    /// Get the number of link and archive steps.
    pub fn link_count(&self) -> usize {
        self.steps()
            .filter(|s| matches!(s, BuildStep::Link(_) | BuildStep::Archive(_)))
            .count()
    }
}

/// Expand one target into its steps.
///
/// Errors are returned bare; [`BuildPlan::new`] attaches the target name.
pub fn expand_target(
    target: &Target,
    ctx: &BuildContext<'_>,
) -> Result<PlannedTarget, GenerationError> {
    let bindings = ctx.bindings;
    let profile = ctx.profile;

    let output = ctx.under_build_root(Path::new(&bindings.expand(&target.output)?));

    if target.sources.is_empty() {
        return Err(GenerationError::EmptyTarget {
            target: target.name.clone(),
        });
    }

    // A repeated source would be compiled twice, or included twice by a
    // unity batch; both are reported as a duplicate object.
    let mut sources = Vec::with_capacity(target.sources.len());
    let mut seen = HashSet::new();
    for template in &target.sources {
        let path = bindings.expand(template)?;
        let source = SourceFile::classify(&path)
            .ok_or(GenerationError::UnrecognizedSource { path })?;
        profile.compiler(source.lang)?;

        let object = ctx.object_path(&source.path);
        if !seen.insert(object.clone()) {
            let step = format!(
                "compile of `{}` in target `{}`",
                source.path.display(),
                target.name
            );
            return Err(GenerationError::DuplicateOutput {
                path: object.display().to_string(),
                first: step.clone(),
                second: step,
            });
        }
        sources.push(source);
    }

    let mut steps = Vec::new();

    // With unity enabled only the synthesized sources are compiled.
    let compiled: Vec<SourceFile> = if target.unity {
        let mut dir: OsString = output.clone().into_os_string();
        dir.push(".unity");
        let dir = PathBuf::from(dir);

        batch_sources(&sources, ctx.options.unity_batch_size)
            .into_iter()
            .map(|batch| {
                let path = batch.path_in(&dir);
                steps.push(BuildStep::Unity(UnityStep {
                    output: path.clone(),
                    members: batch.members,
                    lang: batch.lang,
                    target: target.name.clone(),
                }));
                SourceFile {
                    path,
                    lang: batch.lang,
                }
            })
            .collect()
    } else {
        sources
    };

    let mut include_dirs = bindings.expand_all(&target.include_dirs)?;
    if !include_dirs.iter().any(|d| Path::new(d) == Path::new(".")) {
        include_dirs.push(".".to_string());
    }
    let defines = bindings.expand_all(&target.defines)?;
    let cflags = bindings.expand_all(&target.cflags)?;
    let cxxflags = bindings.expand_all(&target.cxxflags)?;

    let mut objects = Vec::with_capacity(compiled.len());
    for source in compiled {
        let mut flags = ctx.profile_flags().to_vec();
        flags.extend_from_slice(match source.lang {
            Language::C => &cflags,
            Language::Cxx => &cxxflags,
        });

        let object = ctx.object_path(&source.path);
        objects.push(object.clone());
        steps.push(BuildStep::Compile(CompileStep {
            source: source.path,
            output: object,
            lang: source.lang,
            flags,
            include_dirs: include_dirs.clone(),
            defines: defines.clone(),
            target: target.name.clone(),
        }));
    }

    let final_step = match target.kind {
        TargetKind::StaticLib => BuildStep::Archive(ArchiveStep {
            objects,
            output: output.clone(),
            target: target.name.clone(),
        }),
        TargetKind::Exe | TargetKind::SharedLib => {
            let mut flags = bindings.expand_all(&target.ldflags)?;
            let mode = if target.kind == TargetKind::SharedLib {
                flags.push(profile.shared_flag.clone());
                LinkMode::SharedLib
            } else {
                LinkMode::Executable
            };

            BuildStep::Link(LinkStep {
                objects,
                output: output.clone(),
                implicit_inputs: bindings
                    .expand_all(&target.link_deps)?
                    .into_iter()
                    .map(PathBuf::from)
                    .collect(),
                libs: bindings.expand_all(&target.libs)?,
                flags,
                mode,
                target: target.name.clone(),
            })
        }
    };
    steps.push(final_step);

    tracing::debug!(
        "expanded target `{}` ({}) into {} steps",
        target.name,
        target.kind.as_str(),
        steps.len()
    );

    Ok(PlannedTarget {
        name: target.name.clone(),
        kind: target.kind,
        output,
        steps,
    })
}
