//! Graph document - the rules and edges of one `build.ninja`.
//!
//! The document is assembled in memory from a [`BuildPlan`] and rendered in
//! one pass, so a failing target never leaves a half-written file behind.

use std::path::{Path, PathBuf};

use crate::builder::context::BuildContext;
use crate::builder::errors::GenerationError;
use crate::builder::plan::{BuildPlan, BuildStep, RuleKind};
use crate::builder::toolchain::ToolchainProfile;
use crate::core::target::Language;
use crate::ninja::{escape, BuildEdge, RuleOptions, Writer};
use crate::util::fs::write_atomic;

/// First comment of every generated file.
pub const HEADER: &str =
    "build.ninja generated by dockyard. Edit the BUILD.toml descriptors instead of this file.";

/// `deps` in rules needs at least this version.
pub const NINJA_REQUIRED_VERSION: &str = "1.3";

/// Name of the phony target covering every final artifact.
pub const ALL_TARGET: &str = "all";

/// A `rule` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleDecl {
    pub name: &'static str,
    pub command: String,
    pub options: RuleOptions,
}

/// Edges of one target, preceded by a comment naming it.
#[derive(Debug, Clone)]
pub struct EdgeGroup {
    pub comment: String,
    pub edges: Vec<BuildEdge>,
}

/// In-memory `build.ninja`.
#[derive(Debug, Clone)]
pub struct GraphDocument {
    builddir: PathBuf,
    rules: Vec<RuleDecl>,
    groups: Vec<EdgeGroup>,
    defaults: Vec<String>,
    width: usize,
}

impl GraphDocument {
    /// Assemble the document for `plan`.
    ///
    /// Only rules some step uses are declared, always in the order
    /// cc, cxx, link, ar, unity.
    pub fn from_plan(plan: &BuildPlan, ctx: &BuildContext<'_>) -> Result<Self, GenerationError> {
        let rules = plan
            .used_rules()
            .into_iter()
            .map(|kind| rule_decl(kind, ctx.profile))
            .collect::<Result<Vec<_>, _>>()?;

        let mut groups = Vec::with_capacity(plan.targets.len());
        for target in &plan.targets {
            let edges = target
                .steps
                .iter()
                .map(|step| step_edge(step, ctx.profile))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| e.in_target(&target.name))?;
            groups.push(EdgeGroup {
                comment: format!("{} target: {}", target.kind.as_str(), target.name),
                edges,
            });
        }

        let defaults = if ctx.options.emit_default {
            plan.final_outputs().into_iter().map(path_str).collect()
        } else {
            Vec::new()
        };

        Ok(GraphDocument {
            builddir: ctx.build_root().to_path_buf(),
            rules,
            groups,
            defaults,
            width: ctx.options.line_width,
        })
    }

    pub fn rules(&self) -> &[RuleDecl] {
        &self.rules
    }

    pub fn groups(&self) -> &[EdgeGroup] {
        &self.groups
    }

    /// Render to Ninja syntax.
    pub fn render(&self) -> Result<String, GenerationError> {
        let mut w = Writer::with_width(self.width);

        w.comment(HEADER);
        w.variable("ninja_required_version", NINJA_REQUIRED_VERSION, 0);
        w.variable("builddir", &escape(&path_str(&self.builddir))?, 0);
        w.newline();

        for rule in &self.rules {
            w.rule(rule.name, &rule.command, &rule.options);
            w.newline();
        }

        for group in &self.groups {
            w.comment(&group.comment);
            for edge in &group.edges {
                w.build(edge)?;
            }
            w.newline();
        }

        if !self.defaults.is_empty() {
            w.build(&BuildEdge::new(ALL_TARGET, "phony").inputs(self.defaults.iter().cloned()))?;
            w.default(&[ALL_TARGET])?;
        }

        Ok(w.finish())
    }

    /// Render and replace `path` atomically.
    ///
    /// Returns the number of bytes written.
    pub fn write_to(&self, path: &Path) -> Result<usize, GenerationError> {
        let text = self.render()?;
        write_atomic(path, text.as_bytes()).map_err(|source| GenerationError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(text.len())
    }
}

fn rule_decl(kind: RuleKind, profile: &ToolchainProfile) -> Result<RuleDecl, GenerationError> {
    let (command, options) = match kind {
        RuleKind::CompileC | RuleKind::CompileCxx => {
            let lang = if kind == RuleKind::CompileC {
                Language::C
            } else {
                Language::Cxx
            };
            let label = if lang == Language::C { "CC" } else { "CXX" };

            let mut options = RuleOptions::new()
                .description(format!("{} $out", label))
                .deps(profile.deps_style.deps());
            if let Some(depfile) = profile.deps_style.depfile() {
                options = options.depfile(depfile);
            }
            (profile.compile_command(lang)?, options)
        }
        RuleKind::Link => (
            profile.link_command()?,
            RuleOptions::new().description("LINK $out"),
        ),
        RuleKind::Archive => (
            profile.archive_command()?,
            RuleOptions::new().description("AR $out"),
        ),
        RuleKind::Unity => (
            profile.unity_command().to_string(),
            RuleOptions::new().description("UNITY $out"),
        ),
    };

    Ok(RuleDecl {
        name: kind.name(),
        command,
        options,
    })
}

fn step_edge(step: &BuildStep, profile: &ToolchainProfile) -> Result<BuildEdge, GenerationError> {
    let rule = step.rule().name();
    Ok(match step {
        BuildStep::Unity(unity) => {
            BuildEdge::new(path_str(&unity.output), rule).inputs(unity.members.iter().map(path_str))
        }
        BuildStep::Compile(compile) => {
            let incs: Vec<String> = compile
                .include_dirs
                .iter()
                .map(|d| profile.include_flag(d))
                .collect();
            let defines: Vec<String> = compile
                .defines
                .iter()
                .map(|d| profile.define_flag(d))
                .collect();

            BuildEdge::new(path_str(&compile.output), rule)
                .inputs([path_str(&compile.source)])
                .variable("flags", escape_join(&compile.flags)?)
                .variable("incs", escape_join(&incs)?)
                .variable("defines", escape_join(&defines)?)
        }
        BuildStep::Link(link) => BuildEdge::new(path_str(&link.output), rule)
            .inputs(link.objects.iter().map(path_str))
            .implicit(link.implicit_inputs.iter().map(path_str))
            .variable("libs", escape_join(&link.libs)?)
            .variable("ldflags", escape_join(&link.flags)?),
        BuildStep::Archive(archive) => BuildEdge::new(path_str(&archive.output), rule)
            .inputs(archive.objects.iter().map(path_str)),
    })
}

/// Escape each value and join with single spaces, dropping empty values.
fn escape_join<S: AsRef<str>>(values: &[S]) -> Result<String, GenerationError> {
    let escaped = values
        .iter()
        .map(AsRef::as_ref)
        .filter(|v| !v.is_empty())
        .map(escape)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(escaped.join(" "))
}

fn path_str<P: AsRef<Path>>(path: P) -> String {
    path.as_ref().to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::context::GenerateOptions;
    use crate::builder::vars::Bindings;
    use crate::core::target::{Target, TargetKind};

    fn render_with(
        targets: &[Target],
        profile: &ToolchainProfile,
        options: &GenerateOptions,
    ) -> Result<String, GenerationError> {
        let bindings = Bindings::new().with("BUILD_DIR", "build");
        let ctx = BuildContext::new(profile, &bindings, options);
        let plan = BuildPlan::new(targets, &ctx)?;
        GraphDocument::from_plan(&plan, &ctx)?.render()
    }

    fn render(targets: &[Target]) -> String {
        render_with(targets, &ToolchainProfile::gcc(), &GenerateOptions::default()).unwrap()
    }

    fn demo() -> Target {
        Target::new("demo", TargetKind::Exe, "{BUILD_DIR}/demo").with_sources(["main.cpp"])
    }

    #[test]
    fn test_full_document() {
        let text = render(&[demo()]);
        let expected = "\
# build.ninja generated by dockyard. Edit the BUILD.toml descriptors instead of this file.
ninja_required_version = 1.3
builddir = build

rule cxx
  command = g++ -MMD -MF $out.d $flags $incs $defines -c $in -o $out
  description = CXX $out
  depfile = $out.d
  deps = gcc

rule link
  command = g++ -o $out $in $libs $ldflags
  description = LINK $out

# exe target: demo
build build/main.cpp.o: cxx main.cpp
  flags = -g
  incs = -I.
build build/demo: link build/main.cpp.o

build all: phony build/demo
default all
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_rules_declared_in_fixed_order() {
        let lib = Target::new("z", TargetKind::StaticLib, "{BUILD_DIR}/libz.a")
            .with_sources(["z.c"])
            .with_unity(true);
        let text = render(&[demo(), lib]);

        let positions: Vec<usize> = ["rule cc\n", "rule cxx\n", "rule link\n", "rule ar\n", "rule unity\n"]
            .iter()
            .map(|r| text.find(r).unwrap())
            .collect();
        let mut sorted = positions.clone();
        sorted.sort();
        assert_eq!(positions, sorted);
    }

    #[test]
    fn test_unused_rules_omitted() {
        let text = render(&[demo()]);
        assert!(!text.contains("rule cc\n"));
        assert!(!text.contains("rule ar\n"));
        assert!(!text.contains("rule unity\n"));
    }

    #[test]
    fn test_link_deps_are_implicit() {
        let mut app = demo();
        app.libs = vec!["{BUILD_DIR}/libz.a".into()];
        app.link_deps = vec!["{BUILD_DIR}/libz.a".into()];
        let text = render(&[app]);

        assert!(text.contains("build build/demo: link build/main.cpp.o | build/libz.a\n"));
        assert!(text.contains("  libs = build/libz.a\n"));
    }

    #[test]
    fn test_variables_are_escaped() {
        let mut app = demo();
        app.defines = vec!["PRICE=$5".into()];
        let text = render(&[app]);
        assert!(text.contains("  defines = -DPRICE=$$5\n"));
    }

    #[test]
    fn test_paths_are_escaped() {
        let app = Target::new("demo", TargetKind::Exe, "{BUILD_DIR}/demo")
            .with_sources(["my src/main.c"]);
        let text = render(&[app]);
        assert!(text.contains("build build/my$ src/main.c.o: cc my$ src/main.c\n"));
    }

    #[test]
    fn test_unity_edges() {
        let app = demo().with_sources(["a.cpp", "b.cpp"]).with_unity(true);
        let text = render(&[app]);

        assert!(text.contains("build build/demo.unity/unity_cxx_0.cpp: unity a.cpp b.cpp\n"));
        assert!(text.contains(
            "build build/demo.unity/unity_cxx_0.cpp.o: cxx build/demo.unity/unity_cxx_0.cpp\n"
        ));
        assert!(!text.contains("build build/a.cpp.o"));
    }

    #[test]
    fn test_no_default_when_disabled() {
        let options = GenerateOptions {
            emit_default: false,
            ..Default::default()
        };
        let text = render_with(&[demo()], &ToolchainProfile::gcc(), &options).unwrap();
        assert!(!text.contains("phony"));
        assert!(!text.contains("default"));
    }

    #[test]
    fn test_msvc_rules() {
        let text = render_with(&[demo()], &ToolchainProfile::msvc(), &GenerateOptions::default())
            .unwrap();
        assert!(text.contains("  command = cl /nologo /showIncludes $flags $incs $defines /c $in /Fo$out\n"));
        assert!(text.contains("  deps = msvc\n"));
        assert!(!text.contains("depfile"));
        assert!(text.contains("build build/main.cpp.obj: cxx main.cpp\n"));
        assert!(text.contains("  incs = /I.\n"));
    }

    #[test]
    fn test_line_break_rejected() {
        let mut app = demo();
        app.cflags = vec!["-DX\n".into()];
        app.sources = vec!["main.c".into()];
        let err = render_with(&[app], &ToolchainProfile::gcc(), &GenerateOptions::default())
            .unwrap_err();
        assert!(matches!(err.root(), GenerationError::InvalidText { .. }));
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let targets = [demo()];
        assert_eq!(render(&targets), render(&targets));
    }

    #[test]
    fn test_long_edges_wrap() {
        let sources: Vec<String> = (0..40).map(|i| format!("src/module_{}.c", i)).collect();
        let app = Target::new("demo", TargetKind::Exe, "{BUILD_DIR}/demo").with_sources(sources);
        let options = GenerateOptions {
            line_width: 80,
            ..Default::default()
        };
        let text = render_with(&[app], &ToolchainProfile::gcc(), &options).unwrap();

        for line in text.lines() {
            // a single path can exceed the width; none here do
            assert!(line.len() <= 80, "line too long: {:?}", line);
        }
        assert!(text.contains(" $\n    build/src/module_"));
    }

    #[test]
    fn test_write_to() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("build.ninja");

        let bindings = Bindings::new().with("BUILD_DIR", "build");
        let profile = ToolchainProfile::gcc();
        let options = GenerateOptions::default();
        let ctx = BuildContext::new(&profile, &bindings, &options);
        let plan = BuildPlan::new(&[demo()], &ctx).unwrap();
        let doc = GraphDocument::from_plan(&plan, &ctx).unwrap();

        let written = doc.write_to(&path).unwrap();
        let on_disk = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, on_disk.len());
        assert_eq!(on_disk, doc.render().unwrap());
    }
}
