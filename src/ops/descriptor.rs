//! `BUILD.toml` descriptors.
//!
//! A descriptor is a data-only TOML file holding `[[target]]` tables.
//! Sources are written relative to the project root and may be globs.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::builder::vars::Bindings;
use crate::core::target::{Target, TargetKind, TargetSettings};
use crate::util::diagnostic::{suggestions, DescriptorParseError};
use crate::util::fs::{find_files_named, glob_files, is_glob, read_to_string};

/// File name of a descriptor.
pub const DESCRIPTOR_FILE: &str = "BUILD.toml";

/// A `[[target]]` table as written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetSpec {
    pub name: String,

    #[serde(default)]
    pub kind: TargetKind,

    pub output: String,

    /// Paths or glob patterns, relative to the project root
    #[serde(default)]
    pub sources: Vec<String>,

    #[serde(flatten)]
    pub settings: TargetSettings,
}

/// Contents of one `BUILD.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Descriptor {
    #[serde(default, rename = "target")]
    pub targets: Vec<TargetSpec>,
}

impl Descriptor {
    /// Parse descriptor text. Errors carry the source text and span.
    pub fn parse(path: &Path, contents: &str) -> Result<Self, DescriptorParseError> {
        toml::from_str(contents)
            .map_err(|e| DescriptorParseError::from_toml(path, contents.to_string(), &e))
    }
}

impl TargetSpec {
    /// Turn the table into a target: expand source globs under `root` and
    /// lay the table's settings over `defaults`.
    ///
    /// Placeholders in glob patterns are resolved against `bindings` first so
    /// the pattern names a real directory. Plain paths keep their
    /// placeholders; the generator expands those.
    pub fn into_target(
        self,
        root: &Path,
        defaults: &TargetSettings,
        bindings: &Bindings,
    ) -> Result<Target> {
        let patterns = self
            .sources
            .iter()
            .map(|source| {
                if is_glob(source) {
                    bindings.expand(source)
                } else {
                    Ok(source.clone())
                }
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| e.in_target(&self.name))?;

        let sources = glob_files(root, &patterns)?
            .into_iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect();
        let settings = TargetSettings::overlay(defaults, self.settings);

        Ok(Target::from_settings(
            self.name,
            self.kind,
            self.output,
            sources,
            settings,
        ))
    }
}

/// Load the targets declared in one descriptor.
pub fn load_descriptor(
    path: &Path,
    root: &Path,
    defaults: &TargetSettings,
    bindings: &Bindings,
) -> Result<Vec<Target>> {
    let contents = read_to_string(path)?;
    let descriptor = Descriptor::parse(path, &contents)?;

    let targets = descriptor
        .targets
        .into_iter()
        .map(|spec| spec.into_target(root, defaults, bindings))
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!("loaded {} targets from {}", targets.len(), path.display());
    Ok(targets)
}

/// Find and load every descriptor below `root`.
///
/// Descriptors are visited in path order; hidden directories and the build
/// root are skipped. Target names must be unique across the project.
/// `bindings` resolve placeholders in source globs.
pub fn discover_targets(
    root: &Path,
    build_root: &Path,
    defaults: &TargetSettings,
    bindings: &Bindings,
) -> Result<Vec<Target>> {
    let files = find_files_named(root, DESCRIPTOR_FILE, &[root.join(build_root)])?;
    if files.is_empty() {
        bail!(
            "no {} found under {}\n{}",
            DESCRIPTOR_FILE,
            root.display(),
            suggestions::NO_DESCRIPTORS
        );
    }

    let mut targets = Vec::new();
    let mut declared: HashMap<String, PathBuf> = HashMap::new();

    for file in &files {
        for target in load_descriptor(file, root, defaults, bindings)? {
            if let Some(first) = declared.get(&target.name) {
                bail!(
                    "target `{}` is declared in both {} and {}\n{}",
                    target.name,
                    first.display(),
                    file.display(),
                    suggestions::DUPLICATE_TARGET
                );
            }
            declared.insert(target.name.clone(), file.clone());
            targets.push(target);
        }
    }

    tracing::debug!(
        "discovered {} targets in {} descriptors",
        targets.len(),
        files.len()
    );
    Ok(targets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_parse_descriptor() {
        let text = r#"
[[target]]
name = "app"
kind = "exe"
output = "{build_dir}/app"
sources = ["app/main.cpp"]
cxxflags = ["-std=c++17"]
unity = true

[[target]]
name = "core"
kind = "staticlib"
output = "{build_dir}/libcore.a"
sources = ["core/a.c"]
"#;
        let descriptor = Descriptor::parse(Path::new("BUILD.toml"), text).unwrap();
        assert_eq!(descriptor.targets.len(), 2);

        let app = &descriptor.targets[0];
        assert_eq!(app.kind, TargetKind::Exe);
        assert_eq!(app.settings.cxxflags, Some(vec!["-std=c++17".to_string()]));
        assert_eq!(app.settings.unity, Some(true));
        assert_eq!(app.settings.cflags, None);

        assert_eq!(descriptor.targets[1].kind, TargetKind::StaticLib);
    }

    #[test]
    fn test_parse_error_has_span() {
        let err = Descriptor::parse(Path::new("BUILD.toml"), "[[target]]\nname = \"x\"\n")
            .unwrap_err();
        assert!(err.message.contains("output"));
    }

    #[test]
    fn test_defaults_overlay() {
        let spec = TargetSpec {
            name: "app".into(),
            kind: TargetKind::Exe,
            output: "{build_dir}/app".into(),
            sources: vec!["main.c".into()],
            settings: TargetSettings {
                cflags: Some(vec!["-O0".into()]),
                ..Default::default()
            },
        };
        let defaults = TargetSettings {
            cflags: Some(vec!["-Wall".into()]),
            defines: Some(vec!["DEFAULT".into()]),
            ..Default::default()
        };

        let target = spec
            .into_target(Path::new("."), &defaults, &Bindings::new())
            .unwrap();
        assert_eq!(target.cflags, vec!["-O0"]);
        assert_eq!(target.defines, vec!["DEFAULT"]);
        assert_eq!(target.sources, vec!["main.c"]);
    }

    #[test]
    fn test_discover_targets() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        write(root, "lib/a.c", "");
        write(root, "lib/b.c", "");
        write(
            root,
            "lib/BUILD.toml",
            "[[target]]\nname = \"lib\"\nkind = \"staticlib\"\noutput = \"{build_dir}/liblib.a\"\nsources = [\"lib/*.c\"]\n",
        );
        write(
            root,
            "app/BUILD.toml",
            "[[target]]\nname = \"app\"\noutput = \"{build_dir}/app\"\nsources = [\"app/main.c\"]\n",
        );
        // ignored: inside the build root and inside a hidden directory
        write(root, "build/BUILD.toml", "not toml");
        write(root, ".git/BUILD.toml", "not toml");

        let targets =
            discover_targets(root, Path::new("build"), &TargetSettings::default(), &Bindings::new()).unwrap();
        let names: Vec<&str> = targets.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["app", "lib"]);
        assert_eq!(targets[1].sources, vec!["lib/a.c", "lib/b.c"]);
    }

    #[test]
    fn test_discover_rejects_duplicate_names() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        let body = "[[target]]\nname = \"app\"\noutput = \"{build_dir}/app\"\nsources = [\"main.c\"]\n";
        write(root, "a/BUILD.toml", body);
        write(root, "b/BUILD.toml", body);

        let err = discover_targets(root, Path::new("build"), &TargetSettings::default(), &Bindings::new())
            .unwrap_err();
        assert!(err.to_string().contains("declared in both"));
    }

    #[test]
    fn test_discover_without_descriptors() {
        let tmp = TempDir::new().unwrap();
        let err = discover_targets(
            tmp.path(),
            Path::new("build"),
            &TargetSettings::default(),
            &Bindings::new(),
        )
            .unwrap_err();
        assert!(err.to_string().contains("no BUILD.toml found"));
    }

    #[test]
    fn test_placeholder_in_glob_source() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        write(root, "src/a.c", "");
        write(root, "src/b.c", "");
        write(
            root,
            "BUILD.toml",
            "[[target]]\nname = \"app\"\noutput = \"{build_dir}/app\"\nsources = [\"{SRC}/*.c\", \"{SRC}/gen.c\"]\n",
        );

        let bindings = Bindings::new().with("SRC", "src");
        let targets =
            discover_targets(root, Path::new("build"), &TargetSettings::default(), &bindings)
                .unwrap();
        // plain paths keep their placeholders for the generator
        assert_eq!(targets[0].sources, vec!["src/a.c", "src/b.c", "{SRC}/gen.c"]);
    }

    #[test]
    fn test_unbound_placeholder_in_glob_source() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        write(
            root,
            "BUILD.toml",
            "[[target]]\nname = \"app\"\noutput = \"{build_dir}/app\"\nsources = [\"{SRC}/*.c\"]\n",
        );

        let err = discover_targets(
            root,
            Path::new("build"),
            &TargetSettings::default(),
            &Bindings::new(),
        )
        .unwrap_err();
        let generation = err.downcast_ref::<crate::builder::GenerationError>().unwrap();
        assert!(matches!(
            generation.root(),
            crate::builder::GenerationError::UnresolvedVariable { token, .. } if token == "SRC"
        ));
    }
}
