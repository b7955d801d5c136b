//! Implementation of `dockyard clean`.

use std::path::{Component, Path, PathBuf};

use anyhow::{bail, Result};

use crate::util::fs::{remove_dir_all_if_exists, remove_file_if_exists};

/// Paths removed by a clean.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanSummary {
    pub removed: Vec<PathBuf>,
}

/// Remove the build root and the generated file.
///
/// Refuses to remove the project root itself or anything outside it.
pub fn clean(root: &Path, build_root: &Path, output: &Path) -> Result<CleanSummary> {
    let build_dir = root.join(build_root);
    let escapes = build_root
        .components()
        .any(|c| matches!(c, Component::ParentDir));
    if escapes || !build_dir.starts_with(root) || normalized_eq(&build_dir, root) {
        bail!(
            "refusing to remove build root `{}`: it must be a directory inside the project",
            build_root.display()
        );
    }

    let mut summary = CleanSummary::default();
    if remove_dir_all_if_exists(&build_dir)? {
        summary.removed.push(build_dir);
    }
    if remove_file_if_exists(output)? {
        summary.removed.push(output.to_path_buf());
    }

    tracing::debug!("removed {} paths", summary.removed.len());
    Ok(summary)
}

fn normalized_eq(a: &Path, b: &Path) -> bool {
    let strip = |p: &Path| -> PathBuf {
        p.components()
            .filter(|c| !matches!(c, Component::CurDir))
            .collect()
    };
    strip(a) == strip(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_clean_removes_outputs() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        std::fs::create_dir_all(root.join("build/obj")).unwrap();
        std::fs::write(root.join("build/obj/a.o"), "").unwrap();
        std::fs::write(root.join("build.ninja"), "").unwrap();
        std::fs::write(root.join("main.c"), "").unwrap();

        let summary = clean(root, Path::new("build"), &root.join("build.ninja")).unwrap();
        assert_eq!(summary.removed.len(), 2);
        assert!(!root.join("build").exists());
        assert!(!root.join("build.ninja").exists());
        assert!(root.join("main.c").exists());

        // second run is a no-op
        let summary = clean(root, Path::new("build"), &root.join("build.ninja")).unwrap();
        assert!(summary.removed.is_empty());
    }

    #[test]
    fn test_clean_refuses_project_root() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        std::fs::write(root.join("main.c"), "").unwrap();

        assert!(clean(root, Path::new("."), &root.join("build.ninja")).is_err());
        assert!(clean(root, Path::new("build/.."), &root.join("build.ninja")).is_err());
        assert!(root.join("main.c").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_clean_refuses_outside_root() {
        let tmp = TempDir::new().unwrap();
        let project = tmp.path().join("project");
        std::fs::create_dir_all(&project).unwrap();
        assert!(clean(&project, Path::new("/tmp"), &project.join("build.ninja")).is_err());
    }
}
