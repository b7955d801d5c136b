//! Project fixtures for tests that need a real directory tree.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Fixture for a complete project structure.
#[derive(Debug, Clone, Default)]
pub struct ProjectFixture {
    /// Descriptors (path relative to project root -> content).
    pub descriptors: BTreeMap<PathBuf, String>,
    /// Source files (path relative to project root -> content).
    pub sources: BTreeMap<PathBuf, String>,
    /// `.dockyard/config.toml` content, if any.
    pub config: Option<String>,
}

impl ProjectFixture {
    /// Create a new empty project fixture.
    pub fn new() -> Self {
        ProjectFixture::default()
    }

    /// A static library in `core/` and an executable in `app/` linking it.
    pub fn lib_and_app() -> Self {
        ProjectFixture::new()
            .with_descriptor("core/BUILD.toml", descriptors::STATIC_CORE)
            .with_descriptor("app/BUILD.toml", descriptors::APP_USING_CORE)
            .with_source("core/a.c", sources::function("core_a"))
            .with_source("core/b.c", sources::function("core_b"))
            .with_source("app/main.cpp", sources::MAIN)
    }

    pub fn with_descriptor(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.descriptors.insert(path.into(), content.into());
        self
    }

    pub fn with_source(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.sources.insert(path.into(), content.into());
        self
    }

    pub fn with_config(mut self, config: impl Into<String>) -> Self {
        self.config = Some(config.into());
        self
    }

    /// Write this fixture below `root`.
    pub fn write_to(&self, root: &Path) -> std::io::Result<()> {
        let files = self
            .descriptors
            .iter()
            .chain(self.sources.iter())
            .map(|(p, c)| (p.clone(), c));
        let config = self
            .config
            .iter()
            .map(|c| (PathBuf::from(".dockyard/config.toml"), c));

        for (rel_path, content) in files.chain(config) {
            let full_path = root.join(rel_path);
            if let Some(parent) = full_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&full_path, content)?;
        }
        Ok(())
    }
}

/// Common descriptor templates.
pub mod descriptors {
    pub const STATIC_CORE: &str = r#"[[target]]
name = "core"
kind = "staticlib"
output = "{build_dir}/lib/libcore.a"
sources = ["core/*.c"]
include_dirs = ["core"]
"#;

    pub const APP_USING_CORE: &str = r#"[[target]]
name = "app"
kind = "exe"
output = "{build_dir}/bin/app"
sources = ["app/main.cpp"]
cxxflags = ["-std=c++17"]
libs = ["{build_dir}/lib/libcore.a"]
link_deps = ["{build_dir}/lib/libcore.a"]
"#;
}

/// Common source file contents.
pub mod sources {
    pub const MAIN: &str = "int main() { return 0; }\n";

    pub fn function(name: &str) -> String {
        format!("int {}(void) {{ return 0; }}\n", name)
    }
}
