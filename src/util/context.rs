//! Global context for dockyard operations.
//!
//! Provides centralized access to the project root and configuration paths.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::util::config::{global_config_dir, load_config, project_config_path, Config};

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Project root; descriptors and sources are relative to it
    cwd: PathBuf,

    /// Home directory for global dockyard data (~/.dockyard/), if known
    home: Option<PathBuf>,
}

impl GlobalContext {
    /// Create a new GlobalContext rooted at the current directory.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;

        Ok(GlobalContext {
            cwd,
            home: global_config_dir(),
        })
    }

    /// Create a GlobalContext with a specific project root.
    pub fn with_cwd(cwd: PathBuf) -> Result<Self> {
        let mut ctx = Self::new()?;
        ctx.cwd = cwd;
        Ok(ctx)
    }

    /// Replace the global data directory. `None` disables the global config.
    pub fn with_home(mut self, home: Option<PathBuf>) -> Self {
        self.home = home;
        self
    }

    /// Get the project root.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Get the dockyard home directory (~/.dockyard/).
    pub fn home(&self) -> Option<&Path> {
        self.home.as_deref()
    }

    /// Get the global configuration file path.
    pub fn config_path(&self) -> Option<PathBuf> {
        self.home.as_ref().map(|h| h.join("config.toml"))
    }

    /// Get the project configuration file path.
    pub fn project_config_path(&self) -> PathBuf {
        project_config_path(&self.cwd)
    }

    /// Load the merged global and project configuration.
    pub fn load_config(&self) -> Result<Config> {
        load_config(self.config_path().as_deref(), &self.project_config_path())
    }

    /// Resolve a path given relative to the project root.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_context_paths() {
        let ctx = GlobalContext::new().unwrap();
        assert!(ctx.cwd().is_absolute());
        if let Some(home) = ctx.home() {
            assert!(home.ends_with(".dockyard"));
        }
    }

    #[test]
    fn test_project_paths() {
        let tmp = TempDir::new().unwrap();
        let ctx = GlobalContext::with_cwd(tmp.path().to_path_buf())
            .unwrap()
            .with_home(None);

        assert_eq!(
            ctx.project_config_path(),
            tmp.path().join(".dockyard").join("config.toml")
        );
        assert!(ctx.config_path().is_none());
        assert_eq!(ctx.resolve(Path::new("build")), tmp.path().join("build"));
    }

    #[test]
    fn test_load_project_config() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join(".dockyard")).unwrap();
        std::fs::write(
            tmp.path().join(".dockyard/config.toml"),
            "[build]\nbuild_dir = \"out\"\n",
        )
        .unwrap();

        let ctx = GlobalContext::with_cwd(tmp.path().to_path_buf())
            .unwrap()
            .with_home(None);
        let config = ctx.load_config().unwrap();
        assert_eq!(config.build.build_dir, Some(PathBuf::from("out")));
    }
}
