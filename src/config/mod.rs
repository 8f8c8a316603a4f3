//! Project configuration from the optional `assetsmith.toml`.
//!
//! # Sections
//!
//! | Section     | Purpose                                        |
//! |-------------|------------------------------------------------|
//! | `[build]`   | Source tree and the two output roots           |
//! | `[serve]`   | Development server (port, reload port, watch)  |
//! | `[tools]`   | Commands of external collaborators             |
//!
//! Every field has a default, so a project without a config file builds
//! from `src/` into `dist/` (dev) or `build/` (production).
//!
//! # Example
//!
//! ```toml
//! [build]
//! source = "src"
//! output = "dist"
//! release = "build"
//!
//! [serve]
//! port = 3000
//!
//! [tools]
//! esbuild = ["npx", "esbuild"]
//! ```

mod build;
pub mod defaults;
mod error;
mod serve;
mod tools;

pub use build::BuildConfig;
use error::ConfigError;
use serve::ServeConfig;
use tools::ToolsConfig;

use crate::cli::Cli;
use anyhow::{Result, bail};
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Root configuration structure representing assetsmith.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Absolute path to the config file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Absolute project root (set after loading)
    #[serde(skip)]
    #[educe(Default = PathBuf::from("./"))]
    pub root: PathBuf,

    /// Build paths
    #[serde(default)]
    pub build: BuildConfig,

    /// Development server settings
    #[serde(default)]
    pub serve: ServeConfig,

    /// External tool commands
    #[serde(default)]
    pub tools: ToolsConfig,
}

impl SiteConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: SiteConfig = toml::from_str(content).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Load the config named by the CLI, falling back to defaults when the
    /// file does not exist, and anchor every path at the project root.
    pub fn load(cli: &Cli) -> Result<Self> {
        let root = cli.root.as_deref().unwrap_or(Path::new("./"));
        let config_path = root.join(&cli.config);

        let mut config = if config_path.exists() {
            Self::from_path(&config_path)?
        } else {
            Self::default()
        };

        config.update_path_with_root(root, &cli.config);
        config.validate()?;
        Ok(config)
    }

    pub fn get_root(&self) -> &Path {
        &self.root
    }

    /// Update all paths relative to root directory and normalize to absolute paths
    fn update_path_with_root(&mut self, root: &Path, config_name: &Path) {
        let root = normalize_path(root);

        self.config_path = normalize_path(&root.join(config_name));
        self.build.source = normalize_path(&root.join(&self.build.source));
        self.build.output = normalize_path(&root.join(&self.build.output));
        self.build.release = normalize_path(&root.join(&self.build.release));
        self.root = root;
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        for (field, command) in [
            ("[tools.esbuild]", &self.tools.esbuild),
            ("[tools.fonts]", &self.tools.fonts),
        ] {
            if command.first().is_none_or(|c| c.trim().is_empty()) {
                bail!(ConfigError::Validation(format!(
                    "{field} must have at least one element"
                )));
            }
        }

        if self.build.output == self.build.release {
            bail!(ConfigError::Validation(
                "[build.output] and [build.release] must differ".into()
            ));
        }

        if self.build.output == self.build.source || self.build.release == self.build.source {
            bail!(ConfigError::Validation(
                "output roots must not be the source directory".into()
            ));
        }

        Ok(())
    }
}

/// Normalize a path to absolute, using canonicalize if the path exists
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(path))
                .unwrap_or_else(|_| path.to_path_buf())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::tempdir;

    #[test]
    fn test_from_str() {
        let config = SiteConfig::from_str(
            r#"
            [build]
            source = "site"
            release = "public"
        "#,
        )
        .unwrap();

        assert_eq!(config.build.source, PathBuf::from("site"));
        assert_eq!(config.build.output, PathBuf::from("dist"));
        assert_eq!(config.build.release, PathBuf::from("public"));
    }

    #[test]
    fn test_from_str_invalid_toml() {
        assert!(SiteConfig::from_str("[build\nsource = 1").is_err());
    }

    #[test]
    fn test_unknown_top_level_field_rejection() {
        assert!(SiteConfig::from_str("[deploy]\nprovider = \"github\"\n").is_err());
    }

    #[test]
    fn test_default_root() {
        let config = SiteConfig::default();
        assert_eq!(config.get_root(), Path::new("./"));
        assert_eq!(config.serve.port, 3000);
    }

    #[test]
    fn test_validate_rejects_empty_command() {
        let mut config = SiteConfig::default();
        config.tools.esbuild.clear();
        assert!(config.validate().is_err());

        let mut config = SiteConfig::default();
        config.tools.fonts = vec!["  ".into()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_shared_output() {
        let mut config = SiteConfig::default();
        config.build.release = config.build.output.clone();
        assert!(config.validate().is_err());

        let mut config = SiteConfig::default();
        config.build.output = config.build.source.clone();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_without_config_file() {
        let dir = tempdir().unwrap();
        let root = dir.path().to_str().unwrap();
        let cli = Cli::parse_from(["assetsmith", "--root", root, "build"]);

        let config = SiteConfig::load(&cli).unwrap();
        let root = dir.path().canonicalize().unwrap();

        assert_eq!(config.get_root(), root);
        assert_eq!(config.build.source, root.join("src"));
        assert_eq!(config.build.release, root.join("build"));
    }

    #[test]
    fn test_load_with_config_file() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("assetsmith.toml"),
            "[build]\noutput = \"preview\"\n[serve]\nport = 4100\n",
        )
        .unwrap();
        let root = dir.path().to_str().unwrap();
        let cli = Cli::parse_from(["assetsmith", "--root", root]);

        let config = SiteConfig::load(&cli).unwrap();
        assert_eq!(config.build.output, dir.path().canonicalize().unwrap().join("preview"));
        assert_eq!(config.serve.port, 4100);
    }
}
