//! Output directory cleanup.

use crate::{config::SiteConfig, log};
use anyhow::{Context, Result};
use std::{fs, path::Path};

/// Remove everything inside `dir` but keep the directory itself, creating
/// it when missing.
pub fn empty_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let removed = if path.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        removed.with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// `assetsmith clean`: delete both output roots.
pub fn remove_outputs(config: &SiteConfig) -> Result<()> {
    for dir in [&config.build.output, &config.build.release] {
        if dir.exists() {
            fs::remove_dir_all(dir)
                .with_context(|| format!("Failed to remove {}", dir.display()))?;
            log!("clean"; "{}", dir.display());
        }
    }
    Ok(())
}
