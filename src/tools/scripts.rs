//! Script bundling through esbuild.

use super::{BundleOptions, ScriptBundler, ToolError};
use crate::{exec, utils::exec::FilterRule};
use std::path::Path;

/// esbuild summary lines that are noise on stderr.
const ESBUILD_FILTER: FilterRule = FilterRule::new(&["⚡ Done"]);

/// esbuild invoked as an external command; the bundle is read from stdout.
pub struct Esbuild {
    command: Vec<String>,
}

impl Esbuild {
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }
}

impl ScriptBundler for Esbuild {
    fn bundle(&self, entry: &Path, options: BundleOptions) -> Result<String, ToolError> {
        let output = exec!(
            filter=&ESBUILD_FILTER;
            &self.command;
            entry,
            "--bundle",
            "--platform=browser",
            "--log-level=warning",
            if options.minify { "--minify" } else { "" },
            if options.source_map { "--sourcemap=inline" } else { "" },
        )?;

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_bundler() {
        let bundler = Esbuild::new(vec!["assetsmith-no-such-esbuild".into()]);
        let err = bundler
            .bundle(
                Path::new("src/scripts/main.js"),
                BundleOptions {
                    minify: false,
                    source_map: true,
                },
            )
            .unwrap_err();
        assert!(matches!(err, ToolError::Missing(_)));
    }

    #[test]
    fn test_empty_command() {
        let bundler = Esbuild::new(Vec::new());
        let err = bundler
            .bundle(
                Path::new("main.js"),
                BundleOptions {
                    minify: true,
                    source_map: false,
                },
            )
            .unwrap_err();
        assert!(matches!(err, ToolError::EmptyCommand));
    }
}
