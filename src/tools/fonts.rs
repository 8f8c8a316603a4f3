//! Web font conversion through fontTools' `pyftsubset`.

use super::{FontConverter, ToolError, WebFontFormat};
use crate::exec;
use std::path::Path;

/// `pyftsubset` with every glyph, codepoint and layout feature retained, so
/// the conversion only changes the container format.
pub struct Fonttools {
    command: Vec<String>,
}

impl Fonttools {
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }
}

impl FontConverter for Fonttools {
    fn convert(&self, src: &Path, format: WebFontFormat, dest: &Path) -> Result<(), ToolError> {
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }

        exec!(
            &self.command;
            src,
            format!("--output-file={}", dest.display()),
            format!("--flavor={}", format.extension()),
            "--glyphs=*",
            "--unicodes=*",
            "--layout-features=*",
            "--name-IDs=*",
            "--notdef-outline",
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_converter() {
        let dir = tempdir().unwrap();
        let fonts = Fonttools::new(vec!["assetsmith-no-such-pyftsubset".into()]);
        let err = fonts
            .convert(
                &dir.path().join("Inter-Bold.ttf"),
                WebFontFormat::Woff2,
                &dir.path().join("out/fonts/Inter-Bold.woff2"),
            )
            .unwrap_err();

        assert!(matches!(err, ToolError::Missing(_)));
        assert!(dir.path().join("out/fonts").is_dir());
    }
}
