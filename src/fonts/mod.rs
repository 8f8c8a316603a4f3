//! Web fonts and the generated `@font-face` sheet.
//!
//! ```text
//! src/fonts/*.{ttf,otf}   ──convert──►  <out>/fonts/*.{woff,woff2}
//! src/fonts/*.{woff,woff2} ──copy────►  <out>/fonts/
//! <out>/fonts/ listing    ──infer────►  src/scss/_fonts.scss
//! ```

mod convert;
pub mod face;
mod sheet;

use crate::{
    log,
    pipeline::BuildContext,
    utils::fs::{list_files, write_if_changed},
};
use anyhow::{Result, bail};

/// The Fonts task.
pub fn build(ctx: &BuildContext<'_>) -> Result<()> {
    let fonts_out = ctx.output().join("fonts");
    let failed = convert::convert_all(
        &ctx.config.build.fonts(),
        &fonts_out,
        ctx.tools.fonts.as_ref(),
    );

    let names: Vec<String> = list_files(&fonts_out)
        .iter()
        .filter_map(|p| p.file_name()?.to_str().map(str::to_owned))
        .collect();
    let faces = face::collect(&names);

    if write_if_changed(&ctx.config.build.fonts_sheet(), sheet::render(&faces)) {
        log!("fonts"; "{} font face(s) declared (updated)", faces.len());
    }

    if failed > 0 {
        bail!("{failed} font conversion(s) failed");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::SiteConfig, pipeline::Profile, reload::NoopReload, tools::Toolchain};
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_build_writes_sheet_from_output() {
        let dir = tempdir().unwrap();
        let mut config = SiteConfig::default();
        config.build.source = dir.path().join("src");
        config.build.output = dir.path().join("dist");
        fs::create_dir_all(config.build.fonts()).unwrap();
        fs::write(config.build.fonts().join("Roboto-SemiBoldItalic.woff2"), "w2").unwrap();

        let tools = Toolchain::from_config(&config);
        let ctx = BuildContext::new(&config, Profile::Development, &tools, &NoopReload);
        build(&ctx).unwrap();

        let sheet = fs::read_to_string(config.build.fonts_sheet()).unwrap();
        assert!(sheet.contains("font-family: \"Roboto\""));
        assert!(sheet.contains("font-weight: 600"));
        assert!(sheet.contains("font-style: italic"));
        assert!(dir.path().join("dist/fonts/Roboto-SemiBoldItalic.woff2").exists());
    }

    #[test]
    fn test_build_without_fonts_writes_empty_sheet() {
        let dir = tempdir().unwrap();
        let mut config = SiteConfig::default();
        config.build.source = dir.path().join("src");
        config.build.output = dir.path().join("dist");

        let tools = Toolchain::from_config(&config);
        let ctx = BuildContext::new(&config, Profile::Development, &tools, &NoopReload);
        build(&ctx).unwrap();

        assert_eq!(fs::read_to_string(config.build.fonts_sheet()).unwrap(), "");
    }
}
