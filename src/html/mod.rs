//! Page assembly.
//!
//! Every top-level `src/*.html` becomes `<out>/<name>.html`:
//!
//! ```text
//! expand @@include ─► rewrite_refs ─┬─ development: as is
//!                                   └─ production:  main.js → main.min.js
//!                                                   append ?v=<token>
//!                                                   minify
//! ```

mod include;
mod minify;
mod version;

use crate::{
    log,
    pipeline::BuildContext,
    rewrite::rewrite_refs,
    utils::fs::{extension, list_files, write_if_changed},
};
use anyhow::{Result, bail};
use rayon::prelude::*;
use std::path::Path;

const DEV_SCRIPT: &str = "./js/main.js";
const PROD_SCRIPT: &str = "./js/main.min.js";

/// The Html task.
pub fn build(ctx: &BuildContext<'_>) -> Result<()> {
    let pages: Vec<_> = list_files(&ctx.config.build.source)
        .into_iter()
        .filter(|p| extension(p) == "html")
        .collect();
    let token = ctx.is_production().then(version::token);

    let failed = pages
        .par_iter()
        .filter(|page| {
            let Some(name) = page.file_name() else {
                return false;
            };
            match render(page, token.as_deref()) {
                Ok(html) => {
                    let dest = ctx.output().join(name);
                    if write_if_changed(&dest, html) {
                        log!("html"; "{}", name.to_string_lossy());
                    }
                    false
                }
                Err(e) => {
                    log!("error"; "{}: {e:#}", page.display());
                    true
                }
            }
        })
        .count();

    if failed > 0 {
        bail!("{failed} page(s) failed");
    }
    Ok(())
}

/// Assemble one page. `token` is set for production builds.
pub fn render(page: &Path, token: Option<&str>) -> Result<Vec<u8>> {
    let html = include::expand(page)?;
    let html = rewrite_refs(&html);

    let Some(token) = token else {
        return Ok(html.into_owned().into_bytes());
    };

    let html = html.replace(DEV_SCRIPT, PROD_SCRIPT);
    let html = version::append(&html, token);
    Ok(minify::minify(html.as_bytes()))
}
