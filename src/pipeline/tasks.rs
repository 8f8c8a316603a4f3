//! What each task does.

use super::{BuildContext, Task};
use crate::{
    clean, fonts, html, images, log, manifest,
    rewrite::rewrite_refs,
    tools::{BundleOptions, StyleOptions},
    utils::fs::write_if_changed,
};
use anyhow::{Context, Result};

/// Runs a single task. The runner only sees this seam.
pub trait Executor: Sync {
    fn execute(&self, task: Task, ctx: &BuildContext<'_>) -> Result<()>;
}

/// The real task implementations.
pub struct Tasks;

impl Executor for Tasks {
    fn execute(&self, task: Task, ctx: &BuildContext<'_>) -> Result<()> {
        match task {
            Task::Clean => clean::empty_dir(ctx.output()),
            Task::Manifest => manifest::generate(ctx).map(drop),
            Task::Fonts => fonts::build(ctx),
            Task::Html => html::build(ctx),
            Task::Styles => compile_styles(ctx),
            Task::Scripts => bundle_scripts(ctx),
            Task::Images => images::build(ctx),
        }
    }
}

/// `scss/main.scss` → `<out>/css/main.css`, with asset references rewritten.
fn compile_styles(ctx: &BuildContext<'_>) -> Result<()> {
    let entry = ctx.config.build.scss_entry();
    if !entry.is_file() {
        log!("styles"; "no {}, skipped", entry.display());
        return Ok(());
    }

    let options = StyleOptions {
        compressed: ctx.is_production(),
        source_map: !ctx.is_production(),
    };
    let compiled = ctx
        .tools
        .styles
        .compile(&entry, options)
        .with_context(|| format!("Failed to compile {}", entry.display()))?;

    let dest = ctx.output().join("css").join("main.css");
    let mut css = rewrite_refs(&compiled.css).into_owned();
    if let Some(map) = compiled.source_map {
        write_if_changed(&dest.with_extension("css.map"), map);
        css.push_str("\n/*# sourceMappingURL=main.css.map */\n");
    }
    if write_if_changed(&dest, css) {
        log!("styles"; "{}", dest.display());
    }
    Ok(())
}

/// `scripts/main.js` → `<out>/js/main.js` (development, inline source map)
/// or `<out>/js/main.min.js` (production, minified).
fn bundle_scripts(ctx: &BuildContext<'_>) -> Result<()> {
    let entry = ctx.config.build.script_entry();
    if !entry.is_file() {
        log!("scripts"; "no {}, skipped", entry.display());
        return Ok(());
    }

    let options = BundleOptions {
        minify: ctx.is_production(),
        source_map: !ctx.is_production(),
    };
    let bundle = ctx
        .tools
        .scripts
        .bundle(&entry, options)
        .with_context(|| format!("Failed to bundle {}", entry.display()))?;

    let name = if ctx.is_production() {
        "main.min.js"
    } else {
        "main.js"
    };
    let dest = ctx.output().join("js").join(name);
    if write_if_changed(&dest, bundle) {
        log!("scripts"; "{}", dest.display());
    }
    Ok(())
}
