//! Image pipeline.
//!
//! ```text
//! src/public/favicons/**         ──copy──────►  <out>/images/public/favicons/
//! src/public/images/**           ──optimize──►  <out>/images/public/images/
//! src/components/**/images/**    ──optimize──►  <out>/images/<flattened>
//! *.{png,jpg,jpeg} (public, components) ──webp──► sibling .webp in src/
//! ```
//!
//! WebP siblings are generated first, so the optimize passes pick them up
//! and copy them to the output alongside the originals. Every step is gated
//! on the destination being older than its source.

use crate::{
    log,
    pipeline::BuildContext,
    tools::ImageOptimizer,
    utils::fs::{collect_files, copy_if_newer, extension, is_up_to_date},
};
use anyhow::{Context, Result, bail};
use rayon::prelude::*;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Extensions the optimize passes accept.
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "svg", "gif", "webp"];

/// Extensions that get a WebP sibling.
const WEBP_SOURCES: &[&str] = &["png", "jpg", "jpeg"];

/// Directory names dropped when flattening component images.
const FLATTENED_DIRS: &[&str] = &["common", "images"];

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Tally {
    updated: usize,
    failed: usize,
}

impl Tally {
    fn merge(self, other: Self) -> Self {
        Self {
            updated: self.updated + other.updated,
            failed: self.failed + other.failed,
        }
    }
}

/// The Images task.
pub fn build(ctx: &BuildContext<'_>) -> Result<()> {
    let build = &ctx.config.build;
    let out = ctx.output().join("images");
    let public_out = out.join("public").join("images");
    let favicons_out = out.join("public").join("favicons");

    for dir in [&out, &public_out, &favicons_out] {
        fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    let optimizer = ctx.tools.images.as_ref();
    let public = filter_ext(collect_files(&build.public_images()), IMAGE_EXTENSIONS);
    let components = component_images(&build.components());

    let (favicons, webp) = rayon::join(
        || copy_tree(&build.public_favicons(), &favicons_out),
        || {
            let sources: Vec<_> = public
                .iter()
                .chain(&components)
                .filter(|p| WEBP_SOURCES.contains(&extension(p).as_str()))
                .cloned()
                .collect();
            each(&sources, |src| webp_sibling(src, optimizer))
        },
    );

    // Re-list so freshly written siblings are included.
    let public = filter_ext(collect_files(&build.public_images()), IMAGE_EXTENSIONS);
    let components = component_images(&build.components());

    let (public, components) = rayon::join(
        || {
            each(&public, |src| {
                let rel = src.strip_prefix(build.public_images())?;
                optimize_into(src, &public_out.join(rel), optimizer)
            })
        },
        || {
            each(&components, |src| {
                let rel = src.strip_prefix(build.components())?;
                optimize_into(src, &out.join(flatten_component(rel)), optimizer)
            })
        },
    );

    let tally = favicons.merge(webp).merge(public).merge(components);
    if tally.updated > 0 {
        log!("images"; "{} file(s) updated", tally.updated);
    }
    if tally.failed > 0 {
        bail!("{} image(s) failed", tally.failed);
    }
    Ok(())
}

/// Drop `common` and `images` directory segments from a path relative to
/// the components root.
///
/// `header/common/images/logo.png` → `header/logo.png`
pub fn flatten_component(rel: &Path) -> PathBuf {
    let mut flat = PathBuf::new();
    if let Some(parent) = rel.parent() {
        for segment in parent.iter() {
            if !FLATTENED_DIRS.iter().any(|d| segment == *d) {
                flat.push(segment);
            }
        }
    }
    if let Some(name) = rel.file_name() {
        flat.push(name);
    }
    flat
}

/// Image files below an `images` directory somewhere under `components`.
fn component_images(components: &Path) -> Vec<PathBuf> {
    filter_ext(collect_files(components), IMAGE_EXTENSIONS)
        .into_iter()
        .filter(|path| {
            path.strip_prefix(components)
                .ok()
                .and_then(Path::parent)
                .is_some_and(|dir| dir.iter().any(|s| s == "images"))
        })
        .collect()
}

fn filter_ext(files: Vec<PathBuf>, allowed: &[&str]) -> Vec<PathBuf> {
    files
        .into_iter()
        .filter(|p| allowed.contains(&extension(p).as_str()))
        .collect()
}

/// Run `op` over `files` in parallel, logging failures.
fn each<F>(files: &[PathBuf], op: F) -> Tally
where
    F: Fn(&Path) -> Result<bool> + Sync,
{
    files
        .par_iter()
        .map(|path| match op(path) {
            Ok(updated) => Tally {
                updated: usize::from(updated),
                failed: 0,
            },
            Err(e) => {
                log!("error"; "{}: {e:#}", path.display());
                Tally {
                    updated: 0,
                    failed: 1,
                }
            }
        })
        .reduce(Tally::default, Tally::merge)
}

fn copy_tree(src_dir: &Path, dest_dir: &Path) -> Tally {
    let files = collect_files(src_dir);
    each(&files, |src| {
        let rel = src.strip_prefix(src_dir)?;
        Ok(copy_if_newer(src, &dest_dir.join(rel))?)
    })
}

fn optimize_into(src: &Path, dest: &Path, optimizer: &dyn ImageOptimizer) -> Result<bool> {
    if is_up_to_date(src, dest) {
        return Ok(false);
    }
    let bytes = optimizer.optimize(src)?;
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(dest, bytes)?;
    Ok(true)
}

fn webp_sibling(src: &Path, optimizer: &dyn ImageOptimizer) -> Result<bool> {
    let dest = src.with_extension("webp");
    if is_up_to_date(src, &dest) {
        return Ok(false);
    }
    fs::write(&dest, optimizer.to_webp(src)?)?;
    Ok(true)
}
