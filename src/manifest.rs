//! Component stylesheet manifest.
//!
//! Every `_*.scss` partial under `src/components` gets one `@use` line in
//! `src/scss/_components-auto.scss`, so adding a component never requires
//! touching `main.scss`.

use crate::{
    log,
    pipeline::BuildContext,
    utils::fs::{collect_files, relative_path, to_slash, write_if_changed},
};
use anyhow::Result;
use std::path::Path;

/// Manifest text for the partials under `components`, with module paths
/// relative to `scss_root`.
///
/// Files are visited in file-name order; unreadable directories are skipped.
pub fn aggregate(components: &Path, scss_root: &Path) -> String {
    collect_files(components)
        .into_iter()
        .filter(|path| is_partial(path))
        .map(|path| {
            let module = relative_path(&path.with_extension(""), scss_root);
            format!("@use \"{}\";\n", to_slash(&module))
        })
        .collect()
}

/// Regenerate the manifest. Returns whether the file changed.
pub fn generate(ctx: &BuildContext<'_>) -> Result<bool> {
    let build = &ctx.config.build;
    let manifest = aggregate(&build.components(), &build.scss());
    let changed = write_if_changed(&build.components_manifest(), manifest);

    if changed {
        log!("manifest"; "components imported (updated)");
    }
    Ok(changed)
}

fn is_partial(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('_') && n.ends_with(".scss"))
}
