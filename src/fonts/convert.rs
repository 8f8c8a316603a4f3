use crate::{
    log,
    tools::{FontConverter, WebFontFormat},
    utils::fs::{copy_if_newer, extension, is_up_to_date, list_files},
};
use std::path::Path;

/// Convert every `.ttf`/`.otf` in `src_dir` to woff and woff2 inside
/// `out_dir`, and copy ready-made web fonts over. Outputs newer than their
/// source are left alone.
///
/// Returns the number of files that failed; each failure is logged.
pub fn convert_all(src_dir: &Path, out_dir: &Path, converter: &dyn FontConverter) -> usize {
    let mut failed = 0;

    for src in list_files(src_dir) {
        let Some(file_name) = src.file_name() else {
            continue;
        };

        match extension(&src).as_str() {
            "ttf" | "otf" => {
                for format in WebFontFormat::ALL {
                    let dest = out_dir.join(file_name).with_extension(format.extension());
                    if is_up_to_date(&src, &dest) {
                        continue;
                    }
                    match converter.convert(&src, format, &dest) {
                        Ok(()) => log!("fonts"; "{}", dest.display()),
                        Err(e) => {
                            log!("error"; "{}: {e}", src.display());
                            failed += 1;
                        }
                    }
                }
            }
            "woff" | "woff2" => {
                if let Err(e) = copy_if_newer(&src, &out_dir.join(file_name)) {
                    log!("error"; "{}: {e}", src.display());
                    failed += 1;
                }
            }
            _ => {}
        }
    }

    failed
}
