//! SCSS compilation with grass, finished by lightningcss.
//!
//! ```text
//! main.scss ──grass──► expanded CSS ──lightningcss──► prefixed CSS (+ map)
//! ```
//!
//! grass resolves the Sass; lightningcss adds vendor prefixes for
//! [`browser_targets`], minifies in production and emits the source map.

use super::{CompiledStyle, StyleCompiler, StyleOptions, ToolError};
use lightningcss::{
    stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet},
    targets::{Browsers, Targets},
};
use parcel_sourcemap::SourceMap;
use std::path::Path;

/// Name of the intermediate stylesheet inside the source map.
const COMPILED_NAME: &str = "main.css";

/// In-process Sass compiler.
pub struct GrassCompiler;

impl StyleCompiler for GrassCompiler {
    fn compile(&self, entry: &Path, options: StyleOptions) -> Result<CompiledStyle, ToolError> {
        let mut grass_options = grass::Options::default()
            .style(grass::OutputStyle::Expanded)
            .quiet(true);
        if let Some(dir) = entry.parent() {
            grass_options = grass_options.load_path(dir);
        }

        let css = grass::from_path(entry, &grass_options).map_err(|e| ToolError::Compile {
            tool: "grass",
            message: e.to_string(),
        })?;

        finish(&css, options)
    }
}

/// Browsers the generated CSS is prefixed for. Versions are encoded as
/// `major << 16`.
fn browser_targets() -> Targets {
    Targets::from(Browsers {
        chrome: Some(100 << 16),
        edge: Some(100 << 16),
        firefox: Some(100 << 16),
        safari: Some(14 << 16),
        ios_saf: Some(14 << 16),
        ..Browsers::default()
    })
}

fn lightning_error(message: impl ToString) -> ToolError {
    ToolError::Compile {
        tool: "lightningcss",
        message: message.to_string(),
    }
}

/// Prefix, optionally minify, and print `css`, with a source map when
/// `options.source_map` is set.
fn finish(css: &str, options: StyleOptions) -> Result<CompiledStyle, ToolError> {
    let mut sheet = StyleSheet::parse(
        css,
        ParserOptions {
            filename: COMPILED_NAME.to_string(),
            ..ParserOptions::default()
        },
    )
    .map_err(lightning_error)?;

    if options.compressed {
        sheet
            .minify(MinifyOptions {
                targets: browser_targets(),
                ..MinifyOptions::default()
            })
            .map_err(lightning_error)?;
    }

    let mut source_map = if options.source_map {
        let mut map = SourceMap::new("/");
        map.add_source(COMPILED_NAME);
        map.set_source_content(0, css)
            .map_err(|e| lightning_error(format!("{e:?}")))?;
        Some(map)
    } else {
        None
    };

    let printed = sheet
        .to_css(PrinterOptions {
            minify: options.compressed,
            source_map: source_map.as_mut(),
            targets: browser_targets(),
            ..PrinterOptions::default()
        })
        .map_err(lightning_error)?;

    let source_map = match source_map.as_mut() {
        Some(map) => Some(
            map.to_json(None)
                .map_err(|e| lightning_error(format!("{e:?}")))?,
        ),
        None => None,
    };

    Ok(CompiledStyle {
        css: printed.code,
        source_map,
    })
}
