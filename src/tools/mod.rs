//! External collaborators behind narrow traits.
//!
//! Each build task talks to one of these seams instead of a concrete tool,
//! so the orchestrator can be exercised with stubs.
//!
//! | Trait              | Default            | Runs as            |
//! |--------------------|--------------------|--------------------|
//! | [`StyleCompiler`]  | [`GrassCompiler`]  | in-process (grass, lightningcss) |
//! | [`ScriptBundler`]  | [`Esbuild`]        | external process   |
//! | [`ImageOptimizer`] | [`NativeOptimizer`]| in-process (image, usvg) |
//! | [`FontConverter`]  | [`Fonttools`]      | external process   |

mod fonts;
mod images;
mod scripts;
mod styles;

pub use fonts::Fonttools;
pub use images::NativeOptimizer;
pub use scripts::Esbuild;
pub use styles::GrassCompiler;

use crate::config::SiteConfig;
use std::{io, path::Path, process::ExitStatus};
use thiserror::Error;

/// Failure of a collaborator.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("command is empty")]
    EmptyCommand,

    #[error("`{0}` not found in PATH")]
    Missing(String),

    #[error("failed to spawn `{name}`")]
    Spawn {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("`{name}` exited with {status}\n{stderr}")]
    Failed {
        name: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("{tool}: {message}")]
    Compile { tool: &'static str, message: String },

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),
}

/// Stylesheet compilation output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledStyle {
    pub css: String,
    /// External source map, when the compiler produced one.
    pub source_map: Option<String>,
}

/// Options for a single stylesheet compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleOptions {
    pub compressed: bool,
    pub source_map: bool,
}

/// Options for a single script bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BundleOptions {
    pub minify: bool,
    /// Inline source map into the bundle.
    pub source_map: bool,
}

/// Web font flavors emitted for every source font.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebFontFormat {
    Woff,
    Woff2,
}

impl WebFontFormat {
    pub const ALL: [Self; 2] = [Self::Woff, Self::Woff2];

    pub fn extension(self) -> &'static str {
        match self {
            Self::Woff => "woff",
            Self::Woff2 => "woff2",
        }
    }
}

/// SCSS entry point to CSS.
pub trait StyleCompiler: Send + Sync {
    fn compile(&self, entry: &Path, options: StyleOptions) -> Result<CompiledStyle, ToolError>;
}

/// Script entry point to a single bundle.
pub trait ScriptBundler: Send + Sync {
    fn bundle(&self, entry: &Path, options: BundleOptions) -> Result<String, ToolError>;
}

/// Lossless-ish image recompression and WebP sibling generation.
pub trait ImageOptimizer: Send + Sync {
    /// Optimized bytes of `src`, or its original bytes when no smaller
    /// encoding was found.
    fn optimize(&self, src: &Path) -> Result<Vec<u8>, ToolError>;

    /// WebP encoding of a raster image.
    fn to_webp(&self, src: &Path) -> Result<Vec<u8>, ToolError>;
}

/// TrueType/OpenType to web font conversion.
pub trait FontConverter: Send + Sync {
    fn convert(&self, src: &Path, format: WebFontFormat, dest: &Path) -> Result<(), ToolError>;
}

/// The set of collaborators a build runs with.
pub struct Toolchain {
    pub styles: Box<dyn StyleCompiler>,
    pub scripts: Box<dyn ScriptBundler>,
    pub images: Box<dyn ImageOptimizer>,
    pub fonts: Box<dyn FontConverter>,
}

impl Toolchain {
    /// Default collaborators, with external commands taken from `[tools]`.
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            styles: Box::new(GrassCompiler),
            scripts: Box::new(Esbuild::new(config.tools.esbuild.clone())),
            images: Box::new(NativeOptimizer),
            fonts: Box::new(Fonttools::new(config.tools.fonts.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_format_extension() {
        assert_eq!(WebFontFormat::Woff.extension(), "woff");
        assert_eq!(WebFontFormat::Woff2.extension(), "woff2");
        assert_eq!(WebFontFormat::ALL.len(), 2);
    }

    #[test]
    fn test_error_display() {
        let err = ToolError::Compile {
            tool: "grass",
            message: "expected \";\"".into(),
        };
        assert_eq!(err.to_string(), "grass: expected \";\"");
        assert_eq!(
            ToolError::Missing("esbuild".into()).to_string(),
            "`esbuild` not found in PATH"
        );
    }
}
