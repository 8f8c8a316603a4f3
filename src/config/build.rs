//! `[build]` section configuration.
//!
//! Only the three roots are configurable. Everything inside the source tree
//! follows a fixed layout, exposed through the accessor methods below.
//!
//! ```text
//! src/
//! ├── *.html                  pages (partials pulled in via @@include)
//! ├── components/**/          partials, _*.scss, images/
//! ├── scss/main.scss          stylesheet entry
//! ├── scss/_components-auto.scss   (generated)
//! ├── scss/_fonts.scss             (generated)
//! ├── scripts/main.js         script entry
//! ├── fonts/*.{ttf,otf}       font sources
//! └── public/{images,favicons}/
//! ```

use super::defaults;
use crate::pipeline::Profile;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Generated import manifest for component partials.
pub const COMPONENTS_MANIFEST: &str = "_components-auto.scss";

/// Generated `@font-face` sheet.
pub const FONTS_SHEET: &str = "_fonts.scss";

/// `[build]` section in assetsmith.toml.
///
/// # Example
/// ```toml
/// [build]
/// source = "src"
/// output = "dist"     # `assetsmith dev`
/// release = "build"   # `assetsmith build`
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Source tree root.
    #[serde(default = "defaults::build::source")]
    #[educe(Default = defaults::build::source())]
    pub source: PathBuf,

    /// Output root of development builds.
    #[serde(default = "defaults::build::output")]
    #[educe(Default = defaults::build::output())]
    pub output: PathBuf,

    /// Output root of production builds.
    #[serde(default = "defaults::build::release")]
    #[educe(Default = defaults::build::release())]
    pub release: PathBuf,
}

impl BuildConfig {
    /// Output root used by a build profile.
    pub fn output_for(&self, profile: Profile) -> &Path {
        match profile {
            Profile::Development => &self.output,
            Profile::Production => &self.release,
        }
    }

    pub fn components(&self) -> PathBuf {
        self.source.join("components")
    }

    pub fn scss(&self) -> PathBuf {
        self.source.join("scss")
    }

    pub fn scss_entry(&self) -> PathBuf {
        self.scss().join("main.scss")
    }

    pub fn components_manifest(&self) -> PathBuf {
        self.scss().join(COMPONENTS_MANIFEST)
    }

    pub fn fonts_sheet(&self) -> PathBuf {
        self.scss().join(FONTS_SHEET)
    }

    pub fn scripts(&self) -> PathBuf {
        self.source.join("scripts")
    }

    pub fn script_entry(&self) -> PathBuf {
        self.scripts().join("main.js")
    }

    pub fn fonts(&self) -> PathBuf {
        self.source.join("fonts")
    }

    pub fn public_images(&self) -> PathBuf {
        self.source.join("public").join("images")
    }

    pub fn public_favicons(&self) -> PathBuf {
        self.source.join("public").join("favicons")
    }

    /// Whether `path` is one of the generated stylesheets.
    pub fn is_generated(&self, path: &Path) -> bool {
        path == self.components_manifest() || path == self.fonts_sheet()
    }
}
