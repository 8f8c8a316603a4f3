//! `[tools]` section configuration.
//!
//! Commands for collaborators that run as external processes. Each entry is
//! the program followed by fixed leading arguments, e.g.
//! `["npx", "esbuild"]`.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct ToolsConfig {
    /// Script bundler.
    #[serde(default = "defaults::tools::esbuild")]
    #[educe(Default = defaults::tools::esbuild())]
    pub esbuild: Vec<String>,

    /// Font subsetter used to emit `.woff`/`.woff2` flavors.
    #[serde(default = "defaults::tools::fonts")]
    #[educe(Default = defaults::tools::fonts())]
    pub fonts: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::super::SiteConfig;

    #[test]
    fn test_tools_defaults() {
        let config: SiteConfig = toml::from_str("").unwrap();
        assert_eq!(config.tools.esbuild, vec!["esbuild"]);
        assert_eq!(config.tools.fonts, vec!["pyftsubset"]);
    }

    #[test]
    fn test_tools_override() {
        let config: SiteConfig =
            toml::from_str("[tools]\nesbuild = [\"npx\", \"esbuild\"]\n").unwrap();
        assert_eq!(config.tools.esbuild, vec!["npx", "esbuild"]);
        assert_eq!(config.tools.fonts, vec!["pyftsubset"]);
    }
}
