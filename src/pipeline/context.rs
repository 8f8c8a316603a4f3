use super::Profile;
use crate::{config::SiteConfig, reload::Reload, tools::Toolchain};
use std::path::{Path, PathBuf};

/// Everything a task needs, built once per run.
pub struct BuildContext<'a> {
    pub config: &'a SiteConfig,
    pub profile: Profile,
    /// Output root of this run.
    pub output: PathBuf,
    pub tools: &'a Toolchain,
    pub reload: &'a dyn Reload,
}

impl<'a> BuildContext<'a> {
    pub fn new(
        config: &'a SiteConfig,
        profile: Profile,
        tools: &'a Toolchain,
        reload: &'a dyn Reload,
    ) -> Self {
        Self {
            config,
            profile,
            output: config.build.output_for(profile).to_path_buf(),
            tools,
            reload,
        }
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn is_production(&self) -> bool {
        self.profile.is_production()
    }
}
