//! assetsmith - asset pipeline for component-based static sites.

mod clean;
mod cli;
mod config;
mod fonts;
mod html;
mod images;
mod manifest;
mod pipeline;
mod reload;
mod rewrite;
mod serve;
mod tools;
mod utils;
mod watch;

use anyhow::{Context, Result, bail};
use clap::Parser;
use cli::{Cli, Commands};
use config::SiteConfig;
use pipeline::{BuildContext, Profile, RunReport, TaskGraph, Tasks};
use reload::{LiveReload, NoopReload, Reload};
use serve::serve_site;
use std::{fs, net::IpAddr};
use tools::Toolchain;

fn main() -> Result<()> {
    let cli: &'static Cli = Box::leak(Box::new(Cli::parse()));
    let config: &'static SiteConfig = Box::leak(Box::new(SiteConfig::load(cli)?));
    let tools: &'static Toolchain = Box::leak(Box::new(Toolchain::from_config(config)));

    match cli.command() {
        Commands::Clean => clean::remove_outputs(config),
        Commands::Build => {
            let release = &config.build.release;
            fs::create_dir_all(release)
                .with_context(|| format!("Failed to provision {}", release.display()))?;

            let report = build_all(config, Profile::Production, tools, &NoopReload)?;
            if !report.is_success() {
                bail!("{} task(s) failed", report.failed.len());
            }
            Ok(())
        }
        Commands::Dev => {
            let interface: IpAddr = config
                .serve
                .interface
                .parse()
                .with_context(|| format!("Invalid interface `{}`", config.serve.interface))?;
            let reload: &'static LiveReload = Box::leak(Box::new(LiveReload::start(
                interface,
                config.serve.reload_port,
            )?));

            build_all(config, Profile::Development, tools, reload)?;
            serve_site(config, tools, reload)
        }
    }
}

/// Run the full task graph of `profile` once.
fn build_all(
    config: &SiteConfig,
    profile: Profile,
    tools: &Toolchain,
    reload: &dyn Reload,
) -> Result<RunReport> {
    let ctx = BuildContext::new(config, profile, tools, reload);
    let graph = TaskGraph::for_profile(profile);
    let report = pipeline::run(&graph, &ctx, &Tasks)?;

    log!("build"; "{profile}: {} done, {} failed", report.completed.len(), report.failed.len());
    Ok(report)
}
