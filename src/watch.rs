//! File system watcher for development rebuilds.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                         Event Loop                             │
//! │                                                                │
//! │  ┌──────────┐    ┌───────────┐    ┌─────────────────────────┐  │
//! │  │ notify   │───▶│ Debouncer │───▶│ categorize → WatchTarget│  │
//! │  │ events   │    │ (300ms)   │    │ union of task sets      │  │
//! │  └──────────┘    └───────────┘    │ run subgraph, reload    │  │
//! │                                   └─────────────────────────┘  │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! | Changed                                   | Tasks             |
//! |-------------------------------------------|-------------------|
//! | `*.html`, `components/**/*.html`          | Html              |
//! | `scss/**/*.scss`, `components/**/*.scss`  | Manifest, Styles  |
//! | `scripts/**/*.js`                         | Scripts           |
//! | favicons, public and component images     | Images            |
//! | `fonts/*.{ttf,otf}`                       | Fonts             |

use crate::{
    config::{BuildConfig, SiteConfig},
    log,
    pipeline::{self, BuildContext, Profile, Task, TaskGraph, Tasks},
    reload::Reload,
    tools::Toolchain,
    utils::fs::extension,
};
use anyhow::{Context, Result};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use rustc_hash::FxHashSet;
use std::{
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

// =============================================================================
// Constants
// =============================================================================

const DEBOUNCE_MS: u64 = 300;
const REBUILD_COOLDOWN_MS: u64 = 800;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "svg", "gif", "webp"];

// =============================================================================
// Categorization
// =============================================================================

/// Kind of source a change touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WatchTarget {
    Html,
    Styles,
    Scripts,
    Images,
    Fonts,
}

impl WatchTarget {
    /// Minimal tasks that bring the output up to date.
    pub fn tasks(self) -> &'static [Task] {
        match self {
            Self::Html => &[Task::Html],
            Self::Styles => &[Task::Manifest, Task::Styles],
            Self::Scripts => &[Task::Scripts],
            Self::Images => &[Task::Images],
            Self::Fonts => &[Task::Fonts],
        }
    }
}

/// Check if path is a temp/backup file (editor artifacts).
fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
}

/// Map a changed path to what it affects. Generated stylesheets, editor
/// artifacts and anything outside the known layout map to `None`.
pub fn categorize(path: &Path, build: &BuildConfig) -> Option<WatchTarget> {
    if build.is_generated(path) || is_temp_file(path) {
        return None;
    }
    let rel = path.strip_prefix(&build.source).ok()?;
    let ext = extension(path);
    let top_level = rel.parent().is_some_and(|p| p.as_os_str().is_empty());
    let in_components = rel.starts_with("components");

    match ext.as_str() {
        "html" if top_level || in_components => Some(WatchTarget::Html),
        "scss" if rel.starts_with("scss") || in_components => Some(WatchTarget::Styles),
        "js" if rel.starts_with("scripts") => Some(WatchTarget::Scripts),
        "ttf" | "otf" if rel.parent() == Some(Path::new("fonts")) => Some(WatchTarget::Fonts),
        _ if rel.starts_with("public/favicons") => Some(WatchTarget::Images),
        ext if IMAGE_EXTENSIONS.contains(&ext) => {
            let component_image = in_components
                && rel.parent().is_some_and(|p| p.iter().any(|s| s == "images"));
            (rel.starts_with("public/images") || component_image).then_some(WatchTarget::Images)
        }
        _ => None,
    }
}

/// Union of the task sets of every categorized path.
pub fn tasks_for(paths: &[PathBuf], build: &BuildConfig) -> FxHashSet<Task> {
    paths
        .iter()
        .filter_map(|p| categorize(p, build))
        .flat_map(|target| target.tasks().iter().copied())
        .collect()
}

// =============================================================================
// Debounce State
// =============================================================================

/// Batches rapid file events with debouncing and rebuild cooldown.
struct Debouncer {
    pending: FxHashSet<PathBuf>,
    last_event: Option<Instant>,
    last_rebuild: Option<Instant>,
}

impl Debouncer {
    fn new() -> Self {
        Self {
            pending: FxHashSet::default(),
            last_event: None,
            last_rebuild: None,
        }
    }

    fn in_cooldown(&self) -> bool {
        self.last_rebuild
            .is_some_and(|t| t.elapsed() < Duration::from_millis(REBUILD_COOLDOWN_MS))
    }

    fn add(&mut self, event: Event) {
        for path in event.paths {
            if !is_temp_file(&path) {
                self.pending.insert(path);
            }
        }
        self.last_event = Some(Instant::now());
    }

    /// Events keep accumulating during cooldown; they are only held back.
    fn ready(&self) -> bool {
        !self.pending.is_empty()
            && !self.in_cooldown()
            && self
                .last_event
                .is_some_and(|t| t.elapsed() >= Duration::from_millis(DEBOUNCE_MS))
    }

    fn take(&mut self) -> Vec<PathBuf> {
        self.last_event = None;
        let mut paths: Vec<_> = self.pending.drain().collect();
        paths.sort();
        paths
    }

    fn mark_rebuild(&mut self) {
        self.last_rebuild = Some(Instant::now());
    }

    fn timeout(&self) -> Duration {
        if self.pending.is_empty() {
            Duration::from_secs(60)
        } else {
            Duration::from_millis(DEBOUNCE_MS)
        }
    }
}

// =============================================================================
// Event Handler
// =============================================================================

/// Rebuild what `paths` affect. Returns true if anything ran (for cooldown).
fn handle_changes(
    paths: &[PathBuf],
    config: &SiteConfig,
    tools: &Toolchain,
    reload: &dyn Reload,
) -> bool {
    let tasks = tasks_for(paths, &config.build);
    let graph = TaskGraph::for_profile(Profile::Development).subgraph(&tasks);
    if graph.is_empty() {
        return false;
    }

    let root = config.get_root();
    let changed: Vec<_> = paths
        .iter()
        .filter(|p| categorize(p, &config.build).is_some())
        .map(|p| p.strip_prefix(root).unwrap_or(p).display().to_string())
        .collect();
    log!("watch"; "{} changed, {} task(s) to run", changed.join(", "), graph.len());

    let ctx = BuildContext::new(config, Profile::Development, tools, reload);

    match pipeline::run(&graph, &ctx, &Tasks) {
        Ok(report) if !report.is_success() => {
            let failed: Vec<_> = report.failed.iter().map(|t| t.name()).collect();
            log!("watch"; "rebuild failed: {}", failed.join(", "));
        }
        Ok(_) => {}
        Err(e) => log!("watch"; "{e}"),
    }
    eprintln!(); // Blank line to separate rebuild sessions
    true
}

/// Creations, edits, renames and deletions. A deleted partial must still
/// drop its line from the component manifest.
const fn is_relevant(event: &Event) -> bool {
    matches!(
        event.kind,
        EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
    )
}

// =============================================================================
// Public API
// =============================================================================

/// Watch the source tree and rebuild on change. Blocks until the event
/// channel closes.
pub fn watch_for_changes_blocking(
    config: &SiteConfig,
    tools: &Toolchain,
    reload: &dyn Reload,
) -> Result<()> {
    let source = &config.build.source;

    let (tx, rx) = std::sync::mpsc::channel();
    let mut watcher = notify::recommended_watcher(tx).context("Failed to create file watcher")?;
    watcher
        .watch(source, RecursiveMode::Recursive)
        .with_context(|| format!("Failed to watch {}", source.display()))?;
    log!("watch"; "{}/", source.strip_prefix(config.get_root()).unwrap_or(source).display());

    let mut debouncer = Debouncer::new();

    loop {
        match rx.recv_timeout(debouncer.timeout()) {
            Ok(Ok(event)) if is_relevant(&event) => {
                debouncer.add(event);
            }
            Ok(Err(e)) => log!("watch"; "error: {e}"),
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) if debouncer.ready() => {
                if handle_changes(&debouncer.take(), config, tools, reload) {
                    debouncer.mark_rebuild();
                }
            }
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
            _ => {}
        }
    }

    Ok(())
}
