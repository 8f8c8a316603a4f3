//! Task orchestration.
//!
//! # Architecture
//!
//! ```text
//! TaskGraph::for_profile()
//!     │
//!     ├── stages()  ──► [[Clean], [Manifest], [Fonts], [Html, Styles, Scripts, Images]]
//!     │
//!     └── runner::run()
//!             │
//!             ├── stage by stage, in order
//!             └── tasks of a stage in parallel (rayon), failures logged
//! ```
//!
//! Watch mode runs [`TaskGraph::subgraph`] of the same graph, so ordering
//! between the tasks that remain is preserved.

mod context;
mod graph;
mod runner;
mod tasks;

pub use context::BuildContext;
pub use graph::{GraphError, TaskGraph};
pub use runner::{RunReport, run};
pub use tasks::{Executor, Tasks};

use std::fmt;

/// Build flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Profile {
    /// Expanded CSS, inline source maps, unminified scripts, live reload.
    Development,
    /// Compressed and minified output with cache-busting tokens.
    Production,
}

impl Profile {
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Development => "development",
            Self::Production => "production",
        })
    }
}

/// A node of the build graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Task {
    /// Empty the output root.
    Clean,
    /// Regenerate the component stylesheet manifest.
    Manifest,
    /// Convert fonts and regenerate the `@font-face` sheet.
    Fonts,
    /// Assemble pages.
    Html,
    /// Compile the stylesheet entry.
    Styles,
    /// Bundle the script entry.
    Scripts,
    /// Optimize, convert and flatten images.
    Images,
}

impl Task {
    pub const ALL: [Self; 7] = [
        Self::Clean,
        Self::Manifest,
        Self::Fonts,
        Self::Html,
        Self::Styles,
        Self::Scripts,
        Self::Images,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Clean => "clean",
            Self::Manifest => "manifest",
            Self::Fonts => "fonts",
            Self::Html => "html",
            Self::Styles => "styles",
            Self::Scripts => "scripts",
            Self::Images => "images",
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_names_are_unique() {
        let mut names: Vec<_> = Task::ALL.iter().map(|t| t.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Task::ALL.len());
    }

    #[test]
    fn test_profile_display() {
        assert_eq!(Profile::Development.to_string(), "development");
        assert!(Profile::Production.is_production());
        assert!(!Profile::Development.is_production());
    }
}
