//! Terminal logging with colored module prefixes.
//!
//! ```ignore
//! log!("styles"; "compiled {}", path.display());
//! // [styles] compiled src/scss/main.scss
//! ```
//!
//! Every task of the pipeline logs under its own prefix so interleaved
//! output from a parallel stage stays readable.

use colored::{ColoredString, Colorize};
use crossterm::{
    execute,
    terminal::{Clear, ClearType, size},
};
use std::{
    io::{Write, stdout},
    sync::OnceLock,
};

/// Cached terminal width (fetched once on first use)
static TERMINAL_WIDTH: OnceLock<u16> = OnceLock::new();

/// Fallback width when the terminal size cannot be detected (pipes, CI).
const FALLBACK_WIDTH: u16 = 120;

/// "[" + "]" + trailing space
const PREFIX_OVERHEAD: usize = 3;

/// Log a message with a colored module prefix.
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::utils::log::log($module, &format!($($arg)*))
    }};
}

fn terminal_width() -> usize {
    *TERMINAL_WIDTH.get_or_init(|| size().map(|(w, _)| w).unwrap_or(FALLBACK_WIDTH)) as usize
}

/// Print `[module] message`, truncated to the terminal width.
pub fn log(module: &str, message: &str) {
    let prefix = colorize_prefix(module);
    let max_msg_len = terminal_width().saturating_sub(module.len() + PREFIX_OVERHEAD);
    let message = truncate_str(message, max_msg_len);

    let mut stdout = stdout().lock();
    execute!(stdout, Clear(ClearType::UntilNewLine)).ok();
    writeln!(stdout, "{prefix} {message}").ok();
    stdout.flush().ok();
}

/// Pick a color per prefix family: server side blue, watcher green,
/// failures red, build tasks yellow.
fn colorize_prefix(module: &str) -> ColoredString {
    let prefix = format!("[{module}]");
    match module.to_ascii_lowercase().as_str() {
        "serve" | "reload" => prefix.bright_blue().bold(),
        "watch" => prefix.bright_green().bold(),
        "error" | "write" => prefix.bright_red().bold(),
        "clean" => prefix.bright_magenta().bold(),
        _ => prefix.bright_yellow().bold(),
    }
}

/// Truncate to at most `max_len` bytes on a char boundary.
fn truncate_str(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        return s;
    }
    let mut end = max_len;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_fits() {
        assert_eq!(truncate_str("compiled", 20), "compiled");
        assert_eq!(truncate_str("compiled", 8), "compiled");
    }

    #[test]
    fn test_truncate_cuts() {
        assert_eq!(truncate_str("images/header/logo.png", 6), "images");
        assert_eq!(truncate_str("anything", 0), "");
    }

    #[test]
    fn test_truncate_respects_char_boundary() {
        // "é" is 2 bytes
        assert_eq!(truncate_str("café", 4), "caf");
        assert_eq!(truncate_str("café", 5), "café");
    }

    #[test]
    fn test_prefix_contains_module_name() {
        colored::control::set_override(false);
        assert_eq!(colorize_prefix("fonts").to_string(), "[fonts]");
        assert_eq!(colorize_prefix("watch").to_string(), "[watch]");
    }
}
