//! `@@include` preprocessing.
//!
//! ```html
//! @@include('components/header/header.html', {"title": "Home"})
//! <h1>@@title</h1>
//! ```
//!
//! Paths are relative to the including file. The optional JSON object is
//! merged over the including file's variables and applies to the included
//! file and everything it includes in turn.

use anyhow::{Context, Result, bail};
use regex::{Captures, Regex};
use serde_json::{Map, Value};
use std::{fs, path::Path, sync::LazyLock};

/// Nesting depth at which expansion gives up (likely a self-include).
pub const MAX_DEPTH: usize = 16;

static INCLUDE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"@@include\(\s*['"]([^'"]+)['"]\s*(?:,\s*(\{[\s\S]*?\})\s*)?\)"#).unwrap()
});

static VARIABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@@([A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z0-9_]+)*)").unwrap());

/// Read `path` and expand every include in it.
pub fn expand(path: &Path) -> Result<String> {
    let text =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    expand_text(&text, parent_dir(path), &Map::new(), 0)
}

fn expand_text(text: &str, dir: &Path, vars: &Map<String, Value>, depth: usize) -> Result<String> {
    if depth > MAX_DEPTH {
        bail!("@@include nested deeper than {MAX_DEPTH} levels");
    }

    let text = substitute(text, vars);
    let mut out = String::with_capacity(text.len());
    let mut last = 0;

    for caps in INCLUDE.captures_iter(&text) {
        let whole = caps.get(0).map_or(0..0, |m| m.range());
        out.push_str(&text[last..whole.start]);
        last = whole.end;

        let target = dir.join(&caps[1]);
        let mut scope = vars.clone();
        if let Some(args) = caps.get(2) {
            let args: Map<String, Value> = serde_json::from_str(args.as_str())
                .with_context(|| format!("Invalid @@include arguments for {}", &caps[1]))?;
            scope.extend(args);
        }

        let included = fs::read_to_string(&target)
            .with_context(|| format!("Failed to include {}", target.display()))?;
        out.push_str(&expand_text(&included, parent_dir(&target), &scope, depth + 1)?);
    }

    out.push_str(&text[last..]);
    Ok(out)
}

/// Replace `@@name` (or `@@a.b`) with the matching variable. Unknown names,
/// and `@@include` itself, are left as written.
fn substitute(text: &str, vars: &Map<String, Value>) -> String {
    if vars.is_empty() {
        return text.to_owned();
    }

    VARIABLE
        .replace_all(text, |caps: &Captures| {
            let name = &caps[1];
            if name == "include" {
                return caps[0].to_owned();
            }
            lookup(vars, name).map_or_else(|| caps[0].to_owned(), render)
        })
        .into_owned()
}

fn lookup<'a>(vars: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    let mut parts = name.split('.');
    let mut value = vars.get(parts.next()?)?;
    for part in parts {
        value = value.get(part)?;
    }
    Some(value)
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn parent_dir(path: &Path) -> &Path {
    path.parent().unwrap_or(Path::new("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_expand_nested_includes() {
        let dir = tempdir().unwrap();
        write(
            &dir.path().join("index.html"),
            "<body>@@include('components/header/header.html', {\"title\": \"Home\"})</body>",
        );
        write(
            &dir.path().join("components/header/header.html"),
            "<header>@@title @@include('nav.html')</header>",
        );
        write(
            &dir.path().join("components/header/nav.html"),
            "<nav>@@title</nav>",
        );

        assert_eq!(
            expand(&dir.path().join("index.html")).unwrap(),
            "<body><header>Home <nav>Home</nav></header></body>"
        );
    }

    #[test]
    fn test_variables_do_not_leak_to_siblings() {
        let dir = tempdir().unwrap();
        write(
            &dir.path().join("page.html"),
            "@@include(\"a.html\", {\"name\": \"A\"})|@@include(\"a.html\")",
        );
        write(&dir.path().join("a.html"), "[@@name]");

        assert_eq!(expand(&dir.path().join("page.html")).unwrap(), "[A]|[@@name]");
    }

    #[test]
    fn test_dotted_and_non_string_values() {
        let vars: Map<String, Value> =
            serde_json::from_str(r#"{"page": {"title": "Docs"}, "count": 3, "draft": false}"#)
                .unwrap();
        assert_eq!(
            substitute("@@page.title/@@count/@@draft/@@missing", &vars),
            "Docs/3/false/@@missing"
        );
    }

    #[test]
    fn test_missing_include_is_error() {
        let dir = tempdir().unwrap();
        write(&dir.path().join("index.html"), "@@include('nope.html')");

        let err = expand(&dir.path().join("index.html")).unwrap_err();
        assert!(format!("{err:#}").contains("nope.html"));
    }

    #[test]
    fn test_invalid_arguments_is_error() {
        let dir = tempdir().unwrap();
        write(&dir.path().join("a.html"), "");
        write(&dir.path().join("index.html"), "@@include('a.html', {title: x})");

        assert!(expand(&dir.path().join("index.html")).is_err());
    }

    #[test]
    fn test_self_include_hits_depth_limit() {
        let dir = tempdir().unwrap();
        write(&dir.path().join("loop.html"), "x@@include('loop.html')");

        let err = expand(&dir.path().join("loop.html")).unwrap_err();
        assert!(format!("{err:#}").contains("nested deeper"));
    }
}
