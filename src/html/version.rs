//! Cache-busting query tokens for stylesheet and script references.

use regex::{Captures, Regex};
use std::{borrow::Cow, sync::LazyLock};

static ASSET_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)((?:src|href)\s*=\s*["'])([^"'?#]+\.(?:css|js))(\?[^"'#]*)?(["'#])"#).unwrap()
});

/// Token for the current build: local time as `YYYYMMDDHHMMSS`.
pub fn token() -> String {
    chrono::Local::now().format("%Y%m%d%H%M%S").to_string()
}

/// Append `v=<token>` to every `.css`/`.js` reference in `src`/`href`
/// attributes, extending an existing query with `&`.
pub fn append<'a>(html: &'a str, token: &str) -> Cow<'a, str> {
    ASSET_REF.replace_all(html, |caps: &Captures| {
        let query = match caps.get(3) {
            Some(q) => format!("{}&v={token}", q.as_str()),
            None => format!("?v={token}"),
        };
        format!("{}{}{query}{}", &caps[1], &caps[2], &caps[4])
    })
}
