//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization, and their
//! values match the layout a fresh project is expected to have.

pub fn r#true() -> bool {
    true
}

// ============================================================================
// [build] Section Defaults
// ============================================================================

pub mod build {
    use std::path::PathBuf;

    pub fn source() -> PathBuf {
        "src".into()
    }

    pub fn output() -> PathBuf {
        "dist".into()
    }

    pub fn release() -> PathBuf {
        "build".into()
    }
}

// ============================================================================
// [serve] Section Defaults
// ============================================================================

pub mod serve {
    pub fn interface() -> String {
        "127.0.0.1".into()
    }

    pub fn port() -> u16 {
        3000
    }

    pub fn reload_port() -> u16 {
        35729
    }
}

// ============================================================================
// [tools] Section Defaults
// ============================================================================

pub mod tools {
    pub fn esbuild() -> Vec<String> {
        vec!["esbuild".into()]
    }

    pub fn fonts() -> Vec<String> {
        vec!["pyftsubset".into()]
    }
}
