//! Logging setup.

use std::str::FromStr;

use anyhow::{Context, Result};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Install a compact fmt subscriber at `level` (e.g. `INFO`).
///
/// `RUST_LOG` directives take precedence over `level`. Returns `false` when
/// a global subscriber was already installed, so calling this twice is safe.
pub fn init(level: &str) -> Result<bool> {
    let level = LevelFilter::from_str(level.trim())
        .with_context(|| format!("invalid log level {:?}", level))?;

    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    Ok(tracing_subscriber::fmt()
        .compact()
        .with_env_filter(env_filter)
        .try_init()
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init("INFO").unwrap();
        assert!(!init("debug").unwrap());
    }

    #[test]
    fn test_invalid_level() {
        assert!(init("loud").is_err());
    }
}
