use std::path::PathBuf;

use anyhow::{bail, Result};

pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5-20250929";
pub const AUTHOR: &str = "Erwin Bernard";

const ANTHROPIC_KEY_VAR: &str = "ANTHROPIC_API_KEY";
const TMDB_KEY_VAR: &str = "TMDB_API_KEY";

/// Settings resolved once per run from CLI flags and the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_key: String,
    pub tmdb_key: Option<String>,
    pub paths: Paths,
}

/// Paths and knobs that come from the command line.
#[derive(Debug, Clone)]
pub struct Paths {
    pub model: String,
    pub staging_dir: PathBuf,
    pub content_dir: PathBuf,
    pub credentials: PathBuf,
    pub token_cache: PathBuf,
    pub oauth_port: u16,
}

impl Config {
    pub fn from_env(paths: Paths) -> Result<Self> {
        Self::resolve(
            paths,
            std::env::var(ANTHROPIC_KEY_VAR).ok(),
            std::env::var(TMDB_KEY_VAR).ok(),
        )
    }

    fn resolve(paths: Paths, anthropic: Option<String>, tmdb: Option<String>) -> Result<Self> {
        let anthropic_key = match anthropic.filter(|k| !k.trim().is_empty()) {
            Some(k) => k,
            None => bail!(
                "{ANTHROPIC_KEY_VAR} environment variable is not set.\n\
                 Export it before running: export {ANTHROPIC_KEY_VAR}='sk-ant-...'"
            ),
        };
        let tmdb_key = tmdb.filter(|k| !k.trim().is_empty());
        Ok(Self {
            anthropic_key,
            tmdb_key,
            paths,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths() -> Paths {
        Paths {
            model: DEFAULT_MODEL.into(),
            staging_dir: "staging".into(),
            content_dir: "content/posts".into(),
            credentials: "credentials.json".into(),
            token_cache: "token.json".into(),
            oauth_port: 8765,
        }
    }

    #[test]
    fn missing_anthropic_key_fails() {
        let err = Config::resolve(paths(), None, Some("t".into())).unwrap_err();
        assert!(err.to_string().contains(ANTHROPIC_KEY_VAR));
    }

    #[test]
    fn blank_anthropic_key_fails() {
        assert!(Config::resolve(paths(), Some("  ".into()), None).is_err());
    }

    #[test]
    fn blank_tmdb_key_disables_lookup() {
        let cfg = Config::resolve(paths(), Some("sk".into()), Some("".into())).unwrap();
        assert!(cfg.tmdb_key.is_none());
        assert_eq!(cfg.anthropic_key, "sk");
    }
}
