//! Environment-sourced configuration.
//!
//! Settings are read once at startup; a missing required variable fails
//! before any transfer begins. The upload and combine sides need
//! different values, so each carries its own struct.

/// Temporary-directory prefix used when `SHARDPUT_TMPDIR` is unset.
pub const DEFAULT_TMP_DIR: &str = "tmp/";

/// Settings for talking to the store over HTTP (upload side).
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub base_url: String,
    pub username: String,
    pub password: String,
    pub tmp_dir: String,
}

impl StoreConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        Ok(Self {
            base_url: required(&lookup, "SHARDPUT_BASE_URL")?,
            username: required(&lookup, "SHARDPUT_USERNAME")?,
            password: required(&lookup, "SHARDPUT_PASSWORD")?,
            tmp_dir: tmp_dir(&lookup),
        })
    }
}

/// Settings for a combine run on the store host (filesystem side).
#[derive(Debug, Clone)]
pub struct CombineConfig {
    pub root: String,
    pub tmp_dir: String,
}

impl CombineConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        Ok(Self {
            root: required(&lookup, "SHARDPUT_ROOT")?,
            tmp_dir: tmp_dir(&lookup),
        })
    }
}

fn tmp_dir(lookup: &impl Fn(&str) -> Option<String>) -> String {
    lookup("SHARDPUT_TMPDIR").unwrap_or_else(|| DEFAULT_TMP_DIR.into())
}

fn required(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> anyhow::Result<String> {
    lookup(key).ok_or_else(|| anyhow::anyhow!("environment variable {key} is not set"))
}
