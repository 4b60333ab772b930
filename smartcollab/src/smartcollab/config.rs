use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_DATA_FILE: &str = "smartcollab.json";
pub const DEFAULT_SESSION_FILE: &str = ".smartcollab-session";
pub const DEFAULT_ANALYSIS_DELAY_MS: u64 = 1500;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// JSON document backing the local stand-in backend
    pub data_file: PathBuf,
    /// Where the session token is remembered between runs
    pub session_file: PathBuf,
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AnalysisConfig {
    pub delay_ms: u64,
}

impl AnalysisConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Config {
    /// Loads defaults, then `smartcollab.toml` (or `path` if given), then
    /// `SMARTCOLLAB_*` environment variables. An explicit `path` must exist.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        Self::load_with_env(path, None)
    }

    /// `env` stands in for the process environment when given.
    fn load_with_env(
        path: Option<&Path>,
        env: Option<config::Map<String, String>>,
    ) -> anyhow::Result<Self> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name("smartcollab").required(false),
        };
        let settings = config::Config::builder()
            .set_default("data_file", DEFAULT_DATA_FILE)?
            .set_default("session_file", DEFAULT_SESSION_FILE)?
            .set_default("analysis.delay_ms", DEFAULT_ANALYSIS_DELAY_MS)?
            .add_source(file)
            .add_source(
                config::Environment::with_prefix("SMARTCOLLAB")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
