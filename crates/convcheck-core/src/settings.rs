//! Engine settings loaded from TOML or JSON, with environment overrides.
//!
//! ```toml
//! artifacts = ["target/classes", "lib/app.tar"]
//!
//! [execution]
//! mode = "full"
//!
//! [watch]
//! debounce_ms = 250
//!
//! [logging]
//! json = false
//! level = "debug"
//! ```

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::Level;

use crate::error::{Result, RuntimeError};
use crate::mode::ExecutionMode;

pub const MODE_ENV: &str = "CONVCHECK_MODE";
pub const LOG_FORMAT_ENV: &str = "CONVCHECK_LOG_FORMAT";

const DEFAULT_DEBOUNCE_MS: u64 = 500;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub execution: ExecutionSettings,
    pub artifacts: Vec<PathBuf>,
    pub watch: WatchSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionSettings {
    pub mode: ExecutionMode,
}

impl ExecutionSettings {
    /// Take the values of `new`; returns whether anything changed.
    pub fn update(&mut self, new: ExecutionSettings) -> bool {
        let changed = self.mode != new.mode;
        self.mode = new.mode;
        changed
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchSettings {
    pub debounce_ms: u64,
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

impl WatchSettings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub json: bool,
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            json: false,
            level: "info".to_string(),
        }
    }
}

impl LoggingSettings {
    /// The configured level, `INFO` when it does not parse.
    pub fn level(&self) -> Level {
        Level::from_str(self.level.trim()).unwrap_or(Level::INFO)
    }
}

impl EngineSettings {
    /// Load from `path`; `.json` files are read as JSON, anything else as TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let settings_error = |reason: String| RuntimeError::Settings {
            path: path.to_path_buf(),
            reason,
        };

        let text = std::fs::read_to_string(path).map_err(|e| settings_error(e.to_string()))?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            serde_json::from_str(&text).map_err(|e| settings_error(e.to_string()))
        } else {
            toml::from_str(&text).map_err(|e| settings_error(e.to_string()))
        }
    }

    /// Apply `CONVCHECK_MODE` and `CONVCHECK_LOG_FORMAT` as read by `lookup`.
    pub fn apply_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(mode) = lookup(MODE_ENV) {
            self.execution.mode = ExecutionMode::from_name(Some(&mode));
        }
        if let Some(format) = lookup(LOG_FORMAT_ENV) {
            self.logging.json = format.trim().eq_ignore_ascii_case("json");
        }
        self
    }

    /// [`apply_overrides`](Self::apply_overrides) against the process environment.
    pub fn from_env(self) -> Self {
        self.apply_overrides(|key| std::env::var(key).ok())
    }
}
