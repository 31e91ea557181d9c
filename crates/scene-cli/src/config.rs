//! Configuration resolved from the environment and an optional YAML file.
//!
//! Environment variables win over the file; anything unset falls back to
//! the defaults.

use std::path::Path;
use std::time::Duration;

use scene_core::speaker::Roster;
use scene_replay::ReplayConfig;
use scene_replay::application::coordinator::DEFAULT_HANDOFF_TIMEOUT;
use serde::Deserialize;

use crate::error::AppError;

/// Path of an optional YAML config file.
pub const CONFIG_FILE_VAR: &str = "SCENE_CONFIG";
/// Comma-separated speaker roster.
pub const SPEAKERS_VAR: &str = "SCENE_SPEAKERS";
/// Handoff watchdog in milliseconds; `0` disables it.
pub const HANDOFF_TIMEOUT_VAR: &str = "SCENE_HANDOFF_TIMEOUT_MS";
/// `text` or `json`.
pub const LOG_FORMAT_VAR: &str = "SCENE_LOG_FORMAT";
/// Print the JSON run summary to stderr when truthy.
pub const SUMMARY_VAR: &str = "SCENE_SUMMARY";

/// Shape of the YAML config file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    speakers: Option<Vec<String>>,
    handoff_timeout_ms: Option<u64>,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Fully resolved configuration for one invocation.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Closed set of speakers the script may use.
    pub roster: Roster,
    /// Replay tunables.
    pub replay: ReplayConfig,
    /// Log output format.
    pub log_format: LogFormat,
    /// Whether to print the run summary.
    pub print_summary: bool,
}

impl AppConfig {
    /// Reads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError` if a variable or the config file is invalid.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` for unreadable or malformed settings and
    /// `AppError::Scene` for an invalid roster.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = match lookup(CONFIG_FILE_VAR) {
            Some(path) => load_file(Path::new(&path))?,
            None => FileConfig::default(),
        };

        let roster = match (lookup(SPEAKERS_VAR), file.speakers) {
            (Some(list), _) => Roster::new(list.split(',').map(str::trim))?,
            (None, Some(speakers)) => Roster::new(speakers)?,
            (None, None) => Roster::default(),
        };

        let timeout_ms = match lookup(HANDOFF_TIMEOUT_VAR) {
            Some(raw) => Some(raw.trim().parse::<u64>().map_err(|e| {
                AppError::Config(format!(
                    "{HANDOFF_TIMEOUT_VAR} must be a whole number of milliseconds: {e}"
                ))
            })?),
            None => file.handoff_timeout_ms,
        };
        let handoff_timeout = match timeout_ms {
            Some(0) => None,
            Some(ms) => Some(Duration::from_millis(ms)),
            None => Some(DEFAULT_HANDOFF_TIMEOUT),
        };

        let log_format = match lookup(LOG_FORMAT_VAR).as_deref().map(str::trim) {
            None | Some("" | "text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(AppError::Config(format!(
                    "{LOG_FORMAT_VAR} must be `text` or `json`, got {other:?}"
                )));
            }
        };

        let print_summary = matches!(
            lookup(SUMMARY_VAR).as_deref().map(str::trim),
            Some("1" | "true" | "yes")
        );

        Ok(Self {
            roster,
            replay: ReplayConfig { handoff_timeout },
            log_format,
            print_summary,
        })
    }
}

fn load_file(path: &Path) -> Result<FileConfig, AppError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;
    serde_yaml::from_str(&raw)
        .map_err(|e| AppError::Config(format!("invalid config file {}: {e}", path.display())))
}
