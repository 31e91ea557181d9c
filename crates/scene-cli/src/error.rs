//! Scene CLI — application error types.

use scene_core::error::SceneError;
use scene_replay::ReplayError;
use thiserror::Error;

/// Startup and runtime errors for the `scene` binary.
#[derive(Debug, Error)]
pub enum AppError {
    /// An environment variable or config file is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// The roster or the script was rejected.
    #[error(transparent)]
    Scene(#[from] SceneError),

    /// Replay did not complete.
    #[error("replay failed: {0}")]
    Replay(#[from] ReplayError),

    /// The run summary could not be rendered.
    #[error("summary error: {0}")]
    Summary(#[from] serde_json::Error),
}
