//! Scene CLI — read a script, replay it through per-speaker workers, write
//! it back out.

pub mod config;
pub mod error;

use std::io::{BufRead, Write};

use scene_core::line::ScriptLine;
use scene_core::sink::WriterSink;
use scene_replay::{ReplayOutcome, replay_script};
use scene_script::read_script;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{AppConfig, LogFormat};
use crate::error::AppError;

/// Installs the global tracing subscriber. Logs go to stderr so stdout
/// carries only the replayed script.
pub fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// Reads the whole script before anything is replayed.
///
/// # Errors
///
/// Returns `AppError::Scene` on I/O failure or the first invalid line.
pub fn load_script<R: BufRead>(input: R, config: &AppConfig) -> Result<Vec<ScriptLine>, AppError> {
    let lines = read_script(input, &config.roster)?;
    info!(lines = lines.len(), speakers = config.roster.len(), "script loaded");
    Ok(lines)
}

/// Replays `lines` onto `output` and flushes it.
///
/// # Errors
///
/// Returns `AppError::Replay` if replay fails or is cancelled.
pub async fn replay<W: Write + Send + 'static>(
    config: &AppConfig,
    lines: &[ScriptLine],
    output: W,
    cancel: CancellationToken,
) -> Result<ReplayOutcome<WriterSink<W>>, AppError> {
    let outcome = replay_script(
        &config.roster,
        lines,
        WriterSink::new(output),
        config.replay,
        cancel,
    )
    .await?;
    Ok(outcome)
}
