//! `scene` — replay a dialogue script from stdin to stdout, one concurrent
//! worker per speaker.

use std::io::{self, BufWriter};
use std::process::ExitCode;

use scene_cli::config::AppConfig;
use scene_cli::error::AppError;
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("scene: {e}");
            return ExitCode::FAILURE;
        }
    };
    scene_cli::init_tracing(config.log_format);

    match run(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "scene replay failed");
            eprintln!("scene: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &AppConfig) -> Result<(), AppError> {
    let lines = scene_cli::load_script(io::stdin().lock(), config)?;

    // Ctrl-C interrupts every pending handoff; the run still joins all
    // workers before reporting.
    let cancel = CancellationToken::new();
    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupt received, cancelling replay");
                cancel.cancel();
            }
        })
    };

    let result = scene_cli::replay(config, &lines, BufWriter::new(io::stdout()), cancel).await;
    interrupt.abort();
    let outcome = result?;

    if config.print_summary {
        eprintln!("{}", serde_json::to_string(&outcome.summary)?);
    }
    Ok(())
}
