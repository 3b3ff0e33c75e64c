// Entrypoint for the CLI application.
// - Keeps `main` small: parse arguments, set up logging and Ctrl-C, then
//   hand over to the UI flow.
// - Exit status: 0 on success, 1 on failure, 130 when the user aborts.

use clap::Parser;
use crossterm::{cursor, execute};
use pronto_cli::{cancel::CancelToken, config::Settings, deploy::DeployError, ui};
use std::io::IsTerminal;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const FAILED: u8 = 1;
const ABORTED: u8 = 130;

#[derive(Parser, Debug)]
#[command(name = "pronto", version, about = "Deploy a Compose database from your terminal")]
struct Cli {
    /// Accepted for compatibility; not used.
    input: Option<String>,
}

fn exit_status<T>(outcome: &anyhow::Result<T>) -> u8 {
    match outcome {
        Ok(_) => 0,
        Err(err) if matches!(err.downcast_ref::<DeployError>(), Some(DeployError::Cancelled)) => {
            ABORTED
        }
        Err(_) => FAILED,
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("PRONTO_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();
    debug!(input = ?cli.input, "starting");

    let cancel = CancelToken::new();
    let handler = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        let _ = execute!(std::io::stdout(), cursor::Show);
        if !handler.cancel() {
            std::process::exit(i32::from(ABORTED));
        }
        eprintln!("\nAborting; press Ctrl-C again to quit immediately.");
    }) {
        tracing::warn!(error = %e, "could not install Ctrl-C handler");
    }

    // Configuration comes from `PRONTO_*` environment variables, see
    // `config::Settings::from_env`.
    let settings = Settings::from_env();

    let outcome = ui::run(&settings, &cancel);
    let status = exit_status(&outcome);
    match outcome {
        Ok(_) => {}
        Err(_) if status == ABORTED => eprintln!("Aborted."),
        Err(err) => eprintln!("Error: {err:?}"),
    }
    ExitCode::from(status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pronto_cli::api::ApiError;
    use reqwest::StatusCode;

    #[test]
    fn success_exits_zero() {
        assert_eq!(exit_status(&Ok(())), 0);
    }

    #[test]
    fn failures_exit_one() {
        let lookup: anyhow::Result<()> = Err(DeployError::IdentityLookup(ApiError::Status {
            url: "https://api.example/user".into(),
            status: StatusCode::UNAUTHORIZED,
            body: String::new(),
        })
        .into());
        assert_eq!(exit_status(&lookup), 1);

        let other: anyhow::Result<()> = Err(anyhow::anyhow!("client setup failed"));
        assert_eq!(exit_status(&other), 1);
    }

    #[test]
    fn cancel_exits_130() {
        let cancelled: anyhow::Result<()> = Err(DeployError::Cancelled.into());
        assert_eq!(exit_status(&cancelled), 130);
    }
}
