use std::process::ExitCode;

use bugtrack::commands;
use bugtrack::config::{Cli, Config};
use bugtrack::error::AppError;
use bugtrack::state::AppState;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr so command output stays pipeable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {}", err);
            let code = err
                .downcast_ref::<AppError>()
                .map(AppError::exit_code)
                .unwrap_or(1);
            ExitCode::from(code)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<String> {
    let config = Config::load(&cli)?;
    tracing::debug!("Data directory: {}", config.data_dir.display());

    let mut state = AppState::from_config(config, cli.ephemeral)?;
    match commands::run(&mut state, cli.command).await {
        Ok(output) => Ok(output),
        Err(err) => {
            let message = err.user_message(state.bugs.error());
            // Keep the typed error for the exit code, show the store's wording
            Err(anyhow::Error::new(err).context(message))
        }
    }
}
