use tracing_subscriber::EnvFilter;

use crewcal::storage::Config;

mod cli;
use cli::{CliMode, parse_cli_mode, run_agenda_mode, run_notifications_mode};
mod sample_data;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_logging();

    let cli_mode = match parse_cli_mode() {
        Ok(mode) => mode,
        Err(err) => {
            eprintln!("Error: {}", err);
            println!("{}", cli::USAGE);
            return Ok(());
        }
    };

    let result = match cli_mode {
        CliMode::Help => {
            println!("{}", cli::USAGE);
            Ok(())
        }
        CliMode::Agenda { date, sample, json } => run_agenda_mode(date, sample, json).await,
        CliMode::Notifications { sample } => run_notifications_mode(sample).await,
    };

    if let Err(e) = &result {
        tracing::error!("crewcal failed: {:#}", e);
    }
    result
}

fn setup_logging() {
    let log_dir = Config::config_dir();

    std::fs::create_dir_all(&log_dir).ok();

    let file_appender = tracing_appender::rolling::daily(log_dir, "crewcal.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(false)
        .init();

    std::mem::forget(_guard);

    tracing::info!("crewcal started");
}
