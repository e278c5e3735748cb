use std::io;

use ics_event::config::Config;
use tracing_subscriber::EnvFilter;

mod cli;
use cli::{CliMode, USAGE, parse_cli_mode, run_describe};

#[tokio::main]
async fn main() -> Result<(), io::Error> {
    let cli_mode = match parse_cli_mode(std::env::args().skip(1)) {
        Ok(mode) => mode,
        Err(err) => {
            eprintln!("Error: {}", err);
            println!("{USAGE}");
            return Ok(());
        }
    };

    let args = match cli_mode {
        CliMode::Help => {
            println!("{USAGE}");
            return Ok(());
        }
        CliMode::Describe(args) => args,
    };

    let config = match Config::load_or_create() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Config error: {}", e);
            Config::default()
        }
    };

    setup_logging(&config);

    if let Err(e) = run_describe(args, &config).await {
        eprintln!("Error: {}", e);
        tracing::error!("Failed to describe event: {}", e);
    }

    Ok(())
}

fn setup_logging(config: &Config) {
    let log_dir = &config.logging.directory;

    std::fs::create_dir_all(log_dir).ok();

    let file_appender = tracing_appender::rolling::daily(log_dir, "ics-event.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(false)
        .init();

    std::mem::forget(_guard);

    tracing::info!("ics-event started");
}
