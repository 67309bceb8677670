//! RelicVeil - browse, submit, and curate historical artifacts from the terminal.
//!
//! Public listings work without an account. Everything else signs in through
//! the identity provider and keeps the session between runs.

mod app;
mod output;

use std::io;

use anyhow::Result;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app::App;
use relicveil_core::Config;

/// Set to `1` to also log to a daily file in the cache directory
const LOG_FILE_ENV: &str = "RELICVEIL_LOG_FILE";

/// Log file name prefix inside the cache directory
const LOG_FILE_PREFIX: &str = "relicveil.log";

const USAGE: &str = "\
Usage: relicveil <command> [args]

Browse:
  list                          All artifacts
  top                           Most liked artifacts
  search <query>                Search artifacts by name
  show <id>                     Artifact details (login required)

Account:
  register <email> <name> [photo-url]
  login <email>
  login-google <id-token>
  logout
  whoami
  profile                       Account details and statistics
  update-profile <name> [photo-url]
  reset-password <email>

Curate (login required):
  mine                          Artifacts you added
  liked                         Artifacts you liked
  add <form.json>               Submit an artifact
  edit <id> <form.json>         Update one of your artifacts
  delete <id>                   Delete one of your artifacts
  like <id>
  dislike <id>                  Take back a like
";

/// Initialize the tracing subscriber for logging
fn init_tracing(config: &Config) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let mut guard = None;
    let file_layer = match (std::env::var(LOG_FILE_ENV).as_deref(), config.cache_dir()) {
        (Ok("1"), Ok(dir)) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, worker_guard) = tracing_appender::non_blocking(appender);
            guard = Some(worker_guard);
            Some(fmt::layer().with_writer(writer).with_ansi(false))
        }
        _ => None,
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = Config::load()?;
    let _log_guard = init_tracing(&config);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        print!("{}", USAGE);
        return Ok(());
    };
    if matches!(command.as_str(), "help" | "-h" | "--help") {
        print!("{}", USAGE);
        return Ok(());
    }

    info!(command = %command, "relicveil starting");
    let app = App::new(config).await?;

    if let Err(e) = app.run(command, &args[1..]).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}
