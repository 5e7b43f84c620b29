use clap::Parser;
use expense_ledger::args::{Args, Command};
use expense_ledger::{commands, Config, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().ledger_home().path();

    let _: () = match args.command() {
        Command::Init => commands::init(home).await?.print(),

        Command::Insert(insert_args) => {
            let config = Config::load(home).await?;
            commands::insert(config, insert_args.clone()).await?.print()
        }

        Command::List(window_args) => {
            let config = Config::load(home).await?;
            commands::list(config, window_args.clone()).await?.print()
        }

        Command::Summary(window_args) => {
            let config = Config::load(home).await?;
            commands::summary(config, window_args.clone()).await?.print()
        }

        Command::Delete(delete_args) => {
            let config = Config::load(home).await?;
            commands::delete(config, delete_args.clone()).await?.print()
        }
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                "expense_ledger",
                level,
                env!("CARGO_CRATE_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
