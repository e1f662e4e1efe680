#[macro_use]
extern crate failure;

use clap::{Parser, Subcommand};
use env_logger::Env;
use log::{error, info};
use plate_pricer::client::{HealthProbe, PredictionService, ServiceClient};
use plate_pricer::config::{Config, DEFAULT_TRAINING_DAYS};
use plate_pricer::db::HistoryStore;
use plate_pricer::session::PredictionSession;
use plate_pricer::status::StatusMonitor;
use plate_pricer::types::ApiStatus;
use plate_pricer::{plate, render};
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(
    name = "plate-pricer",
    version,
    about = "Predict resale prices for vehicle registration plates"
)]
struct Cli {
    #[command(flatten)]
    config: Config,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Predict the price of a plate, e.g. `predict А123ВС777`
    Predict {
        #[arg(required = true, num_args = 1..)]
        number: Vec<String>,

        /// Also print a one-line summary for sharing
        #[arg(long)]
        share: bool,
    },
    /// Normalize and validate a plate without contacting the service
    Check {
        #[arg(required = true, num_args = 1..)]
        number: Vec<String>,
    },
    /// Ask the service to retrain its model
    Train {
        #[arg(long, default_value_t = DEFAULT_TRAINING_DAYS)]
        days_back: u32,
    },
    /// Probe the service once
    Status,
    /// Keep probing the service and print status changes until Ctrl-C
    Watch,
    /// Show, clear or replay the prediction history
    History {
        #[arg(long, conflicts_with = "replay")]
        clear: bool,

        /// Predict again for the entry at this position
        #[arg(long)]
        replay: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    info!("Starting plate-pricer against {}", cli.config.api_url);

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Runs one command. `Ok(false)` means the command ran but its request failed.
async fn run(cli: Cli) -> Result<bool, failure::Error> {
    let config = cli.config;
    let client = ServiceClient::new(&config.api_url)
        .map_err(|e| format_err!("Invalid API URL '{}': {}", config.api_url, e))?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Command::Predict { number, share } => {
            let history = HistoryStore::open(&config.history_db)?;
            let mut session = PredictionSession::new(client, history);
            let result = session.predict(&number.join(" ")).await;
            render::render(&mut out, session.app_state())?;
            if let (true, Ok(prediction)) = (share, &result) {
                writeln!(out, "{}", render::share_text(&prediction.prediction))?;
            }
            Ok(result.is_ok())
        }
        Command::Check { number } => {
            let normalized = plate::normalize(&number.join(" "));
            match plate::preview(normalized.as_str()) {
                Some(parts) => {
                    writeln!(out, "[{}]", render::format_plate(&parts))?;
                    Ok(true)
                }
                None => {
                    writeln!(out, "Invalid plate '{}'; use the format А123ВС777", normalized)?;
                    Ok(false)
                }
            }
        }
        Command::Train { days_back } => {
            match client.train(days_back).await {
                Ok(()) => {
                    writeln!(
                        out,
                        "Training on the last {} days started; this may take several minutes",
                        days_back
                    )?;
                    Ok(true)
                }
                Err(e) => {
                    writeln!(out, "Unable to start training: {}", e)?;
                    Ok(false)
                }
            }
        }
        Command::Status => {
            let status = client.probe().await;
            writeln!(out, "API: {}", status)?;
            Ok(status == ApiStatus::Online)
        }
        Command::Watch => {
            let monitor = StatusMonitor::start(Arc::new(client), config.probe_interval());
            let mut status = monitor.subscribe();
            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => break,
                    changed = status.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let current = *status.borrow();
                        writeln!(out, "API: {}", current)?;
                        out.flush()?;
                    }
                }
            }
            monitor.stop().await;
            Ok(true)
        }
        Command::History { clear, replay } => {
            let history = HistoryStore::open(&config.history_db)?;
            let mut session = PredictionSession::new(client, history);
            if clear {
                session.clear_history();
            }
            if let Some(index) = replay {
                let result = session.replay(index).await;
                render::render(&mut out, session.app_state())?;
                return Ok(result.is_ok());
            }
            render::render_history(&mut out, session.history())?;
            Ok(true)
        }
    }
}
