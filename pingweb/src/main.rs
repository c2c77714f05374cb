//! # Pingweb CLI Entry Point
//!
//! The main executable. This file drives the application lifecycle:
//!
//! 1. **Initialization**: Parses command-line arguments using [`cli::Cli`], sets up logging and
//!    loads the client configuration.
//! 2. **Connection**: Connects the text and binary transports to the gateway via `pingweb_core`.
//! 3. **Execution**: Hands every input to the `Orchestrator`.
//! 4. **Presentation**: Prints each notification as it arrives.

mod cli;
mod formatter;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Commands};
use directories::ProjectDirs;
use formatter::{FormattedString, GenericError};
use pingweb_core::{
    ClientConfig, EncodingMode, GrpcClient, Notification, Orchestrator, Transports, UnaryMethod,
    orchestrator::Input,
};
use std::{process, sync::Arc};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel},
    task::JoinSet,
};
use tracing_subscriber::EnvFilter;

type CliOrchestrator = Orchestrator<GrpcClient, UnboundedSender<Notification>>;

#[tokio::main]
async fn main() {
    init_tracing();

    let args = Cli::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!(
                "{}",
                FormattedString::from(GenericError("Failed to load config", format!("{err:#}")))
            );
            process::exit(1);
        }
    };

    tracing::debug!(endpoint = %config.endpoint, "Connecting to gateway");
    let transports = match Transports::connect(&config) {
        Ok(transports) => transports,
        Err(err) => {
            eprintln!("{}", FormattedString::from(err));
            process::exit(1);
        }
    };

    let (sink, notifications) = unbounded_channel();
    let orchestrator = Arc::new(Orchestrator::new(transports, sink, config));
    let printer = tokio::spawn(print_notifications(notifications));

    let succeeded = match args.command {
        Commands::Send {
            input,
            binary,
            method,
        } => run_send(&orchestrator, &input, cli::mode(binary), method.into()).await,
        Commands::Interactive { binary } => {
            run_interactive(orchestrator.clone(), cli::mode(binary)).await
        }
    };

    // The printer stops once every sender is gone.
    drop(orchestrator);
    let _ = printer.await;

    if !succeeded {
        process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// `--config` wins, then the per-user config file, then the defaults. `--url` always overrides
/// the endpoint.
fn load_config(args: &Cli) -> anyhow::Result<ClientConfig> {
    let mut config = match &args.config {
        Some(path) => ClientConfig::load(path)?,
        None => match ProjectDirs::from("com", "pingweb", "pingweb") {
            Some(dirs) => ClientConfig::load_or_default(&dirs.config_dir().join("config.json"))
                .context("Could not read the user config file")?,
            None => ClientConfig::default(),
        },
    };

    if let Some(url) = &args.url {
        config.endpoint = url.clone();
    }

    Ok(config)
}

async fn run_send(
    orchestrator: &CliOrchestrator,
    input: &str,
    mode: EncodingMode,
    method: UnaryMethod,
) -> bool {
    let result = match Input::classify(input) {
        Input::Unary(timestamp) => orchestrator.unary(method, timestamp, mode).await.map(drop),
        _ => orchestrator.submit(input, mode).await.map(drop),
    };

    result.is_ok()
}

async fn run_interactive(
    orchestrator: Arc<CliOrchestrator>,
    default_mode: EncodingMode,
) -> bool {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut calls = JoinSet::new();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let orchestrator = orchestrator.clone();
                calls.spawn(async move {
                    let (mode, input) = cli::parse_line(&line, default_mode);
                    // Failures are already reported as notifications.
                    let _ = orchestrator.submit(input, mode).await;
                });
            }
            Ok(None) => break,
            Err(err) => {
                eprintln!(
                    "{}",
                    FormattedString::from(GenericError("Failed to read stdin", err))
                );
                calls.join_all().await;
                return false;
            }
        }
    }

    calls.join_all().await;
    true
}

async fn print_notifications(mut notifications: UnboundedReceiver<Notification>) {
    while let Some(notification) = notifications.recv().await {
        println!("{}", FormattedString::from(notification));
    }
}
