use clap::Parser;
use tracing::{error, info, span, Level};
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().json().with_env_filter(filter).init();

    let args = cli::Cli::parse();
    let command = args.command.name();

    let span = span!(Level::INFO, "main", context = "main");
    let _e = span.enter();
    info!(command = command, host = %args.minio_host, port = args.minio_port, "called");

    if let Err(err) = commands::run(&args) {
        error!(error_message=%err, error_group=command, "{} failed", command);
        std::process::exit(1);
    }

    info!(command = command, "complete");
}
