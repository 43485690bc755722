//! boxcut binary entry point.

use clap::Parser;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod app;
mod cli;
mod discover;
mod metadata;
mod report;

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("boxcut=info"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_ansi(true)
                .with_target(false)
                .with_file(false)
                .with_line_number(false),
        )
        .with(env_filter)
        .init();

    let args = cli::Cli::parse();

    if let Err(e) = app::run(args).await {
        error!("{e:#}");
        std::process::exit(1);
    }
}
