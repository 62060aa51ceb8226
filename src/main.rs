// Copyright 2025 pwdns Contributors
// Licensed under GPL-3.0

//! pwdns CLI application

use anyhow::Result;
use clap::{Parser, Subcommand};

mod cli;

#[derive(Parser)]
#[command(name = "pwdns")]
#[command(about = "DNS responder for pwd<ip>-encoded hostnames with system resolver passthrough", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// DNS server
    Server {
        #[command(subcommand)]
        command: cli::server::ServerCommands,
    },
    /// Encoded hostname tools
    Host {
        #[command(subcommand)]
        command: cli::host::HostCommands,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Without -v: only WARN and ERROR
    // With -v: per-query INFO lines
    // With RUST_LOG set: whatever it asks for
    if std::env::var("RUST_LOG").is_err() {
        use tracing_subscriber::EnvFilter;

        let filter = if cli.verbose {
            EnvFilter::new("pwdns=info")
        } else {
            EnvFilter::new("pwdns=warn")
        };

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_target(true)
            .init();
    }

    match cli.command {
        Commands::Server { command } => {
            cli::server::execute(command).await?;
        }
        Commands::Host { command } => {
            cli::host::execute(command).await?;
        }
    }

    Ok(())
}
