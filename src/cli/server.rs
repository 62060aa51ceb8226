// Copyright 2025 pwdns Contributors
// Licensed under GPL-3.0

//! DNS server commands

use anyhow::{Context, Result};
use clap::Subcommand;
use pwdns::{DEFAULT_LISTEN, DNS_PORT, TCP_TIMEOUT_SECS};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

#[derive(Subcommand)]
pub enum ServerCommands {
    /// Start the DNS server
    Start {
        /// Address to listen on (UDP and TCP)
        #[arg(long, default_value = DEFAULT_LISTEN)]
        listen: IpAddr,
        /// DNS port
        #[arg(long, default_value_t = DNS_PORT)]
        port: u16,
        /// Idle timeout for TCP connections, in seconds
        #[arg(long, default_value_t = TCP_TIMEOUT_SECS)]
        tcp_timeout: u64,
    },
    /// Show whether a server is bound on the DNS port
    Status {
        /// Address to check
        #[arg(long, default_value = "127.0.0.1")]
        listen: IpAddr,
        /// DNS port
        #[arg(long, default_value_t = DNS_PORT)]
        port: u16,
    },
}

pub async fn execute(command: ServerCommands) -> Result<()> {
    match command {
        ServerCommands::Start {
            listen,
            port,
            tcp_timeout,
        } => start_command(SocketAddr::new(listen, port), tcp_timeout).await,
        ServerCommands::Status { listen, port } => status_command(SocketAddr::new(listen, port)),
    }
}

async fn start_command(addr: SocketAddr, tcp_timeout_secs: u64) -> Result<()> {
    println!("Starting pwdns on {}", addr);

    tokio::select! {
        result = pwdns::run_dns(addr, Duration::from_secs(tcp_timeout_secs)) => {
            result.context("DNS server exited")?;
        }
        _ = tokio::signal::ctrl_c() => {
            println!("\nShutting down server...");
        }
    }

    println!("Server stopped.");

    Ok(())
}

fn status_command(addr: SocketAddr) -> Result<()> {
    println!("pwdns Server Status\n");

    if check_port_in_use(addr) {
        println!("  DNS server ({}): ✓ Running", addr);
    } else {
        println!("  DNS server ({}): ✗ Not running", addr);
        println!("\nStart the server with: pwdns server start");
    }

    Ok(())
}

/// Check if something is already bound on the address
fn check_port_in_use(addr: SocketAddr) -> bool {
    use std::net::UdpSocket;

    UdpSocket::bind(addr).is_err()
}
