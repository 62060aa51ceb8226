// Copyright 2025 pwdns Contributors
// Licensed under GPL-3.0

//! Encoded hostname commands

use anyhow::{Context, Result};
use clap::Subcommand;
use pwdns::EncodedHost;
use serde::Serialize;
use std::net::Ipv4Addr;

#[derive(Subcommand)]
pub enum HostCommands {
    /// Show the address an encoded hostname answers with
    Decode {
        /// Hostname (e.g., pwd10_0_0_1-web.example.com.)
        name: String,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Build the encoded hostname for an IPv4 address
    Encode {
        /// IPv4 address
        address: Ipv4Addr,
        /// Suffix token appended after the address (repeatable)
        #[arg(long = "suffix")]
        suffixes: Vec<String>,
        /// Domain appended after the encoded label
        #[arg(long, default_value = "")]
        domain: String,
    },
}

#[derive(Serialize)]
struct DecodedHost<'a> {
    name: &'a str,
    address: Ipv4Addr,
    suffixes: &'a [&'a str],
}

pub async fn execute(command: HostCommands) -> Result<()> {
    match command {
        HostCommands::Decode { name, json } => decode_command(&name, json),
        HostCommands::Encode {
            address,
            suffixes,
            domain,
        } => encode_command(address, &suffixes, &domain),
    }
}

fn decode_command(name: &str, json: bool) -> Result<()> {
    let host = EncodedHost::parse(name)
        .with_context(|| format!("{} is not an encoded hostname", name))?;
    let address = host.address()?;

    if json {
        let decoded = DecodedHost {
            name,
            address,
            suffixes: host.suffixes(),
        };
        println!("{}", serde_json::to_string_pretty(&decoded)?);
        return Ok(());
    }

    println!("{} -> {}", name, address);
    if !host.suffixes().is_empty() {
        println!("  suffixes (ignored): {}", host.suffixes().join(", "));
    }

    Ok(())
}

fn encode_command(address: Ipv4Addr, suffixes: &[String], domain: &str) -> Result<()> {
    let suffixes: Vec<&str> = suffixes.iter().map(String::as_str).collect();
    let name = pwdns::encode(address, &suffixes, domain)?;
    println!("{}", name);
    Ok(())
}
