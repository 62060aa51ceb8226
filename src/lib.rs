// Copyright 2025 pwdns Contributors
// Licensed under GPL-3.0

//! pwdns - DNS responder for address-encoded hostnames
//!
//! Names like `pwd10_0_0_1-web.example.com.` are answered authoritatively
//! with the address they carry (`10.0.0.1`). `localhost.` is answered with
//! `127.0.0.1`, and every other name is looked up through the system
//! resolver. When there is nothing to answer, no response is sent at all so
//! clients fall back to their next configured nameserver.

pub mod constants;
pub mod hostname;
pub mod resolver;
pub mod server;

pub use constants::*;

// Re-export commonly used types
pub use hostname::{decode, encode, EncodedHost, HostnameError};
pub use resolver::{HostResolver, ResolveError, SystemResolver};
pub use server::{run_dns, PwdDnsHandler, QueryHandler};
