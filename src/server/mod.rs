// Copyright 2025 pwdns Contributors
// Licensed under GPL-3.0

//! DNS server

pub mod dns;
pub mod query;

pub use dns::{bind, run as run_dns, DnsServer, PwdDnsHandler};
pub use query::{Decline, Outcome, QueryHandler};
