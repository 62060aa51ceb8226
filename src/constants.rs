// Copyright 2025 pwdns Contributors
// Licensed under GPL-3.0

use std::net::Ipv4Addr;

/// Literal prefix every encoded hostname's first label starts with
pub const ENCODED_PREFIX: &str = "pwd";

/// Separates the octets inside an encoded label
pub const OCTET_SEPARATOR: char = '_';

/// Separates the address from the decorative suffix tokens
pub const SUFFIX_SEPARATOR: char = '-';

/// TTL, in seconds, of every answer record this server produces
pub const ANSWER_TTL: u32 = 60;

/// Name answered without consulting the system resolver
pub const LOCALHOST_NAME: &str = "localhost.";

/// Address returned for `localhost.`
pub const LOCALHOST_ADDR: Ipv4Addr = Ipv4Addr::LOCALHOST;

/// Default DNS listen port
pub const DNS_PORT: u16 = 53;

/// Default listen address for `server start`
pub const DEFAULT_LISTEN: &str = "0.0.0.0";

/// Default idle timeout for TCP DNS connections, in seconds
pub const TCP_TIMEOUT_SECS: u64 = 5;
