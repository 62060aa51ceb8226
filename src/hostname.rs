// Copyright 2025 pwdns Contributors
// Licensed under GPL-3.0

//! Encoded hostname grammar
//!
//! An encoded hostname carries an IPv4 address in its first label:
//!
//! ```text
//! pwd10_0_0_1-abc.example.com.
//! ^^^ ^^^^^^^^ ^^^ ^^^^^^^^^^^^
//!  |     |      |       `- any domain suffix
//!  |     |      `- optional `-` suffix tokens (ignored)
//!  |     `- four groups of 1-3 digits joined by `_`
//!  `- literal prefix
//! ```

use crate::constants::{ENCODED_PREFIX, OCTET_SEPARATOR, SUFFIX_SEPARATOR};
use std::net::Ipv4Addr;
use thiserror::Error;

/// Errors produced while decoding or encoding hostnames
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostnameError {
    /// The label matched the grammar but the digits are not an IPv4 address
    #[error("encoded address {address:?} is not a valid IPv4 address")]
    InvalidAddress { address: String },

    /// A suffix token would break the label structure
    #[error("suffix token {suffix:?} must be non-empty and must not contain '.' or '-'")]
    InvalidSuffix { suffix: String },
}

/// The first label of a name that matched the encoded grammar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedHost<'a> {
    address: &'a str,
    suffixes: Vec<&'a str>,
}

impl<'a> EncodedHost<'a> {
    /// Match the first label of `name` against the encoded grammar.
    ///
    /// Returns `None` when the name is not an encoded hostname. A match only
    /// guarantees the shape of the label; octet ranges are checked by
    /// [`EncodedHost::address`].
    pub fn parse(name: &'a str) -> Option<Self> {
        let first_label = name.split('.').next()?;
        let rest = first_label.strip_prefix(ENCODED_PREFIX)?;

        let mut tokens = rest.split(SUFFIX_SEPARATOR);
        let address = tokens.next()?;
        if !is_address_token(address) {
            return None;
        }

        Some(Self {
            address,
            suffixes: tokens.collect(),
        })
    }

    /// The raw address token, octets still joined by `_`
    pub fn address_token(&self) -> &'a str {
        self.address
    }

    /// Suffix tokens following the address. They carry no meaning for the answer.
    pub fn suffixes(&self) -> &[&'a str] {
        &self.suffixes
    }

    /// Recover the IPv4 address the label encodes
    pub fn address(&self) -> Result<Ipv4Addr, HostnameError> {
        let dotted = self.address.replace(OCTET_SEPARATOR, ".");
        dotted
            .parse()
            .map_err(|_| HostnameError::InvalidAddress { address: dotted })
    }
}

/// Four groups of 1-3 ASCII digits separated by `_`
fn is_address_token(token: &str) -> bool {
    let mut groups = 0;
    for group in token.split(OCTET_SEPARATOR) {
        groups += 1;
        if groups > 4 || group.is_empty() || group.len() > 3 {
            return false;
        }
        if !group.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
    }
    groups == 4
}

/// Shortcut for `EncodedHost::parse(name)` followed by `address()`.
///
/// `None` means the name is not encoded; `Some(Err(_))` means it is encoded
/// but carries a malformed address.
pub fn decode(name: &str) -> Option<Result<Ipv4Addr, HostnameError>> {
    EncodedHost::parse(name).map(|host| host.address())
}

/// Build the encoded hostname for `address`.
///
/// `domain` is appended after a `.` unless it is empty; pass a dot-terminated
/// domain to get an FQDN.
pub fn encode(address: Ipv4Addr, suffixes: &[&str], domain: &str) -> Result<String, HostnameError> {
    let [a, b, c, d] = address.octets();
    let mut name = format!("{ENCODED_PREFIX}{a}_{b}_{c}_{d}");

    for suffix in suffixes {
        if suffix.is_empty() || suffix.contains('.') || suffix.contains(SUFFIX_SEPARATOR) {
            return Err(HostnameError::InvalidSuffix {
                suffix: suffix.to_string(),
            });
        }
        name.push(SUFFIX_SEPARATOR);
        name.push_str(suffix);
    }

    let domain = domain.trim_start_matches('.');
    if !domain.is_empty() {
        name.push('.');
        name.push_str(domain);
    }

    Ok(name)
}
