// Copyright 2025 pwdns Contributors
// Licensed under GPL-3.0

//! Delegated name resolution for names this server does not own

use async_trait::async_trait;
use std::net::IpAddr;
use thiserror::Error;

/// Failure of a delegated lookup
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("lookup of {name} failed: {source}")]
    Lookup {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no addresses found for {name}")]
    NoAddresses { name: String },
}

/// Resolves a name to every address bound to it
#[async_trait]
pub trait HostResolver: Send + Sync {
    /// Addresses are returned in the order the underlying resolver produced them.
    async fn lookup_ip(&self, name: &str) -> Result<Vec<IpAddr>, ResolveError>;
}

/// The platform resolver (getaddrinfo), run on tokio's blocking pool
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

#[async_trait]
impl HostResolver for SystemResolver {
    async fn lookup_ip(&self, name: &str) -> Result<Vec<IpAddr>, ResolveError> {
        let addrs = tokio::net::lookup_host((name, 0))
            .await
            .map_err(|source| ResolveError::Lookup {
                name: name.to_string(),
                source,
            })?;

        let ips: Vec<IpAddr> = addrs.map(|addr| addr.ip()).collect();
        if ips.is_empty() {
            return Err(ResolveError::NoAddresses {
                name: name.to_string(),
            });
        }

        Ok(ips)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_system_resolver_literal_address() {
        let ips = SystemResolver.lookup_ip("127.0.0.1").await.unwrap();
        assert_eq!(ips, vec![IpAddr::V4(std::net::Ipv4Addr::LOCALHOST)]);
    }

    #[tokio::test]
    async fn test_system_resolver_unknown_name() {
        let result = SystemResolver.lookup_ip("does-not-exist.invalid.").await;
        assert!(result.is_err());
    }
}
