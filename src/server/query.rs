// Copyright 2025 pwdns Contributors
// Licensed under GPL-3.0

//! Query classification and answer construction
//!
//! Names are classified in a fixed priority order:
//!
//! 1. encoded hostname (`pwd10_0_0_1...`) → synthetic A record
//! 2. exactly `localhost.` → `127.0.0.1`
//! 3. any other name → delegated to the [`HostResolver`]
//! 4. no question → decline
//!
//! Declining means no response is written at all, so the client falls back to
//! the next nameserver it has configured instead of caching an error.

use crate::constants::{ANSWER_TTL, LOCALHOST_ADDR, LOCALHOST_NAME};
use crate::hostname::EncodedHost;
use crate::resolver::HostResolver;
use hickory_proto::rr::rdata::{A, AAAA};
use hickory_proto::rr::{Name, RData, Record};
use std::net::IpAddr;
use std::sync::Arc;

/// Result of handling one question
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Write an authoritative response carrying these records
    Answer(Vec<Record>),
    /// Write nothing
    Decline(Decline),
}

/// Why no response is written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decline {
    NoQuestion,
    MalformedAddress,
    LookupFailed,
}

/// Stateless per-query decision logic shared by every in-flight request
#[derive(Clone)]
pub struct QueryHandler {
    resolver: Arc<dyn HostResolver>,
}

impl QueryHandler {
    pub fn new(resolver: Arc<dyn HostResolver>) -> Self {
        Self { resolver }
    }

    /// Decide the answer for the first question of a request, if there is one
    pub async fn answer(&self, question: Option<&Name>) -> Outcome {
        let Some(name) = question else {
            tracing::info!("Got DNS request without any question");
            return Outcome::Decline(Decline::NoQuestion);
        };

        let name_str = name.to_ascii();

        if let Some(host) = EncodedHost::parse(&name_str) {
            return match host.address() {
                Ok(ip) => {
                    tracing::debug!(
                        "Encoded host {} -> {} (suffixes: {:?})",
                        name_str,
                        ip,
                        host.suffixes()
                    );
                    Outcome::Answer(vec![address_record(name, IpAddr::V4(ip))])
                }
                Err(e) => {
                    tracing::warn!("Ignoring query for {}: {}", name_str, e);
                    Outcome::Decline(Decline::MalformedAddress)
                }
            };
        }

        if name_str == LOCALHOST_NAME {
            tracing::info!(
                "Asked for [{}], returning [{}] without lookup",
                LOCALHOST_NAME,
                LOCALHOST_ADDR
            );
            return Outcome::Answer(vec![address_record(name, IpAddr::V4(LOCALHOST_ADDR))]);
        }

        tracing::info!("Not an encoded host, looking up [{}]", name_str);
        match self.resolver.lookup_ip(&name_str).await {
            Ok(ips) => {
                tracing::info!("Looked up [{}], got {:?}", name_str, ips);
                let records = ips.into_iter().map(|ip| address_record(name, ip)).collect();
                Outcome::Answer(records)
            }
            Err(e) => {
                tracing::info!("No answer for [{}]: {}", name_str, e);
                Outcome::Decline(Decline::LookupFailed)
            }
        }
    }
}

/// A record for IPv4 and IPv4-mapped IPv6 addresses, AAAA for the rest
fn address_record(name: &Name, ip: IpAddr) -> Record {
    let rdata = match ip {
        IpAddr::V4(v4) => RData::A(A(v4)),
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => RData::A(A(v4)),
            None => RData::AAAA(AAAA(v6)),
        },
    };
    Record::from_rdata(name.clone(), ANSWER_TTL, rdata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::testing::StaticResolver;
    use hickory_proto::rr::{DNSClass, RecordType};
    use std::net::{Ipv4Addr, Ipv6Addr};

    fn handler(resolver: StaticResolver) -> (QueryHandler, Arc<StaticResolver>) {
        let resolver = Arc::new(resolver);
        (QueryHandler::new(resolver.clone()), resolver)
    }

    fn v4(octets: [u8; 4]) -> IpAddr {
        IpAddr::from(octets)
    }

    fn name(s: &str) -> Name {
        Name::from_ascii(s).unwrap()
    }

    fn addresses(outcome: &Outcome) -> Vec<IpAddr> {
        let Outcome::Answer(records) = outcome else {
            panic!("expected an answer, got {:?}", outcome);
        };
        records
            .iter()
            .map(|record| match record.data() {
                Some(RData::A(a)) => IpAddr::V4(a.0),
                Some(RData::AAAA(aaaa)) => IpAddr::V6(aaaa.0),
                other => panic!("unexpected rdata {:?}", other),
            })
            .collect()
    }

    #[tokio::test]
    async fn test_encoded_host() {
        let (handler, resolver) = handler(StaticResolver::default());
        let qname = name("pwd192_168_1_5-test.local.");

        let outcome = handler.answer(Some(&qname)).await;
        let Outcome::Answer(records) = &outcome else {
            panic!("expected an answer, got {:?}", outcome);
        };

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.name(), &qname);
        assert_eq!(record.ttl(), 60);
        assert_eq!(record.dns_class(), DNSClass::IN);
        assert_eq!(record.record_type(), RecordType::A);
        assert_eq!(addresses(&outcome), vec![v4([192, 168, 1, 5])]);
        assert_eq!(resolver.calls(), 0);
    }

    #[tokio::test]
    async fn test_encoded_host_all_sample_octets() {
        let (handler, _) = handler(StaticResolver::default());
        for (a, b, c, d) in [(0u8, 0u8, 0u8, 0u8), (1, 22, 133, 255), (255, 255, 255, 255), (10, 0, 0, 1)] {
            let qname = name(&format!("pwd{a}_{b}_{c}_{d}.example.com."));
            let outcome = handler.answer(Some(&qname)).await;
            assert_eq!(addresses(&outcome), vec![v4([a, b, c, d])]);
        }
    }

    #[tokio::test]
    async fn test_encoded_host_is_idempotent() {
        let (handler, _) = handler(StaticResolver::default());
        let qname = name("pwd10_0_0_1-abc.example.com.");
        let first = handler.answer(Some(&qname)).await;
        let second = handler.answer(Some(&qname)).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_encoded_host_wins_over_resolver() {
        let resolver = StaticResolver::default().with(
            "pwd10_0_0_1.example.com.",
            &[v4([192, 0, 2, 1])],
        );
        let (handler, resolver) = handler(resolver);

        let outcome = handler.answer(Some(&name("pwd10_0_0_1.example.com."))).await;
        assert_eq!(addresses(&outcome), vec![v4([10, 0, 0, 1])]);
        assert_eq!(resolver.calls(), 0);
    }

    #[tokio::test]
    async fn test_malformed_encoded_address_declines() {
        let (handler, resolver) = handler(StaticResolver::default());
        let outcome = handler.answer(Some(&name("pwd300_1_1_1.example.com."))).await;
        assert_eq!(outcome, Outcome::Decline(Decline::MalformedAddress));
        assert_eq!(resolver.calls(), 0);
    }

    #[tokio::test]
    async fn test_localhost_shortcut() {
        let resolver =
            StaticResolver::default().with("localhost.", &[v4([192, 0, 2, 99])]);
        let (handler, resolver) = handler(resolver);

        let qname = name("localhost.");
        let outcome = handler.answer(Some(&qname)).await;
        let Outcome::Answer(records) = &outcome else {
            panic!("expected an answer, got {:?}", outcome);
        };
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name(), &qname);
        assert_eq!(records[0].ttl(), 60);
        assert_eq!(addresses(&outcome), vec![IpAddr::V4(Ipv4Addr::LOCALHOST)]);
        assert_eq!(resolver.calls(), 0);
    }

    #[tokio::test]
    async fn test_delegated_lookup_preserves_order_and_family() {
        let v6: Ipv6Addr = "2001:db8::1".parse().unwrap();
        let mapped: Ipv6Addr = "::ffff:198.51.100.7".parse().unwrap();
        let resolver = StaticResolver::default().with(
            "example.com.",
            &[
                IpAddr::V6(v6),
                v4([93, 184, 216, 34]),
                IpAddr::V6(mapped),
            ],
        );
        let (handler, resolver) = handler(resolver);

        let outcome = handler.answer(Some(&name("example.com."))).await;
        let Outcome::Answer(records) = &outcome else {
            panic!("expected an answer, got {:?}", outcome);
        };

        let types: Vec<RecordType> = records.iter().map(|r| r.record_type()).collect();
        assert_eq!(types, vec![RecordType::AAAA, RecordType::A, RecordType::A]);
        assert!(records.iter().all(|r| r.ttl() == 60));
        assert_eq!(
            addresses(&outcome),
            vec![
                IpAddr::V6(v6),
                v4([93, 184, 216, 34]),
                v4([198, 51, 100, 7]),
            ]
        );
        assert_eq!(resolver.calls(), 1);
    }

    #[tokio::test]
    async fn test_failed_lookup_declines() {
        let (handler, resolver) = handler(StaticResolver::default());
        let outcome = handler.answer(Some(&name("unknown.example."))).await;
        assert_eq!(outcome, Outcome::Decline(Decline::LookupFailed));
        assert_eq!(resolver.calls(), 1);
    }

    #[tokio::test]
    async fn test_no_question_declines() {
        let (handler, resolver) = handler(StaticResolver::default());
        let outcome = handler.answer(None).await;
        assert_eq!(outcome, Outcome::Decline(Decline::NoQuestion));
        assert_eq!(resolver.calls(), 0);
    }

    #[tokio::test]
    async fn test_near_miss_names_are_delegated() {
        let resolver = StaticResolver::default()
            .with("pwd1_2_3.example.com.", &[v4([192, 0, 2, 3])])
            .with("www.pwd1_2_3_4.example.com.", &[v4([192, 0, 2, 4])]);
        let (handler, resolver) = handler(resolver);

        let outcome = handler.answer(Some(&name("pwd1_2_3.example.com."))).await;
        assert_eq!(addresses(&outcome), vec![v4([192, 0, 2, 3])]);

        let outcome = handler
            .answer(Some(&name("www.pwd1_2_3_4.example.com.")))
            .await;
        assert_eq!(addresses(&outcome), vec![v4([192, 0, 2, 4])]);

        assert_eq!(resolver.calls(), 2);
    }
}
