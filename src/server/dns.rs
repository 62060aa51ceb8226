// Copyright 2025 pwdns Contributors
// Licensed under GPL-3.0

//! DNS server answering encoded hostnames and passing everything else through
//!
//! The wire loop is owned here rather than delegated to a server framework:
//! requests with no question or with several questions must still reach the
//! handler, and a declined request must produce no bytes at all (a silent
//! UDP drop, or a closed TCP connection).

use super::query::{Outcome, QueryHandler};
use crate::resolver::{HostResolver, SystemResolver};
use anyhow::{Context, Result};
use hickory_proto::op::{Message, MessageType, ResponseCode};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream, UdpSocket};

/// Largest datagram accepted on UDP
const MAX_UDP_PACKET: usize = 4096;

/// DNS request handler for encoded hostnames
#[derive(Clone)]
pub struct PwdDnsHandler {
    queries: QueryHandler,
}

impl PwdDnsHandler {
    pub fn new(resolver: Arc<dyn HostResolver>) -> Self {
        Self {
            queries: QueryHandler::new(resolver),
        }
    }

    /// Build the wire reply for one raw request.
    ///
    /// `None` means nothing must be sent back: the request was unparseable,
    /// was itself a response, or the query handler declined it.
    pub async fn respond(&self, packet: &[u8], src: SocketAddr) -> Option<Vec<u8>> {
        let request = match Message::from_vec(packet) {
            Ok(message) => message,
            Err(e) => {
                tracing::debug!("Dropping unparseable DNS packet from {}: {}", src, e);
                return None;
            }
        };

        if request.message_type() != MessageType::Query {
            tracing::debug!("Dropping non-query DNS message from {}", src);
            return None;
        }

        // Only the first question is consulted
        let query = request.queries().first();
        if let Some(query) = query {
            tracing::debug!(
                "DNS query from {}: {} {:?}",
                src,
                query.name(),
                query.query_type()
            );
        }

        let records = match self.queries.answer(query.map(|q| q.name())).await {
            Outcome::Answer(records) => records,
            Outcome::Decline(reason) => {
                tracing::debug!("Declining request {} ({:?})", request.id(), reason);
                return None;
            }
        };

        let mut response = Message::new();
        response
            .set_id(request.id())
            .set_message_type(MessageType::Response)
            .set_op_code(request.op_code())
            .set_recursion_desired(request.recursion_desired())
            .set_checking_disabled(request.checking_disabled())
            .set_authoritative(true)
            .set_recursion_available(true)
            .set_response_code(ResponseCode::NoError);
        if let Some(query) = query {
            response.add_query(query.clone());
        }
        response.add_answers(records);

        match response.to_vec() {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                tracing::error!("Failed to encode DNS response: {}", e);
                None
            }
        }
    }
}

impl Default for PwdDnsHandler {
    fn default() -> Self {
        Self::new(Arc::new(SystemResolver))
    }
}

/// UDP socket and TCP listener sharing one address
pub struct DnsServer {
    handler: PwdDnsHandler,
    udp: Arc<UdpSocket>,
    tcp: TcpListener,
    tcp_timeout: Duration,
}

/// Bind UDP and TCP on `addr`.
///
/// TCP binds to the port UDP actually got, so port 0 yields one ephemeral
/// port for both transports.
pub async fn bind(
    addr: SocketAddr,
    handler: PwdDnsHandler,
    tcp_timeout: Duration,
) -> Result<DnsServer> {
    let udp = UdpSocket::bind(addr)
        .await
        .with_context(|| format!("Failed to bind DNS UDP socket on {}", addr))?;
    let bound = udp.local_addr().context("Failed to read UDP local address")?;

    let tcp = TcpListener::bind(bound)
        .await
        .with_context(|| format!("Failed to bind DNS TCP socket on {}", bound))?;

    Ok(DnsServer {
        handler,
        udp: Arc::new(udp),
        tcp,
        tcp_timeout,
    })
}

impl DnsServer {
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.udp
            .local_addr()
            .context("Failed to read DNS server local address")
    }

    /// Serve UDP and TCP until the task is dropped
    pub async fn serve(self) -> Result<()> {
        tokio::join!(
            serve_udp(self.handler.clone(), self.udp),
            serve_tcp(self.handler, self.tcp, self.tcp_timeout),
        );
        Ok(())
    }
}

async fn serve_udp(handler: PwdDnsHandler, socket: Arc<UdpSocket>) {
    let mut buf = vec![0u8; MAX_UDP_PACKET];
    loop {
        let (len, peer) = match socket.recv_from(&mut buf).await {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!("DNS UDP receive failed: {}", e);
                continue;
            }
        };

        // One task per request so a slow lookup never holds up the others
        let packet = buf[..len].to_vec();
        let handler = handler.clone();
        let socket = socket.clone();
        tokio::spawn(async move {
            if let Some(reply) = handler.respond(&packet, peer).await {
                if let Err(e) = socket.send_to(&reply, peer).await {
                    tracing::warn!("Failed to send DNS response to {}: {}", peer, e);
                }
            }
        });
    }
}

async fn serve_tcp(handler: PwdDnsHandler, listener: TcpListener, idle_timeout: Duration) {
    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                tracing::error!("Failed to accept DNS TCP connection: {}", e);
                continue;
            }
        };

        let handler = handler.clone();
        tokio::spawn(async move {
            serve_tcp_connection(handler, stream, peer, idle_timeout).await;
        });
    }
}

/// Length-prefixed request/response exchange on one connection.
///
/// Returning drops the stream, which closes the connection. That is how a
/// declined request is signalled on TCP.
async fn serve_tcp_connection(
    handler: PwdDnsHandler,
    mut stream: TcpStream,
    peer: SocketAddr,
    idle_timeout: Duration,
) {
    loop {
        let mut len_buf = [0u8; 2];
        match tokio::time::timeout(idle_timeout, stream.read_exact(&mut len_buf)).await {
            Ok(Ok(_)) => {}
            Ok(Err(_)) => return,
            Err(_) => {
                tracing::debug!("Closing idle DNS TCP connection from {}", peer);
                return;
            }
        }

        let mut packet = vec![0u8; u16::from_be_bytes(len_buf) as usize];
        match tokio::time::timeout(idle_timeout, stream.read_exact(&mut packet)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => {
                tracing::debug!("Truncated DNS TCP request from {}: {}", peer, e);
                return;
            }
            Err(_) => return,
        }

        let Some(reply) = handler.respond(&packet, peer).await else {
            return;
        };

        let Ok(reply_len) = u16::try_from(reply.len()) else {
            tracing::error!("DNS response for {} exceeds TCP frame size", peer);
            return;
        };

        let mut framed = Vec::with_capacity(reply.len() + 2);
        framed.extend_from_slice(&reply_len.to_be_bytes());
        framed.extend_from_slice(&reply);
        if let Err(e) = stream.write_all(&framed).await {
            tracing::warn!("Failed to send DNS response to {}: {}", peer, e);
            return;
        }
    }
}

/// Start the DNS server on the specified address and serve until it stops
pub async fn run(addr: SocketAddr, tcp_timeout: Duration) -> Result<()> {
    tracing::info!("DNS server starting on {}", addr);

    let server = bind(addr, PwdDnsHandler::default(), tcp_timeout).await?;

    tracing::info!("DNS server listening on {} (udp+tcp)", server.local_addr()?);

    server.serve().await.context("DNS server error")
}
