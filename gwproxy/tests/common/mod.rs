/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

#![allow(dead_code)]

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

use gw_resolver::{ResolveError, ResolvedRecord, Resolver};
use gw_types::net::TcpListenConfig;

use gwproxy::config::server::ServerConfig;
use gwproxy::serve::GatewayServer;

pub const WAIT: Duration = Duration::from_secs(5);

pub const UNRESOLVABLE_DOMAIN: &str = "unresolvable.test";

/// Resolve every domain to the loopback address, except `UNRESOLVABLE_DOMAIN`.
pub struct StubResolver;

#[async_trait]
impl Resolver for StubResolver {
    async fn resolve(&self, domain: &str) -> Result<ResolvedRecord, ResolveError> {
        if domain == UNRESOLVABLE_DOMAIN {
            return Err(ResolveError::NotFound);
        }
        Ok(ResolvedRecord {
            ips: vec![IpAddr::V4(Ipv4Addr::LOCALHOST)],
            ttl: None,
        })
    }
}

pub fn local_server_config() -> ServerConfig {
    ServerConfig::new(TcpListenConfig::new(SocketAddr::new(
        IpAddr::V4(Ipv4Addr::LOCALHOST),
        0,
    )))
}

/// Start a gateway on a random loopback port, returning it with its listen address.
pub fn start_gateway(config: ServerConfig) -> (GatewayServer, SocketAddr) {
    let mut server = GatewayServer::new(Arc::new(config), Arc::new(StubResolver));
    server.start().unwrap();
    let addr = server.listen_addrs()[0];
    (server, addr)
}

pub async fn local_upstream() -> (TcpListener, u16) {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
    let port = listener.local_addr().unwrap().port();
    (listener, port)
}

pub async fn read_exact_n(stream: &mut TcpStream, n: usize) -> Vec<u8> {
    let mut buf = vec![0u8; n];
    timeout(WAIT, stream.read_exact(&mut buf))
        .await
        .unwrap()
        .unwrap();
    buf
}

/// Wait for the peer to close, failing if any data arrives first.
pub async fn expect_eof(stream: &mut TcpStream) {
    let mut buf = [0u8; 64];
    let r = timeout(WAIT, stream.read(&mut buf)).await.unwrap();
    match r {
        Ok(n) => assert_eq!(n, 0, "unexpected data {:?}", &buf[..n]),
        Err(e) => assert_eq!(e.kind(), std::io::ErrorKind::ConnectionReset),
    }
}

pub async fn echo_ping(client: &mut TcpStream, upstream: &mut TcpStream, data: &[u8]) {
    client.write_all(data).await.unwrap();
    let got = read_exact_n(upstream, data.len()).await;
    assert_eq!(got, data);

    upstream.write_all(data).await.unwrap();
    let got = read_exact_n(client, data.len()).await;
    assert_eq!(got, data);
}
