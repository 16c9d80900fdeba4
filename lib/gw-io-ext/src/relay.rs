/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

//! Bidirectional byte relay between two established connections.

use bytes::Bytes;

use crate::{Connection, ConnectionError};

/// A leg stops receiving while the other leg has more than this many bytes queued.
pub const RELAY_HIGH_WATER_MARK: usize = 256 * 1024;

/// Forward everything received on `a` to `b` and the other way round.
///
/// Closing either leg closes the other one. Data already queued by the closed leg is
/// still flushed to the other leg before its write side is shut down.
pub fn start(a: &Connection, b: &Connection) -> Result<(), ConnectionError> {
    link_close(a, b);
    forward(a, b)?;
    forward(b, a)
}

/// Like `start`, but `armed` is already receiving, and its receive callback should call
/// `forward_chunk(armed, other, data)` for every chunk from now on.
pub fn join(armed: &Connection, other: &Connection) -> Result<(), ConnectionError> {
    link_close(armed, other);
    armed.throttle_receive(other, RELAY_HIGH_WATER_MARK);
    forward(other, armed)
}

/// Send a chunk received on `from` to `to`, a failed send closes `from`.
pub fn forward_chunk(from: &Connection, to: &Connection, data: &[u8]) {
    let on_error_conn = from.clone();
    if to
        .send(
            Bytes::copy_from_slice(data),
            |_| {},
            move |_| on_error_conn.close(),
        )
        .is_err()
    {
        from.close();
    }
}

fn link_close(a: &Connection, b: &Connection) {
    let b_c = b.clone();
    a.add_close_callback(move |_| b_c.close());
    let a_c = a.clone();
    b.add_close_callback(move |_| a_c.close());
}

fn forward(from: &Connection, to: &Connection) -> Result<(), ConnectionError> {
    from.throttle_receive(to, RELAY_HIGH_WATER_MARK);
    let from_c = from.clone();
    let to_c = to.clone();
    from.receive(move |data| forward_chunk(&from_c, &to_c, data), |_| {})
        .inspect_err(|_| {
            from.close();
            to.close();
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr, SocketAddr};
    use std::time::Duration;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    use gw_types::net::TcpListenConfig;

    use crate::ReceiveBuffer;

    const WAIT: Duration = Duration::from_secs(10);

    async fn connected_pair(listener: &TcpListener) -> (Connection, TcpStream) {
        let addr = listener.local_addr().unwrap();
        let pool = ReceiveBuffer::new_pool(4096, 16);
        let conn = Connection::new_outbound(pool);
        let (tx, mut rx) = mpsc::unbounded_channel();
        conn.connect(
            addr,
            move |_| {
                let _ = tx.send(());
            },
            |e| panic!("connect failed: {e}"),
        )
        .unwrap();
        let (stream, _) = listener.accept().await.unwrap();
        timeout(WAIT, rx.recv()).await.unwrap().unwrap();
        (conn, stream)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn transparent() {
        let config = TcpListenConfig::new(SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0));
        let listener = gw_socket::tcp::new_listen_to(&config).unwrap();

        let (client_leg, mut client) = connected_pair(&listener).await;
        let (upstream_leg, mut upstream) = connected_pair(&listener).await;
        start(&client_leg, &upstream_leg).unwrap();

        let payload: Vec<u8> = (0..1024 * 1024).map(|i| (i % 251) as u8).collect();
        let payload_c = payload.clone();
        let writer = tokio::spawn(async move {
            client.write_all(&payload_c).await.unwrap();
            client
        });

        let mut received = vec![0u8; payload.len()];
        timeout(WAIT, upstream.read_exact(&mut received))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(received, payload);

        let mut client = writer.await.unwrap();
        upstream.write_all(b"response").await.unwrap();
        let mut buf = [0u8; 8];
        timeout(WAIT, client.read_exact(&mut buf))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(&buf, b"response");

        // EOF on one side tears down both legs
        drop(upstream);
        let mut rest = Vec::new();
        timeout(WAIT, client.read_to_end(&mut rest))
            .await
            .unwrap()
            .unwrap();
        assert!(rest.is_empty());
        assert!(client_leg.is_closing());
        assert!(upstream_leg.is_closing());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn join_armed() {
        let config = TcpListenConfig::new(SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0));
        let listener = gw_socket::tcp::new_listen_to(&config).unwrap();

        let (client_leg, mut client) = connected_pair(&listener).await;
        let (upstream_leg, mut upstream) = connected_pair(&listener).await;

        let from = client_leg.clone();
        let to = upstream_leg.clone();
        client_leg
            .receive(move |data| forward_chunk(&from, &to, data), |_| {})
            .unwrap();
        join(&client_leg, &upstream_leg).unwrap();

        client.write_all(b"ping").await.unwrap();
        let mut buf = [0u8; 4];
        timeout(WAIT, upstream.read_exact(&mut buf))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(&buf, b"ping");

        upstream.write_all(b"pong").await.unwrap();
        timeout(WAIT, client.read_exact(&mut buf))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(&buf, b"pong");

        drop(client);
        let mut rest = Vec::new();
        timeout(WAIT, upstream.read_to_end(&mut rest))
            .await
            .unwrap()
            .unwrap();
        assert!(rest.is_empty());
    }
}
