/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use bytes::Bytes;
use tokio::io::AsyncReadExt;
use tokio::sync::mpsc;
use tokio::time::timeout;

use gw_types::net::TcpListenConfig;

use super::*;
use crate::ReceiveBuffer;

const WAIT: Duration = Duration::from_secs(5);

fn pool() -> Arc<ReceiveBufferPool> {
    ReceiveBuffer::new_pool(4096, 16)
}

fn local_listen_config() -> TcpListenConfig {
    TcpListenConfig::new(SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0))
}

fn count_close(conn: &Connection) -> Arc<AtomicUsize> {
    let count = Arc::new(AtomicUsize::new(0));
    let count_c = count.clone();
    conn.add_close_callback(move |_| {
        count_c.fetch_add(1, Ordering::SeqCst);
    });
    count
}

#[test]
fn close_once() {
    let conn = Connection::new_outbound(pool());
    let count = count_close(&conn);

    conn.close();
    conn.close();
    conn.close();
    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert_eq!(conn.state(), ConnectionState::Closed);
    assert_eq!(conn.active_operations(), 0);

    // late registration still runs, once
    let late = count_close(&conn);
    assert_eq!(late.load(Ordering::SeqCst), 1);
    conn.close();
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn ops_after_close_fail_fast() {
    let conn = Connection::new_outbound(pool());
    conn.close();

    assert!(conn.begin_op().is_err());
    assert_eq!(
        conn.send(Bytes::from_static(b"x"), |_| {}, |_| {}),
        Err(ConnectionError::Closed)
    );
    assert_eq!(
        conn.receive(|_| {}, |_| {}),
        Err(ConnectionError::Closed)
    );
    let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 1);
    assert_eq!(
        conn.connect(addr, |_| {}, |_| {}),
        Err(ConnectionError::Closed)
    );
}

#[test]
fn drain_before_close() {
    let conn = Connection::new_outbound(pool());
    let count = count_close(&conn);

    let g1 = conn.begin_op().unwrap();
    let g2 = conn.begin_op().unwrap();
    let g3 = conn.begin_op().unwrap();
    assert_eq!(conn.active_operations(), 3);

    conn.close();
    assert_eq!(conn.state(), ConnectionState::ClosePending);
    assert_eq!(count.load(Ordering::SeqCst), 0);

    drop(g1);
    drop(g2);
    assert_eq!(count.load(Ordering::SeqCst), 0);
    assert_eq!(conn.active_operations(), 1);

    drop(g3);
    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert_eq!(conn.state(), ConnectionState::Closed);
}

#[test]
fn concurrent_close() {
    for _ in 0..100 {
        let conn = Connection::new_outbound(pool());
        let count = count_close(&conn);

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let conn = conn.clone();
                thread::spawn(move || {
                    for _ in 0..50 {
                        if let Ok(guard) = conn.begin_op() {
                            thread::yield_now();
                            drop(guard);
                        }
                    }
                    if i % 2 == 0 {
                        conn.close();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(conn.state(), ConnectionState::Closed);
    }
}

#[test]
fn send_before_connect() {
    let conn = Connection::new_outbound(pool());
    assert!(matches!(
        conn.send(Bytes::from_static(b"x"), |_| {}, |_| {}),
        Err(ConnectionError::InvalidOperation(_))
    ));
    assert!(matches!(
        conn.receive(|_| {}, |_| {}),
        Err(ConnectionError::InvalidOperation(_))
    ));
    assert_eq!(conn.state(), ConnectionState::NotAttempted);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn double_connect() {
    let listener = Connection::bind_listener(&local_listen_config(), pool()).unwrap();
    let addr = listener.local_addr().unwrap();

    let (tx, mut rx) = mpsc::unbounded_channel();
    let conn = Connection::new_outbound(pool());
    conn.connect(
        addr,
        move |_| {
            let _ = tx.send(());
        },
        |_| {},
    )
    .unwrap();
    assert_eq!(
        conn.connect(addr, |_| {}, |_| {}),
        Err(ConnectionError::InvalidOperation("connect called twice"))
    );

    timeout(WAIT, rx.recv()).await.unwrap().unwrap();
    assert_eq!(conn.state(), ConnectionState::Successful);
    assert_eq!(conn.peer_addr(), Some(addr));
    assert!(conn.local_addr().is_some());

    // connecting is not a listener operation
    assert!(matches!(
        listener.connect(addr, |_| {}, |_| {}),
        Err(ConnectionError::InvalidOperation(_))
    ));
    conn.close();
    listener.close();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn connect_failed() {
    let addr = {
        let listener = gw_socket::tcp::new_std_listener(&local_listen_config()).unwrap();
        listener.local_addr().unwrap()
    };

    let (tx, mut rx) = mpsc::unbounded_channel();
    let conn = Connection::new_outbound(pool());
    conn.connect(
        addr,
        |_| {},
        move |e| {
            let _ = tx.send(e.kind());
        },
    )
    .unwrap();
    let kind = timeout(WAIT, rx.recv()).await.unwrap().unwrap();
    assert_eq!(kind, std::io::ErrorKind::ConnectionRefused);
    assert_eq!(conn.state(), ConnectionState::Failed);

    let count = count_close(&conn);
    conn.close();
    // the connect task may still hold its operation for a moment
    timeout(WAIT, async {
        while count.load(Ordering::SeqCst) == 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn echo_round_trip() {
    let listener = Connection::bind_listener(&local_listen_config(), pool()).unwrap();
    let addr = listener.local_addr().unwrap();

    let (closed_tx, mut closed_rx) = mpsc::unbounded_channel();
    let listener_closed_tx = closed_tx.clone();
    listener
        .accept(
            move |accepted| {
                assert_eq!(accepted.role(), ConnectionRole::ServerSideAccepted);
                assert_eq!(accepted.active_operations(), 2); // writer + accept callback
                let tx = closed_tx.clone();
                accepted.add_close_callback(move |_| {
                    let _ = tx.send("accepted");
                });
                let echo = accepted.clone();
                accepted
                    .receive(
                        move |data| {
                            let _ = echo.send(Bytes::copy_from_slice(data), |_| {}, |_| {});
                        },
                        |_| {},
                    )
                    .unwrap();
            },
            |_| {},
            move |_| {
                let _ = listener_closed_tx.send("listener");
            },
        )
        .unwrap();
    assert!(matches!(
        listener.accept(|_| {}, |_| {}, |_| {}),
        Err(ConnectionError::InvalidOperation(_))
    ));

    let (data_tx, mut data_rx) = mpsc::unbounded_channel::<Vec<u8>>();
    let conn = Connection::new_outbound(pool());
    conn.connect(
        addr,
        move |conn| {
            conn.receive(
                move |data| {
                    let _ = data_tx.send(data.to_vec());
                },
                |_| {},
            )
            .unwrap();
            conn.send(Bytes::from_static(b"hello "), |n| assert_eq!(n, 6), |_| {})
                .unwrap();
            conn.send(Bytes::from_static(b"gateway"), |_| {}, |_| {})
                .unwrap();
        },
        |e| panic!("connect failed: {e}"),
    )
    .unwrap();

    let mut received = Vec::new();
    while received.len() < 13 {
        let data = timeout(WAIT, data_rx.recv()).await.unwrap().unwrap();
        received.extend_from_slice(&data);
    }
    assert_eq!(received, b"hello gateway");
    assert!(matches!(
        conn.receive(|_| {}, |_| {}),
        Err(ConnectionError::InvalidOperation("receive already armed"))
    ));

    // the accepted side sees EOF and closes itself
    conn.close();
    let name = timeout(WAIT, closed_rx.recv()).await.unwrap().unwrap();
    assert_eq!(name, "accepted");

    listener.close();
    let name = timeout(WAIT, closed_rx.recv()).await.unwrap().unwrap();
    assert_eq!(name, "listener");
    assert_eq!(listener.state(), ConnectionState::Closed);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn queued_sends_flushed_on_close() {
    let listener = gw_socket::tcp::new_listen_to(&local_listen_config()).unwrap();
    let addr = listener.local_addr().unwrap();

    let (tx, mut rx) = mpsc::unbounded_channel();
    let conn = Connection::new_outbound(pool());
    conn.connect(
        addr,
        move |conn| {
            for _ in 0..64 {
                conn.send(Bytes::from(vec![b'a'; 1024]), |_| {}, |_| {})
                    .unwrap();
            }
            conn.close();
            let _ = tx.send(());
        },
        |_| {},
    )
    .unwrap();
    let count = count_close(&conn);

    let (mut stream, _) = listener.accept().await.unwrap();
    timeout(WAIT, rx.recv()).await.unwrap().unwrap();

    let mut data = Vec::new();
    timeout(WAIT, stream.read_to_end(&mut data))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(data.len(), 64 * 1024);

    timeout(WAIT, async {
        while count.load(Ordering::SeqCst) == 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();
    assert_eq!(conn.queued_send_bytes(), 0);
}
