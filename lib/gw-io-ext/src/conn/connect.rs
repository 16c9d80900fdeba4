/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::net::SocketAddr;
use std::sync::atomic::Ordering;

use tokio::net::TcpStream;

use super::{Connection, ConnectionError, ConnectionRole, ConnectionState, operation_aborted};

impl Connection {
    /// Connect to `addr`, only allowed once per connection.
    ///
    /// On success the state moves to `Successful` before `on_connected` runs, and both
    /// endpoints are recorded. On failure the state moves to `Failed`.
    pub fn connect<S, E>(
        &self,
        addr: SocketAddr,
        on_connected: S,
        on_connect_error: E,
    ) -> Result<(), ConnectionError>
    where
        S: FnOnce(&Connection) + Send + 'static,
        E: FnOnce(io::Error) + Send + 'static,
    {
        if self.role() != ConnectionRole::ClientSideOutbound {
            return Err(ConnectionError::InvalidOperation(
                "connect on a non outbound connection",
            ));
        }
        if self.inner.connect_invoked.swap(true, Ordering::SeqCst) {
            return Err(ConnectionError::InvalidOperation("connect called twice"));
        }
        let guard = self.begin_op()?;

        let conn = self.clone();
        tokio::spawn(async move {
            let r = tokio::select! {
                biased;

                _ = conn.inner.cancel.cancelled() => Err(operation_aborted()),
                r = connect_to(addr) => r,
            };
            let r = r.and_then(|stream| conn.attach_stream(stream));
            match r {
                Ok(_) => {
                    if conn.advance_state(ConnectionState::NotAttempted, ConnectionState::Successful)
                    {
                        on_connected(&conn);
                    } else {
                        on_connect_error(operation_aborted());
                    }
                }
                Err(e) => {
                    conn.advance_state(ConnectionState::NotAttempted, ConnectionState::Failed);
                    on_connect_error(e);
                }
            }
            drop(guard);
        });
        Ok(())
    }

    /// Take over an established stream, the write side is owned by a writer task from now on.
    pub(super) fn attach_stream(&self, stream: TcpStream) -> io::Result<()> {
        let local_addr = stream.local_addr()?;
        let peer_addr = stream.peer_addr()?;
        let _ = self
            .inner
            .local_addr
            .set(gw_socket::util::native_socket_addr(local_addr));
        let _ = self
            .inner
            .peer_addr
            .set(gw_socket::util::native_socket_addr(peer_addr));

        let writer_guard = self.begin_op().map_err(|_| operation_aborted())?;
        let (read_half, write_half) = stream.into_split();
        let sender = self.spawn_writer(write_half, writer_guard);
        *self.inner.reader.lock().unwrap() = Some(read_half);
        *self.inner.writer.lock().unwrap() = Some(sender);

        // close() may have run before the halves were in place
        if self.is_closing() {
            drop(self.inner.writer.lock().unwrap().take());
            drop(self.inner.reader.lock().unwrap().take());
            return Err(operation_aborted());
        }
        Ok(())
    }
}

async fn connect_to(addr: SocketAddr) -> io::Result<TcpStream> {
    let socket = gw_socket::tcp::new_socket_to(addr.ip(), true)?;
    socket.connect(addr).await
}
