/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io;

use tokio::net::TcpStream;

use super::{Connection, ConnectionError, ConnectionRole, ConnectionState};

impl Connection {
    /// Keep accepting until the listener is closed.
    ///
    /// Each accepted connection is handed to `on_accepted` in state `Successful`, with one
    /// in-flight operation held for the duration of the callback. Accept errors go to
    /// `on_accept_error` and the loop goes on. `on_listener_closed` runs once the listener
    /// itself is fully closed.
    pub fn accept<A, E, C>(
        &self,
        mut on_accepted: A,
        mut on_accept_error: E,
        on_listener_closed: C,
    ) -> Result<(), ConnectionError>
    where
        A: FnMut(Connection) + Send + 'static,
        E: FnMut(io::Error) + Send + 'static,
        C: FnOnce(&Connection) + Send + 'static,
    {
        if self.role() != ConnectionRole::Listener {
            return Err(ConnectionError::InvalidOperation(
                "accept on a non listener connection",
            ));
        }
        let guard = self.begin_op()?;
        let Some(listener) = self.inner.listener.lock().unwrap().take() else {
            return Err(ConnectionError::InvalidOperation("accept already started"));
        };
        self.add_close_callback(on_listener_closed);

        let conn = self.clone();
        tokio::spawn(async move {
            let mut guard = guard;
            loop {
                let r = tokio::select! {
                    biased;

                    _ = conn.inner.cancel.cancelled() => break,
                    r = listener.accept() => r,
                };
                match r {
                    Ok((stream, _peer)) => match conn.new_accepted(stream) {
                        Ok(accepted) => match accepted.begin_op() {
                            Ok(accepted_guard) => {
                                on_accepted(accepted);
                                drop(accepted_guard);
                            }
                            Err(_) => accepted.close(),
                        },
                        Err(e) => on_accept_error(e),
                    },
                    Err(e) => on_accept_error(e),
                }

                guard = match conn.begin_op() {
                    Ok(next) => next,
                    Err(_) => break,
                };
            }
            drop(listener);
            drop(guard);
        });
        Ok(())
    }

    fn new_accepted(&self, stream: TcpStream) -> io::Result<Connection> {
        let conn = Connection::new(
            ConnectionRole::ServerSideAccepted,
            ConnectionState::Successful,
            self.inner.receive_pool.clone(),
        );
        conn.attach_stream(stream)?;
        Ok(conn)
    }
}
