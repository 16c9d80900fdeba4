/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::sync::atomic::Ordering;

use tokio::io::AsyncReadExt;

use super::{Connection, ConnectionError};

impl Connection {
    /// Keep receiving until EOF, error or close.
    ///
    /// `on_data` is called with each non-empty chunk, and the next receive is only armed
    /// after it returns. EOF closes the connection. An error is given to
    /// `on_receive_error` and then the connection is closed.
    pub fn receive<D, E>(&self, on_data: D, on_receive_error: E) -> Result<(), ConnectionError>
    where
        D: FnMut(&[u8]) + Send + 'static,
        E: FnOnce(io::Error) + Send + 'static,
    {
        self.start_receive(on_data, on_receive_error)
    }

    /// Do not re-arm the receive while `peer` has more than `high_water` bytes waiting
    /// to be sent. This may be set before or after `receive` is called.
    pub fn throttle_receive(&self, peer: &Connection, high_water: usize) {
        *self.inner.receive_throttle.lock().unwrap() = Some((peer.clone(), high_water));
        if self.is_closing() {
            // close may have missed it
            drop(self.inner.receive_throttle.lock().unwrap().take());
        }
    }

    fn receive_throttle(&self) -> Option<(Connection, usize)> {
        self.inner.receive_throttle.lock().unwrap().clone()
    }

    fn start_receive<D, E>(
        &self,
        mut on_data: D,
        on_receive_error: E,
    ) -> Result<(), ConnectionError>
    where
        D: FnMut(&[u8]) + Send + 'static,
        E: FnOnce(io::Error) + Send + 'static,
    {
        self.check_established()?;
        if self.inner.receive_armed.swap(true, Ordering::SeqCst) {
            return Err(ConnectionError::InvalidOperation("receive already armed"));
        }
        let guard = self.begin_op()?;
        let Some(mut reader) = self.inner.reader.lock().unwrap().take() else {
            return Err(ConnectionError::Closed);
        };

        let conn = self.clone();
        tokio::spawn(async move {
            let mut guard = guard;
            let mut on_receive_error = Some(on_receive_error);
            loop {
                if let Some((peer, high_water)) = conn.receive_throttle() {
                    tokio::select! {
                        biased;

                        _ = conn.inner.cancel.cancelled() => break,
                        _ = peer.wait_send_below(high_water) => {}
                    }
                }

                let mut buf = conn.inner.receive_pool.pop();
                let r = tokio::select! {
                    biased;

                    _ = conn.inner.cancel.cancelled() => break,
                    r = reader.read(buf.as_mut_slice()) => r,
                };
                match r {
                    Ok(0) => {
                        conn.close();
                        break;
                    }
                    Ok(n) => on_data(buf.filled(n)),
                    Err(e) => {
                        if let Some(f) = on_receive_error.take() {
                            f(e);
                        }
                        conn.close();
                        break;
                    }
                }
                drop(buf);

                guard = match conn.begin_op() {
                    Ok(next) => next,
                    Err(_) => break,
                };
            }
            drop(reader);
            drop(guard);
        });
        Ok(())
    }
}
