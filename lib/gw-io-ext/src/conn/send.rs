/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::sync::atomic::Ordering;
use std::time::Duration;

use bytes::Bytes;
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::mpsc;

use super::{Connection, ConnectionError, OperationGuard};

/// Queued data still gets this long to be written out after `close()`.
const CLOSE_FLUSH_TIMEOUT: Duration = Duration::from_secs(10);

pub(crate) struct SendRequest {
    data: Bytes,
    on_sent: Box<dyn FnOnce(usize) + Send>,
    on_error: Box<dyn FnOnce(io::Error) + Send>,
    guard: OperationGuard,
}

impl Connection {
    /// Queue `data` to be written, in order with all previous sends.
    ///
    /// `on_sent` gets the number of bytes written. On a write error, `on_send_error` is
    /// called and then the connection is closed. Use `Bytes::slice` to send part of a
    /// buffer.
    pub fn send<S, E>(&self, data: Bytes, on_sent: S, on_send_error: E) -> Result<(), ConnectionError>
    where
        S: FnOnce(usize) + Send + 'static,
        E: FnOnce(io::Error) + Send + 'static,
    {
        self.check_established()?;
        let guard = self.begin_op()?;
        let Some(sender) = self.inner.writer.lock().unwrap().clone() else {
            return Err(ConnectionError::Closed);
        };

        let len = data.len();
        self.inner.queued_send_bytes.fetch_add(len, Ordering::SeqCst);
        let req = SendRequest {
            data,
            on_sent: Box::new(on_sent),
            on_error: Box::new(on_send_error),
            guard,
        };
        if sender.send(req).is_err() {
            self.finish_queued(len);
            return Err(ConnectionError::Closed);
        }
        Ok(())
    }

    fn finish_queued(&self, len: usize) {
        self.inner.queued_send_bytes.fetch_sub(len, Ordering::SeqCst);
        self.inner.send_progress.notify_waiters();
    }

    /// Wait until at most `high_water` bytes are queued, or the connection is closing.
    pub(crate) async fn wait_send_below(&self, high_water: usize) {
        loop {
            let notified = self.inner.send_progress.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.queued_send_bytes() <= high_water || self.is_closing() {
                return;
            }
            notified.await;
        }
    }

    pub(super) fn spawn_writer(
        &self,
        writer: OwnedWriteHalf,
        guard: OperationGuard,
    ) -> mpsc::UnboundedSender<SendRequest> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let conn = self.clone();
        tokio::spawn(async move {
            conn.run_writer(writer, receiver).await;
            drop(guard);
        });
        sender
    }

    async fn run_writer(
        &self,
        mut writer: OwnedWriteHalf,
        mut receiver: mpsc::UnboundedReceiver<SendRequest>,
    ) {
        while let Some(req) = receiver.recv().await {
            let len = req.data.len();
            let r = self.write_data(&mut writer, &req.data).await;
            self.finish_queued(len);
            match r {
                Ok(_) => (req.on_sent)(len),
                Err(e) => {
                    (req.on_error)(e);
                    drop(req.guard);
                    self.close();
                    // the sender has been dropped by close(), fail all the queued ones
                    while let Some(req) = receiver.recv().await {
                        self.finish_queued(req.data.len());
                        (req.on_error)(io::ErrorKind::BrokenPipe.into());
                    }
                    return;
                }
            }
        }
        let _ = tokio::time::timeout(CLOSE_FLUSH_TIMEOUT, writer.shutdown()).await;
    }

    async fn write_data(&self, writer: &mut OwnedWriteHalf, data: &[u8]) -> io::Result<()> {
        let write = writer.write_all(data);
        tokio::pin!(write);
        tokio::select! {
            r = &mut write => return r,
            _ = self.inner.cancel.cancelled() => {}
        }
        match tokio::time::timeout(CLOSE_FLUSH_TIMEOUT, write).await {
            Ok(r) => r,
            Err(_) => Err(io::Error::new(
                io::ErrorKind::TimedOut,
                "timed out to flush data after close",
            )),
        }
    }
}
