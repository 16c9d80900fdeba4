/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicIsize, AtomicU8, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use tokio::net::TcpListener;
use tokio::net::tcp::OwnedReadHalf;
use tokio::sync::{Notify, mpsc};
use tokio_util::sync::CancellationToken;

use gw_types::net::TcpListenConfig;

use crate::ReceiveBufferPool;

mod error;
pub use error::ConnectionError;
use error::operation_aborted;

mod state;
use state::OPERATIONS_CLOSED;
pub use state::{ConnectionRole, ConnectionState};

mod accept;
mod connect;
mod receive;
mod send;
use send::SendRequest;

#[cfg(test)]
mod tests;

type CloseCallback = Box<dyn FnOnce(&Connection) + Send>;

struct ConnectionInner {
    role: ConnectionRole,
    state: AtomicU8,
    operations: AtomicIsize,
    close_requested: AtomicBool,
    connect_invoked: AtomicBool,
    receive_armed: AtomicBool,
    local_addr: OnceLock<SocketAddr>,
    peer_addr: OnceLock<SocketAddr>,
    cancel: CancellationToken,
    close_callbacks: Mutex<Vec<CloseCallback>>,
    listener: Mutex<Option<TcpListener>>,
    reader: Mutex<Option<OwnedReadHalf>>,
    writer: Mutex<Option<mpsc::UnboundedSender<SendRequest>>>,
    queued_send_bytes: AtomicUsize,
    send_progress: Notify,
    receive_throttle: Mutex<Option<(Connection, usize)>>,
    receive_pool: Arc<ReceiveBufferPool>,
}

/// One socket endpoint with an explicit lifecycle.
///
/// All I/O is started by the initiators (`accept`, `connect`, `receive`, `send`), which
/// return at once and report the result through callbacks running on the tokio runtime.
/// Each pending operation holds one count of the in-flight operation counter, and the
/// close callbacks run exactly once, after `close()` has been called and the counter
/// drained to zero.
#[derive(Clone)]
pub struct Connection {
    inner: Arc<ConnectionInner>,
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("role", &self.inner.role)
            .field("state", &self.state())
            .field("local_addr", &self.local_addr())
            .field("peer_addr", &self.peer_addr())
            .finish()
    }
}

/// Keeps one in-flight operation counted until dropped.
pub(crate) struct OperationGuard {
    conn: Connection,
}

impl Drop for OperationGuard {
    fn drop(&mut self) {
        self.conn.end_op();
    }
}

impl Connection {
    fn new(role: ConnectionRole, state: ConnectionState, pool: Arc<ReceiveBufferPool>) -> Self {
        Connection {
            inner: Arc::new(ConnectionInner {
                role,
                state: AtomicU8::new(state as u8),
                operations: AtomicIsize::new(0),
                close_requested: AtomicBool::new(false),
                connect_invoked: AtomicBool::new(false),
                receive_armed: AtomicBool::new(false),
                local_addr: OnceLock::new(),
                peer_addr: OnceLock::new(),
                cancel: CancellationToken::new(),
                close_callbacks: Mutex::new(Vec::new()),
                listener: Mutex::new(None),
                reader: Mutex::new(None),
                writer: Mutex::new(None),
                queued_send_bytes: AtomicUsize::new(0),
                send_progress: Notify::new(),
                receive_throttle: Mutex::new(None),
                receive_pool: pool,
            }),
        }
    }

    /// Create a listening connection. Must be called inside a tokio runtime.
    pub fn bind_listener(
        config: &TcpListenConfig,
        pool: Arc<ReceiveBufferPool>,
    ) -> io::Result<Self> {
        let listener = gw_socket::tcp::new_listen_to(config)?;
        let local_addr = listener.local_addr()?;
        let conn = Connection::new(ConnectionRole::Listener, ConnectionState::Successful, pool);
        let _ = conn.inner.local_addr.set(local_addr);
        *conn.inner.listener.lock().unwrap() = Some(listener);
        Ok(conn)
    }

    /// Create an outbound connection, which should be followed by a call to `connect`.
    pub fn new_outbound(pool: Arc<ReceiveBufferPool>) -> Self {
        Connection::new(
            ConnectionRole::ClientSideOutbound,
            ConnectionState::NotAttempted,
            pool,
        )
    }

    #[inline]
    pub fn role(&self) -> ConnectionRole {
        self.inner.role
    }

    #[inline]
    pub fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.inner.state.load(Ordering::SeqCst))
    }

    #[inline]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.inner.local_addr.get().copied()
    }

    #[inline]
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.inner.peer_addr.get().copied()
    }

    /// Number of in-flight operations, 0 once closed.
    pub fn active_operations(&self) -> usize {
        let n = self.inner.operations.load(Ordering::SeqCst);
        usize::try_from(n).unwrap_or(0)
    }

    #[inline]
    pub fn is_closing(&self) -> bool {
        self.inner.close_requested.load(Ordering::SeqCst)
    }

    /// Bytes handed to `send` but not yet written to the socket.
    #[inline]
    pub fn queued_send_bytes(&self) -> usize {
        self.inner.queued_send_bytes.load(Ordering::SeqCst)
    }

    /// Register a callback to run once the connection is fully closed.
    ///
    /// Callbacks run in registration order. If the connection is already closed, the
    /// callback runs at once in the calling thread.
    pub fn add_close_callback<F>(&self, f: F)
    where
        F: FnOnce(&Connection) + Send + 'static,
    {
        self.inner.close_callbacks.lock().unwrap().push(Box::new(f));
        if self.state() == ConnectionState::Closed {
            self.run_close_callbacks();
        }
    }

    fn run_close_callbacks(&self) {
        let callbacks = std::mem::take(&mut *self.inner.close_callbacks.lock().unwrap());
        for cb in callbacks {
            cb(self);
        }
    }

    /// Request the connection to be closed, a second call is a no-op.
    ///
    /// Pending accept and receive operations are cancelled, queued sends are flushed before
    /// the write side is shut down. The close callbacks run when the last in-flight
    /// operation is done, which may be inside this call.
    pub fn close(&self) {
        if self.inner.close_requested.swap(true, Ordering::SeqCst) {
            return;
        }
        self.inner
            .state
            .fetch_max(ConnectionState::ClosePending as u8, Ordering::SeqCst);

        self.inner.cancel.cancel();
        // the writer task will shut down the write side after the queued data
        drop(self.inner.writer.lock().unwrap().take());
        // not owned by any operation yet
        drop(self.inner.listener.lock().unwrap().take());
        drop(self.inner.reader.lock().unwrap().take());
        drop(self.inner.receive_throttle.lock().unwrap().take());
        self.inner.send_progress.notify_waiters();

        self.try_finalize();
    }

    pub(crate) fn begin_op(&self) -> Result<OperationGuard, ConnectionError> {
        let mut cur = self.inner.operations.load(Ordering::SeqCst);
        loop {
            if cur < 0 || self.is_closing() {
                return Err(ConnectionError::Closed);
            }
            match self.inner.operations.compare_exchange_weak(
                cur,
                cur + 1,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => return Ok(OperationGuard { conn: self.clone() }),
                Err(v) => cur = v,
            }
        }
    }

    fn end_op(&self) {
        let prev = self.inner.operations.fetch_sub(1, Ordering::SeqCst);
        debug_assert!(prev > 0);
        if prev == 1 && self.state() == ConnectionState::ClosePending {
            self.try_finalize();
        }
    }

    /// Arm the final transition, only the caller which swaps in the sentinel runs the
    /// close callbacks.
    fn try_finalize(&self) {
        if self
            .inner
            .operations
            .compare_exchange(0, OPERATIONS_CLOSED, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return;
        }
        self.inner
            .state
            .store(ConnectionState::Closed as u8, Ordering::SeqCst);
        self.run_close_callbacks();
    }

    /// Only used for the `connect` result.
    fn advance_state(&self, from: ConnectionState, to: ConnectionState) -> bool {
        self.inner
            .state
            .compare_exchange(from as u8, to as u8, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    fn check_established(&self) -> Result<(), ConnectionError> {
        match self.state() {
            ConnectionState::Successful => {
                if self.is_closing() {
                    Err(ConnectionError::Closed)
                } else {
                    Ok(())
                }
            }
            ConnectionState::NotAttempted => Err(ConnectionError::InvalidOperation(
                "connection not established yet",
            )),
            ConnectionState::Failed => {
                Err(ConnectionError::InvalidOperation("connection failed"))
            }
            ConnectionState::ClosePending | ConnectionState::Closed => {
                Err(ConnectionError::Closed)
            }
        }
    }
}
