/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::mem;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use log::{debug, info};
use tokio_util::sync::CancellationToken;

use gw_dpi::{InspectVerdict, Protocol, ProtocolInspector};
use gw_io_ext::{ByteBuffer, Connection, relay};
use gw_resolver::resolve_upstream;
use gw_types::net::UpstreamAddr;

use super::handshake::{
    Handshake, HandshakeAction, HttpConnectHandshake, Socks5ConnectHandshake,
};
use super::{ServerContext, ServerTaskError};

enum SessionPhase {
    Inspecting(ProtocolInspector),
    Handshaking(Handshake),
    Connecting(Handshake),
    Relaying,
    Closed,
}

impl SessionPhase {
    fn is_finished(&self) -> bool {
        matches!(self, SessionPhase::Relaying | SessionPhase::Closed)
    }
}

struct SessionState {
    phase: SessionPhase,
    buf: ByteBuffer,
    upstream: Option<Connection>,
}

/// Work decided under the state lock, and run after it is released.
enum SessionTask {
    Reply(Bytes),
    Connect(UpstreamAddr),
    Fail {
        reply: Option<Bytes>,
        error: ServerTaskError,
    },
}

/// One accepted client connection, from the first byte to the end of the relay.
///
/// Connection callbacks may run inline, e.g. the close callbacks, so no connection is
/// closed or joined while the state lock is held.
pub(super) struct GatewaySession {
    ctx: Arc<ServerContext>,
    client: Connection,
    peer_addr: SocketAddr,
    state: Mutex<SessionState>,
    handshake_done: CancellationToken,
}

impl GatewaySession {
    pub(super) fn start(ctx: Arc<ServerContext>, client: Connection) {
        ctx.stats.inc_alive();
        let peer_addr = client
            .peer_addr()
            .unwrap_or(SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0));
        let session = Arc::new(GatewaySession {
            ctx,
            client,
            peer_addr,
            state: Mutex::new(SessionState {
                phase: SessionPhase::Inspecting(ProtocolInspector::default()),
                buf: ByteBuffer::new(),
                upstream: None,
            }),
            handshake_done: CancellationToken::new(),
        });
        debug!("session from {peer_addr} started");

        let s = session.clone();
        session.client.add_close_callback(move |_| s.on_client_closed());
        session.spawn_handshake_timer();

        let s = session.clone();
        let r = session.client.receive(
            move |data| s.on_client_data(data),
            move |e| debug!("session from {peer_addr} receive error: {e:?}"),
        );
        if let Err(e) = r {
            debug!("session from {peer_addr} unable to receive: {e}");
            session.client.close();
        }
    }

    fn spawn_handshake_timer(self: &Arc<Self>) {
        let session = Arc::downgrade(self);
        let done = self.handshake_done.clone();
        let timeout = self.ctx.config.handshake_timeout;
        tokio::spawn(async move {
            tokio::select! {
                _ = done.cancelled() => {}
                _ = tokio::time::sleep(timeout) => {
                    if let Some(session) = session.upgrade() {
                        session.on_handshake_timeout();
                    }
                }
            }
        });
    }

    fn on_client_data(self: &Arc<Self>, data: &[u8]) {
        let mut state = self.state.lock().unwrap();
        match state.phase {
            SessionPhase::Relaying => {
                let upstream = state.upstream.clone();
                drop(state);
                if let Some(upstream) = upstream {
                    relay::forward_chunk(&self.client, &upstream, data);
                }
                return;
            }
            SessionPhase::Closed => return,
            _ => {}
        }

        state.buf.append(data);
        let tasks = self.drive(&mut state);
        drop(state);
        self.run_tasks(tasks);
    }

    /// Feed the buffered client data to the inspector or the handshake, for as long as
    /// they make progress.
    fn drive(&self, state: &mut SessionState) -> Vec<SessionTask> {
        let mut tasks = Vec::new();
        loop {
            match mem::replace(&mut state.phase, SessionPhase::Closed) {
                SessionPhase::Inspecting(mut inspector) => {
                    match inspector.classify(&self.ctx.config.inspection, state.buf.as_slice()) {
                        InspectVerdict::Uncertain => {
                            state.phase = SessionPhase::Inspecting(inspector);
                            break;
                        }
                        InspectVerdict::Failed => {
                            tasks.push(SessionTask::Fail {
                                reply: None,
                                error: ServerTaskError::UnknownProtocol,
                            });
                            break;
                        }
                        InspectVerdict::Success(protocol) => {
                            debug!("session from {} detected {protocol}", self.peer_addr);
                            match self.new_handshake(protocol, &mut inspector, &mut state.buf) {
                                Some(handshake) => {
                                    state.phase = SessionPhase::Handshaking(handshake);
                                }
                                None => {
                                    tasks.push(SessionTask::Fail {
                                        reply: None,
                                        error: ServerTaskError::InvalidClientProtocol(
                                            "no handshake for the detected protocol",
                                        ),
                                    });
                                    break;
                                }
                            }
                        }
                    }
                }
                SessionPhase::Handshaking(mut handshake) => match handshake.on_data(&mut state.buf) {
                    HandshakeAction::NeedMoreData => {
                        state.phase = SessionPhase::Handshaking(handshake);
                        break;
                    }
                    HandshakeAction::Reply(data) => {
                        tasks.push(SessionTask::Reply(data));
                        state.phase = SessionPhase::Handshaking(handshake);
                    }
                    HandshakeAction::Connect(upstream) => {
                        debug!(
                            "session from {} {} to {upstream}",
                            self.peer_addr,
                            handshake.protocol()
                        );
                        // leftover bytes are early data for the upstream
                        if self.early_data_overflow(&state.buf) {
                            tasks.push(SessionTask::Fail {
                                reply: None,
                                error: ServerTaskError::EarlyDataOverflow,
                            });
                        } else {
                            tasks.push(SessionTask::Connect(upstream));
                            state.phase = SessionPhase::Connecting(handshake);
                        }
                        break;
                    }
                    HandshakeAction::Fail { reply, reason } => {
                        tasks.push(SessionTask::Fail {
                            reply,
                            error: ServerTaskError::InvalidClientProtocol(reason),
                        });
                        break;
                    }
                },
                phase @ SessionPhase::Connecting(_) => {
                    if self.early_data_overflow(&state.buf) {
                        tasks.push(SessionTask::Fail {
                            reply: None,
                            error: ServerTaskError::EarlyDataOverflow,
                        });
                    } else {
                        state.phase = phase;
                    }
                    break;
                }
                phase => {
                    state.phase = phase;
                    break;
                }
            }
        }
        tasks
    }

    fn new_handshake(
        &self,
        protocol: Protocol,
        inspector: &mut ProtocolInspector,
        buf: &mut ByteBuffer,
    ) -> Option<Handshake> {
        match protocol {
            Protocol::HttpConnect => {
                let request = inspector.take_http_connect_request()?;
                buf.consume(request.head_len());
                Some(Handshake::HttpConnect(HttpConnectHandshake::new(
                    request,
                    self.ctx.config.http_failure_reply,
                )))
            }
            Protocol::Socks5 => Some(Handshake::Socks5Connect(Socks5ConnectHandshake::new())),
            Protocol::Unknown => None,
        }
    }

    fn early_data_overflow(&self, buf: &ByteBuffer) -> bool {
        buf.len() > self.ctx.config.inspection.size_limit().http_connect_header()
    }

    fn run_tasks(self: &Arc<Self>, tasks: Vec<SessionTask>) {
        for task in tasks {
            match task {
                SessionTask::Reply(data) => {
                    let _ = self.client.send(data, |_| {}, |_| {});
                }
                SessionTask::Connect(upstream) => self.connect_upstream(upstream),
                SessionTask::Fail { reply, error } => {
                    self.fail(reply, error);
                    return;
                }
            }
        }
    }

    fn connect_upstream(self: &Arc<Self>, upstream: UpstreamAddr) {
        let session = self.clone();
        tokio::spawn(async move {
            let addr = match resolve_upstream(session.ctx.resolver.as_ref(), &upstream).await {
                Ok(addr) => addr,
                Err(e) => {
                    session.on_connect_failed(ServerTaskError::UpstreamNotResolved(e));
                    return;
                }
            };

            let conn = Connection::new_outbound(session.ctx.pool.clone());
            {
                let mut state = session.state.lock().unwrap();
                if !matches!(state.phase, SessionPhase::Connecting(_)) {
                    return;
                }
                state.upstream = Some(conn.clone());
            }

            let s1 = session.clone();
            let s2 = session.clone();
            let r = conn.connect(
                addr,
                move |upstream| s1.on_connected(upstream),
                move |e| s2.on_connect_failed(ServerTaskError::UpstreamNotConnected(e)),
            );
            if let Err(e) = r {
                session.on_connect_failed(e.into());
            }
        });
    }

    fn on_connected(&self, upstream: &Connection) {
        let mut state = self.state.lock().unwrap();
        let mut handshake = match mem::replace(&mut state.phase, SessionPhase::Relaying) {
            SessionPhase::Connecting(handshake) => handshake,
            phase => {
                // closed while connecting
                state.phase = phase;
                drop(state);
                upstream.close();
                return;
            }
        };
        let local_addr = upstream
            .local_addr()
            .unwrap_or(SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0));

        let reply = handshake.on_connected(local_addr);
        let _ = self.client.send(reply, |_| {}, |_| {});
        let early_data = state.buf.take_remaining();
        if !early_data.is_empty() {
            let _ = upstream.send(early_data, |_| {}, |_| {});
        }
        drop(state);
        self.handshake_done.cancel();

        debug!(
            "session from {} {} tunnel established via {local_addr}",
            self.peer_addr,
            handshake.protocol()
        );
        if let Err(e) = relay::join(&self.client, upstream) {
            debug!("session from {} relay not started: {e}", self.peer_addr);
        }
    }

    fn on_connect_failed(&self, error: ServerTaskError) {
        let mut state = self.state.lock().unwrap();
        let reply = match &mut state.phase {
            SessionPhase::Connecting(handshake) => handshake.on_connect_failed(),
            _ => return,
        };
        state.phase = SessionPhase::Closed;
        drop(state);
        self.fail(reply, error);
    }

    fn fail(&self, reply: Option<Bytes>, error: ServerTaskError) {
        self.ctx.stats.add_failed();
        info!("session from {} failed: {error}", self.peer_addr);
        if let Some(reply) = reply {
            let _ = self.client.send(reply, |_| {}, |_| {});
        }
        self.client.close();
    }

    fn on_handshake_timeout(&self) {
        let mut state = self.state.lock().unwrap();
        if state.phase.is_finished() {
            return;
        }
        state.phase = SessionPhase::Closed;
        drop(state);

        self.ctx.stats.add_timeout();
        info!(
            "session from {} closed: {}",
            self.peer_addr,
            ServerTaskError::HandshakeTimeout
        );
        self.client.close();
    }

    fn on_client_closed(&self) {
        self.handshake_done.cancel();
        let upstream = {
            let mut state = self.state.lock().unwrap();
            state.phase = SessionPhase::Closed;
            state.buf.clear();
            state.upstream.take()
        };
        if let Some(upstream) = upstream {
            upstream.close();
        }
        self.ctx.stats.dec_alive();
        debug!("session from {} closed", self.peer_addr);
    }
}
