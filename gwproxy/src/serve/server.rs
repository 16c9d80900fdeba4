/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use log::{info, warn};
use tokio::sync::mpsc;

use gw_io_ext::{Connection, ReceiveBuffer, ReceiveBufferPool};
use gw_resolver::ArcResolver;

use super::ServerStats;
use super::session::GatewaySession;
use crate::config::server::ServerConfig;

/// Everything shared by the sessions of one server.
pub struct ServerContext {
    pub(crate) config: Arc<ServerConfig>,
    pub(crate) resolver: ArcResolver,
    pub(crate) pool: Arc<ReceiveBufferPool>,
    pub(crate) stats: Arc<ServerStats>,
}

pub struct GatewayServer {
    ctx: Arc<ServerContext>,
    listeners: Vec<Connection>,
    closed_sender: mpsc::UnboundedSender<SocketAddr>,
    closed_receiver: mpsc::UnboundedReceiver<SocketAddr>,
}

impl GatewayServer {
    pub fn new(config: Arc<ServerConfig>, resolver: ArcResolver) -> Self {
        let pool = ReceiveBuffer::new_pool(config.receive_buffer_size, config.receive_buffer_pool);
        let (closed_sender, closed_receiver) = mpsc::unbounded_channel();
        GatewayServer {
            ctx: Arc::new(ServerContext {
                config,
                resolver,
                pool,
                stats: Arc::new(ServerStats::default()),
            }),
            listeners: Vec::new(),
            closed_sender,
            closed_receiver,
        }
    }

    /// Bind all listener instances and start accepting. Must be called inside a tokio runtime.
    pub fn start(&mut self) -> anyhow::Result<()> {
        let listen = self.ctx.config.listen();
        for i in 0..listen.instance() {
            let listener = Connection::bind_listener(&listen, self.ctx.pool.clone())
                .context(format!("failed to listen on {}", listen.address()))?;
            let local_addr = listener.local_addr().unwrap_or(listen.address());
            info!("listener #{i} started at {local_addr}");

            let ctx = self.ctx.clone();
            let closed_sender = self.closed_sender.clone();
            listener
                .accept(
                    move |conn| {
                        ctx.stats.add_accepted();
                        GatewaySession::start(ctx.clone(), conn);
                    },
                    move |e| warn!("listener at {local_addr} accept error: {e:?}"),
                    move |_| {
                        info!("listener at {local_addr} closed");
                        let _ = closed_sender.send(local_addr);
                    },
                )
                .context("failed to start accepting")?;
            self.listeners.push(listener);
        }
        Ok(())
    }

    pub fn listen_addrs(&self) -> Vec<SocketAddr> {
        self.listeners
            .iter()
            .filter_map(|l| l.local_addr())
            .collect()
    }

    pub fn stats(&self) -> Arc<ServerStats> {
        self.ctx.stats.clone()
    }

    /// Close all listeners, sessions already accepted are not affected.
    pub fn stop(&self) {
        for listener in &self.listeners {
            listener.close();
        }
    }

    /// Wait until all listeners are fully closed.
    pub async fn wait_stopped(&mut self) {
        let mut left = self.listeners.len();
        while left > 0 {
            if self.closed_receiver.recv().await.is_none() {
                break;
            }
            left -= 1;
        }
        self.listeners.clear();
    }
}
