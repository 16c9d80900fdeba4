/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use anyhow::{Context, anyhow};
use arc_swap::ArcSwap;
use yaml_rust::Yaml;

use gw_dpi::ProtocolInspectionConfig;
use gw_types::net::TcpListenConfig;

const DEFAULT_RECEIVE_BUFFER_SIZE: usize = 4096;
const DEFAULT_RECEIVE_BUFFER_POOL: usize = 1024;
const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(30);

static SERVER_CONFIG: LazyLock<ArcSwap<ServerConfig>> =
    LazyLock::new(|| ArcSwap::from_pointee(ServerConfig::default()));

#[derive(Clone, Debug)]
pub struct ServerConfig {
    listen: TcpListenConfig,
    dual_stack: Option<bool>,
    pub receive_buffer_size: usize,
    pub receive_buffer_pool: usize,
    pub inspection: ProtocolInspectionConfig,
    pub handshake_timeout: Duration,
    pub http_failure_reply: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig::new(TcpListenConfig::default())
    }
}

impl ServerConfig {
    pub fn new(listen: TcpListenConfig) -> Self {
        ServerConfig {
            listen,
            dual_stack: None,
            receive_buffer_size: DEFAULT_RECEIVE_BUFFER_SIZE,
            receive_buffer_pool: DEFAULT_RECEIVE_BUFFER_POOL,
            inspection: ProtocolInspectionConfig::default(),
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
            http_failure_reply: false,
        }
    }

    /// The listen config, with the dual stack setting applied.
    pub fn listen(&self) -> TcpListenConfig {
        let mut listen = self.listen.clone();
        if let Some(dual_stack) = self.dual_stack {
            listen.set_ipv6_only(!dual_stack);
        }
        listen
    }

    fn set(&mut self, k: &str, v: &Yaml) -> anyhow::Result<()> {
        match gw_yaml::key::normalize(k).as_str() {
            "listen" => {
                self.listen = gw_yaml::value::as_tcp_listen_config(v)
                    .context(format!("invalid tcp listen config value for key {k}"))?;
                Ok(())
            }
            "dual_stack" | "dual_mode" => {
                let enable = gw_yaml::value::as_bool(v)
                    .context(format!("invalid bool value for key {k}"))?;
                self.dual_stack = Some(enable);
                Ok(())
            }
            "receive_buffer_size" | "recv_buffer_size" => {
                self.receive_buffer_size = gw_yaml::humanize::as_usize(v)
                    .context(format!("invalid humanize usize value for key {k}"))?;
                Ok(())
            }
            "receive_buffer_pool" | "recv_buffer_pool" => {
                self.receive_buffer_pool = gw_yaml::value::as_usize(v)
                    .context(format!("invalid usize value for key {k}"))?;
                Ok(())
            }
            "max_handshake_size" | "http_connect_header_size" => {
                let size = gw_yaml::humanize::as_usize(v)
                    .context(format!("invalid humanize usize value for key {k}"))?;
                self.inspection.size_limit_mut().set_http_connect_header(size);
                Ok(())
            }
            "handshake_timeout" => {
                self.handshake_timeout = gw_yaml::humanize::as_duration(v)
                    .context(format!("invalid humanize duration value for key {k}"))?;
                Ok(())
            }
            "http_failure_reply" => {
                self.http_failure_reply = gw_yaml::value::as_bool(v)
                    .context(format!("invalid bool value for key {k}"))?;
                Ok(())
            }
            _ => Err(anyhow!("invalid key {k}")),
        }
    }

    fn check(&self) -> anyhow::Result<()> {
        self.listen.check()?;
        if self.receive_buffer_size == 0 {
            return Err(anyhow!("receive buffer size should not be 0"));
        }
        if self.handshake_timeout.is_zero() {
            return Err(anyhow!("handshake timeout should not be 0"));
        }
        Ok(())
    }
}

pub fn get() -> Arc<ServerConfig> {
    SERVER_CONFIG.load_full()
}

pub(crate) fn load(v: &Yaml) -> anyhow::Result<()> {
    let config = parse(&get(), v)?;
    SERVER_CONFIG.store(Arc::new(config));
    Ok(())
}

fn parse(base: &ServerConfig, v: &Yaml) -> anyhow::Result<ServerConfig> {
    let mut config = base.clone();
    match v {
        Yaml::Hash(map) => {
            gw_yaml::foreach_kv(map, |k, v| config.set(k, v))?;
        }
        Yaml::Null => {}
        _ => return Err(anyhow!("yaml value type for 'server' should be 'map'")),
    }
    config.check()?;
    Ok(config)
}
