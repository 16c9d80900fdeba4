/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::sync::OnceLock;

use anyhow::{Context, anyhow};
use tokio::runtime::{Builder, Runtime};
use yaml_rust::Yaml;

static RUNTIME_CONFIG: OnceLock<RuntimeConfig> = OnceLock::new();

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RuntimeConfig {
    thread_number: Option<usize>,
    thread_name: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            thread_number: None,
            thread_name: "main".to_string(),
        }
    }
}

impl RuntimeConfig {
    pub fn set_thread_number(&mut self, num: usize) {
        self.thread_number = Some(num.max(1));
    }

    pub fn set_thread_name(&mut self, name: String) {
        self.thread_name = name;
    }

    /// Build a multi thread tokio runtime, all connection callbacks run on its workers.
    pub fn start(&self) -> io::Result<Runtime> {
        let mut builder = Builder::new_multi_thread();
        builder.enable_all().thread_name(self.thread_name.clone());
        if let Some(num) = self.thread_number {
            builder.worker_threads(num);
        }
        builder.build()
    }
}

pub fn get_runtime_config() -> &'static RuntimeConfig {
    RUNTIME_CONFIG.get_or_init(RuntimeConfig::default)
}

pub fn load(v: &Yaml) -> anyhow::Result<()> {
    let config = as_runtime_config(v)?;
    RUNTIME_CONFIG
        .set(config)
        .map_err(|_| anyhow!("runtime config has already been set"))
}

fn as_runtime_config(v: &Yaml) -> anyhow::Result<RuntimeConfig> {
    let mut config = RuntimeConfig::default();
    match v {
        Yaml::Hash(map) => {
            gw_yaml::foreach_kv(map, |k, v| match gw_yaml::key::normalize(k).as_str() {
                "thread_number" | "threads" => {
                    let num = gw_yaml::value::as_usize(v)
                        .context(format!("invalid usize value for key {k}"))?;
                    config.set_thread_number(num);
                    Ok(())
                }
                "thread_name" => {
                    let name = gw_yaml::value::as_string(v)
                        .context(format!("invalid string value for key {k}"))?;
                    config.set_thread_name(name);
                    Ok(())
                }
                _ => Err(anyhow!("invalid key {k}")),
            })?;
        }
        Yaml::Null => {}
        _ => return Err(anyhow!("root value type should be hash")),
    }
    Ok(config)
}
