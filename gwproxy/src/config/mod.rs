/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::path::Path;

use anyhow::anyhow;
use yaml_rust::{Yaml, yaml};

pub mod resolver;
pub mod server;

/// Load the config file set on the command line.
///
/// Multiple yaml documents are allowed, each of them is loaded on top of the previous ones.
pub fn load() -> anyhow::Result<&'static Path> {
    let config_file =
        gw_daemon::opts::config_file().ok_or_else(|| anyhow!("no config file set"))?;

    gw_yaml::foreach_doc(config_file, |_, doc| match doc {
        Yaml::Hash(map) => load_doc(map),
        Yaml::Null => Ok(()),
        _ => Err(anyhow!("yaml doc root should be hash")),
    })?;

    Ok(config_file)
}

fn load_doc(map: &yaml::Hash) -> anyhow::Result<()> {
    gw_yaml::foreach_kv(map, |k, v| match gw_yaml::key::normalize(k).as_str() {
        "runtime" => gw_daemon::runtime::config::load(v),
        "server" => server::load(v),
        "resolver" => resolver::load(v),
        _ => Err(anyhow!("invalid key {k} in main conf")),
    })
}
