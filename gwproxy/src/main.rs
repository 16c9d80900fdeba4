/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;

use anyhow::Context;
use log::{debug, error, info};

use gw_resolver::{ArcResolver, CachedResolver, SystemResolver};

use gwproxy::serve::GatewayServer;

fn main() -> anyhow::Result<()> {
    let Some(proc_args) =
        gwproxy::opts::parse_clap().context("failed to parse command line options")?
    else {
        return Ok(());
    };

    // set up process logger early, only proc args is used inside
    let _log_guard = gw_daemon::log::process::setup(&proc_args.daemon_config)
        .context("failed to setup logger")?;

    let config_file = gwproxy::config::load()
        .context(format!("failed to load config, opts: {:?}", &proc_args))?;
    debug!("loaded config from {}", config_file.display());

    if proc_args.daemon_config.test_config {
        info!("the format of the config file is ok");
        return Ok(());
    }

    match tokio_run() {
        Ok(_) => Ok(()),
        Err(e) => {
            error!("{e:?}");
            Err(e)
        }
    }
}

fn tokio_run() -> anyhow::Result<()> {
    let rt = gw_daemon::runtime::config::get_runtime_config()
        .start()
        .context("failed to start runtime")?;
    rt.block_on(async {
        let resolver_config = gwproxy::config::resolver::get();
        let resolver: ArcResolver = Arc::new(CachedResolver::new(
            SystemResolver::default(),
            resolver_config.as_ref().clone(),
        ));

        let mut server = GatewayServer::new(gwproxy::config::server::get(), resolver);
        server.start().context("failed to start server")?;

        tokio::signal::ctrl_c()
            .await
            .context("failed to wait for the ctrl-c signal")?;
        info!("got ctrl-c signal, stopping the server");

        server.stop();
        server.wait_stopped().await;
        info!("server stopped, {}", server.stats().snapshot());
        Ok(())
    })
}
