/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::net::SocketAddr;

use gw_types::net::{Host, UpstreamAddr};

use crate::{ResolveError, Resolver};

/// Get the socket address to connect to, using the first resolved address for domains.
pub async fn resolve_upstream<R>(
    resolver: &R,
    upstream: &UpstreamAddr,
) -> Result<SocketAddr, ResolveError>
where
    R: Resolver + Send + Sync + ?Sized,
{
    match upstream.host() {
        Host::Ip(ip) => Ok(SocketAddr::new(*ip, upstream.port())),
        Host::Domain(domain) => {
            let record = resolver.resolve(domain).await?;
            let ip = record.ips.first().ok_or(ResolveError::NotFound)?;
            Ok(SocketAddr::new(*ip, upstream.port()))
        }
    }
}
