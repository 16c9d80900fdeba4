/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::ResolveError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedRecord {
    pub ips: Vec<IpAddr>,
    pub ttl: Option<Duration>,
}

#[async_trait]
pub trait Resolver {
    async fn resolve(&self, domain: &str) -> Result<ResolvedRecord, ResolveError>;
}

pub type ArcResolver = Arc<dyn Resolver + Send + Sync>;

/// Resolve with the getaddrinfo of the system, which runs in the tokio blocking pool.
#[derive(Default)]
pub struct SystemResolver {}

#[async_trait]
impl Resolver for SystemResolver {
    async fn resolve(&self, domain: &str) -> Result<ResolvedRecord, ResolveError> {
        if domain.is_empty() {
            return Err(ResolveError::EmptyDomain);
        }

        let mut ips: Vec<IpAddr> = Vec::new();
        for addr in tokio::net::lookup_host((domain, 0)).await? {
            let ip = addr.ip();
            if !ips.contains(&ip) {
                ips.push(ip);
            }
        }
        if ips.is_empty() {
            return Err(ResolveError::NotFound);
        }
        Ok(ResolvedRecord { ips, ttl: None })
    }
}
