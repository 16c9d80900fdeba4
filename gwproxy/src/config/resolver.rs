/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::sync::{Arc, LazyLock};

use anyhow::{Context, anyhow};
use arc_swap::ArcSwap;
use yaml_rust::Yaml;

use gw_resolver::ResolverConfig;

static RESOLVER_CONFIG: LazyLock<ArcSwap<ResolverConfig>> =
    LazyLock::new(|| ArcSwap::from_pointee(ResolverConfig::default()));

pub fn get() -> Arc<ResolverConfig> {
    RESOLVER_CONFIG.load_full()
}

pub(crate) fn load(v: &Yaml) -> anyhow::Result<()> {
    let config = parse(&get(), v)?;
    RESOLVER_CONFIG.store(Arc::new(config));
    Ok(())
}

fn parse(base: &ResolverConfig, v: &Yaml) -> anyhow::Result<ResolverConfig> {
    let mut config = base.clone();
    match v {
        Yaml::Hash(map) => {
            gw_yaml::foreach_kv(map, |k, v| match gw_yaml::key::normalize(k).as_str() {
                "cache_capacity" | "cache_size" => {
                    let capacity = gw_yaml::value::as_usize(v)
                        .context(format!("invalid usize value for key {k}"))?;
                    config.set_cache_capacity(capacity);
                    Ok(())
                }
                "min_ttl" => {
                    let ttl = gw_yaml::humanize::as_duration(v)
                        .context(format!("invalid humanize duration value for key {k}"))?;
                    config.set_min_ttl(ttl);
                    Ok(())
                }
                "max_ttl" => {
                    let ttl = gw_yaml::humanize::as_duration(v)
                        .context(format!("invalid humanize duration value for key {k}"))?;
                    config.set_max_ttl(ttl);
                    Ok(())
                }
                "negative_ttl" | "protective_ttl" => {
                    let ttl = gw_yaml::humanize::as_duration(v)
                        .context(format!("invalid humanize duration value for key {k}"))?;
                    config.set_negative_ttl(ttl);
                    Ok(())
                }
                _ => Err(anyhow!("invalid key {k}")),
            })?;
        }
        Yaml::Null => {}
        _ => return Err(anyhow!("yaml value type for 'resolver' should be 'map'")),
    }
    config.check();
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use yaml_rust::YamlLoader;

    #[test]
    fn parse_ok() {
        let doc = YamlLoader::load_from_str("cache_capacity: 0\nmin_ttl: 1m\nmax-ttl: 30s\nnegative_ttl: 5s")
            .unwrap()
            .pop()
            .unwrap();
        let config = parse(&ResolverConfig::default(), &doc).unwrap();
        assert_eq!(config.cache_capacity(), 0);
        assert_eq!(config.min_ttl(), Duration::from_secs(60));
        // raised to min ttl
        assert_eq!(config.max_ttl(), Duration::from_secs(60));
        assert_eq!(config.negative_ttl(), Duration::from_secs(5));
    }

    #[test]
    fn parse_invalid() {
        let doc = YamlLoader::load_from_str("ttl: 1").unwrap().pop().unwrap();
        assert!(parse(&ResolverConfig::default(), &doc).is_err());
    }
}
