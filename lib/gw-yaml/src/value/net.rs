/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::net::SocketAddr;
use std::str::FromStr;

use anyhow::anyhow;
use yaml_rust::Yaml;

use gw_types::net::TcpListenConfig;

pub fn as_sockaddr(v: &Yaml) -> anyhow::Result<SocketAddr> {
    let Yaml::String(s) = v else {
        return Err(anyhow!("a socket address should be given as a string"));
    };
    SocketAddr::from_str(s).map_err(|e| anyhow!("invalid socket address {s}: {e}"))
}

fn set_listen_option(config: &mut TcpListenConfig, k: &str, v: &Yaml) -> anyhow::Result<()> {
    match crate::key::normalize(k).as_str() {
        "addr" | "address" => config.set_socket_address(as_sockaddr(v)?),
        "port" => config.set_port(crate::value::as_u16(v)?),
        "backlog" => config.set_backlog(crate::value::as_u32(v)?),
        "ipv6only" | "ipv6_only" => config.set_ipv6_only(crate::value::as_bool(v)?),
        "instance" | "instance_count" => config.set_instance(crate::value::as_usize(v)?),
        _ => return Err(anyhow!("invalid key {k}")),
    }
    Ok(())
}

/// Accept a port number, an `addr:port` string, or a map.
pub fn as_tcp_listen_config(value: &Yaml) -> anyhow::Result<TcpListenConfig> {
    let mut config = TcpListenConfig::default();
    match value {
        Yaml::Integer(i) => {
            let port = u16::try_from(*i).map_err(|_| anyhow!("invalid port number {i}"))?;
            config.set_port(port);
        }
        Yaml::String(_) => config.set_socket_address(as_sockaddr(value)?),
        Yaml::Hash(map) => crate::foreach_kv(map, |k, v| set_listen_option(&mut config, k, v))?,
        _ => return Err(anyhow!("invalid yaml value type for tcp listen config")),
    }
    config.check()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv6Addr};

    #[test]
    fn listen_config_ok() {
        let yaml = yaml_doc!("8080");
        let config = as_tcp_listen_config(&yaml).unwrap();
        assert_eq!(
            config.address(),
            SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), 8080)
        );

        let yaml = yaml_doc!("\"127.0.0.1:8081\"");
        let config = as_tcp_listen_config(&yaml).unwrap();
        let expected_addr: SocketAddr = "127.0.0.1:8081".parse().unwrap();
        assert_eq!(config.address(), expected_addr);
        assert!(!config.is_dual_stack());

        let yaml = yaml_doc!(
            r#"
                address: "[::]:8083"
                backlog: 1024
                ipv6-only: true
                instance: 2
            "#
        );
        let config = as_tcp_listen_config(&yaml).unwrap();
        assert_eq!(config.address().port(), 8083);
        assert_eq!(config.backlog(), 1024);
        assert!(config.is_ipv6only());
        assert_eq!(config.instance(), 2);
    }

    #[test]
    fn listen_config_err() {
        let yaml = yaml_doc!("0");
        assert!(as_tcp_listen_config(&yaml).is_err());

        let yaml = yaml_doc!("70000");
        assert!(as_tcp_listen_config(&yaml).is_err());

        let yaml = yaml_doc!("\"localhost:80\"");
        assert!(as_tcp_listen_config(&yaml).is_err());

        let yaml = yaml_doc!("unknown: 1");
        assert!(as_tcp_listen_config(&yaml).is_err());

        let yaml = yaml_doc!("[1, 2]");
        assert!(as_tcp_listen_config(&yaml).is_err());
    }
}
