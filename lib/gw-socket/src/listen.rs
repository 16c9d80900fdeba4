/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::net::SocketAddr;

use socket2::Socket;

/// Socket options applied between creation and bind of a listen socket.
pub(super) fn prepare(socket: &Socket, addr: SocketAddr, ipv6only: bool) -> io::Result<()> {
    // ephemeral ports are never shared
    if addr.port() != 0 {
        socket.set_reuse_address(true)?;
        #[cfg(any(target_os = "linux", target_os = "android", target_os = "dragonfly"))]
        socket.set_reuse_port(true)?;
    }
    if let SocketAddr::V6(v6) = addr
        && v6.ip().is_unspecified()
    {
        socket.set_only_v6(ipv6only)?;
    }
    Ok(())
}
