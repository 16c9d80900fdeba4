/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::net::IpAddr;

use socket2::{Domain, SockAddr, Socket, Type};
use tokio::net::{TcpListener, TcpSocket};

use gw_types::net::TcpListenConfig;

use super::listen;
use super::util::AddressFamily;

pub fn new_std_listener(config: &TcpListenConfig) -> io::Result<std::net::TcpListener> {
    let addr = config.address();
    let socket = new_tcp_socket(AddressFamily::from(&addr))?;
    listen::prepare(&socket, addr, config.is_ipv6only())?;
    let bind_addr: SockAddr = addr.into();
    socket.bind(&bind_addr)?;
    socket.listen(config.backlog() as i32)?;
    Ok(std::net::TcpListener::from(socket))
}

pub fn new_std_socket_to(peer_ip: IpAddr, nodelay: bool) -> io::Result<std::net::TcpStream> {
    let socket = new_tcp_socket(AddressFamily::from(&peer_ip))?;
    if nodelay {
        socket.set_tcp_nodelay(true)?;
    }
    Ok(std::net::TcpStream::from(socket))
}

#[cfg(any(windows, target_os = "macos"))]
fn new_tcp_socket(family: AddressFamily) -> io::Result<Socket> {
    let socket = Socket::new(Domain::from(family), Type::STREAM, None)?;
    socket.set_nonblocking(true)?;
    Ok(socket)
}

#[cfg(not(any(windows, target_os = "macos")))]
fn new_tcp_socket(family: AddressFamily) -> io::Result<Socket> {
    Socket::new(Domain::from(family), Type::STREAM.nonblocking(), None)
}

/// Must be called inside a tokio runtime.
pub fn new_listen_to(config: &TcpListenConfig) -> io::Result<TcpListener> {
    let socket = new_std_listener(config)?;
    TcpListener::from_std(socket)
}

pub fn new_socket_to(peer_ip: IpAddr, nodelay: bool) -> io::Result<TcpSocket> {
    let socket = new_std_socket_to(peer_ip, nodelay)?;
    Ok(TcpSocket::from_std_stream(socket))
}
