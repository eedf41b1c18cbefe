//! Network utilities
//!
//! Provides network-related utility functions.

use std::net::{IpAddr, UdpSocket};

/// URLs a browser can use to reach the server.
///
/// Always includes localhost. A specific bind address is listed as is; for
/// a wildcard bind the host's outbound LAN address is listed when known.
pub fn access_urls(bind_address: &str, port: u16) -> Vec<String> {
    let mut urls = vec![format!("http://localhost:{}", port)];

    let ip = match bind_address.parse::<IpAddr>() {
        Ok(ip) if ip.is_unspecified() => primary_lan_ip(),
        Ok(ip) => Some(ip),
        Err(_) => {
            urls.push(format!("http://{}:{}", bind_address, port));
            None
        }
    };

    match ip {
        Some(ip) if ip.is_loopback() => {}
        Some(IpAddr::V6(ip)) => urls.push(format!("http://[{}]:{}", ip, port)),
        Some(ip) => urls.push(format!("http://{}:{}", ip, port)),
        None => {}
    }

    urls
}

/// Address of the interface used for outbound traffic.
///
/// Connecting a UDP socket only selects a route; no packet is sent.
pub fn primary_lan_ip() -> Option<IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect("192.0.2.1:80").ok()?;
    let ip = socket.local_addr().ok()?.ip();
    (!ip.is_unspecified() && !ip.is_loopback()).then_some(ip)
}
