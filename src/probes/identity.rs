//! Session identity probes: username, hostname, primary IP address.

use super::run_command;
use crate::snapshot::UNKNOWN;
use std::net::{ToSocketAddrs, UdpSocket};
use std::time::Duration;

pub fn username(timeout: Duration) -> String {
    for var in ["USERNAME", "USER"] {
        if let Ok(value) = std::env::var(var) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return trimmed.to_string();
            }
        }
    }

    if let Some(output) = run_command("whoami", &[], timeout) {
        let trimmed = output.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    UNKNOWN.to_string()
}

/// Prefers the fully-qualified name over the short one when a qualified
/// lookup succeeds.
pub fn hostname(timeout: Duration) -> String {
    if let Some(name) = fqdn(timeout) {
        return name;
    }
    short_hostname(timeout).unwrap_or_else(|| UNKNOWN.to_string())
}

#[cfg(windows)]
fn fqdn(_timeout: Duration) -> Option<String> {
    let computer = std::env::var("COMPUTERNAME").ok()?;
    let domain = std::env::var("USERDNSDOMAIN").ok()?;
    if computer.trim().is_empty() || domain.trim().is_empty() {
        return None;
    }
    Some(format!("{}.{}", computer.trim(), domain.trim()))
}

#[cfg(not(windows))]
fn fqdn(timeout: Duration) -> Option<String> {
    let output = run_command("hostname", &["-f"], timeout)?;
    let name = output.trim();
    // Without a domain `hostname -f` echoes the short name back.
    if name.is_empty() || !name.contains('.') {
        return None;
    }
    Some(name.to_string())
}

fn short_hostname(timeout: Duration) -> Option<String> {
    for var in ["COMPUTERNAME", "HOSTNAME"] {
        if let Ok(value) = std::env::var(var) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }

    #[cfg(unix)]
    if let Some(name) = super::read_trimmed("/etc/hostname") {
        return Some(name);
    }

    run_command("hostname", &[], timeout)
        .map(|out| out.trim().to_string())
        .filter(|name| !name.is_empty())
}

/// Primary outbound IPv4 address. The UDP socket is never written to;
/// connecting only makes the OS pick the outbound interface.
pub fn ip_address(timeout: Duration) -> String {
    if let Some(ip) = outbound_interface_ip() {
        return ip;
    }
    if let Some(ip) = hostname_lookup_ip(timeout) {
        return ip;
    }
    UNKNOWN.to_string()
}

fn outbound_interface_ip() -> Option<String> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect("8.8.8.8:80").ok()?;
    let addr = socket.local_addr().ok()?;
    if addr.ip().is_unspecified() {
        return None;
    }
    Some(addr.ip().to_string())
}

fn hostname_lookup_ip(timeout: Duration) -> Option<String> {
    let host = short_hostname(timeout)?;
    (host.as_str(), 0)
        .to_socket_addrs()
        .ok()?
        .find(|addr| addr.is_ipv4())
        .map(|addr| addr.ip().to_string())
}
