// Network helpers for resolving the admin server bind address.

use std::net::{IpAddr, Ipv4Addr};

use if_addrs::get_if_addrs;

pub const ANY_INTERFACE: &str = "any";

/// Resolves the IPv4 address of `interface`, or the unspecified address for `any`.
pub fn resolve_bind_ip(interface: &str) -> std::io::Result<IpAddr> {
    if interface == ANY_INTERFACE {
        return Ok(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
    }
    interface_ipv4(interface).ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("no IPv4 address on interface {interface}"),
        )
    })
}

fn interface_ipv4(name: &str) -> Option<IpAddr> {
    let ifaces = get_if_addrs().ok()?;
    ifaces.into_iter().find_map(|iface| match iface.addr {
        if_addrs::IfAddr::V4(v4) if iface.name == name => Some(IpAddr::V4(v4.ip)),
        _ => None,
    })
}
