//! Device address lookup for the stream endpoint.

use std::net::{IpAddr, Ipv4Addr};

/// Supplies the device address shown to viewers.
///
/// Implemented by the host, which knows how to ask the platform.
pub trait AddressProvider: Send {
    /// The address viewers should connect to, if one is known.
    fn local_address(&self) -> Option<IpAddr>;
}

impl<F> AddressProvider for F
where
    F: Fn() -> Option<IpAddr> + Send,
{
    fn local_address(&self) -> Option<IpAddr> {
        self()
    }
}

/// Always reports the same address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedAddress(pub IpAddr);

impl AddressProvider for FixedAddress {
    fn local_address(&self) -> Option<IpAddr> {
        Some(self.0)
    }
}

/// Never knows the address; endpoints use the configured placeholder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoAddress;

impl AddressProvider for NoAddress {
    fn local_address(&self) -> Option<IpAddr> {
        None
    }
}

/// Decode an IPv4 address packed little-endian into a `u32`, as Wi-Fi
/// connection info reports it. Zero means "not connected".
pub fn wifi_ipv4(raw: u32) -> Option<Ipv4Addr> {
    if raw == 0 {
        return None;
    }
    Some(Ipv4Addr::from(raw.to_le_bytes()))
}
