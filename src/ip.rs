//! IP address literal classification.

use crate::error::Error;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// The address family of a classified IP literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IpKind {
    V4,
    V6,
}

/// Both address families, for callers that accept either.
pub const ANY_KIND: &[IpKind] = &[IpKind::V4, IpKind::V6];

impl IpKind {
    /// The tag used for session keys and log lines: `ipv4` or `ipv6`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            IpKind::V4 => "ipv4",
            IpKind::V6 => "ipv6",
        }
    }
}

impl fmt::Display for IpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&IpAddr> for IpKind {
    fn from(addr: &IpAddr) -> Self {
        match addr {
            IpAddr::V4(_) => IpKind::V4,
            IpAddr::V6(_) => IpKind::V6,
        }
    }
}

/// Parse `addr` as an IPv4 or IPv6 literal of one of the `allowed` families.
///
/// # Errors
///
/// Returns [`Error::InvalidIp`] if `addr` is neither an IPv4 nor an IPv6 literal, or if its
/// family isn't in `allowed`.
pub fn parse_ip(addr: &str, allowed: &[IpKind]) -> Result<IpAddr, Error> {
    let parsed = if let Ok(v4) = addr.parse::<Ipv4Addr>() {
        IpAddr::V4(v4)
    } else if let Ok(v6) = addr.parse::<Ipv6Addr>() {
        IpAddr::V6(v6)
    } else {
        return Err(Error::InvalidIp(addr.to_string()));
    };

    if allowed.contains(&IpKind::from(&parsed)) {
        Ok(parsed)
    } else {
        Err(Error::InvalidIp(addr.to_string()))
    }
}

/// Classify `addr` as [`IpKind::V4`] or [`IpKind::V6`], restricted to the `allowed` families.
///
/// # Errors
///
/// See [`parse_ip`].
pub fn check_ip(addr: &str, allowed: &[IpKind]) -> Result<IpKind, Error> {
    parse_ip(addr, allowed).map(|ip| IpKind::from(&ip))
}
