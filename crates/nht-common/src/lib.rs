//! Shared types used across the nexthop-tracking workspace: the `Prefix`
//! value, address-family/subsequent-address-family identifiers, and the
//! handful of classification helpers (`loopback`, `link_local`, ...) that
//! `ConnTable` needs when deciding whether a connected address is eligible
//! for the on-link shortcut.

pub mod macros;

use std::{
    fmt::{Debug, Display, Formatter},
    net::{AddrParseError, IpAddr, Ipv4Addr, Ipv6Addr},
    num::ParseIntError,
    str::FromStr,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommonError {
    #[error("Expected format <address>/<mask> (a.e. 192.168.2.0/24), but got '{0}'")]
    InvalidPrefixFormat(String),
    #[error("Unable to parse address => '{0}'")]
    IpAddrParse(#[from] AddrParseError),
    #[error("Unable to parse int => '{0}'")]
    IntParse(#[from] ParseIntError),
}

/// Address Family Identifier. Selects which of the two RIBs/caches a prefix
/// or nexthop belongs to.
#[derive(Ord, PartialOrd, Eq, PartialEq, Debug, Hash, Clone, Copy)]
pub enum Afi {
    Ipv4,
    Ipv6,
}

/// Subsequent Address Family Identifier. Only `Unicast` is walked by the
/// scanner; `MplsVpn` is excluded from the importer per spec.
#[derive(Ord, PartialOrd, Eq, PartialEq, Debug, Hash, Clone, Copy)]
pub enum Safi {
    Unicast,
    Multicast,
    MplsVpn,
}

/// A network prefix: an address truncated to `mask` significant bits plus
/// the mask length itself. `address` is not required to already be masked;
/// use [`Prefix::apply_mask`] to normalize one that was parsed or received
/// from the wire.
#[derive(Ord, PartialOrd, Eq, PartialEq, Hash, Clone, Copy)]
pub struct Prefix {
    pub address: IpAddr,
    pub mask: u8,
}

impl FromStr for Prefix {
    type Err = CommonError;

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        let (addr, mask) = string
            .split_once('/')
            .ok_or_else(|| CommonError::InvalidPrefixFormat(string.to_string()))?;
        Ok(Self {
            address: IpAddr::from_str(addr)?,
            mask: mask.parse()?,
        })
    }
}

impl Debug for Prefix {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}/{}", self.address, self.mask)
    }
}

impl Display for Prefix {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}/{}", self.address, self.mask)
    }
}

impl Prefix {
    pub const ANY_IPV4: Prefix = Prefix {
        address: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
        mask: 0,
    };
    pub const ANY_IPV6: Prefix = Prefix {
        address: IpAddr::V6(Ipv6Addr::new(0, 0, 0, 0, 0, 0, 0, 0)),
        mask: 0,
    };

    pub fn afi(&self) -> Afi {
        match self.address {
            IpAddr::V4(_) => Afi::Ipv4,
            IpAddr::V6(_) => Afi::Ipv6,
        }
    }

    /// Host-address prefix (`/32` or `/128`) used as the key for a single
    /// nexthop lookup.
    pub fn host(address: IpAddr) -> Self {
        let mask = match address {
            IpAddr::V4(_) => 32,
            IpAddr::V6(_) => 128,
        };
        Self { address, mask }
    }

    /// Truncates `address` to the leading `mask` bits, discarding host bits.
    /// This is what `ConnTable` insertion applies to a connected address
    /// before computing refcounts, per spec.md §4.3.
    pub fn apply_mask(&self) -> Self {
        let address = match self.address {
            IpAddr::V4(addr) => {
                let bits = u32::from(addr);
                let masked = if self.mask == 0 {
                    0
                } else {
                    bits & (u32::MAX << (32 - self.mask as u32))
                };
                IpAddr::V4(Ipv4Addr::from(masked))
            }
            IpAddr::V6(addr) => {
                let bits = u128::from(addr);
                let masked = if self.mask == 0 {
                    0
                } else {
                    bits & (u128::MAX << (128 - self.mask as u32))
                };
                IpAddr::V6(Ipv6Addr::from(masked))
            }
        };
        Self {
            address,
            mask: self.mask,
        }
    }

    pub fn is_default(&self) -> bool {
        self.mask == 0
    }

    /// True for loopback, link-local or unspecified prefixes — the classes
    /// `ConnTable` insertion must reject per spec.md §4.3.
    pub fn is_connectable(&self) -> bool {
        if self.is_default() {
            return false;
        }
        match self.address {
            IpAddr::V4(addr) => !(addr.is_loopback() || addr.is_link_local() || addr.is_unspecified()),
            IpAddr::V6(addr) => !(addr.is_loopback() || is_ipv6_link_local(addr) || addr.is_unspecified()),
        }
    }

    /// Longest-prefix-match containment: `self` covers `other` iff `other`'s
    /// masked address agrees with `self` over `self.mask` bits and
    /// `self.mask <= other.mask`.
    pub fn covers(&self, other: &Prefix) -> bool {
        if self.mask > other.mask || self.afi() != other.afi() {
            return false;
        }
        let truncated = Prefix {
            address: other.address,
            mask: self.mask,
        }
        .apply_mask();
        truncated.address == self.apply_mask().address
    }
}

fn is_ipv6_link_local(addr: Ipv6Addr) -> bool {
    (addr.segments()[0] & 0xffc0) == 0xfe80
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_displays() {
        let p: Prefix = "10.1.0.0/16".parse().unwrap();
        assert_eq!(p.mask, 16);
        assert_eq!(format!("{p}"), "10.1.0.0/16");
    }

    #[test]
    fn apply_mask_truncates_host_bits() {
        let p: Prefix = "10.1.2.3/16".parse().unwrap();
        assert_eq!(p.apply_mask(), "10.1.0.0/16".parse().unwrap());
    }

    #[test]
    fn rejects_loopback_and_linklocal() {
        let loopback: Prefix = "127.0.0.1/32".parse().unwrap();
        let link_local: Prefix = "169.254.0.1/32".parse().unwrap();
        let default: Prefix = "0.0.0.0/0".parse().unwrap();
        assert!(!loopback.is_connectable());
        assert!(!link_local.is_connectable());
        assert!(!default.is_connectable());
        assert!("192.0.2.1/32".parse::<Prefix>().unwrap().is_connectable());
    }

    #[test]
    fn covers_is_longest_prefix_match() {
        let net: Prefix = "192.0.2.0/24".parse().unwrap();
        let host: Prefix = "192.0.2.254/32".parse().unwrap();
        let other: Prefix = "198.51.100.1/32".parse().unwrap();
        assert!(net.covers(&host));
        assert!(!net.covers(&other));
    }
}
