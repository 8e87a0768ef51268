//! The polymorphic nexthop payload (spec.md §3, §9): a tag byte selects one
//! of eight recognised kinds, each with a type-dependent payload. An
//! unrecognised tag decodes to [`NextHop::Unknown`] with no payload
//! consumed — the protocol tolerates unknown tags silently, and guessing a
//! payload length for one would desynchronise the framing of everything
//! that follows.

use crate::WireCodec;
use nom::number::complete::{be_u32, be_u8};
use std::net::{Ipv4Addr, Ipv6Addr};

/// Tag byte values for the eight nexthop kinds this protocol recognises.
/// These are this workspace's own protocol constants, not a literal copy of
/// any single upstream daemon's numbering — see `DESIGN.md`.
pub mod tag {
    pub const IPV4_GATE: u8 = 1;
    pub const IPV4_IFNAME: u8 = 2;
    pub const IPV4_IFINDEX: u8 = 3;
    pub const IPV6_GATE: u8 = 4;
    pub const IPV6_GATE_IFINDEX: u8 = 5;
    pub const IPV6_GATE_IFNAME: u8 = 6;
    pub const IPV6_IFINDEX: u8 = 7;
    pub const IPV6_IFNAME: u8 = 8;
}

#[derive(Eq, PartialEq, Debug, Hash, Clone, Copy)]
pub enum NextHop {
    Ipv4Gate(Ipv4Addr),
    Ipv4IfName(u32),
    Ipv4IfIndex(u32),
    Ipv6Gate(Ipv6Addr),
    Ipv6GateIfIndex(Ipv6Addr, u32),
    Ipv6GateIfName(Ipv6Addr, u32),
    Ipv6IfIndex(u32),
    Ipv6IfName(u32),
    /// An unrecognised tag byte. No payload is parsed for it — see the
    /// module doc comment.
    Unknown(u8),
}

impl NextHop {
    pub fn ifindex(&self) -> Option<u32> {
        match *self {
            NextHop::Ipv4IfName(i)
            | NextHop::Ipv4IfIndex(i)
            | NextHop::Ipv6GateIfIndex(_, i)
            | NextHop::Ipv6GateIfName(_, i)
            | NextHop::Ipv6IfIndex(i)
            | NextHop::Ipv6IfName(i) => Some(i),
            _ => None,
        }
    }

    pub fn gate(&self) -> Option<std::net::IpAddr> {
        match *self {
            NextHop::Ipv4Gate(a) => Some(a.into()),
            NextHop::Ipv6Gate(a) | NextHop::Ipv6GateIfIndex(a, _) | NextHop::Ipv6GateIfName(a, _) => {
                Some(a.into())
            }
            _ => None,
        }
    }

    fn tag(&self) -> u8 {
        match self {
            NextHop::Ipv4Gate(_) => tag::IPV4_GATE,
            NextHop::Ipv4IfName(_) => tag::IPV4_IFNAME,
            NextHop::Ipv4IfIndex(_) => tag::IPV4_IFINDEX,
            NextHop::Ipv6Gate(_) => tag::IPV6_GATE,
            NextHop::Ipv6GateIfIndex(_, _) => tag::IPV6_GATE_IFINDEX,
            NextHop::Ipv6GateIfName(_, _) => tag::IPV6_GATE_IFNAME,
            NextHop::Ipv6IfIndex(_) => tag::IPV6_IFINDEX,
            NextHop::Ipv6IfName(_) => tag::IPV6_IFNAME,
            NextHop::Unknown(t) => *t,
        }
    }
}

impl WireCodec for NextHop {
    fn decode(input: &[u8]) -> nom::IResult<&[u8], Self> {
        let (input, raw_tag) = be_u8(input)?;
        match raw_tag {
            tag::IPV4_GATE => {
                let (input, bytes) = nom::bytes::complete::take(4usize)(input)?;
                let addr = Ipv4Addr::new(bytes[0], bytes[1], bytes[2], bytes[3]);
                Ok((input, NextHop::Ipv4Gate(addr)))
            }
            tag::IPV4_IFNAME => {
                let (input, idx) = be_u32(input)?;
                Ok((input, NextHop::Ipv4IfName(idx)))
            }
            tag::IPV4_IFINDEX => {
                let (input, idx) = be_u32(input)?;
                Ok((input, NextHop::Ipv4IfIndex(idx)))
            }
            tag::IPV6_GATE => {
                let (input, bytes) = nom::bytes::complete::take(16usize)(input)?;
                let addr = Ipv6Addr::from(<[u8; 16]>::try_from(bytes).unwrap());
                Ok((input, NextHop::Ipv6Gate(addr)))
            }
            tag::IPV6_GATE_IFINDEX => {
                let (input, bytes) = nom::bytes::complete::take(16usize)(input)?;
                let addr = Ipv6Addr::from(<[u8; 16]>::try_from(bytes).unwrap());
                let (input, idx) = be_u32(input)?;
                Ok((input, NextHop::Ipv6GateIfIndex(addr, idx)))
            }
            tag::IPV6_GATE_IFNAME => {
                let (input, bytes) = nom::bytes::complete::take(16usize)(input)?;
                let addr = Ipv6Addr::from(<[u8; 16]>::try_from(bytes).unwrap());
                let (input, idx) = be_u32(input)?;
                Ok((input, NextHop::Ipv6GateIfName(addr, idx)))
            }
            tag::IPV6_IFINDEX => {
                let (input, idx) = be_u32(input)?;
                Ok((input, NextHop::Ipv6IfIndex(idx)))
            }
            tag::IPV6_IFNAME => {
                let (input, idx) = be_u32(input)?;
                Ok((input, NextHop::Ipv6IfName(idx)))
            }
            other => Ok((input, NextHop::Unknown(other))),
        }
    }

    fn encode(&self, buf: &mut Vec<u8>) {
        buf.push(self.tag());
        match self {
            NextHop::Ipv4Gate(addr) => buf.extend_from_slice(&addr.octets()),
            NextHop::Ipv4IfName(idx) | NextHop::Ipv4IfIndex(idx) => {
                buf.extend_from_slice(&idx.to_be_bytes())
            }
            NextHop::Ipv6Gate(addr) => buf.extend_from_slice(&addr.octets()),
            NextHop::Ipv6GateIfIndex(addr, idx) | NextHop::Ipv6GateIfName(addr, idx) => {
                buf.extend_from_slice(&addr.octets());
                buf.extend_from_slice(&idx.to_be_bytes());
            }
            NextHop::Ipv6IfIndex(idx) | NextHop::Ipv6IfName(idx) => {
                buf.extend_from_slice(&idx.to_be_bytes())
            }
            NextHop::Unknown(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(nh: NextHop) {
        let mut buf = Vec::new();
        nh.encode(&mut buf);
        let (rest, decoded) = NextHop::decode(&buf).unwrap();
        assert!(rest.is_empty());
        assert_eq!(decoded, nh);
    }

    #[test]
    fn round_trips_every_known_kind() {
        round_trip(NextHop::Ipv4Gate(Ipv4Addr::new(192, 0, 2, 1)));
        round_trip(NextHop::Ipv4IfName(3));
        round_trip(NextHop::Ipv4IfIndex(4));
        round_trip(NextHop::Ipv6Gate(Ipv6Addr::LOCALHOST));
        round_trip(NextHop::Ipv6GateIfIndex(Ipv6Addr::LOCALHOST, 9));
        round_trip(NextHop::Ipv6GateIfName(Ipv6Addr::LOCALHOST, 9));
        round_trip(NextHop::Ipv6IfIndex(2));
        round_trip(NextHop::Ipv6IfName(2));
    }

    #[test]
    fn unknown_tag_consumes_no_payload() {
        let (rest, decoded) = NextHop::decode(&[200, 1, 2, 3]).unwrap();
        assert_eq!(decoded, NextHop::Unknown(200));
        assert_eq!(rest, &[1, 2, 3]);
    }
}
