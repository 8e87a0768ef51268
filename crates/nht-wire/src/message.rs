//! Message bodies for the four recognised commands (spec.md §4.1), plus the
//! framing glue (`encode_framed`/`decode_body`) that wraps a body in the
//! six-byte [`MessageHeader`].

use crate::{header::MessageHeader, nexthop::NextHop, WireCodec, WireError};
use nht_common::wire_enum;
use nom::number::complete::{be_u16, be_u32, be_u8};
use std::net::Ipv4Addr;

wire_enum! {
    #[derive(Eq, PartialEq, Debug, Hash, Clone, Copy)]
    pub enum Command: u16 {
        Ipv4NexthopLookup = 1,
        Ipv6NexthopLookup = 2,
        Ipv4ImportLookup = 3,
        Ipv4RGateVerify = 4,
    }
}

/// The largest message a single frame may carry: `total_length` is a `u16`.
pub const MAX_MESSAGE_LEN: usize = u16::MAX as usize;
/// Wire size of one `{gate, rgate}` record in an rgate-verify query.
pub const RGATE_RECORD_SIZE: usize = 8;
/// Wire size of one `{prefix, prefixlen}` record in an rgate-verify response.
pub const DESYNC_RECORD_SIZE: usize = 5;

fn take_ipv4(input: &[u8]) -> nom::IResult<&[u8], Ipv4Addr> {
    let (input, bytes) = nom::bytes::complete::take(4usize)(input)?;
    Ok((input, Ipv4Addr::new(bytes[0], bytes[1], bytes[2], bytes[3])))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv4LookupQuery {
    pub addr: Ipv4Addr,
}

impl WireCodec for Ipv4LookupQuery {
    fn decode(input: &[u8]) -> nom::IResult<&[u8], Self> {
        let (input, addr) = take_ipv4(input)?;
        Ok((input, Self { addr }))
    }

    fn encode(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.addr.octets());
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ipv4LookupResponse {
    pub addr: Ipv4Addr,
    pub metric: u32,
    pub nexthops: Vec<NextHop>,
}

impl WireCodec for Ipv4LookupResponse {
    fn decode(input: &[u8]) -> nom::IResult<&[u8], Self> {
        let (input, addr) = take_ipv4(input)?;
        let (input, metric) = be_u32(input)?;
        let (mut input, count) = be_u8(input)?;
        let mut nexthops = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let (rest, nh) = NextHop::decode(input)?;
            nexthops.push(nh);
            input = rest;
        }
        Ok((
            input,
            Self {
                addr,
                metric,
                nexthops,
            },
        ))
    }

    fn encode(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.addr.octets());
        buf.extend_from_slice(&self.metric.to_be_bytes());
        buf.push(self.nexthops.len() as u8);
        for nh in &self.nexthops {
            nh.encode(buf);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv6LookupQuery {
    pub addr: std::net::Ipv6Addr,
}

impl WireCodec for Ipv6LookupQuery {
    fn decode(input: &[u8]) -> nom::IResult<&[u8], Self> {
        let (input, bytes) = nom::bytes::complete::take(16usize)(input)?;
        let addr = std::net::Ipv6Addr::from(<[u8; 16]>::try_from(bytes).unwrap());
        Ok((input, Self { addr }))
    }

    fn encode(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.addr.octets());
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ipv6LookupResponse {
    pub addr: std::net::Ipv6Addr,
    pub metric: u32,
    pub nexthops: Vec<NextHop>,
}

impl WireCodec for Ipv6LookupResponse {
    fn decode(input: &[u8]) -> nom::IResult<&[u8], Self> {
        let (input, bytes) = nom::bytes::complete::take(16usize)(input)?;
        let addr = std::net::Ipv6Addr::from(<[u8; 16]>::try_from(bytes).unwrap());
        let (input, metric) = be_u32(input)?;
        let (mut input, count) = be_u8(input)?;
        let mut nexthops = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let (rest, nh) = NextHop::decode(input)?;
            nexthops.push(nh);
            input = rest;
        }
        Ok((
            input,
            Self {
                addr,
                metric,
                nexthops,
            },
        ))
    }

    fn encode(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.addr.octets());
        buf.extend_from_slice(&self.metric.to_be_bytes());
        buf.push(self.nexthops.len() as u8);
        for nh in &self.nexthops {
            nh.encode(buf);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportLookupQuery {
    pub prefixlen: u8,
    pub addr: Ipv4Addr,
}

impl WireCodec for ImportLookupQuery {
    fn decode(input: &[u8]) -> nom::IResult<&[u8], Self> {
        let (input, prefixlen) = be_u8(input)?;
        let (input, addr) = take_ipv4(input)?;
        Ok((input, Self { prefixlen, addr }))
    }

    fn encode(&self, buf: &mut Vec<u8>) {
        buf.push(self.prefixlen);
        buf.extend_from_slice(&self.addr.octets());
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportLookupResponse {
    pub addr: Ipv4Addr,
    pub metric: u32,
    /// Only the first nexthop is ever sent for an import-lookup response;
    /// `None` iff the daemon reported zero nexthops.
    pub nexthop: Option<NextHop>,
}

impl WireCodec for ImportLookupResponse {
    fn decode(input: &[u8]) -> nom::IResult<&[u8], Self> {
        let (input, addr) = take_ipv4(input)?;
        let (input, metric) = be_u32(input)?;
        let (input, count) = be_u8(input)?;
        if count == 0 {
            return Ok((
                input,
                Self {
                    addr,
                    metric,
                    nexthop: None,
                },
            ));
        }
        let (input, nh) = NextHop::decode(input)?;
        Ok((
            input,
            Self {
                addr,
                metric,
                nexthop: Some(nh),
            },
        ))
    }

    fn encode(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.addr.octets());
        buf.extend_from_slice(&self.metric.to_be_bytes());
        match &self.nexthop {
            Some(nh) => {
                buf.push(1);
                nh.encode(buf);
            }
            None => buf.push(0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RGateRecord {
    pub gate: Ipv4Addr,
    pub rgate: Ipv4Addr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RGateVerifyQuery {
    pub more_follows: bool,
    pub records: Vec<RGateRecord>,
}

impl WireCodec for RGateVerifyQuery {
    fn decode(input: &[u8]) -> nom::IResult<&[u8], Self> {
        let (input, more_follows) = be_u8(input)?;
        let (mut input, count) = be_u16(input)?;
        let mut records = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let (rest, gate) = take_ipv4(input)?;
            let (rest, rgate) = take_ipv4(rest)?;
            records.push(RGateRecord { gate, rgate });
            input = rest;
        }
        Ok((
            input,
            Self {
                more_follows: more_follows != 0,
                records,
            },
        ))
    }

    fn encode(&self, buf: &mut Vec<u8>) {
        buf.push(self.more_follows as u8);
        buf.extend_from_slice(&(self.records.len() as u16).to_be_bytes());
        for record in &self.records {
            buf.extend_from_slice(&record.gate.octets());
            buf.extend_from_slice(&record.rgate.octets());
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifyDesyncRecord {
    pub prefix: Ipv4Addr,
    pub prefixlen: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RGateVerifyResponse {
    pub more_follows: bool,
    pub records: Vec<VerifyDesyncRecord>,
}

impl WireCodec for RGateVerifyResponse {
    fn decode(input: &[u8]) -> nom::IResult<&[u8], Self> {
        let (input, more_follows) = be_u8(input)?;
        let (mut input, count) = be_u16(input)?;
        let mut records = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let (rest, prefix) = take_ipv4(input)?;
            let (rest, prefixlen) = be_u8(rest)?;
            records.push(VerifyDesyncRecord { prefix, prefixlen });
            input = rest;
        }
        Ok((
            input,
            Self {
                more_follows: more_follows != 0,
                records,
            },
        ))
    }

    fn encode(&self, buf: &mut Vec<u8>) {
        buf.push(self.more_follows as u8);
        buf.extend_from_slice(&(self.records.len() as u16).to_be_bytes());
        for record in &self.records {
            buf.extend_from_slice(&record.prefix.octets());
            buf.push(record.prefixlen);
        }
    }
}

/// Wraps `body` in a framed header for `command`, back-patching
/// `total_length` once the body has been appended.
pub fn encode_framed<T: WireCodec>(command: u16, body: &T) -> Result<Vec<u8>, WireError> {
    let mut buf = Vec::new();
    MessageHeader::encode_placeholder(command, &mut buf);
    body.encode(&mut buf);
    MessageHeader::backpatch_length(&mut buf)?;
    Ok(buf)
}

/// Decodes a body of known type `T`, requiring every byte to be consumed —
/// trailing garbage after a fully-parsed body indicates a desynchronised
/// stream and is treated as malformed rather than silently ignored.
pub fn decode_body<T: WireCodec>(body: &[u8]) -> Result<T, WireError> {
    let (rest, value) =
        T::decode(body).map_err(|err| WireError::Malformed(format!("{err:?}")))?;
    if !rest.is_empty() {
        return Err(WireError::Malformed(format!(
            "{} trailing byte(s) after body",
            rest.len()
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nexthop::NextHop;

    #[test]
    fn ipv4_lookup_response_round_trips() {
        let resp = Ipv4LookupResponse {
            addr: Ipv4Addr::new(192, 0, 2, 1),
            metric: 20,
            nexthops: vec![NextHop::Ipv4Gate(Ipv4Addr::new(192, 0, 2, 254))],
        };
        let framed = encode_framed(Command::Ipv4NexthopLookup.into(), &resp).unwrap();
        let (body, header) = MessageHeader::decode(&framed).unwrap();
        assert_eq!(header.total_length as usize, framed.len());
        let decoded: Ipv4LookupResponse = decode_body(body).unwrap();
        assert_eq!(decoded, resp);
    }

    #[test]
    fn import_lookup_response_no_nexthop() {
        let resp = ImportLookupResponse {
            addr: Ipv4Addr::UNSPECIFIED,
            metric: 0,
            nexthop: None,
        };
        let mut buf = Vec::new();
        resp.encode(&mut buf);
        let decoded: ImportLookupResponse = decode_body(&buf).unwrap();
        assert_eq!(decoded, resp);
    }

    #[test]
    fn rgate_verify_query_batches_round_trip() {
        let query = RGateVerifyQuery {
            more_follows: true,
            records: vec![RGateRecord {
                gate: Ipv4Addr::new(10, 0, 0, 1),
                rgate: Ipv4Addr::new(10, 0, 0, 2),
            }],
        };
        let mut buf = Vec::new();
        query.encode(&mut buf);
        let decoded: RGateVerifyQuery = decode_body(&buf).unwrap();
        assert_eq!(decoded, query);
    }

    #[test]
    fn rgate_verify_response_empty_terminal_batch() {
        let resp = RGateVerifyResponse {
            more_follows: false,
            records: vec![],
        };
        let mut buf = Vec::new();
        resp.encode(&mut buf);
        let decoded: RGateVerifyResponse = decode_body(&buf).unwrap();
        assert_eq!(decoded, resp);
        assert!(!decoded.more_follows);
        assert!(decoded.records.is_empty());
    }
}
