use crate::WireError;
use nom::number::complete::{be_u16, be_u8};

/// `ZSERV_MARKER` and `ZSERV_VERSION` are part of the wire ABI: a mismatch
/// on either aborts the exchange (spec.md §6).
pub const ZSERV_MARKER: u8 = 0xFF;
pub const ZSERV_VERSION: u8 = 4;

/// `total_length(2) + marker(1) + version(1) + command(2)`.
pub const HEADER_SIZE: usize = 6;

#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub struct MessageHeader {
    /// Total message length including this header, as it appears on the
    /// wire (big-endian).
    pub total_length: u16,
    pub command: u16,
}

impl MessageHeader {
    /// Parses the fixed six-byte header out of a buffer that already holds
    /// the full `total_length` bytes (the caller reads the length prefix
    /// first, then reads the rest before calling this).
    pub fn decode(input: &[u8]) -> Result<(&[u8], MessageHeader), WireError> {
        let (input, total_length) =
            be_u16::<_, nom::error::Error<&[u8]>>(input).map_err(|_| WireError::ShortRead {
                expected: 2,
                got: input.len(),
            })?;
        let (input, marker) = be_u8::<_, nom::error::Error<&[u8]>>(input).map_err(|_| WireError::ShortRead {
            expected: 1,
            got: input.len(),
        })?;
        if marker != ZSERV_MARKER {
            return Err(WireError::BadMarker {
                expected: ZSERV_MARKER,
                got: marker,
            });
        }
        let (input, version) = be_u8::<_, nom::error::Error<&[u8]>>(input).map_err(|_| WireError::ShortRead {
            expected: 1,
            got: input.len(),
        })?;
        if version != ZSERV_VERSION {
            return Err(WireError::BadVersion {
                expected: ZSERV_VERSION,
                got: version,
            });
        }
        let (input, command) = be_u16::<_, nom::error::Error<&[u8]>>(input).map_err(|_| WireError::ShortRead {
            expected: 2,
            got: input.len(),
        })?;
        Ok((input, MessageHeader { total_length, command }))
    }

    /// Writes a header with `total_length` left as a placeholder `0`; the
    /// caller back-patches offset 0 once the body has been appended, per
    /// spec.md §4.1 ("writers fill in total_length last").
    pub fn encode_placeholder(command: u16, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&0u16.to_be_bytes());
        buf.push(ZSERV_MARKER);
        buf.push(ZSERV_VERSION);
        buf.extend_from_slice(&command.to_be_bytes());
    }

    /// Back-patches the `total_length` field of a buffer produced by
    /// [`encode_placeholder`] followed by the message body.
    pub fn backpatch_length(buf: &mut [u8]) -> Result<(), WireError> {
        if buf.len() > u16::MAX as usize {
            return Err(WireError::TooLarge(buf.len()));
        }
        let len = buf.len() as u16;
        buf[0..2].copy_from_slice(&len.to_be_bytes());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_round_trips() {
        let mut buf = Vec::new();
        MessageHeader::encode_placeholder(7, &mut buf);
        buf.extend_from_slice(&[1, 2, 3]);
        MessageHeader::backpatch_length(&mut buf).unwrap();

        let (rest, header) = MessageHeader::decode(&buf).unwrap();
        assert_eq!(header.command, 7);
        assert_eq!(header.total_length as usize, buf.len());
        assert_eq!(rest, &[1, 2, 3]);
    }

    #[test]
    fn rejects_bad_marker() {
        let mut buf = vec![0, 9, 0x00, ZSERV_VERSION, 0, 1];
        buf[0..2].copy_from_slice(&6u16.to_be_bytes());
        let err = MessageHeader::decode(&buf).unwrap_err();
        assert!(matches!(err, WireError::BadMarker { .. }));
    }

    #[test]
    fn rejects_bad_version() {
        let mut buf = vec![0, 0, ZSERV_MARKER, 0xEE, 0, 1];
        buf[0..2].copy_from_slice(&6u16.to_be_bytes());
        let err = MessageHeader::decode(&buf).unwrap_err();
        assert!(matches!(err, WireError::BadVersion { .. }));
    }
}
