use nom::bytes::streaming::take;
use nom::IResult;

use crate::endianness::{PcapBE, PcapEndianness, PcapLE};
use crate::error::PcapError;
use crate::utils::array_ref4;

/// Size of a legacy record header
pub const PCAP_FRAME_HEADER_SIZE: usize = 16;

/// Container for network data in legacy Pcap files
#[derive(Debug)]
pub struct LegacyPcapBlock<'a> {
    pub ts_sec: u32,
    /// Sub-second part, in the unit declared by the global header magic
    pub ts_frac: u32,
    pub caplen: u32,
    pub origlen: u32,
    pub data: &'a [u8],
}

fn parse_frame<En: PcapEndianness>(
    i: &[u8],
    snaplen: u32,
) -> IResult<&[u8], LegacyPcapBlock, PcapError> {
    if i.len() < PCAP_FRAME_HEADER_SIZE {
        return Err(nom::Err::Incomplete(nom::Needed::new(
            PCAP_FRAME_HEADER_SIZE - i.len(),
        )));
    }
    let ts_sec = En::u32_from_bytes(array_ref4(i, 0));
    let ts_frac = En::u32_from_bytes(array_ref4(i, 4));
    let caplen = En::u32_from_bytes(array_ref4(i, 8));
    let origlen = En::u32_from_bytes(array_ref4(i, 12));
    // checked before asking for the payload, so a corrupt length never grows the buffer
    if caplen > snaplen {
        return Err(nom::Err::Failure(PcapError::PacketTooLarge { caplen, snaplen }));
    }
    let (i, data) = take(caplen as usize)(&i[PCAP_FRAME_HEADER_SIZE..])?;
    let block = LegacyPcapBlock {
        ts_sec,
        ts_frac,
        caplen,
        origlen,
        data,
    };
    Ok((i, block))
}

/// Read a PCAP record header and data
///
/// Each PCAP record starts with a small header, and is followed by packet data.
/// The packet data format depends on the LinkType. A record whose captured length
/// exceeds `snaplen` fails with `PcapError::PacketTooLarge`.
pub fn parse_pcap_frame(i: &[u8], snaplen: u32) -> IResult<&[u8], LegacyPcapBlock, PcapError> {
    parse_frame::<PcapLE>(i, snaplen)
}

/// Read a PCAP record header and data (big-endian)
///
/// Each PCAP record starts with a small header, and is followed by packet data.
/// The packet data format depends on the LinkType.
pub fn parse_pcap_frame_be(i: &[u8], snaplen: u32) -> IResult<&[u8], LegacyPcapBlock, PcapError> {
    parse_frame::<PcapBE>(i, snaplen)
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;

    use super::*;

    const FRAME_LE: &[u8] = &hex!(
        "
10 00 00 00 20 00 00 00 04 00 00 00 3C 00 00 00
DE AD BE EF FF"
    );

    #[test]
    fn frame_little_endian() {
        let (rem, frame) = parse_pcap_frame(FRAME_LE, 65535).expect("frame parsing failed");
        assert_eq!(rem, &[0xff]);
        assert_eq!(frame.ts_sec, 16);
        assert_eq!(frame.ts_frac, 32);
        assert_eq!(frame.caplen, 4);
        assert_eq!(frame.origlen, 60);
        assert_eq!(frame.data, &hex!("DE AD BE EF"));
    }

    #[test]
    fn frame_big_endian() {
        let data = hex!("00 00 00 10 00 00 00 20 00 00 00 02 00 00 00 02 CA FE");
        let (rem, frame) = parse_pcap_frame_be(&data, 65535).expect("frame parsing failed");
        assert!(rem.is_empty());
        assert_eq!(frame.ts_sec, 16);
        assert_eq!(frame.caplen, 2);
        assert_eq!(frame.data, &hex!("CA FE"));
    }

    #[test]
    fn frame_exceeds_snaplen() {
        match parse_pcap_frame(FRAME_LE, 3) {
            Err(nom::Err::Failure(PcapError::PacketTooLarge { caplen, snaplen })) => {
                assert_eq!((caplen, snaplen), (4, 3));
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn frame_truncated_payload() {
        assert!(matches!(
            parse_pcap_frame(&FRAME_LE[..18], 65535),
            Err(nom::Err::Incomplete(_))
        ));
        assert!(matches!(
            parse_pcap_frame(&FRAME_LE[..7], 65535),
            Err(nom::Err::Incomplete(_))
        ));
    }
}
