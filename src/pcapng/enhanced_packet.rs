use nom::{Err, IResult};
use rusticata_macros::align32;

use crate::endianness::{PcapBE, PcapEndianness, PcapLE};
use crate::error::PcapError;
use crate::traits::PcapNGPacketBlock;
use crate::utils::array_ref4;

use super::*;

/// An Enhanced Packet Block (EPB) is the standard container for storing
/// the packets coming from the network.
///
/// This struct is a thin abstraction layer, and stores the raw block data.
/// For ex the `data` field is stored with the padding.
/// It implements the `PcapNGPacketBlock` trait, which provides helper functions.
#[derive(Debug)]
pub struct EnhancedPacketBlock<'a> {
    /// Block type, normalized with the section endianness
    pub block_type: u32,
    pub block_len1: u32,
    pub if_id: u32,
    pub ts_high: u32,
    pub ts_low: u32,
    /// Captured packet length
    pub caplen: u32,
    /// Original packet length
    pub origlen: u32,
    /// Raw data from packet (with padding)
    pub data: &'a [u8],
    /// Raw options area
    pub options: &'a [u8],
    pub block_len2: u32,
}

impl<'a> PcapNGPacketBlock for EnhancedPacketBlock<'a> {
    fn orig_len(&self) -> u32 {
        self.origlen
    }
    fn packet_data(&self) -> &[u8] {
        let caplen = self.caplen as usize;
        if caplen < self.data.len() {
            &self.data[..caplen]
        } else {
            self.data
        }
    }
    fn timestamp(&self) -> Option<(u32, u32)> {
        Some((self.ts_high, self.ts_low))
    }
}

impl<'a, En: PcapEndianness> PcapNGBlockParser<'a, En, EnhancedPacketBlock<'a>>
    for EnhancedPacketBlock<'a>
{
    const HDR_SZ: usize = 32;
    const MAGIC: u32 = EPB_MAGIC;

    fn inner_parse(
        block_type: u32,
        block_len1: u32,
        i: &'a [u8],
        block_len2: u32,
    ) -> IResult<&'a [u8], EnhancedPacketBlock<'a>, PcapError> {
        // caller function already tested header type(magic) and length
        // read end of header
        let (b_hdr, packet_data) = i.split_at(20);
        let if_id = En::u32_from_bytes(array_ref4(b_hdr, 0));
        let ts_high = En::u32_from_bytes(array_ref4(b_hdr, 4));
        let ts_low = En::u32_from_bytes(array_ref4(b_hdr, 8));
        let caplen = En::u32_from_bytes(array_ref4(b_hdr, 12));
        let origlen = En::u32_from_bytes(array_ref4(b_hdr, 16));
        // read packet data
        // the whole block is already buffered: a payload past its end is corrupt, not incomplete
        if caplen as usize > packet_data.len() {
            return Err(Err::Error(PcapError::MalformedBlock(block_type)));
        }
        let padded_length = (align32!(caplen as usize)).min(packet_data.len());
        let (data, options) = packet_data.split_at(padded_length);
        let rem = &options[options.len()..];
        let block = EnhancedPacketBlock {
            block_type,
            block_len1,
            if_id,
            ts_high,
            ts_low,
            caplen,
            origlen,
            data,
            options,
            block_len2,
        };
        Ok((rem, block))
    }
}

/// Parse an Enhanced Packet Block (little-endian)
pub fn parse_enhancedpacketblock_le(i: &[u8]) -> IResult<&[u8], EnhancedPacketBlock, PcapError> {
    ng_block_parser::<EnhancedPacketBlock, PcapLE, _>()(i)
}

/// Parse an Enhanced Packet Block (big-endian)
pub fn parse_enhancedpacketblock_be(i: &[u8]) -> IResult<&[u8], EnhancedPacketBlock, PcapError> {
    ng_block_parser::<EnhancedPacketBlock, PcapBE, _>()(i)
}
