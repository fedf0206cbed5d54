use nom::{Err, IResult};
use rusticata_macros::align32;

use crate::endianness::{PcapBE, PcapEndianness, PcapLE};
use crate::error::PcapError;
use crate::traits::PcapNGPacketBlock;

use super::*;

/// The (obsolete) Packet Block, superseded by the Enhanced Packet Block.
///
/// Same layout as an EPB, except the interface id is 16 bits wide and followed
/// by a 16-bit drops count.
#[derive(Debug)]
pub struct PacketBlock<'a> {
    pub block_type: u32,
    pub block_len1: u32,
    pub if_id: u16,
    pub drops_count: u16,
    pub ts_high: u32,
    pub ts_low: u32,
    pub caplen: u32,
    pub origlen: u32,
    /// Raw data from packet (with padding)
    pub data: &'a [u8],
    pub block_len2: u32,
}

impl<'a> PcapNGPacketBlock for PacketBlock<'a> {
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

impl<'a, En: PcapEndianness> PcapNGBlockParser<'a, En, PacketBlock<'a>> for PacketBlock<'a> {
    const HDR_SZ: usize = 32;
    const MAGIC: u32 = PB_MAGIC;

    fn inner_parse(
        block_type: u32,
        block_len1: u32,
        i: &'a [u8],
        block_len2: u32,
    ) -> IResult<&'a [u8], PacketBlock<'a>, PcapError> {
        let (i, if_id) = En::parse_u16(i)?;
        let (i, drops_count) = En::parse_u16(i)?;
        let (i, ts_high) = En::parse_u32(i)?;
        let (i, ts_low) = En::parse_u32(i)?;
        let (i, caplen) = En::parse_u32(i)?;
        let (i, origlen) = En::parse_u32(i)?;
        if caplen as usize > i.len() {
            return Err(Err::Error(PcapError::MalformedBlock(block_type)));
        }
        // options, if any, are ignored
        let padded_length = (align32!(caplen as usize)).min(i.len());
        let (data, rem) = i.split_at(padded_length);
        let block = PacketBlock {
            block_type,
            block_len1,
            if_id,
            drops_count,
            ts_high,
            ts_low,
            caplen,
            origlen,
            data,
            block_len2,
        };
        Ok((rem, block))
    }
}

/// Parse a Packet Block (little-endian)
pub fn parse_packetblock_le(i: &[u8]) -> IResult<&[u8], PacketBlock, PcapError> {
    ng_block_parser::<PacketBlock, PcapLE, _>()(i)
}

/// Parse a Packet Block (big-endian)
pub fn parse_packetblock_be(i: &[u8]) -> IResult<&[u8], PacketBlock, PcapError> {
    ng_block_parser::<PacketBlock, PcapBE, _>()(i)
}
