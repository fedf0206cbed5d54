use nom::bytes::streaming::take;
use nom::combinator::map;
use nom::{Err, IResult};

use crate::endianness::{PcapBE, PcapEndianness, PcapLE};
use crate::error::PcapError;

use super::*;

/// A block from a PcapNG file
#[derive(Debug)]
pub enum Block<'a> {
    SectionHeader(SectionHeaderBlock),
    InterfaceDescription(InterfaceDescriptionBlock<'a>),
    EnhancedPacket(EnhancedPacketBlock<'a>),
    SimplePacket(SimplePacketBlock<'a>),
    Packet(PacketBlock<'a>),
    Unknown(UnknownBlock<'a>),
}

impl<'a> Block<'a> {
    /// Return the normalized magic number of the block
    pub fn magic(&self) -> u32 {
        match self {
            Block::SectionHeader(_) => SHB_MAGIC,
            Block::InterfaceDescription(_) => IDB_MAGIC,
            Block::EnhancedPacket(_) => EPB_MAGIC,
            Block::SimplePacket(_) => SPB_MAGIC,
            Block::Packet(_) => PB_MAGIC,
            Block::Unknown(ub) => ub.block_type,
        }
    }

    /// Total length of the block, as declared by its leading length field
    pub fn block_len(&self) -> u32 {
        match self {
            Block::SectionHeader(b) => b.block_len1,
            Block::InterfaceDescription(b) => b.block_len1,
            Block::EnhancedPacket(b) => b.block_len1,
            Block::SimplePacket(b) => b.block_len1,
            Block::Packet(b) => b.block_len1,
            Block::Unknown(b) => b.block_len1,
        }
    }
}

fn parse_block_generic<En: PcapEndianness>(i: &[u8]) -> IResult<&[u8], Block, PcapError> {
    let (_, id) = En::parse_u32(i)?;
    match id {
        SHB_MAGIC => map(
            ng_block_parser::<SectionHeaderBlock, En, _>(),
            Block::SectionHeader,
        )(i),
        IDB_MAGIC => map(
            ng_block_parser::<InterfaceDescriptionBlock, En, _>(),
            Block::InterfaceDescription,
        )(i),
        EPB_MAGIC => map(
            ng_block_parser::<EnhancedPacketBlock, En, _>(),
            Block::EnhancedPacket,
        )(i),
        SPB_MAGIC => map(
            ng_block_parser::<SimplePacketBlock, En, _>(),
            Block::SimplePacket,
        )(i),
        PB_MAGIC => map(ng_block_parser::<PacketBlock, En, _>(), Block::Packet)(i),
        _ => map(ng_block_parser::<UnknownBlock, En, _>(), Block::Unknown)(i),
    }
}

/// Parse any block, as little-endian
///
/// To find which endianess to use, read the section header
/// using `parse_sectionheaderblock`
pub fn parse_block_le(i: &[u8]) -> IResult<&[u8], Block, PcapError> {
    parse_block_generic::<PcapLE>(i)
}

/// Parse any block, as big-endian
///
/// To find which endianess to use, read the section header
/// using `parse_sectionheaderblock`
pub fn parse_block_be(i: &[u8]) -> IResult<&[u8], Block, PcapError> {
    parse_block_generic::<PcapBE>(i)
}

/// Parse any block, using the section endianness
#[inline]
pub fn parse_block(i: &[u8], big_endian: bool) -> IResult<&[u8], Block, PcapError> {
    if big_endian {
        parse_block_be(i)
    } else {
        parse_block_le(i)
    }
}

pub(crate) trait PcapNGBlockParser<'a, En: PcapEndianness, O: 'a> {
    /// Minimum header size, in bytes
    const HDR_SZ: usize;
    /// Normalized magic number for this block type (0 accepts any type)
    const MAGIC: u32;

    // caller function must have tested header type(magic) and length
    fn inner_parse(
        block_type: u32,
        block_len1: u32,
        i: &'a [u8],
        block_len2: u32,
    ) -> IResult<&'a [u8], O, PcapError>;
}

/// Create a block parser function, given the parameters (block object and endianness)
///
/// Only the leading length field decides how many bytes the block spans. The
/// trailing copy is consumed and handed to the block, never compared.
pub(crate) fn ng_block_parser<'a, P, En, O>() -> impl FnMut(&'a [u8]) -> IResult<&'a [u8], O, PcapError>
where
    P: PcapNGBlockParser<'a, En, O>,
    En: PcapEndianness,
    O: 'a,
{
    move |i: &'a [u8]| {
        // read generic block layout
        //
        if i.len() < P::HDR_SZ {
            return Err(Err::Incomplete(nom::Needed::new(P::HDR_SZ - i.len())));
        }
        let (i, block_type) = En::parse_u32(i)?;
        let (i, block_len1) = En::parse_u32(i)?;
        if block_len1 < P::HDR_SZ as u32 {
            return Err(Err::Error(PcapError::MalformedBlock(block_type)));
        }
        if P::MAGIC != 0 && block_type != P::MAGIC {
            return Err(Err::Error(PcapError::MalformedBlock(block_type)));
        }
        // 12 is block_type (4) + block_len1 (4) + block_len2 (4)
        let (i, block_content) = take(block_len1 - 12)(i)?;
        let (i, block_len2) = En::parse_u32(i)?;
        // call block content parsing function
        let (_, b) = P::inner_parse(block_type, block_len1, block_content, block_len2)?;
        // return the remaining bytes from the container, not content
        Ok((i, b))
    }
}
