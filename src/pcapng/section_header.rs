use nom::{Err, IResult};

use crate::endianness::{PcapBE, PcapEndianness, PcapLE};
use crate::error::PcapError;
use crate::utils::array_ref4;

use super::*;

/// The Section Header Block (SHB) identifies the
/// beginning of a section of the capture capture file.
///
/// The
/// Section Header Block does not contain data but it rather identifies a
/// list of blocks (interfaces, packets) that are logically correlated.
/// Its options are not retained.
#[derive(Debug)]
pub struct SectionHeaderBlock {
    pub block_type: u32,
    pub block_len1: u32,
    /// Byte-order magic, read with the section endianness
    pub bom: u32,
    pub major_version: u16,
    pub minor_version: u16,
    pub section_len: i64,
    pub big_endian: bool,
    pub block_len2: u32,
}

impl SectionHeaderBlock {
    pub fn big_endian(&self) -> bool {
        self.big_endian
    }
}

impl<'a, En: PcapEndianness> PcapNGBlockParser<'a, En, SectionHeaderBlock> for SectionHeaderBlock {
    const HDR_SZ: usize = 28;
    const MAGIC: u32 = SHB_MAGIC;

    fn inner_parse(
        block_type: u32,
        block_len1: u32,
        i: &'a [u8],
        block_len2: u32,
    ) -> IResult<&'a [u8], SectionHeaderBlock, PcapError> {
        // caller function already tested header type(magic) and length
        // read end of header
        let (i, bom) = En::parse_u32(i)?;
        let (i, major_version) = En::parse_u16(i)?;
        let (i, minor_version) = En::parse_u16(i)?;
        let (i, section_len) = En::parse_u64(i)?;
        let block = SectionHeaderBlock {
            block_type,
            block_len1,
            bom,
            major_version,
            minor_version,
            section_len: section_len as i64,
            big_endian: En::BIG_ENDIAN,
            block_len2,
        };
        Ok((i, block))
    }
}

/// Parse a Section Header Block (little endian)
pub fn parse_sectionheaderblock_le(i: &[u8]) -> IResult<&[u8], SectionHeaderBlock, PcapError> {
    ng_block_parser::<SectionHeaderBlock, PcapLE, _>()(i)
}

/// Parse a Section Header Block (big endian)
pub fn parse_sectionheaderblock_be(i: &[u8]) -> IResult<&[u8], SectionHeaderBlock, PcapError> {
    ng_block_parser::<SectionHeaderBlock, PcapBE, _>()(i)
}

/// Parse a SectionHeaderBlock (little or big endian)
///
/// The byte-order magic at offset 8 selects the endianness. It is read before
/// the block length, which depends on it.
pub fn parse_sectionheaderblock(i: &[u8]) -> IResult<&[u8], SectionHeaderBlock, PcapError> {
    if i.len() < 12 {
        return Err(Err::Incomplete(nom::Needed::new(12 - i.len())));
    }
    let bom = u32::from_le_bytes(array_ref4(i, 8));
    if bom == BOM_MAGIC {
        parse_sectionheaderblock_le(i)
    } else if bom == BOM_MAGIC.swap_bytes() {
        parse_sectionheaderblock_be(i)
    } else {
        Err(Err::Error(PcapError::InvalidMagic(bom)))
    }
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;

    use super::*;

    const SHB_LE: &[u8] = &hex!(
        "
0A 0D 0D 0A 1C 00 00 00 4D 3C 2B 1A 01 00 00 00
FF FF FF FF FF FF FF FF 1C 00 00 00"
    );

    const SHB_BE: &[u8] = &hex!(
        "
0A 0D 0D 0A 00 00 00 1C 1A 2B 3C 4D 00 01 00 00
FF FF FF FF FF FF FF FF 00 00 00 1C"
    );

    #[test]
    fn section_header_le() {
        let (rem, shb) = parse_sectionheaderblock(SHB_LE).expect("SHB parsing failed");
        assert!(rem.is_empty());
        assert!(!shb.big_endian());
        assert_eq!(shb.bom, BOM_MAGIC);
        assert_eq!(shb.block_len1, 28);
        assert_eq!((shb.major_version, shb.minor_version), (1, 0));
        assert_eq!(shb.section_len, -1);
    }

    #[test]
    fn section_header_be() {
        let (rem, shb) = parse_sectionheaderblock(SHB_BE).expect("SHB parsing failed");
        assert!(rem.is_empty());
        assert!(shb.big_endian());
        assert_eq!(shb.bom, BOM_MAGIC);
        assert_eq!(shb.block_len1, 28);
    }

    #[test]
    fn section_header_bad_bom() {
        let mut data = SHB_LE.to_vec();
        data[8] = 0;
        assert!(matches!(
            parse_sectionheaderblock(&data),
            Err(Err::Error(PcapError::InvalidMagic(_)))
        ));
    }
}
