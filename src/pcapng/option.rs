use rusticata_macros::{align32, newtype_enum};

use crate::error::PcapError;

#[derive(Clone, Copy, Eq, PartialEq)]
pub struct OptionCode(pub u16);

newtype_enum! {
impl debug OptionCode {
    EndOfOpt = 0,
    Comment = 1,
    IfName = 2,
    IfDescription = 3,
    IfIpv4Addr = 4,
    IfIpv6Addr = 5,
    IfMacAddr = 6,
    IfEuiAddr = 7,
    IfSpeed = 8,
    IfTsresol = 9,
    IfTzone = 10,
    IfFilter = 11,
    IfOs = 12,
    IfFcslen = 13,
    IfTsoffset = 14,
}
}

/// A single option, borrowed from the block that carries it
#[derive(Debug)]
pub struct PcapNGOption<'a> {
    pub code: OptionCode,
    /// Declared value length, without padding
    pub len: u16,
    /// Option value (`len` bytes, padding removed)
    pub value: &'a [u8],
    big_endian: bool,
}

impl<'a> PcapNGOption<'a> {
    /// Return a reference to the option value
    #[inline]
    pub fn value(&self) -> &[u8] {
        self.value
    }

    /// Return the first byte of the value, or None if the value is empty
    pub fn as_u8(&self) -> Option<u8> {
        self.value.first().copied()
    }

    /// Return the option value interpreted as i32 in the section byte order, or None
    ///
    /// Option data length and declared must be exactly 4 bytes
    pub fn as_i32(&self) -> Option<i32> {
        if self.len != 4 {
            return None;
        }
        let bytes = <[u8; 4]>::try_from(self.value).ok()?;
        if self.big_endian {
            Some(i32::from_be_bytes(bytes))
        } else {
            Some(i32::from_le_bytes(bytes))
        }
    }
}

/// Iterator over the options trailing a block body
///
/// Each option is `(code: u16, length: u16, value)`, the value padded to 4
/// bytes. Iteration ends at the end of the area or at `EndOfOpt`. An option whose
/// header or value runs past the end yields `PcapError::TruncatedOption` once,
/// then iteration stops.
#[derive(Debug)]
pub struct PcapNGOptions<'a> {
    rem: &'a [u8],
    big_endian: bool,
}

impl<'a> PcapNGOptions<'a> {
    pub fn new(data: &'a [u8], big_endian: bool) -> Self {
        PcapNGOptions {
            rem: data,
            big_endian,
        }
    }

    fn read_u16(&self, offset: usize) -> u16 {
        let bytes = [self.rem[offset], self.rem[offset + 1]];
        if self.big_endian {
            u16::from_be_bytes(bytes)
        } else {
            u16::from_le_bytes(bytes)
        }
    }
}

impl<'a> Iterator for PcapNGOptions<'a> {
    type Item = Result<PcapNGOption<'a>, PcapError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rem.is_empty() {
            return None;
        }
        if self.rem.len() < 4 {
            self.rem = &[];
            return Some(Err(PcapError::TruncatedOption));
        }
        let code = OptionCode(self.read_u16(0));
        let len = self.read_u16(2);
        if code == OptionCode::EndOfOpt {
            self.rem = &[];
            return None;
        }
        let body = &self.rem[4..];
        if len as usize > body.len() {
            self.rem = &[];
            return Some(Err(PcapError::TruncatedOption));
        }
        let value = &body[..len as usize];
        // the final padding may be omitted by some writers
        let padded_len = align32!(len as usize).min(body.len());
        self.rem = &body[padded_len..];
        Some(Ok(PcapNGOption {
            code,
            len,
            value,
            big_endian: self.big_endian,
        }))
    }
}
