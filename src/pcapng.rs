//! PCAPNG file format
//!
//! See <https://github.com/pcapng/pcapng> for details.
//!
//! ## File format and parsing
//!
//! A capture file is organized in blocks. Every block starts with a block type
//! and a total length, and ends with a second copy of the total length. The
//! stream opens with a Section Header Block (SHB), whose byte-order magic fixes
//! the endianness of every following field, then an Interface Description Block
//! (IDB) declaring the link type, snap length and timestamp resolution.
//! Packets follow in Enhanced Packet (EPB), Simple Packet (SPB) or obsolete
//! Packet (PB) blocks.
//!
//! Read the first block with [`parse_sectionheaderblock`], then loop over
//! [`parse_block_le`] or [`parse_block_be`] (or [`parse_block`] with the
//! section endianness).
//!
//! Only one section and one interface are handled: later SHB and IDB blocks
//! decode as their own variants so the caller can report and skip them.

mod block;
mod enhanced_packet;
mod interface_description;
mod option;
mod packet;
mod section_header;
mod simple_packet;
mod time;
mod unknown;

pub use block::*;
pub use enhanced_packet::*;
pub use interface_description::*;
pub use option::*;
pub use packet::*;
pub use section_header::*;
pub use simple_packet::*;
pub use time::*;
pub use unknown::*;

/// Section Header Block magic
pub const SHB_MAGIC: u32 = 0x0A0D_0D0A;
/// Interface Description Block magic
pub const IDB_MAGIC: u32 = 0x0000_0001;
/// Packet Block magic (obsolete)
pub const PB_MAGIC: u32 = 0x0000_0002;
/// Simple Packet Block magic
pub const SPB_MAGIC: u32 = 0x0000_0003;
/// Enhanced Packet Block magic
pub const EPB_MAGIC: u32 = 0x0000_0006;

/// Byte Order magic
pub const BOM_MAGIC: u32 = 0x1A2B_3C4D;
