//! Legacy PCAP file format
//!
//! See <https://wiki.wireshark.org/Development/LibpcapFileFormat> for details.
//!
//! A legacy capture is a 24-byte global header followed by records, each a
//! 16-byte header and `caplen` bytes of data. The magic number selects the byte
//! order and the sub-second unit of every record:
//!
//! | magic (read as little-endian) | byte order | unit |
//! |---|---|---|
//! | `0xa1b2c3d4` | little | µs |
//! | `0xa1b23c4d` | little | ns |
//! | `0xd4c3b2a1` | big | µs |
//! | `0x4d3cb2a1` | big | ns |
//!
//! Parse the header with [`parse_pcap_header`], then loop over
//! [`parse_pcap_frame`] or [`parse_pcap_frame_be`].

mod frame;
mod header;

pub use frame::*;
pub use header::*;
