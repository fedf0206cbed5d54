/// Common methods for PcapNG blocks that carry a network packet
pub trait PcapNGPacketBlock {
    /// Original packet length
    fn orig_len(&self) -> u32;
    /// Network packet data (captured bytes, padding removed)
    fn packet_data(&self) -> &[u8];
    /// Raw timestamp words `(high, low)`, or `None` if the block has no timestamp
    fn timestamp(&self) -> Option<(u32, u32)>;

    /// Number of bytes actually captured
    fn captured_len(&self) -> u32 {
        self.packet_data().len() as u32
    }
}
