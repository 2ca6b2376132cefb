/// Sample layout every recognizer session expects: signed 16-bit
/// little-endian samples at a fixed rate and channel count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmProfile {
    pub sample_rate: u32,
    pub channels: u16,
}

impl PcmProfile {
    pub const SPEECH: PcmProfile = PcmProfile {
        sample_rate: 16_000,
        channels: 1,
    };

    pub fn matches(&self, sample_rate: u32, channels: u16) -> bool {
        self.sample_rate == sample_rate && self.channels == channels
    }
}

impl Default for PcmProfile {
    fn default() -> Self {
        Self::SPEECH
    }
}
