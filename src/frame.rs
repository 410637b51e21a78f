/// Default sample rate of the microphone firmware (Hz)
pub const DEFAULT_SAMPLE_RATE: u32 = 16_000;

/// Layout of one recorded frame: mono, 16-bit little-endian signed PCM
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSpec {
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
}

impl Default for FrameSpec {
    fn default() -> Self {
        Self::mono_i16(DEFAULT_SAMPLE_RATE)
    }
}

impl FrameSpec {
    pub fn mono_i16(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            channels: 1,
            bits_per_sample: 16,
        }
    }

    pub fn bytes_per_frame(&self) -> usize {
        self.channels as usize * (self.bits_per_sample as usize / 8)
    }

    /// Exact PCM byte count for a recording of `seconds`, `None` if it
    /// does not fit in `usize`
    pub fn byte_budget(&self, seconds: u32) -> Option<usize> {
        (seconds as usize)
            .checked_mul(self.sample_rate as usize)?
            .checked_mul(self.bytes_per_frame())
    }

    /// Decode whole LE i16 frames; a trailing odd byte is ignored
    pub fn decode(bytes: &[u8]) -> impl Iterator<Item = i16> + '_ {
        bytes
            .chunks_exact(2)
            .map(|chunk| i16::from_le_bytes([chunk[0], chunk[1]]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_budget() {
        let spec = FrameSpec::default();
        assert_eq!(spec.bytes_per_frame(), 2);
        assert_eq!(spec.byte_budget(1), Some(32_000));
        assert_eq!(spec.byte_budget(10), Some(320_000));
    }

    #[test]
    fn test_budget_overflow_detected() {
        // (2^32 - 1)^2 * 2 exceeds a 64-bit usize, and 32-bit targets overflow sooner
        let spec = FrameSpec::mono_i16(u32::MAX);
        assert_eq!(spec.byte_budget(u32::MAX), None);
        assert_eq!(spec.byte_budget(0), Some(0));
    }

    #[test]
    fn test_decode_little_endian() {
        let bytes = [0x01, 0x00, 0xff, 0xff, 0x00, 0x80, 0x7f];
        let samples: Vec<i16> = FrameSpec::decode(&bytes).collect();
        assert_eq!(samples, vec![1, -1, i16::MIN]);
    }
}
