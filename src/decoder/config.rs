//! Decoder configuration

use crate::types::{CodecId, HwAccel};

/// Decoder configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Codec of the incoming bitstream
    pub codec_id: CodecId,

    /// Software or hardware decoding path
    pub hw_accel: HwAccel,

    /// Number of decoding threads (0 = FFmpeg default)
    pub thread_count: u32,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            codec_id: CodecId::H264,
            hw_accel: HwAccel::None,
            thread_count: 0,
        }
    }
}

impl DecoderConfig {
    pub fn new(codec_id: CodecId, hw_accel: HwAccel) -> Self {
        Self {
            codec_id,
            hw_accel,
            ..Self::default()
        }
    }

    /// Software decoding preset
    pub fn software(codec_id: CodecId) -> Self {
        Self::new(codec_id, HwAccel::None)
    }

    /// Intel Quick Sync preset
    pub fn qsv(codec_id: CodecId) -> Self {
        Self::new(codec_id, HwAccel::Qsv)
    }

    pub fn with_thread_count(mut self, thread_count: u32) -> Self {
        self.thread_count = thread_count;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DecoderConfig::default();
        assert_eq!(config.codec_id, CodecId::H264);
        assert_eq!(config.hw_accel, HwAccel::None);
        assert_eq!(config.thread_count, 0);
    }

    #[test]
    fn test_presets() {
        let qsv = DecoderConfig::qsv(CodecId::Hevc);
        assert_eq!(qsv.hw_accel, HwAccel::Qsv);
        assert_eq!(qsv.codec_id, CodecId::Hevc);

        let sw = DecoderConfig::software(CodecId::Mjpeg).with_thread_count(2);
        assert_eq!(sw.hw_accel, HwAccel::None);
        assert_eq!(sw.thread_count, 2);
    }
}
