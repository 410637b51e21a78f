use hound::{SampleFormat, WavSpec, WavWriter};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use chrono::{DateTime, Local};

use crate::error::StreamError;
use crate::frame::FrameSpec;

/// Destination for whole PCM frames
pub trait FrameSink {
    /// Write LE i16 frames; `bytes.len()` is always a whole number of frames
    fn write_frames(&mut self, bytes: &[u8]) -> Result<(), StreamError>;
}

/// Mono 16-bit PCM WAV file
pub struct FrameWriter {
    writer: WavWriter<BufWriter<File>>,
    bytes_written: usize,
}

impl FrameWriter {
    pub fn create<P: AsRef<Path>>(path: P, frame: FrameSpec) -> Result<Self, StreamError> {
        let spec = WavSpec {
            channels: frame.channels,
            sample_rate: frame.sample_rate,
            bits_per_sample: frame.bits_per_sample,
            sample_format: SampleFormat::Int,
        };

        let writer = WavWriter::create(path, spec)?;
        Ok(Self {
            writer,
            bytes_written: 0,
        })
    }

    pub fn bytes_written(&self) -> usize {
        self.bytes_written
    }

    /// Patch the RIFF/data lengths and flush
    pub fn finalize(self) -> Result<(), StreamError> {
        self.writer.finalize()?;
        Ok(())
    }
}

impl FrameSink for FrameWriter {
    fn write_frames(&mut self, bytes: &[u8]) -> Result<(), StreamError> {
        debug_assert!(bytes.len() % 2 == 0);
        for sample in FrameSpec::decode(bytes) {
            self.writer.write_sample(sample)?;
        }
        self.bytes_written += bytes.len();
        Ok(())
    }
}

/// Generate a timestamped output filename
pub fn generate_filename(prefix: &str, time: DateTime<Local>) -> String {
    format!("{}_{}.wav", prefix, time.format("%Y-%m-%d_%H-%M-%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use hound::WavReader;

    #[test]
    fn test_generate_filename() {
        let time = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(generate_filename("mic", time), "mic_2024-03-09_14-05-07.wav");
    }

    #[test]
    fn test_writes_mono_16bit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");

        let mut writer = FrameWriter::create(&path, FrameSpec::default()).unwrap();
        writer.write_frames(&[0x01, 0x00, 0xff, 0xff]).unwrap();
        writer.write_frames(&[0x00, 0x80]).unwrap();
        assert_eq!(writer.bytes_written(), 6);
        writer.finalize().unwrap();

        let mut reader = WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(spec.sample_rate, 16_000);
        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![1, -1, i16::MIN]);
    }
}
