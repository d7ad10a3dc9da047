//! WAV file helpers.

use std::path::Path;
use std::time::Duration;

use crate::error::VoiceError;

/// Header facts about a WAV file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavInfo {
    pub sample_rate: u32,
    pub channels: u16,
    pub frames: u32,
}

impl WavInfo {
    #[must_use]
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(f64::from(self.frames) / f64::from(self.sample_rate))
    }
}

/// Write mono f32 PCM to `path` as a 32-bit float WAV.
pub fn write_wav(path: &Path, samples: &[f32], sample_rate: u32) -> Result<(), VoiceError> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Read only the header of the WAV file at `path`.
pub fn probe(path: &Path) -> Result<WavInfo, VoiceError> {
    let reader = hound::WavReader::open(path)?;
    let spec = reader.spec();
    Ok(WavInfo {
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        frames: reader.duration(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_written_file_probes_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        let samples = vec![0.25_f32; 12_000];

        write_wav(&path, &samples, 24_000).unwrap();
        let info = probe(&path).unwrap();

        assert_eq!(info.sample_rate, 24_000);
        assert_eq!(info.channels, 1);
        assert_eq!(info.frames, 12_000);
        assert_eq!(info.duration(), Duration::from_millis(500));
    }

    #[test]
    fn test_probe_rejects_non_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.wav");
        std::fs::write(&path, b"definitely not audio").unwrap();
        assert!(matches!(probe(&path), Err(VoiceError::Wav(_))));
    }
}
