//! 16-bit PCM WAV output for rendered melodies

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

const CHANNELS: u16 = 1;
const BITS_PER_SAMPLE: u16 = 16;

fn to_i16(sample: f32) -> i16 {
    let clamped = sample.clamp(-1.0, 1.0);
    if clamped >= 0.0 {
        (clamped * i16::MAX as f32) as i16
    } else {
        // -1.0 maps to i16::MIN, not -i16::MAX
        (clamped * -(i16::MIN as f32)) as i16
    }
}

/// Write mono samples in [-1.0, 1.0] as a 16-bit PCM WAV file
///
/// Out-of-range samples are clamped.
pub fn write_wav_16bit(path: impl AsRef<Path>, samples: &[f32], sample_rate: u32) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);

    let block_align = CHANNELS * (BITS_PER_SAMPLE / 8);
    let byte_rate = sample_rate * block_align as u32;
    let data_size = samples.len() as u32 * block_align as u32;

    out.write_all(b"RIFF")?;
    out.write_all(&(36 + data_size).to_le_bytes())?;
    out.write_all(b"WAVE")?;

    out.write_all(b"fmt ")?;
    out.write_all(&16u32.to_le_bytes())?;
    out.write_all(&1u16.to_le_bytes())?; // PCM
    out.write_all(&CHANNELS.to_le_bytes())?;
    out.write_all(&sample_rate.to_le_bytes())?;
    out.write_all(&byte_rate.to_le_bytes())?;
    out.write_all(&block_align.to_le_bytes())?;
    out.write_all(&BITS_PER_SAMPLE.to_le_bytes())?;

    out.write_all(b"data")?;
    out.write_all(&data_size.to_le_bytes())?;
    for &sample in samples {
        out.write_all(&to_i16(sample).to_le_bytes())?;
    }

    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("meowsic-{}-{}.wav", name, std::process::id()))
    }

    #[test]
    fn test_header() {
        let path = temp_path("header");
        write_wav_16bit(&path, &[0.0f32; 1000], 44100).unwrap();
        let data = fs::read(&path).unwrap();

        assert_eq!(&data[0..4], b"RIFF");
        assert_eq!(&data[8..12], b"WAVE");
        assert_eq!(&data[12..16], b"fmt ");
        assert_eq!(u16::from_le_bytes([data[20], data[21]]), 1);
        assert_eq!(u16::from_le_bytes([data[22], data[23]]), 1);
        assert_eq!(
            u32::from_le_bytes([data[24], data[25], data[26], data[27]]),
            44100
        );
        assert_eq!(
            u32::from_le_bytes([data[28], data[29], data[30], data[31]]),
            88200
        );
        assert_eq!(&data[36..40], b"data");

        let data_size = u32::from_le_bytes([data[40], data[41], data[42], data[43]]);
        assert_eq!(data_size, 2000);
        assert_eq!(
            u32::from_le_bytes([data[4], data[5], data[6], data[7]]),
            36 + data_size
        );
        assert_eq!(data.len(), 44 + 2000);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_samples_clamped() {
        let path = temp_path("clamp");
        write_wav_16bit(&path, &[2.0, -2.0, 1.0, -1.0, 0.0], 8000).unwrap();
        let data = fs::read(&path).unwrap();

        let sample = |i: usize| i16::from_le_bytes([data[44 + 2 * i], data[45 + 2 * i]]);
        assert_eq!(sample(0), i16::MAX);
        assert_eq!(sample(1), i16::MIN);
        assert_eq!(sample(2), i16::MAX);
        assert_eq!(sample(3), i16::MIN);
        assert_eq!(sample(4), 0);

        fs::remove_file(&path).unwrap();
    }
}
