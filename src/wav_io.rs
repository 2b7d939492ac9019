//! WAV in and out for the offline renderer and the live loop source.

use std::path::Path;

use crate::engine::error::Result;

/// Interleaved f32 audio with its format.
#[derive(Clone, Debug, PartialEq)]
pub struct Clip {
  pub samples: Vec<f32>,
  pub channels: usize,
  pub sample_rate: u32,
}

impl Clip {
  pub fn frames(&self) -> usize {
    if self.channels == 0 { 0 } else { self.samples.len() / self.channels }
  }
}

/// Reads any PCM or float WAV and scales integer samples to [-1, 1).
pub fn read_wav(path: impl AsRef<Path>) -> Result<Clip> {
  let reader = hound::WavReader::open(path)?;
  let spec = reader.spec();
  let samples = match spec.sample_format {
    hound::SampleFormat::Int => {
      let max_val = (1_i64 << (spec.bits_per_sample - 1)) as f32;
      reader.into_samples::<i32>().map(|s| s.map(|v| v as f32 / max_val)).collect::<std::result::Result<Vec<_>, _>>()?
    }
    hound::SampleFormat::Float => reader.into_samples::<f32>().collect::<std::result::Result<Vec<_>, _>>()?,
  };
  Ok(Clip { samples, channels: spec.channels as usize, sample_rate: spec.sample_rate })
}

/// Writes 32-bit float WAV.
pub fn write_wav(path: impl AsRef<Path>, clip: &Clip) -> Result<()> {
  let spec = hound::WavSpec {
    channels: clip.channels as u16,
    sample_rate: clip.sample_rate,
    bits_per_sample: 32,
    sample_format: hound::SampleFormat::Float,
  };
  let mut writer = hound::WavWriter::create(path, spec)?;
  for &s in &clip.samples { writer.write_sample(s)?; }
  writer.finalize()?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn float_wav_survives_a_trip_to_disk() {
    let path = std::env::temp_dir().join(format!("radio-distance-{}.wav", std::process::id()));
    let clip = Clip { samples: vec![0.0, 0.25, -0.5, 0.75], channels: 2, sample_rate: 22_050 };
    write_wav(&path, &clip).unwrap();
    let back = read_wav(&path).unwrap();
    let _ = std::fs::remove_file(&path);
    assert_eq!(back, clip);
    assert_eq!(back.frames(), 2);
  }

  #[test]
  fn int_wav_is_scaled() {
    let path = std::env::temp_dir().join(format!("radio-distance-int-{}.wav", std::process::id()));
    let spec = hound::WavSpec { channels: 1, sample_rate: 8_000, bits_per_sample: 16, sample_format: hound::SampleFormat::Int };
    let mut w = hound::WavWriter::create(&path, spec).unwrap();
    for v in [0i16, 16_384, -32_768] { w.write_sample(v).unwrap(); }
    w.finalize().unwrap();
    let clip = read_wav(&path).unwrap();
    let _ = std::fs::remove_file(&path);
    assert_eq!(clip.samples, vec![0.0, 0.5, -1.0]);
  }

  #[test]
  fn missing_file_is_an_error() {
    assert!(read_wav("/definitely/not/here.wav").is_err());
  }
}
