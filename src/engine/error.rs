use std::collections::TryReserveError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RadioError {
  #[error("sample rate must be a positive finite number, got {0}")]
  InvalidSampleRate(f32),
  #[error("channel count must be at least 1")]
  InvalidChannelCount,
  #[error("could not grow {what} to {len} elements")]
  Alloc {
    what: &'static str,
    len: usize,
    #[source]
    source: TryReserveError,
  },
  #[error("wav: {0}")]
  Wav(#[from] hound::Error),
  #[error("settings: {0}")]
  Settings(#[from] serde_json::Error),
  #[error("io: {0}")]
  Io(#[from] std::io::Error),
  #[error("audio device: {0}")]
  Device(String),
}

pub type Result<T> = std::result::Result<T, RadioError>;
