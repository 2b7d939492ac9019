use std::path::Path;

use serde::{Deserialize, Serialize};

use super::dsp::modem::DEFAULT_CARRIER_HZ;
use super::error::Result;

pub const MAX_CUTOFF_HZ: u32 = 20_000;

/// The four band edges the host configures, in Hz.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CutoffConfig {
  pub pre_low_pass_cutoff_high: u32,
  pub pre_high_pass_cutoff_low: u32,
  pub post_low_pass_cutoff_high: u32,
  pub post_high_pass_cutoff_low: u32,
}

impl Default for CutoffConfig {
  fn default() -> Self {
    Self {
      pre_low_pass_cutoff_high: 6_000,
      pre_high_pass_cutoff_low: 200,
      post_low_pass_cutoff_high: 4_000,
      post_high_pass_cutoff_low: 300,
    }
  }
}

impl CutoffConfig {
  /// Band edges at 20 Hz and 20 kHz on both sides, so no biquad resonance
  /// lands in the voice band. With these the clean end is a near-dry pass.
  pub const fn full_band() -> Self {
    Self {
      pre_low_pass_cutoff_high: MAX_CUTOFF_HZ,
      pre_high_pass_cutoff_low: 20,
      post_low_pass_cutoff_high: MAX_CUTOFF_HZ,
      post_high_pass_cutoff_low: 20,
    }
  }

  pub fn clamped(self) -> Self {
    let c = |hz: u32| hz.min(MAX_CUTOFF_HZ);
    Self {
      pre_low_pass_cutoff_high: c(self.pre_low_pass_cutoff_high),
      pre_high_pass_cutoff_low: c(self.pre_high_pass_cutoff_low),
      post_low_pass_cutoff_high: c(self.post_low_pass_cutoff_high),
      post_high_pass_cutoff_low: c(self.post_high_pass_cutoff_low),
    }
  }
}

/// Host-facing control inputs, loadable from JSON. Missing keys fall back
/// to defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadioSettings {
  pub distance: f32,
  pub cutoffs: CutoffConfig,
  pub modem_carrier_hz: f32,
  /// Fixed seed for reproducible noise; fresh entropy when absent.
  pub seed: Option<u64>,
}

impl Default for RadioSettings {
  fn default() -> Self {
    Self { distance: 0.0, cutoffs: CutoffConfig::default(), modem_carrier_hz: DEFAULT_CARRIER_HZ, seed: None }
  }
}

impl RadioSettings {
  pub fn from_json(json: &str) -> Result<Self> { Ok(serde_json::from_str(json)?) }

  pub fn load(path: impl AsRef<Path>) -> Result<Self> {
    let text = std::fs::read_to_string(path)?;
    Self::from_json(&text)
  }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NoiseAmounts {
  pub multiply: f32,
  pub add: f32,
}

/// Everything one control tick pushes into the chain.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RadioParams {
  pub pre_gain: f32,
  pub post_gain: f32,
  /// Already multiplied by 1, 10, 100 and 1000.
  pub shaper_gains: [f32; 4],
  /// 50 Hz and 60 Hz ramps.
  pub ramp_amounts: [f32; 2],
  pub phase_amount: f32,
  pub modem_amount: f32,
  pub white_noise_pre: NoiseAmounts,
  pub white_noise_post: NoiseAmounts,
  pub noise_floor_pre: f32,
  pub noise_floor_post: f32,
  pub pre_high_pass_hz: f32,
  pub pre_low_pass_hz: f32,
  pub post_high_pass_hz: f32,
  pub post_low_pass_hz: f32,
}
