//! The fixed radio chain.
//!
//! Signal chain:
//!     Input -> Pre Gain -> Ramp 50 Hz -> White Noise (pre) -> Noise Floor (pre)
//!           -> High Pass (pre) -> Low Pass (pre) -> Modem -> Phase Alternate
//!           -> Waveshaper -> White Noise (post) -> High Pass (post)
//!           -> Low Pass (post) -> High Pass (detuned) -> Low Pass (detuned)
//!           -> Noise Floor (post) -> Ramp 60 Hz -> Post Gain -> Clamp
//!
//! Later stages assume the shape earlier ones leave behind, so the order is
//! fixed and the set of stages is closed.

use log::debug;

use super::dsp::biquad::{Biquad, BiquadMode, DEFAULT_RESONANCE};
use super::dsp::modem::Modem;
use super::dsp::noise_floor::NoiseFloor;
use super::dsp::phase::PhaseAlternator;
use super::dsp::ramp::RampNoise;
use super::dsp::waveshaper::Waveshaper;
use super::dsp::white_noise::WhiteNoise;
use super::error::{RadioError, Result};
use super::params::RadioParams;
use super::rng::{EntropySource, NoiseRng};

pub const RAMP_LOW_HZ: f32 = 50.0;
pub const RAMP_HIGH_HZ: f32 = 60.0;
pub const DETUNED_RESONANCE: f32 = 0.35;
pub const DETUNE: f32 = 0.01;
pub const MIN_CUTOFF_HZ: f32 = 10.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StageId {
  Ramp50,
  WhiteNoisePre,
  NoiseFloorPre,
  HighPassPre,
  LowPassPre,
  Modem,
  PhaseAlternate,
  Waveshaper,
  WhiteNoisePost,
  HighPassPost,
  LowPassPost,
  HighPassDetuned,
  LowPassDetuned,
  NoiseFloorPost,
  Ramp60,
}

pub const CHAIN_ORDER: [StageId; 15] = [
  StageId::Ramp50,
  StageId::WhiteNoisePre,
  StageId::NoiseFloorPre,
  StageId::HighPassPre,
  StageId::LowPassPre,
  StageId::Modem,
  StageId::PhaseAlternate,
  StageId::Waveshaper,
  StageId::WhiteNoisePost,
  StageId::HighPassPost,
  StageId::LowPassPost,
  StageId::HighPassDetuned,
  StageId::LowPassDetuned,
  StageId::NoiseFloorPost,
  StageId::Ramp60,
];

pub enum Stage {
  Ramp(RampNoise),
  WhiteNoise(WhiteNoise),
  NoiseFloor(NoiseFloor),
  Biquad(Biquad),
  Modem(Modem),
  Phase(PhaseAlternator),
  Shaper(Waveshaper),
}

impl Stage {
  fn build(id: StageId, sr: f32, carrier: f32, entropy: &mut dyn EntropySource) -> Self {
    let nyq = max_cutoff(sr);
    match id {
      StageId::Ramp50 => Stage::Ramp(RampNoise::new(sr, RAMP_LOW_HZ)),
      StageId::Ramp60 => Stage::Ramp(RampNoise::new(sr, RAMP_HIGH_HZ)),
      StageId::WhiteNoisePre | StageId::WhiteNoisePost => Stage::WhiteNoise(WhiteNoise::new(NoiseRng::from_entropy(entropy))),
      StageId::NoiseFloorPre | StageId::NoiseFloorPost => Stage::NoiseFloor(NoiseFloor::new(NoiseRng::from_entropy(entropy))),
      StageId::HighPassPre | StageId::HighPassPost => Stage::Biquad(Biquad::high_pass(sr, MIN_CUTOFF_HZ)),
      StageId::LowPassPre | StageId::LowPassPost => Stage::Biquad(Biquad::low_pass(sr, nyq)),
      StageId::HighPassDetuned => Stage::Biquad(Biquad::new(BiquadMode::HighPass, sr, MIN_CUTOFF_HZ, DETUNED_RESONANCE)),
      StageId::LowPassDetuned => Stage::Biquad(Biquad::new(BiquadMode::LowPass, sr, nyq, DETUNED_RESONANCE)),
      StageId::Modem => Stage::Modem(Modem::new(sr, carrier)),
      StageId::PhaseAlternate => Stage::Phase(PhaseAlternator::new()),
      StageId::Waveshaper => Stage::Shaper(Waveshaper::new()),
    }
  }

  fn retune(&mut self, id: StageId, p: &RadioParams, sr: f32) {
    match (self, id) {
      (Stage::Ramp(r), StageId::Ramp50) => r.set_amount(p.ramp_amounts[0]),
      (Stage::Ramp(r), StageId::Ramp60) => r.set_amount(p.ramp_amounts[1]),
      (Stage::WhiteNoise(w), StageId::WhiteNoisePre) => w.set_amounts(p.white_noise_pre.multiply, p.white_noise_pre.add),
      (Stage::WhiteNoise(w), StageId::WhiteNoisePost) => w.set_amounts(p.white_noise_post.multiply, p.white_noise_post.add),
      (Stage::NoiseFloor(n), StageId::NoiseFloorPre) => n.set_amount(p.noise_floor_pre),
      (Stage::NoiseFloor(n), StageId::NoiseFloorPost) => n.set_amount(p.noise_floor_post),
      (Stage::Biquad(b), StageId::HighPassPre) => b.set_cutoff(clamp_cutoff(p.pre_high_pass_hz, sr)),
      (Stage::Biquad(b), StageId::LowPassPre) => b.set_cutoff(clamp_cutoff(p.pre_low_pass_hz, sr)),
      (Stage::Biquad(b), StageId::HighPassPost) => b.set_cutoff(clamp_cutoff(p.post_high_pass_hz, sr)),
      (Stage::Biquad(b), StageId::LowPassPost) => b.set_cutoff(clamp_cutoff(p.post_low_pass_hz, sr)),
      (Stage::Biquad(b), StageId::HighPassDetuned) => b.set_cutoff(clamp_cutoff(p.post_high_pass_hz * (1.0 + DETUNE), sr)),
      (Stage::Biquad(b), StageId::LowPassDetuned) => b.set_cutoff(clamp_cutoff(p.post_low_pass_hz * (1.0 - DETUNE), sr)),
      (Stage::Modem(m), _) => m.set_amount(p.modem_amount),
      (Stage::Phase(ph), _) => ph.set_amount(p.phase_amount),
      (Stage::Shaper(w), _) => w.set_gains(p.shaper_gains),
      _ => {}
    }
  }

  fn reserve(&mut self, frames: usize, channels: usize) -> Result<bool> {
    match self {
      Stage::WhiteNoise(w) => w.reserve(frames * channels),
      Stage::Biquad(b) => b.reserve(channels),
      Stage::Modem(m) => m.reserve(frames),
      _ => Ok(false),
    }
  }

  fn process(&mut self, buf: &mut [f32], channels: usize) {
    match self {
      Stage::Ramp(r) => r.process(buf, channels),
      Stage::WhiteNoise(w) => w.process(buf),
      Stage::NoiseFloor(n) => n.process(buf, channels),
      Stage::Biquad(b) => b.process(buf, channels),
      Stage::Modem(m) => m.process(buf, channels),
      Stage::Phase(p) => p.process(buf),
      Stage::Shaper(w) => w.process(buf),
    }
  }
}

#[inline]
fn max_cutoff(sr: f32) -> f32 { sr * 0.49 }

/// Keeps `tan(pi * fc / sr)` finite and positive.
pub fn clamp_cutoff(hz: f32, sr: f32) -> f32 {
  if !hz.is_finite() { return max_cutoff(sr); }
  hz.clamp(MIN_CUTOFF_HZ, max_cutoff(sr))
}

pub struct FilterChain {
  sr: f32,
  stages: Vec<(StageId, Stage)>,
  params: RadioParams,
  channels: usize,
  frames: usize,
}

impl FilterChain {
  /// Builds every stage and pre-sizes per-channel state for `channels`.
  pub fn new(sr: f32, channels: usize, carrier: f32, entropy: &mut dyn EntropySource) -> Result<Self> {
    if !(sr.is_finite() && sr > 0.0) { return Err(RadioError::InvalidSampleRate(sr)); }
    if channels == 0 { return Err(RadioError::InvalidChannelCount); }
    let stages = CHAIN_ORDER.iter().map(|&id| (id, Stage::build(id, sr, carrier, entropy))).collect();
    let mut chain = Self { sr, stages, params: RadioParams::default(), channels: 0, frames: 0 };
    chain.reserve(0, channels)?;
    Ok(chain)
  }

  pub fn sample_rate(&self) -> f32 { self.sr }
  pub fn channels(&self) -> usize { self.channels }
  pub fn params(&self) -> &RadioParams { &self.params }
  pub fn stage_ids(&self) -> impl Iterator<Item = StageId> + '_ { self.stages.iter().map(|(id, _)| *id) }

  pub fn stage(&self, id: StageId) -> Option<&Stage> {
    self.stages.iter().find(|(sid, _)| *sid == id).map(|(_, s)| s)
  }

  /// Control-rate: push a mapped parameter set into every stage. Filter
  /// histories, ramp phases and noise generators are left alone.
  pub fn retune(&mut self, p: &RadioParams) {
    let sr = self.sr;
    for (id, stage) in self.stages.iter_mut() { stage.retune(*id, p, sr); }
    self.params = *p;
  }

  pub fn set_carrier(&mut self, hz: f32) {
    for (_, stage) in self.stages.iter_mut() {
      if let Stage::Modem(m) = stage { m.set_carrier(hz); }
    }
  }

  /// Grow scratch and per-channel state to fit a buffer. Only grows.
  pub fn reserve(&mut self, frames: usize, channels: usize) -> Result<()> {
    if frames <= self.frames && channels <= self.channels { return Ok(()); }
    let frames = frames.max(self.frames);
    let channels = channels.max(self.channels);
    for (_, stage) in self.stages.iter_mut() { stage.reserve(frames, channels)?; }
    if channels > self.channels {
      debug!("chain channels {} -> {}", self.channels, channels);
      self.channels = channels;
    }
    self.frames = frames;
    Ok(())
  }

  /// Audio-rate: pre gain, every stage in order, post gain, hard clamp.
  ///
  /// Buffer growth happens up front, so an allocation failure leaves `buf`
  /// untouched. A trailing partial frame only gets the gains and clamp.
  pub fn process(&mut self, buf: &mut [f32], channels: usize) -> Result<()> {
    if channels == 0 || buf.is_empty() { return Ok(()); }
    let frames = buf.len() / channels;
    self.reserve(frames, channels)?;

    let pre = self.params.pre_gain;
    for x in buf.iter_mut() { *x *= pre; }
    let whole = &mut buf[..frames * channels];
    for (_, stage) in self.stages.iter_mut() { stage.process(whole, channels); }
    let post = self.params.post_gain;
    for x in buf.iter_mut() { *x = (*x * post).clamp(-1.0, 1.0); }
    Ok(())
  }
}
