use std::f64::consts::PI;

use super::grow;
use crate::engine::error::Result;

pub const DEFAULT_RESONANCE: f32 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BiquadMode { LowPass, HighPass }

#[derive(Clone, Copy, Debug, Default)]
struct Coeffs { a1: f64, a2: f64, a3: f64, b1: f64, b2: f64 }

/// Two input and two output samples of history for one channel.
#[derive(Clone, Copy, Debug, Default)]
struct History { x1: f64, x2: f64, y1: f64, y2: f64 }

/// Resonant second-order low/high-pass.
///
/// All channels share one coefficient set; history is per channel and only
/// grows. Retuning recomputes coefficients in place and keeps history, so a
/// cutoff sweep does not click. Cutoff must be inside (0, sr/2); the chain
/// clamps it before calling `set_cutoff`.
#[derive(Clone, Debug)]
pub struct Biquad {
  mode: BiquadMode,
  sr: f32,
  cutoff: f32,
  resonance: f32,
  c: Coeffs,
  hist: Vec<History>,
}

impl Biquad {
  pub fn new(mode: BiquadMode, sr: f32, cutoff: f32, resonance: f32) -> Self {
    let mut f = Self { mode, sr, cutoff, resonance, c: Coeffs::default(), hist: Vec::new() };
    f.recompute();
    f
  }

  pub fn low_pass(sr: f32, cutoff: f32) -> Self { Self::new(BiquadMode::LowPass, sr, cutoff, DEFAULT_RESONANCE) }
  pub fn high_pass(sr: f32, cutoff: f32) -> Self { Self::new(BiquadMode::HighPass, sr, cutoff, DEFAULT_RESONANCE) }

  pub fn mode(&self) -> BiquadMode { self.mode }
  pub fn cutoff(&self) -> f32 { self.cutoff }
  pub fn resonance(&self) -> f32 { self.resonance }
  pub fn channels(&self) -> usize { self.hist.len() }

  pub fn set_cutoff(&mut self, hz: f32) {
    if hz == self.cutoff { return; }
    self.cutoff = hz;
    self.recompute();
  }

  pub fn set_resonance(&mut self, r: f32) {
    if r == self.resonance { return; }
    self.resonance = r;
    self.recompute();
  }

  fn recompute(&mut self) {
    let r = self.resonance as f64;
    let w = PI * self.cutoff as f64 / self.sr as f64;
    self.c = match self.mode {
      BiquadMode::LowPass => {
        let f = 1.0 / w.tan();
        let a1 = 1.0 / (1.0 + r * f + f * f);
        Coeffs { a1, a2: 2.0 * a1, a3: a1, b1: 2.0 * (1.0 - f * f) * a1, b2: (1.0 - r * f + f * f) * a1 }
      }
      BiquadMode::HighPass => {
        let f = w.tan();
        let a1 = 1.0 / (1.0 + r * f + f * f);
        Coeffs { a1, a2: -2.0 * a1, a3: a1, b1: 2.0 * (f * f - 1.0) * a1, b2: (1.0 - r * f + f * f) * a1 }
      }
    };
  }

  /// Make room for `channels` histories. New channels start silent.
  pub fn reserve(&mut self, channels: usize) -> Result<bool> { grow(&mut self.hist, channels, "biquad history") }

  /// Filters an interleaved buffer in place. `reserve` must have covered
  /// `channels`; missing histories are left untouched rather than grown here.
  pub fn process(&mut self, buf: &mut [f32], channels: usize) {
    let c = self.c;
    if channels == 0 || self.hist.is_empty() { return; }
    for frame in buf.chunks_exact_mut(channels) {
      for (x, h) in frame.iter_mut().zip(self.hist.iter_mut()) {
        let x0 = *x as f64;
        let y0 = c.a1 * x0 + c.a2 * h.x1 + c.a3 * h.x2 - c.b1 * h.y1 - c.b2 * h.y2;
        h.x2 = h.x1; h.x1 = x0;
        h.y2 = h.y1; h.y1 = y0;
        *x = y0 as f32;
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const SR: f32 = 48_000.0;

  fn sine(freq: f32, n: usize, amp: f32) -> Vec<f32> {
    (0..n).map(|i| amp * (std::f32::consts::TAU * freq * i as f32 / SR).sin()).collect()
  }

  fn rms(x: &[f32]) -> f32 { (x.iter().map(|v| v * v).sum::<f32>() / x.len() as f32).sqrt() }

  fn run(f: &mut Biquad, input: &[f32]) -> Vec<f32> {
    let mut buf = input.to_vec();
    f.reserve(1).unwrap();
    f.process(&mut buf, 1);
    buf
  }

  #[test]
  fn impulse_response_decays() {
    for &mode in &[BiquadMode::LowPass, BiquadMode::HighPass] {
      for &fc in &[100.0f32, 1_000.0, 5_000.0, 15_000.0, 23_000.0] {
        for &r in &[0.1f32, 0.5, 1.0, 2.0] {
          let mut f = Biquad::new(mode, SR, fc, r);
          let mut imp = vec![0.0f32; 48_000];
          imp[0] = 1.0;
          let out = run(&mut f, &imp);
          assert!(out.iter().all(|v| v.is_finite()));
          let tail = out[47_000..].iter().fold(0.0f32, |m, v| m.max(v.abs()));
          assert!(tail < 1e-4, "{mode:?} fc={fc} r={r} tail={tail}");
        }
      }
    }
  }

  #[test]
  fn low_pass_keeps_dc_and_cuts_highs() {
    let mut f = Biquad::low_pass(SR, 1_000.0);
    let out = run(&mut f, &vec![0.5f32; 4_800]);
    assert!((out[4_799] - 0.5).abs() < 1e-4);

    let mut f = Biquad::low_pass(SR, 500.0);
    let out = run(&mut f, &sine(8_000.0, 9_600, 0.5));
    assert!(rms(&out[4_800..]) < 0.01, "8k leaked through 500 Hz LP");
  }

  #[test]
  fn high_pass_removes_dc() {
    let mut f = Biquad::high_pass(SR, 300.0);
    let out = run(&mut f, &vec![0.5f32; 48_000]);
    assert!(out[47_999].abs() < 1e-4);

    let mut f = Biquad::high_pass(SR, 300.0);
    let input = sine(5_000.0, 9_600, 0.5);
    let out = run(&mut f, &input);
    let ratio = rms(&out[4_800..]) / rms(&input[4_800..]);
    assert!((ratio - 1.0).abs() < 0.05, "passband ratio {ratio}");
  }

  #[test]
  fn retune_keeps_history() {
    let mut a = Biquad::low_pass(SR, 2_000.0);
    let input = sine(440.0, 512, 0.8);
    run(&mut a, &input);
    a.set_cutoff(1_000.0);
    let mut b = Biquad::low_pass(SR, 1_000.0);
    let next = sine(440.0, 8, 0.8);
    let ya = run(&mut a, &next);
    let yb = run(&mut b, &next);
    // a continues from its history, b starts cold
    assert!((ya[0] - yb[0]).abs() > 1e-3);
  }

  #[test]
  fn channel_growth_leaves_channel_zero_alone() {
    let mono = sine(300.0, 256, 0.7);
    let ch0 = sine(700.0, 128, 0.5);

    let mut solo = Biquad::low_pass(SR, 1_500.0);
    run(&mut solo, &mono);
    let solo_out = run(&mut solo, &ch0);

    let mut grown = Biquad::low_pass(SR, 1_500.0);
    run(&mut grown, &mono);
    grown.reserve(4).unwrap();
    let mut quad = vec![0.0f32; 128 * 4];
    for (i, frame) in quad.chunks_exact_mut(4).enumerate() {
      frame[0] = ch0[i];
      frame[1] = 0.9;
      frame[2] = -0.3;
      frame[3] = (i as f32 * 0.1).sin();
    }
    grown.process(&mut quad, 4);
    assert_eq!(grown.channels(), 4);
    for (i, frame) in quad.chunks_exact(4).enumerate() {
      assert_eq!(frame[0].to_bits(), solo_out[i].to_bits(), "frame {i}");
    }
  }
}
