use std::f64::consts::TAU;

use super::grow;
use crate::engine::error::Result;

pub const OVERSAMPLE: usize = 8;
pub const DEFAULT_CARRIER_HZ: f32 = 5_000.0;
const DEMOD_SCALE: f32 = 1.4;

/// Non-finite carriers fall back to the default; the rest clamp to [0, sr/2].
fn sanitize_carrier(hz: f32, sr: f32) -> f32 {
  let hz = if hz.is_finite() { hz } else { DEFAULT_CARRIER_HZ };
  hz.clamp(0.0, sr * 0.5)
}

/// Naive AM round trip.
///
/// Each input sample is spread over `OVERSAMPLE` sub-samples of a carrier
/// table, multiplied in, then "demodulated" as `sum(m^2) / 1.4`. That is not a
/// true RMS (no root, no mean) and the gain curves depend on exactly this
/// shape, so keep it. The carrier phase restarts every buffer because the
/// table is indexed from the buffer start.
pub struct Modem {
  sr: f32,
  carrier: f32,
  amount: f32,
  table: Vec<f32>,
  table_frames: usize,
}

impl Modem {
  pub fn new(sr: f32, carrier: f32) -> Self {
    Self { sr, carrier: sanitize_carrier(carrier, sr), amount: 0.0, table: Vec::new(), table_frames: 0 }
  }

  pub fn set_amount(&mut self, a: f32) { self.amount = a.clamp(0.0, 1.0); }
  pub fn amount(&self) -> f32 { self.amount }
  pub fn carrier(&self) -> f32 { self.carrier }

  /// Control-rate only; rebuilds the table for the current size.
  pub fn set_carrier(&mut self, hz: f32) {
    let hz = sanitize_carrier(hz, self.sr);
    if hz == self.carrier { return; }
    self.carrier = hz;
    self.rebuild();
  }

  pub fn reserve(&mut self, frames: usize) -> Result<bool> {
    if frames <= self.table_frames { return Ok(false); }
    grow(&mut self.table, frames * OVERSAMPLE, "modem carrier table")?;
    self.table_frames = frames;
    self.rebuild();
    Ok(true)
  }

  fn rebuild(&mut self) {
    let step = TAU * self.carrier as f64 / (self.sr as f64 * OVERSAMPLE as f64);
    for (i, v) in self.table.iter_mut().enumerate() { *v = (step * i as f64).sin() as f32; }
  }

  pub fn process(&mut self, buf: &mut [f32], channels: usize) {
    if self.amount <= 0.0 || channels == 0 { return; }
    let wet = self.amount;
    let dry = 1.0 - wet;
    for (f, frame) in buf.chunks_exact_mut(channels).take(self.table_frames).enumerate() {
      let sub = &self.table[f * OVERSAMPLE..(f + 1) * OVERSAMPLE];
      for x in frame.iter_mut() {
        let s = *x;
        let energy: f32 = sub.iter().map(|&c| { let m = s * c; m * m }).sum();
        let demod = (energy / DEMOD_SCALE).clamp(-1.0, 1.0);
        *x = s * dry + demod * wet;
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn zero_amount_is_identity() {
    let mut m = Modem::new(48_000.0, DEFAULT_CARRIER_HZ);
    m.reserve(64).unwrap();
    let input: Vec<f32> = (0..64).map(|i| (i as f32 * 0.3).sin()).collect();
    let mut buf = input.clone();
    m.process(&mut buf, 1);
    assert_eq!(buf, input);
  }

  #[test]
  fn demod_matches_formula() {
    let sr = 48_000.0;
    let mut m = Modem::new(sr, 3_000.0);
    m.set_amount(1.0);
    m.reserve(4).unwrap();
    let mut buf = vec![0.5f32, -0.5, 0.5, -0.5];
    m.process(&mut buf, 1);
    for (f, &y) in buf.iter().enumerate() {
      let mut e = 0.0f64;
      for k in 0..OVERSAMPLE {
        let i = f * OVERSAMPLE + k;
        let c = (TAU * 3_000.0 * i as f64 / (sr as f64 * OVERSAMPLE as f64)).sin();
        e += (0.5 * c).powi(2);
      }
      let expect = (e / 1.4).min(1.0) as f32;
      assert!((y - expect).abs() < 1e-5, "frame {f}: {y} vs {expect}");
      // sign is lost
      assert!(y >= 0.0);
    }
  }

  #[test]
  fn table_grows_and_follows_carrier() {
    let mut m = Modem::new(48_000.0, 1_000.0);
    m.reserve(128).unwrap();
    assert_eq!(m.table.len(), 128 * OVERSAMPLE);
    assert!(!m.reserve(64).unwrap());
    let before = m.table[5];
    m.set_carrier(2_000.0);
    assert_ne!(before, m.table[5]);
    assert_eq!(m.table.len(), 128 * OVERSAMPLE);
  }

  #[test]
  fn non_finite_carrier_falls_back_to_default() {
    let mut m = Modem::new(48_000.0, f32::NAN);
    assert_eq!(m.carrier(), DEFAULT_CARRIER_HZ);
    m.set_carrier(1_000.0);
    m.set_carrier(f32::INFINITY);
    assert_eq!(m.carrier(), DEFAULT_CARRIER_HZ);
    m.set_amount(1.0);
    m.reserve(64).unwrap();
    assert!(m.table.iter().all(|v| v.is_finite()));
    let mut buf = vec![0.5f32; 64];
    m.process(&mut buf, 1);
    assert!(buf.iter().all(|v| v.is_finite()));
  }

  #[test]
  fn output_is_bounded() {
    let mut m = Modem::new(44_100.0, DEFAULT_CARRIER_HZ);
    m.set_amount(0.75);
    m.reserve(256).unwrap();
    let mut buf = vec![1.0f32; 512];
    m.process(&mut buf, 2);
    assert!(buf.iter().all(|v| (-1.0..=1.0).contains(v)));
  }
}
