//! Distance -> per-stage parameters.
//!
//! These curves are hand-tuned by ear. The constants are the tuning, keep them
//! as they are. Every curve except the two gains is clamped to [0, 1] before
//! its stage scale is applied.

use super::params::{CutoffConfig, NoiseAmounts, RadioParams};

const SHAPER_SCALES: [f64; 4] = [1.0, 10.0, 100.0, 1000.0];
const MODEM_SCALE: f64 = 0.75;
const POST_GAIN_MAX: f64 = 2.5;

#[inline]
fn clamp01(v: f64) -> f64 { v.clamp(0.0, 1.0) }

pub fn gain1(d: f64) -> f64 { 1.0 / (1.0 + (12.0 * d - 5.5).exp()) }

pub fn gain2(d: f64) -> f64 { (12.0 * (d - 0.33)).exp() / (0.724 + (10.0 * (d - 0.42)).exp()).powi(2) }

pub fn gain3(d: f64) -> f64 {
  (30.0 * (d - 0.615)).exp() / (0.08 + (18.0 * (d - 0.613)).exp()).powi(2) + 0.1 * d + 0.1 * d * d
}

pub fn gain4(d: f64) -> f64 {
  (30.0 * (d - 0.8)).exp() / (0.49 + (30.0 * (d - 0.803)).exp()).powi(2) + 0.7 * d * d + 0.1 * d.powi(10)
}

pub fn ramp(d: f64) -> f64 { 1.08 * d - 0.1 * d.sqrt() + 0.03 * (40.3 * d).sin() }

pub fn phase(d: f64) -> f64 { 1.0 / (1.0 + (-11.0 * d + 6.0).exp()) }

pub fn pre_gain(d: f64) -> f64 {
  0.5 / (1.0 + (5.0 * d - 3.0).exp()) + 0.5 * (1.0 - 0.92 * d) + 0.015 * (62.0 * d * d).sin()
}

pub fn post_gain(d: f64) -> f64 {
  let bump = (10.0 * (d - 0.692)).exp() / (1.0 + (20.0 * (d - 0.95)).exp()).powi(2);
  (bump + 1.2 - 0.8 * d) / 1.2 + 0.85 * d
}

pub fn modem(d: f64) -> f64 { 1.0 / (1.0 + (-50.0 * d + 18.0).exp()) - 0.5 * d.powi(40) }

pub fn max_freq_factor(d: f64) -> f64 { 1.0 / (1.0 + (80.0 * d - 78.5).exp()) }

pub fn noise_floor_pre(d: f64) -> f64 { 0.05 + 0.95 * d }

pub fn noise_floor_post(d: f64) -> f64 { 0.1 + 0.05 * d + 0.4 * d.powi(10) }

pub fn white_noise_pre(d: f64) -> (f64, f64) { (0.3 / (1.0 + (-10.0 * (d - 0.5)).exp()), 0.1 * d) }

pub fn white_noise_post(d: f64) -> (f64, f64) { (0.5 * d * d, 0.2 / (1.0 + (-12.0 * d + 9.0).exp())) }

/// Clamp a host-supplied distance. NaN maps to the clean end.
pub fn clamp_distance(d: f32) -> f32 {
  if d.is_nan() { 0.0 } else { d.clamp(0.0, 1.0) }
}

/// Maps distance and the host band edges to the full parameter set.
pub fn map_distance(distance: f32, cutoffs: &CutoffConfig) -> RadioParams {
  let d = clamp_distance(distance) as f64;
  let c = cutoffs.clamped();

  let raw = [gain1(d), gain2(d), gain3(d), gain4(d)];
  let mut shaper_gains = [0.0f32; 4];
  for ((g, r), s) in shaper_gains.iter_mut().zip(raw).zip(SHAPER_SCALES) { *g = (clamp01(r) * s) as f32; }

  let r = clamp01(ramp(d)) as f32;
  let (pre_mul, pre_add) = white_noise_pre(d);
  let (post_mul, post_add) = white_noise_post(d);
  let top = clamp01(max_freq_factor(d));

  RadioParams {
    pre_gain: pre_gain(d).clamp(0.0, 1.0) as f32,
    post_gain: post_gain(d).clamp(0.0, POST_GAIN_MAX) as f32,
    shaper_gains,
    ramp_amounts: [r, r],
    phase_amount: clamp01(phase(d)) as f32,
    modem_amount: (clamp01(modem(d)) * MODEM_SCALE) as f32,
    white_noise_pre: NoiseAmounts { multiply: clamp01(pre_mul) as f32, add: clamp01(pre_add) as f32 },
    white_noise_post: NoiseAmounts { multiply: clamp01(post_mul) as f32, add: clamp01(post_add) as f32 },
    noise_floor_pre: clamp01(noise_floor_pre(d)) as f32,
    noise_floor_post: clamp01(noise_floor_post(d)) as f32,
    pre_high_pass_hz: c.pre_high_pass_cutoff_low as f32,
    pre_low_pass_hz: c.pre_low_pass_cutoff_high as f32,
    post_high_pass_hz: c.post_high_pass_cutoff_low as f32,
    post_low_pass_hz: (c.post_low_pass_cutoff_high as f64 * top) as f32,
  }
}
