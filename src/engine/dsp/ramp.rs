/// Sawtooth amplitude dip (mains-hum style tremolo).
pub struct RampNoise {
  amount: f32,
  value: f32,
  delta: f32,
  freq: f32,
}

impl RampNoise {
  pub fn new(sr: f32, freq: f32) -> Self {
    // (1 / sr) / (1 / freq)
    Self { amount: 0.0, value: 0.0, delta: freq / sr, freq }
  }

  pub fn set_amount(&mut self, a: f32) { self.amount = a.clamp(0.0, 1.0); }
  pub fn amount(&self) -> f32 { self.amount }
  pub fn freq(&self) -> f32 { self.freq }

  pub fn process(&mut self, buf: &mut [f32], channels: usize) {
    if channels == 0 { return; }
    for frame in buf.chunks_exact_mut(channels) {
      let g = 1.0 - self.value * self.amount;
      for x in frame.iter_mut() { *x *= g; }
      // wrap by subtraction to keep the phase remainder
      self.value += self.delta;
      if self.value > 1.0 { self.value -= 1.0; }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn zero_amount_is_identity() {
    let mut r = RampNoise::new(48_000.0, 50.0);
    let input: Vec<f32> = (0..100).map(|i| i as f32 * 0.01 - 0.5).collect();
    let mut buf = input.clone();
    r.process(&mut buf, 1);
    assert_eq!(buf, input);
  }

  #[test]
  fn ramp_wraps_at_its_frequency() {
    let sr = 48_000.0;
    let mut r = RampNoise::new(sr, 50.0);
    r.set_amount(1.0);
    let mut buf = vec![1.0f32; 48_000];
    r.process(&mut buf, 1);
    // one wrap per period: count upward jumps of the gain
    let wraps = buf.windows(2).filter(|w| w[1] > w[0] + 0.5).count();
    assert!((49..=51).contains(&wraps), "wraps: {wraps}");
    assert!(buf.iter().all(|&v| (0.0..=1.0).contains(&v)));
  }

  #[test]
  fn frame_shares_one_gain() {
    let mut r = RampNoise::new(48_000.0, 60.0);
    r.set_amount(0.8);
    let mut buf = vec![0.5f32; 2 * 300];
    r.process(&mut buf, 2);
    for f in buf.chunks_exact(2) { assert_eq!(f[0], f[1]); }
  }
}
