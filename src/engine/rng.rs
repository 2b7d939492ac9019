//! Noise source for the chain's noisy stages.
//!
//! `NoiseRng` is a xorshift128+ generator. Its two state words are derived
//! from a single 64-bit seed through splitmix64, so any seed (including 0)
//! gives a well-mixed, non-zero state. The seed itself comes from an
//! `EntropySource` handed in at chain construction.

const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

#[inline]
fn splitmix64(state: &mut u64) -> u64 {
  *state = state.wrapping_add(GOLDEN_GAMMA);
  let mut z = *state;
  z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
  z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
  z ^ (z >> 31)
}

#[derive(Clone, Debug)]
pub struct NoiseRng {
  s0: u64,
  s1: u64,
}

impl NoiseRng {
  pub fn new(seed: u64) -> Self {
    let mut sm = seed;
    let s0 = splitmix64(&mut sm);
    let mut s1 = splitmix64(&mut sm);
    // xorshift must never sit in the all-zero state
    if s0 == 0 && s1 == 0 { s1 = GOLDEN_GAMMA; }
    Self { s0, s1 }
  }

  pub fn from_entropy(source: &mut dyn EntropySource) -> Self { Self::new(source.next_seed()) }

  #[inline]
  pub fn next_u64(&mut self) -> u64 {
    let mut x = self.s0;
    let y = self.s1;
    self.s0 = y;
    x ^= x << 23;
    self.s1 = x ^ y ^ (x >> 17) ^ (y >> 26);
    self.s1.wrapping_add(y)
  }

  /// Uniform in [0, 1). Uses the top 24 bits so every value is exact in f32.
  #[inline]
  pub fn next_float(&mut self) -> f32 {
    (self.next_u64() >> 40) as f32 * (1.0 / (1u32 << 24) as f32)
  }

  pub fn fill(&mut self, out: &mut [f32]) {
    for v in out.iter_mut() { *v = self.next_float(); }
  }
}

/// Where noisy stages get their seeds from.
pub trait EntropySource {
  fn next_seed(&mut self) -> u64;
}

/// Process entropy through `rand`'s thread-local generator.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadEntropy;

impl EntropySource for ThreadEntropy {
  fn next_seed(&mut self) -> u64 { rand::random::<u64>() }
}

/// Reproducible seeds: a splitmix64 walk from a fixed base.
#[derive(Clone, Debug)]
pub struct SeedSequence {
  state: u64,
}

impl SeedSequence {
  pub fn new(base: u64) -> Self { Self { state: base } }
}

impl EntropySource for SeedSequence {
  fn next_seed(&mut self) -> u64 { splitmix64(&mut self.state) }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn correlation(a: &[f32], b: &[f32]) -> f64 {
    let n = a.len() as f64;
    let ma = a.iter().map(|&x| x as f64).sum::<f64>() / n;
    let mb = b.iter().map(|&x| x as f64).sum::<f64>() / n;
    let (mut cov, mut va, mut vb) = (0.0, 0.0, 0.0);
    for (&x, &y) in a.iter().zip(b) {
      let dx = x as f64 - ma;
      let dy = y as f64 - mb;
      cov += dx * dy;
      va += dx * dx;
      vb += dy * dy;
    }
    cov / (va.sqrt() * vb.sqrt())
  }

  #[test]
  fn same_seed_same_sequence() {
    let mut a = NoiseRng::new(1234);
    let mut b = NoiseRng::new(1234);
    for i in 0..10_000 {
      let (x, y) = (a.next_float(), b.next_float());
      assert_eq!(x.to_bits(), y.to_bits(), "diverged at {i}");
    }
  }

  #[test]
  fn values_stay_in_unit_interval() {
    let mut rng = NoiseRng::new(0);
    let mut buf = vec![0.0f32; 50_000];
    rng.fill(&mut buf);
    assert!(buf.iter().all(|&v| (0.0..1.0).contains(&v)));
    let mean = buf.iter().sum::<f32>() / buf.len() as f32;
    assert!((mean - 0.5).abs() < 0.01, "mean drifted: {mean}");
  }

  #[test]
  fn fill_matches_single_draws() {
    let mut a = NoiseRng::new(99);
    let mut b = NoiseRng::new(99);
    let mut buf = [0.0f32; 64];
    a.fill(&mut buf);
    for &v in buf.iter() { assert_eq!(v.to_bits(), b.next_float().to_bits()); }
  }

  #[test]
  fn different_seeds_are_uncorrelated() {
    let mut seeds = SeedSequence::new(7);
    let mut a = NoiseRng::from_entropy(&mut seeds);
    let mut b = NoiseRng::from_entropy(&mut seeds);
    let mut xa = vec![0.0f32; 100_000];
    let mut xb = vec![0.0f32; 100_000];
    a.fill(&mut xa);
    b.fill(&mut xb);
    let r = correlation(&xa, &xb);
    assert!(r.abs() < 0.02, "correlation too high: {r}");
  }

  #[test]
  fn seed_sequence_is_reproducible() {
    let mut a = SeedSequence::new(42);
    let mut b = SeedSequence::new(42);
    let xs: Vec<u64> = (0..8).map(|_| a.next_seed()).collect();
    let ys: Vec<u64> = (0..8).map(|_| b.next_seed()).collect();
    assert_eq!(xs, ys);
    assert!(xs.windows(2).all(|w| w[0] != w[1]));
  }
}
