use super::grow;
use crate::engine::error::Result;
use crate::engine::rng::NoiseRng;

const LEVEL_BLOCK: usize = 16;
const LEVEL_SCALE: f32 = 1.4;

/// Multiplicative + level-tracking additive white noise.
///
/// The draws are used straight from [0, 1) without re-centering, so the noise
/// always pushes in the signal's direction (multiply) and upward (add). The
/// curves in the mapper were tuned against that bias.
pub struct WhiteNoise {
  rng: NoiseRng,
  multiply: f32,
  add: f32,
  level: f32,
  block_pos: usize,
  draws: Vec<f32>,
}

impl WhiteNoise {
  pub fn new(rng: NoiseRng) -> Self {
    Self { rng, multiply: 0.0, add: 0.0, level: 0.0, block_pos: 0, draws: Vec::new() }
  }

  pub fn set_amounts(&mut self, multiply: f32, add: f32) {
    self.multiply = multiply.clamp(0.0, 1.0);
    self.add = add.clamp(0.0, 1.0);
  }

  pub fn amounts(&self) -> (f32, f32) { (self.multiply, self.add) }

  /// Two draws per sample, batched ahead of each buffer.
  pub fn reserve(&mut self, samples: usize) -> Result<bool> { grow(&mut self.draws, samples * 2, "white noise draws") }

  pub fn process(&mut self, buf: &mut [f32]) {
    if self.multiply <= 0.0 && self.add <= 0.0 { return; }
    let n = buf.len().min(self.draws.len() / 2);
    self.rng.fill(&mut self.draws[..n * 2]);
    for i in 0..n {
      if self.block_pos == 0 {
        // level of the block starting here, as far as this buffer reaches
        let end = (i + LEVEL_BLOCK).min(n);
        let sum: f32 = buf[i..end].iter().map(|s| s * s).sum();
        self.level = sum.sqrt() * LEVEL_SCALE;
      }
      self.block_pos = (self.block_pos + 1) % LEVEL_BLOCK;
      let r1 = self.draws[2 * i];
      let r2 = self.draws[2 * i + 1];
      let y = buf[i] * (1.0 + r1 * self.multiply) + r2 * self.add * self.level;
      buf[i] = y.clamp(-1.0, 1.0);
    }
  }
}
