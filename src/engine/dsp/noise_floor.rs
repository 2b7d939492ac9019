use crate::engine::rng::NoiseRng;

const HOLD_FRAMES: u32 = 4;
const FLOOR_SCALE: f32 = 0.01;

/// Lifts quiet samples up to a coarse-grained random floor. Loud samples are
/// never reduced: the output magnitude is `max(|x|, floor)` with x's sign.
pub struct NoiseFloor {
  rng: NoiseRng,
  amount: f32,
  floor: f32,
  frame: u32,
}

impl NoiseFloor {
  pub fn new(rng: NoiseRng) -> Self { Self { rng, amount: 0.0, floor: 0.0, frame: 0 } }

  pub fn set_amount(&mut self, a: f32) { self.amount = a.clamp(0.0, 1.0); }
  pub fn amount(&self) -> f32 { self.amount }

  pub fn process(&mut self, buf: &mut [f32], channels: usize) {
    if channels == 0 { return; }
    let scale = self.amount * FLOOR_SCALE;
    for frame in buf.chunks_exact_mut(channels) {
      if self.frame == 0 { self.floor = self.rng.next_float() * scale; }
      self.frame = (self.frame + 1) % HOLD_FRAMES;
      let floor = self.floor;
      for x in frame.iter_mut() {
        let m = x.abs().max(floor);
        *x = if *x < 0.0 { -m } else { m };
      }
    }
  }
}
