/// `y = g1*x + g2*x^2 + g3*x^3 + g4*x^4`, clamped.
///
/// Gains arrive pre-scaled from the mapper. The even terms are not sign
/// symmetric, which is the lopsided clipping a cheap radio front end has.
pub struct Waveshaper {
  gains: [f32; 4],
}

impl Waveshaper {
  pub fn new() -> Self { Self { gains: [1.0, 0.0, 0.0, 0.0] } }

  pub fn set_gains(&mut self, g: [f32; 4]) { self.gains = g; }
  pub fn gains(&self) -> [f32; 4] { self.gains }

  #[inline]
  pub fn shape(&self, x: f32) -> f32 {
    let [g1, g2, g3, g4] = self.gains;
    (x * (g1 + x * (g2 + x * (g3 + x * g4)))).clamp(-1.0, 1.0)
  }

  pub fn process(&mut self, buf: &mut [f32]) {
    for x in buf.iter_mut() { *x = self.shape(*x); }
  }
}

impl Default for Waveshaper {
  fn default() -> Self { Self::new() }
}
