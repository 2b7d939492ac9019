const BLOCK: usize = 16;
const HALF: usize = BLOCK / 2;

/// Periodic polarity flip blended with the dry signal.
///
/// First half of every 16-sample block: `amount * x + (1 - amount) * x`.
/// Second half: `amount * -x + (1 - amount) * x`.
pub struct PhaseAlternator {
  amount: f32,
  pos: usize,
}

impl PhaseAlternator {
  pub fn new() -> Self { Self { amount: 0.0, pos: 0 } }

  pub fn set_amount(&mut self, a: f32) { self.amount = a.clamp(0.0, 1.0); }
  pub fn amount(&self) -> f32 { self.amount }

  pub fn process(&mut self, buf: &mut [f32]) {
    let wet = self.amount;
    let dry = 1.0 - wet;
    for x in buf.iter_mut() {
      let sign = if self.pos < HALF { 1.0 } else { -1.0 };
      *x = (wet * sign * *x + dry * *x).clamp(-1.0, 1.0);
      self.pos = (self.pos + 1) % BLOCK;
    }
  }
}

impl Default for PhaseAlternator {
  fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn full_amount_flips_second_half() {
    let mut p = PhaseAlternator::new();
    p.set_amount(1.0);
    let mut buf = vec![0.5f32; 48];
    p.process(&mut buf);
    for (i, &v) in buf.iter().enumerate() {
      let expect = if i % 16 < 8 { 0.5 } else { -0.5 };
      assert_eq!(v, expect, "sample {i}");
    }
  }

  #[test]
  fn block_position_carries_across_buffers() {
    let mut p = PhaseAlternator::new();
    p.set_amount(1.0);
    let mut a = vec![0.25f32; 5];
    let mut b = vec![0.25f32; 5];
    p.process(&mut a);
    p.process(&mut b);
    assert_eq!(&b[..3], &[0.25, 0.25, 0.25]);
    assert_eq!(&b[3..], &[-0.25, -0.25]);
  }

  #[test]
  fn half_amount_mutes_second_half() {
    let mut p = PhaseAlternator::new();
    p.set_amount(0.5);
    let mut buf = vec![0.8f32; 16];
    p.process(&mut buf);
    assert!(buf[..8].iter().all(|&v| (v - 0.8).abs() < 1e-6));
    assert!(buf[8..].iter().all(|&v| v.abs() < 1e-6));
  }
}
