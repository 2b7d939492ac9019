pub mod biquad;
pub mod modem;
pub mod noise_floor;
pub mod phase;
pub mod ramp;
pub mod waveshaper;
pub mod white_noise;

use crate::engine::error::{RadioError, Result};

/// Grow `buf` to at least `len` elements. Never shrinks.
///
/// Returns `true` when the buffer actually grew. Allocation failure is
/// reported instead of aborting so the caller can refuse the buffer before
/// touching any sample.
pub(crate) fn grow<T: Clone + Default>(buf: &mut Vec<T>, len: usize, what: &'static str) -> Result<bool> {
  if buf.len() >= len { return Ok(false); }
  buf
    .try_reserve_exact(len - buf.len())
    .map_err(|source| RadioError::Alloc { what, len, source })?;
  buf.resize(len, T::default());
  Ok(true)
}
