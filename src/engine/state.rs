use std::sync::{Arc, Mutex, MutexGuard};

use super::error::Result;
use super::params::{CutoffConfig, RadioSettings};
use super::processor::RadioFilter;

/// A `RadioFilter` behind one chain-level lock, for hosts that tick and
/// process from different threads. Each call holds the lock for the whole
/// retune or the whole buffer.
#[derive(Clone)]
pub struct SharedRadioFilter {
  inner: Arc<Mutex<RadioFilter>>,
}

impl SharedRadioFilter {
  pub fn new(filter: RadioFilter) -> Self { Self { inner: Arc::new(Mutex::new(filter)) } }

  pub fn from_settings(settings: RadioSettings) -> Self { Self::new(RadioFilter::new(settings)) }

  // A panic while holding the lock leaves plain numeric state behind, so a
  // poisoned lock is still usable.
  fn lock(&self) -> MutexGuard<'_, RadioFilter> {
    self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
  }

  pub fn initialize(&self, sample_rate: f32, channels: usize) -> Result<()> { self.lock().initialize(sample_rate, channels) }
  pub fn reset(&self) -> Result<()> { self.lock().reset() }
  pub fn set_distance(&self, distance: f32) { self.lock().set_distance(distance) }
  pub fn set_cutoffs(&self, cutoffs: CutoffConfig) { self.lock().set_cutoffs(cutoffs) }

  /// Set distance and retune under one lock.
  pub fn retune(&self, distance: f32) {
    let mut f = self.lock();
    f.set_distance(distance);
    f.tick();
  }

  pub fn tick(&self) { self.lock().tick() }
  pub fn process(&self, buf: &mut [f32], channels: usize) { self.lock().process(buf, channels) }

  pub fn with<R>(&self, f: impl FnOnce(&mut RadioFilter) -> R) -> R { f(&mut self.lock()) }
}
