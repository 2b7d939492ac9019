use log::{error, info, warn};

use super::chain::FilterChain;
use super::dsp::modem::DEFAULT_CARRIER_HZ;
use super::error::{RadioError, Result};
use super::mapper::{clamp_distance, map_distance};
use super::params::{CutoffConfig, RadioParams, RadioSettings};
use super::rng::{EntropySource, SeedSequence, ThreadEntropy};

fn valid_carrier(hz: f32) -> bool { hz.is_finite() && hz >= 0.0 }

/// Host-facing front of the chain.
///
/// Two call sites: `tick` at control rate and `process` at audio rate. Before
/// `initialize` (or after a fatal growth failure) `process` leaves audio as
/// it is.
pub struct RadioFilter {
  settings: RadioSettings,
  params: RadioParams,
  entropy: Box<dyn EntropySource + Send>,
  chain: Option<FilterChain>,
  sample_rate: f32,
  channels: usize,
  last_error: Option<RadioError>,
}

impl RadioFilter {
  /// Seeds from `settings.seed` when given, otherwise from thread entropy.
  pub fn new(settings: RadioSettings) -> Self {
    let entropy: Box<dyn EntropySource + Send> = match settings.seed {
      Some(seed) => Box::new(SeedSequence::new(seed)),
      None => Box::new(ThreadEntropy),
    };
    Self::with_entropy(settings, entropy)
  }

  pub fn with_entropy(settings: RadioSettings, entropy: Box<dyn EntropySource + Send>) -> Self {
    let mut settings = settings;
    settings.distance = clamp_distance(settings.distance);
    if !valid_carrier(settings.modem_carrier_hz) {
      warn!("ignoring carrier {}, using {DEFAULT_CARRIER_HZ}", settings.modem_carrier_hz);
      settings.modem_carrier_hz = DEFAULT_CARRIER_HZ;
    }
    let params = map_distance(settings.distance, &settings.cutoffs);
    Self { settings, params, entropy, chain: None, sample_rate: 0.0, channels: 0, last_error: None }
  }

  pub fn settings(&self) -> &RadioSettings { &self.settings }
  pub fn params(&self) -> &RadioParams { &self.params }
  pub fn chain(&self) -> Option<&FilterChain> { self.chain.as_ref() }
  pub fn is_initialized(&self) -> bool { self.chain.is_some() }
  pub fn sample_rate(&self) -> f32 { self.sample_rate }
  pub fn last_error(&self) -> Option<&RadioError> { self.last_error.as_ref() }

  /// Builds the chain for this sample rate and channel count. Repeating the
  /// call with the same format keeps the running chain. A rejected format
  /// leaves the current chain and format alone.
  pub fn initialize(&mut self, sample_rate: f32, channels: usize) -> Result<()> {
    if let Some(chain) = &self.chain {
      if chain.sample_rate() == sample_rate && chain.channels() >= channels { return Ok(()); }
    }
    let chain = self.build(sample_rate, channels)?;
    self.sample_rate = sample_rate;
    self.channels = channels;
    self.install(chain);
    Ok(())
  }

  /// Throws away all filter state and rebuilds against the current format.
  pub fn reset(&mut self) -> Result<()> {
    if self.sample_rate <= 0.0 { return Ok(()); }
    let chain = self.build(self.sample_rate, self.channels)?;
    self.install(chain);
    Ok(())
  }

  fn build(&mut self, sample_rate: f32, channels: usize) -> Result<FilterChain> {
    match FilterChain::new(sample_rate, channels, self.settings.modem_carrier_hz, self.entropy.as_mut()) {
      Ok(mut chain) => {
        chain.retune(&self.params);
        Ok(chain)
      }
      Err(e) => {
        error!("radio chain build failed: {e}");
        Err(e)
      }
    }
  }

  fn install(&mut self, chain: FilterChain) {
    info!("radio chain ready: {} Hz, {} ch, distance {:.3}", self.sample_rate, self.channels, self.settings.distance);
    self.chain = Some(chain);
    self.last_error = None;
  }

  pub fn set_distance(&mut self, distance: f32) {
    if !distance.is_finite() { warn!("ignoring non-finite distance {distance}"); return; }
    self.settings.distance = clamp_distance(distance);
  }

  pub fn set_cutoffs(&mut self, cutoffs: CutoffConfig) { self.settings.cutoffs = cutoffs.clamped(); }

  /// Modem carrier in Hz; the table is rebuilt at the next tick.
  pub fn set_carrier(&mut self, hz: f32) {
    if !valid_carrier(hz) { warn!("ignoring carrier {hz}"); return; }
    self.settings.modem_carrier_hz = hz;
  }

  /// Replaces every control input. A new carrier reaches the chain at the
  /// next tick; a new seed only takes effect on `reset`.
  pub fn set_settings(&mut self, settings: RadioSettings) {
    if settings.seed != self.settings.seed {
      if let Some(seed) = settings.seed { self.entropy = Box::new(SeedSequence::new(seed)); }
    }
    let carrier = self.settings.modem_carrier_hz;
    self.settings = settings;
    if !valid_carrier(self.settings.modem_carrier_hz) {
      warn!("ignoring carrier {}, keeping {carrier}", self.settings.modem_carrier_hz);
      self.settings.modem_carrier_hz = carrier;
    }
    self.settings.distance = clamp_distance(self.settings.distance);
    self.settings.cutoffs = self.settings.cutoffs.clamped();
  }

  /// Control-rate tick: map the current distance and push it into the chain.
  pub fn tick(&mut self) {
    self.params = map_distance(self.settings.distance, &self.settings.cutoffs);
    if let Some(chain) = self.chain.as_mut() {
      chain.set_carrier(self.settings.modem_carrier_hz);
      chain.retune(&self.params);
    }
  }

  /// Audio-rate: processes interleaved `buf` in place.
  pub fn process(&mut self, buf: &mut [f32], channels: usize) {
    let Some(chain) = self.chain.as_mut() else { return };
    if channels == 0 { warn!("process called with zero channels"); return; }
    if let Err(e) = chain.process(buf, channels) {
      // buffer is untouched; the instance stays silent-safe until re-initialized
      error!("radio chain disabled: {e}");
      self.chain = None;
      self.last_error = Some(e);
    }
  }
}
