use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};
use log::{error, info, warn};

use super::{error::{RadioError, Result}, messages::EngineMsg, params::RadioSettings, processor::RadioFilter};

/// Interleaved clip played on repeat as the live input.
pub struct LoopSource {
  samples: Vec<f32>,
  channels: usize,
  pub sample_rate: u32,
  pos: usize,
}

impl LoopSource {
  pub fn new(samples: Vec<f32>, channels: usize, sample_rate: u32) -> Self {
    Self { samples, channels: channels.max(1), sample_rate, pos: 0 }
  }

  fn frames(&self) -> usize { self.samples.len() / self.channels }

  /// Copies the next frames into `out`, folding or duplicating channels.
  pub fn fill(&mut self, out: &mut [f32], out_channels: usize) {
    let frames = self.frames();
    if frames == 0 || out_channels == 0 { out.fill(0.0); return; }
    for frame in out.chunks_mut(out_channels) {
      let base = self.pos * self.channels;
      for (c, s) in frame.iter_mut().enumerate() {
        *s = self.samples[base + c.min(self.channels - 1)];
      }
      self.pos += 1; if self.pos >= frames { self.pos = 0; }
    }
  }
}

pub struct AudioEngine {
  tx: Sender<EngineMsg>,
  rx: Receiver<EngineMsg>,
  pub sr: f32,
  pub channels: usize,
  filter: Option<RadioFilter>,
  source: Option<LoopSource>,
  stream: Option<cpal::Stream>,
}

fn pick_config(device: &cpal::Device, wanted: &[u32]) -> Result<cpal::SupportedStreamConfig> {
  for &sr in wanted {
    let Ok(supported) = device.supported_output_configs() else { break };
    for cfg_range in supported {
      if cfg_range.channels() != 2 { continue; }
      if cfg_range.sample_format() != cpal::SampleFormat::F32 { continue; }
      if cfg_range.min_sample_rate().0 <= sr && cfg_range.max_sample_rate().0 >= sr {
        return Ok(cfg_range.with_sample_rate(cpal::SampleRate(sr)));
      }
    }
  }
  if let Ok(supported) = device.supported_output_configs() {
    for cfg_range in supported {
      if cfg_range.channels() == 2 && cfg_range.sample_format() == cpal::SampleFormat::F32 {
        return Ok(cfg_range.with_max_sample_rate());
      }
    }
  }
  device.default_output_config().map_err(|e| RadioError::Device(e.to_string()))
}

impl AudioEngine {
  pub fn new(settings: RadioSettings, source: LoopSource) -> Result<Self> {
    let (tx, rx) = unbounded();
    let host = cpal::default_host();
    let device = host.default_output_device().ok_or_else(|| RadioError::Device("no output device".into()))?;
    // source rate first, then 44.1k, then 48k
    let config = pick_config(&device, &[source.sample_rate, 44_100, 48_000])?;
    if config.sample_format() != cpal::SampleFormat::F32 {
      return Err(RadioError::Device(format!("unsupported sample format {:?}", config.sample_format())));
    }
    let sr = config.sample_rate().0 as f32;
    if config.sample_rate().0 != source.sample_rate {
      warn!("device runs at {} Hz, source is {} Hz; playing without resampling", config.sample_rate().0, source.sample_rate);
    }
    let channels = config.channels() as usize;

    let mut filter = RadioFilter::new(settings);
    filter.initialize(sr, channels)?;

    Ok(Self { tx, rx, sr, channels, filter: Some(filter), source: Some(source), stream: None })
  }

  pub fn start(&mut self) -> Result<()> {
    if self.stream.is_some() { return Ok(()); }
    let host = cpal::default_host();
    let device = host.default_output_device().ok_or_else(|| RadioError::Device("no output device".into()))?;
    let mut cfg = cpal::StreamConfig {
      channels: self.channels as u16,
      sample_rate: cpal::SampleRate(self.sr as u32),
      buffer_size: cpal::BufferSize::Default,
    };
    // larger fixed buffer; the default underruns on some backends
    cfg.buffer_size = cpal::BufferSize::Fixed(1024);

    let rx = self.rx.clone();
    // Move engine state into the audio thread. Keep None in self.
    let mut filter = self.filter.take().ok_or_else(|| RadioError::Device("engine already consumed".into()))?;
    let mut source = self.source.take().unwrap_or_else(|| LoopSource::new(Vec::new(), 1, self.sr as u32));
    let channels = self.channels;
    let mut playing = true;

    let err_fn = |e: cpal::StreamError| error!("stream error: {e}");
    let stream = device.build_output_stream(&cfg, move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
      // Drain messages without blocking (tight cap to avoid starving audio)
      let mut drained = 0usize;
      loop {
        match rx.try_recv() {
          Ok(msg) => apply_msg(&mut filter, msg, &mut playing),
          Err(TryRecvError::Empty) => break,
          Err(TryRecvError::Disconnected) => break,
        }
        drained += 1;
        if drained >= 24 { break; }
      }
      // one control tick per callback
      filter.tick();
      if playing {
        source.fill(data, channels);
        filter.process(data, channels);
      } else {
        data.fill(0.0);
      }
    }, err_fn, None).map_err(|e| RadioError::Device(e.to_string()))?;
    stream.play().map_err(|e| RadioError::Device(e.to_string()))?;
    info!("live stream started: {} Hz, {} ch", self.sr, self.channels);
    self.stream = Some(stream);
    Ok(())
  }

  pub fn stop(&mut self) {
    self.stream.take();
  }

  pub fn sender(&self) -> Sender<EngineMsg> { self.tx.clone() }
}

fn apply_msg(filter: &mut RadioFilter, msg: EngineMsg, playing: &mut bool) {
  match msg {
    EngineMsg::SetDistance { distance } => filter.set_distance(distance),
    EngineMsg::SetCutoffs(c) => filter.set_cutoffs(c),
    EngineMsg::SetCarrier { hz } => filter.set_carrier(hz),
    EngineMsg::Reset => {
      if let Err(e) = filter.reset() { error!("reset failed: {e}"); }
    }
    EngineMsg::Transport { playing: p } => { *playing = p; }
    EngineMsg::Quit => { *playing = false; }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn loop_source_wraps_and_maps_channels() {
    let mut src = LoopSource::new(vec![0.1, 0.2, 0.3], 1, 48_000);
    let mut out = vec![0.0f32; 8];
    src.fill(&mut out, 2);
    assert_eq!(out, vec![0.1, 0.1, 0.2, 0.2, 0.3, 0.3, 0.1, 0.1]);

    let mut src = LoopSource::new(vec![0.1, -0.1, 0.2, -0.2], 2, 48_000);
    let mut out = vec![0.0f32; 3];
    src.fill(&mut out, 1);
    assert_eq!(out, vec![0.1, 0.2, 0.1]);
  }

  #[test]
  fn empty_source_is_silence() {
    let mut src = LoopSource::new(Vec::new(), 2, 44_100);
    let mut out = vec![0.5f32; 16];
    src.fill(&mut out, 2);
    assert!(out.iter().all(|&v| v == 0.0));
  }

  #[test]
  fn messages_drive_the_filter() {
    let mut f = RadioFilter::new(RadioSettings { seed: Some(1), ..RadioSettings::default() });
    f.initialize(48_000.0, 2).unwrap();
    let mut playing = true;
    apply_msg(&mut f, EngineMsg::SetDistance { distance: 0.6 }, &mut playing);
    apply_msg(&mut f, EngineMsg::SetCarrier { hz: 3_000.0 }, &mut playing);
    apply_msg(&mut f, EngineMsg::Transport { playing: false }, &mut playing);
    assert!(!playing);
    apply_msg(&mut f, EngineMsg::Reset, &mut playing);
    assert!(f.is_initialized());
    assert_eq!(f.settings().distance, 0.6);
    assert_eq!(f.settings().modem_carrier_hz, 3_000.0);
  }
}
