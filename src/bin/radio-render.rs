//! Offline renderer: runs a WAV file through the radio chain.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use log::info;
use radio_distance::{wav_io, RadioFilter, RadioSettings};

#[derive(Parser)]
#[command(name = "radio-render")]
#[command(author, version, about = "Render a WAV file as if heard over a distant radio")]
struct Args {
  /// Input WAV (int or float)
  input: PathBuf,

  /// Output WAV, written as 32-bit float
  output: PathBuf,

  /// Distance in [0, 1]; overrides the settings file
  #[arg(long, short = 'd')]
  distance: Option<f32>,

  /// Sweep linearly from the start distance to this one over the file
  #[arg(long)]
  sweep_to: Option<f32>,

  /// Frames per processing block (one control tick per block)
  #[arg(long, default_value_t = 512)]
  block: usize,

  /// JSON settings file (distance, cutoffs, modem_carrier_hz, seed)
  #[arg(long, short = 's')]
  settings: Option<PathBuf>,

  /// Fixed noise seed for reproducible renders
  #[arg(long)]
  seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
  let args = Args::parse();
  if args.block == 0 { bail!("--block must be at least 1"); }

  let mut settings = match &args.settings {
    Some(path) => RadioSettings::load(path).with_context(|| format!("loading {}", path.display()))?,
    None => RadioSettings::default(),
  };
  if let Some(d) = args.distance { settings.distance = d; }
  if args.seed.is_some() { settings.seed = args.seed; }

  let mut clip = wav_io::read_wav(&args.input).with_context(|| format!("reading {}", args.input.display()))?;
  if clip.channels == 0 { bail!("{} has no channels", args.input.display()); }
  info!("input: {} ch, {} Hz, {} frames", clip.channels, clip.sample_rate, clip.frames());

  let start = settings.distance;
  let end = args.sweep_to.unwrap_or(start);
  let mut filter = RadioFilter::new(settings);
  filter.initialize(clip.sample_rate as f32, clip.channels)?;

  let frames = clip.frames().max(1);
  let step = args.block * clip.channels;
  for (i, block) in clip.samples.chunks_mut(step).enumerate() {
    let t = (i * args.block) as f32 / frames as f32;
    filter.set_distance(start + (end - start) * t);
    filter.tick();
    filter.process(block, clip.channels);
  }
  if let Some(e) = filter.last_error() { bail!("chain disabled mid-render: {e}"); }

  wav_io::write_wav(&args.output, &clip).with_context(|| format!("writing {}", args.output.display()))?;
  let peak = clip.samples.iter().fold(0.0f32, |m, v| m.max(v.abs()));
  info!("wrote {} (peak {:.3})", args.output.display(), peak);
  Ok(())
}
