//! Loops a WAV file through the radio chain on the default output device.
//! Type a distance (0..1) and Enter to move the listener; `reset`, `pause`,
//! `play` and `q` do what they say.

use std::io::BufRead;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use log::{info, warn};
use radio_distance::engine::audio::{AudioEngine, LoopSource};
use radio_distance::engine::messages::EngineMsg;
use radio_distance::{wav_io, RadioSettings};

#[derive(Parser)]
#[command(name = "radio-live")]
#[command(author, version, about = "Play a WAV file through the radio chain, live")]
struct Args {
  /// WAV file to loop
  input: PathBuf,

  /// Starting distance in [0, 1]
  #[arg(long, short = 'd', default_value_t = 0.0)]
  distance: f32,

  /// JSON settings file
  #[arg(long, short = 's')]
  settings: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
  let args = Args::parse();

  let mut settings = match &args.settings {
    Some(path) => RadioSettings::load(path).with_context(|| format!("loading {}", path.display()))?,
    None => RadioSettings::default(),
  };
  settings.distance = args.distance;

  let clip = wav_io::read_wav(&args.input).with_context(|| format!("reading {}", args.input.display()))?;
  let source = LoopSource::new(clip.samples, clip.channels, clip.sample_rate);
  let mut engine = AudioEngine::new(settings, source)?;
  let tx = engine.sender();
  engine.start()?;

  let stdin = std::io::stdin();
  for line in stdin.lock().lines() {
    let line = line?;
    let msg = match line.trim() {
      "" => continue,
      "q" | "quit" => { let _ = tx.send(EngineMsg::Quit); break; }
      "reset" => EngineMsg::Reset,
      "pause" => EngineMsg::Transport { playing: false },
      "play" => EngineMsg::Transport { playing: true },
      other => match other.parse::<f32>() {
        Ok(distance) => EngineMsg::SetDistance { distance },
        Err(_) => { warn!("unknown command {other:?}"); continue; }
      },
    };
    if tx.send(msg).is_err() { break; }
  }
  engine.stop();
  info!("stopped");
  Ok(())
}
