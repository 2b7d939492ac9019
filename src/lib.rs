pub mod engine {
  pub mod audio;
  pub mod chain;
  pub mod dsp;
  pub mod error;
  pub mod mapper;
  pub mod messages;
  pub mod params;
  pub mod processor;
  pub mod rng;
  pub mod state;
}
pub mod wav_io;

pub use engine::chain::{FilterChain, StageId, CHAIN_ORDER};
pub use engine::error::{RadioError, Result};
pub use engine::mapper::map_distance;
pub use engine::params::{CutoffConfig, RadioParams, RadioSettings};
pub use engine::processor::RadioFilter;
pub use engine::rng::{EntropySource, SeedSequence, ThreadEntropy};
pub use engine::state::SharedRadioFilter;
