use serde::Deserialize;

use super::params::CutoffConfig;

#[derive(Clone, Debug, Deserialize)]
pub enum EngineMsg {
  SetDistance { distance: f32 },
  SetCutoffs(CutoffConfig),
  SetCarrier { hz: f32 },
  Reset,
  Transport { playing: bool },
  Quit,
}
