//! Core polling engine - one sampling task per sensor

mod engine;
mod sampler;

pub use engine::{PollingEngine, EngineError};
pub use sampler::{run_sampling_loop, LoopExit, LoopReport};
