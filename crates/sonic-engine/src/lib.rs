//! Sonic audio engine client
//!
//! The gateway never processes audio itself; every tool is one remote call to the audio
//! engine. [`AudioEngine`] is the seam the dispatcher calls through, and
//! [`GrpcAudioEngine`] implements it over the contract in `proto/audio.proto`.

pub mod engine;
pub mod error;
pub mod grpc;
pub mod proto;

pub use engine::AudioEngine;
pub use error::EngineError;
pub use grpc::GrpcAudioEngine;
