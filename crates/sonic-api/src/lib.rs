//! Sonic API Library
//!
//! This crate provides the HTTP surface of the audio tools gateway: the upload handler,
//! the tool dispatch pipeline, error rendering and application setup.

mod handlers;
mod middleware;
pub mod services;
pub mod setup;
mod telemetry;
pub mod utils;

pub mod error;
pub mod state;

pub use error::HttpAppError;
pub use state::AppState;
