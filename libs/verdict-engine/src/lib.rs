pub mod backend;
pub mod classifier;
pub mod client;
pub mod comparator;
pub mod config;
pub mod decoder;
pub mod error;
pub mod interpreter;
pub mod judge0;
pub mod languages;
pub mod orchestrator;
pub mod poller;
pub mod service;

#[cfg(test)]
mod testing;

pub use config::{ConfigError, EngineConfig};
pub use error::EngineError;
pub use service::ExecutionService;
