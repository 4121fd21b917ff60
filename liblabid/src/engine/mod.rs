// liblabid/src/engine/mod.rs

/// Engine builder
pub mod builder;
/// Timeout and retry policy
pub mod config;
/// The engine itself
pub mod handle;

pub use builder::EngineBuilder;
pub use config::EngineConfig;
pub use handle::ProtocolEngine;
