pub mod assembler;
pub mod audio_pipeline;
pub mod classifier;
pub mod config;
pub mod framing;
pub mod metadata;
pub mod pipeline;
pub mod telemetry;
pub mod transport;

pub use config::ConfigSet;
