// Adapters - External system implementations

pub mod exec_ffmpeg;
pub mod json_store;
pub mod memory_store;
pub mod system_clock;
pub mod toml_config;

// Re-export adapters
pub use exec_ffmpeg::{EncoderSettings, FfmpegExecutor};
pub use json_store::JsonFileSnapshotStore;
pub use memory_store::InMemorySnapshotStore;
pub use system_clock::{FixedClock, SystemClock};
pub use toml_config::{AppConfig, TomlConfigAdapter};
