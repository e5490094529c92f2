//! Configuration management for `apwatch`
//!
//! Settings are read from one TOML file located by [`ConfigManager`].
//! Every section has defaults, so a file only needs its `[[devices]]`.

pub mod device;
mod manager;
pub mod settings;

pub use device::{DeviceConfig, TIMEOUT_RANGE_SECS};
pub use manager::{CONFIG_ENV, CONFIG_FILE_NAME, ConfigManager};
pub use settings::{
    AppSettings, LoggingSettings, PollerSettings, ServerSettings, TranscriptSettings,
};
