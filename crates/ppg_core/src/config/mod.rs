//! Configuration management with TOML-based settings.

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use settings::{
    ApiSettings, ConfigSection, LoggingSettings, PathSettings, SearchSettings, Settings,
};
