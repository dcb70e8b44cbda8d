mod settings;

pub use settings::{Config, ConfigError, TomlConfig, TomlSerializerConfig, EXAMPLE_CONFIG};
