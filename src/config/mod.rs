mod core;
mod loader;

/// Name of the project configuration file
pub const CONFIG_FILE_NAME: &str = ".classmap.toml";

pub use self::core::{ClassmapConfig, DiscoveryConfig, ModelConfig, OutputConfig, ResolutionConfig};
pub use loader::{directory_ancestors, load_config, load_config_from, parse_and_validate_config};
