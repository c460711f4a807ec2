use crate::config::CONFIG_FILE_NAME;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# classmap configuration

[model]
# Methods starting with this prefix are left out of class models
# (the initializer is always kept)
internal_prefix = "_"

[resolution]
# Maximum chained import/alias resolution steps before giving up
max_depth = 32

[discovery]
exclude = [
    "**/.venv/**",
    "**/venv/**",
    "**/build/**",
    "**/__pycache__/**",
]

[output]
default_format = "text"
"#;

/// Writes a default configuration file into `dir`
pub fn init_config_in(dir: &Path, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!("Configuration file already exists. Use --force to overwrite.");
    }

    fs::write(&config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    println!("Created {} configuration file", CONFIG_FILE_NAME);

    Ok(())
}

pub fn init_config(force: bool) -> Result<()> {
    init_config_in(Path::new("."), force)
}
