use crate::analyzers::ModelWalk;
use crate::config::ClassmapConfig;
use crate::core::{Error, Model};
use crate::io::{create_writer, OutputFormat};
use crate::runtime::Runtime;
use anyhow::{Context, Result};
use colored::*;
use std::fs::File;
use std::io::{BufWriter, IsTerminal, Write};
use std::path::PathBuf;
use tracing::{debug, info};

/// Settings for one `classmap model` run, as given on the command line
#[derive(Debug, Clone, Default)]
pub struct ModelCommandConfig {
    pub path: PathBuf,
    pub package: Option<String>,
    pub format: Option<OutputFormat>,
    pub output: Option<PathBuf>,
    pub internal_prefix: Option<String>,
    pub max_depth: Option<usize>,
    pub exclude: Vec<String>,
    pub color: bool,
}

/// Command line settings merged over the file configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSettings {
    pub format: OutputFormat,
    pub internal_prefix: String,
    pub max_depth: usize,
    pub exclude: Vec<String>,
}

impl ModelCommandConfig {
    pub fn resolve(&self, file_config: &ClassmapConfig) -> ResolvedSettings {
        let format = self
            .format
            .or_else(|| file_config.default_format().and_then(OutputFormat::from_name))
            .unwrap_or(OutputFormat::Text);
        let mut exclude = file_config.exclude_patterns().to_vec();
        exclude.extend(self.exclude.iter().cloned());

        ResolvedSettings {
            format,
            internal_prefix: self
                .internal_prefix
                .clone()
                .unwrap_or_else(|| file_config.internal_prefix().to_string()),
            max_depth: self.max_depth.unwrap_or_else(|| file_config.max_depth()),
            exclude,
        }
    }
}

/// Models of everything under `package`, or of every loaded module
pub fn build_models(
    runtime: &Runtime,
    package: Option<&str>,
    internal_prefix: &str,
) -> Result<Vec<Model>, Error> {
    let walk = match package {
        Some(package) => {
            let loaded = runtime.modules().any(|module| {
                module.name == package || module.name.starts_with(&format!("{}.", package))
            });
            if !loaded {
                return Err(Error::ModuleNotFound(package.to_string()));
            }
            ModelWalk::new(runtime, package)
        }
        None => ModelWalk::all(runtime),
    };
    Ok(walk.with_internal_prefix(internal_prefix).collect())
}

pub fn handle_model(config: ModelCommandConfig, file_config: &ClassmapConfig) -> Result<()> {
    let settings = config.resolve(file_config);
    debug!(?settings, "Resolved model settings");

    let mut runtime = Runtime::new().with_max_depth(settings.max_depth);
    let report = runtime
        .load_path(&config.path, &settings.exclude)
        .with_context(|| format!("Failed to load {}", config.path.display()))?;

    if !report.failures.is_empty() {
        eprintln!(
            "{} {} file(s) could not be loaded",
            "Warning:".yellow(),
            report.failures.len()
        );
        for failure in &report.failures {
            eprintln!("  {}", failure);
        }
    }
    if report.modules.is_empty() {
        anyhow::bail!("No Python modules loaded from {}", config.path.display());
    }
    info!(modules = report.modules.len(), "Loaded modules");

    let models = build_models(&runtime, config.package.as_deref(), &settings.internal_prefix)?;

    let (destination, color): (Box<dyn Write>, bool) = match &config.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            (Box::new(BufWriter::new(file)), false)
        }
        None => {
            let color = config.color && std::io::stdout().is_terminal();
            (Box::new(std::io::stdout()), color)
        }
    };

    let mut writer = create_writer(settings.format, destination, color);
    writer.write_models(&models)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_and_validate_config;

    #[test]
    fn test_cli_settings_override_file_config() {
        let file_config = parse_and_validate_config(
            "[output]\ndefault_format = \"json\"\n[discovery]\nexclude = [\"build/**\"]\n",
        )
        .unwrap();

        let config = ModelCommandConfig {
            exclude: vec!["tests/**".to_string()],
            max_depth: Some(8),
            ..Default::default()
        };
        let settings = config.resolve(&file_config);
        assert_eq!(settings.format, OutputFormat::Json);
        assert_eq!(settings.max_depth, 8);
        assert_eq!(settings.internal_prefix, "_");
        assert_eq!(settings.exclude, vec!["build/**", "tests/**"]);

        let config = ModelCommandConfig {
            format: Some(OutputFormat::Text),
            ..Default::default()
        };
        assert_eq!(config.resolve(&file_config).format, OutputFormat::Text);
    }

    #[test]
    fn test_unknown_package_is_an_error() {
        let mut runtime = Runtime::new();
        runtime.load_source("shop", "class Cart:\n    pass\n").unwrap();
        let error = build_models(&runtime, Some("shopping"), "_").unwrap_err();
        assert!(matches!(error, Error::ModuleNotFound(name) if name == "shopping"));

        let models = build_models(&runtime, Some("shop"), "_").unwrap();
        assert_eq!(models.len(), 1);
    }
}
