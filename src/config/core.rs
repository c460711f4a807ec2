use serde::{Deserialize, Serialize};

use crate::analyzers::DEFAULT_INTERNAL_PREFIX;
use crate::runtime::DEFAULT_MAX_DEPTH;

/// Root configuration structure for classmap
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ClassmapConfig {
    /// Which members make it into a class model
    #[serde(default)]
    pub model: Option<ModelConfig>,

    /// Bounds on import and alias resolution
    #[serde(default)]
    pub resolution: Option<ResolutionConfig>,

    /// Source discovery settings
    #[serde(default)]
    pub discovery: Option<DiscoveryConfig>,

    /// Output configuration
    #[serde(default)]
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ModelConfig {
    /// Methods whose names start with this are left out (the initializer never is)
    #[serde(default)]
    pub internal_prefix: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ResolutionConfig {
    #[serde(default)]
    pub max_depth: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DiscoveryConfig {
    /// Glob patterns of files to skip
    #[serde(default)]
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct OutputConfig {
    /// `text` or `json`
    pub default_format: Option<String>,
}

impl ClassmapConfig {
    pub fn internal_prefix(&self) -> &str {
        self.model
            .as_ref()
            .and_then(|m| m.internal_prefix.as_deref())
            .unwrap_or(DEFAULT_INTERNAL_PREFIX)
    }

    pub fn max_depth(&self) -> usize {
        self.resolution
            .as_ref()
            .and_then(|r| r.max_depth)
            .unwrap_or(DEFAULT_MAX_DEPTH)
    }

    pub fn exclude_patterns(&self) -> &[String] {
        self.discovery
            .as_ref()
            .map(|d| d.exclude.as_slice())
            .unwrap_or(&[])
    }

    pub fn default_format(&self) -> Option<&str> {
        self.output.as_ref().and_then(|o| o.default_format.as_deref())
    }
}
