use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::minifiers::CssMinifyOptions;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Destination root; input paths are mirrored beneath it
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Exact file or directory names skipped during traversal
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,

    /// Maximum number of files processed at the same time
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Options handed to the CSS minifier
    #[serde(default)]
    pub css: CssMinifyOptions,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Log level for the application
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    // @returns: Matching filter for the log facade
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

// Implement FromStr trait for LogLevel
impl std::str::FromStr for LogLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            _ => Err(anyhow!("Invalid log level: {}", s)),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            exclude: default_exclude(),
            concurrency: default_concurrency(),
            css: CssMinifyOptions::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    /// Load a configuration from a JSON file; missing fields take defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {:?}", path))?;
        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        Ok(config)
    }

    /// Save the configuration as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        std::fs::write(path.as_ref(), json)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }

    /// Whether `name` matches one of the exclusion entries exactly
    pub fn is_excluded(&self, name: &str) -> bool {
        self.exclude.iter().any(|excluded| excluded == name)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.output_dir.as_os_str().is_empty() {
            return Err(anyhow!("Output directory must not be empty"));
        }

        if self.concurrency == 0 {
            return Err(anyhow!("Concurrency must be at least 1"));
        }

        for name in &self.exclude {
            if name.is_empty() {
                return Err(anyhow!("Exclusion entries must not be empty"));
            }
            if name.contains('/') || name.contains('\\') {
                return Err(anyhow!(
                    "Exclusion entries are exact names, not paths: {}",
                    name
                ));
            }
        }

        Ok(())
    }
}

// Default value functions
fn default_output_dir() -> PathBuf {
    PathBuf::from("./output/")
}

fn default_exclude() -> Vec<String> {
    vec![".svn".to_string(), ".git".to_string()]
}

fn default_concurrency() -> usize {
    8
}
