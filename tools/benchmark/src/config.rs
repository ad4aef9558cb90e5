use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use telemetry::TelemetryConfig;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct BenchConfig {
    pub run: RunConfig,
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RunConfig {
    /// Calls per serial benchmark.
    pub iterations: usize,
    /// Threads for the parallel `now()` benchmark. 0 means one per core.
    pub threads: usize,
    /// Pin each parallel thread to its own core.
    pub pin_cores: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            iterations: 1_000_000,
            threads: 0,
            pin_cores: true,
        }
    }
}

/// Loads `path`, or the defaults when the file does not exist.
pub fn load(path: &str) -> Result<BenchConfig, anyhow::Error> {
    if !Path::new(path).exists() {
        return Ok(BenchConfig::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path))?;

    parse(&content).with_context(|| format!("Failed to parse {}", path))
}

fn parse(content: &str) -> Result<BenchConfig, toml::de::Error> {
    toml::from_str(content)
}
