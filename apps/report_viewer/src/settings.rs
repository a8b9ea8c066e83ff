use std::{path::Path, time::Duration};

use anyhow::Context;
use client_core::StaleResponsePolicy;
use config::{Config, Environment, File};
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "report_viewer.toml";
const ENV_PREFIX: &str = "REPORT_VIEWER";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub base_url: Option<String>,
    pub request_timeout_secs: u64,
    /// Catalog refresh period; 0 loads the catalog once.
    pub catalog_refresh_secs: u64,
    pub stale_responses: StaleResponsePolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: None,
            request_timeout_secs: 30,
            catalog_refresh_secs: 0,
            stale_responses: StaleResponsePolicy::Discard,
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn catalog_refresh(&self) -> Option<Duration> {
        (self.catalog_refresh_secs > 0).then(|| Duration::from_secs(self.catalog_refresh_secs))
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

/// Defaults, then the config file, then `REPORT_VIEWER_*` environment
/// variables. An explicitly given file must exist; the default one may not.
pub fn load_settings(config_path: Option<&Path>) -> anyhow::Result<Settings> {
    build_settings(config_path, None)
}

fn build_settings(
    config_path: Option<&Path>,
    env_source: Option<config::Map<String, String>>,
) -> anyhow::Result<Settings> {
    let (path, required) = match config_path {
        Some(path) => (path, true),
        None => (Path::new(DEFAULT_CONFIG_FILE), false),
    };

    Config::builder()
        .add_source(File::from(path).required(required))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .source(env_source),
        )
        .build()
        .with_context(|| format!("failed to load settings from '{}'", path.display()))?
        .try_deserialize()
        .context("invalid report viewer settings")
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;
