//! Request logger options loaded from a TOML file and the environment.

use std::path::Path;

use figment::Figment;
use figment::providers::{Env, Format, Toml};
use serde::Deserialize;

use super::config::LoggerConfig;
use super::field::Field;
use crate::error::Error;

/// Prefix for environment overrides, e.g. `TSU_ACCESS_LOG_MIN_STATUS=400`.
pub const ENV_PREFIX: &str = "TSU_ACCESS_LOG_";

/// The serialisable part of a [`LoggerConfig`].
///
/// ```toml
/// fields = ["ip", "status", "latency"]
/// min_status = 400
/// skip_paths = ["/healthz", "/readyz"]
/// ```
///
/// Options missing from every source stay unset and get their defaults when
/// the logger resolves its configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AccessLogSettings {
    pub fields: Option<Vec<Field>>,
    pub min_status: Option<u16>,
    /// Exact request paths that are never logged.
    pub skip_paths: Vec<String>,
}

impl AccessLogSettings {
    /// Load from `path`, then apply `TSU_ACCESS_LOG_*` overrides. A missing
    /// file contributes nothing.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let settings = Figment::new()
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX))
            .extract()?;
        Ok(settings)
    }

    pub fn into_config(self) -> LoggerConfig {
        let mut config = LoggerConfig {
            fields: self.fields,
            min_status: self.min_status,
            ..LoggerConfig::default()
        };
        if !self.skip_paths.is_empty() {
            let paths = self.skip_paths;
            config = config.skipper(move |req| paths.iter().any(|p| p == req.path()));
        }
        config
    }
}
