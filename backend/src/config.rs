//! Runtime configuration.
//!
//! Defaults, overridden by environment variables (a `.env` file is loaded
//! first by the binary), overridden again by CLI flags.

use std::path::PathBuf;

use crate::api::logs::log_warning;
use crate::prepare::DataSources;

/// Restaurant dataset path.
pub const DEFAULT_RESTAURANTS: &str = "data/zomato.csv";

/// Country code lookup path.
pub const DEFAULT_COUNTRIES: &str = "data/country_codes.csv";

/// HTTP port.
pub const DEFAULT_PORT: u16 = 3000;

pub const ENV_RESTAURANTS: &str = "RESTODASH_RESTAURANTS";
pub const ENV_COUNTRIES: &str = "RESTODASH_COUNTRIES";
pub const ENV_PORT: &str = "RESTODASH_PORT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub sources: DataSources,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sources: DataSources {
                restaurants: PathBuf::from(DEFAULT_RESTAURANTS),
                countries: PathBuf::from(DEFAULT_COUNTRIES),
            },
            port: DEFAULT_PORT,
        }
    }
}

impl Config {
    /// Read the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset or blank keys keep their default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(path) = get(ENV_RESTAURANTS) {
            config.sources.restaurants = PathBuf::from(path);
        }
        if let Some(path) = get(ENV_COUNTRIES) {
            config.sources.countries = PathBuf::from(path);
        }
        if let Some(port) = get(ENV_PORT) {
            match port.trim().parse() {
                Ok(port) => config.port = port,
                Err(_) => log_warning(format!(
                    "{}='{}' is not a port, using {}",
                    ENV_PORT, port, DEFAULT_PORT
                )),
            }
        }

        config
    }

    /// Apply CLI flags on top.
    pub fn with_overrides(
        mut self,
        restaurants: Option<PathBuf>,
        countries: Option<PathBuf>,
        port: Option<u16>,
    ) -> Self {
        if let Some(path) = restaurants {
            self.sources.restaurants = path;
        }
        if let Some(path) = countries {
            self.sources.countries = path;
        }
        if let Some(port) = port {
            self.port = port;
        }
        self
    }
}
