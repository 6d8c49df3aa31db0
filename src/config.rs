//! Server configuration from environment variables
//!
//! | Variable | Default |
//! |---|---|
//! | `LOG_ANALYTICS_HOST` | `0.0.0.0` |
//! | `LOG_ANALYTICS_PORT` | `5000` |
//! | `LOG_ANALYTICS_DATA_FILE` | unset (in-memory store) |
//! | `LOG_ANALYTICS_SEED_DEMO` | `true` |
//! | `LOG_ANALYTICS_GENERATOR_INTERVAL_SECS` | unset (generator off) |
//! | `LOG_ANALYTICS_CHANNEL_CAPACITY` | `1024` |
//! | `LOG_ANALYTICS_MAX_PAGE_SIZE` | `1000` |

use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::live::DEFAULT_CAPACITY;
use crate::query::MAX_PAGE_SIZE;

const ENV_HOST: &str = "LOG_ANALYTICS_HOST";
const ENV_PORT: &str = "LOG_ANALYTICS_PORT";
const ENV_DATA_FILE: &str = "LOG_ANALYTICS_DATA_FILE";
const ENV_SEED_DEMO: &str = "LOG_ANALYTICS_SEED_DEMO";
const ENV_GENERATOR_INTERVAL: &str = "LOG_ANALYTICS_GENERATOR_INTERVAL_SECS";
const ENV_CHANNEL_CAPACITY: &str = "LOG_ANALYTICS_CHANNEL_CAPACITY";
const ENV_MAX_PAGE_SIZE: &str = "LOG_ANALYTICS_MAX_PAGE_SIZE";

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// JSON-lines file to persist entries in; `None` keeps them in memory
    pub data_file: Option<PathBuf>,
    /// Seed sample entries into an empty store at startup
    pub seed_demo: bool,
    /// Interval of the demo generator; `None` disables it
    pub generator_interval: Option<Duration>,
    pub channel_capacity: usize,
    pub max_page_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            data_file: None,
            seed_demo: true,
            generator_interval: None,
            channel_capacity: DEFAULT_CAPACITY,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

impl ServerConfig {
    /// Read the configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from any key lookup; unset or malformed values
    /// keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let current_dir = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

        let data_file = lookup(ENV_DATA_FILE)
            .filter(|path| !path.trim().is_empty())
            .map(|path| {
                if Path::new(&path).is_absolute() {
                    PathBuf::from(path)
                } else {
                    current_dir.join(path)
                }
            });

        let generator_interval = parse_or(&lookup, ENV_GENERATOR_INTERVAL, 0u64);

        Self {
            host: lookup(ENV_HOST)
                .filter(|h| !h.trim().is_empty())
                .unwrap_or(defaults.host),
            port: parse_or(&lookup, ENV_PORT, defaults.port),
            data_file,
            seed_demo: parse_bool_or(&lookup, ENV_SEED_DEMO, defaults.seed_demo),
            generator_interval: (generator_interval > 0)
                .then(|| Duration::from_secs(generator_interval)),
            channel_capacity: parse_or(&lookup, ENV_CHANNEL_CAPACITY, defaults.channel_capacity)
                .max(1),
            max_page_size: parse_or(&lookup, ENV_MAX_PAGE_SIZE, defaults.max_page_size).max(1),
        }
    }

    /// `host:port` for binding
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, "ignoring malformed setting");
            default
        }),
        None => default,
    }
}

fn parse_bool_or<F>(lookup: &F, key: &str, default: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).map(|raw| raw.trim().to_ascii_lowercase()) {
        Some(raw) => match raw.as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => {
                warn!(key, value = %raw, "ignoring malformed setting");
                default
            }
        },
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> ServerConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_unset() {
        assert_eq!(config(&[]), ServerConfig::default());
    }

    #[test]
    fn test_values_are_read() {
        let cfg = config(&[
            (ENV_PORT, "8081"),
            (ENV_SEED_DEMO, "no"),
            (ENV_GENERATOR_INTERVAL, "8"),
            (ENV_DATA_FILE, "/var/lib/logs.jsonl"),
        ]);

        assert_eq!(cfg.port, 8081);
        assert!(!cfg.seed_demo);
        assert_eq!(cfg.generator_interval, Some(Duration::from_secs(8)));
        assert_eq!(cfg.data_file, Some(PathBuf::from("/var/lib/logs.jsonl")));
        assert_eq!(cfg.bind_address(), "0.0.0.0:8081");
    }

    #[test]
    fn test_malformed_values_fall_back() {
        let cfg = config(&[(ENV_PORT, "eighty"), (ENV_CHANNEL_CAPACITY, "0")]);
        assert_eq!(cfg.port, 5000);
        assert_eq!(cfg.channel_capacity, 1);
    }

    #[test]
    fn test_relative_data_file_is_resolved() {
        let cfg = config(&[(ENV_DATA_FILE, "data/logs.jsonl")]);
        let path = cfg.data_file.unwrap();
        assert!(path.is_absolute());
        assert!(path.ends_with("data/logs.jsonl"));
    }
}
