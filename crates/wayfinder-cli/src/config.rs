//! CLI configuration

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use wayfinder_core::limits::validate_meters_per_floor;
use wayfinder_core::DEFAULT_METERS_PER_FLOOR;

/// Get default data directory
pub fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".wayfinder")
}

/// Location of the config file, overridable with `WAYFINDER_CONFIG`
pub fn config_file_path() -> PathBuf {
    std::env::var_os("WAYFINDER_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|| default_data_dir().join("config.toml"))
}

/// Configuration for the CLI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    pub meters_per_floor: f64,
    pub default_format: String,
    pub avoid_stairs: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            meters_per_floor: DEFAULT_METERS_PER_FLOOR,
            default_format: "table".to_string(),
            avoid_stairs: false,
        }
    }
}

impl Config {
    /// Load from the config file, falling back to defaults
    pub fn load() -> Self {
        let path = config_file_path();
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(_) => return Self::default(),
        };

        match toml::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring invalid config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let path = config_file_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn keys() -> &'static [&'static str] {
        &["data_dir", "meters_per_floor", "default_format", "avoid_stairs"]
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "data_dir" => Some(
                self.data_dir
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(not set)".to_string()),
            ),
            "meters_per_floor" => Some(self.meters_per_floor.to_string()),
            "default_format" => Some(self.default_format.clone()),
            "avoid_stairs" => Some(self.avoid_stairs.to_string()),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            "data_dir" => {
                self.data_dir = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                };
            }
            "meters_per_floor" => {
                let meters: f64 = value
                    .parse()
                    .map_err(|_| anyhow::anyhow!("meters_per_floor must be a number"))?;
                validate_meters_per_floor(meters)?;
                self.meters_per_floor = meters;
            }
            "default_format" => match value {
                "table" | "json" => self.default_format = value.to_string(),
                _ => anyhow::bail!("default_format must be 'table' or 'json'"),
            },
            "avoid_stairs" => {
                self.avoid_stairs = value
                    .parse()
                    .map_err(|_| anyhow::anyhow!("avoid_stairs must be 'true' or 'false'"))?;
            }
            _ => anyhow::bail!(
                "Unknown config key: {}. Available keys: {}",
                key,
                Self::keys().join(", ")
            ),
        }
        Ok(())
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_data_dir)
    }
}
