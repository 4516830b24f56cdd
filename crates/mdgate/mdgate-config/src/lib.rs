//! Gateway configuration: a TOML file deserialized with `serde`, using a
//! per-field defaults module so a minimal config only needs `symbols`.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

#[derive(Deserialize, Debug)]
pub struct GatewayConfig {
    #[serde(default = "defaults::region_name")]
    pub region_name: String,

    pub symbols: Vec<String>,

    #[serde(default)]
    pub limit_ratio_overrides: HashMap<String, f64>,

    #[serde(default = "defaults::heartbeat_interval_ms")]
    pub heartbeat_interval_ms: u64,

    #[serde(default = "defaults::max_read_spins")]
    pub max_read_spins: u32,

    #[serde(default = "defaults::log_level")]
    pub log_level: String,

    #[serde(default)]
    pub mock_feed: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read '{path}'")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config")]
    Parse(#[from] toml::de::Error),
}

mod defaults {
    pub fn region_name() -> String {
        "/mdgate_md".into()
    }

    pub fn heartbeat_interval_ms() -> u64 {
        1_000
    }

    pub fn max_read_spins() -> u32 {
        200
    }

    pub fn log_level() -> String {
        "info".into()
    }
}

impl GatewayConfig {
    pub fn load(path: impl AsRef<Path> + ToString) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        let config: GatewayConfig = toml::from_str(&raw)?;
        Ok(config)
    }

    /// `symbol_count` is derived from the symbol list rather than
    /// configured separately, so the two can never drift apart.
    pub fn symbol_count(&self) -> u32 {
        self.symbols.len() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_fills_in_defaults() {
        let config: GatewayConfig = toml::from_str(
            r#"
            symbols = ["600000.SH", "000001.SZ"]
            "#,
        )
        .unwrap();
        assert_eq!(config.region_name, "/mdgate_md");
        assert_eq!(config.heartbeat_interval_ms, 1_000);
        assert_eq!(config.max_read_spins, 200);
        assert_eq!(config.log_level, "info");
        assert!(!config.mock_feed);
        assert_eq!(config.symbol_count(), 2);
    }

    #[test]
    fn explicit_fields_override_defaults() {
        let config: GatewayConfig = toml::from_str(
            r#"
            region_name = "/custom_md"
            symbols = ["300001.SZ"]
            heartbeat_interval_ms = 500
            max_read_spins = 50
            log_level = "debug"
            mock_feed = true

            [limit_ratio_overrides]
            "300001.SZ" = 0.15
            "#,
        )
        .unwrap();
        assert_eq!(config.region_name, "/custom_md");
        assert_eq!(config.heartbeat_interval_ms, 500);
        assert_eq!(config.max_read_spins, 50);
        assert_eq!(config.log_level, "debug");
        assert!(config.mock_feed);
        assert_eq!(config.limit_ratio_overrides.get("300001.SZ"), Some(&0.15));
    }

    #[test]
    fn missing_file_surfaces_a_read_error() {
        let err = GatewayConfig::load("/nonexistent/mdgate.toml".to_string()).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn malformed_toml_surfaces_a_parse_error() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("mdgate_config_bad_{}.toml", std::process::id()));
        std::fs::write(&path, "not = [valid").unwrap();
        let err = GatewayConfig::load(path.to_string_lossy().to_string()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        std::fs::remove_file(&path).unwrap();
    }
}
