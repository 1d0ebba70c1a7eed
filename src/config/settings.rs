use clap::ArgMatches;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::store::DEMO_TABLE_ROWS;
use crate::utils::error::MonitorError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub client: ClientConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    // Connection settings
    pub host: String,
    pub port: u16,
    pub connect_timeout_ms: u64,

    // Polling settings
    pub poll_interval_ms: u64,
    pub unit_id: u8,
    /// 1-based display addresses to poll, one block each.
    pub addresses: Vec<String>,
    pub register_count: u16,
    /// Low register carries the high float word when set.
    pub swap_words: bool,

    // Output settings
    pub output_format: String,
    pub output_file: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    pub table_rows: usize,
    /// Pre-fill the table with the repeating demo pattern.
    pub seed_registers: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 502,
            connect_timeout_ms: 5000,
            poll_interval_ms: 3000,
            unit_id: 1,
            addresses: vec!["11107".to_string(), "11201".to_string()],
            register_count: 2,
            swap_words: false,
            output_format: "console".to_string(),
            output_file: None,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 502,
            table_rows: DEMO_TABLE_ROWS,
            seed_registers: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client: ClientConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply command line overrides on top of file/default values.
    pub fn apply_matches(&mut self, matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(host) = matches.get_one::<String>("host") {
            self.client.host = host.clone();
        }
        if let Some(port) = matches.get_one::<String>("port") {
            let port: u16 = port.parse()?;
            self.client.port = port;
            self.server.port = port;
        }
        if let Some(interval) = matches.get_one::<String>("interval") {
            self.client.poll_interval_ms = interval.parse()?;
        }
        if let Some(addresses) = matches.get_one::<String>("addresses") {
            self.client.addresses = addresses
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Some(format) = matches.get_one::<String>("format") {
            self.client.output_format = format.clone();
        }
        if let Some(file) = matches.get_one::<String>("output-file") {
            self.client.output_file = Some(file.clone());
        }
        if let Some(bind) = matches.get_one::<String>("bind") {
            self.server.bind = bind.clone();
        }
        if let Some(rows) = matches.get_one::<String>("rows") {
            self.server.table_rows = rows.parse()?;
        }
        self.validate()?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), MonitorError> {
        if self.client.host.trim().is_empty() {
            return Err(MonitorError::ConfigError("host must not be empty".into()));
        }
        if self.client.poll_interval_ms == 0 {
            return Err(MonitorError::ConfigError(
                "poll interval must be positive".into(),
            ));
        }
        if self.client.register_count == 0 {
            return Err(MonitorError::ConfigError(
                "register count must be positive".into(),
            ));
        }
        if self.client.addresses.is_empty() {
            return Err(MonitorError::ConfigError(
                "at least one poll address is required".into(),
            ));
        }
        match self.client.output_format.as_str() {
            "console" | "json" | "csv" => {}
            other => {
                return Err(MonitorError::ConfigError(format!(
                    "unknown output format '{}'",
                    other
                )))
            }
        }
        if self.server.table_rows == 0 {
            return Err(MonitorError::ConfigError(
                "server table needs at least one row".into(),
            ));
        }
        Ok(())
    }
}
