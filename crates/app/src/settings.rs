//! Handles settings for the application.
//!
//! Values come from an optional TOML file (`settings.toml` unless `--config`
//! says otherwise) and are overridden by `EXPENSES_*` environment variables,
//! with `__` between nested keys (`EXPENSES_SERVER__PORT=8080`).
//!
//! See `settings.toml` for the configuration.
use std::collections::HashMap;

use clap::Parser;
use config::{Config, ConfigError, Environment, File};
use engine::{Currency, EngineError, StaticRates};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Parser)]
#[command(version, about = "Expense approval service")]
pub struct Cli {
    /// Settings file, without extension.
    #[arg(short, long, env = "EXPENSES_CONFIG", default_value = "settings")]
    pub config: String,
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("invalid rate table: {0}")]
    Rates(#[from] EngineError),
}

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            bind: None,
            port: default_port(),
        }
    }
}

fn default_port() -> u16 {
    3000
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    #[default]
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Pool {
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
}

impl Default for Pool {
    fn default() -> Self {
        Self {
            max_connections: default_max_connections(),
            acquire_timeout_secs: default_acquire_timeout_secs(),
        }
    }
}

fn default_max_connections() -> u32 {
    8
}

fn default_acquire_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    #[serde(default)]
    pub server: Server,
    #[serde(default)]
    pub database: Database,
    #[serde(default)]
    pub pool: Pool,
    /// Overrides of the default rate table, `CODE = "rate"` with
    /// `1 USD = rate × CODE`.
    #[serde(default)]
    pub rates: HashMap<String, Decimal>,
}

impl Settings {
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("EXPENSES")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Default rate table with the configured overrides applied.
    pub fn rate_table(&self) -> Result<StaticRates, SettingsError> {
        let mut rates = StaticRates::default();
        for (code, rate) in &self.rates {
            rates.set_rate(Currency::try_from(code.as_str())?, *rate)?;
        }
        Ok(rates)
    }

    pub fn bind_addr(&self) -> String {
        let bind = self.server.bind.as_deref().unwrap_or("127.0.0.1");
        format!("{}:{}", bind, self.server.port)
    }
}
