//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Ledger-wide defaults.
    #[serde(default)]
    pub ledger: LedgerConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Defaults that parameterize the ledger and reconciliation engine.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// ISO currency code used when no other functional currency applies.
    #[serde(default = "default_functional_currency")]
    pub functional_currency: String,
    /// Absolute tolerance for the model-mode fixed-point iteration (spec
    /// section 4.5.2): the loop stops once every driver changes by less
    /// than this between passes.
    #[serde(default = "default_convergence_tolerance")]
    pub convergence_tolerance: Decimal,
    /// Maximum number of passes the model-mode loop takes before it is
    /// reported as diverged instead of converged.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
}

fn default_functional_currency() -> String {
    "USD".to_string()
}

fn default_convergence_tolerance() -> Decimal {
    Decimal::new(1, 2) // 0.01
}

fn default_max_iterations() -> u32 {
    50
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            functional_currency: default_functional_currency(),
            convergence_tolerance: default_convergence_tolerance(),
            max_iterations: default_max_iterations(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("LEDGERCORE").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
