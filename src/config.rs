//! Environment-based Configuration for the Swap Bridge
//!
//! # Environment Variables
//!
//! ## Chain Endpoints
//! - `SWAPBRIDGE_HOME_URL` - home ledger RPC endpoint (unset: home client not registered)
//! - `SWAPBRIDGE_FOREIGN_URL` - foreign chain REST endpoint (unset: foreign client not registered)
//!
//! ## Settlement Parameters
//! - `SWAPBRIDGE_HOME_ASSET` - denomination tag for home payouts (default: "BRIDGE")
//! - `SWAPBRIDGE_WITHDRAWAL_FEE` - withdrawal fee in whole coins, deducted
//!   per output on foreign payouts (default: 0.0)
//! - `SWAPBRIDGE_POLL_INTERVAL_SECS` - settlement loop interval (default: 60)
//!
//! ## Service Settings
//! - `SWAPBRIDGE_DB_PATH` - SQLite database path (default: data/swapbridge.db)
//! - `SWAPBRIDGE_API_PORT` - REST API port (default: 3030)
//! - `SWAPBRIDGE_HTTP_TIMEOUT_SECS` - timeout for every external chain call (default: 30)
//! - `SWAPBRIDGE_LOG_LEVEL` - logging level (debug, info, warn, error; default: info)
//! - `SWAPBRIDGE_LOG_JSON` - set to "1" for JSON log output

use std::env;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Main configuration struct
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Home ledger RPC endpoint, if configured
    pub home_url: Option<String>,

    /// Foreign chain REST endpoint, if configured
    pub foreign_url: Option<String>,

    /// SQLite database path
    pub db_path: String,

    /// Denomination tag attached to home payouts
    pub home_asset: String,

    /// Withdrawal fee in whole coins for foreign payouts
    pub withdrawal_fee_coins: f64,

    /// Settlement loop interval in seconds
    pub poll_interval_secs: u64,

    /// REST API port
    pub api_port: u16,

    /// Timeout for external chain calls in seconds
    pub http_timeout_secs: u64,

    /// Log level
    pub log_level: String,

    /// JSON log output
    pub log_json: bool,
}

impl BridgeConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            home_url: env::var("SWAPBRIDGE_HOME_URL").ok(),
            foreign_url: env::var("SWAPBRIDGE_FOREIGN_URL").ok(),
            db_path: env::var("SWAPBRIDGE_DB_PATH")
                .unwrap_or_else(|_| "data/swapbridge.db".to_string()),
            home_asset: env::var("SWAPBRIDGE_HOME_ASSET")
                .unwrap_or_else(|_| "BRIDGE".to_string()),
            withdrawal_fee_coins: parse_var("SWAPBRIDGE_WITHDRAWAL_FEE", 0.0)?,
            poll_interval_secs: parse_var("SWAPBRIDGE_POLL_INTERVAL_SECS", 60)?,
            api_port: parse_var("SWAPBRIDGE_API_PORT", 3030)?,
            http_timeout_secs: parse_var("SWAPBRIDGE_HTTP_TIMEOUT_SECS", 30)?,
            log_level: env::var("SWAPBRIDGE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            log_json: env::var("SWAPBRIDGE_LOG_JSON").map(|v| v == "1").unwrap_or(false),
        })
    }

    /// Print configuration summary (hiding nothing: no secrets live here)
    pub fn print_summary(&self) {
        println!("=== Swap Bridge Configuration ===");
        println!("Home URL: {}", self.home_url.as_deref().unwrap_or("(not configured)"));
        println!(
            "Foreign URL: {}",
            self.foreign_url.as_deref().unwrap_or("(not configured)")
        );
        println!("Database: {}", self.db_path);
        println!("Home Asset Tag: {}", self.home_asset);
        println!("Withdrawal Fee: {} coins", self.withdrawal_fee_coins);
        println!("Poll Interval: {} seconds", self.poll_interval_secs);
        println!("API Port: {}", self.api_port);
        println!("HTTP Timeout: {} seconds", self.http_timeout_secs);
        println!("Log Level: {}", self.log_level);
        println!("=================================");
    }
}

/// Parse an optional env var, falling back to a default when unset
fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidValue(name.to_string(), value)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_var_default_when_unset() {
        let value: u64 = parse_var("SWAPBRIDGE_TEST_UNSET_VAR", 42).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_parse_var_rejects_garbage() {
        env::set_var("SWAPBRIDGE_TEST_GARBAGE_VAR", "not-a-number");
        let result: Result<u64, _> = parse_var("SWAPBRIDGE_TEST_GARBAGE_VAR", 0);
        assert!(matches!(result, Err(ConfigError::InvalidValue(_, _))));
        env::remove_var("SWAPBRIDGE_TEST_GARBAGE_VAR");
    }
}
