//! Runtime configuration read from the environment (and `.env` via dotenvy)

use std::env;
use std::time::Duration;

const ENV_DATABASE_URL: &str = "DATABASE_URL";
const ENV_BIND_ADDR: &str = "BIND_ADDR";
const ENV_REFERENCE_PRICES_URL: &str = "REFERENCE_PRICES_URL";
const ENV_REFERENCE_PRICES_TIMEOUT: &str = "REFERENCE_PRICES_TIMEOUT_SECS";
const ENV_SWEEP_INTERVAL: &str = "SCHEDULED_SWEEP_INTERVAL_SECS";
const ENV_SWEEP_INITIAL_DELAY: &str = "SCHEDULED_SWEEP_INITIAL_DELAY_SECS";
const ENV_SWEEP_ENABLED: &str = "SCHEDULED_SWEEP_ENABLED";
const ENV_CORS_ALLOW_ANY: &str = "CORS_ALLOW_ANY";

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_REFERENCE_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 300; // 5 minutes
pub const DEFAULT_SWEEP_INITIAL_DELAY_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct SweepConfig {
    pub enabled: bool,
    pub interval: Duration,
    /// Delay before the first sweep so stores can finish initializing
    pub initial_delay: Duration,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
            initial_delay: Duration::from_secs(DEFAULT_SWEEP_INITIAL_DELAY_SECS),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Unset selects the in-memory store
    pub database_url: Option<String>,
    pub bind_addr: String,
    /// Unset disables catalog refresh
    pub reference_prices_url: Option<String>,
    pub reference_timeout: Duration,
    pub sweep: SweepConfig,
    pub cors_allow_any: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let secs = |key: &str, default: u64| {
            get(key)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(default)
        };
        let flag = |key: &str, default: bool| {
            get(key)
                .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
                .unwrap_or(default)
        };

        Self {
            database_url: get(ENV_DATABASE_URL),
            bind_addr: get(ENV_BIND_ADDR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            reference_prices_url: get(ENV_REFERENCE_PRICES_URL),
            reference_timeout: Duration::from_secs(secs(
                ENV_REFERENCE_PRICES_TIMEOUT,
                DEFAULT_REFERENCE_TIMEOUT_SECS,
            )),
            sweep: SweepConfig {
                enabled: flag(ENV_SWEEP_ENABLED, true),
                // A zero period would spin; fall back to the default
                interval: Duration::from_secs(match secs(ENV_SWEEP_INTERVAL, DEFAULT_SWEEP_INTERVAL_SECS) {
                    0 => DEFAULT_SWEEP_INTERVAL_SECS,
                    n => n,
                }),
                initial_delay: Duration::from_secs(secs(
                    ENV_SWEEP_INITIAL_DELAY,
                    DEFAULT_SWEEP_INITIAL_DELAY_SECS,
                )),
            },
            cors_allow_any: flag(ENV_CORS_ALLOW_ANY, true),
        }
    }
}
