//! Configuration module
//!
//! Env-var driven configuration for the API binary and services: server,
//! status store, remote file store, validator strategy, render endpoint,
//! retention, and retry tuning.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::retry::RetryPolicy;

// Common defaults
const SERVER_PORT: u16 = 8080;
const RETENTION_DAYS: i64 = 30;
const SWEEP_INTERVAL_SECS: u64 = 3600;
const RETRY_BASE_DELAY_MS: u64 = 500;
const RETRY_DELAY_INCREMENT_MS: u64 = 500;
const RETRY_MAX_DELAY_MS: u64 = 5_000;
const RETRY_TIMEOUT_MS: u64 = 60_000;

/// Which backend holds request statuses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            _ => bail!("Invalid store backend: {} (expected postgres|memory)", s),
        }
    }
}

/// Which validation strategy the orchestrator dispatches to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValidatorMode {
    /// Inline dummy validator, for local/simple deployments.
    Dummy,
    /// External validator that reports back through the result callback.
    External,
}

impl FromStr for ValidatorMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "dummy" => Ok(ValidatorMode::Dummy),
            "external" => Ok(ValidatorMode::External),
            _ => bail!("Invalid validator mode: {} (expected dummy|external)", s),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub store_backend: StoreBackend,
    /// Required when `store_backend` is `Postgres`.
    pub database_url: Option<String>,
    pub file_store_url: String,
    pub file_store_api_key: Option<String>,
    pub validator_mode: ValidatorMode,
    /// Base URL of the external validator. Required in `External` mode,
    /// checked at client construction.
    pub validator_url: Option<String>,
    /// Public base URL the external validator calls back to.
    pub callback_base_url: Option<String>,
    /// Render endpoint that converts accounts documents to PDF. Optional;
    /// rendering fails with a configuration fault when unset.
    pub render_service_url: Option<String>,
    pub retention_days: i64,
    pub sweep_interval_secs: u64,
    pub retry: RetryPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let store_backend = parse_var("STORE_BACKEND", StoreBackend::Memory)?;
        let database_url = env::var("DATABASE_URL").ok();
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            bail!("DATABASE_URL is required when STORE_BACKEND=postgres");
        }

        Ok(Self {
            server_port: parse_var("SERVER_PORT", SERVER_PORT)?,
            store_backend,
            database_url,
            file_store_url: env::var("FILE_STORE_URL")
                .context("FILE_STORE_URL is required (remote file store base URL)")?,
            file_store_api_key: env::var("FILE_STORE_API_KEY").ok(),
            validator_mode: parse_var("VALIDATOR_MODE", ValidatorMode::Dummy)?,
            validator_url: env::var("VALIDATOR_URL").ok(),
            callback_base_url: env::var("CALLBACK_BASE_URL").ok(),
            render_service_url: env::var("RENDER_SERVICE_URL").ok(),
            retention_days: parse_var("RETENTION_DAYS", RETENTION_DAYS)?,
            sweep_interval_secs: parse_var("SWEEP_INTERVAL_SECS", SWEEP_INTERVAL_SECS)?,
            retry: RetryPolicy {
                base_delay: duration_var("RETRY_BASE_DELAY_MS", RETRY_BASE_DELAY_MS)?,
                delay_increment: duration_var(
                    "RETRY_DELAY_INCREMENT_MS",
                    RETRY_DELAY_INCREMENT_MS,
                )?,
                max_delay: duration_var("RETRY_MAX_DELAY_MS", RETRY_MAX_DELAY_MS)?,
                timeout: duration_var("RETRY_TIMEOUT_MS", RETRY_TIMEOUT_MS)?,
            },
        })
    }
}

/// Parse an env var, falling back to `default` when unset.
fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid {}: {}", name, e)),
        Err(_) => Ok(default),
    }
}

fn duration_var(name: &str, default_ms: u64) -> Result<Duration> {
    Ok(Duration::from_millis(parse_var(name, default_ms)?))
}
