//! Configuration for the achievement hub
//!
//! CLI arguments and environment variable handling using clap.

use clap::{Parser, ValueEnum};
use std::time::Duration;

use crate::error::{HubError, Result};
use crate::model::ConsoleSource;

/// Achievement hub - aggregate and reconcile achievement catalogs
#[derive(Parser, Debug, Clone)]
#[command(name = "achievement-hub")]
#[command(about = "Aggregate achievement catalogs from several sources and reconcile them")]
pub struct Args {
    /// Catalog backend base URL
    #[arg(long, env = "API_URL", default_value = "http://localhost:8080/")]
    pub api_url: String,

    /// Comma-separated sources to aggregate
    /// e.g. "ra,steam,ps3,psvita,xbox360"
    #[arg(long, env = "SOURCES", default_value = "ra,steam,ps3,psvita,xbox360")]
    pub sources: String,

    /// Pause before each central tracker console request, in milliseconds
    #[arg(long, env = "PACING_DELAY_MS", default_value = "3000")]
    pub pacing_delay_ms: u64,

    /// Request timeout in milliseconds
    #[arg(long, env = "REQUEST_TIMEOUT_MS", default_value = "30000")]
    pub request_timeout_ms: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// What to run
    #[arg(long, env = "MODE", value_enum, default_value_t = RunMode::Full)]
    pub mode: RunMode,
}

/// Operation performed by one run of the binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RunMode {
    /// Consoles, every game, then reconciliation
    Full,
    /// Consoles and games already known to the backend
    Existing,
    /// Reconciliation only
    Compare,
}

impl Args {
    /// Parse the source list
    pub fn source_list(&self) -> std::result::Result<Vec<ConsoleSource>, String> {
        self.sources
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse::<ConsoleSource>)
            .collect()
    }

    /// Validate configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            return Err(format!("API_URL must be an http(s) URL, got {}", self.api_url));
        }

        if self.source_list()?.is_empty() {
            return Err("SOURCES must name at least one source".to_string());
        }

        if self.request_timeout_ms == 0 {
            return Err("REQUEST_TIMEOUT_MS must be greater than zero".to_string());
        }

        Ok(())
    }

    /// Validated runtime configuration
    pub fn into_config(&self) -> Result<HubConfig> {
        self.validate().map_err(HubError::Config)?;
        Ok(HubConfig {
            api_url: self.api_url.clone(),
            active_sources: self.source_list().map_err(HubError::Config)?,
            pacing_delay: Duration::from_millis(self.pacing_delay_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
        })
    }
}

/// Runtime configuration of an aggregator.
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Catalog backend base URL
    pub api_url: String,
    /// Sources triggered operations run against
    pub active_sources: Vec<ConsoleSource>,
    /// Central tracker pacing; zero disables it
    pub pacing_delay: Duration,
    pub request_timeout: Duration,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8080/".to_string(),
            active_sources: ConsoleSource::ALL.to_vec(),
            pacing_delay: Duration::from_secs(3),
            request_timeout: Duration::from_secs(30),
        }
    }
}
