use crate::{
    endpoint::{Endpoint, EndpointMode},
    error::{Result, RouterError},
};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};

/// Whether a direct relay session may be used instead of the delegate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RelayMode {
    /// Always go through the delegate strategy
    Never,

    /// Use a relay when one can be built, fall back to the delegate after repeated failures
    #[default]
    Auto,

    /// Use a relay when one can be built and keep it across failures
    Always,
}

/// Routing controller configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Destination host
    pub host: String,

    /// Plain-text port
    pub port: u16,

    /// TLS port, only used when built with the `tls` feature
    #[serde(default)]
    pub tls_port: Option<u16>,

    /// Credential used on even reconnect cycles
    pub primary_credential: String,

    /// Credential used on odd reconnect cycles
    pub secondary_credential: String,

    /// Optional password sent with the credential
    #[serde(default)]
    pub password: Option<String>,

    /// Endpoint mode
    #[serde(default)]
    pub mode: EndpointMode,

    /// Relay policy
    #[serde(default)]
    pub relay_mode: RelayMode,

    /// Relay close count that triggers fallback to the delegate
    #[serde(default = "default_close_threshold")]
    pub close_threshold: u32,

    /// Retries handed to the delegate strategy
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Pause between delegate retries (milliseconds)
    #[serde(default = "default_retry_pause_ms")]
    pub retry_pause_ms: u64,

    /// Fraction of a rotation cycle nominally given to the primary credential
    #[serde(default = "default_primary_share")]
    pub primary_share: f64,

    /// Length of one nominal rotation cycle (milliseconds)
    #[serde(default = "default_cycle_ms")]
    pub cycle_ms: u64,

    /// Driver tick interval (milliseconds)
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

impl RouterConfig {
    /// Minimal configuration with defaults for everything optional
    pub fn new(
        host: impl Into<String>,
        port: u16,
        primary_credential: impl Into<String>,
        secondary_credential: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            tls_port: None,
            primary_credential: primary_credential.into(),
            secondary_credential: secondary_credential.into(),
            password: None,
            mode: EndpointMode::default(),
            relay_mode: RelayMode::default(),
            close_threshold: default_close_threshold(),
            retries: default_retries(),
            retry_pause_ms: default_retry_pause_ms(),
            primary_share: default_primary_share(),
            cycle_ms: default_cycle_ms(),
            tick_interval_ms: default_tick_interval_ms(),
        }
    }

    /// Parse from a TOML document and validate
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read router config {}", path.display()))?;
        let config = Self::from_toml_str(&content)
            .with_context(|| format!("Invalid router config {}", path.display()))?;
        Ok(config)
    }

    /// Reject configurations the router cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(RouterError::InvalidConfiguration("host is empty".to_string()));
        }
        if self.port == 0 {
            return Err(RouterError::InvalidConfiguration("port is zero".to_string()));
        }
        if self.tls_port == Some(0) {
            return Err(RouterError::InvalidConfiguration("tls_port is zero".to_string()));
        }
        if self.primary_credential.is_empty() || self.secondary_credential.is_empty() {
            return Err(RouterError::InvalidConfiguration(
                "credentials must not be empty".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.primary_share) {
            return Err(RouterError::InvalidConfiguration(format!(
                "primary_share {} outside [0, 1]",
                self.primary_share
            )));
        }
        if self.close_threshold == 0 {
            return Err(RouterError::InvalidConfiguration("close_threshold is zero".to_string()));
        }
        Ok(())
    }

    /// Plain endpoint for `credential`
    pub fn endpoint(&self, credential: &str) -> Endpoint {
        self.finish(Endpoint::new(&self.host, self.port, credential, false, self.mode))
    }

    /// TLS endpoint for `credential`, if compiled in and configured
    pub fn tls_endpoint(&self, credential: &str) -> Option<Endpoint> {
        if !cfg!(feature = "tls") {
            return None;
        }
        let port = self.tls_port?;
        Some(self.finish(Endpoint::new(&self.host, port, credential, true, self.mode)))
    }

    pub fn retry_pause(&self) -> Duration {
        Duration::from_millis(self.retry_pause_ms)
    }

    pub fn cycle(&self) -> Duration {
        Duration::from_millis(self.cycle_ms)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    fn finish(&self, endpoint: Endpoint) -> Endpoint {
        match &self.password {
            Some(password) => endpoint.with_password(password),
            None => endpoint,
        }
    }
}

// Default value functions for serde
fn default_close_threshold() -> u32 { 2 }
fn default_retries() -> u32 { 10 }
fn default_retry_pause_ms() -> u64 { 2000 }
fn default_primary_share() -> f64 { 0.95 }
fn default_cycle_ms() -> u64 { 60 * 60 * 1000 }
fn default_tick_interval_ms() -> u64 { 1000 }
