use serde::{Deserialize, Serialize};
use std::fmt;

/// How the remote side expects to be spoken to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EndpointMode {
    /// Regular stratum pool
    #[default]
    Pool,

    /// Solo mining against a daemon
    Daemon,

    /// Pool with self-selected block templates
    SelfSelect,
}

/// Upstream relay address carried by an endpoint, such as a proxy in front of the pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayHint {
    pub host: String,
    pub port: u16,
}

impl RelayHint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self { host: host.into(), port }
    }

    pub fn is_valid(&self) -> bool {
        !self.host.is_empty() && self.port > 0
    }
}

/// One routable destination. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    host: String,
    port: u16,
    credential: String,
    password: Option<String>,
    tls: bool,
    mode: EndpointMode,
    relay: Option<RelayHint>,
}

impl Endpoint {
    /// Create a new endpoint descriptor
    pub fn new(
        host: impl Into<String>,
        port: u16,
        credential: impl Into<String>,
        tls: bool,
        mode: EndpointMode,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            credential: credential.into(),
            password: None,
            tls,
            mode,
            relay: None,
        }
    }

    /// Same endpoint with a password attached
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Same endpoint reached through an upstream relay
    pub fn with_relay(mut self, relay: RelayHint) -> Self {
        self.relay = Some(relay);
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn credential(&self) -> &str {
        &self.credential
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    pub fn is_tls(&self) -> bool {
        self.tls
    }

    pub fn mode(&self) -> EndpointMode {
        self.mode
    }

    pub fn relay(&self) -> Option<&RelayHint> {
        self.relay.as_ref()
    }

    /// Plain `host:port` form
    pub fn url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scheme = if self.tls { "stratum+ssl" } else { "stratum+tcp" };
        write!(f, "{}://{}", scheme, self.url())
    }
}
