//! Login negotiation payload.
//!
//! Renders the job context and the local algorithm preference into the
//! fields merged into a session's login params:
//!
//! ```text
//! url:       direct sessions only, "stratum+ssl://host:port" over TLS, else "host:port"
//! algo:      algorithm names, pinned algorithm first
//! diff:      integer
//! height:    integer
//! seed_hash: lowercase hex, omitted when the seed is empty
//! ```

use crate::{
    endpoint::Endpoint,
    job::{Algorithm, JobContext},
};
use serde::Serialize;
use serde_json::{Map, Value};

/// Login params contributed by the router
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub algo: Vec<String>,
    pub diff: u64,
    pub height: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed_hash: Option<String>,
}

impl LoginParams {
    pub fn with_url(mut self, url: String) -> Self {
        self.url = Some(url);
        self
    }

    /// Merge into an existing params object, overwriting same-named keys
    pub fn write_into(&self, params: &mut Map<String, Value>) {
        if let Ok(Value::Object(fields)) = serde_json::to_value(self) {
            params.extend(fields);
        }
    }
}

/// Copy of `algorithms` with `pinned` swapped into the first slot.
/// Unchanged when `pinned` is absent, unknown or already first.
pub fn prioritize(algorithms: &[Algorithm], pinned: Option<&Algorithm>) -> Vec<Algorithm> {
    let mut ordered = algorithms.to_vec();

    if let Some(index) = pinned.and_then(|algo| ordered.iter().position(|a| a == algo)) {
        if index > 0 {
            ordered.swap(0, index);
        }
    }

    ordered
}

/// Payload without the url field
pub fn build_params(algorithms: &[Algorithm], context: &JobContext) -> LoginParams {
    let algo = prioritize(algorithms, context.algorithm.as_ref())
        .iter()
        .map(|a| a.name().to_string())
        .collect();

    LoginParams {
        url: None,
        algo,
        diff: context.diff,
        height: context.height,
        seed_hash: context.seed_hash(),
    }
}

/// Url advertised by a direct session
pub fn login_url(endpoint: &Endpoint, tls: bool) -> String {
    if cfg!(feature = "tls") && tls {
        format!("stratum+ssl://{}", endpoint.url())
    } else {
        endpoint.url()
    }
}
