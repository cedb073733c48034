use serde::{Deserialize, Serialize};
use std::fmt;

/// Mining algorithm name, e.g. `rx/0` or `kawpow`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Algorithm(String);

impl Algorithm {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Algorithm {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Work unit as announced by the active session
#[derive(Debug, Clone, Default)]
pub struct Job {
    pub id: String,
    pub algorithm: Option<Algorithm>,
    pub diff: u64,
    pub height: u64,
    pub seed: Vec<u8>,
}

/// Latest algorithm/difficulty/height/seed seen for the active work unit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobContext {
    pub algorithm: Option<Algorithm>,
    pub diff: u64,
    pub height: u64,
    pub seed: Vec<u8>,
}

impl JobContext {
    /// Overwrite every field from `job`
    pub fn update(&mut self, job: &Job) {
        self.algorithm = job.algorithm.clone();
        self.diff = job.diff;
        self.height = job.height;
        self.seed = job.seed.clone();
    }

    /// Lowercase hex of the seed, `None` when no seed is known
    pub fn seed_hash(&self) -> Option<String> {
        if self.seed.is_empty() {
            None
        } else {
            Some(hex::encode(&self.seed))
        }
    }
}

/// Found solution to be submitted downstream
#[derive(Debug, Clone)]
pub struct JobResult {
    pub job_id: String,
    pub nonce: String,
    pub result: String,
    pub algorithm: Option<Algorithm>,
}

/// Outcome of a submission as reported by the downstream
#[derive(Debug, Clone)]
pub struct SubmitResult {
    pub seq: i64,
    pub diff: u64,
    pub elapsed_ms: u64,
    pub accepted: bool,
}
