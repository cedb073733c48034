//! Collaborators the router drives but does not implement.
//!
//! Sessions, transports and failover live behind these traits. The router only
//! decides which one carries traffic and when it is released.

use crate::{
    endpoint::{Endpoint, RelayHint},
    error::Result,
    job::{Algorithm, Job, JobResult, SubmitResult},
};
use std::time::Duration;
use tracing::debug;

/// Single direct session to one endpoint
pub trait RelayConnection: Send {
    fn connect(&mut self);

    /// Request a stop; in-flight I/O is not aborted
    fn stop(&mut self);

    fn tick(&mut self, now: u64);

    /// Returns the request sequence id
    fn submit(&mut self, result: &JobResult) -> i64;

    /// Whether the session negotiated TLS
    fn is_tls(&self) -> bool;
}

/// Failover-capable session manager over a list of endpoints
pub trait DelegateStrategy: Send {
    fn connect(&mut self);

    fn stop(&mut self);

    fn tick(&mut self, now: u64);

    /// Returns the request sequence id
    fn submit(&mut self, result: &JobResult) -> i64;
}

/// Inputs for building a relay session
#[derive(Debug, Clone, Copy)]
pub struct RelayRequest<'a> {
    /// Destination the relay forwards to, carrying this cycle's credential
    pub endpoint: &'a Endpoint,
    /// Routing hint captured from the session that announced the last job
    pub hint: Option<&'a RelayHint>,
    pub algorithm: Option<&'a Algorithm>,
}

/// Inputs for building a delegate strategy
#[derive(Debug, Clone, Copy)]
pub struct DelegateRequest<'a> {
    pub endpoints: &'a [Endpoint],
    pub retries: u32,
    pub retry_pause: Duration,
}

/// Builds the downstreams on the router's behalf
pub trait DownstreamFactory: Send {
    /// `None` when no relay path exists right now
    fn create_relay(&mut self, request: RelayRequest<'_>) -> Option<Box<dyn RelayConnection>>;

    fn create_delegate(
        &mut self,
        request: DelegateRequest<'_>,
    ) -> Result<Box<dyn DelegateStrategy>>;
}

/// Owner of the router, notified about session level changes
pub trait RouterListener: Send {
    fn on_active(&mut self, endpoint: &Endpoint);

    fn on_pause(&mut self);

    fn on_job(&mut self, _endpoint: &Endpoint, _job: &Job) {}

    fn on_result(&mut self, _endpoint: &Endpoint, _result: &SubmitResult, _error: Option<&str>) {}

    fn on_verify_algorithm(&mut self, _endpoint: &Endpoint, _algorithm: &Algorithm) -> bool {
        true
    }
}

/// Which downstream currently carries submissions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Relay,
    Delegate,
    Unavailable,
}

/// An owned downstream handle
pub enum Downstream {
    Relay(Box<dyn RelayConnection>),
    Delegate(Box<dyn DelegateStrategy>),
}

impl Downstream {
    fn stop(&mut self) {
        match self {
            Downstream::Relay(relay) => relay.stop(),
            Downstream::Delegate(strategy) => strategy.stop(),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Downstream::Relay(_) => "relay",
            Downstream::Delegate(_) => "delegate",
        }
    }
}

/// Handles released while they may still be on the call stack.
///
/// Nothing is stopped or dropped until `drain` runs at the next safe point.
#[derive(Default)]
pub struct Disposal {
    pending: Vec<Downstream>,
}

impl Disposal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn defer(&mut self, downstream: Downstream) {
        debug!("Deferring release of {}", downstream.kind());
        self.pending.push(downstream);
    }

    /// Stop and drop everything queued, returns how many were released
    pub fn drain(&mut self) -> usize {
        let released = self.pending.len();

        for mut downstream in self.pending.drain(..) {
            debug!("Releasing {}", downstream.kind());
            downstream.stop();
        }

        released
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
