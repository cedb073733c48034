#![allow(dead_code)]

use mineos_relay::{
    downstream::{DelegateRequest, RelayRequest},
    Algorithm, DelegateStrategy, DownstreamFactory, Endpoint, Job, JobResult, RelayConnection,
    RelayHint, Result, RouterError, RouterListener, SubmitResult,
};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};

pub const DELEGATE_SEQ: i64 = 10;
pub const RELAY_SEQ: i64 = 20;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    DelegateBuilt { id: usize, credential: String, endpoints: usize },
    DelegateConnect(usize),
    DelegateStop(usize),
    DelegateTick(usize, u64),
    DelegateSubmit(usize),
    RelayRequested { credential: String, hint: Option<RelayHint> },
    RelayConnect(usize),
    RelayStop(usize),
    RelayTick(usize, u64),
    RelaySubmit(usize),
    Active(String),
    Pause,
    Job(String),
    Result(i64),
}

#[derive(Debug, Clone, Default)]
pub struct Log(Arc<Mutex<Vec<Call>>>);

impl Log {
    pub fn push(&self, call: Call) {
        self.0.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.0.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    /// Credentials of every delegate built so far, in order
    pub fn delegate_credentials(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::DelegateBuilt { credential, .. } => Some(credential),
                _ => None,
            })
            .collect()
    }
}

struct MockDelegate {
    id: usize,
    log: Log,
}

impl DelegateStrategy for MockDelegate {
    fn connect(&mut self) {
        self.log.push(Call::DelegateConnect(self.id));
    }

    fn stop(&mut self) {
        self.log.push(Call::DelegateStop(self.id));
    }

    fn tick(&mut self, now: u64) {
        self.log.push(Call::DelegateTick(self.id, now));
    }

    fn submit(&mut self, _result: &JobResult) -> i64 {
        self.log.push(Call::DelegateSubmit(self.id));
        DELEGATE_SEQ
    }
}

struct MockRelay {
    id: usize,
    tls: bool,
    log: Log,
}

impl RelayConnection for MockRelay {
    fn connect(&mut self) {
        self.log.push(Call::RelayConnect(self.id));
    }

    fn stop(&mut self) {
        self.log.push(Call::RelayStop(self.id));
    }

    fn tick(&mut self, now: u64) {
        self.log.push(Call::RelayTick(self.id, now));
    }

    fn submit(&mut self, _result: &JobResult) -> i64 {
        self.log.push(Call::RelaySubmit(self.id));
        RELAY_SEQ
    }

    fn is_tls(&self) -> bool {
        self.tls
    }
}

/// Factory whose relay availability can be flipped from the test
pub struct MockFactory {
    log: Log,
    relay_available: Arc<AtomicBool>,
    fail_delegate: Arc<AtomicBool>,
    relay_tls: bool,
    next_id: usize,
}

impl MockFactory {
    pub fn new(log: Log) -> Self {
        Self {
            log,
            relay_available: Arc::new(AtomicBool::new(false)),
            fail_delegate: Arc::new(AtomicBool::new(false)),
            relay_tls: false,
            next_id: 0,
        }
    }

    pub fn relay_switch(&self) -> Arc<AtomicBool> {
        self.relay_available.clone()
    }

    pub fn delegate_failure_switch(&self) -> Arc<AtomicBool> {
        self.fail_delegate.clone()
    }

    pub fn with_relay_tls(mut self) -> Self {
        self.relay_tls = true;
        self
    }

    fn id(&mut self) -> usize {
        self.next_id += 1;
        self.next_id
    }
}

impl DownstreamFactory for MockFactory {
    fn create_relay(&mut self, request: RelayRequest<'_>) -> Option<Box<dyn RelayConnection>> {
        self.log.push(Call::RelayRequested {
            credential: request.endpoint.credential().to_string(),
            hint: request.hint.cloned(),
        });

        if !self.relay_available.load(Ordering::SeqCst) {
            return None;
        }

        let id = self.id();
        Some(Box::new(MockRelay {
            id,
            tls: self.relay_tls,
            log: self.log.clone(),
        }))
    }

    fn create_delegate(
        &mut self,
        request: DelegateRequest<'_>,
    ) -> Result<Box<dyn DelegateStrategy>> {
        if self.fail_delegate.load(Ordering::SeqCst) {
            return Err(RouterError::NoDownstream);
        }

        let id = self.id();
        self.log.push(Call::DelegateBuilt {
            id,
            credential: request.endpoints[0].credential().to_string(),
            endpoints: request.endpoints.len(),
        });

        Ok(Box::new(MockDelegate {
            id,
            log: self.log.clone(),
        }))
    }
}

pub struct MockListener {
    log: Log,
}

impl MockListener {
    pub fn new(log: Log) -> Self {
        Self { log }
    }
}

impl RouterListener for MockListener {
    fn on_active(&mut self, endpoint: &Endpoint) {
        self.log.push(Call::Active(endpoint.credential().to_string()));
    }

    fn on_pause(&mut self) {
        self.log.push(Call::Pause);
    }

    fn on_job(&mut self, _endpoint: &Endpoint, job: &Job) {
        self.log.push(Call::Job(job.id.clone()));
    }

    fn on_result(&mut self, _endpoint: &Endpoint, result: &SubmitResult, _error: Option<&str>) {
        self.log.push(Call::Result(result.seq));
    }

    fn on_verify_algorithm(&mut self, _endpoint: &Endpoint, algorithm: &Algorithm) -> bool {
        algorithm.name() != "cn/0"
    }
}

pub fn result(job_id: &str) -> JobResult {
    JobResult {
        job_id: job_id.to_string(),
        nonce: "deadbeef".to_string(),
        result: "00ff".to_string(),
        algorithm: Some(Algorithm::new("rx/0")),
    }
}
