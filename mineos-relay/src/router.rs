use crate::{
    config::{RelayMode, RouterConfig},
    downstream::{
        DelegateRequest, DelegateStrategy, Disposal, Downstream, DownstreamFactory,
        RelayConnection, RelayRequest, Route, RouterListener,
    },
    endpoint::{Endpoint, RelayHint},
    error::Result,
    job::{Algorithm, Job, JobContext, JobResult, SubmitResult},
    negotiation::{build_params, login_url},
    rotation::RotationPolicy,
    timer::Timer,
};
use rand::Rng;
use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};

/// Returned by `submit` when nothing can take the result
pub const SUBMIT_UNROUTED: i64 = -1;

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    New,
    Idle,
    Active,
    Waiting,
}

/// Routes submissions and login negotiation to either a direct relay session
/// or a failover delegate, rotating the credential on every reconnect.
///
/// The router is single threaded: the host must deliver `tick`, `on_timer`
/// and every downstream callback one at a time.
pub struct Router {
    config: RouterConfig,
    factory: Box<dyn DownstreamFactory>,
    listener: Box<dyn RouterListener>,
    algorithms: Vec<Algorithm>,
    timer: Timer,
    strategy: Option<Box<dyn DelegateStrategy>>,
    relay: Option<Box<dyn RelayConnection>>,
    disposal: Disposal,
    endpoints: Vec<Endpoint>,
    rotation: RotationPolicy,
    relay_hint: Option<RelayHint>,
    tls: bool,
    now: u64,
    deadline: u64,
    state: State,
    context: JobContext,
}

impl Router {
    /// Create a router and its initial delegate strategy.
    ///
    /// Only an invalid configuration is an error; a delegate that cannot be
    /// built yet is retried by the next `connect()`.
    ///
    /// `algorithms` is the local preference order used for login negotiation.
    pub fn new(
        config: RouterConfig,
        algorithms: Vec<Algorithm>,
        mut factory: Box<dyn DownstreamFactory>,
        listener: Box<dyn RouterListener>,
    ) -> Result<Self> {
        config.validate()?;

        let rotation = RotationPolicy::new(
            &config.primary_credential,
            &config.secondary_credential,
            config.primary_share,
            config.cycle(),
        );

        let mut endpoints = Vec::with_capacity(2);
        if let Some(endpoint) = config.tls_endpoint(rotation.current()) {
            endpoints.push(endpoint);
        }
        endpoints.push(config.endpoint(rotation.current()));

        let strategy = match factory.create_delegate(DelegateRequest {
            endpoints: &endpoints,
            retries: config.retries,
            retry_pause: config.retry_pause(),
        }) {
            Ok(strategy) => Some(strategy),
            Err(e) => {
                error!("Failed to build delegate strategy, retrying on connect: {}", e);
                None
            }
        };

        let (primary_window, secondary_window) = rotation.windows();
        debug!(
            "Rotation windows: primary {:?}, secondary {:?}",
            primary_window, secondary_window
        );

        let mut router = Self {
            config,
            factory,
            listener,
            algorithms,
            timer: Timer::new(),
            strategy,
            relay: None,
            disposal: Disposal::new(),
            endpoints,
            rotation,
            relay_hint: None,
            tls: false,
            now: 0,
            deadline: 0,
            state: State::New,
            context: JobContext::default(),
        };

        router.set_state(State::Idle);
        Ok(router)
    }

    /// Start a reconnect cycle with the current credential, then rotate
    pub fn connect(&mut self) {
        self.disposal.drain();

        let slot = self.rotation.slot();
        let endpoint = self.config.endpoint(self.rotation.current());
        debug!("Reconnect cycle on {:?} credential via {}", slot, endpoint);
        self.endpoints = vec![endpoint];

        if let Some(relay) = self.relay.take() {
            self.disposal.defer(Downstream::Relay(relay));
        }

        let relay = if self.config.relay_mode == RelayMode::Never {
            None
        } else {
            self.factory.create_relay(RelayRequest {
                endpoint: &self.endpoints[0],
                hint: self.relay_hint.as_ref(),
                algorithm: self.context.algorithm.as_ref(),
            })
        };

        match relay {
            Some(mut relay) => {
                info!("Routing through relay to {}", self.endpoints[0]);
                self.tls = relay.is_tls();
                relay.connect();
                self.relay = Some(relay);
            }
            None => {
                self.tls = false;
                let built = self.factory.create_delegate(DelegateRequest {
                    endpoints: &self.endpoints,
                    retries: self.config.retries,
                    retry_pause: self.config.retry_pause(),
                });

                match built {
                    Ok(mut strategy) => {
                        info!("Routing through delegate to {}", self.endpoints[0]);
                        strategy.connect();
                        if let Some(previous) = self.strategy.replace(strategy) {
                            self.disposal.defer(Downstream::Delegate(previous));
                        }
                    }
                    Err(e) => {
                        error!("Failed to rebuild delegate strategy: {}", e);
                        if let Some(strategy) = self.strategy.as_mut() {
                            strategy.connect();
                        }
                    }
                }
            }
        }

        self.rotation.flip();
    }

    /// Stop the timer, then whatever downstream is running. Safe to repeat.
    pub fn stop(&mut self) {
        self.timer.stop();

        if let Some(relay) = self.relay.as_mut() {
            relay.stop();
        }
        if let Some(strategy) = self.strategy.as_mut() {
            strategy.stop();
        }
    }

    /// Periodic tick from the host, `now` in milliseconds
    pub fn tick(&mut self, now: u64) {
        self.now = now;
        self.disposal.drain();

        // The delegate keeps its own idle bookkeeping even while a relay is active.
        if let Some(strategy) = self.strategy.as_mut() {
            strategy.tick(now);
        }
        if let Some(relay) = self.relay.as_mut() {
            relay.tick(now);
        }

        if self.state == State::Waiting && now > self.deadline {
            info!("Pause over, back to idle");
            self.set_state(State::Idle);
        }
    }

    /// Record the job announced by `endpoint` for the next negotiation
    pub fn update(&mut self, endpoint: &Endpoint, job: &Job) {
        self.context.update(job);
        self.relay_hint = endpoint.relay().filter(|hint| hint.is_valid()).cloned();
    }

    /// Hand a result to exactly one downstream, relay first
    pub fn submit(&mut self, result: &JobResult) -> i64 {
        if let Some(relay) = self.relay.as_mut() {
            return relay.submit(result);
        }
        if let Some(strategy) = self.strategy.as_mut() {
            return strategy.submit(result);
        }

        warn!("No downstream for result of job {}", result.job_id);
        SUBMIT_UNROUTED
    }

    pub fn on_active(&mut self, endpoint: &Endpoint) {
        self.activate(endpoint);
    }

    pub fn on_login_success(&mut self, endpoint: &Endpoint) {
        self.activate(endpoint);
    }

    pub fn on_pause(&mut self) {}

    /// Relay session closed after `failures` consecutive failures
    pub fn on_close(&mut self, failures: u32) {
        if failures < self.config.close_threshold || self.config.relay_mode != RelayMode::Auto {
            return;
        }

        let Some(relay) = self.relay.take() else {
            return;
        };

        warn!("Relay closed after {} failures, falling back to delegate", failures);
        self.disposal.defer(Downstream::Relay(relay));

        if let Some(strategy) = self.strategy.as_mut() {
            strategy.connect();
        }
    }

    /// Login params for a direct relay session, including the forward url
    pub fn on_login(&self, params: &mut Map<String, Value>) {
        let mut login = build_params(&self.algorithms, &self.context);
        if let Some(endpoint) = self.endpoints.first() {
            login = login.with_url(login_url(endpoint, self.tls));
        }
        login.write_into(params);
    }

    /// Login params for a session opened by the delegate
    pub fn on_delegate_login(&self, params: &mut Map<String, Value>) {
        build_params(&self.algorithms, &self.context).write_into(params);
    }

    pub fn on_verify_algorithm(&mut self, endpoint: &Endpoint, algorithm: &Algorithm) -> bool {
        self.listener.on_verify_algorithm(endpoint, algorithm)
    }

    pub fn on_delegate_verify_algorithm(
        &mut self,
        endpoint: &Endpoint,
        algorithm: &Algorithm,
    ) -> bool {
        self.listener.on_verify_algorithm(endpoint, algorithm)
    }

    /// One-shot timer fired: pause an active session, otherwise reconnect.
    ///
    /// A pause releases the relay and re-arms the timer at the pause deadline,
    /// so the next firing starts a new cycle on the other credential.
    pub fn on_timer(&mut self, now: u64) {
        self.now = now;
        self.timer.stop();

        if self.is_active() {
            self.deadline = now;
            self.timer.start(now, 0);
            self.set_state(State::Waiting);

            if let Some(relay) = self.relay.take() {
                self.disposal.defer(Downstream::Relay(relay));
            }
            if let Some(strategy) = self.strategy.as_mut() {
                strategy.stop();
            }

            self.listener.on_pause();
        } else {
            self.connect();
        }
    }

    /// Pause for a delay drawn uniformly from `[min, max]` ms, then let the timer reconnect.
    ///
    /// Accepted in any state, not only Active; an activation callback during
    /// the wait moves straight back to Active.
    pub fn idle(&mut self, min: u64, max: u64) {
        let (low, high) = if min <= max { (min, max) } else { (max, min) };
        let delay = rand::thread_rng().gen_range(low..=high);

        self.deadline = self.now.saturating_add(delay);
        self.timer.start(self.now, delay);
        self.set_state(State::Waiting);

        debug!("Waiting {} ms until {}", delay, self.deadline);
        self.listener.on_pause();
    }

    pub fn set_job(&mut self, endpoint: &Endpoint, job: &Job) {
        if self.is_active() {
            self.listener.on_job(endpoint, job);
        }
    }

    pub fn set_result(&mut self, endpoint: &Endpoint, result: &SubmitResult, error: Option<&str>) {
        if self.is_active() {
            self.listener.on_result(endpoint, result, error);
        }
    }

    pub fn set_state(&mut self, state: State) {
        self.state = state;
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == State::Active
    }

    pub fn route(&self) -> Route {
        if self.relay.is_some() {
            Route::Relay
        } else if self.strategy.is_some() {
            Route::Delegate
        } else {
            Route::Unavailable
        }
    }

    /// Deadline of the current pause
    pub fn deadline(&self) -> u64 {
        self.deadline
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    pub fn job_context(&self) -> &JobContext {
        &self.context
    }

    pub fn rotation(&self) -> &RotationPolicy {
        &self.rotation
    }

    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    pub fn pending_disposals(&self) -> usize {
        self.disposal.len()
    }

    fn activate(&mut self, endpoint: &Endpoint) {
        if self.is_active() {
            return;
        }

        info!("Session active on {}", endpoint);
        self.set_state(State::Active);
        self.listener.on_active(endpoint);
    }
}

impl Drop for Router {
    fn drop(&mut self) {
        self.timer.stop();

        if let Some(relay) = self.relay.take() {
            self.disposal.defer(Downstream::Relay(relay));
        }
        if let Some(strategy) = self.strategy.take() {
            self.disposal.defer(Downstream::Delegate(strategy));
        }
        self.disposal.drain();
    }
}
