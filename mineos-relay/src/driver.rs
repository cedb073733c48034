use crate::{
    endpoint::Endpoint,
    error::{Result, RouterError},
    job::{Job, JobResult, SubmitResult},
    router::Router,
};
use std::time::Duration;
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
    time::{interval, Instant, MissedTickBehavior},
};
use tracing::{debug, info};

/// Everything the host or a downstream can tell the router
#[derive(Debug)]
pub enum RouterEvent {
    Connect,
    Stop,
    Update { endpoint: Endpoint, job: Job },
    Submit { result: JobResult, reply: oneshot::Sender<i64> },
    Active(Endpoint),
    LoginSuccess(Endpoint),
    Pause,
    Close { failures: u32 },
    Job { endpoint: Endpoint, job: Job },
    Result { endpoint: Endpoint, result: SubmitResult, error: Option<String> },
    Idle { min: u64, max: u64 },
    Shutdown,
}

/// Cloneable sender side of a running driver
#[derive(Debug, Clone)]
pub struct RouterHandle {
    tx: mpsc::Sender<RouterEvent>,
}

impl RouterHandle {
    pub async fn send(&self, event: RouterEvent) -> Result<()> {
        self.tx.send(event).await.map_err(|_| RouterError::Shutdown)
    }

    pub async fn connect(&self) -> Result<()> {
        self.send(RouterEvent::Connect).await
    }

    /// Submit through the router and wait for the sequence id
    pub async fn submit(&self, result: JobResult) -> Result<i64> {
        let (reply, rx) = oneshot::channel();
        self.send(RouterEvent::Submit { result, reply }).await?;
        rx.await.map_err(|_| RouterError::Shutdown)
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.send(RouterEvent::Shutdown).await
    }
}

/// Run `router` on its own task. The task returns the router once shut down.
pub fn spawn(router: Router, tick_interval: Duration) -> (RouterHandle, JoinHandle<Router>) {
    let (tx, rx) = mpsc::channel(100);
    let task = tokio::spawn(run(router, rx, tick_interval));
    (RouterHandle { tx }, task)
}

/// Drive `router` until `Shutdown` arrives or every handle is dropped.
///
/// Ticks and events are serialized on this task, so the router never sees
/// two callbacks at once. `now` is milliseconds since the loop started.
pub async fn run(
    mut router: Router,
    mut rx: mpsc::Receiver<RouterEvent>,
    tick_interval: Duration,
) -> Router {
    let started = Instant::now();
    let mut ticker = interval(tick_interval.max(Duration::from_millis(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!("Router driver started");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let now = started.elapsed().as_millis() as u64;
                router.tick(now);

                if router.timer().is_due(now) {
                    debug!("Timer fired at {}", now);
                    router.on_timer(now);
                }
            }
            event = rx.recv() => match event {
                Some(RouterEvent::Shutdown) | None => break,
                Some(event) => dispatch(&mut router, event),
            }
        }
    }

    router.stop();
    info!("Router driver stopped");
    router
}

fn dispatch(router: &mut Router, event: RouterEvent) {
    match event {
        RouterEvent::Connect => router.connect(),
        RouterEvent::Stop => router.stop(),
        RouterEvent::Update { endpoint, job } => router.update(&endpoint, &job),
        RouterEvent::Submit { result, reply } => {
            let _ = reply.send(router.submit(&result));
        }
        RouterEvent::Active(endpoint) => router.on_active(&endpoint),
        RouterEvent::LoginSuccess(endpoint) => router.on_login_success(&endpoint),
        RouterEvent::Pause => router.on_pause(),
        RouterEvent::Close { failures } => router.on_close(failures),
        RouterEvent::Job { endpoint, job } => router.set_job(&endpoint, &job),
        RouterEvent::Result { endpoint, result, error } => {
            router.set_result(&endpoint, &result, error.as_deref())
        }
        RouterEvent::Idle { min, max } => router.idle(min, max),
        RouterEvent::Shutdown => {}
    }
}
