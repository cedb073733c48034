//! Rotation demo driving the router with logging-only downstreams
//!
//! Every reconnect cycle picks the other credential. Run with
//! `RUST_LOG=mineos_relay=debug` to watch the routing decisions.

use mineos_relay::{
    downstream::{DelegateRequest, RelayRequest},
    driver::{self, RouterEvent},
    DelegateStrategy, DownstreamFactory, Endpoint, JobResult, RelayConnection, Router,
    RouterConfig, RouterListener,
};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

struct LoggingDelegate {
    endpoint: String,
}

impl DelegateStrategy for LoggingDelegate {
    fn connect(&mut self) {
        info!("delegate connecting to {}", self.endpoint);
    }

    fn stop(&mut self) {
        info!("delegate for {} stopped", self.endpoint);
    }

    fn tick(&mut self, _now: u64) {}

    fn submit(&mut self, result: &JobResult) -> i64 {
        info!("delegate submitting result for job {}", result.job_id);
        1
    }
}

struct LoggingFactory;

impl DownstreamFactory for LoggingFactory {
    fn create_relay(&mut self, _request: RelayRequest<'_>) -> Option<Box<dyn RelayConnection>> {
        None
    }

    fn create_delegate(
        &mut self,
        request: DelegateRequest<'_>,
    ) -> mineos_relay::Result<Box<dyn DelegateStrategy>> {
        let endpoint = request
            .endpoints
            .first()
            .map(|e| e.to_string())
            .unwrap_or_default();
        Ok(Box::new(LoggingDelegate { endpoint }))
    }
}

struct LoggingListener;

impl RouterListener for LoggingListener {
    fn on_active(&mut self, endpoint: &Endpoint) {
        info!("active on {}", endpoint);
    }

    fn on_pause(&mut self) {
        info!("paused");
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("mineos_relay=debug,rotation_demo=info")),
        )
        .init();

    let mut config = RouterConfig::new("pool.example.com", 10001, "credential-a", "credential-b");
    config.tick_interval_ms = 250;

    let tick = config.tick_interval();
    let router = Router::new(
        config,
        vec!["rx/0".into(), "cn/r".into()],
        Box::new(LoggingFactory),
        Box::new(LoggingListener),
    )?;
    let (handle, task) = driver::spawn(router, tick);

    handle.connect().await?;

    // each idle window ends with the timer starting the next cycle
    for cycle in 0..4 {
        info!("cycle {}", cycle);

        let endpoint =
            Endpoint::new("pool.example.com", 10001, "credential-a", false, Default::default());
        handle.send(RouterEvent::Active(endpoint)).await?;
        handle.send(RouterEvent::Idle { min: 500, max: 1_000 }).await?;

        tokio::time::sleep(Duration::from_millis(1_500)).await;
    }

    handle.shutdown().await?;
    let router = task.await?;
    info!("final state {:?}", router.state());

    Ok(())
}
