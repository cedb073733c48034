//! MineOS Relay Router
//!
//! Decides which downstream carries a session's traffic and when it reconnects.
//!
//! # Features
//!
//! - Direct relay sessions with automatic fallback to a failover delegate
//! - Credential rotation between two fixed identifiers, once per reconnect
//! - Login negotiation payload (algorithm preference, job echo, seed hash)
//! - Deferred release of downstreams torn down from their own callbacks
//! - Tokio driver that serializes ticks, timers and callbacks
//!
//! # Example
//!
//! ```no_run
//! use mineos_relay::{driver, Router, RouterConfig};
//! # use mineos_relay::downstream::{DownstreamFactory, RouterListener};
//! # fn collaborators() -> (Box<dyn DownstreamFactory>, Box<dyn RouterListener>) {
//! #     unimplemented!()
//! # }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RouterConfig::load("router.toml")?;
//!     let (factory, listener) = collaborators();
//!
//!     let tick = config.tick_interval();
//!     let router = Router::new(config, vec!["rx/0".into()], factory, listener)?;
//!     let (handle, task) = driver::spawn(router, tick);
//!
//!     handle.connect().await?;
//!     // ... feed downstream callbacks through the handle ...
//!     handle.shutdown().await?;
//!     task.await?;
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod downstream;
pub mod driver;
pub mod endpoint;
pub mod error;
pub mod job;
pub mod negotiation;
pub mod rotation;
pub mod router;
pub mod timer;

// Re-export main types
pub use config::{RelayMode, RouterConfig};
pub use downstream::{DelegateStrategy, DownstreamFactory, RelayConnection, Route, RouterListener};
pub use endpoint::{Endpoint, EndpointMode, RelayHint};
pub use error::{Result, RouterError};
pub use job::{Algorithm, Job, JobContext, JobResult, SubmitResult};
pub use negotiation::LoginParams;
pub use router::{Router, State, SUBMIT_UNROUTED};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
