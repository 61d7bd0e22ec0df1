//! Live room session state
//!
//! Sits between a host audio/video runtime and the application:
//!
//! - decodes numeric host status codes into domain signals ([`protocol`])
//! - reconciles the remote users and streams of a room ([`registry`])
//! - wraps the host pusher/player contexts in handles ([`client`])
//! - publishes typed domain events on a broadcast bus ([`event`])
//!
//! [`session::LiveSession`] composes all of the above.
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use liveroom_rs::client::HostRuntime;
//! use liveroom_rs::session::{LiveSession, SessionConfig, StatusEvent};
//!
//! # fn example(host: Arc<dyn HostRuntime>) {
//! let mut session = LiveSession::new(host, SessionConfig::default());
//! let mut events = session.subscribe();
//!
//! session.handle_pusher_status(&StatusEvent::new(1018, "entered room"));
//! assert!(events.try_recv().is_ok());
//! # }
//! ```

pub mod client;
pub mod error;
pub mod event;
pub mod protocol;
pub mod registry;
pub mod session;
pub mod stats;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{Error, Result};
pub use event::{EventKind, RoomEvent};
pub use registry::StreamId;
pub use session::{LiveSession, SessionConfig};
