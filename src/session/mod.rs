//! Live room session
//!
//! - Session configuration
//! - Local presence state machine
//! - Raw host event shapes
//! - The [`LiveSession`] facade

pub mod config;
pub mod context;
pub mod live;
pub mod state;

pub use config::SessionConfig;
pub use context::{ErrorEvent, NetStatusEvent, PlayerEvent, StatusEvent, VolumeEvent};
pub use live::LiveSession;
pub use state::{LocalPhase, LocalState};
