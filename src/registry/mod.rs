//! Room registry
//!
//! Tracks the remote users of a live room and the streams they publish.
//!
//! # Layout
//!
//! ```text
//!                        RoomState
//!              ┌──────────────────────────────┐
//!              │ users: HashMap<userID, User {│
//!              │   streams: type → Player     │
//!              │ }>                           │
//!              │ streams: Vec<StreamId>       │──► live streams, in order
//!              └──────────────────────────────┘
//! ```
//!
//! A stream is addressed by [`StreamId`] (`userID + "_" + streamType`).
//! The handle lives in its user's slot; the flat list only holds IDs, so
//! the two views cannot disagree about a handle's attributes.

pub mod entry;
pub mod error;
pub mod id;
pub mod store;

pub use entry::User;
pub use error::RegistryError;
pub use id::StreamId;
pub use store::RoomState;
