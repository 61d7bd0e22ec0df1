//! Host-facing handles
//!
//! Provides the local pusher and remote player handles, the attribute
//! records they carry, and the host capability traits they bind to.

pub mod attributes;
pub mod binding;
pub mod host;
pub mod player;
pub mod publisher;

pub use attributes::{
    apply_patch, CameraFacing, DefinitionType, MediaMode, ObjectFit, PlayerAttributes,
    PusherAttributes, SoundMode,
};
pub use binding::Binding;
pub use host::{
    CallbackOptions, HostPayload, HostRuntime, PendingCall, PlayerContext, PusherContext,
};
pub use player::Player;
pub use publisher::Pusher;
