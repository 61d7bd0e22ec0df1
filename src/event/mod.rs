//! Domain events
//!
//! Every host notification the session understands ends up as one
//! [`RoomEvent`] on the [`EventBus`]. Each event has a fixed wire name,
//! exposed through [`EventKind`].

pub mod bus;

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};

use crate::client::attributes::PlayerAttributes;

pub use bus::{EventBus, EventSubscription};

/// Fixed event identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    LocalJoin,
    LocalLeave,
    KickedOut,
    RemoteUserJoin,
    RemoteUserLeave,
    RemoteVideoAdd,
    RemoteVideoRemove,
    RemoteAudioAdd,
    RemoteAudioRemove,
    RemoteStateUpdate,
    LocalNetStateUpdate,
    RemoteNetStateUpdate,
    LocalAudioVolumeUpdate,
    RemoteAudioVolumeUpdate,
    VideoFullscreenUpdate,
    Error,
    // Reserved; never emitted by this crate
    BgmPlayStart,
    BgmPlayFail,
    BgmPlayProgress,
    BgmPlayComplete,
    ImReady,
    ImMessageReceived,
    ImNotReady,
    ImKickedOut,
    ImError,
}

impl EventKind {
    /// Every kind, in declaration order
    pub const ALL: [EventKind; 25] = [
        EventKind::LocalJoin,
        EventKind::LocalLeave,
        EventKind::KickedOut,
        EventKind::RemoteUserJoin,
        EventKind::RemoteUserLeave,
        EventKind::RemoteVideoAdd,
        EventKind::RemoteVideoRemove,
        EventKind::RemoteAudioAdd,
        EventKind::RemoteAudioRemove,
        EventKind::RemoteStateUpdate,
        EventKind::LocalNetStateUpdate,
        EventKind::RemoteNetStateUpdate,
        EventKind::LocalAudioVolumeUpdate,
        EventKind::RemoteAudioVolumeUpdate,
        EventKind::VideoFullscreenUpdate,
        EventKind::Error,
        EventKind::BgmPlayStart,
        EventKind::BgmPlayFail,
        EventKind::BgmPlayProgress,
        EventKind::BgmPlayComplete,
        EventKind::ImReady,
        EventKind::ImMessageReceived,
        EventKind::ImNotReady,
        EventKind::ImKickedOut,
        EventKind::ImError,
    ];

    /// Wire name of the event
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::LocalJoin => "LOCAL_JOIN",
            EventKind::LocalLeave => "LOCAL_LEAVE",
            EventKind::KickedOut => "KICKED_OUT",
            EventKind::RemoteUserJoin => "REMOTE_USER_JOIN",
            EventKind::RemoteUserLeave => "REMOTE_USER_LEAVE",
            EventKind::RemoteVideoAdd => "REMOTE_VIDEO_ADD",
            EventKind::RemoteVideoRemove => "REMOTE_VIDEO_REMOVE",
            EventKind::RemoteAudioAdd => "REMOTE_AUDIO_ADD",
            EventKind::RemoteAudioRemove => "REMOTE_AUDIO_REMOVE",
            EventKind::RemoteStateUpdate => "REMOTE_STATE_UPDATE",
            EventKind::LocalNetStateUpdate => "LOCAL_NET_STATE_UPDATE",
            EventKind::RemoteNetStateUpdate => "REMOTE_NET_STATE_UPDATE",
            EventKind::LocalAudioVolumeUpdate => "LOCAL_AUDIO_VOLUME_UPDATE",
            EventKind::RemoteAudioVolumeUpdate => "REMOTE_AUDIO_VOLUME_UPDATE",
            EventKind::VideoFullscreenUpdate => "VIDEO_FULLSCREEN_UPDATE",
            EventKind::Error => "ERROR",
            EventKind::BgmPlayStart => "BGM_PLAY_START",
            EventKind::BgmPlayFail => "BGM_PLAY_FAIL",
            EventKind::BgmPlayProgress => "BGM_PLAY_PROGRESS",
            EventKind::BgmPlayComplete => "BGM_PLAY_COMPLETE",
            EventKind::ImReady => "IM_READY",
            EventKind::ImMessageReceived => "IM_MESSAGE_RECEIVED",
            EventKind::ImNotReady => "IM_NOT_READY",
            EventKind::ImKickedOut => "IM_KICKED_OUT",
            EventKind::ImError => "IM_ERROR",
        }
    }

    /// Whether the kind is declared for compatibility only
    pub fn is_reserved(self) -> bool {
        matches!(
            self,
            EventKind::BgmPlayStart
                | EventKind::BgmPlayFail
                | EventKind::BgmPlayProgress
                | EventKind::BgmPlayComplete
                | EventKind::ImReady
                | EventKind::ImMessageReceived
                | EventKind::ImNotReady
                | EventKind::ImKickedOut
                | EventKind::ImError
        )
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown event name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown event kind: {0}")]
pub struct UnknownEventKind(pub String);

impl FromStr for EventKind {
    type Err = UnknownEventKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownEventKind(s.to_string()))
    }
}

/// Event published on the session bus
#[derive(Debug, Clone, PartialEq)]
pub enum RoomEvent {
    /// Local user entered the room
    LocalJoin { code: i32, message: String },
    /// Local user left the room (session disposed while joined)
    LocalLeave,
    /// Local user was kicked out by the server
    KickedOut { code: i32, message: String },
    /// Host error status or pusher error event
    Error {
        code: i32,
        message: String,
        reason: String,
    },
    RemoteUserJoin { user_id: String },
    RemoteUserLeave { user_id: String },
    /// Attribute snapshot of the stream taken after reconciliation
    RemoteVideoAdd { player: PlayerAttributes },
    RemoteVideoRemove { player: PlayerAttributes },
    RemoteAudioAdd { player: PlayerAttributes },
    RemoteAudioRemove { player: PlayerAttributes },
    /// Raw player status event for a stream
    RemoteStateUpdate { stream_id: String, detail: Value },
    /// Pusher network status changed
    LocalNetStateUpdate { info: Map<String, Value> },
    /// Player network status changed
    RemoteNetStateUpdate {
        stream_id: String,
        info: Map<String, Value>,
    },
    LocalAudioVolumeUpdate { volume: f64 },
    RemoteAudioVolumeUpdate { stream_id: String, volume: f64 },
    VideoFullscreenUpdate { stream_id: String, detail: Value },
}

impl RoomEvent {
    /// Wire kind of this event
    pub fn kind(&self) -> EventKind {
        match self {
            RoomEvent::LocalJoin { .. } => EventKind::LocalJoin,
            RoomEvent::LocalLeave => EventKind::LocalLeave,
            RoomEvent::KickedOut { .. } => EventKind::KickedOut,
            RoomEvent::Error { .. } => EventKind::Error,
            RoomEvent::RemoteUserJoin { .. } => EventKind::RemoteUserJoin,
            RoomEvent::RemoteUserLeave { .. } => EventKind::RemoteUserLeave,
            RoomEvent::RemoteVideoAdd { .. } => EventKind::RemoteVideoAdd,
            RoomEvent::RemoteVideoRemove { .. } => EventKind::RemoteVideoRemove,
            RoomEvent::RemoteAudioAdd { .. } => EventKind::RemoteAudioAdd,
            RoomEvent::RemoteAudioRemove { .. } => EventKind::RemoteAudioRemove,
            RoomEvent::RemoteStateUpdate { .. } => EventKind::RemoteStateUpdate,
            RoomEvent::LocalNetStateUpdate { .. } => EventKind::LocalNetStateUpdate,
            RoomEvent::RemoteNetStateUpdate { .. } => EventKind::RemoteNetStateUpdate,
            RoomEvent::LocalAudioVolumeUpdate { .. } => EventKind::LocalAudioVolumeUpdate,
            RoomEvent::RemoteAudioVolumeUpdate { .. } => EventKind::RemoteAudioVolumeUpdate,
            RoomEvent::VideoFullscreenUpdate { .. } => EventKind::VideoFullscreenUpdate,
        }
    }

    /// Player snapshot carried by stream events
    pub fn player(&self) -> Option<&PlayerAttributes> {
        match self {
            RoomEvent::RemoteVideoAdd { player }
            | RoomEvent::RemoteVideoRemove { player }
            | RoomEvent::RemoteAudioAdd { player }
            | RoomEvent::RemoteAudioRemove { player } => Some(player),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for kind in EventKind::ALL {
            assert_eq!(kind.as_str().parse::<EventKind>(), Ok(kind));
        }
        assert!("NOT_AN_EVENT".parse::<EventKind>().is_err());
    }

    #[test]
    fn test_reserved_kinds() {
        let reserved: Vec<_> = EventKind::ALL.into_iter().filter(|k| k.is_reserved()).collect();
        assert_eq!(reserved.len(), 9);
        assert!(reserved.iter().all(|k| k.as_str().starts_with("BGM_") || k.as_str().starts_with("IM_")));
    }

    #[test]
    fn test_event_kind() {
        let event = RoomEvent::RemoteVideoAdd {
            player: PlayerAttributes::default(),
        };
        assert_eq!(event.kind(), EventKind::RemoteVideoAdd);
        assert!(event.player().is_some());
        assert_eq!(RoomEvent::LocalLeave.kind().to_string(), "LOCAL_LEAVE");
        assert!(RoomEvent::LocalLeave.player().is_none());
    }
}
