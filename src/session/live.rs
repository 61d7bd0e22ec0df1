//! Live room session
//!
//! [`LiveSession`] is the single entry point for a page: host callbacks are
//! forwarded to its `handle_*` methods, the application reads room state
//! through its accessors and listens on its event bus.
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use liveroom_rs::event::EventKind;
//! use liveroom_rs::session::{LiveSession, SessionConfig, StatusEvent};
//! use liveroom_rs::client::HostRuntime;
//!
//! # async fn example(host: Arc<dyn HostRuntime>) {
//! let mut session = LiveSession::new(host, SessionConfig::default());
//! let mut joins = session.on(EventKind::RemoteUserJoin);
//!
//! session.handle_pusher_status(&StatusEvent::new(
//!     1031,
//!     r#"{"userlist":[{"userid":"u1"}]}"#,
//! ));
//!
//! while let Some(event) = joins.recv().await {
//!     println!("{event:?}");
//! }
//! # }
//! ```

use std::sync::Arc;
use std::time::Instant;

use serde_json::{Map, Value};

use crate::client::attributes::{PlayerAttributes, PusherAttributes};
use crate::client::host::HostRuntime;
use crate::client::player::Player;
use crate::client::publisher::Pusher;
use crate::error::{Error, Result};
use crate::event::{EventBus, EventKind, EventSubscription, RoomEvent};
use crate::protocol::constants::EXIT_ROOM;
use crate::protocol::decoder::{self, Decoded, Signal, UserListOp};
use crate::protocol::payload::{parse_user_list, UserList};
use crate::registry::{RegistryError, RoomState, StreamId, User};
use crate::stats::SessionStats;

use super::config::SessionConfig;
use super::context::{ErrorEvent, NetStatusEvent, PlayerEvent, StatusEvent, VolumeEvent};
use super::state::{LocalPhase, LocalState};

/// Session state for one live room
pub struct LiveSession {
    config: SessionConfig,
    host: Arc<dyn HostRuntime>,
    local: LocalState,
    room: RoomState,
    pusher: Option<Pusher>,
    bus: EventBus,
    stats: SessionStats,
    created_at: Instant,
}

impl LiveSession {
    /// Create a session bound to a host runtime
    pub fn new(host: Arc<dyn HostRuntime>, config: SessionConfig) -> Self {
        let room = RoomState::new(host.clone()).with_snapshot_quality(&config.snapshot_quality);
        let bus = EventBus::new(config.event_capacity);

        tracing::debug!(env = %config.env, "Live session created");

        Self {
            config,
            host,
            local: LocalState::new(),
            room,
            pusher: None,
            bus,
            stats: SessionStats::new(),
            created_at: Instant::now(),
        }
    }

    /// Get the session configuration
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Deployment environment tag
    pub fn env(&self) -> &str {
        &self.config.env
    }

    /// Local presence phase
    pub fn phase(&self) -> LocalPhase {
        self.local.phase
    }

    /// Room state
    pub fn room(&self) -> &RoomState {
        &self.room
    }

    // ---- Pusher ----

    /// Create the session pusher from defaults overlaid with `patch`
    ///
    /// An existing pusher is reset and replaced.
    pub fn create_pusher(&mut self, patch: &Map<String, Value>) -> Result<&mut Pusher> {
        let attributes = PusherAttributes::from_patch(patch)?;

        if let Some(mut previous) = self.pusher.take() {
            tracing::debug!("Replacing existing pusher");
            previous.reset();
        }

        tracing::debug!(url = %attributes.url, "Pusher created");
        let pusher = Pusher::new(attributes, self.host.clone())
            .with_snapshot_quality(&self.config.snapshot_quality);

        Ok(self.pusher.insert(pusher))
    }

    pub fn pusher(&self) -> Option<&Pusher> {
        self.pusher.as_ref()
    }

    pub fn pusher_mut(&mut self) -> Option<&mut Pusher> {
        self.pusher.as_mut()
    }

    /// Pusher attributes, or the defaults when no pusher exists
    pub fn pusher_attributes(&self) -> PusherAttributes {
        self.pusher
            .as_ref()
            .map(|pusher| pusher.attributes().clone())
            .unwrap_or_default()
    }

    /// Merge a patch onto the pusher attributes
    pub fn set_pusher_attributes(&mut self, patch: &Map<String, Value>) -> Result<&PusherAttributes> {
        let pusher = self.pusher.as_mut().ok_or(Error::NoPusher)?;
        pusher.set_attributes(patch)?;
        Ok(pusher.attributes())
    }

    // ---- Players ----

    /// Merge a patch onto a live stream's attributes
    pub fn set_player_attributes(
        &mut self,
        stream_id: &str,
        patch: &Map<String, Value>,
    ) -> Result<&PlayerAttributes> {
        let player = self.player_mut(stream_id)?;
        player.set_attributes(patch)?;
        Ok(player.attributes())
    }

    /// Toggle a stream between its main and small definitions
    pub fn switch_stream_type(&mut self, stream_id: &str) -> Result<&PlayerAttributes> {
        let player = self.player_mut(stream_id)?;
        player.switch_definition();
        Ok(player.attributes())
    }

    pub fn user(&self, user_id: &str) -> Option<&User> {
        self.room.user(user_id)
    }

    /// Remote users in join order
    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.room.users()
    }

    /// Attributes of every live stream, in stream-list order
    pub fn players(&self) -> impl Iterator<Item = &PlayerAttributes> {
        self.room.players().map(Player::attributes)
    }

    /// Handle of a live stream by its string ID
    pub fn player(&self, stream_id: &str) -> Result<&Player> {
        let id = StreamId::parse(stream_id)?;
        self.room
            .stream(&id)
            .ok_or(Error::Registry(RegistryError::StreamNotFound(id)))
    }

    pub fn player_mut(&mut self, stream_id: &str) -> Result<&mut Player> {
        let id = StreamId::parse(stream_id)?;
        match self.room.stream_mut(&id) {
            Some(player) => Ok(player),
            None => Err(RegistryError::StreamNotFound(id).into()),
        }
    }

    /// Handle of a live stream
    pub fn stream(&self, id: &StreamId) -> Option<&Player> {
        self.room.stream(id)
    }

    // ---- Pusher events ----

    /// Pusher `statechange`
    pub fn handle_pusher_status(&mut self, event: &StatusEvent) {
        let code = event.detail.code;
        let message = event.detail.message.as_str();
        self.stats.status_events += 1;

        if let Some(op) = UserListOp::from_code(code) {
            self.stats.user_list_events += 1;
            match parse_user_list(message) {
                Ok(list) => self.reconcile(op, list),
                Err(e) => {
                    self.stats.payload_failures += 1;
                    tracing::warn!(code, error = %e, "Discarding user-list event");
                }
            }
            return;
        }

        match decoder::decode(code, message) {
            Decoded::Signal(Signal::LocalJoin) => {
                self.local.on_join();
                tracing::info!(code, "Local user joined room");
                self.publish(RoomEvent::LocalJoin {
                    code,
                    message: message.to_string(),
                });
            }
            Decoded::Signal(Signal::KickedOut) => {
                self.local.on_kicked();
                tracing::warn!(code, msg = message, "Local user kicked out");
                self.publish(RoomEvent::KickedOut {
                    code,
                    message: message.to_string(),
                });
            }
            Decoded::Signal(Signal::Error { reason }) => {
                self.stats.errors += 1;
                self.publish(RoomEvent::Error {
                    code,
                    message: message.to_string(),
                    reason: reason.to_string(),
                });
            }
            Decoded::Informational => {
                if code == EXIT_ROOM {
                    self.local.on_exit();
                }
            }
            Decoded::Unrecognized => {
                self.stats.unrecognized_codes += 1;
            }
        }
    }

    /// Pusher `netstatus`
    pub fn handle_pusher_net_status(&mut self, event: &NetStatusEvent) {
        let info = event.detail.info.clone();
        if let Some(pusher) = self.pusher.as_mut() {
            pusher.apply_net_status(info.clone());
        }
        self.publish(RoomEvent::LocalNetStateUpdate { info });
    }

    /// Pusher `error`
    pub fn handle_pusher_error(&mut self, event: &ErrorEvent) {
        let code = event.detail.err_code;
        let message = event.detail.err_msg.clone();
        let reason = decoder::error_reason(code)
            .map(str::to_string)
            .unwrap_or_else(|| message.clone());

        self.stats.errors += 1;
        tracing::error!(code, msg = %message, "Pusher error");
        self.publish(RoomEvent::Error {
            code,
            message,
            reason,
        });
    }

    /// Pusher `audiovolumenotify`; ignored without a pusher
    pub fn handle_pusher_audio_volume(&mut self, event: &VolumeEvent) {
        let volume = event.detail.volume;
        let Some(pusher) = self.pusher.as_mut() else {
            return;
        };

        pusher.set_volume(volume);
        self.publish(RoomEvent::LocalAudioVolumeUpdate { volume });
    }

    // ---- Player events ----

    /// Player `statechange`
    pub fn handle_player_state_change(&mut self, event: &PlayerEvent) {
        tracing::debug!(stream_id = event.stream_id(), code = ?event.code(), "Player state change");
        self.publish(RoomEvent::RemoteStateUpdate {
            stream_id: event.stream_id().to_string(),
            detail: event.detail.clone(),
        });
    }

    /// Any other player component event
    pub fn handle_player_event(&mut self, event: &PlayerEvent) {
        self.publish(RoomEvent::RemoteStateUpdate {
            stream_id: event.stream_id().to_string(),
            detail: event.detail.clone(),
        });
    }

    /// Player `netstatus`
    ///
    /// Published even when the stream is no longer live.
    pub fn handle_player_net_status(&mut self, event: &PlayerEvent) -> Result<()> {
        let id = StreamId::parse(event.stream_id())?;
        let info = event.info();

        if let Some(player) = self.room.stream_mut(&id) {
            player.apply_net_status(info.clone());
        }

        self.publish(RoomEvent::RemoteNetStateUpdate {
            stream_id: id.to_string(),
            info,
        });
        Ok(())
    }

    /// Player `audiovolumenotify`; ignored for streams that are not live
    pub fn handle_player_audio_volume(&mut self, event: &PlayerEvent) -> Result<()> {
        let id = StreamId::parse(event.stream_id())?;
        let Some(player) = self.room.stream_mut(&id) else {
            return Ok(());
        };

        let volume = event.volume().unwrap_or_default();
        player.set_volume(volume);

        self.publish(RoomEvent::RemoteAudioVolumeUpdate {
            stream_id: id.to_string(),
            volume,
        });
        Ok(())
    }

    /// Player `fullscreenchange`
    pub fn handle_player_fullscreen_change(&mut self, event: &PlayerEvent) {
        self.publish(RoomEvent::VideoFullscreenUpdate {
            stream_id: event.stream_id().to_string(),
            detail: event.detail.clone(),
        });
    }

    // ---- Events ----

    /// Receive every event
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<RoomEvent> {
        self.bus.subscribe()
    }

    /// Receive events of one kind
    pub fn on(&self, kind: EventKind) -> EventSubscription {
        tracing::debug!(event = %kind, "Listening");
        self.bus.on(kind)
    }

    /// Stop receiving on a subscription
    pub fn off(&self, subscription: EventSubscription) {
        self.bus.off(subscription);
    }

    /// Snapshot of the session counters
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            users: self.room.user_count(),
            streams: self.room.stream_count(),
            uptime: self.created_at.elapsed(),
            ..self.stats.clone()
        }
    }

    /// Tear the session down
    ///
    /// Publishes `LocalLeave` if the local user was in the room, resets
    /// every handle and the pusher, then disconnects all subscribers.
    pub fn dispose(&mut self) {
        if self.local.dispose() {
            self.publish(RoomEvent::LocalLeave);
        }

        self.room.clear();
        if let Some(mut pusher) = self.pusher.take() {
            pusher.reset();
        }
        self.bus.close();

        tracing::info!(env = %self.config.env, "Live session disposed");
    }

    fn reconcile(&mut self, op: UserListOp, list: UserList) {
        self.stats.skipped_items += list.skipped as u64;
        if list.skipped > 0 {
            tracing::warn!(code = op.code(), skipped = list.skipped, "Skipped malformed user-list items");
        }

        let events = match op {
            UserListOp::Join => self.room.add_users(&list.items),
            UserListOp::Leave => self.room.remove_users(&list.items),
            UserListOp::VideoUpdate => self.room.update_user_video(&list.items),
            UserListOp::AudioUpdate => self.room.update_user_audio(&list.items),
        };

        tracing::debug!(
            code = op.code(),
            items = list.items.len(),
            events = events.len(),
            users = self.room.user_count(),
            streams = self.room.stream_count(),
            "User list reconciled"
        );

        for event in events {
            self.publish(event);
        }
    }

    fn publish(&mut self, event: RoomEvent) {
        self.stats.events_published += 1;
        self.bus.emit(event);
    }
}

impl std::fmt::Debug for LiveSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveSession")
            .field("config", &self.config)
            .field("phase", &self.local.phase)
            .field("room", &self.room)
            .field("pusher", &self.pusher)
            .finish_non_exhaustive()
    }
}
