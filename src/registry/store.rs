//! Room state
//!
//! Remote users and the flat list of their live streams, reconciled from
//! user-list batches. Each entry point applies the whole batch and returns
//! the events to publish, so state is consistent before anyone observes it.
//!
//! Invariants after every entry point:
//! - a stream ID appears at most once in the stream list
//! - a handle sits in its user's slot iff its ID is in the stream list
//! - no listed handle has neither video nor audio
//! - handles leaving the room are reset first

use std::collections::HashMap;
use std::sync::Arc;

use crate::client::attributes::{ObjectFit, PlayerAttributes};
use crate::client::host::HostRuntime;
use crate::client::player::{Player, DEFAULT_SNAPSHOT_QUALITY};
use crate::event::RoomEvent;
use crate::protocol::constants::{AUX_STREAM, MAIN_STREAM, STREAM_ID_SEPARATOR};
use crate::protocol::payload::UserListItem;

use super::entry::User;
use super::id::StreamId;

/// Users and streams of one live room
pub struct RoomState {
    host: Arc<dyn HostRuntime>,
    snapshot_quality: String,
    users: HashMap<String, User>,
    /// User IDs in join order
    user_order: Vec<String>,
    /// Live streams in the order they became live
    streams: Vec<StreamId>,
}

impl RoomState {
    /// Create an empty room whose handles bind through `host`
    pub fn new(host: Arc<dyn HostRuntime>) -> Self {
        Self {
            host,
            snapshot_quality: DEFAULT_SNAPSHOT_QUALITY.to_string(),
            users: HashMap::new(),
            user_order: Vec::new(),
            streams: Vec::new(),
        }
    }

    /// Set the snapshot quality given to new handles
    pub fn with_snapshot_quality(mut self, quality: impl Into<String>) -> Self {
        self.snapshot_quality = quality.into();
        self
    }

    /// Users entered the room
    pub fn add_users(&mut self, items: &[UserListItem]) -> Vec<RoomEvent> {
        let mut events = Vec::with_capacity(items.len());

        for item in items.iter().filter(|item| accept(item)) {
            if !self.users.contains_key(&item.userid) {
                self.users
                    .insert(item.userid.clone(), User::new(item.userid.clone()));
                self.user_order.push(item.userid.clone());

                tracing::info!(user_id = %item.userid, users = self.users.len(), "Remote user joined");
            }

            events.push(RoomEvent::RemoteUserJoin {
                user_id: item.userid.clone(),
            });
        }

        events
    }

    /// Users left the room; their streams are removed and reset
    pub fn remove_users(&mut self, items: &[UserListItem]) -> Vec<RoomEvent> {
        let mut events = Vec::new();

        for item in items.iter().filter(|item| accept(item)) {
            let Some(mut user) = self.users.remove(&item.userid) else {
                tracing::debug!(user_id = %item.userid, "Leave for unknown user");
                continue;
            };

            let mut players = Vec::with_capacity(user.stream_count());
            for stream_type in user.stream_types() {
                let Some(player) = user.remove_stream(&stream_type) else {
                    continue;
                };

                let attributes = player.attributes();
                if attributes.has_video {
                    events.push(RoomEvent::RemoteVideoRemove {
                        player: attributes.clone(),
                    });
                }
                if attributes.has_audio {
                    events.push(RoomEvent::RemoteAudioRemove {
                        player: attributes.clone(),
                    });
                }
                players.push(player);
            }

            self.streams.retain(|id| id.user_id() != item.userid);
            for player in &mut players {
                player.reset();
            }

            self.user_order.retain(|user_id| user_id != &item.userid);
            events.push(RoomEvent::RemoteUserLeave {
                user_id: item.userid.clone(),
            });

            tracing::info!(
                user_id = %item.userid,
                streams = players.len(),
                users = self.users.len(),
                "Remote user left"
            );
        }

        events
    }

    /// Video availability changed for some streams
    pub fn update_user_video(&mut self, items: &[UserListItem]) -> Vec<RoomEvent> {
        let mut events = Vec::new();

        for item in items.iter().filter(|item| accept(item)) {
            let Some(id) = stream_id_for(item, item.stream_type_or_main()) else {
                continue;
            };
            let has_video = item.hasvideo.unwrap_or(false);

            let Some(user) = self.users.get_mut(id.user_id()) else {
                tracing::debug!(stream_id = %id, "Video update for unknown user");
                continue;
            };

            let mut retained = match user.stream_mut(id.stream_type()) {
                Some(player) => {
                    player.attributes_mut().has_video = has_video;
                    player.has_video() || player.has_audio()
                }
                None => {
                    let mut attributes = PlayerAttributes::for_stream(&id).with_src(&item.playurl);
                    attributes.has_video = has_video;
                    user.insert_stream(
                        id.stream_type(),
                        new_player(&self.host, &self.snapshot_quality, attributes),
                    );
                    has_video
                }
            };

            // Screen share is video-only
            if id.stream_type() == AUX_STREAM {
                retained = has_video;
                if let Some(player) = user.stream_mut(AUX_STREAM).filter(|_| has_video) {
                    let attributes = player.attributes_mut();
                    attributes.object_fit = ObjectFit::Contain;
                    attributes.mute_audio = false;
                }
            }

            if let Some(player) = self.settle(&id, retained) {
                tracing::debug!(stream_id = %id, has_video, retained, "Remote video updated");
                events.push(if has_video {
                    RoomEvent::RemoteVideoAdd { player }
                } else {
                    RoomEvent::RemoteVideoRemove { player }
                });
            }
        }

        events
    }

    /// Audio availability changed; audio is always on the main stream
    pub fn update_user_audio(&mut self, items: &[UserListItem]) -> Vec<RoomEvent> {
        let mut events = Vec::new();

        for item in items.iter().filter(|item| accept(item)) {
            let Some(id) = stream_id_for(item, MAIN_STREAM) else {
                continue;
            };
            let has_audio = item.hasaudio.unwrap_or(false);

            let Some(user) = self.users.get_mut(id.user_id()) else {
                tracing::debug!(stream_id = %id, "Audio update for unknown user");
                continue;
            };

            let retained = match user.stream_mut(MAIN_STREAM) {
                Some(player) => {
                    player.attributes_mut().has_audio = has_audio;
                    player.has_video() || player.has_audio()
                }
                None => {
                    let mut attributes = PlayerAttributes::for_stream(&id).with_src(&item.playurl);
                    attributes.has_audio = has_audio;
                    user.insert_stream(
                        MAIN_STREAM,
                        new_player(&self.host, &self.snapshot_quality, attributes),
                    );
                    has_audio
                }
            };

            if let Some(player) = self.settle(&id, retained) {
                tracing::debug!(stream_id = %id, has_audio, retained, "Remote audio updated");
                // Audio loss is reported as a video removal
                events.push(if has_audio {
                    RoomEvent::RemoteAudioAdd { player }
                } else {
                    RoomEvent::RemoteVideoRemove { player }
                });
            }
        }

        events
    }

    /// Reset every handle and empty the room
    pub fn clear(&mut self) {
        for user in self.users.values_mut() {
            for stream_type in user.stream_types() {
                if let Some(mut player) = user.remove_stream(&stream_type) {
                    player.reset();
                }
            }
        }

        tracing::debug!(
            users = self.users.len(),
            streams = self.streams.len(),
            "Room cleared"
        );

        self.users.clear();
        self.user_order.clear();
        self.streams.clear();
    }

    /// Look up a user
    pub fn user(&self, user_id: &str) -> Option<&User> {
        self.users.get(user_id)
    }

    /// Users in join order
    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.user_order
            .iter()
            .filter_map(move |user_id| self.users.get(user_id))
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    /// Live stream IDs in the order they became live
    pub fn stream_ids(&self) -> &[StreamId] {
        &self.streams
    }

    pub fn stream_count(&self) -> usize {
        self.streams.len()
    }

    /// Whether a stream is live
    pub fn contains_stream(&self, id: &StreamId) -> bool {
        self.streams.contains(id)
    }

    /// Handle of a live stream
    pub fn stream(&self, id: &StreamId) -> Option<&Player> {
        self.users.get(id.user_id())?.stream(id.stream_type())
    }

    /// Mutable handle of a live stream
    pub fn stream_mut(&mut self, id: &StreamId) -> Option<&mut Player> {
        self.users.get_mut(id.user_id())?.stream_mut(id.stream_type())
    }

    /// Live handles in stream-list order
    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.streams.iter().filter_map(move |id| self.stream(id))
    }

    /// Keep or drop a handle after an update, returning its snapshot
    ///
    /// A kept handle is listed once; a dropped one leaves the list and its
    /// slot and is reset.
    fn settle(&mut self, id: &StreamId, retained: bool) -> Option<PlayerAttributes> {
        let user = self.users.get_mut(id.user_id())?;
        let snapshot = user.stream(id.stream_type())?.attributes().clone();

        if retained {
            if !self.streams.contains(id) {
                self.streams.push(id.clone());
            }
        } else {
            self.streams.retain(|listed| listed != id);
            if let Some(mut player) = user.remove_stream(id.stream_type()) {
                player.reset();
            }
        }

        Some(snapshot)
    }
}

impl std::fmt::Debug for RoomState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomState")
            .field("users", &self.user_order)
            .field("streams", &self.streams)
            .finish_non_exhaustive()
    }
}

fn new_player(host: &Arc<dyn HostRuntime>, quality: &str, attributes: PlayerAttributes) -> Player {
    Player::new(attributes, host.clone()).with_snapshot_quality(quality)
}

fn accept(item: &UserListItem) -> bool {
    if item.is_valid() {
        return true;
    }
    tracing::warn!(?item, "User-list item without user ID");
    false
}

fn stream_id_for(item: &UserListItem, stream_type: &str) -> Option<StreamId> {
    if stream_type.contains(STREAM_ID_SEPARATOR) {
        tracing::warn!(user_id = %item.userid, stream_type, "Stream type contains separator");
        return None;
    }
    Some(StreamId::new(item.userid.clone(), stream_type))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::attributes::PlayerAttributes;
    use crate::event::EventKind;
    use crate::testing::MockHost;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    fn room() -> (Arc<MockHost>, RoomState) {
        let host = MockHost::new();
        let room = RoomState::new(host.clone());
        (host, room)
    }

    fn kinds(events: &[RoomEvent]) -> Vec<EventKind> {
        events.iter().map(RoomEvent::kind).collect()
    }

    fn video(user: &str, stream_type: &str, on: bool) -> UserListItem {
        UserListItem::new(user)
            .stream_type(stream_type)
            .video(on)
            .play_url(format!("rtmp://{user}/{stream_type}"))
    }

    fn audio(user: &str, on: bool) -> UserListItem {
        UserListItem::new(user).audio(on)
    }

    fn check_invariants(room: &RoomState) {
        let listed: BTreeSet<String> = room.stream_ids().iter().map(|id| id.to_string()).collect();
        assert_eq!(listed.len(), room.stream_count(), "duplicate stream IDs");

        let mut slotted = BTreeSet::new();
        for user in room.users() {
            for player in user.players() {
                let attrs = player.attributes();
                assert!(attrs.has_video || attrs.has_audio, "{} has no media", attrs.id);
                assert_eq!(attrs.user_id, user.user_id());
                slotted.insert(attrs.id.clone());
            }
        }
        assert_eq!(listed, slotted);
    }

    #[test]
    fn test_add_users_is_idempotent() {
        let (_, mut room) = room();

        let events = room.add_users(&[UserListItem::new("u1"), UserListItem::new("u2")]);
        assert_eq!(kinds(&events), vec![EventKind::RemoteUserJoin; 2]);

        let events = room.add_users(&[UserListItem::new("u1")]);
        assert_eq!(events.len(), 1);
        assert_eq!(room.user_count(), 2);

        let order: Vec<_> = room.users().map(User::user_id).collect();
        assert_eq!(order, vec!["u1", "u2"]);
    }

    #[test]
    fn test_malformed_items_are_skipped() {
        let (_, mut room) = room();

        assert!(room.add_users(&[]).is_empty());
        assert!(room.add_users(&[UserListItem::new("")]).is_empty());
        assert_eq!(room.user_count(), 0);

        room.add_users(&[UserListItem::new("u1")]);
        assert!(room.update_user_video(&[video("u1", "screen_share", true)]).is_empty());
        assert_eq!(room.stream_count(), 0);
    }

    #[test]
    fn test_video_for_unknown_user_creates_nothing() {
        let (host, mut room) = room();

        let events = room.update_user_video(&[video("ghost", "main", true)]);

        assert!(events.is_empty());
        assert!(room.user("ghost").is_none());
        assert_eq!(room.stream_count(), 0);
        assert!(host.calls().is_empty());
    }

    #[test]
    fn test_video_on_then_off_removes_handle() {
        let (host, mut room) = room();
        room.add_users(&[UserListItem::new("u1")]);
        room.update_user_video(&[video("u1", "main", true)]);

        let id = StreamId::main("u1");
        room.stream_mut(&id).unwrap().play(Default::default()).unwrap();

        let events = room.update_user_video(&[UserListItem::new("u1").video(false).audio(false)]);

        assert_eq!(kinds(&events), vec![EventKind::RemoteVideoRemove]);
        assert!(!room.contains_stream(&id));
        assert!(room.user("u1").unwrap().stream(MAIN_STREAM).is_none());
        assert_eq!(host.count("player:u1_main:stop"), 1);
        check_invariants(&room);
    }

    #[test]
    fn test_duplicate_video_add_keeps_one_entry() {
        let (_, mut room) = room();
        room.add_users(&[UserListItem::new("u1")]);

        let first = room.update_user_video(&[video("u1", "main", true)]);
        let second = room.update_user_video(&[video("u1", "main", true)]);

        assert_eq!(kinds(&first), vec![EventKind::RemoteVideoAdd]);
        assert_eq!(kinds(&second), vec![EventKind::RemoteVideoAdd]);
        assert_eq!(room.stream_ids(), &[StreamId::main("u1")]);
    }

    #[test]
    fn test_new_handle_without_media_is_reported_and_dropped() {
        let (_, mut room) = room();
        room.add_users(&[UserListItem::new("u1")]);

        let events = room.update_user_video(&[video("u1", "main", false)]);

        assert_eq!(kinds(&events), vec![EventKind::RemoteVideoRemove]);
        assert_eq!(events[0].player().unwrap().id, "u1_main");
        assert_eq!(room.stream_count(), 0);
        assert_eq!(room.user("u1").unwrap().stream_count(), 0);
    }

    #[test]
    fn test_aux_stream_is_video_only() {
        let (_, mut room) = room();
        room.add_users(&[UserListItem::new("u1")]);

        let events = room.update_user_video(&[video("u1", "aux", true)]);
        let player = events[0].player().unwrap();
        assert_eq!(player.object_fit, ObjectFit::Contain);
        assert!(!player.mute_audio);
        assert_eq!(player.src, "rtmp://u1/aux");
        assert!(room.contains_stream(&StreamId::new("u1", "aux")));

        // audio on the aux handle does not keep it alive
        room.stream_mut(&StreamId::new("u1", "aux"))
            .unwrap()
            .attributes_mut()
            .has_audio = true;
        let events = room.update_user_video(&[video("u1", "aux", false)]);
        assert_eq!(kinds(&events), vec![EventKind::RemoteVideoRemove]);
        assert_eq!(room.stream_count(), 0);
        check_invariants(&room);
    }

    #[test]
    fn test_audio_loss_reports_video_remove() {
        let (_, mut room) = room();
        room.add_users(&[UserListItem::new("u1")]);

        let events = room.update_user_audio(&[audio("u1", true)]);
        assert_eq!(kinds(&events), vec![EventKind::RemoteAudioAdd]);
        assert!(room.contains_stream(&StreamId::main("u1")));

        let events = room.update_user_audio(&[audio("u1", false)]);
        assert_eq!(kinds(&events), vec![EventKind::RemoteVideoRemove]);
        assert_eq!(room.stream_count(), 0);
    }

    #[test]
    fn test_remove_user_emits_per_track_and_resets() {
        let (host, mut room) = room();
        room.add_users(&[UserListItem::new("u1"), UserListItem::new("u2")]);
        room.update_user_video(&[video("u1", "main", true), video("u1", "aux", true)]);
        room.update_user_audio(&[audio("u1", true)]);
        room.update_user_video(&[video("u2", "main", true)]);
        room.stream_mut(&StreamId::new("u1", "aux"))
            .unwrap()
            .play(Default::default())
            .unwrap();

        let events = room.remove_users(&[UserListItem::new("u1")]);

        assert_eq!(
            kinds(&events),
            vec![
                EventKind::RemoteVideoRemove,
                EventKind::RemoteAudioRemove,
                EventKind::RemoteVideoRemove,
                EventKind::RemoteUserLeave,
            ]
        );
        assert_eq!(events[0].player().unwrap().id, "u1_main");
        assert_eq!(events[2].player().unwrap().id, "u1_aux");
        assert_eq!(host.count("player:u1_aux:stop"), 1);
        assert!(room.user("u1").is_none());
        assert_eq!(room.stream_ids(), &[StreamId::main("u2")]);
        check_invariants(&room);
    }

    #[test]
    fn test_remove_unknown_and_streamless_users() {
        let (_, mut room) = room();
        assert!(room.remove_users(&[UserListItem::new("ghost")]).is_empty());

        room.add_users(&[UserListItem::new("u1")]);
        let events = room.remove_users(&[UserListItem::new("u1")]);
        assert_eq!(kinds(&events), vec![EventKind::RemoteUserLeave]);
        assert_eq!(room.user_count(), 0);
    }

    #[test]
    fn test_user_id_with_separator() {
        let (_, mut room) = room();
        room.add_users(&[UserListItem::new("team_a")]);
        room.update_user_video(&[video("team_a", "main", true)]);

        let parsed = StreamId::parse("team_a_main").unwrap();
        assert!(room.stream(&parsed).is_some());
    }

    #[test]
    fn test_clear_resets_everything() {
        let (host, mut room) = room();
        room.add_users(&[UserListItem::new("u1")]);
        room.update_user_video(&[video("u1", "main", true)]);
        room.stream_mut(&StreamId::main("u1"))
            .unwrap()
            .play(Default::default())
            .unwrap();

        room.clear();

        assert_eq!(room.user_count(), 0);
        assert_eq!(room.stream_count(), 0);
        assert_eq!(host.count("player:u1_main:stop"), 1);
    }

    #[test]
    fn test_single_user_end_to_end() {
        let (_, mut room) = room();
        let id = StreamId::main("u1");

        room.add_users(&[UserListItem::new("u1")]);

        room.update_user_video(&[UserListItem::new("u1")
            .stream_type("main")
            .video(true)
            .play_url("rtmp://x")]);
        assert_eq!(room.stream_ids(), &[id.clone()]);
        assert_eq!(room.stream(&id).unwrap().attributes().src, "rtmp://x");

        room.update_user_audio(&[audio("u1", false)]);
        let player = room.stream(&id).unwrap();
        assert!(player.has_video());
        assert!(!player.has_audio());
        assert_eq!(room.stream_count(), 1);

        room.update_user_video(&[UserListItem::new("u1").stream_type("main").video(false)]);
        assert_eq!(room.stream_count(), 0);
        assert!(room.user("u1").unwrap().stream(MAIN_STREAM).is_none());
    }

    #[test]
    fn test_event_snapshot_precedes_reset() {
        let (_, mut room) = room();
        room.add_users(&[UserListItem::new("u1")]);
        room.update_user_video(&[video("u1", "main", true)]);

        let events = room.update_user_video(&[video("u1", "main", false)]);
        let snapshot: &PlayerAttributes = events[0].player().unwrap();
        assert_eq!(snapshot.src, "rtmp://u1/main");
    }

    #[derive(Debug, Clone)]
    enum Op {
        Join(u8),
        Leave(u8),
        Video(u8, bool, bool),
        Audio(u8, bool),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0u8..4).prop_map(Op::Join),
            (0u8..4).prop_map(Op::Leave),
            (0u8..4, any::<bool>(), any::<bool>()).prop_map(|(u, aux, on)| Op::Video(u, aux, on)),
            (0u8..4, any::<bool>()).prop_map(|(u, on)| Op::Audio(u, on)),
        ]
    }

    proptest! {
        #[test]
        fn prop_membership_follows_joins_and_leaves(ops in proptest::collection::vec(op(), 0..40)) {
            let (_, mut room) = room();
            let mut expected = BTreeSet::new();

            for op in ops {
                match op {
                    Op::Join(u) => {
                        room.add_users(&[UserListItem::new(format!("user_{u}"))]);
                        expected.insert(format!("user_{u}"));
                    }
                    Op::Leave(u) => {
                        room.remove_users(&[UserListItem::new(format!("user_{u}"))]);
                        expected.remove(&format!("user_{u}"));
                    }
                    Op::Video(u, aux, on) => {
                        let stream_type = if aux { AUX_STREAM } else { MAIN_STREAM };
                        room.update_user_video(&[video(&format!("user_{u}"), stream_type, on)]);
                    }
                    Op::Audio(u, on) => {
                        room.update_user_audio(&[audio(&format!("user_{u}"), on)]);
                    }
                }
                check_invariants(&room);
            }

            let actual: BTreeSet<String> = room.users().map(|u| u.user_id().to_string()).collect();
            prop_assert_eq!(actual, expected);
            prop_assert_eq!(room.users().count(), room.user_count());
        }
    }
}
