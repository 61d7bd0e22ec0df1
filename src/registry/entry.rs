//! Remote user entry
//!
//! A user owns one [`Player`] per stream type it currently publishes.

use std::collections::HashMap;

use crate::client::player::Player;
use crate::protocol::constants::{AUX_STREAM, MAIN_STREAM};

/// Remote participant in the room
#[derive(Debug)]
pub struct User {
    user_id: String,
    streams: HashMap<String, Player>,
}

impl User {
    pub(super) fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            streams: HashMap::new(),
        }
    }

    /// User ID
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Handle for a stream type
    pub fn stream(&self, stream_type: &str) -> Option<&Player> {
        self.streams.get(stream_type)
    }

    /// Mutable handle for a stream type
    pub fn stream_mut(&mut self, stream_type: &str) -> Option<&mut Player> {
        self.streams.get_mut(stream_type)
    }

    /// Number of live handles
    pub fn stream_count(&self) -> usize {
        self.streams.len()
    }

    /// Stream types with a handle: main, aux, then the rest sorted
    pub fn stream_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.streams.keys().cloned().collect();
        types.sort_by(|a, b| rank(a).cmp(&rank(b)).then_with(|| a.cmp(b)));
        types
    }

    /// Handles in [`User::stream_types`] order
    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.stream_types()
            .into_iter()
            .filter_map(move |stream_type| self.streams.get(&stream_type))
    }

    pub(super) fn insert_stream(&mut self, stream_type: &str, player: Player) {
        self.streams.insert(stream_type.to_string(), player);
    }

    pub(super) fn remove_stream(&mut self, stream_type: &str) -> Option<Player> {
        self.streams.remove(stream_type)
    }

    pub(super) fn has_stream(&self, stream_type: &str) -> bool {
        self.streams.contains_key(stream_type)
    }
}

fn rank(stream_type: &str) -> u8 {
    match stream_type {
        MAIN_STREAM => 0,
        AUX_STREAM => 1,
        _ => 2,
    }
}
