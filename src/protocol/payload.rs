//! User-list payloads
//!
//! Status codes 1031..=1034 carry a JSON document in their message:
//!
//! ```text
//! {"userlist":[{"userid":"u1","streamtype":"main","hasvideo":true,"playurl":"rtmp://..."}]}
//! ```
//!
//! Items are decoded one by one so a single malformed entry does not
//! discard the rest of the batch.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Error parsing a user-list payload
#[derive(Debug, Error)]
pub enum PayloadError {
    /// The status event carried no message
    #[error("Empty user-list payload")]
    Empty,
    /// The message is not valid JSON
    #[error("Malformed user-list payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// One entry of a user-list payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserListItem {
    /// Remote user ID
    pub userid: String,
    /// Stream type ("main", "aux", ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub streamtype: Option<String>,
    /// Whether the stream currently has video
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hasvideo: Option<bool>,
    /// Whether the stream currently has audio
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hasaudio: Option<bool>,
    /// Play URL for the stream
    #[serde(default)]
    pub playurl: String,
}

impl UserListItem {
    /// Create an item for a user
    pub fn new(userid: impl Into<String>) -> Self {
        Self {
            userid: userid.into(),
            ..Default::default()
        }
    }

    /// Set the stream type
    pub fn stream_type(mut self, stream_type: impl Into<String>) -> Self {
        self.streamtype = Some(stream_type.into());
        self
    }

    /// Set video presence
    pub fn video(mut self, has_video: bool) -> Self {
        self.hasvideo = Some(has_video);
        self
    }

    /// Set audio presence
    pub fn audio(mut self, has_audio: bool) -> Self {
        self.hasaudio = Some(has_audio);
        self
    }

    /// Set the play URL
    pub fn play_url(mut self, url: impl Into<String>) -> Self {
        self.playurl = url.into();
        self
    }

    /// An item without a user ID cannot be addressed
    pub fn is_valid(&self) -> bool {
        !self.userid.is_empty()
    }

    /// Stream type, falling back to "main" when absent or empty
    pub fn stream_type_or_main(&self) -> &str {
        match self.streamtype.as_deref() {
            Some(stream_type) if !stream_type.is_empty() => stream_type,
            _ => super::constants::MAIN_STREAM,
        }
    }
}

/// Parsed user-list payload
#[derive(Debug, Clone, Default)]
pub struct UserList {
    /// Well-formed items, in payload order
    pub items: Vec<UserListItem>,
    /// Number of entries that were skipped as malformed
    pub skipped: usize,
}

impl UserList {
    /// Check if there is nothing to reconcile
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Parse the message of a user-list status event
///
/// A document without a `userlist` array yields an empty list.
pub fn parse_user_list(message: &str) -> Result<UserList, PayloadError> {
    if message.trim().is_empty() {
        return Err(PayloadError::Empty);
    }

    let document: Value = serde_json::from_str(message)?;

    let Some(entries) = document.get("userlist").and_then(Value::as_array) else {
        tracing::debug!("User-list payload without userlist array");
        return Ok(UserList::default());
    };

    let mut list = UserList {
        items: Vec::with_capacity(entries.len()),
        skipped: 0,
    };

    for entry in entries {
        match UserListItem::deserialize(entry) {
            Ok(item) if item.is_valid() => list.items.push(item),
            Ok(_) => {
                tracing::warn!("Skipping user-list item without userid");
                list.skipped += 1;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Skipping malformed user-list item");
                list.skipped += 1;
            }
        }
    }

    Ok(list)
}
