//! Stream identity
//!
//! A stream is addressed by `userID + "_" + streamType`. Parsing splits at
//! the *last* underscore, so a user ID may contain underscores but a stream
//! type may not: `"a_b_main"` is user `"a_b"`, type `"main"`.

use std::fmt;

use crate::protocol::constants::{MAIN_STREAM, STREAM_ID_SEPARATOR};

use super::error::RegistryError;

/// Identity of one remote stream (user ID + stream type)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StreamId {
    user_id: String,
    stream_type: String,
}

impl StreamId {
    /// Build a stream ID; an empty stream type means "main"
    pub fn new(user_id: impl Into<String>, stream_type: impl Into<String>) -> Self {
        let stream_type = stream_type.into();
        Self {
            user_id: user_id.into(),
            stream_type: if stream_type.is_empty() {
                MAIN_STREAM.to_string()
            } else {
                stream_type
            },
        }
    }

    /// Main stream of a user
    pub fn main(user_id: impl Into<String>) -> Self {
        Self::new(user_id, MAIN_STREAM)
    }

    /// Parse a stream ID produced by [`StreamId::new`]
    ///
    /// Fails when there is no separator or either side of the last
    /// separator is empty.
    pub fn parse(stream_id: &str) -> Result<Self, RegistryError> {
        let parsed = stream_id
            .rfind(STREAM_ID_SEPARATOR)
            .map(|index| {
                (
                    &stream_id[..index],
                    &stream_id[index + STREAM_ID_SEPARATOR.len_utf8()..],
                )
            })
            .filter(|(user_id, stream_type)| !user_id.is_empty() && !stream_type.is_empty());

        match parsed {
            Some((user_id, stream_type)) => Ok(Self {
                user_id: user_id.to_string(),
                stream_type: stream_type.to_string(),
            }),
            None => {
                tracing::error!(stream_id, "Malformed stream ID");
                Err(RegistryError::InvalidStreamId(stream_id.to_string()))
            }
        }
    }

    /// Owning user ID
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Stream type ("main", "aux", ...)
    pub fn stream_type(&self) -> &str {
        &self.stream_type
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.user_id, STREAM_ID_SEPARATOR, self.stream_type)
    }
}
