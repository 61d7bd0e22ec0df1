//! Status code decoder
//!
//! Maps a host status code and its message to a domain signal. Pure apart
//! from logging; user-list codes (1031..=1034) are not handled here, see
//! [`UserListOp`].

use super::constants::*;

/// Domain signal carried by a status code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Local user entered the room
    LocalJoin,
    /// Local user was removed from the room by the server
    KickedOut,
    /// A known failure code
    Error {
        /// Fixed human-readable reason for the code
        reason: &'static str,
    },
}

/// Outcome of decoding a status code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded {
    /// The code propagates as a domain signal
    Signal(Signal),
    /// Known code that is only logged
    Informational,
    /// Code outside every table; callers ignore it
    Unrecognized,
}

impl Decoded {
    /// The signal, if the code carries one
    pub fn signal(self) -> Option<Signal> {
        match self {
            Decoded::Signal(signal) => Some(signal),
            _ => None,
        }
    }

    /// Whether the code appears in one of the decoder tables
    pub fn is_recognized(self) -> bool {
        !matches!(self, Decoded::Unrecognized)
    }
}

/// Reconciliation operation selected by a user-list code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserListOp {
    /// Remote users entered the room
    Join,
    /// Remote users left the room
    Leave,
    /// Remote video availability changed
    VideoUpdate,
    /// Remote audio availability changed
    AudioUpdate,
}

impl UserListOp {
    /// Map a status code to its reconciliation operation
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            USER_LIST_JOIN => Some(UserListOp::Join),
            USER_LIST_LEAVE => Some(UserListOp::Leave),
            USER_LIST_VIDEO => Some(UserListOp::VideoUpdate),
            USER_LIST_AUDIO => Some(UserListOp::AudioUpdate),
            _ => None,
        }
    }

    /// The status code for this operation
    pub fn code(self) -> i32 {
        match self {
            UserListOp::Join => USER_LIST_JOIN,
            UserListOp::Leave => USER_LIST_LEAVE,
            UserListOp::VideoUpdate => USER_LIST_VIDEO,
            UserListOp::AudioUpdate => USER_LIST_AUDIO,
        }
    }
}

/// Reason for a code in the error set
pub fn error_reason(code: i32) -> Option<&'static str> {
    match code {
        CAMERA_OPEN_FAILED => Some("Failed to open camera"),
        MICROPHONE_OPEN_FAILED => Some("Failed to open microphone"),
        VIDEO_ENCODE_FAILED => Some("Video encoding failed"),
        AUDIO_ENCODE_FAILED => Some("Audio encoding failed"),
        PUSH_DISCONNECTED => Some("Push stream disconnected"),
        JOIN_ROOM_FAILED => Some("Failed to join room"),
        _ => None,
    }
}

/// Description for a code in the informational table
pub fn info_reason(code: i32) -> Option<&'static str> {
    match code {
        PUSH_SERVER_CONNECTED => Some("Connected to push server"),
        PUSH_STARTED => Some("Handshake complete, pushing started"),
        CAMERA_OPENED => Some("Camera opened"),
        SCREEN_RECORDING_STARTED => Some("Screen recording started"),
        PUSH_RESOLUTION_CHANGED => Some("Push resolution adjusted"),
        PUSH_BITRATE_CHANGED => Some("Push bitrate adjusted"),
        FIRST_FRAME_CAPTURED => Some("First frame captured"),
        ENCODER_STARTED => Some("Encoder started"),
        FIRST_FRAME_RENDERED => Some("First video frame rendered"),
        ROOM_JOINED => Some("Entered room"),
        EXIT_ROOM => Some("Exited room"),
        NET_TYPE_CHANGED => Some("Network type changed, room must be re-entered"),
        LOCAL_VIDEO_PLAYING => Some("Local video playback started"),
        LOCAL_VIDEO_LOADING => Some("Local video loading"),
        APP_SUSPENDED => Some("App suspended"),
        FLOATING_WINDOW_CLOSED => Some("Floating window closed"),
        _ => None,
    }
}

/// Whether an exit-room message marks a kick
pub fn is_kick_message(message: &str) -> bool {
    message.contains(KICK_MARKER)
}

/// Decode a host status code
pub fn decode(code: i32, message: &str) -> Decoded {
    if code == CODE_OK {
        tracing::debug!(code, msg = message, "Status ok");
        return Decoded::Informational;
    }

    if let Some(reason) = error_reason(code) {
        tracing::error!(code, reason, "Host error status");
        return Decoded::Signal(Signal::Error { reason });
    }

    if code == EXIT_ROOM && is_kick_message(message) {
        tracing::info!(code, msg = message, "Kicked out of room");
        return Decoded::Signal(Signal::KickedOut);
    }

    if let Some(reason) = info_reason(code) {
        tracing::debug!(code, reason, msg = message, "Host status");
        if code == ROOM_JOINED {
            return Decoded::Signal(Signal::LocalJoin);
        }
        return Decoded::Informational;
    }

    tracing::trace!(code, "Unrecognized status code");
    Decoded::Unrecognized
}
