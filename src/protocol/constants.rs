//! Host status codes
//!
//! Numeric codes emitted by the host pusher component through its
//! `statechange` event.

// Success / no-op
pub const CODE_OK: i32 = 0;

// Informational codes
pub const PUSH_SERVER_CONNECTED: i32 = 1001;
pub const PUSH_STARTED: i32 = 1002;
pub const CAMERA_OPENED: i32 = 1003;
pub const SCREEN_RECORDING_STARTED: i32 = 1004;
pub const PUSH_RESOLUTION_CHANGED: i32 = 1005;
pub const PUSH_BITRATE_CHANGED: i32 = 1006;
pub const FIRST_FRAME_CAPTURED: i32 = 1007;
pub const ENCODER_STARTED: i32 = 1008;
pub const FIRST_FRAME_RENDERED: i32 = 1009;
pub const ROOM_JOINED: i32 = 1018;
pub const EXIT_ROOM: i32 = 1019;
pub const NET_TYPE_CHANGED: i32 = 1021;
pub const LOCAL_VIDEO_PLAYING: i32 = 2004;
pub const LOCAL_VIDEO_LOADING: i32 = 2007;
pub const APP_SUSPENDED: i32 = 5000;
pub const FLOATING_WINDOW_CLOSED: i32 = 5001;

// User-list codes (JSON payload in the message)
pub const USER_LIST_JOIN: i32 = 1031;
pub const USER_LIST_LEAVE: i32 = 1032;
pub const USER_LIST_VIDEO: i32 = 1033;
pub const USER_LIST_AUDIO: i32 = 1034;

// Error codes
pub const CAMERA_OPEN_FAILED: i32 = -1301;
pub const MICROPHONE_OPEN_FAILED: i32 = -1302;
pub const VIDEO_ENCODE_FAILED: i32 = -1303;
pub const AUDIO_ENCODE_FAILED: i32 = -1304;
pub const PUSH_DISCONNECTED: i32 = -1307;
/// Shared by "invalid user signature" and "join room failed"
pub const JOIN_ROOM_FAILED: i32 = -100018;

/// Substring in an exit-room message that marks a kick
pub const KICK_MARKER: &str = "reason[0]";

/// Stream type used when a payload item omits one
pub const MAIN_STREAM: &str = "main";

/// Screen-share stream type; video-only
pub const AUX_STREAM: &str = "aux";

/// Separator between user ID and stream type in a stream ID
pub const STREAM_ID_SEPARATOR: char = '_';
