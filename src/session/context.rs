//! Raw host event shapes
//!
//! Payloads as delivered by the host component callbacks. All of them
//! deserialize from the host JSON; the constructors exist for hosts that
//! build events natively.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Pusher `statechange` event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEvent {
    pub detail: StatusDetail,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusDetail {
    pub code: i32,
    #[serde(default)]
    pub message: String,
}

impl StatusEvent {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            detail: StatusDetail {
                code,
                message: message.into(),
            },
        }
    }
}

/// Pusher `error` event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEvent {
    pub detail: ErrorDetail,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetail {
    pub err_code: i32,
    #[serde(default)]
    pub err_msg: String,
}

impl ErrorEvent {
    pub fn new(err_code: i32, err_msg: impl Into<String>) -> Self {
        Self {
            detail: ErrorDetail {
                err_code,
                err_msg: err_msg.into(),
            },
        }
    }
}

/// Pusher or player `netstatus` event
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NetStatusEvent {
    #[serde(default)]
    pub detail: NetStatusDetail,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NetStatusDetail {
    #[serde(default)]
    pub info: Map<String, Value>,
}

impl NetStatusEvent {
    pub fn new(info: Map<String, Value>) -> Self {
        Self {
            detail: NetStatusDetail { info },
        }
    }
}

/// Pusher or player `audiovolumenotify` event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeEvent {
    pub detail: VolumeDetail,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeDetail {
    pub volume: f64,
}

impl VolumeEvent {
    pub fn new(volume: f64) -> Self {
        Self {
            detail: VolumeDetail { volume },
        }
    }
}

/// Event raised by one player component
///
/// The originating stream is `currentTarget.dataset.streamid`; the
/// payload differs per event and is kept as raw JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerEvent {
    pub current_target: CurrentTarget,
    #[serde(default)]
    pub detail: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentTarget {
    pub dataset: Dataset,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub streamid: String,
}

impl PlayerEvent {
    pub fn new(stream_id: impl Into<String>, detail: Value) -> Self {
        Self {
            current_target: CurrentTarget {
                dataset: Dataset {
                    streamid: stream_id.into(),
                },
            },
            detail,
        }
    }

    /// Stream ID of the originating player
    pub fn stream_id(&self) -> &str {
        &self.current_target.dataset.streamid
    }

    /// Status code in the detail, if any
    pub fn code(&self) -> Option<i64> {
        self.detail.get("code").and_then(Value::as_i64)
    }

    /// `detail.info` as a map (empty when absent)
    pub fn info(&self) -> Map<String, Value> {
        self.detail
            .get("info")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default()
    }

    /// `detail.volume`, if numeric
    pub fn volume(&self) -> Option<f64> {
        self.detail.get("volume").and_then(Value::as_f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_event_from_host_json() {
        let event: StatusEvent =
            serde_json::from_value(json!({ "detail": { "code": 1019, "message": "bye" } })).unwrap();
        assert_eq!(event, StatusEvent::new(1019, "bye"));

        let event: StatusEvent = serde_json::from_value(json!({ "detail": { "code": 0 } })).unwrap();
        assert_eq!(event.detail.message, "");
    }

    #[test]
    fn test_error_event_wire_names() {
        let event: ErrorEvent =
            serde_json::from_value(json!({ "detail": { "errCode": -1301, "errMsg": "no camera" } }))
                .unwrap();
        assert_eq!(event.detail.err_code, -1301);
        assert_eq!(event.detail.err_msg, "no camera");
    }

    #[test]
    fn test_player_event_accessors() {
        let event: PlayerEvent = serde_json::from_value(json!({
            "currentTarget": { "dataset": { "streamid": "u1_main" } },
            "detail": { "code": 2004, "info": { "videoBitrate": 800 }, "volume": 42 }
        }))
        .unwrap();

        assert_eq!(event.stream_id(), "u1_main");
        assert_eq!(event.code(), Some(2004));
        assert_eq!(event.info()["videoBitrate"], 800);
        assert_eq!(event.volume(), Some(42.0));

        let bare = PlayerEvent::new("u1_aux", Value::Null);
        assert!(bare.info().is_empty());
        assert_eq!(bare.volume(), None);
    }
}
