//! Pusher and player attribute records
//!
//! Closed records with the host component defaults. Host-specific fields
//! that are not modelled land in the flattened `extra` map, so a JSON patch
//! can carry any key without losing it.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::registry::StreamId;

/// Media mode shared by the pusher and player components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaMode {
    #[serde(rename = "RTC")]
    Rtc,
    #[serde(rename = "live")]
    Live,
    #[serde(rename = "SD")]
    Sd,
    #[serde(rename = "HD")]
    Hd,
    #[serde(rename = "FHD")]
    Fhd,
}

/// Camera used by the pusher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraFacing {
    Front,
    Back,
}

impl CameraFacing {
    /// The other camera
    pub fn toggled(self) -> Self {
        match self {
            CameraFacing::Front => CameraFacing::Back,
            CameraFacing::Back => CameraFacing::Front,
        }
    }
}

/// How video fills the player area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectFit {
    #[serde(rename = "contain")]
    Contain,
    #[serde(rename = "fillCrop")]
    FillCrop,
}

/// Player audio route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoundMode {
    Speaker,
    Ear,
}

/// Which quality of a remote stream is being played
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefinitionType {
    Main,
    Small,
}

impl DefinitionType {
    /// URL marker for this definition
    pub fn as_str(self) -> &'static str {
        match self {
            DefinitionType::Main => "main",
            DefinitionType::Small => "small",
        }
    }

    /// The other definition
    pub fn toggled(self) -> Self {
        match self {
            DefinitionType::Main => DefinitionType::Small,
            DefinitionType::Small => DefinitionType::Main,
        }
    }
}

/// Local pusher configuration and status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PusherAttributes {
    pub url: String,
    pub mode: MediaMode,
    pub autopush: bool,
    pub enable_camera: bool,
    pub enable_mic: bool,
    pub enable_agc: bool,
    pub enable_ans: bool,
    pub enable_ear_monitor: bool,
    pub enable_auto_focus: bool,
    pub enable_zoom: bool,
    pub min_bitrate: u32,
    pub max_bitrate: u32,
    pub video_width: u32,
    pub video_height: u32,
    pub beauty_level: u32,
    pub whiteness_level: u32,
    pub video_orientation: String,
    pub video_aspect: String,
    pub front_camera: CameraFacing,
    pub enable_remote_mirror: bool,
    pub local_mirror: String,
    pub enable_background_mute: bool,
    pub audio_quality: String,
    pub audio_volume_type: String,
    pub audio_reverb_type: u32,
    pub waiting_image: String,
    pub waiting_image_hash: String,
    pub beauty_style: String,
    pub filter: String,
    /// Last network status reported by the host
    pub net_status: Map<String, Value>,
    /// Last capture volume reported by the host
    pub volume: f64,
    /// Host-specific passthrough fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for PusherAttributes {
    fn default() -> Self {
        Self {
            url: String::new(),
            mode: MediaMode::Rtc,
            autopush: false,
            enable_camera: false,
            enable_mic: false,
            enable_agc: false,
            enable_ans: false,
            enable_ear_monitor: false,
            enable_auto_focus: true,
            enable_zoom: false,
            min_bitrate: 600,
            max_bitrate: 900,
            video_width: 360,
            video_height: 640,
            beauty_level: 0,
            whiteness_level: 0,
            video_orientation: "vertical".into(),
            video_aspect: "9:16".into(),
            front_camera: CameraFacing::Front,
            enable_remote_mirror: false,
            local_mirror: "auto".into(),
            enable_background_mute: false,
            audio_quality: "high".into(),
            audio_volume_type: "voicecall".into(),
            audio_reverb_type: 0,
            waiting_image: String::new(),
            waiting_image_hash: String::new(),
            beauty_style: "smooth".into(),
            filter: String::new(),
            net_status: Map::new(),
            volume: 0.0,
            extra: Map::new(),
        }
    }
}

impl PusherAttributes {
    /// Defaults overlaid with a JSON patch
    pub fn from_patch(patch: &Map<String, Value>) -> Result<Self> {
        let mut attributes = Self::default();
        apply_patch(&mut attributes, patch)?;
        Ok(attributes)
    }
}

/// Remote player configuration and status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerAttributes {
    pub src: String,
    pub mode: MediaMode,
    pub autoplay: bool,
    pub mute_audio: bool,
    pub mute_video: bool,
    pub orientation: String,
    pub object_fit: ObjectFit,
    pub enable_background_mute: bool,
    pub min_cache: f64,
    pub max_cache: f64,
    pub sound_mode: SoundMode,
    pub enable_recv_message: bool,
    pub auto_pause_if_navigate: bool,
    pub auto_pause_if_open_native: bool,
    pub is_visible: bool,
    #[serde(rename = "_definitionType")]
    pub definition_type: DefinitionType,
    /// Last network status reported by the host
    pub net_status: Map<String, Value>,
    #[serde(rename = "userID")]
    pub user_id: String,
    pub stream_type: String,
    #[serde(rename = "streamID")]
    pub stream_id: String,
    /// Host component ID; equals the stream ID
    pub id: String,
    pub has_video: bool,
    pub has_audio: bool,
    pub volume: f64,
    /// Host-specific passthrough fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for PlayerAttributes {
    fn default() -> Self {
        Self {
            src: String::new(),
            mode: MediaMode::Rtc,
            autoplay: true,
            mute_audio: false,
            mute_video: false,
            orientation: "vertical".into(),
            object_fit: ObjectFit::FillCrop,
            enable_background_mute: false,
            min_cache: 1.0,
            max_cache: 2.0,
            sound_mode: SoundMode::Speaker,
            enable_recv_message: false,
            auto_pause_if_navigate: true,
            auto_pause_if_open_native: true,
            is_visible: true,
            definition_type: DefinitionType::Main,
            net_status: Map::new(),
            user_id: String::new(),
            stream_type: String::new(),
            stream_id: String::new(),
            id: String::new(),
            has_video: false,
            has_audio: false,
            volume: 0.0,
            extra: Map::new(),
        }
    }
}

impl PlayerAttributes {
    /// Defaults addressed to a stream
    pub fn for_stream(id: &StreamId) -> Self {
        let stream_id = id.to_string();
        Self {
            user_id: id.user_id().to_string(),
            stream_type: id.stream_type().to_string(),
            id: stream_id.clone(),
            stream_id,
            ..Default::default()
        }
    }

    /// Set the play URL
    pub fn with_src(mut self, src: impl Into<String>) -> Self {
        self.src = src.into();
        self
    }

    /// Identity of the stream this record describes
    pub fn stream(&self) -> StreamId {
        StreamId::new(self.user_id.clone(), self.stream_type.clone())
    }
}

/// Merge a JSON object onto a record
///
/// Keys replace fields of the same wire name; unknown keys go to `extra`.
/// On a type mismatch the record is left unchanged.
pub fn apply_patch<T>(target: &mut T, patch: &Map<String, Value>) -> Result<()>
where
    T: Serialize + DeserializeOwned,
{
    if patch.is_empty() {
        return Ok(());
    }

    let mut merged = serde_json::to_value(&*target).map_err(Error::Attributes)?;
    if let Value::Object(fields) = &mut merged {
        for (key, value) in patch {
            fields.insert(key.clone(), value.clone());
        }
    }

    *target = serde_json::from_value(merged).map_err(Error::Attributes)?;
    Ok(())
}
