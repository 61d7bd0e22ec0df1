//! Local stream pusher
//!
//! High-level handle over the host pusher context. There is at most one per
//! session; control calls forward 1:1 to the host.
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use liveroom_rs::client::{CallbackOptions, HostRuntime, Pusher, PusherAttributes};
//!
//! # fn example(host: Arc<dyn HostRuntime>) -> liveroom_rs::error::Result<()> {
//! let mut pusher = Pusher::new(PusherAttributes::default(), host);
//! pusher.start(CallbackOptions::new().on_fail(|payload| {
//!     eprintln!("push failed: {payload}");
//! }))?;
//! pusher.switch_camera(CallbackOptions::new())?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::{Error, Result};

use super::attributes::{apply_patch, PusherAttributes};
use super::binding::Binding;
use super::host::{self, CallbackOptions, HostRuntime, PendingCall, PusherContext};
use super::player::DEFAULT_SNAPSHOT_QUALITY;

/// Handle for the local outbound stream
pub struct Pusher {
    attributes: PusherAttributes,
    host: Arc<dyn HostRuntime>,
    context: Binding<dyn PusherContext>,
    snapshot_quality: String,
}

impl Pusher {
    /// Create an unbound pusher
    pub fn new(attributes: PusherAttributes, host: Arc<dyn HostRuntime>) -> Self {
        Self {
            attributes,
            host,
            context: Binding::Unbound,
            snapshot_quality: DEFAULT_SNAPSHOT_QUALITY.to_string(),
        }
    }

    /// Set the quality passed to host snapshots
    pub fn with_snapshot_quality(mut self, quality: impl Into<String>) -> Self {
        self.snapshot_quality = quality.into();
        self
    }

    /// Current attribute record
    pub fn attributes(&self) -> &PusherAttributes {
        &self.attributes
    }

    /// Mutable attribute record
    pub fn attributes_mut(&mut self) -> &mut PusherAttributes {
        &mut self.attributes
    }

    /// Merge a JSON patch onto the attributes
    pub fn set_attributes(&mut self, patch: &Map<String, Value>) -> Result<()> {
        apply_patch(&mut self.attributes, patch)
    }

    /// Whether a host context is bound
    pub fn is_bound(&self) -> bool {
        self.context.is_bound()
    }

    /// Whether the pusher was reset
    pub fn is_released(&self) -> bool {
        self.context.is_released()
    }

    /// Apply a network status report
    ///
    /// Known keys of `info` (e.g. `videoWidth`) update the record and the
    /// whole map is kept as `netStatus`.
    pub fn apply_net_status(&mut self, info: Map<String, Value>) {
        let mut patch = info.clone();
        patch.insert("netStatus".to_string(), Value::Object(info.clone()));

        if let Err(e) = apply_patch(&mut self.attributes, &patch) {
            tracing::warn!(error = %e, "Pusher net status did not fit attributes");
            self.attributes.net_status = info;
        }
    }

    /// Store the last capture volume reported by the host
    pub fn set_volume(&mut self, volume: f64) {
        self.attributes.volume = volume;
    }

    fn context(&mut self) -> Result<&mut (dyn PusherContext + 'static)> {
        let host = &self.host;

        self.context
            .ensure_bound(|| {
                tracing::debug!("Binding pusher context");
                host.create_pusher_context()
            })
            .ok_or(Error::HandleReleased("pusher"))
    }

    pub fn start(&mut self, options: CallbackOptions) -> Result<()> {
        self.context()?.start(options);
        Ok(())
    }

    pub fn stop(&mut self, options: CallbackOptions) -> Result<()> {
        self.context()?.stop(options);
        Ok(())
    }

    pub fn pause(&mut self, options: CallbackOptions) -> Result<()> {
        self.context()?.pause(options);
        Ok(())
    }

    pub fn resume(&mut self, options: CallbackOptions) -> Result<()> {
        self.context()?.resume(options);
        Ok(())
    }

    /// Switch camera; `frontCamera` flips before the host confirms
    pub fn switch_camera(&mut self, options: CallbackOptions) -> Result<()> {
        self.context()?.switch_camera(options);
        self.attributes.front_camera = self.attributes.front_camera.toggled();

        tracing::debug!(camera = ?self.attributes.front_camera, "Switched camera");
        Ok(())
    }

    /// Capture the local preview; resolves with the temporary image path
    pub fn snapshot(&mut self) -> Result<PendingCall<String>> {
        let (options, call) = host::snapshot_call();
        let quality = self.snapshot_quality.clone();
        self.context()?.snapshot(&quality, options);
        Ok(call)
    }

    pub fn toggle_torch(&mut self, options: CallbackOptions) -> Result<()> {
        self.context()?.toggle_torch(options);
        Ok(())
    }

    /// Start background music from a URL
    pub fn play_bgm(&mut self, url: &str, options: CallbackOptions) -> Result<()> {
        self.context()?.play_bgm(url, options);
        Ok(())
    }

    pub fn pause_bgm(&mut self, options: CallbackOptions) -> Result<()> {
        self.context()?.pause_bgm(options);
        Ok(())
    }

    pub fn resume_bgm(&mut self, options: CallbackOptions) -> Result<()> {
        self.context()?.resume_bgm(options);
        Ok(())
    }

    pub fn stop_bgm(&mut self, options: CallbackOptions) -> Result<()> {
        self.context()?.stop_bgm(options);
        Ok(())
    }

    /// Set background music volume (0.0 - 1.0)
    pub fn set_bgm_volume(&mut self, volume: f64, options: CallbackOptions) -> Result<()> {
        self.context()?.set_bgm_volume(volume, options);
        Ok(())
    }

    /// Set microphone volume (0.0 - 1.0)
    pub fn set_mic_volume(&mut self, volume: f64, options: CallbackOptions) -> Result<()> {
        self.context()?.set_mic_volume(volume, options);
        Ok(())
    }

    pub fn start_preview(&mut self, options: CallbackOptions) -> Result<()> {
        self.context()?.start_preview(options);
        Ok(())
    }

    pub fn stop_preview(&mut self, options: CallbackOptions) -> Result<()> {
        self.context()?.stop_preview(options);
        Ok(())
    }

    /// Send a custom message over the push stream
    pub fn send_message(&mut self, msg: &str, options: CallbackOptions) -> Result<()> {
        self.context()?.send_message(msg, options);
        Ok(())
    }

    pub fn start_dump_audio(&mut self, options: CallbackOptions) -> Result<()> {
        self.context()?.start_dump_audio(options);
        Ok(())
    }

    pub fn stop_dump_audio(&mut self, options: CallbackOptions) -> Result<()> {
        self.context()?.stop_dump_audio(options);
        Ok(())
    }

    /// Restore default attributes and stop the bound context
    ///
    /// The stop is not awaited. The pusher is inert afterwards.
    pub fn reset(&mut self) {
        if let Some(mut context) = self.context.release() {
            context.stop(CallbackOptions::new());
        }
        self.attributes = PusherAttributes::default();

        tracing::debug!("Pusher reset");
    }
}

impl std::fmt::Debug for Pusher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pusher")
            .field("attributes", &self.attributes)
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::attributes::CameraFacing;
    use crate::testing::MockHost;
    use serde_json::json;

    fn pusher(host: &Arc<MockHost>) -> Pusher {
        Pusher::new(PusherAttributes::default(), host.clone())
    }

    #[test]
    fn test_forwards_to_single_context() {
        let host = MockHost::new();
        let mut pusher = pusher(&host);

        pusher.start(CallbackOptions::new()).unwrap();
        pusher.play_bgm("https://bgm/a.mp3", CallbackOptions::new()).unwrap();
        pusher.set_mic_volume(0.5, CallbackOptions::new()).unwrap();
        pusher.send_message("hello", CallbackOptions::new()).unwrap();
        pusher.stop_dump_audio(CallbackOptions::new()).unwrap();

        assert_eq!(host.pushers_created(), 1);
        assert_eq!(
            host.calls(),
            vec![
                "pusher:start",
                "pusher:playBGM(https://bgm/a.mp3)",
                "pusher:setMICVolume(0.5)",
                "pusher:sendMessage(hello)",
                "pusher:stopDumpAudio",
            ]
        );
    }

    #[test]
    fn test_callbacks_reach_caller() {
        let host = MockHost::new();
        let mut pusher = pusher(&host);
        let (tx, rx) = std::sync::mpsc::channel();

        pusher
            .toggle_torch(CallbackOptions::new().on_success(move |payload| {
                tx.send(payload).unwrap();
            }))
            .unwrap();

        assert_eq!(rx.recv().unwrap()["errMsg"], "pusher:toggleTorch:ok");
    }

    #[test]
    fn test_switch_camera_flips() {
        let host = MockHost::new();
        let mut pusher = pusher(&host);

        pusher.switch_camera(CallbackOptions::new()).unwrap();
        assert_eq!(pusher.attributes().front_camera, CameraFacing::Back);

        pusher.switch_camera(CallbackOptions::new()).unwrap();
        assert_eq!(pusher.attributes().front_camera, CameraFacing::Front);
        assert_eq!(host.count("pusher:switchCamera"), 2);
    }

    #[test]
    fn test_reset() {
        let host = MockHost::new();
        let mut pusher = pusher(&host);
        pusher
            .set_attributes(json!({ "enableCamera": true }).as_object().unwrap())
            .unwrap();
        pusher.start(CallbackOptions::new()).unwrap();

        pusher.reset();

        assert_eq!(pusher.attributes(), &PusherAttributes::default());
        assert_eq!(host.count("pusher:stop"), 1);
        assert!(matches!(
            pusher.switch_camera(CallbackOptions::new()),
            Err(Error::HandleReleased("pusher"))
        ));
        assert_eq!(pusher.attributes().front_camera, CameraFacing::Front);
    }

    #[test]
    fn test_net_status() {
        let host = MockHost::new();
        let mut pusher = pusher(&host);

        let info = json!({ "videoWidth": 540, "netSpeed": 1200 });
        pusher.apply_net_status(info.as_object().unwrap().clone());

        assert_eq!(pusher.attributes().video_width, 540);
        assert_eq!(pusher.attributes().net_status["netSpeed"], 1200);
        assert_eq!(pusher.attributes().extra["netSpeed"], 1200);

        let info = json!({ "videoWidth": "wide" });
        pusher.apply_net_status(info.as_object().unwrap().clone());
        assert_eq!(pusher.attributes().video_width, 540);
        assert_eq!(pusher.attributes().net_status["videoWidth"], "wide");
    }

    #[tokio::test]
    async fn test_snapshot() {
        let host = MockHost::new();
        let mut pusher = pusher(&host);

        let path = pusher.snapshot().unwrap().await.unwrap();
        assert_eq!(path, "/tmp/pusher:snapshot(raw).jpg");
    }
}
