//! Remote stream handle
//!
//! A [`Player`] wraps the attribute record of one remote stream and the host
//! player context bound to it. The context is created on the first control
//! call, keyed by the record's `id`, and cached until [`Player::reset`].

use std::future::Future;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::registry::StreamId;

use super::attributes::{apply_patch, PlayerAttributes};
use super::binding::Binding;
use super::host::{self, CallbackOptions, HostRuntime, PendingCall, PlayerContext};

/// Default snapshot quality passed to the host
pub const DEFAULT_SNAPSHOT_QUALITY: &str = "raw";

/// Handle for one remote stream
pub struct Player {
    attributes: PlayerAttributes,
    host: Arc<dyn HostRuntime>,
    context: Binding<dyn PlayerContext>,
    snapshot_quality: String,
}

impl Player {
    /// Create an unbound handle
    pub fn new(attributes: PlayerAttributes, host: Arc<dyn HostRuntime>) -> Self {
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

    /// Stream identity
    pub fn stream_id(&self) -> StreamId {
        self.attributes.stream()
    }

    /// Current attribute record
    pub fn attributes(&self) -> &PlayerAttributes {
        &self.attributes
    }

    /// Mutable attribute record
    pub fn attributes_mut(&mut self) -> &mut PlayerAttributes {
        &mut self.attributes
    }

    /// Merge a JSON patch onto the attributes
    ///
    /// Identity fields (`id`, `userID`, `streamID`, `streamType`) are kept.
    pub fn set_attributes(&mut self, patch: &Map<String, Value>) -> Result<()> {
        let identity = self.attributes.clone();
        apply_patch(&mut self.attributes, patch)?;

        self.attributes.id = identity.id;
        self.attributes.user_id = identity.user_id;
        self.attributes.stream_id = identity.stream_id;
        self.attributes.stream_type = identity.stream_type;
        Ok(())
    }

    pub fn has_video(&self) -> bool {
        self.attributes.has_video
    }

    pub fn has_audio(&self) -> bool {
        self.attributes.has_audio
    }

    /// Whether a host context is bound
    pub fn is_bound(&self) -> bool {
        self.context.is_bound()
    }

    /// Whether the handle was reset
    pub fn is_released(&self) -> bool {
        self.context.is_released()
    }

    /// Store the last network status reported for this stream
    pub fn apply_net_status(&mut self, info: Map<String, Value>) {
        self.attributes.net_status = info;
    }

    /// Store the last playback volume reported for this stream
    pub fn set_volume(&mut self, volume: f64) {
        self.attributes.volume = volume;
    }

    /// Toggle between the main and small definitions
    ///
    /// The first occurrence of the current definition in `src` is rewritten.
    pub fn switch_definition(&mut self) {
        let from = self.attributes.definition_type;
        let to = from.toggled();

        self.attributes.src = self.attributes.src.replacen(from.as_str(), to.as_str(), 1);
        self.attributes.definition_type = to;

        tracing::debug!(
            stream_id = %self.attributes.id,
            definition = to.as_str(),
            "Switched stream definition"
        );
    }

    fn context(&mut self) -> Result<&mut (dyn PlayerContext + 'static)> {
        let host = &self.host;
        let id = &self.attributes.id;

        self.context
            .ensure_bound(|| {
                tracing::debug!(stream_id = %id, "Binding player context");
                host.create_player_context(id)
            })
            .ok_or(Error::HandleReleased("player"))
    }

    pub fn play(&mut self, options: CallbackOptions) -> Result<()> {
        self.context()?.play(options);
        Ok(())
    }

    pub fn stop(&mut self, options: CallbackOptions) -> Result<()> {
        self.context()?.stop(options);
        Ok(())
    }

    pub fn mute(&mut self, options: CallbackOptions) -> Result<()> {
        self.context()?.mute(options);
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

    /// Enter full screen; `direction` is the rotation in degrees
    pub fn request_full_screen(&mut self, direction: i32) -> Result<PendingCall> {
        let (options, call) = host::one_shot("requestFullScreen");
        self.context()?.request_full_screen(direction, options);
        Ok(call)
    }

    pub fn exit_full_screen(&mut self) -> Result<PendingCall> {
        let (options, call) = host::one_shot("exitFullScreen");
        self.context()?.exit_full_screen(options);
        Ok(call)
    }

    /// Capture the current frame; resolves with the temporary image path
    pub fn snapshot(&mut self) -> Result<PendingCall<String>> {
        let (options, call) = host::snapshot_call();
        let quality = self.snapshot_quality.clone();
        self.context()?.snapshot(&quality, options);
        Ok(call)
    }

    /// Capture the current frame and save it to the photo album
    ///
    /// The returned future never fails; host failures are logged.
    pub fn save_snapshot(&mut self) -> Result<impl Future<Output = ()> + Send + 'static> {
        let snapshot = self.snapshot()?;
        Ok(host::save_snapshot(self.host.clone(), snapshot))
    }

    /// Stop and release the host context, restore default attributes
    ///
    /// The handle is inert afterwards: control calls fail with
    /// [`Error::HandleReleased`].
    pub fn reset(&mut self) {
        let stream_id = self.stream_id();

        if let Some(mut context) = self.context.release() {
            context.stop(CallbackOptions::new());
        }
        self.attributes = PlayerAttributes::for_stream(&stream_id);

        tracing::debug!(stream_id = %stream_id, "Player reset");
    }
}

impl std::fmt::Debug for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("attributes", &self.attributes)
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}
