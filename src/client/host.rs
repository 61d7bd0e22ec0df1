//! Host runtime capability
//!
//! The host owns capture, encoding, transport and rendering. It hands out
//! opaque pusher/player contexts whose methods complete through optional
//! `success` / `fail` / `complete` callbacks.
//!
//! Promise-style operations (full screen, snapshot, saving to the photo
//! album) are wrapped in [`PendingCall`], a future that resolves exactly
//! once from whichever callback the host invokes first.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use serde_json::Value;
use tokio::sync::oneshot;

use crate::error::{Error, Result};

/// Opaque result object passed to host callbacks
pub type HostPayload = Value;

/// Host completion callback
pub type Callback = Box<dyn FnOnce(HostPayload) + Send + 'static>;

/// Optional completion callbacks for a host call
#[derive(Default)]
pub struct CallbackOptions {
    pub success: Option<Callback>,
    pub fail: Option<Callback>,
    pub complete: Option<Callback>,
}

impl CallbackOptions {
    /// No callbacks (fire-and-forget)
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the success callback
    pub fn on_success(mut self, f: impl FnOnce(HostPayload) + Send + 'static) -> Self {
        self.success = Some(Box::new(f));
        self
    }

    /// Set the failure callback
    pub fn on_fail(mut self, f: impl FnOnce(HostPayload) + Send + 'static) -> Self {
        self.fail = Some(Box::new(f));
        self
    }

    /// Set the completion callback (runs after success or fail)
    pub fn on_complete(mut self, f: impl FnOnce(HostPayload) + Send + 'static) -> Self {
        self.complete = Some(Box::new(f));
        self
    }

    /// Report success to the caller (host side)
    pub fn succeed(self, payload: HostPayload) {
        if let Some(success) = self.success {
            success(payload.clone());
        }
        if let Some(complete) = self.complete {
            complete(payload);
        }
    }

    /// Report failure to the caller (host side)
    pub fn fail(self, payload: HostPayload) {
        if let Some(fail) = self.fail {
            fail(payload.clone());
        }
        if let Some(complete) = self.complete {
            complete(payload);
        }
    }
}

impl fmt::Debug for CallbackOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackOptions")
            .field("success", &self.success.is_some())
            .field("fail", &self.fail.is_some())
            .field("complete", &self.complete.is_some())
            .finish()
    }
}

/// Host pusher context
pub trait PusherContext: Send {
    fn start(&mut self, options: CallbackOptions);
    fn stop(&mut self, options: CallbackOptions);
    fn pause(&mut self, options: CallbackOptions);
    fn resume(&mut self, options: CallbackOptions);
    fn switch_camera(&mut self, options: CallbackOptions);
    fn snapshot(&mut self, quality: &str, options: CallbackOptions);
    fn toggle_torch(&mut self, options: CallbackOptions);
    fn play_bgm(&mut self, url: &str, options: CallbackOptions);
    fn pause_bgm(&mut self, options: CallbackOptions);
    fn resume_bgm(&mut self, options: CallbackOptions);
    fn stop_bgm(&mut self, options: CallbackOptions);
    fn set_bgm_volume(&mut self, volume: f64, options: CallbackOptions);
    fn set_mic_volume(&mut self, volume: f64, options: CallbackOptions);
    fn start_preview(&mut self, options: CallbackOptions);
    fn stop_preview(&mut self, options: CallbackOptions);
    fn send_message(&mut self, msg: &str, options: CallbackOptions);
    fn start_dump_audio(&mut self, options: CallbackOptions);
    fn stop_dump_audio(&mut self, options: CallbackOptions);
}

/// Host player context, one per player component
pub trait PlayerContext: Send {
    fn play(&mut self, options: CallbackOptions);
    fn stop(&mut self, options: CallbackOptions);
    fn mute(&mut self, options: CallbackOptions);
    fn pause(&mut self, options: CallbackOptions);
    fn resume(&mut self, options: CallbackOptions);
    fn request_full_screen(&mut self, direction: i32, options: CallbackOptions);
    fn exit_full_screen(&mut self, options: CallbackOptions);
    fn snapshot(&mut self, quality: &str, options: CallbackOptions);
}

/// Capability provider for contexts and photo-album access
pub trait HostRuntime: Send + Sync {
    /// Create the context for the page's pusher component
    fn create_pusher_context(&self) -> Box<dyn PusherContext>;

    /// Create the context for the player component with this ID
    fn create_player_context(&self, player_id: &str) -> Box<dyn PlayerContext>;

    /// Save an image file to the user's photo album
    fn save_image_to_photos_album(&self, file_path: &str, options: CallbackOptions);
}

/// Future for a one-shot host call
///
/// Resolves with the success payload, or an error built from the failure
/// payload. Dropping it discards the outcome; the host call is not
/// cancelled.
#[derive(Debug)]
pub struct PendingCall<T = HostPayload> {
    op: &'static str,
    rx: oneshot::Receiver<Result<T>>,
}

impl<T> PendingCall<T> {
    /// Operation name, for logging
    pub fn op(&self) -> &'static str {
        self.op
    }
}

impl<T> Future for PendingCall<T> {
    type Output = Result<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let op = self.op;
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(_)) => Poll::Ready(Err(Error::HostDropped(op))),
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Sender shared by the callbacks of one call; first caller wins
#[derive(Clone)]
struct Resolver<T> {
    tx: Arc<Mutex<Option<oneshot::Sender<Result<T>>>>>,
}

impl<T> Resolver<T> {
    fn new() -> (Self, oneshot::Receiver<Result<T>>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                tx: Arc::new(Mutex::new(Some(tx))),
            },
            rx,
        )
    }

    fn resolve(&self, result: Result<T>) {
        let sender = match self.tx.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(tx) = sender {
            // Receiver may already be gone; the outcome is then discarded.
            let _ = tx.send(result);
        }
    }
}

/// Callbacks and future for a success/fail host call
pub fn one_shot(op: &'static str) -> (CallbackOptions, PendingCall) {
    let (resolver, rx) = Resolver::new();
    let on_fail = resolver.clone();

    let options = CallbackOptions::new()
        .on_success(move |payload| resolver.resolve(Ok(payload)))
        .on_fail(move |payload| on_fail.resolve(Err(Error::Host { op, payload })));

    (options, PendingCall { op, rx })
}

/// Callbacks and future for a snapshot
///
/// Snapshots resolve from `complete`: an image path means success, anything
/// else is [`Error::SnapshotFailed`].
pub fn snapshot_call() -> (CallbackOptions, PendingCall<String>) {
    let (resolver, rx) = Resolver::new();

    let options = CallbackOptions::new().on_complete(move |payload| {
        let path = payload
            .get("tempImagePath")
            .and_then(Value::as_str)
            .filter(|path| !path.is_empty())
            .map(str::to_string);

        resolver.resolve(path.ok_or(Error::SnapshotFailed));
    });

    (options, PendingCall { op: "snapshot", rx })
}

/// Take a snapshot and save it to the photo album
///
/// Failures are logged and otherwise ignored.
pub async fn save_snapshot(host: Arc<dyn HostRuntime>, snapshot: PendingCall<String>) {
    let path = match snapshot.await {
        Ok(path) => path,
        Err(e) => {
            tracing::debug!(error = %e, "Snapshot not saved");
            return;
        }
    };

    let (options, saved) = one_shot("saveImageToPhotosAlbum");
    host.save_image_to_photos_album(&path, options);

    match saved.await {
        Ok(_) => tracing::debug!(path = %path, "Snapshot saved to photo album"),
        Err(e) => tracing::debug!(path = %path, error = %e, "Snapshot not saved"),
    }
}
