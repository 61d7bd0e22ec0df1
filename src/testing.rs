//! Recording host runtime for unit tests
//!
//! Every context call is appended to a shared log as `player:<id>:<op>`,
//! `pusher:<op>` or `album:<path>` and completes immediately.

use std::sync::{Arc, Mutex};

use serde_json::json;

use crate::client::host::{CallbackOptions, HostRuntime, PlayerContext, PusherContext};

#[derive(Debug, Default)]
struct Log {
    calls: Vec<String>,
    players_created: Vec<String>,
    pushers_created: usize,
    fail_calls: bool,
    fail_snapshots: bool,
}

/// Host whose contexts record calls and resolve synchronously
#[derive(Debug, Clone, Default)]
pub(crate) struct MockHost {
    log: Arc<Mutex<Log>>,
}

impl MockHost {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.log.lock().unwrap().calls.clone()
    }

    pub(crate) fn count(&self, call: &str) -> usize {
        self.log
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| c.as_str() == call)
            .count()
    }

    pub(crate) fn players_created(&self) -> Vec<String> {
        self.log.lock().unwrap().players_created.clone()
    }

    pub(crate) fn pushers_created(&self) -> usize {
        self.log.lock().unwrap().pushers_created
    }

    /// Make every subsequent call report failure
    pub(crate) fn fail_calls(&self) {
        self.log.lock().unwrap().fail_calls = true;
    }

    /// Make subsequent snapshots complete without an image
    pub(crate) fn fail_snapshots(&self) {
        self.log.lock().unwrap().fail_snapshots = true;
    }

    fn record(log: &Arc<Mutex<Log>>, call: String, options: CallbackOptions) {
        let fail = {
            let mut log = log.lock().unwrap();
            log.calls.push(call.clone());
            log.fail_calls
        };

        if fail {
            options.fail(json!({ "errMsg": format!("{call}:fail") }));
        } else {
            options.succeed(json!({ "errMsg": format!("{call}:ok") }));
        }
    }

    fn record_snapshot(log: &Arc<Mutex<Log>>, call: String, options: CallbackOptions) {
        let fail = {
            let mut log = log.lock().unwrap();
            log.calls.push(call.clone());
            log.fail_snapshots
        };

        if fail {
            options.fail(json!({ "errMsg": format!("{call}:fail") }));
        } else {
            options.succeed(json!({ "tempImagePath": format!("/tmp/{call}.jpg") }));
        }
    }
}

impl HostRuntime for MockHost {
    fn create_pusher_context(&self) -> Box<dyn PusherContext> {
        self.log.lock().unwrap().pushers_created += 1;
        Box::new(MockPusher {
            log: self.log.clone(),
        })
    }

    fn create_player_context(&self, player_id: &str) -> Box<dyn PlayerContext> {
        self.log
            .lock()
            .unwrap()
            .players_created
            .push(player_id.to_string());
        Box::new(MockPlayer {
            id: player_id.to_string(),
            log: self.log.clone(),
        })
    }

    fn save_image_to_photos_album(&self, file_path: &str, options: CallbackOptions) {
        Self::record(&self.log, format!("album:{file_path}"), options);
    }
}

struct MockPlayer {
    id: String,
    log: Arc<Mutex<Log>>,
}

impl MockPlayer {
    fn call(&self, op: &str, options: CallbackOptions) {
        MockHost::record(&self.log, format!("player:{}:{op}", self.id), options);
    }
}

impl PlayerContext for MockPlayer {
    fn play(&mut self, options: CallbackOptions) {
        self.call("play", options);
    }

    fn stop(&mut self, options: CallbackOptions) {
        self.call("stop", options);
    }

    fn mute(&mut self, options: CallbackOptions) {
        self.call("mute", options);
    }

    fn pause(&mut self, options: CallbackOptions) {
        self.call("pause", options);
    }

    fn resume(&mut self, options: CallbackOptions) {
        self.call("resume", options);
    }

    fn request_full_screen(&mut self, direction: i32, options: CallbackOptions) {
        self.call(&format!("requestFullScreen({direction})"), options);
    }

    fn exit_full_screen(&mut self, options: CallbackOptions) {
        self.call("exitFullScreen", options);
    }

    fn snapshot(&mut self, quality: &str, options: CallbackOptions) {
        let call = format!("player:{}:snapshot({quality})", self.id);
        MockHost::record_snapshot(&self.log, call, options);
    }
}

struct MockPusher {
    log: Arc<Mutex<Log>>,
}

impl MockPusher {
    fn call(&self, op: &str, options: CallbackOptions) {
        MockHost::record(&self.log, format!("pusher:{op}"), options);
    }
}

impl PusherContext for MockPusher {
    fn start(&mut self, options: CallbackOptions) {
        self.call("start", options);
    }

    fn stop(&mut self, options: CallbackOptions) {
        self.call("stop", options);
    }

    fn pause(&mut self, options: CallbackOptions) {
        self.call("pause", options);
    }

    fn resume(&mut self, options: CallbackOptions) {
        self.call("resume", options);
    }

    fn switch_camera(&mut self, options: CallbackOptions) {
        self.call("switchCamera", options);
    }

    fn snapshot(&mut self, quality: &str, options: CallbackOptions) {
        MockHost::record_snapshot(&self.log, format!("pusher:snapshot({quality})"), options);
    }

    fn toggle_torch(&mut self, options: CallbackOptions) {
        self.call("toggleTorch", options);
    }

    fn play_bgm(&mut self, url: &str, options: CallbackOptions) {
        self.call(&format!("playBGM({url})"), options);
    }

    fn pause_bgm(&mut self, options: CallbackOptions) {
        self.call("pauseBGM", options);
    }

    fn resume_bgm(&mut self, options: CallbackOptions) {
        self.call("resumeBGM", options);
    }

    fn stop_bgm(&mut self, options: CallbackOptions) {
        self.call("stopBGM", options);
    }

    fn set_bgm_volume(&mut self, volume: f64, options: CallbackOptions) {
        self.call(&format!("setBGMVolume({volume})"), options);
    }

    fn set_mic_volume(&mut self, volume: f64, options: CallbackOptions) {
        self.call(&format!("setMICVolume({volume})"), options);
    }

    fn start_preview(&mut self, options: CallbackOptions) {
        self.call("startPreview", options);
    }

    fn stop_preview(&mut self, options: CallbackOptions) {
        self.call("stopPreview", options);
    }

    fn send_message(&mut self, msg: &str, options: CallbackOptions) {
        self.call(&format!("sendMessage({msg})"), options);
    }

    fn start_dump_audio(&mut self, options: CallbackOptions) {
        self.call("startDumpAudio", options);
    }

    fn stop_dump_audio(&mut self, options: CallbackOptions) {
        self.call("stopDumpAudio", options);
    }
}
