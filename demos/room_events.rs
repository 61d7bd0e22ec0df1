//! Scripted live room walkthrough
//!
//! Run with: cargo run --example room_events
//!
//! Drives a session through a host that only logs, feeding it the status
//! events a real pusher would emit:
//!
//! - local join
//! - two remote users, one with a camera and one sharing a screen
//! - audio toggling, a net status report, a user leaving
//! - a kick from the server, then disposal
//!
//! Every domain event is printed as it is published.

use std::sync::Arc;

use serde_json::json;

use liveroom_rs::client::{CallbackOptions, HostRuntime, PlayerContext, PusherContext};
use liveroom_rs::session::{LiveSession, PlayerEvent, SessionConfig, StatusEvent};
use liveroom_rs::RoomEvent;

/// Host that logs every call and reports success
struct LoggingHost;

fn complete(target: &str, op: &str, options: CallbackOptions) {
    tracing::info!(target_id = target, op, "host call");
    options.succeed(json!({ "errMsg": format!("{op}:ok") }));
}

impl HostRuntime for LoggingHost {
    fn create_pusher_context(&self) -> Box<dyn PusherContext> {
        Box::new(LoggingPusher)
    }

    fn create_player_context(&self, player_id: &str) -> Box<dyn PlayerContext> {
        Box::new(LoggingPlayer {
            id: player_id.to_string(),
        })
    }

    fn save_image_to_photos_album(&self, file_path: &str, options: CallbackOptions) {
        complete(file_path, "saveImageToPhotosAlbum", options);
    }
}

struct LoggingPusher;

impl PusherContext for LoggingPusher {
    fn start(&mut self, options: CallbackOptions) {
        complete("pusher", "start", options);
    }
    fn stop(&mut self, options: CallbackOptions) {
        complete("pusher", "stop", options);
    }
    fn pause(&mut self, options: CallbackOptions) {
        complete("pusher", "pause", options);
    }
    fn resume(&mut self, options: CallbackOptions) {
        complete("pusher", "resume", options);
    }
    fn switch_camera(&mut self, options: CallbackOptions) {
        complete("pusher", "switchCamera", options);
    }
    fn snapshot(&mut self, _quality: &str, options: CallbackOptions) {
        options.succeed(json!({ "tempImagePath": "/tmp/pusher.jpg" }));
    }
    fn toggle_torch(&mut self, options: CallbackOptions) {
        complete("pusher", "toggleTorch", options);
    }
    fn play_bgm(&mut self, _url: &str, options: CallbackOptions) {
        complete("pusher", "playBGM", options);
    }
    fn pause_bgm(&mut self, options: CallbackOptions) {
        complete("pusher", "pauseBGM", options);
    }
    fn resume_bgm(&mut self, options: CallbackOptions) {
        complete("pusher", "resumeBGM", options);
    }
    fn stop_bgm(&mut self, options: CallbackOptions) {
        complete("pusher", "stopBGM", options);
    }
    fn set_bgm_volume(&mut self, _volume: f64, options: CallbackOptions) {
        complete("pusher", "setBGMVolume", options);
    }
    fn set_mic_volume(&mut self, _volume: f64, options: CallbackOptions) {
        complete("pusher", "setMICVolume", options);
    }
    fn start_preview(&mut self, options: CallbackOptions) {
        complete("pusher", "startPreview", options);
    }
    fn stop_preview(&mut self, options: CallbackOptions) {
        complete("pusher", "stopPreview", options);
    }
    fn send_message(&mut self, _msg: &str, options: CallbackOptions) {
        complete("pusher", "sendMessage", options);
    }
    fn start_dump_audio(&mut self, options: CallbackOptions) {
        complete("pusher", "startDumpAudio", options);
    }
    fn stop_dump_audio(&mut self, options: CallbackOptions) {
        complete("pusher", "stopDumpAudio", options);
    }
}

struct LoggingPlayer {
    id: String,
}

impl PlayerContext for LoggingPlayer {
    fn play(&mut self, options: CallbackOptions) {
        complete(&self.id, "play", options);
    }
    fn stop(&mut self, options: CallbackOptions) {
        complete(&self.id, "stop", options);
    }
    fn mute(&mut self, options: CallbackOptions) {
        complete(&self.id, "mute", options);
    }
    fn pause(&mut self, options: CallbackOptions) {
        complete(&self.id, "pause", options);
    }
    fn resume(&mut self, options: CallbackOptions) {
        complete(&self.id, "resume", options);
    }
    fn request_full_screen(&mut self, _direction: i32, options: CallbackOptions) {
        complete(&self.id, "requestFullScreen", options);
    }
    fn exit_full_screen(&mut self, options: CallbackOptions) {
        complete(&self.id, "exitFullScreen", options);
    }
    fn snapshot(&mut self, _quality: &str, options: CallbackOptions) {
        options.succeed(json!({ "tempImagePath": format!("/tmp/{}.jpg", self.id) }));
    }
}

fn user_list(code: i32, items: serde_json::Value) -> StatusEvent {
    StatusEvent::new(code, json!({ "userlist": items }).to_string())
}

fn describe(event: &RoomEvent) -> String {
    match event.player() {
        Some(player) => format!(
            "{:<26} {} video={} audio={}",
            event.kind(),
            player.stream_id,
            player.has_video,
            player.has_audio
        ),
        None => format!("{:<26} {:?}", event.kind(), event),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("liveroom_rs=debug".parse()?)
                .add_directive("room_events=info".parse()?),
        )
        .init();

    let mut session = LiveSession::new(Arc::new(LoggingHost), SessionConfig::with_env("demo"));

    let mut events = session.subscribe();
    let printer = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            println!("{}", describe(&event));
        }
    });

    let patch = json!({ "url": "room://demo", "enableCamera": true });
    session.create_pusher(&patch.as_object().cloned().unwrap_or_default())?;
    if let Some(pusher) = session.pusher_mut() {
        pusher.start(CallbackOptions::new())?;
    }

    session.handle_pusher_status(&StatusEvent::new(1018, "entered room"));
    session.handle_pusher_status(&user_list(1031, json!([{ "userid": "alice" }, { "userid": "bob" }])));
    session.handle_pusher_status(&user_list(
        1033,
        json!([
            { "userid": "alice", "streamtype": "main", "hasvideo": true, "playurl": "room://alice/main" },
            { "userid": "bob", "streamtype": "aux", "hasvideo": true, "playurl": "room://bob/aux" }
        ]),
    ));
    session.handle_pusher_status(&user_list(1034, json!([{ "userid": "alice", "hasaudio": true }])));

    session.player_mut("alice_main")?.play(CallbackOptions::new())?;
    session.handle_player_net_status(&PlayerEvent::new(
        "alice_main",
        json!({ "info": { "videoBitrate": 800, "videoFPS": 15 } }),
    ))?;
    session.switch_stream_type("alice_main")?;

    session.handle_pusher_status(&user_list(1034, json!([{ "userid": "alice", "hasaudio": false }])));
    session.handle_pusher_status(&user_list(1032, json!([{ "userid": "bob" }])));
    session.handle_pusher_status(&StatusEvent::new(-1307, "network lost"));
    session.handle_pusher_status(&StatusEvent::new(1019, "exit room, reason[0]"));

    println!();
    println!("=== Room ===");
    for user in session.users() {
        println!("{} streams={:?}", user.user_id(), user.stream_types());
    }
    for player in session.players() {
        println!("{} src={} definition={:?}", player.stream_id, player.src, player.definition_type);
    }
    println!("{:?}", session.stats());

    session.dispose();
    printer.await?;

    Ok(())
}
