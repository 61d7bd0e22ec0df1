//! Local session state machine
//!
//! Tracks the local user's presence in the room from creation to disposal.

use std::time::{Duration, Instant};

/// Local presence phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalPhase {
    /// Session created, room not entered yet
    Idle,
    /// Host reported the room as entered
    Joined,
    /// Server removed the local user
    KickedOut,
    /// Room exited normally or session disposed
    Left,
}

/// Local presence state
#[derive(Debug, Clone)]
pub struct LocalState {
    /// Current phase
    pub phase: LocalPhase,

    /// Session creation time
    pub created_at: Instant,

    /// Time of the last room entry
    pub joined_at: Option<Instant>,
}

impl LocalState {
    pub fn new() -> Self {
        Self {
            phase: LocalPhase::Idle,
            created_at: Instant::now(),
            joined_at: None,
        }
    }

    /// Room entered; re-entering after a kick or exit is allowed
    pub fn on_join(&mut self) {
        self.phase = LocalPhase::Joined;
        self.joined_at = Some(Instant::now());
    }

    /// Kicked out by the server
    pub fn on_kicked(&mut self) {
        self.phase = LocalPhase::KickedOut;
    }

    /// Normal room exit
    pub fn on_exit(&mut self) {
        if self.phase == LocalPhase::Joined {
            self.phase = LocalPhase::Left;
        }
    }

    /// Session disposed; returns whether the user was in the room
    pub fn dispose(&mut self) -> bool {
        let was_joined = self.is_joined();
        self.phase = LocalPhase::Left;
        was_joined
    }

    /// Check if the local user is in the room
    pub fn is_joined(&self) -> bool {
        self.phase == LocalPhase::Joined
    }

    /// Time spent in the room since the last entry
    pub fn time_in_room(&self) -> Option<Duration> {
        self.joined_at
            .filter(|_| self.is_joined())
            .map(|joined_at| joined_at.elapsed())
    }
}

impl Default for LocalState {
    fn default() -> Self {
        Self::new()
    }
}
