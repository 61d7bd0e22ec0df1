//! Statistics for a live session

use std::time::Duration;

/// Session-level statistics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionStats {
    /// Pusher status events handled
    pub status_events: u64,
    /// User-list events (codes 1031..=1034) handled
    pub user_list_events: u64,
    /// User-list payloads that could not be parsed
    pub payload_failures: u64,
    /// User-list items skipped as malformed
    pub skipped_items: u64,
    /// Status codes outside every decoder table
    pub unrecognized_codes: u64,
    /// Host errors (status or error events) reported
    pub errors: u64,
    /// Domain events published
    pub events_published: u64,
    /// Current remote users
    pub users: usize,
    /// Current live remote streams
    pub streams: usize,
    /// Time since the session was created
    pub uptime: Duration,
}

impl SessionStats {
    /// Create new stats tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Share of status events that carried a user-list payload
    pub fn user_list_ratio(&self) -> f64 {
        if self.status_events == 0 {
            0.0
        } else {
            self.user_list_events as f64 / self.status_events as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_stats_new() {
        let stats = SessionStats::new();
        assert_eq!(stats.status_events, 0);
        assert_eq!(stats.events_published, 0);
        assert_eq!(stats.users, 0);
        assert_eq!(stats.streams, 0);
    }

    #[test]
    fn test_user_list_ratio() {
        let mut stats = SessionStats::new();
        assert_eq!(stats.user_list_ratio(), 0.0);

        stats.status_events = 4;
        stats.user_list_events = 1;
        assert_eq!(stats.user_list_ratio(), 0.25);
    }
}
