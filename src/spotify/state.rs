/// Playback status as reported by the backend for one sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteStatus {
    pub is_playing: bool,
    pub track_id: String,
    pub track_name: String,
    pub album_art_url: Option<String>,
    pub progress_ms: u64,
    pub duration_ms: u64,
    pub queue_head: Option<QueueHead>,
}

/// The next track in the Spotify queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueHead {
    pub name: String,
    pub artists: Vec<String>,
    pub art_url: Option<String>,
}

impl QueueHead {
    pub fn artist_line(&self) -> String {
        self.artists.join(", ")
    }
}

/// Playback state held between syncs and advanced by the local ticker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalPlaybackState {
    pub track_id: Option<String>,
    pub progress_ms: u64,
    pub duration_ms: u64,
    pub is_playing: bool,
    pub last_sync_at_ms: Option<u64>,
    pub is_favorite: Option<bool>,
}

impl LocalPlaybackState {
    /// "m:ss / m:ss" as shown in `current-track-time`.
    pub fn time_text(&self) -> String {
        format!(
            "{} / {}",
            format_clock(self.progress_ms),
            format_clock(self.duration_ms)
        )
    }

    pub fn progress_ratio(&self) -> f64 {
        if self.duration_ms == 0 {
            0.0
        } else {
            (self.progress_ms as f64 / self.duration_ms as f64).min(1.0)
        }
    }
}

/// Minutes are not padded, seconds are.
pub fn format_clock(ms: u64) -> String {
    let minutes = ms / 60_000;
    let seconds = (ms % 60_000) / 1000;
    format!("{}:{:02}", minutes, seconds)
}
